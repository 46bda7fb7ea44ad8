use nupull_util::hash::{sha512_bytes, sha512_file};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[test]
fn test_sha512_bytes_empty() {
    let hash = sha512_bytes(b"");
    assert_eq!(
        hash,
        "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
         47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
    );
}

#[test]
fn test_sha512_bytes_abc() {
    let hash = sha512_bytes(b"abc");
    assert_eq!(
        hash,
        "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
         2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
    );
}

#[test]
fn test_sha512_file_matches_bytes() {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(b"nupkg payload").unwrap();
    tmp.flush().unwrap();
    let file_hash = sha512_file(tmp.path()).unwrap();
    assert_eq!(file_hash, sha512_bytes(b"nupkg payload"));
}

#[test]
fn test_sha512_file_not_found() {
    let result = sha512_file(Path::new("/nonexistent/path/file.nupkg"));
    assert!(result.is_err());
}
