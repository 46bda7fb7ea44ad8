use std::path::{Path, PathBuf};

/// Suffix of in-flight downloads. A file carrying it is never a finished artifact.
pub const PART_SUFFIX: &str = ".part";

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Sibling path used while `dest` is still being written.
///
/// `out/foo.1.0.0.nupkg` becomes `out/foo.1.0.0.nupkg.part`.
pub fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(PART_SUFFIX);
    dest.with_file_name(name)
}

/// Whether `path` holds a finished, non-empty file.
///
/// Zero-length files are left behind by interrupted tools and are not
/// treated as present.
pub fn is_complete_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Remove a file if it exists, logging instead of failing.
pub fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {}: {e}", path.display()),
    }
}
