use nupull_core::config::{dirs_path, GlobalConfig};

#[test]
fn test_global_config_defaults() {
    let config = GlobalConfig::default();
    assert_eq!(config.source.url, "https://api.nuget.org/v3/index.json");
    assert_eq!(config.download.jobs, 4);
    assert_eq!(config.download.retries, 3);
    assert_eq!(config.download.timeout_secs, 120);
    assert_eq!(config.download.output_dir, "OfflinePackages");
    assert_eq!(config.resolve.framework, "net10.0");
}

#[test]
fn test_global_config_empty_toml_uses_defaults() {
    let config: GlobalConfig = toml::from_str("").unwrap();
    assert_eq!(config.download.jobs, 4);
    assert_eq!(config.resolve.framework, "net10.0");
}

#[test]
fn test_dirs_path_contains_nupull() {
    assert!(dirs_path().ends_with(".nupull"));
}

#[test]
fn test_global_config_parse_from_toml() {
    let toml = r#"
[source]
url = "https://nuget.example.com/v3/index.json"

[download]
jobs = 8
timeout-secs = 30
output-dir = "mirror"

[resolve]
framework = "net8.0"
"#;
    let config: GlobalConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.source.url, "https://nuget.example.com/v3/index.json");
    assert_eq!(config.download.jobs, 8);
    assert_eq!(config.download.retries, 3);
    assert_eq!(config.download.timeout_secs, 30);
    assert_eq!(config.download.output_dir, "mirror");
    assert_eq!(config.resolve.framework, "net8.0");
}

#[test]
fn test_load_from_missing_file_is_default() {
    let tmp = tempfile::tempdir().unwrap();
    let config = GlobalConfig::load_from(&tmp.path().join("config.toml")).unwrap();
    assert_eq!(config.download.jobs, 4);
}

#[test]
fn test_load_from_malformed_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[download\njobs = ").unwrap();
    let err = GlobalConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Config error"), "got: {err}");
}
