use std::time::Duration;

use storyboard::config::loader::load_config;
use storyboard::config::types::AppConfig;

#[test]
fn parse_empty_config_uses_defaults() {
    let config: AppConfig = toml::from_str("").unwrap();
    assert_eq!(config.api.base_url, "http://localhost:8000");
    assert_eq!(config.api.timeout(), Duration::from_secs(30));
    assert!(!config.api.force_https);
    assert_eq!(config.pagination.page_size, 10);
    assert_eq!(config.notifications.dismiss_after(), Duration::from_millis(3000));
    assert!(config.session.state_file.is_none());
}

#[test]
fn parse_unknown_keys_ignored() {
    let toml = r#"
unknown_top_level = "should be ignored"

[api]
base_url = "http://tracker.local/"
"#;
    let config: AppConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.api.normalized_base_url(), "http://tracker.local");
}

#[test]
fn parse_all_sections() {
    let toml = r#"
[api]
base_url = "http://tracker.example.com"
timeout_secs = 5
force_https = true

[session]
state_file = "/var/tmp/storyboard.json"

[pagination]
page_size = 25

[notifications]
dismiss_ms = 1500
"#;
    let config: AppConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.api.normalized_base_url(), "https://tracker.example.com");
    assert_eq!(config.api.timeout(), Duration::from_secs(5));
    assert_eq!(
        config.session.state_file.as_deref(),
        Some(std::path::Path::new("/var/tmp/storyboard.json"))
    );
    assert_eq!(config.pagination.page_size, 25);
    assert_eq!(config.notifications.dismiss_after(), Duration::from_millis(1500));
}

#[test]
fn load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[pagination]\npage_size = 7\n").unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.pagination.page_size, 7);
}

#[test]
fn load_missing_explicit_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(err.to_string().contains("reading"), "unexpected error: {err:#}");
}

#[test]
fn load_malformed_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[pagination\npage_size = ").unwrap();

    let err = load_config(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("parsing TOML"), "unexpected error: {err:#}");
}
