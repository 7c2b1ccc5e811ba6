use std::time::Duration;

use pretty_assertions::assert_eq;
use wordsmith_core::{ResultCache, StalenessPolicy, DEFAULT_POLL_INTERVAL_MS};
use wordsmith_engine::{
    load_config, save_config, ConfigError, WordsmithConfig, CONFIG_FILENAME, DEFAULT_BASE_URL,
};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(&dir.path().join(CONFIG_FILENAME)).unwrap();

    assert_eq!(config, WordsmithConfig::default());
    assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.procedure.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    assert_eq!(config.cache.policy(), StalenessPolicy::Manual);
}

#[test]
fn file_overrides_selected_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILENAME);
    std::fs::write(
        &path,
        r#"(
            api: (base_url: "https://wordsmith.example/api/"),
            procedure: (autostart: false, poll_interval_ms: 500),
            cache: (stale_after_secs: Some(600)),
        )"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.api.base_url, "https://wordsmith.example/api/");
    assert_eq!(config.api.request_timeout_ms, 30_000);
    assert!(!config.procedure.autostart);
    assert!(config.procedure.enabled);
    assert_eq!(config.procedure.poll_interval(), Duration::from_millis(500));
    assert_eq!(
        config.build_cache().policy(),
        StalenessPolicy::After(Duration::from_secs(600))
    );
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILENAME);
    let mut config = WordsmithConfig::default();
    config.procedure.keep_previous_data = true;
    config.cache.stale_after_secs = Some(30);

    save_config(&path, &config).unwrap();
    assert_eq!(load_config(&path).unwrap(), config);
}

#[test]
fn invalid_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILENAME);
    std::fs::write(&path, "(procedure: (autostart: \"yes\"))").unwrap();

    assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn directory_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_config(dir.path()),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn built_cache_starts_empty() {
    let cache = WordsmithConfig::default().build_cache();
    assert!(cache.is_empty());
    cache.clear();
    assert_eq!(cache.len(), 0);
}
