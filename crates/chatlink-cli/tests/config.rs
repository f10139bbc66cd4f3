use std::time::Duration;

use chatlink_cli::config::{
    self, ChatlinkConfig, config_info, load_config_from, redact_identity, resolve_identity,
    save_config_in,
};
use chatlink_gateway::{Endpoints, GatewayConfig};

fn sample() -> ChatlinkConfig {
    ChatlinkConfig {
        base_url: "http://chat.internal:9000".to_string(),
        identity: Some("ada@example.com".to_string()),
        timeout_secs: 10,
        ..ChatlinkConfig::default()
    }
}

#[test]
fn save_then_load_in_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = sample();

    save_config_in(dir.path(), &config).unwrap();
    let loaded = load_config_from(&dir.path().join("config.json")).unwrap();

    assert_eq!(loaded, config);
    assert_eq!(loaded.config_version, 1);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn save_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");

    save_config_in(&nested, &sample()).unwrap();

    assert!(nested.join("config.json").exists());
}

#[cfg(unix)]
#[test]
fn saved_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    save_config_in(dir.path(), &sample()).unwrap();

    let mode = std::fs::metadata(dir.path().join("config.json"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn unversioned_config_is_migrated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"base_url":"http://localhost:8000","identity":"ada@example.com","created_at":"2025-01-01T00:00:00Z"}"#,
    )
    .unwrap();

    let loaded = load_config_from(&path).unwrap();

    assert_eq!(loaded.config_version, 1);
    assert_eq!(loaded.timeout_secs, 30);
    assert_eq!(loaded.endpoints, Endpoints::default());
    assert_eq!(loaded.identity.as_deref(), Some("ada@example.com"));
}

#[test]
fn migration_keeps_existing_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"base_url":"http://localhost:8000","timeout_secs":5,"created_at":"2025-01-01T00:00:00Z"}"#,
    )
    .unwrap();

    let loaded = load_config_from(&path).unwrap();

    assert_eq!(loaded.timeout_secs, 5);
    assert_eq!(loaded.identity, None);
}

#[test]
fn newer_config_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"config_version":99,"base_url":"http://localhost:8000","timeout_secs":5,"endpoints":{"send":"/a","history":"/b","clear":"/c"},"created_at":"2025-01-01T00:00:00Z"}"#,
    )
    .unwrap();

    let err = load_config_from(&path).unwrap_err();
    assert!(err.to_string().contains("newer than this build supports"));
}

#[test]
fn oversized_config_version_is_rejected_not_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    // 2^32 + 1 would read as version 1 if narrowed to u32.
    std::fs::write(
        &path,
        r#"{"config_version":4294967297,"base_url":"http://localhost:8000","timeout_secs":5,"endpoints":{"send":"/a","history":"/b","clear":"/c"},"created_at":"2025-01-01T00:00:00Z"}"#,
    )
    .unwrap();

    let err = load_config_from(&path).unwrap_err();
    assert!(err.to_string().contains("4294967297"));
    assert!(err.to_string().contains("newer than this build supports"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_config_from(&dir.path().join("config.json")).is_err());
}

#[test]
fn gateway_config_follows_stored_values() {
    let mut stored = sample();
    stored.endpoints.send = "/api/chat".to_string();

    let gateway = GatewayConfig::from(&stored);

    assert_eq!(gateway.base_url, "http://chat.internal:9000");
    assert_eq!(gateway.timeout, Duration::from_secs(10));
    assert_eq!(gateway.endpoints.send, "/api/chat");
}

#[test]
fn identity_precedence_is_flag_env_stored() {
    let stored = sample();

    assert_eq!(
        resolve_identity(Some("flag@x.io"), Some("env@x.io"), &stored).as_deref(),
        Some("flag@x.io")
    );
    assert_eq!(
        resolve_identity(None, Some("env@x.io"), &stored).as_deref(),
        Some("env@x.io")
    );
    assert_eq!(
        resolve_identity(None, None, &stored).as_deref(),
        Some("ada@example.com")
    );
    assert_eq!(resolve_identity(None, None, &ChatlinkConfig::default()), None);
}

#[test]
fn blank_identity_candidates_are_skipped() {
    let stored = sample();

    assert_eq!(
        resolve_identity(Some("   "), Some(""), &stored).as_deref(),
        Some("ada@example.com")
    );
    assert_eq!(
        resolve_identity(Some("  bob@x.io "), None, &stored).as_deref(),
        Some("bob@x.io")
    );
}

#[test]
fn redaction_hides_local_part() {
    assert_eq!(redact_identity("ada@example.com"), "a***@example.com");
    assert_eq!(redact_identity("ada"), "a***");
    assert_eq!(redact_identity("ab"), "****");
}

#[test]
fn config_info_never_shows_full_identity() {
    let dir = tempfile::tempdir().unwrap();
    let info = config_info(&sample(), &dir.path().join("config.json"));

    assert_eq!(info.identity_hint.as_deref(), Some("a***@example.com"));
    assert_eq!(info.timeout_secs, 10);
    let json = serde_json::to_string(&info).unwrap();
    assert!(!json.contains("ada@example.com"));
}

#[test]
fn default_config_points_at_local_service() {
    let config = ChatlinkConfig::default();
    assert_eq!(config.base_url, "http://127.0.0.1:8000");
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.identity, None);
    assert!(config::IDENTITY_ENV.starts_with("CHATLINK"));
}
