use hawkeye_common::config::{read_token_file, DEFAULT_ORGANIZATION_UUID};
use hawkeye_common::{ConfigError, Credentials, HawkeyeConfig};
use std::collections::HashMap;
use std::time::Duration;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

// ============================================================================
// from_lookup
// ============================================================================

#[test]
fn password_credentials_with_defaults() {
    let config = HawkeyeConfig::from_lookup(
        lookup(&[
            ("HAWKEYE_API_URL", "https://hawkeye.example.com/"),
            ("HAWKEYE_EMAIL", "ops@example.com"),
            ("HAWKEYE_PASSWORD", "hunter2"),
        ]),
        None,
    )
    .unwrap();

    assert_eq!(config.api_url, "https://hawkeye.example.com");
    assert_eq!(
        config.credentials,
        Credentials::Password {
            email: "ops@example.com".into(),
            password: "hunter2".into(),
        }
    );
    assert_eq!(config.organization_uuid, DEFAULT_ORGANIZATION_UUID);
    assert!(!config.stream_response);
    assert_eq!(config.poll_max_attempts, 30);
    assert_eq!(config.poll_interval, Duration::from_millis(2000));
    assert_eq!(config.project, None);
}

#[test]
fn webhook_variable_names_are_accepted() {
    let config = HawkeyeConfig::from_lookup(
        lookup(&[
            ("HAWKEYE_URL", "https://legacy.example.com"),
            ("HAWKEYE_USER", "alerts@example.com"),
            ("HAWKEYE_PASSWORD", "hunter2"),
        ]),
        None,
    )
    .unwrap();
    assert_eq!(config.api_url, "https://legacy.example.com");
    assert_eq!(
        config.credentials,
        Credentials::Password {
            email: "alerts@example.com".into(),
            password: "hunter2".into(),
        }
    );

    let preferred = HawkeyeConfig::from_lookup(
        lookup(&[
            ("HAWKEYE_API_URL", "https://hawkeye.example.com"),
            ("HAWKEYE_URL", "https://legacy.example.com"),
            ("HAWKEYE_EMAIL", "ops@example.com"),
            ("HAWKEYE_USER", "alerts@example.com"),
            ("HAWKEYE_PASSWORD", "hunter2"),
        ]),
        None,
    )
    .unwrap();
    assert_eq!(preferred.api_url, "https://hawkeye.example.com");
    assert!(matches!(
        preferred.credentials,
        Credentials::Password { ref email, .. } if email == "ops@example.com"
    ));
}

#[test]
fn token_used_when_password_missing() {
    let config = HawkeyeConfig::from_lookup(
        lookup(&[
            ("HAWKEYE_API_URL", "https://hawkeye.example.com"),
            ("HAWKEYE_EMAIL", "ops@example.com"),
            ("HAWKEYE_TOKEN", "tok-env"),
        ]),
        Some("tok-saved".into()),
    )
    .unwrap();
    assert_eq!(config.credentials, Credentials::Token("tok-env".into()));
}

#[test]
fn saved_token_is_last_resort() {
    let config = HawkeyeConfig::from_lookup(
        lookup(&[("HAWKEYE_API_URL", "https://hawkeye.example.com")]),
        Some("tok-saved".into()),
    )
    .unwrap();
    assert_eq!(config.credentials, Credentials::Token("tok-saved".into()));
}

#[test]
fn missing_api_url_is_reported() {
    let err = HawkeyeConfig::from_lookup(lookup(&[("HAWKEYE_TOKEN", "t")]), None).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("HAWKEYE_API_URL")));
}

#[test]
fn blank_values_count_as_missing() {
    let err = HawkeyeConfig::from_lookup(
        lookup(&[("HAWKEYE_API_URL", "https://x"), ("HAWKEYE_EMAIL", "   ")]),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Missing("HAWKEYE_EMAIL")));
}

#[test]
fn email_without_password_or_token_names_password() {
    let err = HawkeyeConfig::from_lookup(
        lookup(&[("HAWKEYE_API_URL", "https://x"), ("HAWKEYE_EMAIL", "ops@example.com")]),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Missing("HAWKEYE_PASSWORD")));
}

#[test]
fn overrides_are_parsed() {
    let config = HawkeyeConfig::from_lookup(
        lookup(&[
            ("HAWKEYE_API_URL", "https://x"),
            ("HAWKEYE_TOKEN", "t"),
            ("ORGANIZATION_UUID", "org-7"),
            ("STREAM_RESPONSE", "True"),
            ("HAWKEYE_POLL_MAX_ATTEMPTS", "5"),
            ("HAWKEYE_POLL_INTERVAL_MS", "250"),
            ("HAWKEYE_PROJECT", "prod-cluster"),
        ]),
        None,
    )
    .unwrap();

    assert_eq!(config.organization_uuid, "org-7");
    assert!(config.stream_response);
    assert_eq!(config.poll_max_attempts, 5);
    assert_eq!(config.poll_interval, Duration::from_millis(250));
    assert_eq!(config.project.as_deref(), Some("prod-cluster"));
    assert_eq!(config.poller().max_attempts(), 5);
}

#[test]
fn invalid_values_are_rejected() {
    let base = [("HAWKEYE_API_URL", "https://x"), ("HAWKEYE_TOKEN", "t")];

    for (key, value) in [
        ("STREAM_RESPONSE", "maybe"),
        ("HAWKEYE_POLL_MAX_ATTEMPTS", "-1"),
        ("HAWKEYE_POLL_INTERVAL_MS", "soon"),
    ] {
        let mut vars = base.to_vec();
        vars.push((key, value));
        let err = HawkeyeConfig::from_lookup(lookup(&vars), None).unwrap_err();
        match err {
            ConfigError::Invalid { key: k, value: v } => {
                assert_eq!(k, key);
                assert_eq!(v, value);
            }
            other => panic!("expected Invalid for {key}, got {other:?}"),
        }
    }
}

// ============================================================================
// Credentials file
// ============================================================================

#[test]
fn token_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, r#"{"token":"tok-file"}"#).unwrap();
    assert_eq!(read_token_file(&path).as_deref(), Some("tok-file"));
}

#[test]
fn unusable_token_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();

    let empty = dir.path().join("empty.json");
    std::fs::write(&empty, r#"{"token":""}"#).unwrap();
    assert_eq!(read_token_file(&empty), None);

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "not json").unwrap();
    assert_eq!(read_token_file(&garbage), None);

    assert_eq!(read_token_file(&dir.path().join("absent.json")), None);
}
