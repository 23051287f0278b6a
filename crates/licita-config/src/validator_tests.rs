use super::*;

#[test]
fn test_validate_default_config() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_zero_timeout_is_error() {
    let mut config = Config::default();
    config.messaging.default_timeout_ms = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "messaging.default_timeout_ms"));
}

#[test]
fn test_long_timeout_is_warning() {
    let mut config = Config::default();
    config.messaging.default_timeout_ms = 120_000;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "messaging.default_timeout_ms"));
}

#[test]
fn test_empty_page_tag() {
    let mut config = Config::default();
    config.messaging.page_channel_tag = "  ".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "messaging.page_channel_tag"));
}

#[test]
fn test_zero_quota() {
    let mut config = Config::default();
    config.storage.local_quota_bytes = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "storage.local_quota_bytes"));
}

#[test]
fn test_unknown_log_level() {
    let mut config = Config::default();
    config.logging.level = "verbose".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors[0].to_string().contains("verbose"));
}

#[test]
fn test_log_level_case_insensitive() {
    let mut config = Config::default();
    config.logging.level = "DEBUG".to_string();
    assert!(ConfigValidator::validate(&config).is_valid());
}

#[test]
fn test_missing_storage_permission_warns() {
    let mut config = Config::default();
    config.extension.permissions = vec!["tabs".to_string()];

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.message.contains("PERMISSION_DENIED")));
}

#[test]
fn test_unknown_permission_warns() {
    let mut config = Config::default();
    config.extension.permissions.push("camera".to_string());

    let result = ConfigValidator::validate(&config);
    assert!(result.warnings.iter().any(|w| w.message.contains("camera")));
}

#[test]
fn test_into_result() {
    let mut config = Config::default();
    config.extension.permissions = vec!["tabs".to_string()];
    let warnings = ConfigValidator::validate(&config).into_result().unwrap();
    assert_eq!(warnings.len(), 1);

    config.messaging.default_timeout_ms = 0;
    config.logging.dir = String::new();
    match ConfigValidator::validate(&config).into_result() {
        Err(ConfigError::Invalid(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("expected invalid config, got {:?}", other.map(|w| w.len())),
    }
}
