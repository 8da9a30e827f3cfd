/*!
 * Tests for application configuration functionality
 */

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use changelog_translator::app_config::{API_KEY_ENV, Config, LogLevel, WEBHOOK_ENV};
use changelog_translator::translation::retry::RetryDecision;

use crate::common;

fn valid_config() -> Config {
    let mut config = Config::default();
    config.translation.api_key = "sk-test".to_string();
    config
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.target_language, "Japanese");
    assert_eq!(config.policy.full_translation_interval, 30);
    assert_eq!(config.policy.max_versions_to_translate, None);
    assert_eq!(config.translation.model, "claude-sonnet-4-5");
    assert_eq!(config.translation.temperature, 0.3);
    assert_eq!(config.translation.max_tokens, 64000);
    assert_eq!(config.translation.max_retries, 3);
    assert_eq!(config.translation.retry_backoff_secs, 10);
    assert_eq!(config.notification.jpy_per_usd, 145.0);
    assert_eq!(config.document_path(), PathBuf::from("translated/changelog_ja.md"));
    assert_eq!(config.body_path(), PathBuf::from("translated/note_ready.md"));
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_config_partialJson_shouldFillDefaults() {
    let config: Config = serde_json::from_str(
        r#"{ "target_language": "German", "policy": { "max_versions_to_translate": 20 } }"#,
    )
    .unwrap();

    assert_eq!(config.target_language, "German");
    assert_eq!(config.policy.max_versions_to_translate, Some(20));
    assert_eq!(config.policy.full_translation_interval, 30);
    assert_eq!(config.translation.max_retries, 3);
}

#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = valid_config();
    assert!(config.validate().is_ok());

    config.translation.api_key = String::new();
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains(API_KEY_ENV));
    config.translation.api_key = "sk-test".to_string();

    config.policy.full_translation_interval = 0;
    assert!(config.validate().is_err());
    config.policy.full_translation_interval = 30;

    config.translation.max_retries = 0;
    assert!(config.validate().is_err());
    config.translation.max_retries = 3;

    config.source_url = "not a url".to_string();
    assert!(config.validate().is_err());
    config.source_url = "ftp://example.com/CHANGELOG.md".to_string();
    assert!(config.validate().is_err());
    config.source_url = "https://example.com/CHANGELOG.md".to_string();

    config.policy.max_versions_to_translate = Some(0);
    assert!(config.validate().is_err());
    config.policy.max_versions_to_translate = Some(5);

    config.output.body_file = config.output.document_file.clone();
    assert!(config.validate().is_err());
}

#[test]
fn test_applyEnv_withSecrets_shouldOverrideConfig() {
    let mut config = Config::default();
    let vars = env(&[(API_KEY_ENV, " sk-env "), (WEBHOOK_ENV, "https://discord.com/api/webhooks/1/x")]);

    config.apply_env(|key| vars.get(key).cloned());

    assert_eq!(config.translation.api_key, "sk-env");
    assert_eq!(
        config.notification.webhook_url.as_deref(),
        Some("https://discord.com/api/webhooks/1/x")
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_applyEnv_withEmptyValues_shouldKeepConfig() {
    let mut config = valid_config();
    let vars = env(&[(API_KEY_ENV, "   ")]);

    config.apply_env(|key| vars.get(key).cloned());

    assert_eq!(config.translation.api_key, "sk-test");
    assert_eq!(config.notification.webhook_url, None);
}

#[test]
fn test_loadOrCreate_missingFile_shouldWriteDefaultsWithoutSecrets() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(config.policy.full_translation_interval, 30);

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(!written.contains("api_key"));
    assert!(!written.contains("webhook_url"));

    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.translation.model, config.translation.model);
}

#[test]
fn test_loadOrCreate_invalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_retryPolicy_fromConfig_shouldUseLinearBackoff() {
    let policy = valid_config().retry_policy();

    assert_eq!(policy.max_attempts(), 3);
    assert_eq!(policy.decide(1), RetryDecision::RetryAfter(Duration::from_secs(10)));
    assert_eq!(policy.decide(2), RetryDecision::RetryAfter(Duration::from_secs(20)));
    assert_eq!(policy.decide(3), RetryDecision::GiveUp);
}

#[test]
fn test_translationConfig_defaults_shouldRetryEveryErrorWithoutOverallDeadline() {
    let config = valid_config();

    assert!(!config.translation.stop_on_client_errors);
    assert_eq!(config.connect_timeout(), Duration::from_secs(30));
    assert_eq!(config.idle_timeout(), Duration::from_secs(120));
}

#[test]
fn test_translationConfig_fromJson_shouldEnableClientErrorStop() {
    let config: Config = serde_json::from_str(
        r#"{ "translation": { "stop_on_client_errors": true, "idle_timeout_secs": 300 } }"#,
    )
    .unwrap();

    assert!(config.translation.stop_on_client_errors);
    assert_eq!(config.idle_timeout(), Duration::from_secs(300));
    assert_eq!(config.connect_timeout(), Duration::from_secs(30));
}

#[test]
fn test_config_validation_zeroIdleTimeout_shouldFail() {
    let mut config = valid_config();
    config.translation.idle_timeout_secs = 0;
    assert!(config.validate().is_err());
}
