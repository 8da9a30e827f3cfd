/*!
 * Application configuration module.
 *
 * Handles loading, validating and saving configuration settings. Secrets come
 * from the environment and are never written back to the config file.
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::translation::{GenerationSettings, Pricing, PromptTemplates, RetryPolicy};

/// Environment variable holding the Anthropic API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Environment variable holding the optional Discord webhook URL
pub const WEBHOOK_ENV: &str = "DISCORD_WEBHOOK_URL";

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// URL of the source changelog
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// Language the changelog is translated into
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Product name used in prompts
    #[serde(default = "default_product")]
    pub product: String,

    /// Title of the translated document
    #[serde(default = "default_title")]
    pub title: String,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Full vs. incremental policy
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Notification config
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Where artifacts and state are written
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    // @field: Directory of the translated artifacts
    #[serde(default = "default_translated_dir")]
    pub translated_dir: PathBuf,

    // @field: Headered artifact file name
    #[serde(default = "default_document_file")]
    pub document_file: String,

    // @field: Header-stripped artifact file name
    #[serde(default = "default_body_file")]
    pub body_file: String,

    // @field: Directory of the persisted run state
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            translated_dir: default_translated_dir(),
            document_file: default_document_file(),
            body_file: default_body_file(),
            state_dir: default_state_dir(),
        }
    }
}

/// Translation policy and source limits
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PolicyConfig {
    // @field: Change-detected runs between forced full translations
    #[serde(default = "default_full_translation_interval")]
    pub full_translation_interval: u32,

    // @field: Version sections included in a full translation, unlimited when absent
    #[serde(default)]
    pub max_versions_to_translate: Option<usize>,

    // @field: Timeout of the changelog download
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            full_translation_interval: default_full_translation_interval(),
            max_versions_to_translate: None,
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

/// Anthropic provider and generation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    // @field: Model name
    #[serde(default = "default_anthropic_model")]
    pub model: String,

    // @field: API base URL
    #[serde(default = "default_anthropic_endpoint")]
    pub endpoint: String,

    // @field: API key, normally supplied through ANTHROPIC_API_KEY
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    // @field: Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    // @field: Upper bound on generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    // @field: Timeout for establishing a connection in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    // @field: Longest silence allowed between streamed chunks in seconds
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    // @field: Total attempts per translation
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    // @field: Give up without retrying on authentication and other client errors
    #[serde(default)]
    pub stop_on_client_errors: bool,

    // @field: Linear backoff base in seconds
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,

    // @field: USD per million input tokens
    #[serde(default = "default_input_price")]
    pub input_price_per_mtok: f64,

    // @field: USD per million output tokens
    #[serde(default = "default_output_price")]
    pub output_price_per_mtok: f64,

    // @field: Prompt templates
    #[serde(default)]
    pub prompts: PromptTemplates,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_anthropic_model(),
            endpoint: default_anthropic_endpoint(),
            api_key: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            connect_timeout_secs: default_connect_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            max_retries: default_max_retries(),
            stop_on_client_errors: false,
            retry_backoff_secs: default_retry_backoff_secs(),
            input_price_per_mtok: default_input_price(),
            output_price_per_mtok: default_output_price(),
            prompts: PromptTemplates::default(),
        }
    }
}

/// Webhook notification settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotificationConfig {
    // @field: Discord webhook, normally supplied through DISCORD_WEBHOOK_URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    // @field: Name the webhook posts as
    #[serde(default = "default_notification_username")]
    pub username: String,

    // @field: JPY per USD for the cost estimate
    #[serde(default = "default_jpy_per_usd")]
    pub jpy_per_usd: f64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            username: default_notification_username(),
            jpy_per_usd: default_jpy_per_usd(),
        }
    }
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_source_url() -> String {
    "https://raw.githubusercontent.com/anthropics/claude-code/main/CHANGELOG.md".to_string()
}

fn default_target_language() -> String {
    "Japanese".to_string()
}

fn default_product() -> String {
    "Claude Code".to_string()
}

fn default_title() -> String {
    "Claude Code Changelog (Japanese translation)".to_string()
}

fn default_translated_dir() -> PathBuf {
    PathBuf::from("translated")
}

fn default_document_file() -> String {
    "changelog_ja.md".to_string()
}

fn default_body_file() -> String {
    "note_ready.md".to_string()
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("state")
}

fn default_full_translation_interval() -> u32 {
    30
}

fn default_fetch_timeout_secs() -> u64 {
    60
}

fn default_anthropic_model() -> String {
    "claude-sonnet-4-5".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    64000
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_idle_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_secs() -> u64 {
    10
}

fn default_input_price() -> f64 {
    3.0
}

fn default_output_price() -> f64 {
    15.0
}

fn default_notification_username() -> String {
    "Claude Code Changelog Bot".to_string()
}

fn default_jpy_per_usd() -> f64 {
    145.0
}

fn check_http_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| anyhow!("{} is not a valid URL ({}): {}", name, e, value))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!("{} must use http or https: {}", name, value));
    }
    Ok(())
}

impl Config {
    /// Load the config file, creating it with defaults when missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
        Ok(config)
    }

    /// Take secrets from the environment through `lookup`.
    ///
    /// Non-empty values win over the config file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup(API_KEY_ENV).filter(|value| !value.trim().is_empty()) {
            self.translation.api_key = api_key.trim().to_string();
        }
        if let Some(webhook) = lookup(WEBHOOK_ENV).filter(|value| !value.trim().is_empty()) {
            self.notification.webhook_url = Some(webhook.trim().to_string());
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.translation.api_key.trim().is_empty() {
            return Err(anyhow!("{} is not set", API_KEY_ENV));
        }

        check_http_url("source_url", &self.source_url)?;
        check_http_url("translation.endpoint", &self.translation.endpoint)?;
        if let Some(webhook) = &self.notification.webhook_url {
            check_http_url("notification.webhook_url", webhook)?;
        }

        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language cannot be empty"));
        }

        if self.policy.full_translation_interval == 0 {
            return Err(anyhow!("policy.full_translation_interval must be at least 1"));
        }

        if self.policy.max_versions_to_translate == Some(0) {
            return Err(anyhow!("policy.max_versions_to_translate must be at least 1 when set"));
        }

        if self.translation.max_retries == 0 {
            return Err(anyhow!("translation.max_retries must be at least 1"));
        }

        if self.translation.connect_timeout_secs == 0 || self.translation.idle_timeout_secs == 0 {
            return Err(anyhow!("translation timeouts must be at least 1 second"));
        }

        if self.translation.max_tokens == 0 {
            return Err(anyhow!("translation.max_tokens must be at least 1"));
        }

        if !(0.0..=1.0).contains(&self.translation.temperature) {
            return Err(anyhow!(
                "translation.temperature must be between 0.0 and 1.0, got {}",
                self.translation.temperature
            ));
        }

        if self.output.document_file.is_empty() || self.output.body_file.is_empty() {
            return Err(anyhow!("Output file names cannot be empty"));
        }

        if self.output.document_file == self.output.body_file {
            return Err(anyhow!("Headered and header-stripped artifacts need distinct file names"));
        }

        Ok(())
    }

    pub fn document_path(&self) -> PathBuf {
        self.output.translated_dir.join(&self.output.document_file)
    }

    pub fn body_path(&self) -> PathBuf {
        self.output.translated_dir.join(&self.output.body_file)
    }

    pub fn state_dir(&self) -> &Path {
        &self.output.state_dir
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.policy.fetch_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.translation.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.translation.idle_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.translation.max_retries,
            Duration::from_secs(self.translation.retry_backoff_secs),
        )
    }

    pub fn pricing(&self) -> Pricing {
        Pricing {
            input_per_mtok: self.translation.input_price_per_mtok,
            output_per_mtok: self.translation.output_price_per_mtok,
        }
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            target_language: self.target_language.clone(),
            product: self.product.clone(),
            temperature: self.translation.temperature,
            max_tokens: self.translation.max_tokens,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            target_language: default_target_language(),
            product: default_product(),
            title: default_title(),
            output: OutputConfig::default(),
            policy: PolicyConfig::default(),
            translation: TranslationConfig::default(),
            notification: NotificationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
