/*!
 * Run notifications.
 *
 * A notification is sent after every translated run and after every fatal
 * failure. Delivery is best effort: callers log a `NotificationError` and
 * carry on.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use parking_lot::Mutex;
use reqwest::Client;
use serde::Serialize;

use crate::app_controller::RunReport;
use crate::errors::NotificationError;

/// What happened in a run
#[derive(Debug, Clone)]
pub enum Notification {
    /// Translation saved and state committed
    Success(RunReport),
    /// The run ended in a fatal error
    Failure { message: String },
}

/// Delivers notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Used when no webhook is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<(), NotificationError> {
        warn!("Notification webhook is not configured, skipping notification");
        Ok(())
    }
}

/// Discord webhook payload
#[derive(Debug, Serialize)]
pub struct DiscordPayload {
    pub content: String,
    pub username: String,
    pub embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
pub struct DiscordEmbed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<DiscordField>,
}

#[derive(Debug, Serialize)]
pub struct DiscordField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl DiscordField {
    fn new(name: &str, value: String, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline,
        }
    }
}

const SUCCESS_COLOR: u32 = 0x58B9FF;
const FAILURE_COLOR: u32 = 0xE74C3C;

/// Format a USD amount with its approximate JPY value
pub fn format_cost(cost_usd: f64, jpy_per_usd: f64) -> String {
    format!("${:.3} (~{} JPY)", cost_usd, (cost_usd * jpy_per_usd) as i64)
}

/// Build the webhook payload for a notification
pub fn build_discord_payload(notification: &Notification, username: &str, jpy_per_usd: f64) -> DiscordPayload {
    match notification {
        Notification::Success(report) => {
            let cost = format_cost(report.usage.cost_estimate_usd, jpy_per_usd);
            let locations = report
                .artifact_locations
                .iter()
                .map(|location| format!("`{}`", location))
                .collect::<Vec<_>>()
                .join("\n");

            DiscordPayload {
                content: format!("Translation finished. Estimated cost: {}", cost),
                username: username.to_string(),
                embeds: vec![DiscordEmbed {
                    title: "Changelog translation updated".to_string(),
                    description: format!("Strategy: {}", report.strategy),
                    color: SUCCESS_COLOR,
                    fields: vec![
                        DiscordField::new("Saved to", locations, false),
                        DiscordField::new("Estimated cost", cost, true),
                        DiscordField::new(
                            "Tokens",
                            format!("{} in / {} out", report.usage.input_tokens, report.usage.output_tokens),
                            true,
                        ),
                        DiscordField::new(
                            "Updated at",
                            report.finished_at.format("%Y-%m-%d %H:%M").to_string(),
                            true,
                        ),
                        DiscordField::new(
                            "Next steps",
                            "1. Review the translation\n2. Copy the header-stripped file to your publishing platform\n3. Publish".to_string(),
                            false,
                        ),
                    ],
                }],
            }
        }
        Notification::Failure { message } => DiscordPayload {
            content: format!("An error occurred\n{}", message),
            username: username.to_string(),
            embeds: vec![DiscordEmbed {
                title: "Changelog translation failed".to_string(),
                description: message.clone(),
                color: FAILURE_COLOR,
                fields: Vec::new(),
            }],
        },
    }
}

/// Posts notifications to a Discord webhook
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
    username: String,
    jpy_per_usd: f64,
}

impl DiscordNotifier {
    pub fn new(webhook_url: impl Into<String>, username: impl Into<String>, jpy_per_usd: f64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            webhook_url: webhook_url.into(),
            username: username.into(),
            jpy_per_usd,
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        let payload = build_discord_payload(notification, &self.username, self.jpy_per_usd);
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotificationError::Status {
                status_code: status.as_u16(),
                message,
            });
        }

        info!("Notification sent");
        Ok(())
    }
}

/// Keeps notifications in memory; optionally fails every delivery
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose deliveries fail after being recorded
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        self.sent.lock().push(notification.clone());
        if self.fail {
            return Err(NotificationError::Status {
                status_code: 500,
                message: "simulated webhook failure".to_string(),
            });
        }
        Ok(())
    }
}
