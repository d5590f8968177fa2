//! Slack incoming-webhook delivery.

use crate::config::SlackSettings;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use std::time::Duration;

const WEBHOOK_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlackMessage {
    pub text: String,
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon_emoji: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub channel: String,
}

impl SlackMessage {
    /// `icon` written as `:name:` is sent as an emoji, anything else as an image URL.
    pub fn new(text: impl Into<String>, settings: &SlackSettings) -> Self {
        let icon = settings.icon.trim();
        let is_emoji = icon.len() > 2 && icon.starts_with(':') && icon.ends_with(':');
        let (icon_emoji, icon_url) = if is_emoji {
            (icon.to_string(), String::new())
        } else {
            (String::new(), icon.to_string())
        };
        Self {
            text: text.into(),
            username: settings.username.clone(),
            icon_emoji,
            icon_url,
            channel: settings.channel.clone(),
        }
    }
}

/// Outbound side of the report; returns the raw response body.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, message: &SlackMessage) -> AppResult<String>;
}

pub struct SlackWebhook {
    http: HttpClient,
    url: String,
}

impl SlackWebhook {
    pub fn new(url: impl Into<String>) -> AppResult<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MessageSink for SlackWebhook {
    async fn deliver(&self, message: &SlackMessage) -> AppResult<String> {
        let payload =
            serde_json::to_string(message).map_err(|err| AppError::Dispatch(err.to_string()))?;
        let response = self
            .http
            .post(&self.url)
            .form(&[("payload", payload)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_success() {
            Ok(body)
        } else {
            Err(AppError::Dispatch(format!("webhook returned {status}: {body}")))
        }
    }
}
