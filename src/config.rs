//! Run configuration read once from a JSON file.
//!
//! ```json
//! {
//!   "jira":  { "url": "https://jira.example.com", "project": "PRJ", "user": "alice", "password": "..." },
//!   "slack": { "incomingWebHook": "https://hooks.slack.com/services/...", "icon": ":robot_face:", "channel": "#dev" }
//! }
//! ```

use crate::error::{AppError, AppResult};
use jira_api::JiraConfig;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

fn default_sprint_field() -> String {
    "customfield_10006".to_string()
}

fn default_story_points_field() -> String {
    "customfield_10004".to_string()
}

fn default_in_progress_status() -> String {
    "進行中".to_string()
}

fn default_excluded_status() -> String {
    "保留".to_string()
}

fn default_max_results() -> u32 {
    1000
}

fn default_request_interval_ms() -> u64 {
    jira_api::config::DEFAULT_COOLDOWN_MS
}

fn default_username() -> String {
    "jira-task".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub jira: JiraSettings,
    pub slack: SlackSettings,
}

/// Tracker endpoint, credentials and the project/field names the report reads.
#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JiraSettings {
    pub url: String,
    pub project: String,
    pub user: String,
    pub password: String,
    #[serde(default = "default_sprint_field")]
    pub sprint_field: String,
    #[serde(default = "default_story_points_field")]
    pub story_points_field: String,
    #[serde(default = "default_in_progress_status")]
    pub in_progress_status: String,
    #[serde(default = "default_excluded_status")]
    pub excluded_status: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Minimum pause between Jira requests, in milliseconds.
    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: u64,
}

impl JiraSettings {
    pub fn client_config(&self) -> JiraConfig {
        JiraConfig::new(self.url.clone(), self.user.clone(), self.password.clone())
            .with_user_agent(concat!("sprint-report/", env!("CARGO_PKG_VERSION")))
            .with_cooldown(Duration::from_millis(self.request_interval_ms))
    }
}

impl fmt::Debug for JiraSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraSettings")
            .field("url", &self.url)
            .field("project", &self.project)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("sprint_field", &self.sprint_field)
            .field("story_points_field", &self.story_points_field)
            .field("in_progress_status", &self.in_progress_status)
            .field("excluded_status", &self.excluded_status)
            .field("max_results", &self.max_results)
            .field("request_interval_ms", &self.request_interval_ms)
            .finish()
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SlackSettings {
    #[serde(rename = "incomingWebHook")]
    pub incoming_webhook: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default = "default_username")]
    pub username: String,
}

impl Config {
    /// Reads and validates the config file. Any failure is fatal for the run.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("cannot read {}: {err}", path.display())))?;
        Self::from_json(&content)
            .map_err(|err| AppError::Config(format!("{}: {err}", path.display())))
    }

    pub fn from_json(content: &str) -> AppResult<Self> {
        let config: Config =
            serde_json::from_str(content).map_err(|err| AppError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        let required = [
            ("jira.url", &self.jira.url),
            ("jira.project", &self.jira.project),
            ("jira.user", &self.jira.user),
            ("slack.incomingWebHook", &self.slack.incoming_webhook),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{name} must not be empty")));
            }
        }
        if self.jira.max_results == 0 {
            return Err(AppError::Config("jira.maxResults must be positive".into()));
        }
        Ok(())
    }
}
