use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "sprint-report";
pub const DEFAULT_COOLDOWN_MS: u64 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const REST_API_PATH: &str = "rest/api/2";
pub const SESSION_PATH: &str = "rest/auth/1/session";

#[derive(Clone, Debug)]
pub struct JiraConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub cooldown: Duration,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl JiraConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn with_cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = duration;
        self
    }

    /// Base URL with exactly one trailing slash.
    pub fn site_root(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    pub fn api_root(&self) -> String {
        format!("{}{}/", self.site_root(), REST_API_PATH)
    }

    pub fn session_url(&self) -> String {
        format!("{}{}", self.site_root(), SESSION_PATH)
    }
}
