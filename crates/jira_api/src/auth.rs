use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::JiraConfig;
use crate::error::{JiraError, Result};

/// Session cookie handed out by `POST /rest/auth/1/session`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

impl SessionCookie {
    /// Value for the `Cookie` request header.
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session: SessionCookie,
}

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    username: &'a str,
    password: &'a str,
}

pub async fn acquire_session_cookie(http: &Client, config: &JiraConfig) -> Result<SessionCookie> {
    tracing::debug!(user = %config.username, "jira: acquiring session cookie");
    let payload = SessionRequest {
        username: &config.username,
        password: &config.password,
    };
    let response = http.post(config.session_url()).json(&payload).send().await?;

    let status = response.status();
    if status.is_success() {
        let parsed = response
            .json::<SessionResponse>()
            .await
            .map_err(JiraError::from)?;
        Ok(parsed.session)
    } else {
        let body = response.text().await.unwrap_or_default();
        match JiraError::from_response_body(status, &body) {
            JiraError::Http { status, .. } if status.is_client_error() => Err(
                JiraError::Authentication(format!("login rejected ({status})")),
            ),
            other => Err(other),
        }
    }
}
