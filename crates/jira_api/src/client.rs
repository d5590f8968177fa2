use crate::auth::{acquire_session_cookie, SessionCookie};
use crate::config::JiraConfig;
use crate::error::{JiraError, Result};
use crate::models::{extract_custom_fields, CustomFields, Issue, SearchOptions, SearchPage};
use crate::pacing::RequestPacer;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE, USER_AGENT};
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

const SEARCH_FIELDS: &str = "summary,status";

#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    config: JiraConfig,
    pacer: RequestPacer,
    session: Option<SessionCookie>,
}

impl JiraClient {
    /// Anonymous client; call [`JiraClient::login`] before touching protected resources.
    pub fn new(config: JiraConfig) -> Result<Self> {
        let http = build_http_client(&config, None)?;
        let pacer = RequestPacer::new(config.cooldown);
        Ok(Self {
            http,
            config,
            pacer,
            session: None,
        })
    }

    /// Builds a client and authenticates it in one step.
    pub async fn connect(config: JiraConfig) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.login().await?;
        Ok(client)
    }

    /// Acquires a session cookie and attaches it to every subsequent request.
    pub async fn login(&mut self) -> Result<()> {
        self.pacer.pace().await;
        let cookie = acquire_session_cookie(&self.http, &self.config).await?;
        self.http = build_http_client(&self.config, Some(&cookie))?;
        tracing::info!(user = %self.config.username, "jira: session established");
        self.session = Some(cookie);
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub async fn get_with_query<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.pacer.pace().await;
        let response = self.http.get(self.url_for(path)).query(query).send().await?;
        Self::parse_json(response).await
    }

    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.get_with_query(path, &[]).await
    }

    /// Runs a JQL search, following `startAt` pages until `options.max_results`
    /// issues are collected or the server runs out of matches.
    pub async fn search_issues(&self, jql: &str, options: &SearchOptions) -> Result<Vec<Issue>> {
        let mut issues: Vec<Issue> = Vec::new();
        let mut start_at = options.start_at;
        let cap = options.max_results as usize;

        while issues.len() < cap {
            let remaining = (cap - issues.len()) as u32;
            let page = self.search_page(jql, start_at, remaining).await?;
            let received = page.issues.len() as u32;
            tracing::debug!(
                start_at,
                received,
                total = page.total,
                "jira: search page fetched"
            );
            issues.extend(page.issues);
            start_at = start_at.saturating_add(received);
            if received == 0 || start_at >= page.total {
                break;
            }
        }

        issues.truncate(cap);
        Ok(issues)
    }

    pub async fn search_page(&self, jql: &str, start_at: u32, max_results: u32) -> Result<SearchPage> {
        let query = [
            ("jql", jql.to_string()),
            ("startAt", start_at.to_string()),
            ("maxResults", max_results.to_string()),
            ("fields", SEARCH_FIELDS.to_string()),
        ];
        self.get_with_query("search", &query).await
    }

    pub async fn get_issue_raw(&self, issue_id: &str) -> Result<Value> {
        let path = format!("issue/{}", issue_id);
        self.get(&path).await
    }

    /// Fetches an issue and returns its `customfield_*` values as text.
    pub async fn get_custom_fields(&self, issue_id: &str) -> Result<CustomFields> {
        let raw = self.get_issue_raw(issue_id).await?;
        Ok(extract_custom_fields(&raw))
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(JiraError::from)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(JiraError::from_response_body(status, &body))
        }
    }
}

fn build_http_client(config: &JiraConfig, session: Option<&SessionCookie>) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    if let Some(cookie) = session {
        let mut value = header_value(cookie.header_value())?;
        value.set_sensitive(true);
        headers.insert(COOKIE, value);
    }

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| JiraError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| JiraError::Other(err.to_string()))
}
