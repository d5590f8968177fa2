use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<NamedRef>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NamedRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl Issue {
    pub fn summary(&self) -> &str {
        self.fields.summary.as_deref().unwrap_or_default()
    }

    pub fn status_name(&self) -> &str {
        self.fields
            .status
            .as_ref()
            .and_then(|status| status.name.as_deref())
            .unwrap_or_default()
    }
}

/// One page of `GET /search`.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub start_at: u32,
    pub max_results: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            start_at: 0,
            max_results: 1000,
        }
    }
}
