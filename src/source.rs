//! Issue collection: search the tracker, then join each hit with its custom fields.

use crate::config::JiraSettings;
use crate::error::AppResult;
use crate::summary::IssueRecord;
use async_trait::async_trait;
use jira_api::{CustomFields, Issue, JiraClient, SearchOptions};

/// Tracker reads the report depends on.
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn search(&self, jql: &str, options: &SearchOptions) -> jira_api::Result<Vec<Issue>>;
    async fn custom_fields(&self, issue_id: &str) -> jira_api::Result<CustomFields>;
}

#[async_trait]
impl IssueSource for JiraClient {
    async fn search(&self, jql: &str, options: &SearchOptions) -> jira_api::Result<Vec<Issue>> {
        self.search_issues(jql, options).await
    }

    async fn custom_fields(&self, issue_id: &str) -> jira_api::Result<CustomFields> {
        self.get_custom_fields(issue_id).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collected {
    pub records: Vec<IssueRecord>,
    /// Keys of issues dropped because their custom fields could not be fetched.
    pub skipped: Vec<String>,
}

/// Issues of the user's open sprints in the project, minus the excluded status.
pub fn open_sprint_jql(settings: &JiraSettings) -> String {
    format!(
        "project = {} AND sprint in openSprints() AND status != {} AND assignee = {}",
        quote_jql(&settings.project),
        quote_jql(&settings.excluded_status),
        quote_jql(&settings.user)
    )
}

/// JQL keywords that must be quoted when used as values.
const RESERVED_WORDS: &[&str] = &["and", "or", "not", "empty", "null", "order", "by", "in", "is"];

/// Leaves plain identifiers alone, quotes anything else. `.` and `@` are
/// reserved in JQL, so email-style user names always end up quoted.
fn quote_jql(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
        && !RESERVED_WORDS.contains(&value.to_lowercase().as_str());
    if plain {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// Runs the search (failure aborts) and fetches custom fields per issue
/// (failure skips that issue only).
pub async fn collect_issues<S>(source: &S, settings: &JiraSettings) -> AppResult<Collected>
where
    S: IssueSource + ?Sized,
{
    let jql = open_sprint_jql(settings);
    let options = SearchOptions {
        start_at: 0,
        max_results: settings.max_results,
    };
    log::debug!("source: searching with jql={}", jql);
    let issues = source.search(&jql, &options).await?;
    log::info!("source: {} issues in open sprints", issues.len());

    let mut collected = Collected::default();
    for issue in issues {
        match source.custom_fields(&issue.id).await {
            Ok(fields) => collected.records.push(to_record(&issue, &fields, settings)),
            Err(err) => {
                log::warn!("source: skipping {} ({})", issue.key, err);
                collected.skipped.push(issue.key);
            }
        }
    }
    Ok(collected)
}

fn to_record(issue: &Issue, fields: &CustomFields, settings: &JiraSettings) -> IssueRecord {
    let points_text = fields
        .get(&settings.story_points_field)
        .map(String::as_str)
        .unwrap_or_default();
    IssueRecord {
        key: issue.key.clone(),
        summary: issue.summary().to_string(),
        status_name: issue.status_name().to_string(),
        story_points: parse_points(points_text),
        sprint_text: fields
            .get(&settings.sprint_field)
            .cloned()
            .unwrap_or_default(),
    }
}

/// Unparsable or non-finite point values count as zero.
fn parse_points(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|points| points.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use jira_api::JiraError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeSource {
        issues: Vec<Issue>,
        fields: HashMap<String, CustomFields>,
        fail_search: bool,
        seen_jql: Mutex<Vec<String>>,
    }

    fn settings() -> JiraSettings {
        Config::from_json(
            r#"{"jira": {"url": "https://jira", "project": "PRJ", "user": "alice", "password": "p"},
                "slack": {"incomingWebHook": "https://hooks"}}"#,
        )
        .unwrap()
        .jira
    }

    fn issue(id: &str, key: &str, status: &str) -> Issue {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "key": key,
            "fields": {"summary": format!("{key} work"), "status": {"name": status}}
        }))
        .unwrap()
    }

    fn fields(points: &str, sprint: &str) -> CustomFields {
        HashMap::from([
            ("customfield_10004".to_string(), points.to_string()),
            ("customfield_10006".to_string(), sprint.to_string()),
        ])
    }

    #[async_trait]
    impl IssueSource for FakeSource {
        async fn search(&self, jql: &str, _options: &SearchOptions) -> jira_api::Result<Vec<Issue>> {
            self.seen_jql.lock().unwrap().push(jql.to_string());
            if self.fail_search {
                return Err(JiraError::Authentication("expired".into()));
            }
            Ok(self.issues.clone())
        }

        async fn custom_fields(&self, issue_id: &str) -> jira_api::Result<CustomFields> {
            self.fields
                .get(issue_id)
                .cloned()
                .ok_or_else(|| JiraError::Other(format!("no fields for {issue_id}")))
        }
    }

    #[test]
    fn jql_matches_open_sprint_filter() {
        assert_eq!(
            open_sprint_jql(&settings()),
            "project = PRJ AND sprint in openSprints() AND status != 保留 AND assignee = alice"
        );
    }

    #[test]
    fn jql_quotes_values_with_spaces() {
        let mut settings = settings();
        settings.excluded_status = "On Hold".to_string();
        assert!(open_sprint_jql(&settings).contains("status != \"On Hold\""));
    }

    #[test]
    fn jql_quotes_email_user_names() {
        let mut settings = settings();
        settings.user = "alice@example.com".to_string();
        assert_eq!(
            open_sprint_jql(&settings),
            "project = PRJ AND sprint in openSprints() AND status != 保留 AND assignee = \"alice@example.com\""
        );
    }

    #[test]
    fn jql_quotes_dotted_names_and_keywords() {
        assert_eq!(quote_jql("j.doe"), "\"j.doe\"");
        assert_eq!(quote_jql("Empty"), "\"Empty\"");
        assert_eq!(quote_jql("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote_jql("john-doe"), "john-doe");
    }

    #[test]
    fn points_parse_leniently() {
        assert_eq!(parse_points("3"), 3.0);
        assert_eq!(parse_points(" 2.5 "), 2.5);
        assert_eq!(parse_points("<nil>"), 0.0);
        assert_eq!(parse_points(""), 0.0);
        assert_eq!(parse_points("NaN"), 0.0);
    }

    #[tokio::test]
    async fn failed_lookup_skips_issue_and_continues() {
        let source = FakeSource {
            issues: vec![
                issue("1", "PRJ-1", "進行中"),
                issue("2", "PRJ-2", "Done"),
                issue("3", "PRJ-3", "Done"),
            ],
            fields: HashMap::from([
                ("1".to_string(), fields("3", "[S@1[id=1,state=ACTIVE]]")),
                ("3".to_string(), fields("<nil>", "")),
            ]),
            fail_search: false,
            seen_jql: Mutex::new(Vec::new()),
        };

        let collected = collect_issues(&source, &settings()).await.unwrap();

        assert_eq!(collected.skipped, vec!["PRJ-2".to_string()]);
        let keys: Vec<_> = collected.records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["PRJ-1", "PRJ-3"]);
        assert_eq!(collected.records[0].story_points, 3.0);
        assert_eq!(collected.records[0].status_name, "進行中");
        assert_eq!(collected.records[0].summary, "PRJ-1 work");
        assert_eq!(collected.records[0].sprint_text, "[S@1[id=1,state=ACTIVE]]");
        assert_eq!(collected.records[1].story_points, 0.0);
        assert_eq!(source.seen_jql.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn search_failure_aborts_collection() {
        let source = FakeSource {
            issues: Vec::new(),
            fields: HashMap::new(),
            fail_search: true,
            seen_jql: Mutex::new(Vec::new()),
        };
        assert!(collect_issues(&source, &settings()).await.is_err());
    }
}
