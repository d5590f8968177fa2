//! Tolerant extraction of sprint fields from Jira's sprint custom-field text.
//!
//! Jira Agile reports the sprint field as the `toString()` of its internal
//! sprint object, e.g.
//!
//! ```text
//! [com.atlassian.greenhopper.service.sprint.Sprint@71f556[id=197,rapidViewId=38,state=ACTIVE,name=S54,startDate=2016-06-21T09:52:08.106+09:00,endDate=2016-06-29T09:52:00.000+09:00,completeDate=<null>,sequence=156]]
//! ```
//!
//! None of this is a documented format, so every field is optional and a
//! malformed value only ever degrades that one field.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fmt;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const TIMESTAMP_LEN: usize = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SprintState {
    Active,
    Closed,
    Future,
    #[default]
    Unknown,
}

impl SprintState {
    pub fn from_raw(value: &str) -> Self {
        match value {
            "ACTIVE" => SprintState::Active,
            "CLOSED" => SprintState::Closed,
            "FUTURE" => SprintState::Future,
            _ => SprintState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SprintState::Active => "ACTIVE",
            SprintState::Closed => "CLOSED",
            SprintState::Future => "FUTURE",
            SprintState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for SprintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sprint fields recovered from descriptor text. Absent or malformed values
/// fall back to `0`, the empty string, [`SprintState::Unknown`] or `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SprintDescriptor {
    pub id: i64,
    pub name: String,
    pub state: SprintState,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
}

impl SprintDescriptor {
    pub fn parse(raw: &str) -> Self {
        let fields = descriptor_fields(raw);
        let value = |key: &str| fields.get(key).copied().unwrap_or_default();

        let state_text = value("state");
        let state = SprintState::from_raw(state_text);
        if state == SprintState::Unknown && !state_text.is_empty() {
            log::debug!("sprint: unrecognised state {:?}", state_text);
        }

        Self {
            id: value("id").parse().unwrap_or(0),
            name: value("name").to_string(),
            state,
            start_date: parse_timestamp(value("startDate")),
            end_date: parse_timestamp(value("endDate")),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == SprintState::Active
    }
}

/// Text between the second `[` and the next `]`, or empty when there is no second `[`.
fn inner_section(raw: &str) -> &str {
    let Some(section) = raw.split('[').nth(2) else {
        return "";
    };
    section.split(']').next().unwrap_or_default()
}

fn descriptor_fields(raw: &str) -> HashMap<&str, &str> {
    inner_section(raw)
        .split(',')
        .filter_map(|token| token.split_once('='))
        .collect()
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let head = value.get(..TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(head, TIMESTAMP_FORMAT).ok()
}
