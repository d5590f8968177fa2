//! Typed Jira REST client used by the sprint report job.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod pacing;

pub use auth::SessionCookie;
pub use client::JiraClient;
pub use config::JiraConfig;
pub use error::{JiraError, Result};
pub use models::{CustomFields, Issue, IssueFields, NamedRef, SearchOptions, SearchPage};
