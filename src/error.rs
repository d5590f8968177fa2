//! Application-level error type; everything here aborts the run.

use jira_api::JiraError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("template error: {0}")]
    Template(String),
    #[error("tracker error: {0}")]
    Tracker(#[from] JiraError),
    #[error("dispatch error: {0}")]
    Dispatch(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Dispatch(err.to_string())
    }
}
