use clap::Parser;
use std::path::PathBuf;

/// Posts the current sprint's progress from Jira to Slack.
#[derive(Parser, Debug, Clone)]
#[command(name = "sprint-report", version)]
pub struct Args {
    /// JSON file with `jira` and `slack` sections.
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,
    /// Message template; the built-in one is used when omitted.
    #[arg(long)]
    pub template: Option<PathBuf>,
    /// Print the rendered message instead of posting it.
    #[arg(long)]
    pub dry_run: bool,
}
