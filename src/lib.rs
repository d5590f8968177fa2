use clap::Parser;
use jira_api::JiraClient;
use log::{error, info};
use std::process::ExitCode;

pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod slack;
pub mod source;
pub mod sprint;
pub mod summary;
pub mod template;

pub use config::{Config, JiraSettings, SlackSettings};
pub use error::{AppError, AppResult};
pub use report::{run_report, RunOutcome};
pub use slack::{MessageSink, SlackMessage, SlackWebhook};
pub use source::{collect_issues, IssueSource};
pub use sprint::{SprintDescriptor, SprintState};
pub use summary::{summarize, IssueRecord, SprintReport, StatusSummary, StorySummary, Velocity};
pub use template::ReportTemplate;

async fn execute(args: cli::Args) -> AppResult<RunOutcome> {
    let config = Config::load(&args.config)?;
    let template = match &args.template {
        Some(path) => ReportTemplate::load(path)?,
        None => ReportTemplate::default(),
    };

    let client = JiraClient::connect(config.jira.client_config()).await?;
    let sink = SlackWebhook::new(config.slack.incoming_webhook.clone())?;

    run_report(&config, &template, &client, &sink, args.dry_run).await
}

pub fn run() -> ExitCode {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    let args = cli::Args::parse();
    info!("Starting sprint report (config {})", args.config.display());

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("Failed to start async runtime: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(execute(args)) {
        Ok(outcome) => {
            info!(
                "Sprint report finished: {} pt total, {} skipped, delivered={}",
                outcome.report.total_points,
                outcome.skipped.len(),
                outcome.delivered
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Sprint report aborted: {}", err);
            ExitCode::FAILURE
        }
    }
}
