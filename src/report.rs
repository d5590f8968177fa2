//! End-to-end report run: collect, summarise, render, deliver.

use crate::config::Config;
use crate::error::AppResult;
use crate::slack::{MessageSink, SlackMessage};
use crate::source::{collect_issues, IssueSource};
use crate::summary::{summarize, SprintReport, Velocity};
use crate::template::ReportTemplate;

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub report: SprintReport,
    pub text: String,
    pub skipped: Vec<String>,
    pub delivered: bool,
}

/// One batch run. Errors from the search or the dispatch abort the run;
/// per-issue lookup failures only shrink the report.
pub async fn run_report<S, M>(
    config: &Config,
    template: &ReportTemplate,
    source: &S,
    sink: &M,
    dry_run: bool,
) -> AppResult<RunOutcome>
where
    S: IssueSource + ?Sized,
    M: MessageSink + ?Sized,
{
    let collected = collect_issues(source, &config.jira).await?;
    if !collected.skipped.is_empty() {
        log::warn!(
            "report: {} issue(s) left out: {}",
            collected.skipped.len(),
            collected.skipped.join(", ")
        );
    }

    let report = summarize(&collected.records, &config.jira.in_progress_status);
    log_velocity(&report);

    let text = template.render(&report);
    log::info!("report: rendered message\n{}", text);

    let delivered = if dry_run {
        println!("{text}");
        false
    } else {
        let message = SlackMessage::new(text.clone(), &config.slack);
        let response = sink.deliver(&message).await?;
        log::info!("report: webhook response {}", response);
        true
    };

    Ok(RunOutcome {
        report,
        text,
        skipped: collected.skipped,
        delivered,
    })
}

fn log_velocity(report: &SprintReport) {
    match report.velocity {
        Velocity::PerDay {
            points_per_day,
            working_days,
        } => log::info!(
            "report: {} pt over {} working days ({:.2} pt/day)",
            report.total_points,
            working_days,
            points_per_day
        ),
        Velocity::NoActiveSprint => {
            log::warn!("report: no active sprint among collected issues; average omitted")
        }
        Velocity::NoWorkingDays => {
            log::warn!("report: active sprint has no working days; average omitted")
        }
    }
}
