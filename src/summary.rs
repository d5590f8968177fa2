//! Aggregation of sprint issues into the report figures.

use crate::calendar::remaining_working_days;
use crate::sprint::SprintDescriptor;
use std::collections::HashMap;

/// One issue as seen by the aggregation: already joined with its custom fields.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRecord {
    pub key: String,
    pub summary: String,
    pub status_name: String,
    pub story_points: f64,
    pub sprint_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusSummary {
    pub status: String,
    pub total_points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorySummary {
    pub title: String,
    pub points: f64,
}

/// Points burned per remaining working day of the active sprint, when it can be computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Velocity {
    PerDay {
        points_per_day: f64,
        working_days: u32,
    },
    /// No processed issue belonged to an `ACTIVE` sprint.
    NoActiveSprint,
    /// The active sprint had unusable dates or no weekdays in its range.
    NoWorkingDays,
}

impl Velocity {
    pub fn points_per_day(&self) -> Option<f64> {
        match self {
            Velocity::PerDay { points_per_day, .. } => Some(*points_per_day),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SprintReport {
    pub stories_in_progress: Vec<StorySummary>,
    pub total_points: f64,
    pub velocity: Velocity,
    pub status_totals: HashMap<String, StatusSummary>,
    pub active_sprint: Option<SprintDescriptor>,
}

impl SprintReport {
    /// Status totals ordered by status name.
    pub fn sorted_status_totals(&self) -> Vec<&StatusSummary> {
        let mut totals = self.status_totals.values().collect::<Vec<_>>();
        totals.sort_by(|a, b| a.status.cmp(&b.status));
        totals
    }
}

/// Folds issues in input order. When several issues carry an `ACTIVE`
/// sprint, the one seen last is the sprint the velocity is computed for.
pub fn summarize(issues: &[IssueRecord], in_progress_status: &str) -> SprintReport {
    let mut total_points = 0.0;
    let mut status_totals: HashMap<String, StatusSummary> = HashMap::new();
    let mut stories_in_progress = Vec::new();
    let mut active_sprint: Option<SprintDescriptor> = None;

    for issue in issues {
        let sprint = SprintDescriptor::parse(&issue.sprint_text);

        total_points += issue.story_points;
        status_totals
            .entry(issue.status_name.clone())
            .or_insert_with(|| StatusSummary {
                status: issue.status_name.clone(),
                total_points: 0.0,
            })
            .total_points += issue.story_points;

        if issue.status_name == in_progress_status {
            stories_in_progress.push(StorySummary {
                title: issue.summary.clone(),
                points: issue.story_points,
            });
        }

        if sprint.is_active() {
            if let Some(previous) = &active_sprint {
                if previous.id != sprint.id {
                    log::debug!(
                        "summary: {} switches active sprint from {} to {}",
                        issue.key,
                        previous.id,
                        sprint.id
                    );
                }
            }
            active_sprint = Some(sprint);
        }
    }

    let velocity = velocity_for(total_points, active_sprint.as_ref());

    SprintReport {
        stories_in_progress,
        total_points,
        velocity,
        status_totals,
        active_sprint,
    }
}

fn velocity_for(total_points: f64, sprint: Option<&SprintDescriptor>) -> Velocity {
    let Some(sprint) = sprint else {
        return Velocity::NoActiveSprint;
    };
    let (Some(start), Some(end)) = (sprint.start_date, sprint.end_date) else {
        log::warn!("summary: active sprint {} has no usable date range", sprint.id);
        return Velocity::NoWorkingDays;
    };
    let working_days = remaining_working_days(start.date(), end.date());
    if working_days == 0 {
        log::warn!("summary: active sprint {} spans no working days", sprint.id);
        return Velocity::NoWorkingDays;
    }
    Velocity::PerDay {
        points_per_day: total_points / f64::from(working_days),
        working_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprint::SprintState;

    const ACTIVE_197: &str = "[com.atlassian.greenhopper.service.sprint.Sprint@71f556[id=197,rapidViewId=38,state=ACTIVE,name=S54,startDate=2016-06-21T09:52:08.106+09:00,endDate=2016-06-29T09:52:00.000+09:00,completeDate=<null>,sequence=156]]";
    const CLOSED_196: &str = "[com.atlassian.greenhopper.service.sprint.Sprint@5e2a1b[id=196,rapidViewId=38,state=CLOSED,name=S53,startDate=2016-06-13T09:00:00.000+09:00,endDate=2016-06-20T18:00:00.000+09:00,completeDate=2016-06-20T18:30:00.000+09:00,sequence=155]]";
    const ACTIVE_198_ONE_WEEK: &str = "[com.atlassian.greenhopper.service.sprint.Sprint@1a2b3c[id=198,state=ACTIVE,name=S55,startDate=2016-07-04T09:00:00.000+09:00,endDate=2016-07-10T18:00:00.000+09:00]]";

    fn issue(key: &str, status: &str, points: f64, sprint: &str) -> IssueRecord {
        IssueRecord {
            key: key.to_string(),
            summary: format!("{key} summary"),
            status_name: status.to_string(),
            story_points: points,
            sprint_text: sprint.to_string(),
        }
    }

    #[test]
    fn empty_input_produces_empty_report_without_active_sprint() {
        let report = summarize(&[], "進行中");
        assert_eq!(report.total_points, 0.0);
        assert!(report.status_totals.is_empty());
        assert!(report.stories_in_progress.is_empty());
        assert!(report.active_sprint.is_none());
        assert_eq!(report.velocity, Velocity::NoActiveSprint);
    }

    #[test]
    fn active_and_closed_sprint_scenario() {
        let issues = vec![
            issue("PRJ-1", "進行中", 3.0, ACTIVE_197),
            issue("PRJ-2", "Done", 2.0, CLOSED_196),
        ];
        let report = summarize(&issues, "進行中");

        assert_eq!(report.total_points, 5.0);
        assert_eq!(report.status_totals.len(), 2);
        assert_eq!(report.status_totals["進行中"].total_points, 3.0);
        assert_eq!(report.status_totals["Done"].total_points, 2.0);
        assert_eq!(
            report.stories_in_progress,
            vec![StorySummary {
                title: "PRJ-1 summary".to_string(),
                points: 3.0
            }]
        );

        let sprint = report.active_sprint.as_ref().expect("active sprint");
        assert_eq!(sprint.id, 197);
        assert_eq!(sprint.state, SprintState::Active);
        assert_eq!(
            report.velocity,
            Velocity::PerDay {
                points_per_day: 5.0 / 7.0,
                working_days: 7
            }
        );
    }

    #[test]
    fn shared_status_accumulates_into_one_entry() {
        let issues = vec![
            issue("PRJ-1", "Done", 1.5, CLOSED_196),
            issue("PRJ-2", "Done", 2.5, CLOSED_196),
        ];
        let report = summarize(&issues, "進行中");
        assert_eq!(report.status_totals.len(), 1);
        assert_eq!(report.status_totals["Done"].status, "Done");
        assert_eq!(report.status_totals["Done"].total_points, 4.0);
    }

    #[test]
    fn last_active_sprint_in_input_order_wins() {
        // Not the first match: the final ACTIVE descriptor decides the range.
        let issues = vec![
            issue("PRJ-1", "To Do", 5.0, ACTIVE_197),
            issue("PRJ-2", "To Do", 5.0, ACTIVE_198_ONE_WEEK),
        ];
        let report = summarize(&issues, "進行中");
        assert_eq!(report.active_sprint.as_ref().map(|s| s.id), Some(198));
        assert_eq!(
            report.velocity,
            Velocity::PerDay {
                points_per_day: 2.0,
                working_days: 5
            }
        );

        let reversed: Vec<_> = issues.into_iter().rev().collect();
        let report = summarize(&reversed, "進行中");
        assert_eq!(report.active_sprint.as_ref().map(|s| s.id), Some(197));
    }

    #[test]
    fn closed_issue_after_active_one_keeps_active_sprint() {
        let issues = vec![
            issue("PRJ-1", "Done", 1.0, ACTIVE_197),
            issue("PRJ-2", "Done", 1.0, CLOSED_196),
        ];
        let report = summarize(&issues, "進行中");
        assert_eq!(report.active_sprint.as_ref().map(|s| s.id), Some(197));
    }

    #[test]
    fn zero_point_issue_still_listed_in_progress() {
        let issues = vec![
            issue("PRJ-1", "進行中", 0.0, ACTIVE_197),
            issue("PRJ-2", "進行中", 2.0, ACTIVE_197),
        ];
        let report = summarize(&issues, "進行中");
        let titles: Vec<_> = report
            .stories_in_progress
            .iter()
            .map(|story| story.title.as_str())
            .collect();
        assert_eq!(titles, vec!["PRJ-1 summary", "PRJ-2 summary"]);
        assert_eq!(report.stories_in_progress[0].points, 0.0);
        assert_eq!(report.status_totals["進行中"].total_points, 2.0);
    }

    #[test]
    fn no_active_sprint_leaves_velocity_unavailable() {
        let issues = vec![issue("PRJ-1", "Done", 3.0, CLOSED_196)];
        let report = summarize(&issues, "進行中");
        assert_eq!(report.total_points, 3.0);
        assert_eq!(report.velocity, Velocity::NoActiveSprint);
        assert_eq!(report.velocity.points_per_day(), None);
    }

    #[test]
    fn active_sprint_without_dates_has_no_working_days() {
        let issues = vec![issue("PRJ-1", "Done", 3.0, "[Sprint@1[id=9,state=ACTIVE]]")];
        let report = summarize(&issues, "進行中");
        assert_eq!(report.velocity, Velocity::NoWorkingDays);
    }

    #[test]
    fn weekend_only_sprint_has_no_working_days() {
        let weekend = "[Sprint@1[id=9,state=ACTIVE,startDate=2016-06-25T09:00:00.000,endDate=2016-06-26T18:00:00.000]]";
        let report = summarize(&[issue("PRJ-1", "Done", 3.0, weekend)], "進行中");
        assert_eq!(report.velocity, Velocity::NoWorkingDays);
    }

    #[test]
    fn sorted_status_totals_are_ordered_by_name() {
        let issues = vec![
            issue("PRJ-1", "To Do", 1.0, CLOSED_196),
            issue("PRJ-2", "Done", 1.0, CLOSED_196),
            issue("PRJ-3", "In Review", 1.0, CLOSED_196),
        ];
        let report = summarize(&issues, "進行中");
        let names: Vec<_> = report
            .sorted_status_totals()
            .into_iter()
            .map(|summary| summary.status.as_str())
            .collect();
        assert_eq!(names, vec!["Done", "In Review", "To Do"]);
    }
}
