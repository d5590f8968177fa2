//! Message templates with a small mustache-like syntax.
//!
//! Variables: `{{total}}`, `{{average}}`, `{{working_days}}`, `{{sprint}}`,
//! and inside list sections `{{title}}` / `{{points}}` (stories) or
//! `{{status}}` / `{{points}}` (statuses).
//!
//! Sections: `{{#stories}}…{{/stories}}`, `{{#statuses}}…{{/statuses}}`
//! repeat per entry; `{{#velocity}}`, `{{#sprint}}` render when the value is
//! available. `{{^name}}…{{/name}}` renders when a section would not.

use crate::error::{AppError, AppResult};
use crate::summary::{SprintReport, StatusSummary, StorySummary, Velocity};
use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;

static TAG_REGEX: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"\{\{\s*([#^/]?)\s*([A-Za-z_]+)\s*\}\}").expect("invalid template tag regex")
});

pub const DEFAULT_TEMPLATE: &str = "\
*Sprint {{#sprint}}{{sprint}}{{/sprint}}{{^sprint}}(no active sprint){{/sprint}}*
Total: {{total}} pt{{#velocity}} / {{working_days}} working days = {{average}} pt/day{{/velocity}}{{^velocity}} (velocity unavailable){{/velocity}}
In progress:
{{#stories}}• {{title}} ({{points}} pt)
{{/stories}}{{^stories}}• nothing in progress
{{/stories}}By status:
{{#statuses}}• {{status}}: {{points}} pt
{{/statuses}}";

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

#[derive(Clone, Copy)]
enum Item<'a> {
    Story(&'a StorySummary),
    Status(&'a StatusSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTemplate {
    nodes: Vec<Node>,
}

impl Default for ReportTemplate {
    fn default() -> Self {
        // DEFAULT_TEMPLATE always parses.
        Self::parse(DEFAULT_TEMPLATE).unwrap_or(Self { nodes: Vec::new() })
    }
}

impl ReportTemplate {
    pub fn load(path: &Path) -> AppResult<Self> {
        let source = fs::read_to_string(path).map_err(|err| {
            AppError::Template(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::parse(&source)
    }

    pub fn parse(source: &str) -> AppResult<Self> {
        // Each stack frame: (section name, inverted, nodes collected so far).
        let mut stack: Vec<(String, bool, Vec<Node>)> = vec![(String::new(), false, Vec::new())];
        let mut cursor = 0;

        for captures in TAG_REGEX.captures_iter(source) {
            let whole = captures.get(0).map(|m| (m.start(), m.end())).unwrap_or((cursor, cursor));
            let sigil = captures.get(1).map_or("", |m| m.as_str());
            let name = captures.get(2).map_or("", |m| m.as_str()).to_string();

            if whole.0 > cursor {
                push_node(&mut stack, Node::Text(source[cursor..whole.0].to_string()));
            }
            cursor = whole.1;

            match sigil {
                "#" | "^" => stack.push((name, sigil == "^", Vec::new())),
                "/" => {
                    if stack.len() < 2 {
                        return Err(AppError::Template(format!("unexpected {{{{/{name}}}}}")));
                    }
                    let (open, inverted, children) = stack.pop().unwrap_or_default();
                    if open != name {
                        return Err(AppError::Template(format!(
                            "section {{{{{open}}}}} closed by {{{{/{name}}}}}"
                        )));
                    }
                    push_node(
                        &mut stack,
                        Node::Section {
                            name,
                            inverted,
                            children,
                        },
                    );
                }
                _ => push_node(&mut stack, Node::Var(name)),
            }
        }

        if cursor < source.len() {
            push_node(&mut stack, Node::Text(source[cursor..].to_string()));
        }
        if stack.len() > 1 {
            let open = stack.last().map(|frame| frame.0.clone()).unwrap_or_default();
            return Err(AppError::Template(format!("section {{{{{open}}}}} is never closed")));
        }

        let nodes = stack.pop().map(|frame| frame.2).unwrap_or_default();
        Ok(Self { nodes })
    }

    pub fn render(&self, report: &SprintReport) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, report, None, &mut out);
        out
    }
}

fn push_node(stack: &mut [(String, bool, Vec<Node>)], node: Node) {
    if let Some(frame) = stack.last_mut() {
        frame.2.push(node);
    }
}

fn render_nodes(nodes: &[Node], report: &SprintReport, item: Option<Item<'_>>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(name) => out.push_str(&lookup(name, report, item)),
            Node::Section {
                name,
                inverted,
                children,
            } => {
                let entries = section_entries(name, report);
                match (entries, *inverted) {
                    (Some(entries), false) => {
                        for entry in entries {
                            render_nodes(children, report, Some(entry), out);
                        }
                    }
                    (Some(entries), true) if entries.is_empty() => {
                        render_nodes(children, report, item, out)
                    }
                    (Some(_), true) => {}
                    (None, inverted) => {
                        if is_present(name, report) != inverted {
                            render_nodes(children, report, item, out);
                        }
                    }
                }
            }
        }
    }
}

fn section_entries<'a>(name: &str, report: &'a SprintReport) -> Option<Vec<Item<'a>>> {
    match name {
        "stories" => Some(report.stories_in_progress.iter().map(Item::Story).collect()),
        "statuses" => Some(
            report
                .sorted_status_totals()
                .into_iter()
                .map(Item::Status)
                .collect(),
        ),
        _ => None,
    }
}

fn is_present(name: &str, report: &SprintReport) -> bool {
    match name {
        "velocity" | "average" => report.velocity.points_per_day().is_some(),
        "sprint" => report.active_sprint.is_some(),
        _ => false,
    }
}

fn lookup(name: &str, report: &SprintReport, item: Option<Item<'_>>) -> String {
    match (name, item) {
        ("title", Some(Item::Story(story))) => return story.title.clone(),
        ("points", Some(Item::Story(story))) => return format_points(story.points),
        ("status", Some(Item::Status(status))) => return status.status.clone(),
        ("points", Some(Item::Status(status))) => return format_points(status.total_points),
        _ => {}
    }
    match name {
        "total" => format_points(report.total_points),
        "average" => report
            .velocity
            .points_per_day()
            .map(|avg| format!("{avg:.2}"))
            .unwrap_or_default(),
        "working_days" => match report.velocity {
            Velocity::PerDay { working_days, .. } => working_days.to_string(),
            _ => String::new(),
        },
        "sprint" => report
            .active_sprint
            .as_ref()
            .map(|sprint| sprint.name.clone())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Whole numbers print without a fraction, others as-is (`3`, `2.5`).
fn format_points(points: f64) -> String {
    points.to_string()
}
