//! Follow-up agenda: backend follow-up rules rendered as bucketed tasks.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, Utc};
use leadsbox_tasks::{
    categorise_tasks, map_follow_up_to_task_at, parse_follow_ups, Bucket, Task, TaskBuckets,
};
use tracing::info;

/// Parse `--at`, or take the local time when absent.
pub fn reference_time(at: Option<&str>) -> Result<DateTime<FixedOffset>> {
    match at {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid --at timestamp: {}", raw)),
        None => Ok(Local::now().fixed_offset()),
    }
}

/// Map a follow-up payload to tasks and bucket them relative to `reference`.
///
/// Rules without a usable scheduled time fall due at `reference`.
pub fn build_agenda(payload: &str, reference: &DateTime<FixedOffset>) -> Result<TaskBuckets> {
    let now = reference.with_timezone(&Utc);
    let tasks: Vec<Task> = parse_follow_ups(payload)?
        .iter()
        .map(|rule| map_follow_up_to_task_at(rule, now))
        .collect();
    info!(tasks = tasks.len(), reference = %reference, "Categorising follow-ups");
    Ok(categorise_tasks(tasks, reference))
}

pub fn load_agenda(path: &Path, reference: &DateTime<FixedOffset>) -> Result<TaskBuckets> {
    let payload =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    build_agenda(&payload, reference)
}

/// Plain-text agenda, one section per non-empty bucket.
pub fn render_agenda<W: Write>(
    buckets: &TaskBuckets,
    reference: &DateTime<FixedOffset>,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Follow-ups as of {}", reference.format("%Y-%m-%d %H:%M %:z"))?;

    if buckets.is_empty() {
        writeln!(out, "\nNothing scheduled.")?;
        return Ok(());
    }

    for bucket in Bucket::ALL {
        let tasks = buckets.get(bucket);
        if tasks.is_empty() {
            continue;
        }
        writeln!(out, "\n{} ({})", bucket.label(), tasks.len())?;
        for task in tasks {
            writeln!(out, "  {}", task_line(task, reference))?;
        }
    }

    Ok(())
}

fn task_line(task: &Task, reference: &DateTime<FixedOffset>) -> String {
    let due = task
        .due_at()
        .map(|due| {
            due.with_timezone(&reference.timezone())
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| task.due_date.clone());

    let mut line = format!("{:<6} {}  {}", task.priority.as_str(), due, task.title);
    if let Some(lead) = task.lead_name.as_deref().or(task.lead_id.as_deref()) {
        line.push_str(&format!("  [{}]", lead));
    }
    if !task.description.is_empty() {
        line.push_str(&format!(" - {}", task.description));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"data": [
        {"id": "a", "status": "SCHEDULED", "scheduledTime": "2025-03-09T08:00:00Z",
         "provider": "EMAIL", "lead": {"id": "l1", "name": "Ada"}},
        {"id": "b", "status": "SCHEDULED", "scheduledTime": "2025-03-10T16:00:00Z",
         "message": "Send the quote", "metadata": {"priority": "high", "title": "Quote"}},
        {"id": "c", "status": "SENT", "scheduledTime": "2025-03-01T08:00:00Z"},
        {"id": "d", "status": "SCHEDULED"}
    ]}"#;

    fn reference() -> DateTime<FixedOffset> {
        reference_time(Some("2025-03-10T12:00:00+01:00")).unwrap()
    }

    #[test]
    fn buckets_payload() {
        let buckets = build_agenda(PAYLOAD, &reference()).unwrap();
        assert_eq!(buckets.overdue[0].id, "a");
        assert_eq!(buckets.today.len(), 2);
        assert_eq!(buckets.completed[0].id, "c");
        assert!(buckets.upcoming.is_empty());
    }

    #[test]
    fn missing_schedule_is_due_now() {
        let buckets = build_agenda(PAYLOAD, &reference()).unwrap();
        let d = buckets.today.iter().find(|t| t.id == "d").unwrap();
        assert_eq!(d.due_date, "2025-03-10T11:00:00.000Z");
    }

    #[test]
    fn renders_sections() {
        let reference = reference();
        let buckets = build_agenda(PAYLOAD, &reference).unwrap();
        let mut out = Vec::new();
        render_agenda(&buckets, &reference, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Follow-ups as of 2025-03-10 12:00 +01:00"));
        assert!(text.contains("Overdue (1)"));
        assert!(text.contains("Today (2)"));
        assert!(text.contains("HIGH   2025-03-10 17:00  Quote - Send the quote"));
        assert!(text.contains("[Ada]"));
        assert!(!text.contains("Cancelled"));
    }

    #[test]
    fn empty_agenda() {
        let reference = reference();
        let mut out = Vec::new();
        render_agenda(&TaskBuckets::default(), &reference, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Nothing scheduled."));
    }

    #[test]
    fn rejects_bad_reference() {
        assert!(reference_time(Some("tomorrow")).is_err());
    }
}
