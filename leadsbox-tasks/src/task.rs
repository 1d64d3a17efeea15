//! Display tasks derived from follow-up rules.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::rule::FollowUpRule;

/// Task state shown in the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Map a follow-up status onto a task status.
    ///
    /// `SENT` completes the task and `CANCELLED` cancels it. `SCHEDULED`,
    /// `FAILED` and anything unrecognised leave it pending.
    pub fn from_follow_up_status(status: Option<&str>) -> Self {
        match status.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
            Some("SENT") => TaskStatus::Completed,
            Some("CANCELLED") => TaskStatus::Cancelled,
            _ => TaskStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Parse a free-form priority label. Case and surrounding space are ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Some(Priority::High),
            "MEDIUM" => Some(Priority::Medium),
            "LOW" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A follow-up rule normalized for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    /// RFC 3339 timestamp in UTC with millisecond precision.
    pub due_date: String,
    pub lead_id: Option<String>,
    pub lead_name: Option<String>,
    pub thread_id: Option<String>,
    pub provider: Option<String>,
    pub template_name: Option<String>,
}

impl Task {
    /// The due date as an instant, if it parses.
    ///
    /// Accepts everything [`parse_due_date`] does; RFC 3339 input keeps its
    /// own offset, the other forms come back in UTC.
    pub fn due_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.due_date.trim())
            .ok()
            .or_else(|| parse_due_date(&self.due_date).map(|due| due.fixed_offset()))
    }
}

/// Map a follow-up rule to a task, using the current time as the fallback
/// due date.
pub fn map_follow_up_to_task(rule: &FollowUpRule) -> Task {
    map_follow_up_to_task_at(rule, Utc::now())
}

/// Map a follow-up rule to a task. `now` is used when the rule has no
/// usable scheduled time.
pub fn map_follow_up_to_task_at(rule: &FollowUpRule, now: DateTime<Utc>) -> Task {
    let metadata = rule.metadata_object().unwrap_or_default();

    let due = match rule.scheduled_time.as_deref() {
        Some(raw) => parse_due_date(raw).unwrap_or_else(|| {
            debug!(id = %rule.id, scheduled_time = raw, "Unparseable scheduled time, using now");
            now
        }),
        None => now,
    };

    let template_name = rule
        .template
        .as_ref()
        .and_then(|t| non_empty(t.name.as_deref()));

    Task {
        id: rule.id.clone(),
        title: resolve_title(&metadata, template_name, rule.provider.as_deref()),
        description: resolve_description(&metadata, rule),
        priority: metadata_str(&metadata, "priority")
            .and_then(Priority::from_label)
            .unwrap_or_default(),
        status: TaskStatus::from_follow_up_status(rule.status.as_deref()),
        due_date: due.to_rfc3339_opts(SecondsFormat::Millis, true),
        lead_id: rule
            .lead_id
            .clone()
            .or_else(|| rule.lead.as_ref().and_then(|lead| lead.id.clone())),
        lead_name: rule.lead.as_ref().and_then(|lead| lead.name.clone()),
        thread_id: rule.thread_id.clone(),
        provider: rule.provider.clone(),
        template_name: template_name.map(str::to_string),
    }
}

/// Parse a backend timestamp.
///
/// RFC 3339 is the normal form. Timestamps without an offset and bare dates
/// are read as UTC.
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

fn resolve_title(metadata: &Map<String, Value>, template: Option<&str>, provider: Option<&str>) -> String {
    if let Some(title) = metadata_str(metadata, "title") {
        return title.to_string();
    }
    if let Some(name) = template {
        return name.to_string();
    }
    match non_empty(provider) {
        Some(provider) => format!("{} reminder", capitalize(provider)),
        None => "Follow-up reminder".to_string(),
    }
}

fn resolve_description(metadata: &Map<String, Value>, rule: &FollowUpRule) -> String {
    metadata_str(metadata, "description")
        .or_else(|| metadata_str(metadata, "notes"))
        .or_else(|| {
            rule.template
                .as_ref()
                .and_then(|t| non_empty(t.content.as_deref()))
        })
        .or_else(|| non_empty(rule.message.as_deref()))
        .unwrap_or_default()
        .to_string()
}

/// A trimmed, non-empty string field of the metadata.
fn metadata_str<'a>(metadata: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    non_empty(metadata.get(key).and_then(Value::as_str))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// First letter uppercased, the rest lowercased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
