//! Due-date bucketing relative to a reference instant.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc};
use serde::Serialize;

use crate::task::{Task, TaskStatus};

const DAY_MS: i64 = 24 * 60 * 60 * 1_000;

/// Which list a task is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Overdue,
    Today,
    Upcoming,
    Completed,
    Cancelled,
}

impl Bucket {
    pub const ALL: [Bucket; 5] = [
        Bucket::Overdue,
        Bucket::Today,
        Bucket::Upcoming,
        Bucket::Completed,
        Bucket::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Overdue => "Overdue",
            Bucket::Today => "Today",
            Bucket::Upcoming => "Upcoming",
            Bucket::Completed => "Completed",
            Bucket::Cancelled => "Cancelled",
        }
    }
}

/// Tasks split into disjoint buckets. Input order is kept within each bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskBuckets {
    pub overdue: Vec<Task>,
    pub today: Vec<Task>,
    pub upcoming: Vec<Task>,
    pub completed: Vec<Task>,
    pub cancelled: Vec<Task>,
}

impl TaskBuckets {
    pub fn get(&self, bucket: Bucket) -> &[Task] {
        match bucket {
            Bucket::Overdue => &self.overdue,
            Bucket::Today => &self.today,
            Bucket::Upcoming => &self.upcoming,
            Bucket::Completed => &self.completed,
            Bucket::Cancelled => &self.cancelled,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<Task> {
        match bucket {
            Bucket::Overdue => &mut self.overdue,
            Bucket::Today => &mut self.today,
            Bucket::Upcoming => &mut self.upcoming,
            Bucket::Completed => &mut self.completed,
            Bucket::Cancelled => &mut self.cancelled,
        }
    }

    /// Total number of tasks across all buckets.
    pub fn len(&self) -> usize {
        Bucket::ALL.iter().map(|&b| self.get(b).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// First and last millisecond of the reference's calendar day, in the
/// reference's own time zone.
///
/// When local midnight does not exist (a DST gap) or occurs twice, the
/// earliest valid start and the latest valid end are used.
pub fn day_bounds<Tz: TimeZone>(reference: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = reference.timezone();
    let offset_secs = reference.offset().fix().local_minus_utc();

    let start = reference.date_naive().and_time(NaiveTime::MIN);
    let end = start
        .checked_add_signed(TimeDelta::milliseconds(DAY_MS - 1))
        .unwrap_or(NaiveDateTime::MAX);

    let resolve = |naive: NaiveDateTime, earliest: bool| {
        let local = tz.from_local_datetime(&naive);
        let picked = if earliest { local.earliest() } else { local.latest() };
        picked.map_or_else(
            || naive.and_utc() - TimeDelta::seconds(i64::from(offset_secs)),
            |dt| dt.with_timezone(&Utc),
        )
    };

    (resolve(start, true), resolve(end, false))
}

/// Partition tasks by status and due date relative to `reference`.
///
/// Completed and cancelled tasks go to their own buckets whatever their due
/// date. The rest are overdue before the start of the reference day, today
/// within it (both ends inclusive), and upcoming after it. A due date that
/// does not parse counts as upcoming.
pub fn categorise_tasks<Tz, I>(tasks: I, reference: &DateTime<Tz>) -> TaskBuckets
where
    Tz: TimeZone,
    I: IntoIterator<Item = Task>,
{
    let (start, end) = day_bounds(reference);
    let mut buckets = TaskBuckets::default();

    for task in tasks {
        let bucket = match task.status {
            TaskStatus::Completed => Bucket::Completed,
            TaskStatus::Cancelled => Bucket::Cancelled,
            TaskStatus::Pending => match due_millis(&task) {
                Some(due) if due < start => Bucket::Overdue,
                Some(due) if due <= end => Bucket::Today,
                _ => Bucket::Upcoming,
            },
        };
        buckets.get_mut(bucket).push(task);
    }

    buckets
}

/// Due instant truncated to the millisecond resolution of the day bounds.
fn due_millis(task: &Task) -> Option<DateTime<Utc>> {
    task.due_at()
        .and_then(|due| DateTime::from_timestamp_millis(due.timestamp_millis()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;
    use chrono::FixedOffset;

    fn task(id: &str, status: TaskStatus, due: &str) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            priority: Priority::Medium,
            status,
            due_date: due.to_string(),
            lead_id: None,
            lead_name: None,
            thread_id: None,
            provider: None,
            template_name: None,
        }
    }

    fn reference() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3_600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 10, 15, 0, 0)
            .unwrap()
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn day_bounds_follow_reference_offset() {
        let (start, end) = day_bounds(&reference());
        assert_eq!(start.to_rfc3339(), "2025-03-09T23:00:00+00:00");
        assert_eq!(end, start + TimeDelta::milliseconds(DAY_MS - 1));
    }

    #[test]
    fn boundaries_are_inclusive_for_today() {
        let tasks = vec![
            task("before-start", TaskStatus::Pending, "2025-03-09T22:59:59.999Z"),
            task("at-start", TaskStatus::Pending, "2025-03-10T00:00:00.000+01:00"),
            task("at-end", TaskStatus::Pending, "2025-03-10T23:59:59.999+01:00"),
            task("next-day", TaskStatus::Pending, "2025-03-11T00:00:00.000+01:00"),
        ];

        let buckets = categorise_tasks(tasks, &reference());
        assert_eq!(ids(&buckets.overdue), ["before-start"]);
        assert_eq!(ids(&buckets.today), ["at-start", "at-end"]);
        assert_eq!(ids(&buckets.upcoming), ["next-day"]);
    }

    #[test]
    fn sub_millisecond_end_of_day_is_today() {
        let buckets = categorise_tasks(
            vec![task("last-instant", TaskStatus::Pending, "2025-03-10T23:59:59.9995+01:00")],
            &reference(),
        );
        assert_eq!(ids(&buckets.today), ["last-instant"]);
    }

    #[test]
    fn due_dates_without_offset_are_bucketed() {
        let tasks = vec![
            task("bare-date", TaskStatus::Pending, "2025-03-01"),
            task("naive", TaskStatus::Pending, "2025-03-01T09:00:00"),
            task("naive-today", TaskStatus::Pending, "2025-03-10T12:00:00"),
            task("bare-future", TaskStatus::Pending, "2025-04-01"),
        ];

        let buckets = categorise_tasks(tasks, &reference());
        assert_eq!(ids(&buckets.overdue), ["bare-date", "naive"]);
        assert_eq!(ids(&buckets.today), ["naive-today"]);
        assert_eq!(ids(&buckets.upcoming), ["bare-future"]);
    }

    #[test]
    fn status_wins_over_due_date() {
        let tasks = vec![
            task("done-late", TaskStatus::Completed, "2020-01-01T00:00:00.000Z"),
            task("done-future", TaskStatus::Completed, "2030-01-01T00:00:00.000Z"),
            task("dropped", TaskStatus::Cancelled, "2025-03-10T12:00:00.000Z"),
        ];

        let buckets = categorise_tasks(tasks, &reference());
        assert_eq!(ids(&buckets.completed), ["done-late", "done-future"]);
        assert_eq!(ids(&buckets.cancelled), ["dropped"]);
        assert_eq!(buckets.len(), 3);
    }

    #[test]
    fn unparseable_due_date_is_upcoming() {
        let buckets = categorise_tasks(
            vec![task("mystery", TaskStatus::Pending, "soon")],
            &reference(),
        );
        assert_eq!(ids(&buckets.upcoming), ["mystery"]);
    }

    #[test]
    fn every_task_lands_in_one_bucket() {
        let statuses = [TaskStatus::Pending, TaskStatus::Completed, TaskStatus::Cancelled];
        let dues = [
            "2025-03-01T00:00:00.000Z",
            "2025-03-10T10:00:00.000Z",
            "2025-04-01T00:00:00.000Z",
            "",
        ];
        let tasks: Vec<Task> = statuses
            .iter()
            .flat_map(|&s| dues.iter().map(move |d| task(d, s, d)))
            .collect();
        let count = tasks.len();

        let buckets = categorise_tasks(tasks, &reference());
        assert_eq!(buckets.len(), count);
    }

    #[test]
    fn utc_reference() {
        let reference = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let buckets = categorise_tasks(
            vec![task("midnight", TaskStatus::Pending, "2025-03-10T00:00:00.000Z")],
            &reference,
        );
        assert_eq!(ids(&buckets.today), ["midnight"]);
    }
}
