//! # leadsbox-tasks
//!
//! Turns backend follow-up rules into display-ready [`Task`]s and partitions
//! them into due-date buckets.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{FixedOffset, TimeZone};
//! use leadsbox_tasks::{categorise_tasks, map_follow_up_to_task, parse_follow_ups};
//!
//! let payload = r#"{"data": {"followUps": [
//!     {"id": "fu_1", "provider": "WHATSAPP", "status": "SCHEDULED",
//!      "scheduledTime": "2025-03-10T09:30:00Z"}
//! ]}}"#;
//!
//! let tasks: Vec<_> = parse_follow_ups(payload)?
//!     .iter()
//!     .map(map_follow_up_to_task)
//!     .collect();
//! assert_eq!(tasks[0].title, "Whatsapp reminder");
//!
//! let reference = FixedOffset::east_opt(3600)
//!     .unwrap()
//!     .with_ymd_and_hms(2025, 3, 10, 12, 0, 0)
//!     .unwrap();
//! let buckets = categorise_tasks(tasks, &reference);
//! assert_eq!(buckets.today.len(), 1);
//! # Ok::<(), leadsbox_tasks::TaskError>(())
//! ```

mod buckets;
mod error;
mod rule;
mod task;

pub use buckets::{categorise_tasks, day_bounds, Bucket, TaskBuckets};
pub use error::TaskError;
pub use rule::{parse_follow_ups, FollowUpRule, FollowUpTemplate, LeadRef};
pub use task::{
    map_follow_up_to_task, map_follow_up_to_task_at, parse_due_date, Priority, Task, TaskStatus,
};
