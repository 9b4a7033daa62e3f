use crate::task::{Task, TaskStatus};
use chrono::{DateTime, Duration, Utc};

/// Splits tasks into (incomplete, completed), each in input order.
pub fn partition(tasks: &[Task]) -> (Vec<&Task>, Vec<&Task>) {
    tasks
        .iter()
        .partition(|t| t.status == TaskStatus::Incomplete)
}

/// True when an open task's deadline lies within `window` of `now`, before or after.
pub fn is_approaching_deadline(task: &Task, now: DateTime<Utc>, window: Duration) -> bool {
    if task.is_completed() {
        return false;
    }
    task.deadline
        .is_some_and(|deadline| (deadline - now).abs() <= window)
}
