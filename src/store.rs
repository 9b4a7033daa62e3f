use crate::task::{self, Task, TaskDraft, TaskPatch, TaskStatus};
use chrono::{DateTime, TimeZone, Utc};

/// Ordered task collection backing the mock gateway.
#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Task> {
        task::position(&self.tasks, id).map(|i| &self.tasks[i])
    }

    /// Stores `draft` under the next free id. `None` when the id space is used up.
    pub fn insert(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> Option<Task> {
        let task = Task::from_draft(task::next_id(&self.tasks)?, draft, now);
        self.tasks.push(task.clone());
        Some(task)
    }

    pub fn patch(&mut self, id: u32, patch: &TaskPatch, now: DateTime<Utc>) -> Option<Task> {
        let index = task::position(&self.tasks, id)?;
        let task = &mut self.tasks[index];
        task.apply_patch(patch, now);
        Some(task.clone())
    }

    pub fn set_status(&mut self, id: u32, status: TaskStatus, now: DateTime<Utc>) -> Option<Task> {
        let index = task::position(&self.tasks, id)?;
        let task = &mut self.tasks[index];
        task.set_status(status, now);
        Some(task.clone())
    }

    pub fn remove(&mut self, id: u32) -> Option<Task> {
        task::position(&self.tasks, id).map(|i| self.tasks.remove(i))
    }

    /// The four demo tasks the mock backend starts with.
    pub fn fixture() -> Self {
        let ts = |m: u32, d: u32, h: u32, min: u32| {
            Utc.with_ymd_and_hms(2024, m, d, h, min, 0)
                .single()
                .unwrap_or_default()
        };
        let task = |id, title: &str, description: &str, status, deadline, created, updated| Task {
            id,
            title: title.to_string(),
            description: description.to_string(),
            status,
            deadline,
            created_at: created,
            updated_at: updated,
        };
        Self::with_tasks(vec![
            task(
                1,
                "Task 1",
                "Description 1",
                TaskStatus::Incomplete,
                Some(ts(12, 15, 17, 0)),
                ts(12, 9, 9, 0),
                ts(12, 9, 9, 0),
            ),
            task(
                2,
                "Task 2",
                "Description 2",
                TaskStatus::Completed,
                None,
                ts(12, 5, 15, 30),
                ts(12, 8, 10, 45),
            ),
            task(
                3,
                "Task 3",
                "Description 3",
                TaskStatus::Incomplete,
                Some(ts(12, 20, 10, 0)),
                ts(12, 7, 12, 0),
                ts(12, 7, 12, 0),
            ),
            task(
                4,
                "Important Task 4",
                "This is gonna be a very long description but bear with me - Lorem ipsum \
                 dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt \
                 ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud \
                 exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.",
                TaskStatus::Incomplete,
                Some(ts(12, 16, 10, 0)),
                ts(12, 7, 12, 0),
                ts(12, 7, 12, 0),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_is_consistent() {
        let store = TaskStore::fixture();
        assert_eq!(store.len(), 4);
        for task in store.tasks() {
            assert!(task.updated_at >= task.created_at);
            assert!(task.title.chars().count() <= 16);
        }
        assert!(store.get(2).is_some_and(Task::is_completed));
    }

    #[test]
    fn insert_after_remove_reuses_nothing_below_max() {
        let mut store = TaskStore::fixture();
        store.remove(2);
        let task = store.insert(TaskDraft::new("Next", "x"), Utc::now()).unwrap();
        assert_eq!(task.id, 5);
    }

    #[test]
    fn insert_refuses_when_ids_run_out() {
        let mut last = TaskStore::fixture().tasks()[0].clone();
        last.id = u32::MAX;
        let mut store = TaskStore::with_tasks(vec![last]);
        assert!(store.insert(TaskDraft::new("One more", "x"), Utc::now()).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_ids_are_reported_as_none() {
        let mut store = TaskStore::new();
        assert!(store.patch(1, &TaskPatch::default(), Utc::now()).is_none());
        assert!(store.set_status(1, TaskStatus::Completed, Utc::now()).is_none());
        assert!(store.remove(1).is_none());
    }
}
