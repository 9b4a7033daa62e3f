use crate::error::{RepositoryError, RepositoryResult};
use crate::repository::{Deleted, TaskRepository};
use crate::store::TaskStore;
use crate::task::{Task, TaskDraft, TaskPatch, TaskStatus};
use chrono::{DateTime, Utc};
use tracing::debug;

pub type Clock = fn() -> DateTime<Utc>;

pub const ID_SPACE_EXHAUSTED: &str = "id space exhausted";

/// In-memory repository simulating the backend against an owned [`TaskStore`].
#[derive(Debug)]
pub struct MockGateway {
    store: TaskStore,
    clock: Clock,
}

impl MockGateway {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new(TaskStore::new())
    }
}

impl TaskRepository for MockGateway {
    fn fetch(&mut self) -> RepositoryResult<Vec<Task>> {
        Ok(self.store.tasks().to_vec())
    }

    fn create(&mut self, draft: TaskDraft) -> RepositoryResult<Task> {
        let now = self.now();
        let task = self
            .store
            .insert(draft, now)
            .ok_or_else(|| RepositoryError::Unavailable(ID_SPACE_EXHAUSTED.into()))?;
        debug!(id = task.id, "created task");
        Ok(task)
    }

    fn update(&mut self, id: u32, patch: TaskPatch) -> RepositoryResult<Task> {
        let now = self.now();
        self.store
            .patch(id, &patch, now)
            .ok_or(RepositoryError::NotFound(id))
    }

    fn update_status(&mut self, id: u32, status: TaskStatus) -> RepositoryResult<Task> {
        let now = self.now();
        self.store
            .set_status(id, status, now)
            .ok_or(RepositoryError::NotFound(id))
    }

    fn delete(&mut self, id: u32) -> RepositoryResult<Deleted> {
        if self.store.remove(id).is_none() {
            debug!(id, "delete of unknown task ignored");
        }
        Ok(Deleted { success: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn create_on_empty_store_starts_at_one() {
        let mut gateway = MockGateway::default().with_clock(fixed);
        let task = gateway
            .create(TaskDraft::new("Buy milk", "2%"))
            .unwrap();
        assert_eq!(task.id, 1);
        assert_eq!(task.status, TaskStatus::Incomplete);
        assert_eq!(task.created_at, fixed());
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(gateway.fetch().unwrap(), vec![task]);
    }

    #[test]
    fn create_past_the_last_id_is_unavailable() {
        let mut last = TaskStore::fixture().tasks()[0].clone();
        last.id = u32::MAX;
        let mut gateway = MockGateway::new(TaskStore::with_tasks(vec![last]));
        assert_eq!(
            gateway.create(TaskDraft::new("Overflow", "x")),
            Err(RepositoryError::Unavailable(ID_SPACE_EXHAUSTED.into()))
        );
        assert_eq!(gateway.store().len(), 1);
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let mut gateway = MockGateway::default();
        assert_eq!(
            gateway.update(42, TaskPatch::default()),
            Err(RepositoryError::NotFound(42))
        );
        assert_eq!(
            gateway.update_status(42, TaskStatus::Completed),
            Err(RepositoryError::NotFound(42))
        );
    }

    #[test]
    fn update_status_refreshes_updated_at() {
        let mut gateway = MockGateway::new(TaskStore::fixture()).with_clock(fixed);
        let task = gateway.update_status(1, TaskStatus::Completed).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.updated_at, fixed());
        assert_eq!(task.title, "Task 1");
    }

    #[test]
    fn delete_of_unknown_id_succeeds_without_change() {
        let mut gateway = MockGateway::new(TaskStore::fixture());
        let before = gateway.fetch().unwrap();
        assert!(gateway.delete(99).unwrap().success);
        assert_eq!(gateway.fetch().unwrap(), before);
    }
}
