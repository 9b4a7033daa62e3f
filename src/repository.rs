use crate::error::RepositoryResult;
use crate::task::{Task, TaskDraft, TaskPatch, TaskStatus};

/// Outcome of a delete. `success` is true even when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deleted {
    pub success: bool,
}

/// Contract every task backing store satisfies.
pub trait TaskRepository {
    /// Current contents in store order.
    fn fetch(&mut self) -> RepositoryResult<Vec<Task>>;

    fn create(&mut self, draft: TaskDraft) -> RepositoryResult<Task>;

    /// Merges `patch` into task `id`; `NotFound` when absent.
    fn update(&mut self, id: u32, patch: TaskPatch) -> RepositoryResult<Task>;

    /// Sets the status of task `id` and refreshes `updated_at`.
    fn update_status(&mut self, id: u32, status: TaskStatus) -> RepositoryResult<Task>;

    /// Removes task `id`; a missing id is not an error.
    fn delete(&mut self, id: u32) -> RepositoryResult<Deleted>;
}

impl<R: TaskRepository + ?Sized> TaskRepository for Box<R> {
    fn fetch(&mut self) -> RepositoryResult<Vec<Task>> {
        (**self).fetch()
    }

    fn create(&mut self, draft: TaskDraft) -> RepositoryResult<Task> {
        (**self).create(draft)
    }

    fn update(&mut self, id: u32, patch: TaskPatch) -> RepositoryResult<Task> {
        (**self).update(id, patch)
    }

    fn update_status(&mut self, id: u32, status: TaskStatus) -> RepositoryResult<Task> {
        (**self).update_status(id, status)
    }

    fn delete(&mut self, id: u32) -> RepositoryResult<Deleted> {
        (**self).delete(id)
    }
}
