use crate::error::{RepositoryError, RepositoryResult};
use crate::repository::{Deleted, TaskRepository};
use crate::task::{Task, TaskDraft, TaskPatch, TaskStatus};
use tracing::warn;

pub type ErrorCallback = Box<dyn FnMut(&RepositoryError)>;

/// The only path from the view layer to a repository.
///
/// Every failing call reports its error to the callback once and then hands
/// the same error back to the caller. Nothing is retried.
pub struct TaskUseCase<R> {
    repository: R,
    on_error: ErrorCallback,
}

impl<R: TaskRepository> TaskUseCase<R> {
    pub fn new(repository: R, on_error: impl FnMut(&RepositoryError) + 'static) -> Self {
        Self {
            repository,
            on_error: Box::new(on_error),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn fetch(&mut self) -> RepositoryResult<Vec<Task>> {
        let result = self.repository.fetch();
        self.report("fetch", result)
    }

    pub fn create(&mut self, draft: TaskDraft) -> RepositoryResult<Task> {
        let result = self.repository.create(draft);
        self.report("create", result)
    }

    pub fn update(&mut self, id: u32, patch: TaskPatch) -> RepositoryResult<Task> {
        let result = self.repository.update(id, patch);
        self.report("update", result)
    }

    pub fn update_status(&mut self, id: u32, status: TaskStatus) -> RepositoryResult<Task> {
        let result = self.repository.update_status(id, status);
        self.report("update_status", result)
    }

    pub fn delete(&mut self, id: u32) -> RepositoryResult<Deleted> {
        let result = self.repository.delete(id);
        self.report("delete", result)
    }

    fn report<T>(&mut self, operation: &str, result: RepositoryResult<T>) -> RepositoryResult<T> {
        if let Err(err) = &result {
            warn!(operation, error = %err, "repository call failed");
            (self.on_error)(err);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use std::{cell::RefCell, rc::Rc};

    struct Down;

    impl TaskRepository for Down {
        fn fetch(&mut self) -> RepositoryResult<Vec<Task>> {
            Err(RepositoryError::Unavailable("down".into()))
        }
        fn create(&mut self, _: TaskDraft) -> RepositoryResult<Task> {
            Err(RepositoryError::Unavailable("down".into()))
        }
        fn update(&mut self, id: u32, _: TaskPatch) -> RepositoryResult<Task> {
            Err(RepositoryError::NotFound(id))
        }
        fn update_status(&mut self, id: u32, _: TaskStatus) -> RepositoryResult<Task> {
            Err(RepositoryError::NotFound(id))
        }
        fn delete(&mut self, _: u32) -> RepositoryResult<Deleted> {
            Err(RepositoryError::Unavailable("down".into()))
        }
    }

    fn recording<R: TaskRepository>(repo: R) -> (TaskUseCase<R>, Rc<RefCell<Vec<RepositoryError>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let usecase = TaskUseCase::new(repo, move |err: &RepositoryError| {
            sink.borrow_mut().push(err.clone())
        });
        (usecase, seen)
    }

    #[test]
    fn each_failure_reaches_the_callback_once() {
        let (mut usecase, seen) = recording(Down);
        assert!(usecase.fetch().is_err());
        assert!(usecase.create(TaskDraft::new("a", "b")).is_err());
        assert_eq!(
            usecase.update(3, TaskPatch::default()),
            Err(RepositoryError::NotFound(3))
        );
        assert!(usecase.update_status(4, TaskStatus::Completed).is_err());
        assert!(usecase.delete(5).is_err());
        assert_eq!(seen.borrow().len(), 5);
        assert_eq!(seen.borrow()[2], RepositoryError::NotFound(3));
    }

    #[test]
    fn success_leaves_callback_silent() {
        let (mut usecase, seen) = recording(MockGateway::default());
        let task = usecase.create(TaskDraft::new("a", "b")).unwrap();
        usecase.update_status(task.id, TaskStatus::Completed).unwrap();
        usecase.delete(task.id).unwrap();
        assert!(seen.borrow().is_empty());
        assert!(usecase.repository().store().is_empty());
    }
}
