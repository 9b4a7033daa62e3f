#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};
use todo_sync::{
    Deleted, MemoryStorage, MockGateway, RepositoryError, RepositoryResult, Task, TaskCache,
    TaskDraft, TaskPatch, TaskRepository, TaskStatus, TaskStore, TaskSync, TaskUseCase,
};

pub const KEY: &str = "todo-items";

/// Wraps the mock gateway and fails the next call when armed.
pub struct FlakyRepository {
    pub inner: MockGateway,
    fail_next: Rc<RefCell<bool>>,
}

impl FlakyRepository {
    pub fn new(store: TaskStore) -> (Self, Rc<RefCell<bool>>) {
        let switch = Rc::new(RefCell::new(false));
        let repo = Self {
            inner: MockGateway::new(store),
            fail_next: Rc::clone(&switch),
        };
        (repo, switch)
    }

    fn guard(&mut self) -> RepositoryResult<()> {
        if self.fail_next.replace(false) {
            Err(RepositoryError::Unavailable("injected failure".into()))
        } else {
            Ok(())
        }
    }
}

impl TaskRepository for FlakyRepository {
    fn fetch(&mut self) -> RepositoryResult<Vec<Task>> {
        self.guard()?;
        self.inner.fetch()
    }

    fn create(&mut self, draft: TaskDraft) -> RepositoryResult<Task> {
        self.guard()?;
        self.inner.create(draft)
    }

    fn update(&mut self, id: u32, patch: TaskPatch) -> RepositoryResult<Task> {
        self.guard()?;
        self.inner.update(id, patch)
    }

    fn update_status(&mut self, id: u32, status: TaskStatus) -> RepositoryResult<Task> {
        self.guard()?;
        self.inner.update_status(id, status)
    }

    fn delete(&mut self, id: u32) -> RepositoryResult<Deleted> {
        self.guard()?;
        self.inner.delete(id)
    }
}

pub struct Harness {
    pub sync: TaskSync<FlakyRepository, MemoryStorage>,
    pub fail_next: Rc<RefCell<bool>>,
    pub errors: Rc<RefCell<Vec<RepositoryError>>>,
}

impl Harness {
    pub fn new(store: TaskStore) -> Self {
        Self::with_storage(store, MemoryStorage::new())
    }

    pub fn with_storage(store: TaskStore, storage: MemoryStorage) -> Self {
        let (repo, fail_next) = FlakyRepository::new(store);
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&errors);
        let usecase = TaskUseCase::new(repo, move |err: &RepositoryError| {
            sink.borrow_mut().push(err.clone())
        });
        let sync = TaskSync::new(usecase, TaskCache::new(storage, KEY));
        Self {
            sync,
            fail_next,
            errors,
        }
    }

    pub fn arm_failure(&self) {
        *self.fail_next.borrow_mut() = true;
    }

    pub fn store(&self) -> Vec<Task> {
        self.sync.usecase().repository().inner.store().tasks().to_vec()
    }

    pub fn cache(&self) -> Vec<Task> {
        self.sync.tasks().to_vec()
    }

    pub fn mirror(&self) -> Option<Vec<Task>> {
        todo_sync::storage::load_snapshot(self.sync.cache().storage(), KEY).unwrap()
    }

    /// Store, cache and mirror all hold the same list.
    pub fn assert_converged(&self) {
        let store = self.store();
        assert_eq!(self.cache(), store, "cache diverged from store");
        assert_eq!(self.mirror(), Some(store), "mirror diverged from store");
    }
}
