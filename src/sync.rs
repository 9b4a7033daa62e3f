use crate::cache::{LoadState, Mutation, TaskCache};
use crate::error::{RepositoryError, RepositoryResult};
use crate::repository::{Deleted, TaskRepository};
use crate::storage::LocalStorage;
use crate::task::{Task, TaskDraft, TaskPatch, TaskStatus};
use crate::usecase::TaskUseCase;
use chrono::Utc;
use tracing::{info, warn};

pub const LOAD_ERROR: &str = "Error loading tasks";

/// Drives the cache from the use-case layer: loads, refreshes and mutations.
pub struct TaskSync<R, S> {
    usecase: TaskUseCase<R>,
    cache: TaskCache<S>,
}

impl<R: TaskRepository, S: LocalStorage> TaskSync<R, S> {
    pub fn new(usecase: TaskUseCase<R>, cache: TaskCache<S>) -> Self {
        Self { usecase, cache }
    }

    pub fn tasks(&self) -> &[Task] {
        self.cache.tasks()
    }

    pub fn state(&self) -> &LoadState {
        self.cache.state()
    }

    pub fn cache(&self) -> &TaskCache<S> {
        &self.cache
    }

    #[cfg(test)]
    pub(crate) fn cache_mut(&mut self) -> &mut TaskCache<S> {
        &mut self.cache
    }

    pub fn usecase(&self) -> &TaskUseCase<R> {
        &self.usecase
    }

    /// Initial mount: mirror fast path, then an authoritative fetch.
    pub fn load(&mut self) -> RepositoryResult<()> {
        self.hydrate();
        self.refresh()
    }

    /// Shows the mirror snapshot, if any, until the next fetch lands.
    pub fn hydrate(&mut self) -> bool {
        self.cache.hydrate()
    }

    pub fn refresh(&mut self) -> RepositoryResult<()> {
        match self.usecase.fetch() {
            Ok(tasks) => {
                info!(count = tasks.len(), "fetched tasks");
                self.cache.replace_all(tasks);
                Ok(())
            }
            Err(err) => {
                self.cache.mark_failed(LOAD_ERROR);
                Err(err)
            }
        }
    }

    pub fn create(&mut self, draft: TaskDraft) -> RepositoryResult<Task> {
        self.mutate(Mutation::Create(draft))
            .and_then(|task| task.ok_or_else(|| missing_record("create")))
    }

    pub fn update(&mut self, id: u32, patch: TaskPatch) -> RepositoryResult<Task> {
        self.mutate(Mutation::Update { id, patch })
            .and_then(|task| task.ok_or_else(|| missing_record("update")))
    }

    pub fn set_status(&mut self, id: u32, status: TaskStatus) -> RepositoryResult<Task> {
        self.mutate(Mutation::SetStatus { id, status })
            .and_then(|task| task.ok_or_else(|| missing_record("update_status")))
    }

    /// Flips the status the cache currently shows for `id`.
    pub fn toggle(&mut self, id: u32) -> RepositoryResult<Task> {
        let status = self
            .cache
            .get(id)
            .map(|t| t.status.toggled())
            .ok_or(RepositoryError::NotFound(id))?;
        self.set_status(id, status)
    }

    pub fn delete(&mut self, id: u32) -> RepositoryResult<Deleted> {
        self.mutate(Mutation::Delete { id })?;
        Ok(Deleted { success: true })
    }

    fn mutate(&mut self, mutation: Mutation) -> RepositoryResult<Option<Task>> {
        let pending = self.cache.begin(&mutation, Utc::now());
        let result = match mutation {
            Mutation::Create(draft) => self.usecase.create(draft).map(Some),
            Mutation::Update { id, patch } => self.usecase.update(id, patch).map(Some),
            Mutation::SetStatus { id, status } => self.usecase.update_status(id, status).map(Some),
            Mutation::Delete { id } => self.usecase.delete(id).map(|_| None),
        };
        match result {
            Ok(record) => {
                self.cache.commit(pending, record.clone());
                Ok(record)
            }
            Err(err) => {
                self.cache.revert(pending);
                Err(err)
            }
        }
    }
}

fn missing_record(operation: &str) -> RepositoryError {
    warn!(operation, "repository returned no record");
    RepositoryError::Unavailable(format!("{operation} returned no record"))
}
