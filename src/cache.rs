//! Client-side task cache and its local-storage mirror.
//!
//! Mutations run in three steps: [`TaskCache::begin`] snapshots the list and
//! applies the change speculatively, then either [`TaskCache::commit`]
//! reconciles it with the record the repository returned and writes the
//! mirror, or [`TaskCache::revert`] restores the snapshot.
//!
//! The speculative step goes through the same helpers as [`crate::store`]
//! (`next_id`, `Task::apply_patch`, `Task::set_status`) so the cache computes
//! what the store would.

use crate::error::StorageError;
use crate::storage::{self, LocalStorage};
use crate::task::{self, Task, TaskDraft, TaskPatch, TaskStatus};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(TaskDraft),
    Update { id: u32, patch: TaskPatch },
    SetStatus { id: u32, status: TaskStatus },
    Delete { id: u32 },
}

/// An in-flight mutation: the pre-mutation list and the id it touched.
#[derive(Debug)]
#[must_use = "a pending mutation must be committed or reverted"]
pub struct Pending {
    snapshot: Vec<Task>,
    id: Option<u32>,
}

impl Pending {
    /// Id the speculative change applied to; provisional for creates, and
    /// `None` for a create that found no free id to show.
    pub fn id(&self) -> Option<u32> {
        self.id
    }
}

pub struct TaskCache<S> {
    tasks: Vec<Task>,
    state: LoadState,
    storage: S,
    key: String,
}

impl<S: LocalStorage> TaskCache<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            tasks: Vec::new(),
            state: LoadState::Loading,
            storage,
            key: key.into(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u32) -> Option<&Task> {
        task::position(&self.tasks, id).map(|i| &self.tasks[i])
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Fast path: adopt the mirror snapshot if one is stored and readable.
    ///
    /// Returns whether a snapshot was adopted. An unreadable mirror is logged
    /// and leaves the current list as it is.
    pub fn hydrate(&mut self) -> bool {
        match storage::load_snapshot(&self.storage, &self.key) {
            Ok(Some(tasks)) => {
                debug!(count = tasks.len(), key = %self.key, "hydrated from mirror");
                self.tasks = tasks;
                true
            }
            Ok(None) => false,
            Err(StorageError::Json(err)) => {
                warn!(key = %self.key, error = %err, "discarding unparseable mirror snapshot");
                false
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read mirror snapshot");
                false
            }
        }
    }

    /// A completed fetch: supersedes whatever the cache held and rewrites the mirror.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.state = LoadState::Ready;
        self.persist();
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.state = LoadState::Failed(message.into());
    }

    pub fn begin(&mut self, mutation: &Mutation, now: DateTime<Utc>) -> Pending {
        let snapshot = self.tasks.clone();
        let id = match mutation {
            Mutation::Create(draft) => match task::next_id(&self.tasks) {
                Some(id) => {
                    self.tasks.push(Task::from_draft(id, draft.clone(), now));
                    Some(id)
                }
                None => {
                    warn!("no free id for a provisional task");
                    None
                }
            },
            Mutation::Update { id, patch } => {
                if let Some(task) = self.task_mut(*id) {
                    task.apply_patch(patch, now);
                }
                Some(*id)
            }
            Mutation::SetStatus { id, status } => {
                if let Some(task) = self.task_mut(*id) {
                    task.set_status(*status, now);
                }
                Some(*id)
            }
            Mutation::Delete { id } => {
                self.tasks.retain(|t| t.id != *id);
                Some(*id)
            }
        };
        Pending { snapshot, id }
    }

    /// Settles a successful mutation. `confirmed` is the record the repository
    /// returned, or `None` for deletes.
    ///
    /// A stale cache may already hold the confirmed id under another record;
    /// that record is dropped so ids stay unique.
    pub fn commit(&mut self, pending: Pending, confirmed: Option<Task>) {
        if let Some(record) = confirmed {
            let slot = pending.id.and_then(|id| task::position(&self.tasks, id));
            let mut index = 0;
            self.tasks.retain(|t| {
                let keep = t.id != record.id || Some(index) == slot;
                index += 1;
                keep
            });
            match pending.id.and_then(|id| task::position(&self.tasks, id)) {
                Some(index) => self.tasks[index] = record,
                None => self.tasks.push(record),
            }
        }
        self.persist();
    }

    pub fn revert(&mut self, pending: Pending) {
        debug!(id = ?pending.id, "reverting speculative change");
        self.tasks = pending.snapshot;
    }

    fn task_mut(&mut self, id: u32) -> Option<&mut Task> {
        task::position(&self.tasks, id).map(|i| &mut self.tasks[i])
    }

    // The cache stays authoritative when the mirror cannot be written.
    fn persist(&mut self) {
        if let Err(err) = storage::save_snapshot(&mut self.storage, &self.key, &self.tasks) {
            warn!(key = %self.key, error = %err, "failed to write mirror snapshot");
        }
    }
}
