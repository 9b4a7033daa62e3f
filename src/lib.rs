pub mod board;
pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod form;
pub mod gateway;
pub mod repository;
pub mod storage;
pub mod store;
pub mod sync;
pub mod task;
pub mod ui;
pub mod usecase;

pub use cache::{LoadState, Mutation, Pending, TaskCache};
pub use error::{ConfigError, FormError, RepositoryError, RepositoryResult, StorageError};
pub use gateway::MockGateway;
pub use repository::{Deleted, TaskRepository};
pub use storage::{FileStorage, LocalStorage, MemoryStorage};
pub use store::TaskStore;
pub use sync::TaskSync;
pub use task::{Task, TaskDraft, TaskPatch, TaskStatus};
pub use usecase::TaskUseCase;
