//! Persistence for task documents.
//!
//! Every read is scoped to one owner: a store never hands out another
//! owner's task, even when asked for it by id.

use std::future::Future;

use taskify_shared::{OwnerId, Task};
use thiserror::Error;
use uuid::Uuid;

mod memory;
mod redis_store;

pub use memory::MemoryTaskStore;
pub use redis_store::RedisTaskStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("failed to decode task document {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode task {id}: {source}")]
    Encode {
        id: Uuid,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait TaskStore: Send + Sync + 'static {
    /// All tasks of `owner`, in insertion order.
    fn list(&self, owner: OwnerId) -> impl Future<Output = StoreResult<Vec<Task>>> + Send;

    /// The task with `id`, if it exists and belongs to `owner`.
    fn get(
        &self,
        owner: OwnerId,
        id: Uuid,
    ) -> impl Future<Output = StoreResult<Option<Task>>> + Send;

    /// Store a new task at the end of its owner's insertion order.
    fn insert(&self, task: &Task) -> impl Future<Output = StoreResult<()>> + Send;

    /// Overwrite an existing task document; `false` when it no longer exists,
    /// in which case nothing is written.
    fn save(&self, task: &Task) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Delete the task; `false` when nothing owned by `owner` had that id.
    fn remove(&self, owner: OwnerId, id: Uuid) -> impl Future<Output = StoreResult<bool>> + Send;
}
