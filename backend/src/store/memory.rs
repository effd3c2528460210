use taskify_shared::{OwnerId, Task};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreResult, TaskStore};

/// Process-local store; the vector order is the insertion order.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for MemoryTaskStore {
    async fn list(&self, owner: OwnerId) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| t.owner == owner).cloned().collect())
    }

    async fn get(&self, owner: OwnerId, id: Uuid) -> StoreResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .iter()
            .find(|t| t.id == id && t.owner == owner)
            .cloned())
    }

    async fn insert(&self, task: &Task) -> StoreResult<()> {
        self.tasks.write().await.push(task.clone());
        Ok(())
    }

    async fn save(&self, task: &Task) -> StoreResult<bool> {
        let mut tasks = self.tasks.write().await;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == task.id && t.owner == task.owner);
        Ok(slot.map(|slot| *slot = task.clone()).is_some())
    }

    async fn remove(&self, owner: OwnerId, id: Uuid) -> StoreResult<bool> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| !(t.id == id && t.owner == owner));
        Ok(tasks.len() < before)
    }
}
