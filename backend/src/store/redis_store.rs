use std::fmt::Display;
use std::sync::Arc;

use redis::{aio::Connection, AsyncCommands, Client};
use taskify_shared::{OwnerId, Task};
use tracing::warn;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore};

/// Task documents as JSON strings under `task:{id}`, plus one list per owner
/// (`owner:{owner}:tasks`) holding task ids in insertion order.
#[derive(Clone)]
pub struct RedisTaskStore {
    client: Arc<Client>,
}

impl RedisTaskStore {
    pub fn open(url: &str) -> StoreResult<Self> {
        let client = Client::open(url)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    async fn connection(&self) -> StoreResult<Connection> {
        Ok(self.client.get_async_connection().await?)
    }
}

fn task_key(id: impl Display) -> String {
    format!("task:{id}")
}

fn owner_key(owner: OwnerId) -> String {
    format!("owner:{owner}:tasks")
}

fn encode(task: &Task) -> StoreResult<String> {
    serde_json::to_string(task).map_err(|source| StoreError::Encode {
        id: task.id,
        source,
    })
}

fn decode(key: &str, json: &str) -> StoreResult<Task> {
    serde_json::from_str(json).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })
}

impl TaskStore for RedisTaskStore {
    async fn list(&self, owner: OwnerId) -> StoreResult<Vec<Task>> {
        let mut conn = self.connection().await?;
        let ids: Vec<String> = conn.lrange(owner_key(owner), 0, -1).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(task_key).collect();
        let docs: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        let mut tasks = Vec::with_capacity(docs.len());
        for (key, doc) in keys.iter().zip(docs) {
            let Some(json) = doc else {
                warn!(%key, %owner, "owner index points at a missing task document");
                continue;
            };
            let task = decode(key, &json)?;
            if task.owner == owner {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    async fn get(&self, owner: OwnerId, id: Uuid) -> StoreResult<Option<Task>> {
        let mut conn = self.connection().await?;
        let key = task_key(id);
        let doc: Option<String> = conn.get(&key).await?;
        match doc {
            Some(json) => Ok(Some(decode(&key, &json)?).filter(|task| task.owner == owner)),
            None => Ok(None),
        }
    }

    async fn insert(&self, task: &Task) -> StoreResult<()> {
        let json = encode(task)?;
        let mut conn = self.connection().await?;
        redis::pipe()
            .atomic()
            .set(task_key(task.id), json)
            .ignore()
            .rpush(owner_key(task.owner), task.id.to_string())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn save(&self, task: &Task) -> StoreResult<bool> {
        let json = encode(task)?;
        let mut conn = self.connection().await?;
        // XX replies nil when the key is gone, e.g. deleted since it was read.
        let reply: Option<String> = redis::cmd("SET")
            .arg(task_key(task.id))
            .arg(json)
            .arg("XX")
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn remove(&self, owner: OwnerId, id: Uuid) -> StoreResult<bool> {
        if self.get(owner, id).await?.is_none() {
            return Ok(false);
        }
        let mut conn = self.connection().await?;
        let (deleted, _unlinked): (usize, usize) = redis::pipe()
            .atomic()
            .del(task_key(id))
            .lrem(owner_key(owner), 1, id.to_string())
            .query_async(&mut conn)
            .await?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        let id = Uuid::nil();
        assert_eq!(task_key(id), "task:00000000-0000-0000-0000-000000000000");
        let owner = OwnerId(Uuid::nil());
        assert_eq!(
            owner_key(owner),
            "owner:00000000-0000-0000-0000-000000000000:tasks"
        );
        // Index entries are stored as strings and must map to the same key.
        assert_eq!(task_key(id.to_string()), task_key(id));
    }

    #[test]
    fn corrupt_documents_report_their_key() {
        let err = decode("task:broken", "{not json").unwrap_err();
        assert!(err.to_string().contains("task:broken"));
    }

    #[test]
    fn open_rejects_malformed_urls() {
        assert!(RedisTaskStore::open("not a url").is_err());
    }
}
