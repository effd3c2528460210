use serde::{Deserialize, Serialize};

use crate::stats::TaskStats;
use crate::task::Task;

/// `{ "task": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub task: Task,
}

/// `{ "tasks": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListEnvelope {
    pub tasks: Vec<Task>,
}

/// `{ "stats": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsEnvelope {
    pub stats: TaskStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub message: String,
}
