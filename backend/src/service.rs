use std::sync::Arc;

use taskify_shared::{
    AddSubtaskRequest, CreateTaskRequest, DueBucket, FilterCriteria, OwnerId, SortField,
    SortOrder, Task, TaskStats, UpdateSubtaskRequest, UpdateTaskRequest,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{ApiError, ApiResult};
use crate::store::TaskStore;

/// Task operations for one authenticated owner at a time.
///
/// Every call re-reads the store; nothing is cached between requests.
pub struct TaskService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for TaskService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: TaskStore> TaskService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn list(&self, owner: OwnerId, criteria: &FilterCriteria) -> ApiResult<Vec<Task>> {
        let tasks = self.store.list(owner).await?;
        let matched = criteria.apply(owner, &tasks, &self.clock.calendar_day());
        debug!(%owner, scanned = tasks.len(), matched = matched.len(), "listed tasks");
        Ok(matched)
    }

    /// Open tasks due before today, soonest first.
    pub async fn overdue(&self, owner: OwnerId) -> ApiResult<Vec<Task>> {
        let criteria = FilterCriteria::new()
            .with_bucket(DueBucket::Overdue)
            .sorted_by(SortField::DueDate, SortOrder::Asc);
        self.list(owner, &criteria).await
    }

    pub async fn stats(&self, owner: OwnerId) -> ApiResult<TaskStats> {
        let tasks = self.store.list(owner).await?;
        Ok(TaskStats::compute(owner, &tasks, &self.clock.calendar_day()))
    }

    pub async fn get(&self, owner: OwnerId, id: Uuid) -> ApiResult<Task> {
        self.store
            .get(owner, id)
            .await?
            .ok_or(ApiError::NotFound("task"))
    }

    pub async fn create(&self, owner: OwnerId, request: CreateTaskRequest) -> ApiResult<Task> {
        let task = request.into_task(owner, self.clock.now_utc())?;
        self.store.insert(&task).await?;
        info!(%owner, task = %task.id, "created task");
        Ok(task)
    }

    pub async fn update(
        &self,
        owner: OwnerId,
        id: Uuid,
        request: UpdateTaskRequest,
    ) -> ApiResult<Task> {
        let mut task = self.get(owner, id).await?;
        request.apply_to(&mut task, self.clock.now_utc())?;
        self.persist(&task).await?;
        info!(%owner, task = %task.id, completed = task.completed, "updated task");
        Ok(task)
    }

    pub async fn delete(&self, owner: OwnerId, id: Uuid) -> ApiResult<()> {
        if !self.store.remove(owner, id).await? {
            return Err(ApiError::NotFound("task"));
        }
        info!(%owner, task = %id, "deleted task");
        Ok(())
    }

    pub async fn add_subtask(
        &self,
        owner: OwnerId,
        id: Uuid,
        request: AddSubtaskRequest,
    ) -> ApiResult<Task> {
        let subtask = request.into_subtask()?;
        let mut task = self.get(owner, id).await?;
        task.subtasks.push(subtask);
        self.persist(&task).await?;
        Ok(task)
    }

    pub async fn update_subtask(
        &self,
        owner: OwnerId,
        id: Uuid,
        subtask_id: Uuid,
        request: UpdateSubtaskRequest,
    ) -> ApiResult<Task> {
        let completed = request.completed()?;
        let mut task = self.get(owner, id).await?;
        let subtask = task
            .subtask_mut(subtask_id)
            .ok_or(ApiError::NotFound("subtask"))?;
        subtask.completed = completed;
        self.persist(&task).await?;
        Ok(task)
    }

    /// Write back a task read earlier in the request; a task deleted in the
    /// meantime is reported as not found.
    async fn persist(&self, task: &Task) -> ApiResult<()> {
        if !self.store.save(task).await? {
            warn!(owner = %task.owner, task = %task.id, "task vanished before it could be saved");
            return Err(ApiError::NotFound("task"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::{MemoryTaskStore, StoreResult};
    use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
    use taskify_shared::IMPORTANT_TAG;

    /// Deletes every task just before saving it, as a concurrent DELETE would.
    #[derive(Default)]
    struct DeletedBeforeSave(MemoryTaskStore);

    impl TaskStore for DeletedBeforeSave {
        async fn list(&self, owner: OwnerId) -> StoreResult<Vec<Task>> {
            self.0.list(owner).await
        }

        async fn get(&self, owner: OwnerId, id: Uuid) -> StoreResult<Option<Task>> {
            self.0.get(owner, id).await
        }

        async fn insert(&self, task: &Task) -> StoreResult<()> {
            self.0.insert(task).await
        }

        async fn save(&self, task: &Task) -> StoreResult<bool> {
            self.0.remove(task.owner, task.id).await?;
            self.0.save(task).await
        }

        async fn remove(&self, owner: OwnerId, id: Uuid) -> StoreResult<bool> {
            self.0.remove(owner, id).await
        }
    }

    fn noon() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 10, 12, 0, 0)
            .unwrap()
    }

    fn service() -> TaskService<MemoryTaskStore> {
        TaskService::new(Arc::new(MemoryTaskStore::new()), Arc::new(FixedClock(noon())))
    }

    fn titled(title: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: Some(title.into()),
            ..CreateTaskRequest::default()
        }
    }

    fn due(title: &str, at: DateTime<Utc>) -> CreateTaskRequest {
        CreateTaskRequest {
            due_date: Some(at),
            ..titled(title)
        }
    }

    #[tokio::test]
    async fn creating_a_task_due_today_bumps_stats() {
        let svc = service();
        let owner = OwnerId::new();
        let before = svc.stats(owner).await.unwrap();

        svc.create(owner, due("Pay rent", noon().with_timezone(&Utc)))
            .await
            .unwrap();

        let after = svc.stats(owner).await.unwrap();
        assert_eq!(after.total, before.total + 1);
        assert_eq!(after.due_today, before.due_today + 1);
    }

    #[tokio::test]
    async fn created_task_round_trips_through_get() {
        let svc = service();
        let owner = OwnerId::new();
        let request = CreateTaskRequest {
            description: Some("first of the month".into()),
            priority: Some(taskify_shared::Priority::High),
            tags: Some(vec![IMPORTANT_TAG.into()]),
            category: Some("Home".into()),
            ..due("Pay rent", Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap())
        };

        let created = svc.create(owner, request.clone()).await.unwrap();
        let fetched = svc.get(owner, created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Pay rent");
        assert_eq!(fetched.description, request.description);
        assert_eq!(fetched.priority, taskify_shared::Priority::High);
        assert_eq!(fetched.due_date, request.due_date);
        assert_eq!(fetched.tags, vec![IMPORTANT_TAG]);
        assert_eq!(fetched.category.as_deref(), Some("Home"));
        assert!(!fetched.completed);
    }

    #[tokio::test]
    async fn completing_an_overdue_task_moves_it_out_of_overdue() {
        let svc = service();
        let owner = OwnerId::new();
        let yesterday = noon().with_timezone(&Utc) - Duration::days(1);
        let task = svc.create(owner, due("Late", yesterday)).await.unwrap();

        assert_eq!(svc.overdue(owner).await.unwrap().len(), 1);
        assert_eq!(svc.stats(owner).await.unwrap().overdue, 1);

        let done = UpdateTaskRequest {
            completed: Some(true),
            ..UpdateTaskRequest::default()
        };
        let updated = svc.update(owner, task.id, done).await.unwrap();

        assert!(updated.completed_at.is_some());
        assert!(svc.overdue(owner).await.unwrap().is_empty());
        assert_eq!(svc.stats(owner).await.unwrap().overdue, 0);
    }

    #[tokio::test]
    async fn important_tag_controls_tag_filtered_listing() {
        let svc = service();
        let owner = OwnerId::new();
        let task = svc.create(owner, titled("Renew passport")).await.unwrap();
        let important = FilterCriteria::new().with_tag(IMPORTANT_TAG);

        assert!(svc.list(owner, &important).await.unwrap().is_empty());

        let star = UpdateTaskRequest {
            tags: Some(vec![IMPORTANT_TAG.into()]),
            ..UpdateTaskRequest::default()
        };
        svc.update(owner, task.id, star).await.unwrap();
        assert_eq!(svc.list(owner, &important).await.unwrap().len(), 1);

        let unstar = UpdateTaskRequest {
            tags: Some(Vec::new()),
            ..UpdateTaskRequest::default()
        };
        svc.update(owner, task.id, unstar).await.unwrap();
        assert!(svc.list(owner, &important).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_tasks_are_not_found() {
        let svc = service();
        let owner = OwnerId::new();
        let stranger = OwnerId::new();
        let task = svc.create(owner, titled("Mine")).await.unwrap();

        assert!(matches!(
            svc.get(stranger, task.id).await,
            Err(ApiError::NotFound("task"))
        ));
        assert!(matches!(
            svc.update(stranger, task.id, UpdateTaskRequest::default()).await,
            Err(ApiError::NotFound("task"))
        ));
        assert!(matches!(
            svc.delete(stranger, task.id).await,
            Err(ApiError::NotFound("task"))
        ));
        assert!(svc
            .list(stranger, &FilterCriteria::new())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let svc = service();
        let owner = OwnerId::new();
        let task = svc.create(owner, titled("Once")).await.unwrap();

        svc.delete(owner, task.id).await.unwrap();
        assert!(matches!(
            svc.delete(owner, task.id).await,
            Err(ApiError::NotFound("task"))
        ));
    }

    #[tokio::test]
    async fn subtasks_append_and_toggle_without_touching_parent_timestamps() {
        let svc = service();
        let owner = OwnerId::new();
        let task = svc.create(owner, titled("Move house")).await.unwrap();

        let with_sub = svc
            .add_subtask(
                owner,
                task.id,
                AddSubtaskRequest {
                    title: Some("Book van".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(with_sub.subtasks.len(), 1);
        let sub_id = with_sub.subtasks[0].id;

        let toggled = svc
            .update_subtask(
                owner,
                task.id,
                sub_id,
                UpdateSubtaskRequest {
                    completed: Some(true),
                },
            )
            .await
            .unwrap();
        assert!(toggled.subtasks[0].completed);
        assert_eq!(toggled.updated_at, task.updated_at);
        assert!(!toggled.completed);

        assert!(matches!(
            svc.update_subtask(
                owner,
                task.id,
                Uuid::new_v4(),
                UpdateSubtaskRequest {
                    completed: Some(true)
                }
            )
            .await,
            Err(ApiError::NotFound("subtask"))
        ));
    }

    #[tokio::test]
    async fn writes_racing_a_delete_are_not_found() {
        let store = Arc::new(DeletedBeforeSave::default());
        let svc = TaskService::new(Arc::clone(&store), Arc::new(FixedClock(noon())));
        let owner = OwnerId::new();

        let task = svc.create(owner, titled("Short-lived")).await.unwrap();
        assert!(matches!(
            svc.update(owner, task.id, UpdateTaskRequest::default()).await,
            Err(ApiError::NotFound("task"))
        ));
        assert!(store.get(owner, task.id).await.unwrap().is_none());

        let task = svc.create(owner, titled("Also short-lived")).await.unwrap();
        assert!(matches!(
            svc.add_subtask(
                owner,
                task.id,
                AddSubtaskRequest {
                    title: Some("Never saved".into()),
                },
            )
            .await,
            Err(ApiError::NotFound("task"))
        ));
        assert!(store.list(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_title_is_a_validation_error() {
        let svc = service();
        let result = svc.create(OwnerId::new(), titled("  ")).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
