//! HTTP routes under `/api/tasks`.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::Json,
    routing::{get, post, put},
    Router,
};
use taskify_shared::{
    AddSubtaskRequest, CreateTaskRequest, FilterCriteria, MessageEnvelope, StatsEnvelope,
    TaskEnvelope, TaskListEnvelope, TaskQuery, UpdateSubtaskRequest, UpdateTaskRequest,
};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::auth::{AccountDirectory, Owner};
use crate::error::{ApiError, ApiResult};
use crate::service::TaskService;
use crate::store::TaskStore;

/// Everything a handler needs, passed explicitly through axum's state.
pub struct AppState<S> {
    pub tasks: TaskService<S>,
    pub accounts: Arc<AccountDirectory>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
            accounts: Arc::clone(&self.accounts),
        }
    }
}

pub fn router<S: TaskStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/tasks", get(list_tasks::<S>).post(create_task::<S>))
        .route("/api/tasks/stats", get(task_stats::<S>))
        .route("/api/tasks/overdue", get(overdue_tasks::<S>))
        .route(
            "/api/tasks/:id",
            get(get_task::<S>)
                .put(update_task::<S>)
                .delete(delete_task::<S>),
        )
        .route("/api/tasks/:id/subtasks", post(add_subtask::<S>))
        .route(
            "/api/tasks/:id/subtasks/:subtask_id",
            put(update_subtask::<S>),
        )
        .with_state(state)
}

/// Restrict CORS to the configured client origin, or allow any origin.
pub fn cors_layer(client_url: Option<&str>) -> anyhow::Result<CorsLayer> {
    let Some(origin) = client_url else {
        return Ok(CorsLayer::permissive());
    };
    let origin = HeaderValue::from_str(origin.trim_end_matches('/'))
        .with_context(|| format!("invalid client origin: {origin}"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]))
}

async fn root() -> &'static str {
    "API is running"
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn path<T>(param: Result<Path<T>, PathRejection>) -> ApiResult<T> {
    param
        .map(|Path(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

async fn list_tasks<S: TaskStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<TaskListEnvelope>> {
    let Query(pairs) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let criteria = FilterCriteria::from(TaskQuery::from_pairs(pairs));
    let tasks = state.tasks.list(owner, &criteria).await?;
    Ok(Json(TaskListEnvelope { tasks }))
}

async fn task_stats<S: TaskStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
) -> ApiResult<Json<StatsEnvelope>> {
    let stats = state.tasks.stats(owner).await?;
    Ok(Json(StatsEnvelope { stats }))
}

async fn overdue_tasks<S: TaskStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
) -> ApiResult<Json<TaskListEnvelope>> {
    let tasks = state.tasks.overdue(owner).await?;
    Ok(Json(TaskListEnvelope { tasks }))
}

async fn get_task<S: TaskStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<TaskEnvelope>> {
    let task = state.tasks.get(owner, path(id)?).await?;
    Ok(Json(TaskEnvelope { task }))
}

async fn create_task<S: TaskStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskEnvelope>)> {
    let task = state.tasks.create(owner, body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(TaskEnvelope { task })))
}

async fn update_task<S: TaskStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskEnvelope>> {
    let id = path(id)?;
    let task = state.tasks.update(owner, id, body(payload)?).await?;
    Ok(Json(TaskEnvelope { task }))
}

async fn delete_task<S: TaskStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<MessageEnvelope>> {
    state.tasks.delete(owner, path(id)?).await?;
    Ok(Json(MessageEnvelope {
        message: "Task deleted successfully".to_string(),
    }))
}

async fn add_subtask<S: TaskStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AddSubtaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskEnvelope>)> {
    let id = path(id)?;
    let task = state.tasks.add_subtask(owner, id, body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(TaskEnvelope { task })))
}

async fn update_subtask<S: TaskStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
    payload: Result<Json<UpdateSubtaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskEnvelope>> {
    let (id, subtask_id) = path(ids)?;
    let task = state
        .tasks
        .update_subtask(owner, id, subtask_id, body(payload)?)
        .await?;
    Ok(Json(TaskEnvelope { task }))
}
