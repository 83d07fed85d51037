//! Task API endpoints
//!
//! RESTful API over the task repository.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use taskdeck_core::task::{
    FormError, RepositoryState, SortOrder, Task, TaskForm, TaskId, TaskStatus,
};
use taskdeck_core::TaskError;

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    #[serde(default)]
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: TaskStatus,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn not_found(id: &TaskId) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("Task {} not found", id))
}

fn bad_request(e: FormError) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, e.to_string())
}

/// Repository failures carry a generic message; the cause is already logged
fn repository_error(e: TaskError) -> ApiError {
    match e {
        TaskError::NotFound(id) => not_found(&id),
        other => api_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

fn find(tasks: Vec<Task>, id: &TaskId) -> Result<Task, ApiError> {
    tasks
        .into_iter()
        .find(|t| &t.id == id)
        .ok_or_else(|| not_found(id))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/tasks - List tasks, optionally re-sorting the view
async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> Json<Vec<Task>> {
    let repo = state.repository();
    let tasks = match query.sort {
        Some(order) => repo.sort(order).await,
        None => repo.list().await,
    };
    Json(tasks)
}

/// POST /api/tasks - Create and add a new task
async fn create_task(
    State(state): State<AppState>,
    Json(form): Json<TaskForm>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let repo = state.repository();
    let task = form.into_task(repo).map_err(bad_request)?;

    repo.add(task.clone()).await.map_err(repository_error)?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks/{id} - Get a single task
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = TaskId::from(id);
    state
        .repository()
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// PUT /api/tasks/{id} - Replace a task's editable fields
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<TaskForm>,
) -> Result<Json<Task>, ApiError> {
    let id = TaskId::from(id);
    let repo = state.repository();

    let existing = repo.get(&id).await.ok_or_else(|| not_found(&id))?;
    let task = form.apply_to(&existing).map_err(bad_request)?;

    let tasks = repo.update(task).await.map_err(repository_error)?;
    find(tasks, &id).map(Json)
}

/// PUT /api/tasks/{id}/status - Move a task to another status
async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<Task>, ApiError> {
    let id = TaskId::from(id);
    let tasks = state
        .repository()
        .change_status(&id, req.status)
        .await
        .map_err(repository_error)?;
    find(tasks, &id).map(Json)
}

/// DELETE /api/tasks/{id} - Delete a task; unknown ids succeed
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .repository()
        .remove(&TaskId::from(id))
        .await
        .map_err(repository_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tasks/reload - Re-read the store
async fn reload_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state
        .repository()
        .reload()
        .await
        .map_err(repository_error)?;
    Ok(Json(tasks))
}

/// GET /api/state - Loading and last error
async fn repository_state(State(state): State<AppState>) -> Json<RepositoryState> {
    Json(state.repository().state().await)
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/reload", post(reload_tasks))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/tasks/{id}/status", put(change_status))
        .route("/api/state", get(repository_state))
}
