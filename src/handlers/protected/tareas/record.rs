use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::api::TaskView;
use crate::app::AppState;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// GET /tareas/:id/
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<TaskView> {
    let task = state.tasks.retrieve(&user, parse_id(&id)?).await?;
    Ok(ApiResponse::success(task))
}

/// PUT /tareas/:id/ - full replacement of the editable fields
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<TaskView> {
    let id = parse_id(&id)?;
    let Json(body) = payload?;
    let task = state.tasks.update(&user, id, &body).await?;
    Ok(ApiResponse::success(task))
}

/// PATCH /tareas/:id/ - partial update
pub async fn patch(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<TaskView> {
    let id = parse_id(&id)?;
    let Json(body) = payload?;
    let task = state.tasks.partial_update(&user, id, &body).await?;
    Ok(ApiResponse::success(task))
}

/// DELETE /tareas/:id/ - 204 on success
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.tasks.delete(&user, parse_id(&id)?).await?;
    Ok(ApiResponse::no_content())
}
