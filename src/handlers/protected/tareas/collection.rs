use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use serde_json::Value;

use super::BASE_PATH;
use crate::api::{Paginated, TaskView};
use crate::app::AppState;
use crate::filter::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// GET /tareas/ - the caller's tareas, newest first
///
/// Query parameters: `completado`, `titulo` (exact match), `page` (number or `last`).
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Paginated<TaskView>> {
    let Query(query) = query?;
    let page = state.tasks.list(&user, &query, BASE_PATH).await?;
    Ok(ApiResponse::success(page))
}

/// POST /tareas/ - create a tarea owned by the caller
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<TaskView> {
    let Json(body) = payload?;
    let task = state.tasks.create(&user, &body).await?;
    Ok(ApiResponse::created(task))
}
