use axum::{
    extract::{Path, State},
    Extension,
};

use crate::api::TaskView;
use crate::app::AppState;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// POST /tareas/:id/toggle_completado/ - flip `completado`, body ignored
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<TaskView> {
    let task = state.tasks.toggle_completed(&user, parse_id(&id)?).await?;
    Ok(ApiResponse::success(task))
}
