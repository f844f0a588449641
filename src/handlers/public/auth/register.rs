use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::Credentials;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::UserSummary;

/// POST /auth/register/ - create an account
///
/// 201 with `{id, username}`; 409 when the username is taken;
/// 403 when registration is disabled for this environment.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<UserSummary> {
    let Json(credentials) = payload?;
    let user = state.users.register(&credentials.username, &credentials.password).await?;
    Ok(ApiResponse::created(user))
}
