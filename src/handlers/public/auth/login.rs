use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::Credentials;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LoginGrant;

/// POST /auth/login/ - authenticate and receive a bearer token
///
/// ```json
/// { "username": "ana", "password": "..." }
/// ```
///
/// Unknown users and wrong passwords both answer 401 with the same message.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<LoginGrant> {
    let Json(credentials) = payload?;
    let grant = state.users.login(&credentials.username, &credentials.password).await?;
    Ok(ApiResponse::success(grant))
}
