// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (bearer JWT, scoped to the caller)
pub mod public;
pub mod protected;

use crate::error::ApiError;

/// Path ids are numeric; anything else cannot name a tarea
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::not_found("No encontrado."))
}
