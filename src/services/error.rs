use thiserror::Error;

use crate::api::ValidationError;
use crate::auth::AuthError;
use crate::database::StoreError;
use crate::filter::FilterError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Absent, or owned by someone else
    #[error("Not found")]
    NotFound,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("User registration is disabled")]
    RegistrationDisabled,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
