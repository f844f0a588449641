pub mod error;
pub mod task_service;
pub mod user_service;

pub use error::ServiceError;
pub use task_service::TaskService;
pub use user_service::{LoginGrant, UserService};
