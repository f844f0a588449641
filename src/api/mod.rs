//! Mapping between HTTP payloads and the task model

pub mod format;
pub mod pagination;
pub mod validate;

pub use format::TaskView;
pub use pagination::Paginated;
pub use validate::{parse_payload, PayloadMode, TaskFields, ValidationError, ValidationKind};
