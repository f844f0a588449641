pub mod collection;
pub mod record;
pub mod toggle;

// Re-export handler functions for use in routing
pub use collection::get as collection_get;
pub use collection::post as collection_post;

pub use record::delete as record_delete;
pub use record::get as record_get;
pub use record::patch as record_patch;
pub use record::put as record_put;

pub use toggle::post as toggle_post;

/// Collection path, also the base of pagination links
pub const BASE_PATH: &str = "/tareas/";
