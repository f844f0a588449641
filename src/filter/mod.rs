pub mod types;
pub mod error;

pub use error::FilterError;
pub use types::*;
