use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Invalid boolean for '{field}': {value}")]
    InvalidBoolean { field: &'static str, value: String },

    #[error("Invalid page: {0}")]
    InvalidPage(String),
}
