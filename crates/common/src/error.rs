//! Error types

use thiserror::Error;

/// Main error type shared across the workspace
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
