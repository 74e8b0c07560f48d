//! Common types and utilities for the checkout server

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
