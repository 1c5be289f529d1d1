//! Error handling for configuration and input loading.
//!
//! This module defines the error type used while reading configuration files
//! and form definitions, along with a convenient `Result` alias. Pipeline
//! failures use [`crate::generation::GenerationError`] instead.
//!
//! # Examples
//!
//! ```
//! use formgen::core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::config("missing output directory"))
//! }
//! assert!(might_fail().is_err());
//! ```

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure while reading a configuration file or a form definition
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The definition parsed but is unusable (no fields, duplicate names)
    #[error("Form definition error: {0}")]
    Form(String),

    /// Unreadable file or unsupported format
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn form<S: Into<String>>(msg: S) -> Self {
        Self::Form(msg.into())
    }
}
