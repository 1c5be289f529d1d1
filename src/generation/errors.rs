//! Error types for the generation domain

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::generation::{GenerationJob, JobStatus};

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot {operation} job in state {status}")]
    InvalidState {
        operation: &'static str,
        status: JobStatus,
    },

    #[error("Template '{name}' not found at {}", path.display())]
    TemplateNotFound { name: String, path: PathBuf },

    #[error("Template '{name}' is not registered. Registered templates: {}", registered.join(", "))]
    UnknownTemplate {
        name: String,
        registered: Vec<String>,
    },

    #[error("Failed to compile template '{name}': {}", diagnostics.join("; "))]
    TemplateCompile {
        name: String,
        diagnostics: Vec<String>,
    },

    #[error("Failed to render template '{name}': {message}")]
    Render { name: String, message: String },

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Organize error: {0}")]
    Organize(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Generation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    JobFailed(Box<JobFailure>),
}

impl GenerationError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// The failed job carried by a [`GenerationError::JobFailed`], if any
    pub fn failed_job(&self) -> Option<&GenerationJob> {
        match self {
            Self::JobFailed(failure) => Some(&failure.job),
            _ => None,
        }
    }
}

/// A generation run that failed after its job was created.
///
/// The job has already been moved to `Failed` and its recorded error message
/// is the display text of `error`.
#[derive(Error, Debug)]
#[error("Generation job {job_id} failed: {error}")]
pub struct JobFailure {
    pub job_id: Uuid,
    pub job: GenerationJob,
    #[source]
    pub error: GenerationError,
}

/// Collects the display text of an error and every error in its source chain.
pub fn error_chain(error: &dyn std::error::Error) -> Vec<String> {
    let mut messages = vec![error.to_string()];
    let mut source = error.source();
    while let Some(inner) = source {
        let message = inner.to_string();
        if !messages.contains(&message) {
            messages.push(message);
        }
        source = inner.source();
    }
    messages
}
