//! Core building blocks shared by the generation pipeline and the CLI:
//! configuration, input errors, naming utilities and the template system.

pub mod config;
pub mod error;
pub mod templates;
pub mod utils;

pub use error::Error;
