//! Template system for code generation.
//!
//! The [`TemplateRegistry`] is the catalogue of named, file-backed templates
//! (built in, or loaded from a YAML manifest). The [`TemplateEngine`] compiles
//! their sources with Tera, caches the result and renders it with the naming
//! helpers registered.

pub mod engine;
pub mod manifest;
pub mod registry;

pub use engine::*;
pub use manifest::*;
pub use registry::*;
