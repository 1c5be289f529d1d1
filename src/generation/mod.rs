//! Generation domain module - turns a form definition into code artifacts
//!
//! A [`GenerationOrchestrator`] drives one [`GenerationJob`] per request: it
//! builds a [`TemplateModel`] from the form, renders every enabled
//! [`ArtifactFamily`] through the [`TemplateRenderer`] port, then hands the
//! artifacts to the organizer and packager ports.

pub mod artifact;
pub mod errors;
pub mod family;
pub mod form;
pub mod job;
pub mod model;
pub mod options;
pub mod orchestrator;
pub mod organized;
pub mod traits;
pub mod type_mapping;

pub use artifact::*;
pub use errors::*;
pub use family::*;
pub use form::*;
pub use job::*;
pub use model::*;
pub use options::*;
pub use orchestrator::*;
pub use organized::*;
pub use traits::*;
pub use type_mapping::{TypeMapping, map_field_type};
