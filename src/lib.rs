//! formgen - generates object-model, relational-schema, UI and deployment
//! artifacts from a form definition and packages them into an archive.

pub mod core;
pub mod generation;
pub mod infrastructure;
