//! Caller-supplied generation options

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::generation::GenerationError;

/// Relational database family the schema artifacts target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseKind {
    #[default]
    SqlServer,
    PostgreSql,
    MySql,
    Sqlite,
}

impl DatabaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SqlServer => "sqlserver",
            Self::PostgreSql => "postgresql",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseKind {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlserver" | "mssql" | "sql_server" => Ok(Self::SqlServer),
            "postgresql" | "postgres" | "pg" => Ok(Self::PostgreSql),
            "mysql" => Ok(Self::MySql),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(GenerationError::validation(format!(
                "Unknown database kind: {s}"
            ))),
        }
    }
}

/// Which artifact families to produce plus naming metadata.
///
/// Supplied by the caller and never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub generate_object_model: bool,
    pub generate_relational_schema: bool,
    pub generate_ui_components: bool,
    pub generate_deployment: bool,
    pub project_name: String,
    pub namespace: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub target_database: DatabaseKind,
    pub additional_imports: BTreeMap<String, String>,
    pub custom_settings: BTreeMap<String, String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            generate_object_model: true,
            generate_relational_schema: true,
            generate_ui_components: true,
            generate_deployment: false,
            project_name: String::new(),
            namespace: None,
            author: None,
            description: None,
            target_database: DatabaseKind::default(),
            additional_imports: BTreeMap::new(),
            custom_settings: BTreeMap::new(),
        }
    }
}

impl GenerationOptions {
    /// Options with every family disabled, for callers that opt in explicitly
    pub fn none(project_name: impl Into<String>) -> Self {
        Self {
            generate_object_model: false,
            generate_relational_schema: false,
            generate_ui_components: false,
            generate_deployment: false,
            project_name: project_name.into(),
            ..Default::default()
        }
    }

    pub fn any_family_enabled(&self) -> bool {
        self.generate_object_model
            || self.generate_relational_schema
            || self.generate_ui_components
            || self.generate_deployment
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.project_name.trim().is_empty() {
            return Err(GenerationError::validation("Project name is required"));
        }
        if self.namespace.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(GenerationError::validation(
                "Namespace cannot be empty when provided",
            ));
        }
        if !self.any_family_enabled() {
            return Err(GenerationError::validation(
                "At least one artifact family must be enabled",
            ));
        }
        Ok(())
    }
}
