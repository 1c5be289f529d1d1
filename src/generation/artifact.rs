//! Generated artifacts and their type tags

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::generation::GenerationError;

/// Kind of generated file. Drives folder placement and manifest grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    Entity,
    RepositoryInterface,
    Repository,
    Controller,
    Dto,
    MappingProfile,
    Validator,
    UnitTest,
    SqlTable,
    StoredProcedure,
    UiComponent,
    UiTypes,
    UiValidation,
    ProjectFile,
    Dockerfile,
    CiPipeline,
    AppSettings,
}

/// Architectural grouping used by the generated README and the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactCategory {
    ObjectModel,
    Test,
    Relational,
    Ui,
    Deployment,
}

impl ArtifactType {
    /// Every defined artifact type, in declaration order
    pub const ALL: [ArtifactType; 17] = [
        Self::Entity,
        Self::RepositoryInterface,
        Self::Repository,
        Self::Controller,
        Self::Dto,
        Self::MappingProfile,
        Self::Validator,
        Self::UnitTest,
        Self::SqlTable,
        Self::StoredProcedure,
        Self::UiComponent,
        Self::UiTypes,
        Self::UiValidation,
        Self::ProjectFile,
        Self::Dockerfile,
        Self::CiPipeline,
        Self::AppSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::RepositoryInterface => "repository_interface",
            Self::Repository => "repository",
            Self::Controller => "controller",
            Self::Dto => "dto",
            Self::MappingProfile => "mapping_profile",
            Self::Validator => "validator",
            Self::UnitTest => "unit_test",
            Self::SqlTable => "sql_table",
            Self::StoredProcedure => "stored_procedure",
            Self::UiComponent => "ui_component",
            Self::UiTypes => "ui_types",
            Self::UiValidation => "ui_validation",
            Self::ProjectFile => "project_file",
            Self::Dockerfile => "dockerfile",
            Self::CiPipeline => "ci_pipeline",
            Self::AppSettings => "app_settings",
        }
    }

    /// Category this type is listed under
    pub fn category(&self) -> ArtifactCategory {
        match self {
            Self::Entity
            | Self::RepositoryInterface
            | Self::Repository
            | Self::Controller
            | Self::Dto
            | Self::MappingProfile
            | Self::Validator => ArtifactCategory::ObjectModel,
            Self::UnitTest => ArtifactCategory::Test,
            Self::SqlTable | Self::StoredProcedure => ArtifactCategory::Relational,
            Self::UiComponent | Self::UiTypes | Self::UiValidation => ArtifactCategory::Ui,
            Self::ProjectFile | Self::Dockerfile | Self::CiPipeline | Self::AppSettings => {
                ArtifactCategory::Deployment
            }
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactType {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| GenerationError::validation(format!("Unknown artifact type: {s}")))
    }
}

impl ArtifactCategory {
    pub const ALL: [ArtifactCategory; 5] = [
        Self::ObjectModel,
        Self::Test,
        Self::Relational,
        Self::Ui,
        Self::Deployment,
    ];

    /// Heading used in the generated README
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ObjectModel => "Backend",
            Self::Test => "Tests",
            Self::Relational => "Database",
            Self::Ui => "Frontend",
            Self::Deployment => "Deployment",
        }
    }
}

impl fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One generated file. Hash and size are derived from the content and never
/// change after construction. Deserialized values are checked against their
/// content the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ArtifactRecord")]
pub struct GeneratedArtifact {
    artifact_type: ArtifactType,
    file_path: String,
    content: String,
    content_hash: String,
    size_bytes: u64,
    generated_at: DateTime<Utc>,
}

impl GeneratedArtifact {
    pub fn new(
        artifact_type: ArtifactType,
        file_path: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let file_path = file_path.into();
        if file_path.trim().is_empty() {
            return Err(GenerationError::validation("Artifact file path is required"));
        }
        let content = content.into();

        Ok(Self {
            artifact_type,
            content_hash: content_hash(content.as_bytes()),
            size_bytes: content.len() as u64,
            file_path,
            content,
            generated_at: Utc::now(),
        })
    }

    pub fn artifact_type(&self) -> ArtifactType {
        self.artifact_type
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

/// Persisted shape of a [`GeneratedArtifact`]
#[derive(Deserialize)]
struct ArtifactRecord {
    artifact_type: ArtifactType,
    file_path: String,
    content: String,
    content_hash: String,
    size_bytes: u64,
    generated_at: DateTime<Utc>,
}

impl TryFrom<ArtifactRecord> for GeneratedArtifact {
    type Error = GenerationError;

    fn try_from(record: ArtifactRecord) -> Result<Self, Self::Error> {
        let artifact = Self::new(record.artifact_type, record.file_path, record.content)?;
        if artifact.content_hash != record.content_hash {
            return Err(GenerationError::validation(format!(
                "Content hash of {} does not match its content",
                artifact.file_path
            )));
        }
        if artifact.size_bytes != record.size_bytes {
            return Err(GenerationError::validation(format!(
                "Size of {} is {} bytes, not {}",
                artifact.file_path, artifact.size_bytes, record.size_bytes
            )));
        }
        Ok(Self {
            generated_at: record.generated_at,
            ..artifact
        })
    }
}

/// Lower-case hex SHA-256 of `bytes`
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
