//! Artifact type to destination folder table

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::utils::is_confined_relative;
use crate::generation::{ArtifactType, GenerationError};

/// Default destination of every artifact type, relative to the project root.
/// An empty folder means the project root itself.
pub const DEFAULT_FOLDERS: &[(ArtifactType, &str)] = &[
    (ArtifactType::Entity, "Backend/Models/Entities"),
    (ArtifactType::RepositoryInterface, "Backend/Repositories/Interfaces"),
    (ArtifactType::Repository, "Backend/Repositories"),
    (ArtifactType::Controller, "Backend/Controllers"),
    (ArtifactType::Dto, "Backend/Models/DTOs"),
    (ArtifactType::MappingProfile, "Backend/Mappings"),
    (ArtifactType::Validator, "Backend/Validation"),
    (ArtifactType::UnitTest, "Tests/Unit"),
    (ArtifactType::SqlTable, "Database/Tables"),
    (ArtifactType::StoredProcedure, "Database/StoredProcedures"),
    (ArtifactType::UiComponent, "Frontend/src/components"),
    (ArtifactType::UiTypes, "Frontend/src/types"),
    (ArtifactType::UiValidation, "Frontend/src/validation"),
    (ArtifactType::ProjectFile, ""),
    (ArtifactType::Dockerfile, "Deployment"),
    (ArtifactType::CiPipeline, ".github/workflows"),
    (ArtifactType::AppSettings, "Backend"),
];

/// Mapping from artifact type to a folder relative to the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderLayout {
    folders: BTreeMap<ArtifactType, PathBuf>,
}

impl Default for FolderLayout {
    fn default() -> Self {
        Self {
            folders: DEFAULT_FOLDERS
                .iter()
                .map(|(artifact_type, folder)| (*artifact_type, PathBuf::from(folder)))
                .collect(),
        }
    }
}

impl FolderLayout {
    /// A layout with no mappings
    pub fn empty() -> Self {
        Self {
            folders: BTreeMap::new(),
        }
    }

    pub fn with_folder(mut self, artifact_type: ArtifactType, folder: impl Into<PathBuf>) -> Self {
        self.folders.insert(artifact_type, folder.into());
        self
    }

    /// The default layout with `overrides` replacing individual entries
    pub fn with_overrides(overrides: &BTreeMap<ArtifactType, PathBuf>) -> Self {
        let mut layout = Self::default();
        for (artifact_type, folder) in overrides {
            layout.folders.insert(*artifact_type, folder.clone());
        }
        layout
    }

    pub fn folder_for(&self, artifact_type: ArtifactType) -> Option<&Path> {
        self.folders.get(&artifact_type).map(PathBuf::as_path)
    }

    /// Defined artifact types that have no folder
    pub fn unmapped(&self) -> Vec<ArtifactType> {
        ArtifactType::ALL
            .into_iter()
            .filter(|t| !self.folders.contains_key(t))
            .collect()
    }

    /// Every folder must stay inside the project root
    pub fn validate_paths(&self) -> Result<(), GenerationError> {
        for (artifact_type, folder) in &self.folders {
            if !is_confined_relative(folder) {
                return Err(GenerationError::Organize(format!(
                    "Folder for {artifact_type} must be relative to the project root: {}",
                    folder.display()
                )));
            }
        }
        Ok(())
    }

    /// Checks the layout is total over [`ArtifactType::ALL`] and path-safe
    pub fn validate(&self) -> Result<(), GenerationError> {
        self.validate_paths()?;
        let unmapped = self.unmapped();
        if !unmapped.is_empty() {
            let names: Vec<_> = unmapped.iter().map(ArtifactType::as_str).collect();
            return Err(GenerationError::Organize(format!(
                "No folder mapped for artifact types: {}",
                names.join(", ")
            )));
        }
        Ok(())
    }
}
