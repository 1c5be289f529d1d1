//! Result of writing a run's artifacts to disk

use std::path::PathBuf;

use serde::Serialize;

use crate::generation::ArtifactType;

/// One file written by the organizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizedFile {
    pub artifact_type: ArtifactType,
    pub full_path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
}

/// Root folder of an organized run and the artifact files written under it.
///
/// Manifest files (README, ignore file) live under `root` but are not listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizedArtifacts {
    pub root: PathBuf,
    pub files: Vec<OrganizedFile>,
}

impl OrganizedArtifacts {
    pub fn total_size_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}
