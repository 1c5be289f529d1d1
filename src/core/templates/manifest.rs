//! Registry manifest file format.
//!
//! A manifest is a YAML document listing the templates to register, as an
//! alternative to the built-in catalogue:
//!
//! ```yaml
//! templates:
//!   - name: entity
//!     artifact_type: entity
//!     source: object_model/entity.cs.tera
//!     output_pattern: "{EntityName}.cs"
//!     priority: 10
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::core::templates::registry::{TemplateMetadata, TemplateRegistry};
use crate::generation::{ArtifactCategory, ArtifactType, GenerationError};

/// The root manifest structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryManifest {
    /// Template root; relative paths resolve against the manifest's directory
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Templates to register, in order
    #[serde(default)]
    pub templates: Vec<ManifestEntry>,
}

/// One template entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub artifact_type: ArtifactType,
    pub source: PathBuf,
    pub output_pattern: String,

    /// Defaults to the artifact type's category
    #[serde(default)]
    pub category: Option<ArtifactCategory>,

    #[serde(default)]
    pub priority: u32,
}

impl From<ManifestEntry> for TemplateMetadata {
    fn from(entry: ManifestEntry) -> Self {
        let category = entry
            .category
            .unwrap_or_else(|| entry.artifact_type.category());
        Self {
            name: entry.name,
            artifact_type: entry.artifact_type,
            source: entry.source,
            output_pattern: entry.output_pattern,
            category,
            priority: entry.priority,
        }
    }
}

impl RegistryManifest {
    pub fn parse(content: &str) -> Result<Self, GenerationError> {
        serde_yaml::from_str(content)
            .map_err(|e| GenerationError::Registry(format!("Invalid registry manifest: {e}")))
    }

    /// Load a manifest from disk
    pub async fn load(path: &Path) -> Result<Self, GenerationError> {
        debug!(path = %path.display(), "Loading registry manifest");
        let content = fs::read_to_string(path).await.map_err(|e| {
            GenerationError::Registry(format!(
                "Failed to read registry manifest {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&content)
    }

    /// Build a registry rooted at `default_root` unless the manifest names its own root
    pub fn into_registry(self, default_root: &Path) -> Result<TemplateRegistry, GenerationError> {
        let root = match self.root {
            Some(root) if root.is_absolute() => root,
            Some(root) => default_root.join(root),
            None => default_root.to_path_buf(),
        };

        let mut builder = TemplateRegistry::builder(root);
        for entry in self.templates {
            builder.register(entry.into());
        }
        builder.build()
    }
}

impl TemplateRegistry {
    /// Build a registry from a YAML manifest. Sources resolve against the
    /// manifest's directory unless it declares a `root`.
    pub async fn from_manifest(path: &Path) -> Result<Self, GenerationError> {
        let manifest = RegistryManifest::load(path).await?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        manifest.into_registry(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MANIFEST: &str = r#"
templates:
  - name: entity
    artifact_type: entity
    source: object_model/entity.cs.tera
    output_pattern: "{EntityName}.cs"
    priority: 10
  - name: summary
    artifact_type: dto
    source: extra/summary.cs.tera
    output_pattern: "{EntityName}Summary.cs"
    category: object_model
    priority: 55
"#;

    #[test]
    fn test_parse_manifest_defaults_category() {
        let manifest = RegistryManifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.templates.len(), 2);
        assert!(manifest.templates[0].category.is_none());

        let metadata: TemplateMetadata = manifest.templates[0].clone().into();
        assert_eq!(metadata.category, ArtifactCategory::ObjectModel);
    }

    #[test]
    fn test_parse_rejects_unknown_artifact_type() {
        let err = RegistryManifest::parse(
            "templates:\n  - name: x\n    artifact_type: spaceship\n    source: x\n    output_pattern: x\n",
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::Registry(_)));
    }

    #[tokio::test]
    async fn test_from_manifest_resolves_against_manifest_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.yaml");
        tokio::fs::write(&path, MANIFEST).await.unwrap();

        let registry = TemplateRegistry::from_manifest(&path).await.unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.root(), dir.path());
        assert_eq!(
            registry.source_path("summary").unwrap(),
            dir.path().join("extra/summary.cs.tera")
        );

        let ordered: Vec<_> = registry
            .by_category(ArtifactCategory::ObjectModel)
            .iter()
            .map(|m| m.name.clone())
            .collect();
        assert_eq!(ordered, vec!["entity", "summary"]);
    }

    #[tokio::test]
    async fn test_from_manifest_missing_file() {
        let dir = tempdir().unwrap();
        let err = TemplateRegistry::from_manifest(&dir.path().join("absent.yaml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read registry manifest"));
    }

    #[test]
    fn test_manifest_root_override() {
        let manifest = RegistryManifest {
            root: Some(PathBuf::from("custom")),
            templates: vec![],
        };
        let registry = manifest.into_registry(Path::new("/base")).unwrap();
        assert_eq!(registry.root(), Path::new("/base/custom"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_manifest_with_escaping_output_pattern_is_rejected() {
        let manifest = RegistryManifest::parse(
            "templates:\n  - name: x\n    artifact_type: entity\n    source: x.tera\n    output_pattern: \"../../../../{EntityName}.cs\"\n",
        )
        .unwrap();
        let err = manifest.into_registry(Path::new("/base")).unwrap_err();
        assert!(matches!(err, GenerationError::Registry(ref m) if m.contains("'x' output pattern")));
    }
}
