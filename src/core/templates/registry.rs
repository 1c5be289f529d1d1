//! Template registry - the catalogue of named, file-backed templates.
//!
//! The registry is assembled once through [`TemplateRegistryBuilder`] and is
//! read-only afterwards; share it behind an `Arc`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::utils::is_confined_relative;
use crate::generation::{ArtifactCategory, ArtifactType, GenerationError};

/// Placeholder substituted with the entity name in output patterns
pub const ENTITY_NAME_PLACEHOLDER: &str = "{EntityName}";

/// Metadata describing one registered template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    /// Unique template name
    pub name: String,
    /// Artifact type the template produces
    pub artifact_type: ArtifactType,
    /// Source file, relative to the registry root
    pub source: PathBuf,
    /// Output file name pattern, e.g. `{EntityName}Dto.cs`
    pub output_pattern: String,
    /// Grouping used for folder layout and listings
    pub category: ArtifactCategory,
    /// Render and display order inside a category (lower first)
    pub priority: u32,
}

impl TemplateMetadata {
    pub fn new(
        name: impl Into<String>,
        artifact_type: ArtifactType,
        source: impl Into<PathBuf>,
        output_pattern: impl Into<String>,
        priority: u32,
    ) -> Self {
        Self {
            name: name.into(),
            artifact_type,
            source: source.into(),
            output_pattern: output_pattern.into(),
            category: artifact_type.category(),
            priority,
        }
    }

    /// Output file name for an entity; only `{EntityName}` is substituted.
    pub fn output_file_name(&self, entity_name: &str) -> String {
        self.output_pattern
            .replace(ENTITY_NAME_PLACEHOLDER, entity_name)
    }
}

/// A registered template whose source file is missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTemplate {
    pub name: String,
    pub path: PathBuf,
}

/// Result of [`TemplateRegistry::validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryValidation {
    pub checked: usize,
    pub missing: Vec<MissingTemplate>,
}

impl RegistryValidation {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Counts reported by [`TemplateRegistry::stats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub total: usize,
    pub by_category: BTreeMap<ArtifactCategory, usize>,
}

/// Collects template metadata before freezing it into a [`TemplateRegistry`]
#[derive(Debug, Default)]
pub struct TemplateRegistryBuilder {
    root: PathBuf,
    templates: BTreeMap<String, TemplateMetadata>,
}

impl TemplateRegistryBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            templates: BTreeMap::new(),
        }
    }

    /// Register a template. Re-registering a name replaces the earlier entry.
    pub fn register(&mut self, metadata: TemplateMetadata) -> &mut Self {
        if let Some(previous) = self.templates.insert(metadata.name.clone(), metadata) {
            warn!(
                template = %previous.name,
                previous_source = %previous.source.display(),
                "Template registered twice; keeping the latest entry"
            );
        }
        self
    }

    pub fn build(self) -> Result<TemplateRegistry, GenerationError> {
        let mut problems = Vec::new();
        for (name, metadata) in &self.templates {
            if name.trim().is_empty() {
                problems.push("template with an empty name".to_string());
            }
            if metadata.source.as_os_str().is_empty() {
                problems.push(format!("'{name}' has no source file"));
            }
            if metadata.output_pattern.trim().is_empty() {
                problems.push(format!("'{name}' has no output pattern"));
            } else if !is_confined_relative(Path::new(&metadata.output_pattern)) {
                problems.push(format!(
                    "'{name}' output pattern '{}' must be a relative path without '..'",
                    metadata.output_pattern
                ));
            }
        }
        if !problems.is_empty() {
            return Err(GenerationError::Registry(problems.join("; ")));
        }

        debug!(
            root = %self.root.display(),
            count = self.templates.len(),
            "Template registry built"
        );
        Ok(TemplateRegistry {
            root: self.root,
            templates: self.templates,
        })
    }
}

/// Immutable catalogue of templates keyed by name
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    root: PathBuf,
    templates: BTreeMap<String, TemplateMetadata>,
}

impl TemplateRegistry {
    pub fn builder(root: impl Into<PathBuf>) -> TemplateRegistryBuilder {
        TemplateRegistryBuilder::new(root)
    }

    /// The built-in catalogue, with sources resolved under `root`
    pub fn builtin(root: impl Into<PathBuf>) -> Result<Self, GenerationError> {
        let mut builder = TemplateRegistryBuilder::new(root);
        for metadata in builtin_templates() {
            builder.register(metadata);
        }
        builder.build()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, name: &str) -> Result<&TemplateMetadata, GenerationError> {
        self.templates
            .get(name)
            .ok_or_else(|| GenerationError::UnknownTemplate {
                name: name.to_string(),
                registered: self.names(),
            })
    }

    /// Whether a template with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Whether the template is registered and its source file is present
    pub fn exists(&self, name: &str) -> bool {
        self.templates
            .get(name)
            .is_some_and(|m| self.resolve(m).is_file())
    }

    /// Resolves a registered template's source file under the root
    pub fn source_path(&self, name: &str) -> Result<PathBuf, GenerationError> {
        self.get(name).map(|m| self.resolve(m))
    }

    /// Root-joined path of a template's source file
    pub fn resolve(&self, metadata: &TemplateMetadata) -> PathBuf {
        self.root.join(&metadata.source)
    }

    /// Templates of a category ordered by priority, then name
    pub fn by_category(&self, category: ArtifactCategory) -> Vec<&TemplateMetadata> {
        let mut templates: Vec<_> = self
            .templates
            .values()
            .filter(|m| m.category == category)
            .collect();
        templates.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));
        templates
    }

    pub fn names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateMetadata> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Reports every entry whose source file is missing. Never fails.
    pub fn validate(&self) -> RegistryValidation {
        let missing = self
            .templates
            .values()
            .filter_map(|m| {
                let path = self.resolve(m);
                (!path.is_file()).then(|| MissingTemplate {
                    name: m.name.clone(),
                    path,
                })
            })
            .collect();

        RegistryValidation {
            checked: self.templates.len(),
            missing,
        }
    }

    pub fn stats(&self) -> RegistryStats {
        let mut by_category = BTreeMap::new();
        for metadata in self.templates.values() {
            *by_category.entry(metadata.category).or_insert(0) += 1;
        }
        RegistryStats {
            total: self.templates.len(),
            by_category,
        }
    }
}

/// Built-in template catalogue
pub fn builtin_templates() -> Vec<TemplateMetadata> {
    use ArtifactType as T;

    [
        ("entity", T::Entity, "object_model/entity.cs.tera", "{EntityName}.cs", 10),
        (
            "repository_interface",
            T::RepositoryInterface,
            "object_model/repository_interface.cs.tera",
            "I{EntityName}Repository.cs",
            20,
        ),
        (
            "repository",
            T::Repository,
            "object_model/repository.cs.tera",
            "{EntityName}Repository.cs",
            30,
        ),
        (
            "controller",
            T::Controller,
            "object_model/controller.cs.tera",
            "{EntityName}Controller.cs",
            40,
        ),
        ("dto", T::Dto, "object_model/dto.cs.tera", "{EntityName}Dto.cs", 50),
        (
            "mapping_profile",
            T::MappingProfile,
            "object_model/mapping_profile.cs.tera",
            "{EntityName}MappingProfile.cs",
            60,
        ),
        (
            "validator",
            T::Validator,
            "object_model/validator.cs.tera",
            "{EntityName}Validator.cs",
            70,
        ),
        (
            "entity_tests",
            T::UnitTest,
            "tests/entity_tests.cs.tera",
            "{EntityName}Tests.cs",
            10,
        ),
        (
            "create_table",
            T::SqlTable,
            "sql/create_table.sql.tera",
            "{EntityName}_Table.sql",
            10,
        ),
        (
            "stored_procedures",
            T::StoredProcedure,
            "sql/stored_procedures.sql.tera",
            "{EntityName}_Procedures.sql",
            20,
        ),
        (
            "form_component",
            T::UiComponent,
            "ui/form_component.tsx.tera",
            "{EntityName}Form.tsx",
            10,
        ),
        (
            "list_component",
            T::UiComponent,
            "ui/list_component.tsx.tera",
            "{EntityName}List.tsx",
            20,
        ),
        ("ui_types", T::UiTypes, "ui/types.ts.tera", "{EntityName}.types.ts", 30),
        (
            "validation_schema",
            T::UiValidation,
            "ui/validation_schema.ts.tera",
            "{EntityName}.schema.ts",
            40,
        ),
        (
            "project_file",
            T::ProjectFile,
            "deployment/project_file.csproj.tera",
            "{EntityName}.csproj",
            10,
        ),
        ("dockerfile", T::Dockerfile, "deployment/Dockerfile.tera", "Dockerfile", 20),
        (
            "ci_pipeline",
            T::CiPipeline,
            "deployment/ci_pipeline.yml.tera",
            "build-{EntityName}.yml",
            30,
        ),
        (
            "app_settings",
            T::AppSettings,
            "deployment/appsettings.json.tera",
            "appsettings.json",
            40,
        ),
    ]
    .into_iter()
    .map(|(name, artifact_type, source, pattern, priority)| {
        TemplateMetadata::new(name, artifact_type, source, pattern, priority)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn shipped_templates_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
    }

    #[test]
    fn test_get_unknown_lists_registered_names() {
        let registry = TemplateRegistry::builtin("templates").unwrap();
        let err = registry.get("nope").unwrap_err();
        match err {
            GenerationError::UnknownTemplate { name, registered } => {
                assert_eq!(name, "nope");
                assert!(registered.contains(&"entity".to_string()));
                assert_eq!(registered.len(), registry.len());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_register_overwrites_existing_name() {
        let mut builder = TemplateRegistry::builder("root");
        builder.register(TemplateMetadata::new("entity", ArtifactType::Entity, "a.tera", "{EntityName}.cs", 1));
        builder.register(TemplateMetadata::new("entity", ArtifactType::Entity, "b.tera", "{EntityName}.cs", 2));
        let registry = builder.build().unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("entity").unwrap().source, PathBuf::from("b.tera"));
    }

    #[test]
    fn test_build_rejects_incomplete_entries() {
        let mut builder = TemplateRegistry::builder("root");
        builder.register(TemplateMetadata::new("entity", ArtifactType::Entity, "", "", 1));
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("no source file"));
        assert!(err.to_string().contains("no output pattern"));
    }

    #[test]
    fn test_build_rejects_escaping_output_patterns() {
        for pattern in ["../../../../{EntityName}.cs", "/tmp/{EntityName}.cs", "a/../../x.cs"] {
            let mut builder = TemplateRegistry::builder("root");
            builder.register(TemplateMetadata::new(
                "entity",
                ArtifactType::Entity,
                "entity.cs.tera",
                pattern,
                1,
            ));
            let err = builder.build().unwrap_err();
            assert!(
                matches!(err, GenerationError::Registry(ref m) if m.contains("must be a relative path")),
                "pattern: {pattern}"
            );
        }
    }

    #[test]
    fn test_build_accepts_nested_output_pattern() {
        let mut builder = TemplateRegistry::builder("root");
        builder.register(TemplateMetadata::new(
            "entity",
            ArtifactType::Entity,
            "entity.cs.tera",
            "Generated/{EntityName}.cs",
            1,
        ));
        let registry = builder.build().unwrap();
        assert_eq!(
            registry.get("entity").unwrap().output_file_name("Lead"),
            "Generated/Lead.cs"
        );
    }

    #[test]
    fn test_by_category_orders_by_priority() {
        let registry = TemplateRegistry::builtin("templates").unwrap();
        let object_model: Vec<_> = registry
            .by_category(ArtifactCategory::ObjectModel)
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(
            object_model,
            vec![
                "entity",
                "repository_interface",
                "repository",
                "controller",
                "dto",
                "mapping_profile",
                "validator"
            ]
        );

        let ui = registry.by_category(ArtifactCategory::Ui);
        assert!(ui.windows(2).all(|w| w[0].priority <= w[1].priority));
    }

    #[test]
    fn test_validate_reports_missing_sources_without_failing() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("object_model")).unwrap();
        std::fs::write(dir.path().join("object_model/entity.cs.tera"), "x").unwrap();

        let registry = TemplateRegistry::builtin(dir.path()).unwrap();
        let report = registry.validate();
        assert_eq!(report.checked, registry.len());
        assert_eq!(report.missing.len(), registry.len() - 1);
        assert!(!report.is_valid());
        assert!(report.missing.iter().all(|m| m.name != "entity"));

        assert!(registry.exists("entity"));
        assert!(!registry.exists("dto"));
        assert!(registry.contains("dto"));
        assert!(!registry.exists("unregistered"));
        assert_eq!(
            registry.source_path("entity").unwrap(),
            dir.path().join("object_model/entity.cs.tera")
        );
        assert!(registry.source_path("unregistered").is_err());
    }

    #[test]
    fn test_shipped_templates_are_complete() {
        let registry = TemplateRegistry::builtin(shipped_templates_dir()).unwrap();
        let report = registry.validate();
        assert!(report.is_valid(), "missing: {:?}", report.missing);
    }

    #[test]
    fn test_stats_counts_per_category() {
        let registry = TemplateRegistry::builtin("templates").unwrap();
        let stats = registry.stats();
        assert_eq!(stats.total, 18);
        assert_eq!(stats.by_category[&ArtifactCategory::ObjectModel], 7);
        assert_eq!(stats.by_category[&ArtifactCategory::Test], 1);
        assert_eq!(stats.by_category[&ArtifactCategory::Relational], 2);
        assert_eq!(stats.by_category[&ArtifactCategory::Ui], 4);
        assert_eq!(stats.by_category[&ArtifactCategory::Deployment], 4);
        assert_eq!(stats.by_category.values().sum::<usize>(), stats.total);
    }

    #[test]
    fn test_output_file_name_substitutes_only_entity_name() {
        let metadata = TemplateMetadata::new(
            "dto",
            ArtifactType::Dto,
            "dto.tera",
            "{EntityName}Dto.{Ext}",
            1,
        );
        assert_eq!(metadata.output_file_name("Contact"), "ContactDto.{Ext}");
    }
}
