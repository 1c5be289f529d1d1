//! Artifact families - fixed, ordered template lists per output class

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::generation::GenerationOptions;

/// One entry of a family's template list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyTemplate {
    pub name: &'static str,
    /// Optional templates are skipped when unregistered or missing on disk
    pub optional: bool,
}

const fn required(name: &'static str) -> FamilyTemplate {
    FamilyTemplate {
        name,
        optional: false,
    }
}

const fn optional(name: &'static str) -> FamilyTemplate {
    FamilyTemplate {
        name,
        optional: true,
    }
}

const OBJECT_MODEL: &[FamilyTemplate] = &[
    required("entity"),
    required("repository_interface"),
    required("repository"),
    required("controller"),
    required("dto"),
    required("mapping_profile"),
    required("validator"),
    optional("entity_tests"),
];

const RELATIONAL_SCHEMA: &[FamilyTemplate] = &[required("create_table"), required("stored_procedures")];

const UI_COMPONENTS: &[FamilyTemplate] = &[
    required("form_component"),
    required("list_component"),
    required("ui_types"),
    required("validation_schema"),
];

const DEPLOYMENT: &[FamilyTemplate] = &[
    required("project_file"),
    required("dockerfile"),
    required("ci_pipeline"),
    optional("app_settings"),
];

/// A named group of templates producing one class of output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFamily {
    ObjectModel,
    RelationalSchema,
    UiComponents,
    Deployment,
}

impl ArtifactFamily {
    /// Families in render order
    pub const ALL: [ArtifactFamily; 4] = [
        Self::ObjectModel,
        Self::RelationalSchema,
        Self::UiComponents,
        Self::Deployment,
    ];

    pub fn templates(&self) -> &'static [FamilyTemplate] {
        match self {
            Self::ObjectModel => OBJECT_MODEL,
            Self::RelationalSchema => RELATIONAL_SCHEMA,
            Self::UiComponents => UI_COMPONENTS,
            Self::Deployment => DEPLOYMENT,
        }
    }

    pub fn is_enabled(&self, options: &GenerationOptions) -> bool {
        match self {
            Self::ObjectModel => options.generate_object_model,
            Self::RelationalSchema => options.generate_relational_schema,
            Self::UiComponents => options.generate_ui_components,
            Self::Deployment => options.generate_deployment,
        }
    }

    /// Enabled families, in render order
    pub fn enabled(options: &GenerationOptions) -> impl Iterator<Item = ArtifactFamily> + '_ {
        Self::ALL
            .into_iter()
            .filter(move |family| family.is_enabled(options))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectModel => "object_model",
            Self::RelationalSchema => "relational_schema",
            Self::UiComponents => "ui_components",
            Self::Deployment => "deployment",
        }
    }
}

impl fmt::Display for ArtifactFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::templates::TemplateRegistry;
    use std::collections::HashSet;

    #[test]
    fn test_family_templates_are_registered_and_disjoint() {
        let registry = TemplateRegistry::builtin("templates").unwrap();
        let mut seen = HashSet::new();
        for family in ArtifactFamily::ALL {
            for template in family.templates() {
                assert!(registry.contains(template.name), "{} not registered", template.name);
                assert!(seen.insert(template.name), "{} listed twice", template.name);
            }
        }
        assert_eq!(seen.len(), registry.len());
    }

    #[test]
    fn test_enabled_follows_options() {
        let options = GenerationOptions {
            generate_ui_components: false,
            ..GenerationOptions::default()
        };
        let enabled: Vec<_> = ArtifactFamily::enabled(&options).collect();
        assert_eq!(
            enabled,
            vec![ArtifactFamily::ObjectModel, ArtifactFamily::RelationalSchema]
        );

        let options = GenerationOptions {
            generate_deployment: true,
            ..GenerationOptions::none("Demo")
        };
        let enabled: Vec<_> = ArtifactFamily::enabled(&options).collect();
        assert_eq!(enabled, vec![ArtifactFamily::Deployment]);
    }

    #[test]
    fn test_optional_entries() {
        let optional: Vec<_> = ArtifactFamily::ALL
            .iter()
            .flat_map(|f| f.templates())
            .filter(|t| t.optional)
            .map(|t| t.name)
            .collect();
        assert_eq!(optional, vec!["entity_tests", "app_settings"]);
    }
}
