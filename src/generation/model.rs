//! The model every template renders against.
//!
//! One [`TemplateModel`] is built per generation run and shared by all
//! renders. Field names are projected into their case variants and each
//! logical type is mapped into the three target type systems up front, so
//! templates never repeat that logic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::utils::{derive_entity_name, pluralize, to_camel_case, to_pascal_case, to_snake_case};
use crate::generation::type_mapping::map_field_type;
use crate::generation::{DatabaseKind, FieldOption, FormDefinition, FormField, GenerationOptions};

/// Namespace used when the options leave it unset
pub fn default_namespace(entity_name: &str) -> String {
    format!("{entity_name}.Api")
}

/// One form field as seen by templates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldModel {
    pub name: String,
    pub field_type: String,
    pub required: bool,
    pub label: String,
    pub placeholder: Option<String>,
    pub default_value: Option<JsonValue>,
    pub max_length: Option<u32>,
    pub min_length: Option<u32>,
    pub pattern: Option<String>,
    pub options: Vec<FieldOption>,

    pub pascal_name: String,
    pub camel_name: String,
    pub snake_name: String,

    pub object_type: String,
    pub column_type: String,
    pub frontend_type: String,
}

impl FieldModel {
    pub fn from_field(field: &FormField) -> Self {
        let name = field.name.trim().to_string();
        let mapping = map_field_type(&field.field_type, field.required, field.max_length);
        let pascal_name = to_pascal_case(&name);

        Self {
            label: field.label.clone().unwrap_or_else(|| pascal_name.clone()),
            field_type: field.field_type.trim().to_lowercase(),
            required: field.required,
            placeholder: field.placeholder.clone(),
            default_value: field.default_value.clone(),
            max_length: field.max_length,
            min_length: field.min_length,
            pattern: field.pattern.clone(),
            options: field.options.clone(),
            camel_name: to_camel_case(&name),
            snake_name: to_snake_case(&name),
            pascal_name,
            name,
            object_type: mapping.object_type,
            column_type: mapping.column_type,
            frontend_type: mapping.frontend_type,
        }
    }
}

/// Data shared by every template of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateModel {
    pub entity_name: String,
    pub entity_name_plural: String,
    pub entity_name_camel: String,
    pub entity_name_camel_plural: String,
    pub entity_name_snake: String,
    pub table_name: String,

    pub project_name: String,
    pub namespace: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub form_name: Option<String>,
    pub database: DatabaseKind,
    pub generated_at: String,

    pub fields: Vec<FieldModel>,
    pub required_fields: Vec<String>,
    pub additional_imports: BTreeMap<String, String>,
    pub custom_settings: BTreeMap<String, String>,
}

impl TemplateModel {
    pub fn build(
        definition: &FormDefinition,
        options: &GenerationOptions,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let entity_name = derive_entity_name(&options.project_name);
        let entity_name_plural = pluralize(&entity_name);
        let fields: Vec<FieldModel> = definition.fields.iter().map(FieldModel::from_field).collect();

        Self {
            entity_name_camel: to_camel_case(&entity_name),
            entity_name_camel_plural: to_camel_case(&entity_name_plural),
            entity_name_snake: to_snake_case(&entity_name),
            table_name: entity_name_plural.clone(),
            namespace: options
                .namespace
                .clone()
                .unwrap_or_else(|| default_namespace(&entity_name)),
            entity_name_plural,
            entity_name,
            project_name: options.project_name.clone(),
            author: options.author.clone(),
            description: options
                .description
                .clone()
                .or_else(|| definition.description.clone()),
            form_name: definition.name.clone(),
            database: options.target_database,
            generated_at: generated_at.to_rfc3339(),
            required_fields: fields
                .iter()
                .filter(|f| f.required)
                .map(|f| f.pascal_name.clone())
                .collect(),
            fields,
            additional_imports: options.additional_imports.clone(),
            custom_settings: options.custom_settings.clone(),
        }
    }
}
