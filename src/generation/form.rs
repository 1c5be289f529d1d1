//! Form definitions supplied by the caller

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::core::error::{Error, Result};

/// A choice offered by select and radio fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// One field of a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    /// Logical field type tag such as `text`, `email` or `date`
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default, alias = "default")]
    pub default_value: Option<JsonValue>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

impl FormField {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            required,
            label: None,
            placeholder: None,
            default_value: None,
            max_length: None,
            min_length: None,
            pattern: None,
            options: Vec::new(),
        }
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Ordered field list describing one form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FormField>,
}

impl FormDefinition {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self {
            name: None,
            description: None,
            fields,
        }
    }

    /// Load a definition from a JSON or YAML file (YAML for `.yml`/`.yaml`)
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let definition: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yml") | Some("yaml") => serde_yaml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Checks the definition has fields with non-empty, unique names
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(Error::form("Form definition has no fields"));
        }

        let mut seen = HashSet::new();
        for (index, field) in self.fields.iter().enumerate() {
            let name = field.name.trim();
            if name.is_empty() {
                return Err(Error::form(format!("Field #{index} has an empty name")));
            }
            if field.field_type.trim().is_empty() {
                return Err(Error::form(format!("Field '{name}' has an empty type")));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(Error::form(format!("Duplicate field name '{name}'")));
            }
        }
        Ok(())
    }
}
