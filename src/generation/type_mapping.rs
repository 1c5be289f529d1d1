//! Logical field type to target type mapping.
//!
//! One table maps each logical form type to an object-model scalar, a
//! relational column type and a frontend type. The mapping is a pure function
//! of `(logical type, required, max length)`; the logical type is matched
//! case-insensitively and anything unrecognized falls back to text.

use serde::{Deserialize, Serialize};

/// Column length used for text fields without a max length
pub const DEFAULT_TEXT_LENGTH: u32 = 255;

/// Object-model scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectScalar {
    String,
    Int,
    Decimal,
    Date,
    DateTime,
    TimeSpan,
    Bool,
}

impl ObjectScalar {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Decimal => "decimal",
            Self::Date => "DateOnly",
            Self::DateTime => "DateTime",
            Self::TimeSpan => "TimeSpan",
            Self::Bool => "bool",
        }
    }

    /// Reference-like types are nullable already and never take a marker
    pub fn is_reference_like(&self) -> bool {
        matches!(self, Self::String)
    }
}

/// How the relational column type is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRule {
    /// Bounded text sized by the field's max length, else [`DEFAULT_TEXT_LENGTH`]
    SizedText,
    /// Bounded text with a fixed length
    FixedText(u32),
    /// Unbounded text
    UnboundedText,
    /// A literal column type
    Literal(&'static str),
}

impl ColumnRule {
    pub fn column_type(&self, max_length: Option<u32>) -> String {
        match self {
            Self::SizedText => {
                let length = max_length.filter(|l| *l > 0).unwrap_or(DEFAULT_TEXT_LENGTH);
                format!("NVARCHAR({length})")
            }
            Self::FixedText(length) => format!("NVARCHAR({length})"),
            Self::UnboundedText => "NVARCHAR(MAX)".to_string(),
            Self::Literal(sql) => (*sql).to_string(),
        }
    }
}

/// One row of the mapping table
#[derive(Debug, Clone, Copy)]
pub struct TypeRule {
    pub logical_types: &'static [&'static str],
    pub object: ObjectScalar,
    pub column: ColumnRule,
    pub frontend: &'static str,
}

/// The mapping table
pub const TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        logical_types: &["text", "email", "url", "tel"],
        object: ObjectScalar::String,
        column: ColumnRule::SizedText,
        frontend: "string",
    },
    TypeRule {
        logical_types: &["textarea"],
        object: ObjectScalar::String,
        column: ColumnRule::UnboundedText,
        frontend: "string",
    },
    TypeRule {
        logical_types: &["number"],
        object: ObjectScalar::Int,
        column: ColumnRule::Literal("INT"),
        frontend: "number",
    },
    TypeRule {
        logical_types: &["decimal", "currency"],
        object: ObjectScalar::Decimal,
        column: ColumnRule::Literal("DECIMAL(18,2)"),
        frontend: "number",
    },
    TypeRule {
        logical_types: &["date"],
        object: ObjectScalar::Date,
        column: ColumnRule::Literal("DATE"),
        frontend: "Date",
    },
    TypeRule {
        logical_types: &["datetime"],
        object: ObjectScalar::DateTime,
        column: ColumnRule::Literal("DATETIME2"),
        frontend: "Date",
    },
    TypeRule {
        logical_types: &["time"],
        object: ObjectScalar::TimeSpan,
        column: ColumnRule::Literal("TIME"),
        frontend: "string",
    },
    TypeRule {
        logical_types: &["boolean", "checkbox"],
        object: ObjectScalar::Bool,
        column: ColumnRule::Literal("BIT"),
        frontend: "boolean",
    },
    TypeRule {
        logical_types: &["select", "radio"],
        object: ObjectScalar::String,
        column: ColumnRule::FixedText(100),
        frontend: "string",
    },
    TypeRule {
        logical_types: &["file"],
        object: ObjectScalar::String,
        column: ColumnRule::FixedText(500),
        frontend: "File",
    },
];

/// Rule applied to unrecognized logical types
pub const FALLBACK_RULE: TypeRule = TypeRule {
    logical_types: &[],
    object: ObjectScalar::String,
    column: ColumnRule::FixedText(DEFAULT_TEXT_LENGTH),
    frontend: "string",
};

/// Mapped target types for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMapping {
    pub object_type: String,
    pub column_type: String,
    pub frontend_type: String,
}

/// Finds the table row for a logical type, ignoring case and surrounding whitespace
pub fn lookup_rule(logical_type: &str) -> Option<&'static TypeRule> {
    let normalized = logical_type.trim().to_lowercase();
    TYPE_RULES
        .iter()
        .find(|rule| rule.logical_types.contains(&normalized.as_str()))
}

/// Maps a logical field type to its three target types.
///
/// # Examples
/// ```
/// use formgen::generation::type_mapping::map_field_type;
///
/// let mapping = map_field_type("Number", false, None);
/// assert_eq!(mapping.object_type, "int?");
/// assert_eq!(mapping.column_type, "INT");
/// assert_eq!(mapping.frontend_type, "number");
/// ```
pub fn map_field_type(logical_type: &str, required: bool, max_length: Option<u32>) -> TypeMapping {
    let rule = lookup_rule(logical_type).unwrap_or(&FALLBACK_RULE);

    let mut object_type = rule.object.type_name().to_string();
    if !required && !rule.object.is_reference_like() {
        object_type.push('?');
    }

    TypeMapping {
        object_type,
        column_type: rule.column.column_type(max_length),
        frontend_type: rule.frontend.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn mapped(logical: &str, required: bool, max: Option<u32>) -> (String, String, String) {
        let m = map_field_type(logical, required, max);
        (m.object_type, m.column_type, m.frontend_type)
    }

    fn triple(a: &str, b: &str, c: &str) -> (String, String, String) {
        (a.to_string(), b.to_string(), c.to_string())
    }

    #[test]
    fn test_text_like_types() {
        for logical in ["text", "email", "url", "tel"] {
            assert_eq!(mapped(logical, true, None), triple("string", "NVARCHAR(255)", "string"));
            assert_eq!(mapped(logical, false, Some(80)), triple("string", "NVARCHAR(80)", "string"));
        }
        assert_eq!(
            mapped("textarea", true, Some(80)),
            triple("string", "NVARCHAR(MAX)", "string")
        );
    }

    #[test]
    fn test_value_types_take_nullable_marker() {
        assert_eq!(mapped("number", true, None), triple("int", "INT", "number"));
        assert_eq!(mapped("number", false, None), triple("int?", "INT", "number"));
        assert_eq!(mapped("decimal", true, None), triple("decimal", "DECIMAL(18,2)", "number"));
        assert_eq!(mapped("currency", false, None), triple("decimal?", "DECIMAL(18,2)", "number"));
        assert_eq!(mapped("date", false, None), triple("DateOnly?", "DATE", "Date"));
        assert_eq!(mapped("datetime", true, None), triple("DateTime", "DATETIME2", "Date"));
        assert_eq!(mapped("time", false, None), triple("TimeSpan?", "TIME", "string"));
        assert_eq!(mapped("boolean", true, None), triple("bool", "BIT", "boolean"));
        assert_eq!(mapped("checkbox", false, None), triple("bool?", "BIT", "boolean"));
    }

    #[test]
    fn test_choice_and_file_types() {
        assert_eq!(mapped("select", false, Some(20)), triple("string", "NVARCHAR(100)", "string"));
        assert_eq!(mapped("radio", true, None), triple("string", "NVARCHAR(100)", "string"));
        assert_eq!(mapped("file", false, None), triple("string", "NVARCHAR(500)", "File"));
    }

    #[test]
    fn test_unrecognized_type_falls_back_to_text() {
        for logical in ["color", "", "range", "signature"] {
            assert_eq!(
                mapped(logical, false, Some(10)),
                triple("string", "NVARCHAR(255)", "string")
            );
        }
    }

    #[test]
    fn test_mapping_is_case_insensitive_and_pure() {
        assert_eq!(mapped("EMAIL", true, None), mapped("email", true, None));
        assert_eq!(mapped(" Date ", false, None), mapped("date", false, None));
        assert_eq!(mapped("number", false, Some(3)), mapped("number", false, Some(3)));
    }

    #[test]
    fn test_zero_max_length_uses_default_bound() {
        assert_eq!(mapped("text", true, Some(0)).1, "NVARCHAR(255)");
    }

    #[test]
    fn test_logical_types_are_unique() {
        let mut seen = HashSet::new();
        for rule in TYPE_RULES {
            for logical in rule.logical_types {
                assert!(seen.insert(*logical), "duplicate logical type {logical}");
            }
        }
    }
}
