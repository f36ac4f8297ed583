//! Consistency checks for parsed tables

use std::collections::HashSet;

use crate::{KeyCategory, ParsedTable};

/// Validation error for a parsed table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field that has the error
    pub field: String,
    /// Error message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ParsedTable {
    /// Check that keys only reference declared columns and that foreign
    /// keys pair every local column with a referenced one.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.options.name.is_empty() {
            errors.push(ValidationError::new("options.name", "Table name is required"));
        }

        let column_names: HashSet<&str> = self
            .defs
            .col_map
            .values()
            .map(|c| c.name.as_str())
            .collect();

        for (category, keys) in &self.defs.key_category_map {
            for (key_id, key) in keys {
                let field = format!("key_category_map[{category}][{key_id}]");
                if key.cols.is_empty() {
                    errors.push(ValidationError::new(
                        format!("{field}.cols"),
                        "Key has no columns",
                    ));
                }
                for col in &key.cols {
                    if !column_names.contains(col.name.as_str()) {
                        errors.push(ValidationError::new(
                            format!("{field}.cols"),
                            format!("Key column '{}' does not exist in table", col.name),
                        ));
                    }
                }

                match (&key.foreign, *category == KeyCategory::ForeignKey) {
                    (Some(reference), true) => {
                        if reference.ref_cols.len() != key.cols.len() {
                            errors.push(ValidationError::new(
                                format!("{field}.ref_cols"),
                                format!(
                                    "Foreign key has {} columns but references {}",
                                    key.cols.len(),
                                    reference.ref_cols.len()
                                ),
                            ));
                        }
                    }
                    (None, true) => errors.push(ValidationError::new(
                        field,
                        "Foreign key is missing its reference",
                    )),
                    (Some(_), false) => errors.push(ValidationError::new(
                        field,
                        format!("{category} must not carry a foreign key reference"),
                    )),
                    (None, false) => {}
                }
            }
        }

        errors
    }
}
