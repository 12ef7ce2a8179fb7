//! Record schemas.
//!
//! A schema is an ordered mapping from field name to [`FieldRule`]. It is
//! the complete and exact set of fields a record must carry: a record with
//! a missing or an extra field is rejected before any value is looked at.
//!
//! Schemas are validated once, at construction, and never change afterwards.
//!
//! # Example
//! ```rust
//! use logreader_core::schema::{FieldRule, Schema};
//!
//! # fn example() -> logreader_core::Result<()> {
//! let schema = Schema::builder()
//!     .field("id", FieldRule::pattern("[0-9]+")?)
//!     .field("size", FieldRule::number(Some(0.0), None).with_full_name("file size"))
//!     .build()?;
//!
//! assert_eq!(schema.len(), 2);
//! # Ok(())
//! # }
//! ```

mod defaults;
mod loader;
mod rule;

pub use defaults::{
    DISPOSITION_VALUES, PATH_PATTERN, SHA256_PATTERN, UUID_PATTERN, default_log_schema,
};
pub use rule::{Constraint, FieldRule, FieldType};

use std::collections::HashSet;

use crate::error::{LogReaderError, Result};

/// Ordered, immutable mapping from field name to rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<(String, FieldRule)>,
}

impl Schema {
    /// Creates a schema from `(name, rule)` pairs, keeping their order.
    ///
    /// # Errors
    /// Returns a configuration error for duplicate or empty field names and
    /// for rules that contradict themselves (e.g. `min > max`).
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, FieldRule)>,
        S: Into<String>,
    {
        let fields: Vec<(String, FieldRule)> = fields
            .into_iter()
            .map(|(name, rule)| (name.into(), rule))
            .collect();

        let mut seen = HashSet::with_capacity(fields.len());
        for (name, rule) in &fields {
            if name.is_empty() {
                return Err(LogReaderError::configuration(
                    "schema field names must not be empty",
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(LogReaderError::field_configuration(
                    name,
                    "declared more than once",
                ));
            }
            rule.validate_structure()
                .map_err(|e| LogReaderError::field_configuration(name, e))?;
        }

        Ok(Self { fields })
    }

    /// Starts building a schema field by field.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Returns the rule for `name`
    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, rule)| rule)
    }

    /// Returns true if the schema declares `name`
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Iterates over field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is declared
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Incremental schema construction; validation happens in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, FieldRule)>,
}

impl SchemaBuilder {
    /// Appends a field.
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.push((name.into(), rule));
        self
    }

    /// Validates and freezes the schema.
    ///
    /// # Errors
    /// See [`Schema::new`].
    pub fn build(self) -> Result<Schema> {
        Schema::new(self.fields)
    }
}
