//! # Template Validation
//!
//! Checks a populated data dictionary against the schema template of an
//! application definition.
//!
//! ## Algorithm
//!
//! For every path the schema template declares, in template order:
//!
//! 1. Convert it to schema notation and find the populated entry whose key
//!    converts to the same schema path. Suggested names may differ between
//!    the two templates (`ENTRY[entry]` vs `ENTRY[run_7]`).
//! 2. Resolve the governing schema node and its [`Requiredness`].
//! 3. A required non-attribute path with no value is an error, unless its
//!    nearest optional or recommended ancestor has no populated descendant
//!    at all. An absent optional branch excuses its required leaves.
//! 4. A populated value is checked for type, range, format and enumeration
//!    membership.
//!
//! Validation is fail-fast: the first problem is returned and nothing else
//! is inspected.

use std::collections::HashMap;

use nxdc_core::path::{is_attribute_path, is_same_or_descendant, parent_path};
use nxdc_core::{template_path_to_schema_path, PathError, Template, Value};
use thiserror::Error;

use crate::library::BaseClassSource;
use crate::navigate::SchemaNavigator;
use crate::nxdl::{NxdlDocument, SchemaError};
use crate::required::Requiredness;
use crate::typecheck::{check_enum, check_value};

/// A validation failure. Every variant tied to an entry names its path.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// No application definition was supplied.
    #[error("the NXDL definition has not been loaded")]
    SchemaNotLoaded,

    /// A required entry is absent or unpopulated.
    #[error("the data entry {path} is required and has not been supplied")]
    MissingRequiredField {
        /// Data-dictionary path of the missing entry.
        path: String,
    },

    /// The value's shape is not accepted by the declared NeXus type.
    #[error("the value at {path} should be one of [{accepted}], as defined in the NXDL as {nexus_type}")]
    TypeMismatch {
        /// Data-dictionary path of the value.
        path: String,
        /// Declared NeXus type.
        nexus_type: String,
        /// Accepted value shapes.
        accepted: String,
    },

    /// An `NX_POSINT` value is not positive.
    #[error("the value at {path} should be a positive int")]
    Range {
        /// Data-dictionary path of the value.
        path: String,
    },

    /// A timestamp is not a timezone-aware ISO 8601 string.
    #[error("the date at {path} should be a timezone aware ISO8601 formatted string, for example 2022-01-22T12:14:12.05018Z")]
    Format {
        /// Data-dictionary path of the value.
        path: String,
    },

    /// The value is not one of the enumerated values.
    #[error("the value at {path} should be one of the following strings: {allowed:?}")]
    EnumMismatch {
        /// Data-dictionary path of the value.
        path: String,
        /// Declared enumeration.
        allowed: Vec<String>,
    },

    /// A template path is malformed.
    #[error("malformed path: {0}")]
    MalformedPath(#[from] PathError),

    /// A declared path is not defined by the schema or its base classes.
    #[error("the entry {path} is not defined in the NXDL or its base classes")]
    NotInSchema {
        /// Data-dictionary path of the entry.
        path: String,
    },

    /// A schema document could not be loaded during resolution.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Populated template entries keyed by schema-notation path.
struct DataIndex<'d> {
    entries: Vec<(String, Option<&'d Value>)>,
    first_key: HashMap<String, (&'d str, Option<&'d Value>)>,
}

impl<'d> DataIndex<'d> {
    fn build(data: &'d Template) -> Result<Self, PathError> {
        let mut entries = Vec::with_capacity(data.len());
        let mut first_key = HashMap::new();
        for (key, value) in data.iter() {
            let schema_path = template_path_to_schema_path(key)?;
            first_key.entry(schema_path.clone()).or_insert((key, value));
            entries.push((schema_path, value));
        }
        Ok(Self { entries, first_key })
    }

    /// The populated key matching a schema path, with its value.
    fn lookup(&self, schema_path: &str) -> Option<(&'d str, Option<&'d Value>)> {
        self.first_key.get(schema_path).copied()
    }

    fn has_populated_descendant(&self, ancestor_schema_path: &str) -> bool {
        self.entries
            .iter()
            .any(|(path, value)| value.is_some() && is_same_or_descendant(path, ancestor_schema_path))
    }
}

/// Validates data dictionaries against one application definition.
pub struct TemplateValidator<'a> {
    navigator: SchemaNavigator<'a>,
}

impl<'a> TemplateValidator<'a> {
    /// Create a validator for `definition`, resolving inherited nodes
    /// through `base_classes`.
    pub fn new(definition: &'a NxdlDocument, base_classes: &'a dyn BaseClassSource) -> Self {
        Self {
            navigator: SchemaNavigator::new(definition, base_classes),
        }
    }

    /// Validate every declared path of `schema_template` against `data`.
    ///
    /// Returns `Ok(true)` when every path passes.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] in template order.
    pub fn validate(&self, schema_template: &Template, data: &Template) -> Result<bool, ValidationError> {
        let index = DataIndex::build(data)?;
        for path in schema_template.paths() {
            self.check_declared(path, &index)
                .map_err(|e| report(path, e))?;
        }
        tracing::debug!(
            definition = self.navigator.definition().name(),
            paths = schema_template.len(),
            "data dictionary is valid"
        );
        Ok(true)
    }

    /// Validate a single declared path against `data`.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] for this path, if any.
    pub fn validate_path(&self, declared_path: &str, data: &Template) -> Result<(), ValidationError> {
        let index = DataIndex::build(data)?;
        self.check_declared(declared_path, &index)
            .map_err(|e| report(declared_path, e))
    }

    fn check_declared(&self, path: &str, index: &DataIndex<'_>) -> Result<(), ValidationError> {
        let schema_path = template_path_to_schema_path(path)?;
        let renamed = index.lookup(&schema_path);
        let attribute = is_attribute_path(path);

        let Some(resolved) = self.navigator.resolve(&schema_path)? else {
            if attribute {
                tracing::debug!(path, "attribute not in schema, skipped");
                return Ok(());
            }
            return Err(ValidationError::NotInSchema {
                path: path.to_string(),
            });
        };
        let requiredness = Requiredness::classify(Some(&resolved));
        tracing::debug!(path, %requiredness, "checking path");

        let value = renamed.and_then(|(_, value)| value);
        if !attribute && requiredness == Requiredness::Required && value.is_none() {
            let reported = renamed.map_or(path, |(key, _)| key);
            self.check_missing(path, reported, index)?;
        }

        if let (Some((key, _)), Some(value)) = (renamed, value) {
            check_value(value, resolved.node.declared_type(), key)?;
            let (valid, allowed) = check_enum(value, &resolved.node);
            if !valid {
                return Err(ValidationError::EnumMismatch {
                    path: key.to_string(),
                    allowed,
                });
            }
        }
        Ok(())
    }

    /// Decide whether a missing required entry is an error.
    fn check_missing(&self, path: &str, reported: &str, index: &DataIndex<'_>) -> Result<(), ValidationError> {
        let missing = || ValidationError::MissingRequiredField {
            path: reported.to_string(),
        };
        let Some(branch) = self.optional_ancestor(path)? else {
            return Err(missing());
        };
        let branch_schema_path = template_path_to_schema_path(branch)?;
        if index.has_populated_descendant(&branch_schema_path) {
            return Err(missing());
        }
        tracing::info!(path, branch, "required entry excused by absent optional branch");
        Ok(())
    }

    /// The nearest proper ancestor of `path` classified optional or
    /// recommended.
    fn optional_ancestor<'p>(&self, path: &'p str) -> Result<Option<&'p str>, ValidationError> {
        let mut current = path;
        while let Some(parent) = parent_path(current) {
            let schema_path = template_path_to_schema_path(parent)?;
            let resolved = self.navigator.resolve(&schema_path)?;
            if Requiredness::classify(resolved.as_ref()).is_optional_branch() {
                return Ok(Some(parent));
            }
            current = parent;
        }
        Ok(None)
    }
}

fn report(path: &str, error: ValidationError) -> ValidationError {
    tracing::warn!(path, error = %error, "validation failed");
    error
}

/// Validate `data` against `schema_template` under `definition`.
///
/// # Errors
///
/// Returns [`ValidationError::SchemaNotLoaded`] when `definition` is
/// `None`, otherwise the first failure found.
pub fn validate_data_dict(
    schema_template: &Template,
    data: &Template,
    definition: Option<&NxdlDocument>,
    base_classes: &dyn BaseClassSource,
) -> Result<bool, ValidationError> {
    let definition = definition.ok_or(ValidationError::SchemaNotLoaded)?;
    TemplateValidator::new(definition, base_classes).validate(schema_template, data)
}
