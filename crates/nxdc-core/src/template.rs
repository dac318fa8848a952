//! # Templates
//!
//! A template is the flat, path-keyed data dictionary passed between
//! readers and the validator. Every path the schema declares is a slot;
//! an unpopulated slot holds `None`.
//!
//! Paths a reader produced outside the schema live in a separate
//! `undocumented` bucket and are never validated.
//!
//! Entries are kept in a `BTreeMap`, so iteration (and with it the order in
//! which the fail-fast validator reports the first problem) is deterministic.

use std::collections::BTreeMap;

use crate::error::{NxdcError, TemplateLoadError};
use crate::path::check_path;
use crate::value::Value;

/// Key under which a serialized data dictionary carries undocumented paths.
pub const UNDOCUMENTED_KEY: &str = "undocumented";

/// A flat mapping from data-dictionary path to an optional value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    entries: BTreeMap<String, Option<Value>>,
    undocumented: BTreeMap<String, Value>,
}

impl Template {
    /// Create an empty template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a template with every given path declared and unpopulated.
    ///
    /// # Errors
    ///
    /// Returns [`NxdcError::MalformedPath`] for the first malformed path.
    pub fn from_paths<I, S>(paths: I) -> Result<Self, NxdcError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut template = Self::new();
        for path in paths {
            template.declare(path)?;
        }
        Ok(template)
    }

    /// Declare a slot. An existing value at the same path is kept.
    ///
    /// # Errors
    ///
    /// Returns [`NxdcError::MalformedPath`] when the path is malformed.
    pub fn declare(&mut self, path: impl Into<String>) -> Result<(), NxdcError> {
        let path = path.into();
        check_path(&path)?;
        self.entries.entry(path).or_insert(None);
        Ok(())
    }

    /// Set a slot, returning the previous value if the slot was populated.
    ///
    /// # Errors
    ///
    /// Returns [`NxdcError::MalformedPath`] when the path is malformed.
    pub fn insert(
        &mut self,
        path: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, NxdcError> {
        let path = path.into();
        check_path(&path)?;
        Ok(self.entries.insert(path, Some(value.into())).flatten())
    }

    /// Record a value produced outside the schema.
    pub fn insert_undocumented(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.undocumented.insert(path.into(), value.into());
    }

    /// Look up a slot: `None` if undeclared, `Some(None)` if declared but
    /// unpopulated.
    pub fn get(&self, path: &str) -> Option<Option<&Value>> {
        self.entries.get(path).map(Option::as_ref)
    }

    /// The value at `path`, if declared and populated.
    pub fn value(&self, path: &str) -> Option<&Value> {
        self.get(path).flatten()
    }

    /// Whether `path` is declared.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Remove a slot entirely, returning its value.
    pub fn remove(&mut self, path: &str) -> Option<Option<Value>> {
        self.entries.remove(path)
    }

    /// Declared paths in deterministic order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Declared slots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Populated slots only.
    pub fn populated(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }

    /// Number of declared slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no slot is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values recorded outside the schema.
    pub fn undocumented(&self) -> &BTreeMap<String, Value> {
        &self.undocumented
    }

    /// Load a populated template from a JSON object of `path: value` pairs.
    ///
    /// An `"undocumented"` member, if present, must be an object and fills
    /// the undocumented bucket.
    ///
    /// # Errors
    ///
    /// Returns [`NxdcError::TemplateLoad`] when the document is not a flat
    /// object of supported values, and [`NxdcError::MalformedPath`] for a
    /// malformed key.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, NxdcError> {
        let object = json.as_object().ok_or(TemplateLoadError::NotAnObject)?;
        let mut template = Self::new();
        for (key, raw) in object {
            if key == UNDOCUMENTED_KEY {
                let extra = raw.as_object().ok_or_else(|| TemplateLoadError::NestedObject {
                    path: key.clone(),
                })?;
                for (path, raw) in extra {
                    if let Some(value) = Value::from_json(path, raw)? {
                        template.insert_undocumented(path.clone(), value);
                    }
                }
                continue;
            }
            match Value::from_json(key, raw)? {
                Some(value) => {
                    template.insert(key.clone(), value)?;
                }
                None => template.declare(key.clone())?,
            }
        }
        Ok(template)
    }
}
