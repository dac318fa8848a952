//! # Type and Value Checks
//!
//! Conformance of a populated value to the NeXus type declared for its
//! field or attribute. Each NeXus type tag maps to a fixed set of accepted
//! [`ValueShape`]s; a list value conforms when every element does.
//!
//! Beyond shape, `NX_POSINT` values must be positive and `ISO8601` /
//! `NX_DATE_TIME` values must be timezone-aware timestamps. Enumerations
//! are checked separately by [`check_enum`] since they hang off the node,
//! not the type.

use std::fmt;

use nxdc_core::value::{Value, ValueShape};
use nxdc_core::is_timezone_aware_iso8601;

use crate::nxdl::SchemaNode;
use crate::validate::ValidationError;

/// NeXus primitive type tags understood by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NexusType {
    /// `ISO8601`.
    Iso8601,
    /// `NX_DATE_TIME`.
    DateTime,
    /// `NX_BINARY`.
    Binary,
    /// `NX_BOOLEAN`.
    Boolean,
    /// `NX_CHAR`.
    Char,
    /// `NX_FLOAT`.
    Float,
    /// `NX_INT`.
    Int,
    /// `NX_UINT`.
    UInt,
    /// `NX_NUMBER`.
    Number,
    /// `NX_POSINT`.
    PosInt,
    /// No type declared, or a tag outside this table.
    Unavailable,
}

impl NexusType {
    /// Map a declared `type` attribute to its tag. Unknown and absent types
    /// are [`NexusType::Unavailable`].
    pub fn from_declared(declared: Option<&str>) -> Self {
        match declared {
            Some("ISO8601") => Self::Iso8601,
            Some("NX_DATE_TIME") => Self::DateTime,
            Some("NX_BINARY") => Self::Binary,
            Some("NX_BOOLEAN") => Self::Boolean,
            Some("NX_CHAR") => Self::Char,
            Some("NX_FLOAT") => Self::Float,
            Some("NX_INT") => Self::Int,
            Some("NX_UINT") => Self::UInt,
            Some("NX_NUMBER") => Self::Number,
            Some("NX_POSINT") => Self::PosInt,
            _ => Self::Unavailable,
        }
    }

    /// The tag as written in NXDL.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Iso8601 => "ISO8601",
            Self::DateTime => "NX_DATE_TIME",
            Self::Binary => "NX_BINARY",
            Self::Boolean => "NX_BOOLEAN",
            Self::Char => "NX_CHAR",
            Self::Float => "NX_FLOAT",
            Self::Int => "NX_INT",
            Self::UInt => "NX_UINT",
            Self::Number => "NX_NUMBER",
            Self::PosInt => "NX_POSINT",
            Self::Unavailable => "NXDL_TYPE_UNAVAILABLE",
        }
    }

    /// Value shapes this type accepts.
    pub fn accepted_shapes(self) -> &'static [ValueShape] {
        use ValueShape::*;
        match self {
            Self::Iso8601 | Self::DateTime | Self::Unavailable => &[ScalarString],
            Self::Binary => &[RawBinary, NumericArray],
            Self::Boolean => &[ScalarBool, NumericArray],
            Self::Char => &[ScalarString, NumericArray],
            Self::Float => &[ScalarFloat, NumericArray],
            Self::Int | Self::PosInt => &[ScalarInt, NumericArray],
            Self::UInt => &[ScalarUInt, NumericArray],
            Self::Number => &[ScalarInt, ScalarUInt, ScalarFloat, NumericArray],
        }
    }

    /// Whether `value`, or every element of a list value, has an accepted
    /// shape.
    pub fn accepts(self, value: &Value) -> bool {
        match value {
            Value::List(items) => items
                .iter()
                .all(|item| item.shape().is_some_and(|s| self.accepted_shapes().contains(&s))),
            other => other
                .shape()
                .is_some_and(|s| self.accepted_shapes().contains(&s)),
        }
    }

    /// Whether values of this type must be timezone-aware timestamps.
    pub fn is_timestamp(self) -> bool {
        matches!(self, Self::Iso8601 | Self::DateTime)
    }
}

impl fmt::Display for NexusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn describe_shapes(shapes: &[ValueShape]) -> String {
    shapes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fail with [`ValidationError::TypeMismatch`] unless `value` conforms to
/// `nexus_type`.
pub fn check_type(value: &Value, nexus_type: NexusType, path: &str) -> Result<(), ValidationError> {
    if nexus_type.accepts(value) {
        return Ok(());
    }
    Err(ValidationError::TypeMismatch {
        path: path.to_string(),
        nexus_type: nexus_type.to_string(),
        accepted: describe_shapes(nexus_type.accepted_shapes()),
    })
}

/// Fail with [`ValidationError::Range`] unless `value` is positive.
///
/// Only the first flattened element of a numeric array is inspected; a
/// list is positive when each of its elements is.
pub fn check_positive(value: &Value, path: &str) -> Result<(), ValidationError> {
    if is_positive(value) {
        Ok(())
    } else {
        Err(ValidationError::Range {
            path: path.to_string(),
        })
    }
}

fn is_positive(value: &Value) -> bool {
    match value {
        Value::Int(i) => *i > 0,
        Value::UInt(u) => *u > 0,
        Value::Float(x) => *x > 0.0,
        Value::Bool(b) => *b,
        Value::Array(array) => array.first_is_positive(),
        Value::List(items) => items.iter().all(is_positive),
        Value::Str(_) | Value::Bytes(_) | Value::Null => false,
    }
}

/// Fail with [`ValidationError::Format`] unless `value` is a
/// timezone-aware ISO 8601 string.
pub fn check_timestamp(value: &Value, path: &str) -> Result<(), ValidationError> {
    match value.as_str() {
        Some(s) if is_timezone_aware_iso8601(s) => Ok(()),
        _ => Err(ValidationError::Format {
            path: path.to_string(),
        }),
    }
}

/// Check `value` against the enumeration declared on `node`.
///
/// Returns whether the value is acceptable and the declared values. The
/// last declared item is a placeholder and never matches, unless it is the
/// only item. Sequences and the empty string never match. A node without
/// an enumeration accepts everything and returns no values.
pub fn check_enum(value: &Value, node: &SchemaNode) -> (bool, Vec<String>) {
    let Some(items) = node.enumeration() else {
        return (true, Vec::new());
    };
    let comparable = match items.len() {
        1 => &items[..],
        n => &items[..n.saturating_sub(1)],
    };
    let valid = !value.is_sequence()
        && value
            .scalar_text()
            .is_some_and(|text| !text.is_empty() && comparable.contains(&text.as_str()));
    (valid, items.iter().map(|s| s.to_string()).collect())
}

/// Run the shape, range and format checks implied by `declared_type`.
pub fn check_value(value: &Value, declared_type: Option<&str>, path: &str) -> Result<(), ValidationError> {
    let nexus_type = NexusType::from_declared(declared_type);
    check_type(value, nexus_type, path)?;
    if nexus_type == NexusType::PosInt {
        check_positive(value, path)?;
    }
    if nexus_type.is_timestamp() {
        check_timestamp(value, path)?;
    }
    Ok(())
}
