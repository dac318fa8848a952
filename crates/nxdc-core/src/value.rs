//! # Value Model
//!
//! Readers produce values of a small, closed set of host shapes. The schema
//! checker decides conformance by matching on [`ValueShape`] rather than by
//! inspecting arbitrary host types.
//!
//! A [`Value::List`] is a host sequence whose elements are checked one by
//! one. A [`Value::Array`] is a single n-dimensional numeric measurement.

use std::fmt;

use ndarray::{ArrayD, IxDyn};

use crate::error::TemplateLoadError;

/// An n-dimensional numeric array, tagged by element type.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericArray {
    /// Signed integer elements.
    Int(ArrayD<i64>),
    /// Unsigned integer elements.
    UInt(ArrayD<u64>),
    /// Floating-point elements.
    Float(ArrayD<f64>),
    /// Boolean elements.
    Bool(ArrayD<bool>),
}

impl NumericArray {
    /// Shape of the array.
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Int(a) => a.shape(),
            Self::UInt(a) => a.shape(),
            Self::Float(a) => a.shape(),
            Self::Bool(a) => a.shape(),
        }
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Int(a) => a.len(),
            Self::UInt(a) => a.len(),
            Self::Float(a) => a.len(),
            Self::Bool(a) => a.len(),
        }
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the first element in logical (row-major) order is strictly
    /// positive. Booleans count `true` as one. An empty array has no
    /// positive first element.
    pub fn first_is_positive(&self) -> bool {
        match self {
            Self::Int(a) => a.iter().next().is_some_and(|v| *v > 0),
            Self::UInt(a) => a.iter().next().is_some_and(|v| *v > 0),
            Self::Float(a) => a.iter().next().is_some_and(|v| *v > 0.0),
            Self::Bool(a) => a.iter().next().is_some_and(|v| *v),
        }
    }
}

/// A concrete value held by a template slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text.
    Str(String),
    /// Boolean scalar.
    Bool(bool),
    /// Signed integer scalar.
    Int(i64),
    /// Unsigned integer scalar.
    UInt(u64),
    /// Floating-point scalar.
    Float(f64),
    /// Raw binary buffer.
    Bytes(Vec<u8>),
    /// N-dimensional numeric array.
    Array(NumericArray),
    /// Host sequence of values.
    List(Vec<Value>),
    /// A `null` element inside a list. No NeXus type accepts it.
    Null,
}

/// Shape classification of a non-sequence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    /// [`Value::Str`].
    ScalarString,
    /// [`Value::Bool`].
    ScalarBool,
    /// [`Value::Int`].
    ScalarInt,
    /// [`Value::UInt`].
    ScalarUInt,
    /// [`Value::Float`].
    ScalarFloat,
    /// [`Value::Array`], whatever its element type.
    NumericArray,
    /// [`Value::Bytes`].
    RawBinary,
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ScalarString => "string",
            Self::ScalarBool => "bool",
            Self::ScalarInt => "int",
            Self::ScalarUInt => "uint",
            Self::ScalarFloat => "float",
            Self::NumericArray => "numeric array",
            Self::RawBinary => "binary",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Shape of this value, or `None` for a [`Value::List`] or
    /// [`Value::Null`].
    pub fn shape(&self) -> Option<ValueShape> {
        match self {
            Self::Str(_) => Some(ValueShape::ScalarString),
            Self::Bool(_) => Some(ValueShape::ScalarBool),
            Self::Int(_) => Some(ValueShape::ScalarInt),
            Self::UInt(_) => Some(ValueShape::ScalarUInt),
            Self::Float(_) => Some(ValueShape::ScalarFloat),
            Self::Array(_) => Some(ValueShape::NumericArray),
            Self::Bytes(_) => Some(ValueShape::RawBinary),
            Self::List(_) | Self::Null => None,
        }
    }

    /// Whether the value is a sequence: a list, an array, or a byte buffer.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::List(_) | Self::Array(_) | Self::Bytes(_))
    }

    /// Borrow the text of a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical text of a scalar, used for enumeration membership.
    ///
    /// Strings are returned verbatim; numbers and booleans use their
    /// `Display` form. Sequences have no canonical text.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::UInt(u) => Some(u.to_string()),
            Self::Float(x) => Some(x.to_string()),
            Self::Bytes(_) | Self::Array(_) | Self::List(_) | Self::Null => None,
        }
    }

    /// Map a JSON value onto the value model.
    ///
    /// `null` maps to `None` (an unpopulated slot). Rectangular arrays of
    /// numbers or booleans become a [`NumericArray`]; any other array
    /// becomes a [`Value::List`] whose nested arrays are lists too and
    /// whose `null` elements are [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`TemplateLoadError`] for nested objects and numbers outside
    /// the supported range. `path` only labels the error.
    pub fn from_json(
        path: &str,
        json: &serde_json::Value,
    ) -> Result<Option<Self>, TemplateLoadError> {
        use serde_json::Value as J;
        let value = match json {
            J::Null => return Ok(None),
            J::Bool(b) => Self::Bool(*b),
            J::String(s) => Self::Str(s.clone()),
            J::Number(n) => number_from_json(path, n)?,
            J::Array(items) => match numeric_array_from_json(items) {
                Some(array) => Self::Array(array),
                None => Self::List(list_from_json(path, items)?),
            },
            J::Object(_) => {
                return Err(TemplateLoadError::NestedObject {
                    path: path.to_string(),
                })
            }
        };
        Ok(Some(value))
    }
}

/// Elements of a non-numeric JSON array. Inner arrays stay lists so a
/// ragged numeric array is checked element by element.
fn list_from_json(path: &str, items: &[serde_json::Value]) -> Result<Vec<Value>, TemplateLoadError> {
    use serde_json::Value as J;
    items
        .iter()
        .map(|item| match item {
            J::Array(inner) => list_from_json(path, inner).map(Value::List),
            other => Value::from_json(path, other).map(|v| v.unwrap_or(Value::Null)),
        })
        .collect()
}

fn number_from_json(path: &str, n: &serde_json::Number) -> Result<Value, TemplateLoadError> {
    if let Some(i) = n.as_i64() {
        Ok(Value::Int(i))
    } else if let Some(u) = n.as_u64() {
        Ok(Value::UInt(u))
    } else if let Some(f) = n.as_f64() {
        Ok(Value::Float(f))
    } else {
        Err(TemplateLoadError::UnsupportedNumber {
            path: path.to_string(),
        })
    }
}

/// Leaf element collected while flattening a nested JSON array.
enum Leaf {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

/// Try to read a nested JSON array as a rectangular numeric array.
///
/// Returns `None` when the array holds anything but numbers or booleans,
/// mixes booleans with numbers, or is ragged, so the caller can fall back
/// to a list. An empty array is not numeric.
fn numeric_array_from_json(items: &[serde_json::Value]) -> Option<NumericArray> {
    if items.is_empty() {
        return None;
    }
    let mut shape = Vec::new();
    let mut leaves = Vec::new();
    let mut ragged = false;
    if !flatten(items, 0, &mut shape, &mut leaves, &mut ragged) || ragged {
        return None;
    }
    let dim = IxDyn(&shape);

    let all_bool = leaves.iter().all(|l| matches!(l, Leaf::Bool(_)));
    let any_bool = leaves.iter().any(|l| matches!(l, Leaf::Bool(_)));
    if any_bool && !all_bool {
        return None;
    }
    if all_bool {
        let data = leaves
            .iter()
            .map(|l| matches!(l, Leaf::Bool(true)))
            .collect();
        return ArrayD::from_shape_vec(dim, data).ok().map(NumericArray::Bool);
    }

    if leaves.iter().any(|l| matches!(l, Leaf::Float(_))) {
        let data = leaves
            .iter()
            .map(|l| match l {
                Leaf::Int(i) => *i as f64,
                Leaf::UInt(u) => *u as f64,
                Leaf::Float(f) => *f,
                Leaf::Bool(_) => 0.0,
            })
            .collect();
        return ArrayD::from_shape_vec(dim, data).ok().map(NumericArray::Float);
    }

    if leaves.iter().any(|l| matches!(l, Leaf::UInt(_))) {
        let negative = leaves.iter().any(|l| matches!(l, Leaf::Int(i) if *i < 0));
        if negative {
            // Mixed signs beyond i64 range: fall back to floats.
            let data = leaves
                .iter()
                .map(|l| match l {
                    Leaf::Int(i) => *i as f64,
                    Leaf::UInt(u) => *u as f64,
                    _ => 0.0,
                })
                .collect();
            return ArrayD::from_shape_vec(dim, data).ok().map(NumericArray::Float);
        }
        let data = leaves
            .iter()
            .map(|l| match l {
                Leaf::Int(i) => *i as u64,
                Leaf::UInt(u) => *u,
                _ => 0,
            })
            .collect();
        return ArrayD::from_shape_vec(dim, data).ok().map(NumericArray::UInt);
    }

    let data = leaves
        .iter()
        .map(|l| match l {
            Leaf::Int(i) => *i,
            _ => 0,
        })
        .collect();
    ArrayD::from_shape_vec(dim, data).ok().map(NumericArray::Int)
}

/// Depth-first flatten recording the length seen at each depth.
///
/// Returns `false` as soon as a non-numeric leaf, an empty sub-array, or a
/// leaf/array mix at one depth is found. Sets `ragged` when two sub-arrays
/// at the same depth differ in length.
fn flatten(
    items: &[serde_json::Value],
    depth: usize,
    shape: &mut Vec<usize>,
    leaves: &mut Vec<Leaf>,
    ragged: &mut bool,
) -> bool {
    use serde_json::Value as J;
    if items.is_empty() {
        return false;
    }
    match shape.get(depth) {
        Some(&len) if len != items.len() => *ragged = true,
        Some(_) => {}
        None => shape.push(items.len()),
    }
    let nested = matches!(items[0], J::Array(_));
    for item in items {
        match (item, nested) {
            (J::Array(inner), true) => {
                if !flatten(inner, depth + 1, shape, leaves, ragged) {
                    return false;
                }
            }
            (J::Number(n), false) => {
                if let Some(i) = n.as_i64() {
                    leaves.push(Leaf::Int(i));
                } else if let Some(u) = n.as_u64() {
                    leaves.push(Leaf::UInt(u));
                } else if let Some(f) = n.as_f64() {
                    leaves.push(Leaf::Float(f));
                } else {
                    return false;
                }
            }
            (J::Bool(b), false) => leaves.push(Leaf::Bool(*b)),
            _ => return false,
        }
    }
    true
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Self::UInt(u)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<NumericArray> for Value {
    fn from(a: NumericArray) -> Self {
        Self::Array(a)
    }
}
