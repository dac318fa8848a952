//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared by every crate in the converter. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Path errors name the offending path and the grammar rule it broke.
//! - Template load errors name the data-dictionary key that could not be
//!   mapped onto the value model.

use thiserror::Error;

/// Top-level error type for the converter core.
#[derive(Error, Debug)]
pub enum NxdcError {
    /// A data-dictionary path violated the bracket/slash grammar.
    #[error("malformed path: {0}")]
    MalformedPath(#[from] PathError),

    /// A data dictionary could not be mapped onto a template.
    #[error("template load error: {0}")]
    TemplateLoad(#[from] TemplateLoadError),
}

/// A path string violates the expected bracket/slash grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path is the empty string.
    #[error("path is empty")]
    Empty,

    /// The path does not begin with `/`.
    #[error("path {0:?} must start with '/'")]
    NotAbsolute(String),

    /// The path ends with `/`.
    #[error("path {0:?} has a trailing '/'")]
    TrailingSlash(String),

    /// The path contains `//`.
    #[error("path {0:?} contains an empty segment")]
    EmptySegment(String),

    /// A segment opens a `[` without closing it, or closes one it never opened.
    #[error("segment {segment:?} of path {path:?} has unbalanced brackets")]
    UnbalancedBrackets {
        /// The full path.
        path: String,
        /// The offending segment.
        segment: String,
    },
}

/// A data dictionary could not be mapped onto the template value model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateLoadError {
    /// The document root is not a JSON object.
    #[error("data dictionary must be an object mapping paths to values")]
    NotAnObject,

    /// A value is a nested object, which the flat path model cannot hold.
    #[error("value at {path} is a nested object; data dictionaries are flat")]
    NestedObject {
        /// The key holding the nested object.
        path: String,
    },

    /// A number could not be represented as i64, u64 or f64.
    #[error("value at {path} is a number outside the supported range")]
    UnsupportedNumber {
        /// The key holding the number.
        path: String,
    },
}
