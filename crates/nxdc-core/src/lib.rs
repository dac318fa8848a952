#![deny(missing_docs)]

//! # nxdc-core — Foundational Types for the NeXus Data Converter
//!
//! This crate defines the data side of validation: how a datum is
//! addressed, what values a reader may produce, and the flat template that
//! carries them to the schema engine. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Three path notations, one module.** Data-dictionary, schema and
//!    storage paths are converted only through [`path`]. The conversions
//!    are pure functions of the input path.
//!
//! 2. **Closed value model.** [`Value`] is a tagged union; conformance to a
//!    NeXus type is a match on [`ValueShape`], never open-ended type
//!    introspection.
//!
//! 3. **Deterministic templates.** [`Template`] iterates in sorted path
//!    order so diagnostics are reproducible.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `nxdc-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests. The single `expect` builds a
//!   literal regex whose compilation is itself tested.

pub mod error;
pub mod path;
pub mod template;
pub mod temporal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::{NxdcError, PathError, TemplateLoadError};
pub use path::{
    extract_suggested_name, template_path_to_schema_path, template_path_to_storage_path,
};
pub use template::Template;
pub use temporal::is_timezone_aware_iso8601;
pub use value::{NumericArray, Value, ValueShape};
