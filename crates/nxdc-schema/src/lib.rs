//! # nxdc-schema — NXDL Schema Engine
//!
//! Decides whether a populated data dictionary conforms to a NeXus
//! application definition.
//!
//! ## Loading (`nxdl`, `library`)
//!
//! [`NxdlDocument`] parses NXDL XML into an immutable node tree. A
//! [`BaseClassSource`] supplies the base classes application definitions
//! inherit from; [`DefinitionsDir`] reads them from a NeXus definitions
//! checkout and caches each one after first use.
//!
//! ## Resolution (`navigate`, `required`)
//!
//! [`SchemaNavigator`] maps a schema path to its governing node, searching
//! the definition first and inherited base classes second.
//! [`Requiredness`] classifies the result; nodes inherited from base
//! classes default to optional, nodes of the definition to required.
//!
//! ## Validation (`typecheck`, `validate`, `generate`)
//!
//! [`generate_template`] declares the paths a definition defines.
//! [`TemplateValidator`] checks a data dictionary against them: missing
//! required entries, value shapes per NeXus type, positive integers,
//! timestamps and enumerations. The first failure is returned.
//!
//! ## Crate Policy
//!
//! - Depends only on `nxdc-core` internally.
//! - Validation never mutates its inputs.
//! - Library code emits `tracing` events and never installs a subscriber.

pub mod generate;
pub mod library;
pub mod navigate;
pub mod nxdl;
pub mod required;
pub mod typecheck;
pub mod validate;

pub use generate::{declared_template, generate_template, DeclaredPath};
pub use library::{BaseClassSource, DefinitionsDir, InMemoryDefinitions};
pub use navigate::{Origin, ResolvedNode, SchemaNavigator};
pub use nxdl::{NodeKind, NxdlDocument, SchemaError, SchemaNode};
pub use required::Requiredness;
pub use typecheck::NexusType;
pub use validate::{validate_data_dict, TemplateValidator, ValidationError};
