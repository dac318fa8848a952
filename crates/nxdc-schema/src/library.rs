//! # Definitions Library
//!
//! Base-class documents are addressed by convention: class `NXname` lives
//! at `base_classes/NXname.nxdl.xml` under a NeXus definitions checkout.
//! The navigator reaches them through the [`BaseClassSource`] trait so it
//! does not care whether they come from disk or memory.
//!
//! ## Caching
//!
//! [`DefinitionsDir`] parses each base class at most once for its
//! lifetime. Sibling fields of one group all fall back to the same base
//! class, so without the cache a single validation run would re-parse the
//! same document many times. Misses are cached too.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::nxdl::{NxdlDocument, SchemaError};

/// Directory holding base classes under a definitions root.
pub const BASE_CLASSES_DIR: &str = "base_classes";

/// Directories searched, in order, for a definition by name.
pub const DEFINITION_DIRS: [&str; 3] = ["applications", "contributed_definitions", BASE_CLASSES_DIR];

/// File suffix of NXDL documents.
pub const NXDL_SUFFIX: &str = ".nxdl.xml";

/// Source of parsed base-class documents.
pub trait BaseClassSource {
    /// Load the base class named `class_name` (e.g. `NXsample`).
    ///
    /// Returns `Ok(None)` when no such base class exists.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the document exists but cannot be read
    /// or parsed.
    fn load_base_class(&self, class_name: &str) -> Result<Option<Arc<NxdlDocument>>, SchemaError>;
}

/// A NeXus definitions checkout on disk.
///
/// `Send + Sync`: the cache sits behind a `parking_lot::RwLock`, which is
/// never held while a document is being parsed.
#[derive(Debug)]
pub struct DefinitionsDir {
    root: PathBuf,
    cache: RwLock<HashMap<String, Option<Arc<NxdlDocument>>>>,
}

impl DefinitionsDir {
    /// Open a definitions root.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaLoad`] if `root` is not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(SchemaError::SchemaLoad {
                document: root.display().to_string(),
                reason: "definitions root is not a directory".to_string(),
            });
        }
        Ok(Self {
            root,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// The definitions root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Conventional location of a base class document.
    pub fn base_class_path(&self, class_name: &str) -> PathBuf {
        self.root
            .join(BASE_CLASSES_DIR)
            .join(format!("{class_name}{NXDL_SUFFIX}"))
    }

    /// Locate a definition (application, contributed, or base class) by name.
    pub fn find_definition(&self, name: &str) -> Option<PathBuf> {
        let file = format!("{name}{NXDL_SUFFIX}");
        DEFINITION_DIRS
            .iter()
            .map(|dir| self.root.join(dir).join(&file))
            .find(|p| p.is_file())
    }

    /// Load and parse a definition by name, typically an application
    /// definition such as `NXmpes`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DefinitionNotFound`] if no file matches, or
    /// the load error of the file that does.
    pub fn load_definition(&self, name: &str) -> Result<NxdlDocument, SchemaError> {
        let path = self
            .find_definition(name)
            .ok_or_else(|| SchemaError::DefinitionNotFound {
                name: name.to_string(),
                root: self.root.display().to_string(),
            })?;
        tracing::debug!(definition = name, path = %path.display(), "loading NXDL definition");
        NxdlDocument::load(&path)
    }

    /// Number of cached base-class lookups, hits and misses.
    pub fn cached_count(&self) -> usize {
        self.cache.read().len()
    }
}

impl BaseClassSource for DefinitionsDir {
    fn load_base_class(&self, class_name: &str) -> Result<Option<Arc<NxdlDocument>>, SchemaError> {
        if let Some(cached) = self.cache.read().get(class_name) {
            return Ok(cached.clone());
        }

        let path = self.base_class_path(class_name);
        let loaded = if path.is_file() {
            tracing::debug!(class = class_name, path = %path.display(), "loading base class");
            Some(Arc::new(NxdlDocument::load(&path)?))
        } else {
            tracing::debug!(class = class_name, "no base class document");
            None
        };

        let mut cache = self.cache.write();
        let entry = cache.entry(class_name.to_string()).or_insert(loaded);
        Ok(entry.clone())
    }
}

/// Pre-parsed base classes held in memory, keyed by document name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDefinitions {
    documents: HashMap<String, Arc<NxdlDocument>>,
}

impl InMemoryDefinitions {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document under its own name, replacing any previous one.
    pub fn insert(&mut self, document: NxdlDocument) {
        self.documents
            .insert(document.name().to_string(), Arc::new(document));
    }

    /// Parse and add an NXDL document.
    ///
    /// # Errors
    ///
    /// Returns the parse error of the document.
    pub fn insert_xml(&mut self, xml: &str) -> Result<(), SchemaError> {
        self.insert(NxdlDocument::parse(xml, "<memory>")?);
        Ok(())
    }

    /// Number of documents held.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no document is held.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl BaseClassSource for InMemoryDefinitions {
    fn load_base_class(&self, class_name: &str) -> Result<Option<Arc<NxdlDocument>>, SchemaError> {
        Ok(self.documents.get(class_name).cloned())
    }
}
