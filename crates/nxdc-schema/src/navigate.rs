//! # Schema Navigation
//!
//! Resolves a schema-notation path (`/ENTRY/INSTRUMENT/energy`) to the NXDL
//! node that governs it.
//!
//! ## Inheritance
//!
//! Lookup is two-phase for every segment. The current node's own children
//! are searched first. When nothing matches, the base class named by the
//! node's class (`NXentry` for `<group type="NXentry">`) is loaded as an
//! independent document and its root's children are searched, then that
//! class's own `extends` chain. Top-level segments missing from the
//! definition root fall back to `NXroot`. An application definition
//! therefore only overrides the parts of a base class it mentions.
//!
//! A node found in a base-class document is reported with
//! [`Origin::BaseClass`], and so is everything resolved beneath it. The
//! requiredness rules depend on that origin.
//!
//! ## Matching
//!
//! - `@name` matches attribute children only.
//! - `doc` and `enumeration` match the marker element of that kind.
//! - Otherwise a child's [`SchemaNode::local_name`] must equal the segment,
//!   or a group's class (`NXentry`) must.
//! - Failing an exact match, a field or attribute whose declared name opens
//!   with an uppercase run (`AXISNAME_indices`) or carries `nameType="any"`
//!   matches any segment ending in the lowercase remainder. The candidate
//!   agreeing longest with the uppercase run wins.

use std::collections::HashSet;
use std::sync::Arc;

use crate::library::BaseClassSource;
use crate::nxdl::{NodeKind, NxdlDocument, SchemaError, SchemaNode};

/// Class at which `extends` chains stop.
pub const CHAIN_ROOT_CLASS: &str = "NXobject";

/// Document a resolved node was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// The application definition being validated against.
    ApplicationDefinition,
    /// An inherited base class, by name.
    BaseClass(String),
}

impl Origin {
    /// Whether the node came from a base class.
    pub fn is_base_class(&self) -> bool {
        matches!(self, Self::BaseClass(_))
    }
}

/// A schema node paired with the document it was resolved from.
#[derive(Debug, Clone)]
pub struct ResolvedNode {
    /// The governing NXDL node.
    pub node: Arc<SchemaNode>,
    /// Where the node was found.
    pub origin: Origin,
}

/// Path resolver over one application definition and a base-class source.
pub struct SchemaNavigator<'a> {
    definition: &'a NxdlDocument,
    base_classes: &'a dyn BaseClassSource,
}

impl<'a> SchemaNavigator<'a> {
    /// Create a navigator rooted at `definition`.
    pub fn new(definition: &'a NxdlDocument, base_classes: &'a dyn BaseClassSource) -> Self {
        Self {
            definition,
            base_classes,
        }
    }

    /// The application definition this navigator starts from.
    pub fn definition(&self) -> &NxdlDocument {
        self.definition
    }

    /// Resolve a schema-notation path.
    ///
    /// `/` resolves to the definition root. Returns `Ok(None)` when some
    /// segment matches neither the definition nor any inherited base class.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if a base-class document exists but cannot
    /// be loaded.
    pub fn resolve(&self, schema_path: &str) -> Result<Option<ResolvedNode>, SchemaError> {
        let mut current = ResolvedNode {
            node: Arc::clone(self.definition.root()),
            origin: Origin::ApplicationDefinition,
        };
        let trimmed = schema_path.strip_prefix('/').unwrap_or(schema_path);
        if trimmed.is_empty() {
            return Ok(Some(current));
        }
        for segment in trimmed.split('/') {
            match self.resolve_child(&current, segment)? {
                Some(next) => current = next,
                None => {
                    tracing::debug!(path = %schema_path, segment, "path not in schema");
                    return Ok(None);
                }
            }
        }
        Ok(Some(current))
    }

    /// Resolve one segment below `parent`, falling back to inherited base
    /// classes.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if a base-class document exists but cannot
    /// be loaded.
    pub fn resolve_child(
        &self,
        parent: &ResolvedNode,
        segment: &str,
    ) -> Result<Option<ResolvedNode>, SchemaError> {
        if let Some(node) = find_child(&parent.node, segment) {
            return Ok(Some(ResolvedNode {
                node,
                origin: parent.origin.clone(),
            }));
        }

        let mut visited = HashSet::new();
        let mut class = parent.node.inheritable_class().map(str::to_string);
        while let Some(name) = class {
            if name == CHAIN_ROOT_CLASS || !visited.insert(name.clone()) {
                break;
            }
            let Some(base) = self.base_classes.load_base_class(&name)? else {
                tracing::debug!(class = %name, "base class not available");
                break;
            };
            if let Some(node) = find_child(base.root(), segment) {
                return Ok(Some(ResolvedNode {
                    node,
                    origin: Origin::BaseClass(base.name().to_string()),
                }));
            }
            class = base.root().extends().map(str::to_string);
        }
        Ok(None)
    }
}

/// Find the direct child of `node` addressed by `segment`.
pub fn find_child(node: &SchemaNode, segment: &str) -> Option<Arc<SchemaNode>> {
    let children = node.children();

    if let Some(attribute) = segment.strip_prefix('@') {
        let attributes = children.iter().filter(|c| c.kind() == NodeKind::Attribute);
        return best_named_match(attributes, attribute);
    }

    match segment {
        "doc" => return marker(children, NodeKind::Doc),
        "enumeration" => return marker(children, NodeKind::Enumeration),
        _ => {}
    }

    let exact = children.iter().find(|c| match c.kind() {
        NodeKind::Group => c.local_name() == segment || c.type_name() == Some(segment),
        NodeKind::Field => c.local_name() == segment,
        _ => false,
    });
    if let Some(child) = exact {
        return Some(Arc::clone(child));
    }

    let fields = children.iter().filter(|c| c.kind() == NodeKind::Field);
    best_named_match(fields, segment)
}

fn marker(children: &[Arc<SchemaNode>], kind: NodeKind) -> Option<Arc<SchemaNode>> {
    children.iter().find(|c| c.kind() == kind).cloned()
}

fn best_named_match<'n>(
    candidates: impl Iterator<Item = &'n Arc<SchemaNode>> + Clone,
    segment: &str,
) -> Option<Arc<SchemaNode>> {
    if let Some(exact) = candidates.clone().find(|c| c.local_name() == segment) {
        return Some(Arc::clone(exact));
    }
    let mut best: Option<(usize, &Arc<SchemaNode>)> = None;
    for candidate in candidates {
        let Some(name) = candidate.name() else {
            continue;
        };
        if !(has_replaceable_prefix(name) || candidate.name_is_any()) {
            continue;
        }
        let fit = name_fit(segment, name).or_else(|| candidate.name_is_any().then_some(0));
        if let Some(fit) = fit {
            if best.map_or(true, |(best_fit, _)| fit > best_fit) {
                best = Some((fit, candidate));
            }
        }
    }
    best.map(|(_, node)| Arc::clone(node))
}

fn has_replaceable_prefix(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// How well `segment` fits a declared name with a replaceable uppercase
/// prefix.
///
/// `None` when the segment does not end in the declared name's lowercase
/// remainder. Otherwise the number of leading characters that agree
/// case-insensitively with the prefix, or 0 when the agreement stops short.
pub fn name_fit(segment: &str, declared: &str) -> Option<usize> {
    let prefix_end = declared
        .char_indices()
        .find(|(_, c)| c.is_lowercase())
        .map_or(declared.len(), |(i, _)| i);
    let (prefix, suffix) = declared.split_at(prefix_end);
    if !segment.ends_with(suffix) {
        return None;
    }

    let comparable = prefix.chars().count().min(segment.chars().count());
    let agreeing = segment
        .chars()
        .zip(prefix.chars())
        .take_while(|(s, p)| s.to_uppercase().eq(std::iter::once(*p)))
        .count();
    Some(if agreeing == comparable { agreeing } else { 0 })
}
