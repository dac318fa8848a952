//! # NXDL Documents
//!
//! Reads NeXus Definition Language XML into an immutable tree of
//! [`SchemaNode`]s. Only the structure the validator needs is kept:
//! `group`, `field`, `attribute`, `doc`, `enumeration` and `item`
//! elements with their naming, typing and optionality attributes. Other
//! elements (`dimensions`, `symbols`, `link`, ...) are skipped.
//!
//! Nodes are shared through `Arc` so a navigator can hand out a node from
//! a cached base-class document without copying the subtree.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

/// Error loading or parsing an NXDL document.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document could not be parsed as NXDL.
    #[error("schema load error for '{document}': {reason}")]
    SchemaLoad {
        /// Document name or path.
        document: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// No definition file exists for the requested name.
    #[error("definition '{name}' not found under {root}")]
    DefinitionNotFound {
        /// The requested definition, e.g. `NXmpes`.
        name: String,
        /// Definitions root that was searched.
        root: String,
    },

    /// IO error reading a definition file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Element kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The `<definition>` document root.
    Definition,
    /// `<group>`.
    Group,
    /// `<field>`.
    Field,
    /// `<attribute>`.
    Attribute,
    /// `<doc>`.
    Doc,
    /// `<enumeration>`.
    Enumeration,
    /// `<item>` inside an enumeration.
    Item,
}

impl NodeKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "group" => Some(Self::Group),
            "field" => Some(Self::Field),
            "attribute" => Some(Self::Attribute),
            "doc" => Some(Self::Doc),
            "enumeration" => Some(Self::Enumeration),
            "item" => Some(Self::Item),
            _ => None,
        }
    }

    /// Whether nodes of this kind are addressable by a path segment.
    pub fn is_named(self) -> bool {
        matches!(self, Self::Group | Self::Field | Self::Attribute)
    }
}

/// Raw optionality flags exactly as written in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionalityAttrs {
    /// `optional="..."`.
    pub optional: Option<String>,
    /// `recommended="..."`.
    pub recommended: Option<String>,
    /// `required="..."`.
    pub required: Option<String>,
    /// `minOccurs="..."`.
    pub min_occurs: Option<String>,
}

/// A node of a parsed NXDL document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    kind: NodeKind,
    name: Option<String>,
    type_name: Option<String>,
    name_type: Option<String>,
    optionality: OptionalityAttrs,
    deprecated: Option<String>,
    value: Option<String>,
    extends: Option<String>,
    category: Option<String>,
    text: Option<String>,
    children: Vec<Arc<SchemaNode>>,
}

/// Class assumed for a field or attribute without a `type` attribute.
pub const DEFAULT_FIELD_TYPE: &str = "NX_CHAR";

/// Base class describing the file level, above every definition root.
pub const ROOT_CLASS: &str = "NXroot";

impl SchemaNode {
    /// Element kind.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The `name` attribute, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The `type` attribute: a NeXus class for groups, a NeXus type for
    /// fields and attributes.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// The declared NeXus type of a field or attribute, `None` when the
    /// document leaves it out.
    pub fn declared_type(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Field | NodeKind::Attribute => self.type_name(),
            _ => None,
        }
    }

    /// Whether `nameType="any"` allows any instance name.
    pub fn name_is_any(&self) -> bool {
        self.name_type.as_deref() == Some("any")
    }

    /// Raw optionality flags.
    pub fn optionality(&self) -> &OptionalityAttrs {
        &self.optionality
    }

    /// The `deprecated` notice, if any.
    pub fn deprecated(&self) -> Option<&str> {
        self.deprecated.as_deref()
    }

    /// The `value` attribute of an enumeration item.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The `extends` attribute of a definition root.
    pub fn extends(&self) -> Option<&str> {
        self.extends.as_deref()
    }

    /// The `category` attribute of a definition root (`base` or
    /// `application`).
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Text content of a `doc` element.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Child nodes in document order.
    pub fn children(&self) -> &[Arc<SchemaNode>] {
        &self.children
    }

    /// The token a path segment is compared against.
    ///
    /// The `name` attribute when present; otherwise a group's class without
    /// its `NX` prefix, upper-cased (`NXentry` becomes `ENTRY`). `doc` and
    /// `enumeration` elements answer to their tag.
    pub fn local_name(&self) -> String {
        match self.kind {
            NodeKind::Doc => return "doc".to_string(),
            NodeKind::Enumeration => return "enumeration".to_string(),
            _ => {}
        }
        if let Some(name) = &self.name {
            return name.clone();
        }
        match &self.type_name {
            Some(ty) if ty.starts_with("NX") => nxdc_core::path::convert_nexus_to_caps(ty),
            Some(ty) => ty.clone(),
            None => String::new(),
        }
    }

    /// The class whose base-class document this node inherits from.
    ///
    /// A definition root inherits from [`ROOT_CLASS`], the file-level class
    /// its top-level groups live in, and a group from its `type`. Fields and attributes have primitive classes (`NX_FLOAT`,
    /// or `NX_CHAR` when untyped) and inherit nothing, as does any class
    /// with the private-type sentinel `_` at its third character.
    pub fn inheritable_class(&self) -> Option<&str> {
        let class = match self.kind {
            NodeKind::Definition => ROOT_CLASS,
            NodeKind::Group => self.type_name.as_deref()?,
            NodeKind::Field | NodeKind::Attribute => {
                self.type_name.as_deref().unwrap_or(DEFAULT_FIELD_TYPE)
            }
            NodeKind::Doc | NodeKind::Enumeration | NodeKind::Item => return None,
        };
        if is_primitive_class(class) {
            None
        } else {
            Some(class)
        }
    }

    /// Permitted values of the node's enumeration, in document order.
    ///
    /// `None` when the node declares no enumeration or an empty one.
    pub fn enumeration(&self) -> Option<Vec<&str>> {
        let enumeration = self
            .children
            .iter()
            .find(|c| c.kind == NodeKind::Enumeration)?;
        let items: Vec<&str> = enumeration
            .children
            .iter()
            .filter(|c| c.kind == NodeKind::Item)
            .filter_map(|c| c.value())
            .collect();
        if items.is_empty() {
            None
        } else {
            Some(items)
        }
    }
}

/// Whether a class name carries the private-type sentinel (`NX_FLOAT`).
pub fn is_primitive_class(class: &str) -> bool {
    class.chars().nth(2) == Some('_')
}

/// A parsed NXDL document: an application definition or a base class.
#[derive(Debug, Clone, PartialEq)]
pub struct NxdlDocument {
    name: String,
    root: Arc<SchemaNode>,
}

impl NxdlDocument {
    /// Parse NXDL XML text.
    ///
    /// `document` labels errors and names the document when the root
    /// carries no `name` attribute.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaLoad`] for malformed XML or a root
    /// element other than `<definition>`.
    pub fn parse(xml: &str, document: &str) -> Result<Self, SchemaError> {
        let doc = roxmltree::Document::parse(xml).map_err(|e| SchemaError::SchemaLoad {
            document: document.to_string(),
            reason: e.to_string(),
        })?;
        let root_element = doc.root_element();
        if root_element.tag_name().name() != "definition" {
            return Err(SchemaError::SchemaLoad {
                document: document.to_string(),
                reason: format!(
                    "root element is <{}>, expected <definition>",
                    root_element.tag_name().name()
                ),
            });
        }
        let root = read_node(root_element, NodeKind::Definition);
        let name = root.name.clone().unwrap_or_else(|| document.to_string());
        Ok(Self {
            name,
            root: Arc::new(root),
        })
    }

    /// Read and parse an NXDL file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the file cannot be read and
    /// [`SchemaError::SchemaLoad`] if it is not valid NXDL.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let xml = std::fs::read_to_string(path)?;
        Self::parse(&xml, &path.display().to_string())
    }

    /// Definition name, e.g. `NXmpes`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `<definition>` root node.
    pub fn root(&self) -> &Arc<SchemaNode> {
        &self.root
    }

    /// Whether this document is a base class (`category="base"`).
    pub fn is_base_class(&self) -> bool {
        self.root.category() == Some("base")
    }
}

fn read_node(element: roxmltree::Node<'_, '_>, kind: NodeKind) -> SchemaNode {
    let mut node = SchemaNode {
        kind,
        name: None,
        type_name: None,
        name_type: None,
        optionality: OptionalityAttrs::default(),
        deprecated: None,
        value: None,
        extends: None,
        category: None,
        text: None,
        children: Vec::new(),
    };

    for attr in element.attributes() {
        let value = Some(attr.value().to_string());
        match attr.name() {
            "name" => node.name = value,
            "type" => node.type_name = value,
            "nameType" => node.name_type = value,
            "optional" => node.optionality.optional = value,
            "recommended" => node.optionality.recommended = value,
            "required" => node.optionality.required = value,
            "minOccurs" => node.optionality.min_occurs = value,
            "deprecated" => node.deprecated = value,
            "value" => node.value = value,
            "extends" => node.extends = value,
            "category" => node.category = value,
            _ => {}
        }
    }

    if kind == NodeKind::Doc {
        let text: String = element
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();
        node.text = Some(text.trim().to_string());
        return node;
    }

    for child in element.children().filter(|n| n.is_element()) {
        let tag = child.tag_name().name();
        match NodeKind::from_tag(tag) {
            Some(child_kind) => node.children.push(Arc::new(read_node(child, child_kind))),
            None => tracing::trace!(tag, "skipping NXDL element"),
        }
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    const NXSAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definition xmlns="http://definition.nexusformat.org/nxdl/3.1"
            name="NXsample" extends="NXobject" type="group" category="base">
  <doc>Any information on the sample.</doc>
  <field name="name"><doc>Descriptive name of sample</doc></field>
  <field name="temperature" type="NX_FLOAT" units="NX_TEMPERATURE">
    <dimensions rank="1"><dim index="1" value="n_Temp"/></dimensions>
  </field>
  <field name="sample_component">
    <enumeration>
      <item value="sample"/>
      <item value="can"/>
      <item value="atmosphere"/>
    </enumeration>
  </field>
  <group type="NXenvironment"/>
  <group name="geometry" type="NXgeometry" deprecated="Use the field depends_on"/>
  <attribute name="default"/>
</definition>"#;

    fn child<'a>(node: &'a SchemaNode, name: &str) -> &'a SchemaNode {
        node.children()
            .iter()
            .find(|c| c.local_name() == name)
            .unwrap_or_else(|| panic!("no child {name}"))
    }

    #[test]
    fn parses_definition_root() {
        let doc = NxdlDocument::parse(NXSAMPLE, "NXsample.nxdl.xml").unwrap();
        assert_eq!(doc.name(), "NXsample");
        assert!(doc.is_base_class());
        assert_eq!(doc.root().kind(), NodeKind::Definition);
        assert_eq!(doc.root().extends(), Some("NXobject"));
    }

    #[test]
    fn skips_unknown_elements() {
        let doc = NxdlDocument::parse(NXSAMPLE, "NXsample.nxdl.xml").unwrap();
        let temperature = child(doc.root(), "temperature");
        assert_eq!(temperature.declared_type(), Some("NX_FLOAT"));
        assert!(temperature.children().is_empty());
    }

    #[test]
    fn local_names() {
        let doc = NxdlDocument::parse(NXSAMPLE, "NXsample.nxdl.xml").unwrap();
        let names: Vec<String> = doc.root().children().iter().map(|c| c.local_name()).collect();
        assert_eq!(
            names,
            vec!["doc", "name", "temperature", "sample_component", "ENVIRONMENT", "geometry", "default"]
        );
    }

    #[test]
    fn doc_text_is_trimmed() {
        let doc = NxdlDocument::parse(NXSAMPLE, "NXsample.nxdl.xml").unwrap();
        assert_eq!(
            child(doc.root(), "doc").text(),
            Some("Any information on the sample.")
        );
    }

    #[test]
    fn enumeration_values_in_order() {
        let doc = NxdlDocument::parse(NXSAMPLE, "NXsample.nxdl.xml").unwrap();
        let component = child(doc.root(), "sample_component");
        assert_eq!(component.enumeration(), Some(vec!["sample", "can", "atmosphere"]));
        assert_eq!(child(doc.root(), "temperature").enumeration(), None);
    }

    #[test]
    fn inheritable_classes() {
        let doc = NxdlDocument::parse(NXSAMPLE, "NXsample.nxdl.xml").unwrap();
        assert_eq!(doc.root().inheritable_class(), Some(ROOT_CLASS));
        assert_eq!(child(doc.root(), "ENVIRONMENT").inheritable_class(), Some("NXenvironment"));
        assert_eq!(child(doc.root(), "temperature").inheritable_class(), None);
        // Untyped fields default to NX_CHAR, which is primitive.
        assert_eq!(child(doc.root(), "name").inheritable_class(), None);
        assert!(is_primitive_class("NX_POSINT"));
        assert!(!is_primitive_class("NXdata"));
    }

    #[test]
    fn deprecated_notice_kept() {
        let doc = NxdlDocument::parse(NXSAMPLE, "NXsample.nxdl.xml").unwrap();
        assert_eq!(
            child(doc.root(), "geometry").deprecated(),
            Some("Use the field depends_on")
        );
    }

    #[test]
    fn rejects_non_definition_root() {
        let err = NxdlDocument::parse("<group type=\"NXentry\"/>", "bad.xml").unwrap_err();
        assert!(matches!(err, SchemaError::SchemaLoad { .. }));
    }

    #[test]
    fn rejects_malformed_xml() {
        let err = NxdlDocument::parse("<definition name=\"NXx\">", "bad.xml").unwrap_err();
        assert!(matches!(err, SchemaError::SchemaLoad { .. }));
    }
}
