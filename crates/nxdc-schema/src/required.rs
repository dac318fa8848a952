//! # Requiredness
//!
//! Four-valued classification of a resolved schema node. A pure function
//! of the node's optionality flags and the document it was found in.
//!
//! Application definitions default every node to required; base classes
//! default every node to optional. An application definition that
//! overrides a base-class node without flags therefore makes it required.

use serde::Serialize;

use crate::navigate::{Origin, ResolvedNode};
use crate::nxdl::SchemaNode;

/// Requiredness of a schema path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requiredness {
    /// Must be populated.
    Required,
    /// Should be populated.
    Recommended,
    /// May be populated.
    Optional,
    /// The path is not declared anywhere in the schema.
    NotInSchema,
}

impl Requiredness {
    /// Classify a resolution result. `None` is [`Requiredness::NotInSchema`].
    pub fn classify(resolved: Option<&ResolvedNode>) -> Self {
        match resolved {
            None => Self::NotInSchema,
            Some(r) => Self::classify_node(&r.node, &r.origin),
        }
    }

    /// Classify a node found in the document identified by `origin`.
    pub fn classify_node(node: &SchemaNode, origin: &Origin) -> Self {
        let flags = node.optionality();
        if is_true(&flags.optional) || flags.min_occurs.as_deref() == Some("0") {
            return Self::Optional;
        }
        if is_true(&flags.recommended) {
            return Self::Recommended;
        }
        if origin.is_base_class() || flags.required.as_deref() == Some("false") {
            return Self::Optional;
        }
        Self::Required
    }

    /// Whether a missing required leaf below a node of this requiredness
    /// may be excused when the whole branch is absent.
    pub fn is_optional_branch(self) -> bool {
        matches!(self, Self::Optional | Self::Recommended)
    }

    /// Label used in generated templates and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Recommended => "recommended",
            Self::Optional => "optional",
            Self::NotInSchema => "not_in_schema",
        }
    }
}

impl std::fmt::Display for Requiredness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_true(flag: &Option<String>) -> bool {
    flag.as_deref() == Some("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nxdl::NxdlDocument;

    fn field(attrs: &str) -> SchemaNode {
        let xml = format!(r#"<definition name="NXt"><field name="f" {attrs}/></definition>"#);
        let doc = NxdlDocument::parse(&xml, "NXt").unwrap();
        doc.root().children()[0].as_ref().clone()
    }

    fn app(attrs: &str) -> Requiredness {
        Requiredness::classify_node(&field(attrs), &Origin::ApplicationDefinition)
    }

    fn base(attrs: &str) -> Requiredness {
        Requiredness::classify_node(&field(attrs), &Origin::BaseClass("NXt".to_string()))
    }

    #[test]
    fn absent_node_is_not_in_schema() {
        assert_eq!(Requiredness::classify(None), Requiredness::NotInSchema);
    }

    #[test]
    fn application_default_is_required() {
        assert_eq!(app(""), Requiredness::Required);
        assert_eq!(app(r#"required="true""#), Requiredness::Required);
    }

    #[test]
    fn base_class_default_is_optional() {
        assert_eq!(base(""), Requiredness::Optional);
        assert_eq!(base(r#"required="true""#), Requiredness::Optional);
    }

    #[test]
    fn optional_flags() {
        assert_eq!(app(r#"optional="true""#), Requiredness::Optional);
        assert_eq!(app(r#"minOccurs="0""#), Requiredness::Optional);
        assert_eq!(app(r#"required="false""#), Requiredness::Optional);
        assert_eq!(app(r#"optional="false""#), Requiredness::Required);
        assert_eq!(app(r#"minOccurs="1""#), Requiredness::Required);
    }

    #[test]
    fn recommended_flag() {
        assert_eq!(app(r#"recommended="true""#), Requiredness::Recommended);
        assert_eq!(base(r#"recommended="true""#), Requiredness::Recommended);
    }

    #[test]
    fn optional_wins_over_recommended() {
        assert_eq!(
            app(r#"optional="true" recommended="true""#),
            Requiredness::Optional
        );
    }

    #[test]
    fn labels() {
        assert_eq!(Requiredness::Required.to_string(), "required");
        assert_eq!(
            serde_json::to_string(&Requiredness::NotInSchema).unwrap(),
            "\"not_in_schema\""
        );
        assert!(Requiredness::Recommended.is_optional_branch());
        assert!(!Requiredness::Required.is_optional_branch());
    }
}
