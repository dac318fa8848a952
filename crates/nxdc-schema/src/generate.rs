//! # Template Generation
//!
//! Declares every field and attribute of an application definition as a
//! data-dictionary path, giving readers the slots to fill and the
//! validator the paths to check. Only the definition's own tree is walked;
//! inherited base-class content is not declared.

use nxdc_core::path::{convert_nexus_to_caps, convert_nexus_to_suggested_name};
use nxdc_core::{NxdcError, Template};
use serde::Serialize;

use crate::navigate::Origin;
use crate::nxdl::{NodeKind, NxdlDocument, SchemaNode};
use crate::required::Requiredness;

/// A data-dictionary path declared by an application definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredPath {
    /// Path in data-dictionary notation, e.g. `/ENTRY[entry]/title`.
    pub path: String,
    /// Requiredness of the path's own node.
    pub requiredness: Requiredness,
}

/// Declare every field and attribute of `definition`, sorted by path.
pub fn generate_template(definition: &NxdlDocument) -> Vec<DeclaredPath> {
    let mut out = Vec::new();
    walk(definition.root(), "", &mut out);
    out.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(definition = definition.name(), paths = out.len(), "generated template");
    out
}

/// Build an unpopulated template with a slot for every declared path.
///
/// # Errors
///
/// Returns [`NxdcError::MalformedPath`] if a declared path is malformed.
pub fn declared_template(paths: &[DeclaredPath]) -> Result<Template, NxdcError> {
    Template::from_paths(paths.iter().map(|d| d.path.as_str()))
}

fn walk(node: &SchemaNode, prefix: &str, out: &mut Vec<DeclaredPath>) {
    for child in node.children() {
        let Some(segment) = segment_for(child) else {
            continue;
        };
        let path = format!("{prefix}/{segment}");
        if matches!(child.kind(), NodeKind::Field | NodeKind::Attribute) {
            out.push(DeclaredPath {
                path: path.clone(),
                requiredness: Requiredness::classify_node(child, &Origin::ApplicationDefinition),
            });
        }
        if matches!(child.kind(), NodeKind::Group | NodeKind::Field) {
            walk(child, &path, out);
        }
    }
}

fn segment_for(node: &SchemaNode) -> Option<String> {
    match node.kind() {
        NodeKind::Group => match (node.name(), node.type_name()) {
            (Some(name), _) => Some(named_segment(name)),
            (None, Some(class)) => Some(format!(
                "{}[{}]",
                convert_nexus_to_caps(class),
                convert_nexus_to_suggested_name(class)
            )),
            (None, None) => None,
        },
        NodeKind::Field => node.name().map(named_segment),
        NodeKind::Attribute => node.name().map(|name| format!("@{name}")),
        _ => None,
    }
}

/// A name with a replaceable uppercase prefix gets a suggested name.
fn named_segment(name: &str) -> String {
    if name.chars().next().is_some_and(char::is_uppercase) {
        format!("{name}[{}]", name.to_lowercase())
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::InMemoryDefinitions;
    use crate::navigate::SchemaNavigator;

    const NXTEST: &str = r#"<definition name="NXtest" extends="NXobject" type="group" category="application">
  <doc>Test definition.</doc>
  <group type="NXentry">
    <field name="title"/>
    <field name="start_time" type="NX_DATE_TIME" recommended="true">
      <attribute name="timezone" optional="true"/>
    </field>
    <group name="instrument" type="NXinstrument" minOccurs="0">
      <field name="energy" type="NX_FLOAT" required="false"/>
    </group>
    <group type="NXdata">
      <field name="DATA" type="NX_NUMBER"/>
      <attribute name="signal"/>
    </group>
  </group>
</definition>"#;

    fn generated() -> Vec<DeclaredPath> {
        generate_template(&NxdlDocument::parse(NXTEST, "NXtest").unwrap())
    }

    #[test]
    fn declares_fields_and_attributes() {
        let paths: Vec<String> = generated().into_iter().map(|d| d.path).collect();
        assert_eq!(
            paths,
            vec![
                "/ENTRY[entry]/DATA[data]/@signal",
                "/ENTRY[entry]/DATA[data]/DATA[data]",
                "/ENTRY[entry]/instrument/energy",
                "/ENTRY[entry]/start_time",
                "/ENTRY[entry]/start_time/@timezone",
                "/ENTRY[entry]/title",
            ]
        );
    }

    #[test]
    fn carries_requiredness() {
        let by_path = |p: &str| {
            generated()
                .into_iter()
                .find(|d| d.path == p)
                .map(|d| d.requiredness)
        };
        assert_eq!(by_path("/ENTRY[entry]/title"), Some(Requiredness::Required));
        assert_eq!(by_path("/ENTRY[entry]/start_time"), Some(Requiredness::Recommended));
        assert_eq!(by_path("/ENTRY[entry]/instrument/energy"), Some(Requiredness::Optional));
        assert_eq!(by_path("/ENTRY[entry]/start_time/@timezone"), Some(Requiredness::Optional));
    }

    #[test]
    fn every_declared_path_resolves_to_the_same_requiredness() {
        let definition = NxdlDocument::parse(NXTEST, "NXtest").unwrap();
        let library = InMemoryDefinitions::new();
        let navigator = SchemaNavigator::new(&definition, &library);
        for declared in generate_template(&definition) {
            let schema_path = nxdc_core::template_path_to_schema_path(&declared.path).unwrap();
            let resolved = navigator.resolve(&schema_path).unwrap();
            assert_eq!(
                Requiredness::classify(resolved.as_ref()),
                declared.requiredness,
                "{}",
                declared.path
            );
        }
    }

    #[test]
    fn declared_template_is_unpopulated() {
        let template = declared_template(&generated()).unwrap();
        assert_eq!(template.len(), 6);
        assert_eq!(template.populated().count(), 0);
    }

    #[test]
    fn serializes_with_snake_case_requiredness() {
        let json = serde_json::to_value(&generated()[0]).unwrap();
        assert_eq!(json["requiredness"], "required");
    }
}
