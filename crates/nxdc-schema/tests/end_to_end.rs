//! Integration test: validate JSON data dictionaries against an application
//! definition read from a definitions directory on disk.
//!
//! The fixture lays out a miniature NeXus definitions checkout in a temp
//! directory (`applications/` plus `base_classes/`) and drives generation,
//! resolution and validation through the public API only.

use nxdc_core::Template;
use nxdc_schema::{
    declared_template, generate_template, BaseClassSource, DefinitionsDir, Origin, Requiredness,
    SchemaError, SchemaNavigator, TemplateValidator, ValidationError,
};
use serde_json::json;
use tempfile::TempDir;

const NXE2E: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definition xmlns="http://definition.nexusformat.org/nxdl/3.1"
            name="NXe2e" extends="NXobject" type="group" category="application">
  <doc>Application definition used by the integration tests.</doc>
  <group type="NXentry">
    <field name="title" type="NX_CHAR"/>
    <field name="run_cycle" type="NX_POSINT" optional="true"/>
    <field name="start_time" type="NX_DATE_TIME" optional="true"/>
    <group name="sample" type="NXsample">
      <field name="temperature" type="NX_FLOAT" recommended="true"/>
    </group>
    <group name="instrument" type="NXinstrument" optional="true">
      <field name="sample"/>
      <field name="energy_mode">
        <enumeration>
          <item value="fixed"/>
          <item value="swept"/>
          <item value="other"/>
        </enumeration>
      </field>
    </group>
  </group>
</definition>"#;

const NXENTRY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definition name="NXentry" extends="NXobject" type="group" category="base">
  <field name="title"/>
  <field name="experiment_identifier"/>
  <group type="NXsample"/>
</definition>"#;

const NXSAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definition name="NXsample" extends="NXobject" type="group" category="base">
  <field name="name"/>
  <field name="temperature" type="NX_FLOAT"/>
</definition>"#;

const NXINSTRUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definition name="NXinstrument" extends="NXobject" type="group" category="base">
  <field name="name"/>
</definition>"#;

fn definitions_root() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    let apps = dir.path().join("applications");
    let bases = dir.path().join("base_classes");
    std::fs::create_dir_all(&apps).unwrap();
    std::fs::create_dir_all(&bases).unwrap();
    std::fs::write(apps.join("NXe2e.nxdl.xml"), NXE2E).unwrap();
    std::fs::write(bases.join("NXentry.nxdl.xml"), NXENTRY).unwrap();
    std::fs::write(bases.join("NXsample.nxdl.xml"), NXSAMPLE).unwrap();
    std::fs::write(bases.join("NXinstrument.nxdl.xml"), NXINSTRUMENT).unwrap();
    dir
}

fn validate(library: &DefinitionsDir, data: serde_json::Value) -> Result<bool, ValidationError> {
    let definition = library.load_definition("NXe2e").unwrap();
    let schema_template = declared_template(&generate_template(&definition)).unwrap();
    let data = Template::from_json(&data).unwrap();
    TemplateValidator::new(&definition, library).validate(&schema_template, &data)
}

#[test]
fn title_only_data_dictionary_is_valid() {
    let root = definitions_root();
    let library = DefinitionsDir::new(root.path()).unwrap();
    assert!(validate(&library, json!({ "/ENTRY[entry]/title": "Run 1" })).unwrap());
}

#[test]
fn missing_title_fails() {
    let root = definitions_root();
    let library = DefinitionsDir::new(root.path()).unwrap();
    let err = validate(
        &library,
        json!({
            "/ENTRY[entry]/title": null,
            "/ENTRY[entry]/sample/temperature": 300.0
        }),
    )
    .unwrap_err();
    match err {
        ValidationError::MissingRequiredField { path } => assert_eq!(path, "/ENTRY[entry]/title"),
        other => panic!("expected MissingRequiredField, got {other}"),
    }
}

#[test]
fn temperature_is_type_checked_when_present() {
    let root = definitions_root();
    let library = DefinitionsDir::new(root.path()).unwrap();
    let err = validate(
        &library,
        json!({
            "/ENTRY[entry]/title": "Run 1",
            "/ENTRY[entry]/sample/temperature": "warm"
        }),
    )
    .unwrap_err();
    assert!(matches!(err, ValidationError::TypeMismatch { .. }));
    assert!(err.to_string().contains("NX_FLOAT"));
}

#[test]
fn empty_optional_branch_excuses_required_leaf() {
    let root = definitions_root();
    let library = DefinitionsDir::new(root.path()).unwrap();
    // instrument/sample is required, but nothing under instrument is given.
    let result = validate(
        &library,
        json!({
            "/ENTRY[entry]/title": "Run 1",
            "/ENTRY[entry]/instrument/sample": null
        }),
    );
    assert!(result.unwrap());
}

#[test]
fn populated_optional_branch_enforces_required_leaf() {
    let root = definitions_root();
    let library = DefinitionsDir::new(root.path()).unwrap();
    let err = validate(
        &library,
        json!({
            "/ENTRY[entry]/title": "Run 1",
            "/ENTRY[entry]/instrument/energy_mode": "fixed"
        }),
    )
    .unwrap_err();
    match err {
        ValidationError::MissingRequiredField { path } => {
            assert_eq!(path, "/ENTRY[entry]/instrument/sample")
        }
        other => panic!("expected MissingRequiredField, got {other}"),
    }
}

#[test]
fn enumeration_placeholder_is_rejected() {
    let root = definitions_root();
    let library = DefinitionsDir::new(root.path()).unwrap();
    let err = validate(
        &library,
        json!({
            "/ENTRY[entry]/title": "Run 1",
            "/ENTRY[entry]/instrument/sample": "Au(111)",
            "/ENTRY[entry]/instrument/energy_mode": "other"
        }),
    )
    .unwrap_err();
    assert!(matches!(err, ValidationError::EnumMismatch { .. }));
}

#[test]
fn only_first_problem_is_reported() {
    let root = definitions_root();
    let library = DefinitionsDir::new(root.path()).unwrap();
    // run_cycle sorts first and fails the range check; the bad timestamp and
    // missing title are never reached.
    let err = validate(
        &library,
        json!({
            "/ENTRY[entry]/run_cycle": 0,
            "/ENTRY[entry]/start_time": "2022-01-22T12:14:12",
            "/ENTRY[entry]/title": null
        }),
    )
    .unwrap_err();
    assert!(matches!(err, ValidationError::Range { .. }));
}

#[test]
fn base_class_defaults_differ_from_application_defaults() {
    let root = definitions_root();
    let library = DefinitionsDir::new(root.path()).unwrap();
    let definition = library.load_definition("NXe2e").unwrap();
    let navigator = SchemaNavigator::new(&definition, &library);

    // Only the NXsample base class declares `name`.
    let inherited = navigator.resolve("/ENTRY/sample/name").unwrap().unwrap();
    assert_eq!(inherited.origin, Origin::BaseClass("NXsample".to_string()));
    assert_eq!(Requiredness::classify(Some(&inherited)), Requiredness::Optional);

    // NXentry declares `title` too, but the definition's override wins.
    let own = navigator.resolve("/ENTRY/title").unwrap().unwrap();
    assert_eq!(own.origin, Origin::ApplicationDefinition);
    assert_eq!(Requiredness::classify(Some(&own)), Requiredness::Required);

    assert_eq!(
        Requiredness::classify(navigator.resolve("/ENTRY/nowhere").unwrap().as_ref()),
        Requiredness::NotInSchema
    );
}

#[test]
fn base_classes_are_parsed_once_per_library() {
    let root = definitions_root();
    let library = DefinitionsDir::new(root.path()).unwrap();
    let definition = library.load_definition("NXe2e").unwrap();
    let navigator = SchemaNavigator::new(&definition, &library);
    for _ in 0..3 {
        navigator.resolve("/ENTRY/experiment_identifier").unwrap().unwrap();
    }
    assert_eq!(library.cached_count(), 1);
    assert!(library.load_base_class("NXentry").unwrap().is_some());
}

#[test]
fn broken_base_class_surfaces_as_schema_error() {
    let root = definitions_root();
    std::fs::write(root.path().join("base_classes/NXentry.nxdl.xml"), "<definition").unwrap();
    let library = DefinitionsDir::new(root.path()).unwrap();
    let definition = library.load_definition("NXe2e").unwrap();
    let schema_template = Template::from_paths(["/ENTRY[entry]/experiment_identifier"]).unwrap();
    let data = Template::from_json(&json!({ "/ENTRY[entry]/experiment_identifier": "p1234" })).unwrap();

    let err = TemplateValidator::new(&definition, &library)
        .validate(&schema_template, &data)
        .unwrap_err();
    match err {
        ValidationError::Schema(SchemaError::SchemaLoad { document, .. }) => {
            assert!(document.contains("NXentry"), "unexpected document {document}");
        }
        other => panic!("expected a schema load error, got {other}"),
    }
}

#[test]
fn ragged_array_fails_type_check_not_load() {
    let root = definitions_root();
    let library = DefinitionsDir::new(root.path()).unwrap();
    let err = validate(
        &library,
        json!({
            "/ENTRY[entry]/title": "Run 1",
            "/ENTRY[entry]/sample/temperature": [[1.5, 2.5], [3.5]]
        }),
    )
    .unwrap_err();
    assert!(matches!(err, ValidationError::TypeMismatch { ref path, .. } if path == "/ENTRY[entry]/sample/temperature"));
}
