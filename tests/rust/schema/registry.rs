//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd project team.

use serde_json::json;
use zipress::schema::{ZiFieldGroupRegistry, ZiFieldKind};
use zipress::ZiError;

const EXPORT: &str = include_str!("../../fixtures/acf_export.json");

#[test]
fn test_registry_indexes_groups_and_nested_fields() {
    let registry = ZiFieldGroupRegistry::from_json_str(EXPORT).unwrap();

    assert_eq!(registry.group_count(), 5);
    assert_eq!(registry.group("group_6104225bab52f").unwrap().title, "Page Sections");

    let text = registry.field("field_6104217816977").unwrap();
    assert_eq!(text.name, "text");
    let desktop = registry.field("field_611278c0063b5").unwrap();
    assert_eq!(desktop.effective_default(), Some(json!("inherit")));
    // Layout children are indexed too.
    assert!(registry.field("field_6104227ef0b47").unwrap().is_clone());
}

#[test]
fn test_registry_parses_defaults_and_flags() {
    let registry = ZiFieldGroupRegistry::from_json_str(EXPORT).unwrap();

    let toc = registry.field("field_common_toc_exclude").unwrap();
    assert_eq!(toc.effective_default(), Some(json!(false)));

    let section_id = registry.field("field_common_section_id").unwrap();
    assert_eq!(section_id.effective_default(), Some(json!("")));

    let content = registry.field("field_611e64259a296").unwrap();
    assert!(content.required);
    assert_eq!(content.effective_default(), None);

    let level = registry.field("field_6104217f16978").unwrap();
    match &level.kind {
        ZiFieldKind::Scalar { choices: Some(choices), .. } => {
            assert_eq!(choices.len(), 6);
            assert_eq!(choices.get("h1").map(String::as_str), Some("H1"));
        }
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_registry_marks_presentation_fields() {
    let registry = ZiFieldGroupRegistry::from_json_str(EXPORT).unwrap();
    assert!(registry.field("field_610421312f001").unwrap().is_presentation());
    assert!(registry.field("field_common_tab").unwrap().is_presentation());
}

#[test]
fn test_registry_reads_layouts_from_object_and_array() {
    let registry = ZiFieldGroupRegistry::from_json_str(EXPORT).unwrap();
    match &registry.field("field_61042266f0b46").unwrap().kind {
        ZiFieldKind::Flexible { layouts } => {
            let names: Vec<&str> = layouts.iter().map(|l| l.name.as_str()).collect();
            assert_eq!(names, vec!["BasicContent", "AccordionSection"]);
        }
        other => panic!("unexpected kind {:?}", other),
    }

    let registry = ZiFieldGroupRegistry::from_value(&json!([{
        "key": "group_a",
        "title": "A",
        "fields": [{
            "key": "field_flex",
            "name": "rows",
            "type": "flexible_content",
            "layouts": [{"name": "Hero", "sub_fields": []}]
        }]
    }]))
    .unwrap();
    match &registry.field("field_flex").unwrap().kind {
        ZiFieldKind::Flexible { layouts } => assert_eq!(layouts[0].name, "Hero"),
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_registry_skips_groups_without_key() {
    let registry = ZiFieldGroupRegistry::from_value(&json!([
        {"title": "Orphan", "fields": []},
        {"key": "group_b", "title": "B", "fields": []}
    ]))
    .unwrap();
    assert_eq!(registry.group_count(), 1);
    assert!(registry.group("group_b").is_some());
}

#[test]
fn test_registry_rejects_malformed_exports() {
    let err = ZiFieldGroupRegistry::from_json_str("{\"key\": \"group_a\"}").unwrap_err();
    assert!(matches!(err, ZiError::Schema { .. }));

    let err = ZiFieldGroupRegistry::from_json_str("[{").unwrap_err();
    assert!(err.to_string().contains("unparseable field group export"));

    let err = ZiFieldGroupRegistry::from_value(&json!([
        {"key": "group_bad", "fields": "not a list"}
    ]))
    .unwrap_err();
    assert!(err.to_string().contains("group_bad"));
}

#[test]
fn test_registry_from_path_picks_format_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("export.json");
    std::fs::write(&json_path, EXPORT).unwrap();
    assert_eq!(ZiFieldGroupRegistry::from_path(&json_path).unwrap().group_count(), 5);

    let txt_path = dir.path().join("export.txt");
    std::fs::write(&txt_path, EXPORT).unwrap();
    let err = ZiFieldGroupRegistry::from_path(&txt_path).unwrap_err();
    assert!(matches!(err, ZiError::Validation { .. }));
}

#[cfg(feature = "yaml")]
#[test]
fn test_registry_from_yaml() {
    let source = r#"
- key: group_yaml
  title: Yaml Group
  fields:
    - key: field_y
      name: title
      type: text
      required: "1"
"#;
    let registry = ZiFieldGroupRegistry::from_yaml_str(source).unwrap();
    assert!(registry.field("field_y").unwrap().required);
}
