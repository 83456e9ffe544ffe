//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd project team.

use serde_json::{json, Map, Value};
use zipress::schema::{
    ZiFieldDefinition, ZiFieldGroupRegistry, ZiFieldKind, ZiFieldTreeBuilder, ZiLayoutDefinition,
    ZiLayoutExtractor, ZiLayoutMatch, ZiLayoutSchemaMap, ZiResolvedFieldSchema,
};
use zipress::ZiError;

const EXPORT: &str = include_str!("../../fixtures/acf_export.json");

fn fixture_map() -> ZiLayoutSchemaMap {
    let registry = ZiFieldGroupRegistry::from_json_str(EXPORT).unwrap();
    let schema = ZiFieldTreeBuilder::new(&registry)
        .build_group("group_6104225bab52f")
        .unwrap();
    ZiLayoutExtractor::extract(&schema).unwrap()
}

fn flexible(key: &str, name: &str, layouts: Vec<ZiLayoutDefinition>) -> ZiFieldDefinition {
    let mut field = ZiFieldDefinition::scalar(key, name, "flexible_content");
    field.kind = ZiFieldKind::Flexible { layouts };
    field
}

fn layout(name: &str, fields: Vec<ZiFieldDefinition>) -> ZiLayoutDefinition {
    ZiLayoutDefinition {
        key: format!("layout_{}", name.to_lowercase()),
        name: name.to_string(),
        label: name.to_string(),
        fields,
    }
}

fn section(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_extract_fixture_layouts() {
    let map = fixture_map();

    assert_eq!(map.content_area, "page_sections");
    assert_eq!(map.content_area_key, "field_61042266f0b46");
    assert_eq!(map.layout_names(), vec!["BasicContent", "AccordionSection"]);

    let basic = map.get("BasicContent").unwrap();
    assert_eq!(basic.key, "layout_6104226d4285a");
    assert!(basic.is_required("content"));
    assert!(!basic.is_required("heading.text"));
    assert!(map.get("AccordionSection").unwrap().is_required("accordions.title"));
}

#[test]
fn test_duplicate_layout_names_are_rejected() {
    let schema = ZiResolvedFieldSchema::new(vec![flexible(
        "field_rows",
        "rows",
        vec![layout("Hero", vec![]), layout("Hero", vec![])],
    )]);

    match ZiLayoutExtractor::extract(&schema).unwrap_err() {
        ZiError::DuplicateLayout { content_area, layout } => {
            assert_eq!(content_area, "rows");
            assert_eq!(layout, "Hero");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_duplicates_in_nested_flexible_are_rejected() {
    let nested = flexible(
        "field_inner",
        "inner",
        vec![layout("Card", vec![]), layout("Card", vec![])],
    );
    let schema = ZiResolvedFieldSchema::new(vec![flexible(
        "field_rows",
        "rows",
        vec![layout("Grid", vec![nested])],
    )]);

    let err = ZiLayoutExtractor::extract(&schema).unwrap_err();
    assert!(matches!(err, ZiError::DuplicateLayout { ref content_area, .. } if content_area == "inner"));
}

#[test]
fn test_no_flexible_field_is_schema_error() {
    let schema = ZiResolvedFieldSchema::new(vec![ZiFieldDefinition::scalar("field_t", "title", "text")]);
    let err = ZiLayoutExtractor::extract(&schema).unwrap_err();
    assert!(matches!(err, ZiError::Schema { .. }));
}

#[test]
fn test_extract_named_selects_by_name_or_key() {
    let schema = ZiResolvedFieldSchema::new(vec![
        flexible("field_first", "hero_rows", vec![layout("Hero", vec![])]),
        flexible("field_second", "page_sections", vec![layout("BasicContent", vec![])]),
    ]);

    assert_eq!(ZiLayoutExtractor::extract(&schema).unwrap().content_area, "hero_rows");
    let by_name = ZiLayoutExtractor::extract_named(&schema, "page_sections").unwrap();
    assert!(by_name.has_layout("BasicContent"));
    let by_key = ZiLayoutExtractor::extract_with(&schema, Some("field_second")).unwrap();
    assert_eq!(by_key.content_area, "page_sections");
    assert!(ZiLayoutExtractor::extract_named(&schema, "missing").is_err());
}

#[test]
fn test_classify_sections() {
    let map = fixture_map();

    let known = section(json!({"acf_fc_layout": "BasicContent"}));
    assert!(matches!(
        map.classify(&known, "acf_fc_layout"),
        ZiLayoutMatch::Known(schema) if schema.name == "BasicContent"
    ));

    let unknown = section(json!({"acf_fc_layout": "NoSuch"}));
    assert_eq!(map.classify(&unknown, "acf_fc_layout"), ZiLayoutMatch::Unknown("NoSuch"));

    for missing in [json!({}), json!({"acf_fc_layout": ""}), json!({"acf_fc_layout": 3})] {
        let missing = section(missing);
        assert_eq!(map.classify(&missing, "acf_fc_layout"), ZiLayoutMatch::Missing);
    }
}

#[test]
fn test_summary_lists_layouts_and_required_paths() {
    let summary = fixture_map().to_string();
    assert!(summary.contains("Content area: page_sections (field_61042266f0b46)"));
    assert!(summary.contains("Total layouts: 2"));
    assert!(summary.contains("    content *"));
    assert!(summary.contains("    heading.alignment.desktop\n"));
    // Layouts are listed alphabetically.
    let accordion = summary.find("AccordionSection").unwrap();
    let basic = summary.find("BasicContent").unwrap();
    assert!(accordion < basic);
}

#[test]
fn test_schema_map_survives_json_storage() {
    let map = fixture_map().with_source_digest("abc123");
    let restored = ZiLayoutSchemaMap::from_json_str(&map.to_json_string().unwrap()).unwrap();
    assert_eq!(restored, map);
}
