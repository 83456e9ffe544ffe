//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd project team.

use serde_json::{json, Value};
use zipress::schema::{ZiFieldDefinition, ZiFieldKind, ZiLayoutDefinition};
use zipress::{
    ZiFieldGroupRegistry, ZiFieldTreeBuilder, ZiKeyStyle, ZiLayoutExtractor, ZiLayoutSchemaMap,
    ZiSection, ZiSectionNormalizer, ZiTransformConfig, ZiTransformWarning, ZiTransformer,
};

const EXPORT: &str = include_str!("../fixtures/acf_export.json");

fn fixture_map() -> ZiLayoutSchemaMap {
    let registry = ZiFieldGroupRegistry::from_json_str(EXPORT).unwrap();
    let schema = ZiFieldTreeBuilder::new(&registry)
        .build_group("group_6104225bab52f")
        .unwrap();
    ZiLayoutExtractor::extract(&schema).unwrap()
}

fn sections(values: Vec<Value>) -> Vec<ZiSection> {
    let raw = values
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();
    ZiSectionNormalizer::default().normalize(raw)
}

fn messages(warnings: &[ZiTransformWarning]) -> Vec<String> {
    warnings.iter().map(ToString::to_string).collect()
}

#[test]
fn test_basic_content_is_fully_defaulted() {
    let map = fixture_map();
    let config = ZiTransformConfig::default();
    let input = sections(vec![json!({
        "layout": "BasicContent",
        "heading": "Title",
        "heading_level": "h1",
        "content": "<p>x</p>"
    })]);

    let outcome = ZiTransformer::new(&map, &config).transform(&input);

    assert!(outcome.warnings.is_empty());
    assert_eq!(
        outcome.sections,
        vec![json!({
            "acf_fc_layout": "BasicContent",
            "heading": {
                "text": "Title",
                "level": "h1",
                "alignment": {"desktop": "inherit", "mobile": "inherit"}
            },
            "content": "<p>x</p>",
            "section_id": "",
            "padding_override": "reduced-padding",
            "section_width": "narrow",
            "toc_exclude": false,
            "background_color": ""
        })]
    );
}

#[test]
fn test_unknown_layout_passes_through_with_one_warning() {
    let map = fixture_map();
    let config = ZiTransformConfig::default();
    let input = sections(vec![json!({"layout": "NoSuch", "heading": "Hi"})]);

    let outcome = ZiTransformer::new(&map, &config).transform(&input);

    assert_eq!(outcome.sections, vec![input[0].clone().into_value()]);
    assert_eq!(messages(&outcome.warnings), vec!["unknown layout: NoSuch"]);
}

#[test]
fn test_empty_section_gets_every_default() {
    let map = fixture_map();
    let config = ZiTransformConfig::default();
    let input = sections(vec![json!({"acf_fc_layout": "BasicContent"})]);

    let outcome = ZiTransformer::new(&map, &config).transform(&input);
    let section = outcome.sections[0].as_object().unwrap();

    // Six defaulted fields plus the discriminator; `content` has no default.
    assert_eq!(section.len(), 7);
    assert_eq!(
        section["heading"],
        json!({"text": "", "level": "h2", "alignment": {"desktop": "inherit", "mobile": "inherit"}})
    );
    assert!(!section.contains_key("content"));
    assert_eq!(
        messages(&outcome.warnings),
        vec!["missing required field: BasicContent.content"]
    );
}

#[test]
fn test_missing_discriminator_is_reported_by_index() {
    let map = fixture_map();
    let config = ZiTransformConfig::default();
    let input = sections(vec![
        json!({"acf_fc_layout": "BasicContent", "content": "c"}),
        json!({"content": "orphan"}),
    ]);

    let outcome = ZiTransformer::new(&map, &config).transform(&input);

    assert_eq!(outcome.sections[1], json!({"content": "orphan"}));
    assert_eq!(messages(&outcome.warnings), vec!["missing layout: section 1"]);
}

#[test]
fn test_field_order_is_schema_then_pass_through() {
    let map = fixture_map();
    let config = ZiTransformConfig::default();
    let input = sections(vec![json!({
        "extra": 1,
        "heading": {"note": "kept", "text": "T"},
        "content": "c",
        "acf_fc_layout": "BasicContent"
    })]);

    let outcome = ZiTransformer::new(&map, &config).transform(&input);
    let section = outcome.sections[0].as_object().unwrap();

    let keys: Vec<&str> = section.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "acf_fc_layout",
            "heading",
            "content",
            "section_id",
            "padding_override",
            "section_width",
            "toc_exclude",
            "background_color",
            "extra"
        ]
    );
    let heading: Vec<&str> = section["heading"].as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(heading, vec!["text", "level", "alignment", "note"]);
}

#[test]
fn test_repeater_rows_are_merged() {
    let map = fixture_map();
    let config = ZiTransformConfig::default();
    let input = sections(vec![json!({
        "acf_fc_layout": "AccordionSection",
        "heading": "FAQ",
        "accordions": [{"title": "Q1"}, {"content": "A2"}, "loose"]
    })]);

    let outcome = ZiTransformer::new(&map, &config).transform(&input);

    assert_eq!(
        outcome.sections[0]["accordions"],
        json!([{"title": "Q1", "content": ""}, {"content": "A2"}, "loose"])
    );
    assert_eq!(
        messages(&outcome.warnings),
        vec!["missing required field: AccordionSection.accordions.title"]
    );
}

#[test]
fn test_nested_flexible_rows_merge_against_their_layout() {
    let card = ZiLayoutDefinition {
        key: "layout_card".into(),
        name: "Card".into(),
        label: "Card".into(),
        fields: vec![ZiFieldDefinition::scalar("field_card_title", "title", "text").with_default(json!("Untitled"))],
    };
    let mut cards = ZiFieldDefinition::scalar("field_cards", "cards", "flexible_content");
    cards.kind = ZiFieldKind::Flexible { layouts: vec![card] };
    let grid = ZiLayoutDefinition {
        key: "layout_grid".into(),
        name: "Grid".into(),
        label: "Grid".into(),
        fields: vec![cards],
    };
    let mut area = ZiFieldDefinition::scalar("field_area", "page_sections", "flexible_content");
    area.kind = ZiFieldKind::Flexible { layouts: vec![grid] };
    let map = ZiLayoutSchemaMap::from_flexible(&area).unwrap();
    let config = ZiTransformConfig::default();

    let input = sections(vec![json!({
        "acf_fc_layout": "Grid",
        "cards": [{"acf_fc_layout": "Card"}, {"acf_fc_layout": "Ghost", "x": 1}]
    })]);
    let outcome = ZiTransformer::new(&map, &config).transform(&input);

    assert_eq!(
        outcome.sections[0]["cards"],
        json!([{"acf_fc_layout": "Card", "title": "Untitled"}, {"acf_fc_layout": "Ghost", "x": 1}])
    );
    assert_eq!(messages(&outcome.warnings), vec!["unknown layout: Ghost"]);
}

#[test]
fn test_field_key_style_addresses_backend_keys() {
    let map = fixture_map();
    let config = ZiTransformConfig::new().key_style(ZiKeyStyle::FieldKeys);
    let input = sections(vec![
        json!({"layout": "BasicContent", "heading": "Title", "content": "c", "note": "n"}),
        json!({"layout": "AccordionSection", "accordions": [{"title": "Q"}]}),
    ]);

    let transformer = ZiTransformer::new(&map, &config);
    assert_eq!(transformer.content_area_key(), "field_61042266f0b46");
    let outcome = transformer.transform(&input);

    let basic = outcome.sections[0].as_object().unwrap();
    assert_eq!(basic["acf_fc_layout"], json!("BasicContent"));
    assert_eq!(
        basic["field_6104227ef0b47_field_611e64259a1e0_field_6104217816977"],
        json!("Title")
    );
    assert_eq!(
        basic["field_6104227ef0b47_field_611e64259a1e0_field_611278c0063b5"],
        json!("inherit")
    );
    assert_eq!(basic["field_6104227ef0b47_field_611e64259a296"], json!("c"));
    assert_eq!(basic["note"], json!("n"));
    assert!(!basic.contains_key("heading"));

    let accordion = outcome.sections[1].as_object().unwrap();
    assert_eq!(
        accordion["accordions"],
        json!([{
            "field_635beb487caf7_field_635beb3c4e003": "Q",
            "field_635beb487caf7_field_635beb3c4e004": ""
        }])
    );
}

#[test]
fn test_field_key_style_keeps_group_extras_under_dotted_path() {
    let map = fixture_map();
    let config = ZiTransformConfig::new().key_style(ZiKeyStyle::FieldKeys);
    let input = sections(vec![json!({
        "layout": "BasicContent",
        "heading": {"text": "T", "note": "inner"},
        "content": "c",
        "note": "outer"
    })]);

    let outcome = ZiTransformer::new(&map, &config).transform(&input);
    let basic = outcome.sections[0].as_object().unwrap();
    assert_eq!(basic["heading.note"], json!("inner"));
    assert_eq!(basic["note"], json!("outer"));
    assert_eq!(
        basic["field_6104227ef0b47_field_611e64259a1e0_field_6104217816977"],
        json!("T")
    );
}
