//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Transformer Module
//!
//! Merges canonical sections against their layout schemas.
//!
//! ## Merge Rules
//!
//! For each section of a known layout:
//!
//! 1. The discriminator is emitted first.
//! 2. Schema fields follow in schema order. Omitted fields take their
//!    effective default; groups given as objects merge recursively, so a
//!    partial group still receives its defaulted children.
//! 3. Fields the schema does not declare follow in input order, untouched.
//!
//! Repeater rows merge against the repeater children, and rows of nested
//! flexible fields merge against their own layout.
//!
//! ## Warnings
//!
//! Transformation never fails on data shape. Unknown layouts, missing
//! discriminators and required fields with no default are reported as
//! [`ZiTransformWarning`] values next to the output.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{ZiKeyStyle, ZiTransformConfig};
use crate::schema::field::{join_path, ZiFieldDefinition, ZiFieldKind, ZiLayoutDefinition};
use crate::schema::layout::{ZiLayoutMatch, ZiLayoutSchemaMap};
use crate::section::ZiSection;

/// Advisory condition found while transforming or linting sections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZiTransformWarning {
    UnknownLayout { layout: String },
    MissingRequiredField { layout: String, path: String },
    MissingLayout { index: usize },
    UnknownField { layout: String, path: String },
    InvalidChoice { layout: String, path: String },
}

impl fmt::Display for ZiTransformWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZiTransformWarning::UnknownLayout { layout } => write!(f, "unknown layout: {}", layout),
            ZiTransformWarning::MissingRequiredField { layout, path } => {
                write!(f, "missing required field: {}.{}", layout, path)
            }
            ZiTransformWarning::MissingLayout { index } => write!(f, "missing layout: section {}", index),
            ZiTransformWarning::UnknownField { layout, path } => {
                write!(f, "unknown field: {}.{}", layout, path)
            }
            ZiTransformWarning::InvalidChoice { layout, path } => {
                write!(f, "invalid choice: {}.{}", layout, path)
            }
        }
    }
}

/// Transformed sections with the warnings they produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZiTransformOutcome {
    pub sections: Vec<Value>,
    pub warnings: Vec<ZiTransformWarning>,
}

impl ZiTransformOutcome {
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug)]
pub struct ZiTransformer<'a> {
    schema: &'a ZiLayoutSchemaMap,
    config: &'a ZiTransformConfig,
}

impl<'a> ZiTransformer<'a> {
    pub fn new(schema: &'a ZiLayoutSchemaMap, config: &'a ZiTransformConfig) -> Self {
        Self { schema, config }
    }

    /// Key under which the content area is written into the payload.
    pub fn content_area_key(&self) -> &'a str {
        match self.config.key_style {
            ZiKeyStyle::FieldNames => &self.schema.content_area,
            ZiKeyStyle::FieldKeys => &self.schema.content_area_key,
        }
    }

    pub fn transform(&self, sections: &[ZiSection]) -> ZiTransformOutcome {
        let mut outcome = ZiTransformOutcome {
            sections: Vec::with_capacity(sections.len()),
            warnings: Vec::new(),
        };
        for (index, section) in sections.iter().enumerate() {
            let value = self.transform_section(index, section, &mut outcome.warnings);
            outcome.sections.push(value);
        }
        log::debug!(
            "transformed {} sections with {} warnings",
            outcome.sections.len(),
            outcome.warnings.len()
        );
        outcome
    }

    fn transform_section(
        &self,
        index: usize,
        section: &ZiSection,
        warnings: &mut Vec<ZiTransformWarning>,
    ) -> Value {
        let discriminator = self.config.discriminator_key.as_str();
        match self.schema.classify(section.fields(), discriminator) {
            ZiLayoutMatch::Missing => {
                warnings.push(ZiTransformWarning::MissingLayout { index });
                Value::Object(section.fields().clone())
            }
            ZiLayoutMatch::Unknown(layout) => {
                warnings.push(ZiTransformWarning::UnknownLayout {
                    layout: layout.to_string(),
                });
                Value::Object(section.fields().clone())
            }
            ZiLayoutMatch::Known(layout) => {
                let mut out = Map::new();
                out.insert(discriminator.to_string(), Value::String(layout.name.clone()));
                self.merge_into(&layout.fields, section.fields(), &layout.name, "", &mut out, warnings);
                match self.config.key_style {
                    ZiKeyStyle::FieldNames => Value::Object(out),
                    ZiKeyStyle::FieldKeys => Value::Object(self.keyed_by_field_key(&layout.fields, &out, "")),
                }
            }
        }
    }

    /// Appends schema fields then pass-through fields of `input` to `out`.
    fn merge_into(
        &self,
        fields: &[ZiFieldDefinition],
        input: &Map<String, Value>,
        layout: &str,
        prefix: &str,
        out: &mut Map<String, Value>,
        warnings: &mut Vec<ZiTransformWarning>,
    ) {
        for field in fields {
            let path = join_path(prefix, &field.name);
            match input.get(&field.name) {
                Some(value) => {
                    let merged = self.merge_value(field, value, layout, &path, warnings);
                    out.insert(field.name.clone(), merged);
                }
                None => {
                    if let Some(filled) = self.fill_missing(field, layout, &path, warnings) {
                        out.insert(field.name.clone(), filled);
                    }
                }
            }
        }
        for (key, value) in input {
            if !out.contains_key(key) {
                out.insert(key.clone(), value.clone());
            }
        }
    }

    fn merge_value(
        &self,
        field: &ZiFieldDefinition,
        value: &Value,
        layout: &str,
        path: &str,
        warnings: &mut Vec<ZiTransformWarning>,
    ) -> Value {
        match (&field.kind, value) {
            (ZiFieldKind::Group { fields }, Value::Object(map)) => {
                let mut out = Map::new();
                self.merge_into(fields, map, layout, path, &mut out, warnings);
                Value::Object(out)
            }
            (ZiFieldKind::Repeater { fields }, Value::Array(rows)) => Value::Array(
                rows.iter()
                    .map(|row| match row {
                        Value::Object(map) => {
                            let mut out = Map::new();
                            self.merge_into(fields, map, layout, path, &mut out, warnings);
                            Value::Object(out)
                        }
                        other => other.clone(),
                    })
                    .collect(),
            ),
            (ZiFieldKind::Flexible { layouts }, Value::Array(rows)) => Value::Array(
                rows.iter()
                    .map(|row| match row {
                        Value::Object(map) => self.merge_nested_row(layouts, map, warnings),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            _ => value.clone(),
        }
    }

    fn merge_nested_row(
        &self,
        layouts: &[ZiLayoutDefinition],
        row: &Map<String, Value>,
        warnings: &mut Vec<ZiTransformWarning>,
    ) -> Value {
        let discriminator = self.config.discriminator_key.as_str();
        let name = match row.get(discriminator).and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name,
            _ => return Value::Object(row.clone()),
        };
        match layouts.iter().find(|layout| layout.name == name) {
            Some(layout) => {
                let mut out = Map::new();
                out.insert(discriminator.to_string(), Value::String(layout.name.clone()));
                self.merge_into(&layout.fields, row, &layout.name, "", &mut out, warnings);
                Value::Object(out)
            }
            None => {
                warnings.push(ZiTransformWarning::UnknownLayout {
                    layout: name.to_string(),
                });
                Value::Object(row.clone())
            }
        }
    }

    /// Value for a field the input omits, warning when a required field
    /// has nothing to fall back on.
    fn fill_missing(
        &self,
        field: &ZiFieldDefinition,
        layout: &str,
        path: &str,
        warnings: &mut Vec<ZiTransformWarning>,
    ) -> Option<Value> {
        let filled = match &field.kind {
            ZiFieldKind::Group { fields } => {
                let mut out = Map::new();
                for child in fields {
                    let child_path = join_path(path, &child.name);
                    if let Some(value) = self.fill_missing(child, layout, &child_path, warnings) {
                        out.insert(child.name.clone(), value);
                    }
                }
                if out.is_empty() {
                    None
                } else {
                    Some(Value::Object(out))
                }
            }
            _ => field.effective_default(),
        };
        if filled.is_none() && field.required {
            warnings.push(ZiTransformWarning::MissingRequiredField {
                layout: layout.to_string(),
                path: path.to_string(),
            });
        }
        filled
    }

    /// Rewrites a merged section so schema fields are addressed by their
    /// backend keys. Groups flatten into their parent; repeaters keep
    /// their name. Pass-through fields keep their name, prefixed with the
    /// dotted path of the group they were found in.
    fn keyed_by_field_key(
        &self,
        fields: &[ZiFieldDefinition],
        merged: &Map<String, Value>,
        prefix: &str,
    ) -> Map<String, Value> {
        let mut out = Map::new();
        let mut consumed = Vec::new();
        if prefix.is_empty() {
            if let Some(value) = merged.get(&self.config.discriminator_key) {
                out.insert(self.config.discriminator_key.clone(), value.clone());
                consumed.push(self.config.discriminator_key.as_str());
            }
        }
        for field in fields {
            let value = match merged.get(&field.name) {
                Some(value) => value,
                None => continue,
            };
            consumed.push(field.name.as_str());
            match (&field.kind, value) {
                (ZiFieldKind::Group { fields }, Value::Object(map)) => {
                    let path = join_path(prefix, &field.name);
                    out.extend(self.keyed_by_field_key(fields, map, &path));
                }
                (ZiFieldKind::Repeater { fields }, Value::Array(rows)) => {
                    let rows = rows
                        .iter()
                        .map(|row| match row {
                            Value::Object(map) => Value::Object(self.keyed_by_field_key(fields, map, "")),
                            other => other.clone(),
                        })
                        .collect();
                    out.insert(field.name.clone(), Value::Array(rows));
                }
                (ZiFieldKind::Flexible { layouts }, Value::Array(rows)) => {
                    let rows = rows
                        .iter()
                        .map(|row| self.keyed_nested_row(layouts, row))
                        .collect();
                    out.insert(field.key.clone(), Value::Array(rows));
                }
                _ => {
                    out.insert(field.key.clone(), value.clone());
                }
            }
        }
        for (key, value) in merged {
            if consumed.contains(&key.as_str()) {
                continue;
            }
            let path = join_path(prefix, key);
            if !out.contains_key(&path) {
                out.insert(path, value.clone());
            }
        }
        out
    }

    fn keyed_nested_row(&self, layouts: &[ZiLayoutDefinition], row: &Value) -> Value {
        let map = match row {
            Value::Object(map) => map,
            other => return other.clone(),
        };
        let name = map.get(&self.config.discriminator_key).and_then(Value::as_str);
        match layouts.iter().find(|layout| Some(layout.name.as_str()) == name) {
            Some(layout) => Value::Object(self.keyed_by_field_key(&layout.fields, map, "")),
            None => row.clone(),
        }
    }
}
