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

//! # Field Group Registry Module
//!
//! Parses a field-group export (an array of groups, as produced by the
//! content backend's export tool) into typed [`ZiFieldGroup`]s and indexes
//! them by key. Every field, however deeply nested, is also indexed by its
//! own key so that clones may reference single fields.
//!
//! The registry is built once per export and is read-only afterwards.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{Result, ZiError};
use crate::schema::field::{
    ZiFieldDefinition, ZiFieldKind, ZiLayoutDefinition, ZiScalarKind, PRESENTATION_TYPES,
};

/// A named, ordered list of field definitions.
#[derive(Clone, Debug, PartialEq)]
pub struct ZiFieldGroup {
    pub key: String,
    pub title: String,
    pub fields: Vec<ZiFieldDefinition>,
}

#[derive(Debug, Deserialize)]
struct ZiRawGroup {
    #[serde(default)]
    key: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    fields: Vec<ZiRawField>,
}

#[derive(Debug, Deserialize)]
struct ZiRawField {
    #[serde(default)]
    key: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    label: String,
    #[serde(rename = "type", default)]
    field_type: String,
    #[serde(default)]
    required: Value,
    #[serde(default)]
    default_value: Option<Value>,
    #[serde(default)]
    choices: Option<Value>,
    #[serde(default)]
    sub_fields: Vec<ZiRawField>,
    #[serde(default)]
    layouts: Option<Value>,
    #[serde(default)]
    clone: Option<Value>,
    #[serde(default)]
    prefix_name: Value,
}

#[derive(Debug, Deserialize)]
struct ZiRawLayout {
    #[serde(default)]
    key: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    sub_fields: Vec<ZiRawField>,
}

/// Registry of every field group of one export.
#[derive(Clone, Debug, Default)]
pub struct ZiFieldGroupRegistry {
    groups: IndexMap<String, ZiFieldGroup>,
    fields: HashMap<String, ZiFieldDefinition>,
}

impl ZiFieldGroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from already-typed groups.
    pub fn from_groups(groups: Vec<ZiFieldGroup>) -> Self {
        let mut registry = Self::new();
        for group in groups {
            registry.insert(group);
        }
        registry
    }

    /// Parses an export document: a JSON array of field groups.
    pub fn from_value(value: &Value) -> Result<Self> {
        let entries = value
            .as_array()
            .ok_or_else(|| ZiError::schema("field group export must be an array of field groups"))?;

        let mut registry = Self::new();
        for (position, entry) in entries.iter().enumerate() {
            let raw: ZiRawGroup = serde_json::from_value(entry.clone()).map_err(|err| {
                let key = entry.get("key").and_then(Value::as_str).unwrap_or("<unknown>");
                ZiError::schema(format!(
                    "malformed field group '{}' at position {}: {}",
                    key, position, err
                ))
            })?;
            if raw.key.is_empty() {
                continue;
            }
            let group = convert_group(raw)?;
            registry.insert(group);
        }

        log::debug!(
            "indexed {} field groups and {} fields",
            registry.groups.len(),
            registry.fields.len()
        );
        Ok(registry)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(source)
            .map_err(|err| ZiError::schema(format!("unparseable field group export: {}", err)))?;
        Self::from_value(&value)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(source)
            .map_err(|err| ZiError::schema(format!("unparseable field group export: {}", err)))?;
        let value = serde_json::to_value(yaml)?;
        Self::from_value(&value)
    }

    /// Loads an export file, choosing the parser from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        Self::from_source_for_path(&source, path)
    }

    /// Parses already-read export text in the format implied by `path`.
    pub(crate) fn from_source_for_path(source: &str, path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Self::from_json_str(source),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Self::from_yaml_str(source),
            _ => Err(ZiError::validation(format!(
                "unsupported field group export format: {}",
                path.display()
            ))),
        }
    }

    pub fn insert(&mut self, group: ZiFieldGroup) {
        index_fields(&group.fields, &mut self.fields);
        self.groups.insert(group.key.clone(), group);
    }

    pub fn group(&self, key: &str) -> Option<&ZiFieldGroup> {
        self.groups.get(key)
    }

    pub fn field(&self, key: &str) -> Option<&ZiFieldDefinition> {
        self.fields.get(key)
    }

    pub fn groups(&self) -> impl Iterator<Item = &ZiFieldGroup> {
        self.groups.values()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

fn index_fields(fields: &[ZiFieldDefinition], index: &mut HashMap<String, ZiFieldDefinition>) {
    for field in fields {
        if !field.key.is_empty() {
            index.insert(field.key.clone(), field.clone());
        }
        match &field.kind {
            ZiFieldKind::Group { fields } | ZiFieldKind::Repeater { fields } => {
                index_fields(fields, index)
            }
            ZiFieldKind::Flexible { layouts } => {
                for layout in layouts {
                    index_fields(&layout.fields, index);
                }
            }
            _ => {}
        }
    }
}

fn convert_group(raw: ZiRawGroup) -> Result<ZiFieldGroup> {
    let fields = raw
        .fields
        .into_iter()
        .map(|field| convert_field(field, &raw.key))
        .collect::<Result<Vec<_>>>()?;
    Ok(ZiFieldGroup {
        key: raw.key,
        title: raw.title,
        fields,
    })
}

fn convert_fields(raw: Vec<ZiRawField>, group_key: &str) -> Result<Vec<ZiFieldDefinition>> {
    raw.into_iter()
        .map(|field| convert_field(field, group_key))
        .collect()
}

fn convert_field(raw: ZiRawField, group_key: &str) -> Result<ZiFieldDefinition> {
    let field_type = raw.field_type.clone();
    let kind = match field_type.as_str() {
        "group" => ZiFieldKind::Group {
            fields: convert_fields(raw.sub_fields, group_key)?,
        },
        "repeater" => ZiFieldKind::Repeater {
            fields: convert_fields(raw.sub_fields, group_key)?,
        },
        "flexible_content" => ZiFieldKind::Flexible {
            layouts: convert_layouts(raw.layouts, group_key, &raw.key)?,
        },
        "clone" => ZiFieldKind::Clone {
            targets: clone_targets(raw.clone.as_ref(), group_key, &raw.key)?,
            prefix_name: parse_flag(&raw.prefix_name),
        },
        t if PRESENTATION_TYPES.contains(&t) => ZiFieldKind::Presentation,
        _ => ZiFieldKind::Scalar {
            default: parse_default(raw.default_value, &field_type),
            choices: parse_choices(raw.choices.as_ref()),
        },
    };

    Ok(ZiFieldDefinition {
        key: raw.key,
        name: raw.name,
        label: raw.label,
        field_type,
        required: parse_flag(&raw.required),
        kind,
    })
}

fn convert_layouts(
    raw: Option<Value>,
    group_key: &str,
    field_key: &str,
) -> Result<Vec<ZiLayoutDefinition>> {
    let entries: Vec<(Option<String>, Value)> = match raw {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(map)) => map.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        Some(Value::Array(items)) => items.into_iter().map(|v| (None, v)).collect(),
        Some(_) => {
            return Err(ZiError::schema(format!(
                "layouts of '{}' in group '{}' must be an object or array",
                field_key, group_key
            )))
        }
    };

    entries
        .into_iter()
        .map(|(map_key, value)| {
            let layout: ZiRawLayout = serde_json::from_value(value).map_err(|err| {
                ZiError::schema(format!(
                    "malformed layout of '{}' in group '{}': {}",
                    field_key, group_key, err
                ))
            })?;
            let key = if layout.key.is_empty() {
                map_key.unwrap_or_default()
            } else {
                layout.key
            };
            Ok(ZiLayoutDefinition {
                key,
                name: layout.name,
                label: layout.label,
                fields: convert_fields(layout.sub_fields, group_key)?,
            })
        })
        .collect()
}

fn clone_targets(raw: Option<&Value>, group_key: &str, field_key: &str) -> Result<Vec<String>> {
    match raw {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(target)) => Ok(vec![target.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ZiError::schema(format!(
                        "clone targets of '{}' in group '{}' must be strings",
                        field_key, group_key
                    ))
                })
            })
            .collect(),
        Some(_) => Err(ZiError::schema(format!(
            "clone targets of '{}' in group '{}' must be a list",
            field_key, group_key
        ))),
    }
}

/// Interprets the loose flag encodings found in exports (`1`, `"1"`, `true`).
fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        _ => false,
    }
}

fn parse_default(raw: Option<Value>, field_type: &str) -> Option<Value> {
    let value = raw?;
    match (ZiScalarKind::from_type(field_type), value) {
        (_, Value::Null) => None,
        (ZiScalarKind::Boolean, other) => Some(Value::Bool(parse_flag(&other))),
        (ZiScalarKind::Select, Value::Array(items)) if items.is_empty() => None,
        (_, other) => Some(other),
    }
}

fn parse_choices(raw: Option<&Value>) -> Option<IndexMap<String, String>> {
    let choices: IndexMap<String, String> = match raw? {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| {
                let label = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                (k.clone(), label)
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| (s.to_string(), s.to_string()))
            .collect(),
        _ => return None,
    };
    if choices.is_empty() {
        None
    } else {
        Some(choices)
    }
}
