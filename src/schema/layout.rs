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

//! # Layout Extractor Module
//!
//! A content area is a flexible field: each of its rows picks one named
//! layout, and each layout has its own field schema. The extractor finds
//! the content-area field in a resolved schema and produces a
//! [`ZiLayoutSchemaMap`] from layout name to that layout's fields and
//! required paths.
//!
//! Layout names must be unique. A duplicate is a configuration error and is
//! reported as [`ZiError::DuplicateLayout`] instead of being overwritten.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, ZiError};
use crate::schema::builder::ZiResolvedFieldSchema;
use crate::schema::field::{join_path, ZiFieldDefinition, ZiFieldKind, ZiLayoutDefinition};

/// Resolved schema of one layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiLayoutSchema {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub label: String,
    pub fields: Vec<ZiFieldDefinition>,
    /// Dotted paths of every field marked required.
    #[serde(default)]
    pub required: BTreeSet<String>,
}

impl ZiLayoutSchema {
    pub fn from_definition(layout: &ZiLayoutDefinition) -> Self {
        let mut required = BTreeSet::new();
        collect_required(&layout.fields, "", &mut required);
        ZiLayoutSchema {
            name: layout.name.clone(),
            key: layout.key.clone(),
            label: layout.label.clone(),
            fields: layout.fields.clone(),
            required,
        }
    }

    pub fn is_required(&self, path: &str) -> bool {
        self.required.contains(path)
    }

    pub fn field(&self, name: &str) -> Option<&ZiFieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn collect_required(fields: &[ZiFieldDefinition], prefix: &str, out: &mut BTreeSet<String>) {
    for field in fields {
        let path = join_path(prefix, &field.name);
        if field.required {
            out.insert(path.clone());
        }
        if let Some(children) = field.children() {
            collect_required(children, &path, out);
        }
    }
}

/// How a section's discriminator relates to a layout schema map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZiLayoutMatch<'a> {
    Known(&'a ZiLayoutSchema),
    Unknown(&'a str),
    /// The section carries no usable discriminator.
    Missing,
}

/// Layout name to layout schema for one content area.
///
/// Stored maps are read back through [`ZiLayoutSchemaMap::from_json_str`]
/// and [`ZiLayoutSchemaMap::from_yaml_str`], which apply the same rules as
/// extraction: unique layout names, each keyed by its own name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ZiLayoutSchemaMap {
    /// Name of the content-area field (`page_sections`).
    pub content_area: String,
    /// Backend key of the content-area field.
    pub content_area_key: String,
    pub layouts: IndexMap<String, ZiLayoutSchema>,
    /// BLAKE3 digest of the source the map was built from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_digest: Option<String>,
}

impl ZiLayoutSchemaMap {
    /// Builds the map for one flexible field, rejecting duplicate names.
    pub fn from_flexible(field: &ZiFieldDefinition) -> Result<Self> {
        let layouts = match &field.kind {
            ZiFieldKind::Flexible { layouts } => layouts,
            _ => {
                return Err(ZiError::schema(format!(
                    "field '{}' is not a flexible content field",
                    field.name
                )))
            }
        };

        let mut map = IndexMap::with_capacity(layouts.len());
        for layout in layouts {
            if map.contains_key(&layout.name) {
                return Err(ZiError::duplicate_layout(&field.name, &layout.name));
            }
            check_nested_flexible(&layout.fields)?;
            map.insert(layout.name.clone(), ZiLayoutSchema::from_definition(layout));
        }

        Ok(ZiLayoutSchemaMap {
            content_area: field.name.clone(),
            content_area_key: field.key.clone(),
            layouts: map,
            source_digest: None,
        })
    }

    pub fn with_source_digest(mut self, digest: impl Into<String>) -> Self {
        self.source_digest = Some(digest.into());
        self
    }

    pub fn get(&self, layout: &str) -> Option<&ZiLayoutSchema> {
        self.layouts.get(layout)
    }

    pub fn has_layout(&self, layout: &str) -> bool {
        self.layouts.contains_key(layout)
    }

    pub fn layout_names(&self) -> Vec<&str> {
        self.layouts.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Classifies a section by the string value under `discriminator`.
    pub fn classify<'a>(
        &'a self,
        section: &'a Map<String, Value>,
        discriminator: &str,
    ) -> ZiLayoutMatch<'a> {
        match section.get(discriminator).and_then(Value::as_str) {
            None | Some("") => ZiLayoutMatch::Missing,
            Some(name) => match self.layouts.get(name) {
                Some(schema) => ZiLayoutMatch::Known(schema),
                None => ZiLayoutMatch::Unknown(name),
            },
        }
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let stored: ZiStoredSchemaMap = serde_yaml::from_str(source)?;
        stored.into_map()
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let stored: ZiStoredSchemaMap = serde_json::from_str(source)?;
        stored.into_map()
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// On-disk form of a schema map. Layout entries keep every key as read so
/// duplicates can be reported.
#[derive(Deserialize)]
struct ZiStoredSchemaMap {
    content_area: String,
    content_area_key: String,
    #[serde(deserialize_with = "layout_entries")]
    layouts: Vec<(String, ZiLayoutSchema)>,
    #[serde(default)]
    source_digest: Option<String>,
}

impl ZiStoredSchemaMap {
    fn into_map(self) -> Result<ZiLayoutSchemaMap> {
        let mut layouts = IndexMap::with_capacity(self.layouts.len());
        for (name, layout) in self.layouts {
            if layouts.contains_key(&name) {
                return Err(ZiError::duplicate_layout(&self.content_area, &name));
            }
            if layout.name != name {
                return Err(ZiError::schema(format!(
                    "layout '{}' is stored under name '{}'",
                    layout.name, name
                )));
            }
            check_nested_flexible(&layout.fields)?;
            layouts.insert(name, layout);
        }
        Ok(ZiLayoutSchemaMap {
            content_area: self.content_area,
            content_area_key: self.content_area_key,
            layouts,
            source_digest: self.source_digest,
        })
    }
}

fn layout_entries<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, ZiLayoutSchema)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, ZiLayoutSchema)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of layout name to layout schema")
        }

        fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry::<String, ZiLayoutSchema>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

fn check_nested_flexible(fields: &[ZiFieldDefinition]) -> Result<()> {
    for field in fields {
        match &field.kind {
            ZiFieldKind::Flexible { .. } => {
                ZiLayoutSchemaMap::from_flexible(field)?;
            }
            ZiFieldKind::Group { fields } | ZiFieldKind::Repeater { fields } => {
                check_nested_flexible(fields)?
            }
            _ => {}
        }
    }
    Ok(())
}

impl fmt::Display for ZiLayoutSchemaMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Content area: {} ({})", self.content_area, self.content_area_key)?;
        writeln!(f, "Total layouts: {}", self.layouts.len())?;
        let mut layouts: Vec<&ZiLayoutSchema> = self.layouts.values().collect();
        layouts.sort_by(|a, b| a.name.cmp(&b.name));
        for layout in layouts {
            writeln!(f)?;
            writeln!(f, "  {}  ({})", layout.name, layout.key)?;
            let schema = ZiResolvedFieldSchema::new(layout.fields.clone());
            for path in schema.leaf_paths() {
                let marker = if layout.is_required(&path) { " *" } else { "" };
                writeln!(f, "    {}{}", path, marker)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ZiLayoutExtractor;

impl ZiLayoutExtractor {
    /// Extracts the first flexible field found depth-first.
    pub fn extract(schema: &ZiResolvedFieldSchema) -> Result<ZiLayoutSchemaMap> {
        let field = find_flexible(&schema.fields, None)
            .ok_or_else(|| ZiError::schema("resolved schema has no flexible content field"))?;
        let map = ZiLayoutSchemaMap::from_flexible(field)?;
        log::info!(
            "extracted {} layouts from content area '{}'",
            map.len(),
            map.content_area
        );
        Ok(map)
    }

    /// Extracts the flexible field whose name or key is `selector`.
    pub fn extract_named(schema: &ZiResolvedFieldSchema, selector: &str) -> Result<ZiLayoutSchemaMap> {
        let field = find_flexible(&schema.fields, Some(selector)).ok_or_else(|| {
            ZiError::schema(format!("flexible content field '{}' not found", selector))
        })?;
        let map = ZiLayoutSchemaMap::from_flexible(field)?;
        log::info!(
            "extracted {} layouts from content area '{}'",
            map.len(),
            map.content_area
        );
        Ok(map)
    }

    /// Extracts by selector when one is configured, else the first match.
    pub fn extract_with(schema: &ZiResolvedFieldSchema, selector: Option<&str>) -> Result<ZiLayoutSchemaMap> {
        match selector {
            Some(selector) => Self::extract_named(schema, selector),
            None => Self::extract(schema),
        }
    }
}

fn find_flexible<'a>(fields: &'a [ZiFieldDefinition], selector: Option<&str>) -> Option<&'a ZiFieldDefinition> {
    for field in fields {
        match &field.kind {
            ZiFieldKind::Flexible { layouts } => {
                let matches = selector.map_or(true, |s| field.name == s || field.key == s);
                if matches {
                    return Some(field);
                }
                for layout in layouts {
                    if let Some(found) = find_flexible(&layout.fields, selector) {
                        return Some(found);
                    }
                }
            }
            ZiFieldKind::Group { fields } | ZiFieldKind::Repeater { fields } => {
                if let Some(found) = find_flexible(fields, selector) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}
