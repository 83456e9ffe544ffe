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

//! # Field Tree Builder Module
//!
//! Turns raw field lists into a [`ZiResolvedFieldSchema`]: the clone resolver
//! is mapped over every field, expansions are spliced in at the clone's
//! position, and groups, repeaters and flexible layouts are recursed into so
//! that clones nested at any depth disappear.
//!
//! UI-only fields and unnamed data fields are dropped; everything left is
//! addressable by a dotted path of ancestor names.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, ZiError};
use crate::schema::clone::{with_path_segment, ZiCloneResolver, ZiResolved};
use crate::schema::field::{join_path, ZiFieldDefinition, ZiFieldKind};
use crate::schema::registry::ZiFieldGroupRegistry;

/// A field tree with every clone expanded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiResolvedFieldSchema {
    pub fields: Vec<ZiFieldDefinition>,
}

impl ZiResolvedFieldSchema {
    pub fn new(fields: Vec<ZiFieldDefinition>) -> Self {
        Self { fields }
    }

    /// Looks a field up by dotted path (`heading.alignment.desktop`).
    /// Repeater children are addressed through the repeater name; a trailing
    /// `[]` on a segment is accepted.
    pub fn get(&self, path: &str) -> Option<&ZiFieldDefinition> {
        let mut current: &[ZiFieldDefinition] = &self.fields;
        let mut found = None;
        for segment in path.split('.') {
            let segment = segment.trim_end_matches("[]");
            let field = current.iter().find(|f| f.name == segment)?;
            current = field.children().unwrap_or(&[]);
            found = Some(field);
        }
        found
    }

    /// Dotted paths of every leaf, in schema order.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        collect_leaf_paths(&self.fields, "", &mut paths);
        paths
    }

    pub fn contains_clone(&self) -> bool {
        fields_contain_clone(&self.fields)
    }

    /// Flat mapping from dotted path to backend field key. Repeaters map
    /// `name[]` to a nested mapping of their row paths.
    pub fn field_keys(&self) -> IndexMap<String, Value> {
        field_key_paths(&self.fields, "")
    }
}

fn collect_leaf_paths(fields: &[ZiFieldDefinition], prefix: &str, out: &mut Vec<String>) {
    for field in fields {
        let path = join_path(prefix, &field.name);
        match field.children() {
            Some(children) => collect_leaf_paths(children, &path, out),
            None => out.push(path),
        }
    }
}

fn fields_contain_clone(fields: &[ZiFieldDefinition]) -> bool {
    fields.iter().any(|field| match &field.kind {
        ZiFieldKind::Clone { .. } => true,
        ZiFieldKind::Group { fields } | ZiFieldKind::Repeater { fields } => {
            fields_contain_clone(fields)
        }
        ZiFieldKind::Flexible { layouts } => {
            layouts.iter().any(|layout| fields_contain_clone(&layout.fields))
        }
        _ => false,
    })
}

fn field_key_paths(fields: &[ZiFieldDefinition], prefix: &str) -> IndexMap<String, Value> {
    let mut out = IndexMap::new();
    for field in fields {
        let path = join_path(prefix, &field.name);
        match &field.kind {
            ZiFieldKind::Group { fields } => out.extend(field_key_paths(fields, &path)),
            ZiFieldKind::Repeater { fields } => {
                let rows: Map<String, Value> = field_key_paths(fields, "").into_iter().collect();
                out.insert(format!("{}[]", path), Value::Object(rows));
            }
            _ => {
                out.insert(path, Value::String(field.key.clone()));
            }
        }
    }
    out
}

#[derive(Debug)]
pub struct ZiFieldTreeBuilder<'a> {
    registry: &'a ZiFieldGroupRegistry,
    resolver: ZiCloneResolver<'a>,
}

impl<'a> ZiFieldTreeBuilder<'a> {
    pub fn new(registry: &'a ZiFieldGroupRegistry) -> Self {
        Self {
            registry,
            resolver: ZiCloneResolver::new(registry),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.resolver = self.resolver.with_max_depth(max_depth);
        self
    }

    /// Resolves a raw field list into a clone-free tree.
    pub fn build(&self, raw_fields: &[ZiFieldDefinition]) -> Result<ZiResolvedFieldSchema> {
        let fields = self.build_fields(raw_fields, 0)?;
        Ok(ZiResolvedFieldSchema::new(fields))
    }

    /// Resolves the fields of one registered group.
    pub fn build_group(&self, group_key: &str) -> Result<ZiResolvedFieldSchema> {
        let group = self
            .registry
            .group(group_key)
            .ok_or_else(|| ZiError::schema(format!("field group '{}' not found", group_key)))?;
        self.build(&group.fields)
    }

    fn build_fields(&self, fields: &[ZiFieldDefinition], depth: usize) -> Result<Vec<ZiFieldDefinition>> {
        let mut out = Vec::with_capacity(fields.len());
        for field in fields {
            if !keeps(field) {
                continue;
            }
            match self.resolver.resolve(field, depth)? {
                ZiResolved::Field(resolved) => out.push(self.build_node(resolved, depth)?),
                ZiResolved::Expanded(expanded) => {
                    for resolved in expanded {
                        if keeps(&resolved) {
                            out.push(self.build_node(resolved, depth + 1)?);
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    fn build_node(&self, mut field: ZiFieldDefinition, depth: usize) -> Result<ZiFieldDefinition> {
        let name = field.name.clone();
        match &mut field.kind {
            ZiFieldKind::Group { fields } | ZiFieldKind::Repeater { fields } => {
                *fields = self
                    .build_fields(fields, depth)
                    .map_err(|err| with_path_segment(err, &name))?;
            }
            ZiFieldKind::Flexible { layouts } => {
                for layout in layouts.iter_mut() {
                    layout.fields = self
                        .build_fields(&layout.fields, depth)
                        .map_err(|err| with_path_segment(err, &layout.name))
                        .map_err(|err| with_path_segment(err, &name))?;
                }
            }
            _ => {}
        }
        Ok(field)
    }
}

/// Whether a raw field survives into the resolved tree. Clones are kept
/// for expansion even when unnamed.
fn keeps(field: &ZiFieldDefinition) -> bool {
    if field.is_presentation() {
        return false;
    }
    field.is_clone() || !field.name.is_empty()
}
