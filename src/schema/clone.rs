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

//! # Clone Resolver Module
//!
//! Clone fields are aliases: they stand for the fields of one or more other
//! groups (or single fields). Resolution replaces a clone with those fields,
//! recursively, until no clone is left.
//!
//! ## Depth Ceiling
//!
//! The resolver does not track visited keys. Legitimate clone chains in real
//! exports stay around five levels deep, so any expansion deeper than
//! `max_depth` (10 by default) is reported as
//! [`ZiError::CircularReference`].
//!
//! ## Key Prefixing
//!
//! Expanded fields are rewritten the way the backend addresses seamless
//! clones: every key below clone `K` becomes `K_<key>`. When the clone sets
//! `prefix_name`, direct child names also become `<clone name>_<name>`.

use crate::errors::{Result, ZiError};
use crate::schema::field::{ZiFieldDefinition, ZiFieldKind};
use crate::schema::registry::ZiFieldGroupRegistry;

/// Default ceiling for nested clone expansion.
pub const DEFAULT_MAX_CLONE_DEPTH: usize = 10;

/// Outcome of resolving one node.
#[derive(Clone, Debug, PartialEq)]
pub enum ZiResolved {
    /// The node was not a clone and is returned unchanged.
    Field(ZiFieldDefinition),
    /// The clone expanded into these fields (possibly none).
    Expanded(Vec<ZiFieldDefinition>),
}

impl ZiResolved {
    /// Flattens either outcome into a field list.
    pub fn into_fields(self) -> Vec<ZiFieldDefinition> {
        match self {
            ZiResolved::Field(field) => vec![field],
            ZiResolved::Expanded(fields) => fields,
        }
    }
}

#[derive(Debug)]
pub struct ZiCloneResolver<'a> {
    registry: &'a ZiFieldGroupRegistry,
    max_depth: usize,
}

impl<'a> ZiCloneResolver<'a> {
    pub fn new(registry: &'a ZiFieldGroupRegistry) -> Self {
        Self {
            registry,
            max_depth: DEFAULT_MAX_CLONE_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Resolves `node` at the given expansion depth.
    pub fn resolve(&self, node: &ZiFieldDefinition, depth: usize) -> Result<ZiResolved> {
        let (targets, prefix_name) = match &node.kind {
            ZiFieldKind::Clone {
                targets,
                prefix_name,
            } => (targets, *prefix_name),
            _ => return Ok(ZiResolved::Field(node.clone())),
        };

        if depth > self.max_depth {
            return Err(ZiError::circular(&node.key, &node.name, depth));
        }

        let mut expanded = Vec::new();
        for target in targets {
            for field in self.target_fields(target, &node.key) {
                let resolved = self
                    .resolve(field, depth + 1)
                    .map_err(|err| with_path_segment(err, &node.name))?;
                for child in resolved.into_fields() {
                    expanded.push(self.rewrite_child(node, &child, prefix_name));
                }
            }
        }
        Ok(ZiResolved::Expanded(expanded))
    }

    fn target_fields(&self, target: &str, clone_key: &str) -> Vec<&'a ZiFieldDefinition> {
        let registry: &'a ZiFieldGroupRegistry = self.registry;
        if let Some(group) = registry.group(target) {
            return group.fields.iter().collect();
        }
        if let Some(field) = registry.field(target) {
            return vec![field];
        }
        log::warn!(
            "clone '{}' references '{}' which is not in the registry, skipping",
            clone_key,
            target
        );
        Vec::new()
    }

    fn rewrite_child(
        &self,
        clone: &ZiFieldDefinition,
        child: &ZiFieldDefinition,
        prefix_name: bool,
    ) -> ZiFieldDefinition {
        let mut field = if clone.key.is_empty() {
            child.clone()
        } else {
            child.with_key_prefix(&clone.key)
        };
        if prefix_name && !clone.name.is_empty() && !field.name.is_empty() {
            field.name = format!("{}_{}", clone.name, field.name);
        }
        field
    }
}

/// Prepends the name of an enclosing clone to the path of a circular
/// reference error so the whole expansion chain is visible.
pub(crate) fn with_path_segment(err: ZiError, segment: &str) -> ZiError {
    match err {
        ZiError::CircularReference {
            clone_key,
            path,
            depth,
        } if !segment.is_empty() => ZiError::CircularReference {
            clone_key,
            path: if path.is_empty() {
                segment.to_string()
            } else {
                format!("{}.{}", segment, path)
            },
            depth,
        },
        other => other,
    }
}
