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

//! # Field Definition Module
//!
//! A [`ZiFieldDefinition`] describes one storage field as the content
//! backend defines it: an opaque versioned key (`field_6104217816977`), the
//! human name authors write (`text`), and a structural kind. Kinds form a
//! tagged union so that every consumer matches on shape explicitly:
//!
//! - **Scalar**: text, select, boolean, wysiwyg, link and friends, with an
//!   optional default and choice set
//! - **Group**: an ordered list of child fields stored as one nested object
//! - **Repeater**: rows, each shaped like the child list
//! - **Flexible**: rows whose shape is selected by a named layout
//! - **Clone**: a reference to other groups or fields, expanded away during
//!   resolution
//! - **Presentation**: UI-only organizers that carry no data

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend type names for fields that only organize the editing UI.
pub const PRESENTATION_TYPES: [&str; 3] = ["accordion", "tab", "message"];

/// Classification of scalar backend types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZiScalarKind {
    Text,
    Textarea,
    Wysiwyg,
    Select,
    Boolean,
    Link,
    Image,
    Number,
    Url,
    Other,
}

impl ZiScalarKind {
    pub fn from_type(field_type: &str) -> Self {
        match field_type {
            "text" | "email" | "password" => ZiScalarKind::Text,
            "textarea" => ZiScalarKind::Textarea,
            "wysiwyg" => ZiScalarKind::Wysiwyg,
            "select" | "radio" | "button_group" | "checkbox" => ZiScalarKind::Select,
            "true_false" => ZiScalarKind::Boolean,
            "link" | "page_link" => ZiScalarKind::Link,
            "image" | "file" | "gallery" => ZiScalarKind::Image,
            "number" | "range" => ZiScalarKind::Number,
            "url" => ZiScalarKind::Url,
            _ => ZiScalarKind::Other,
        }
    }
}

/// One named variant of a flexible field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiLayoutDefinition {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub fields: Vec<ZiFieldDefinition>,
}

/// Structural kind of a field definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZiFieldKind {
    Scalar {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        choices: Option<IndexMap<String, String>>,
    },
    Group {
        fields: Vec<ZiFieldDefinition>,
    },
    Repeater {
        fields: Vec<ZiFieldDefinition>,
    },
    Flexible {
        layouts: Vec<ZiLayoutDefinition>,
    },
    Clone {
        targets: Vec<String>,
        #[serde(default)]
        prefix_name: bool,
    },
    Presentation,
}

/// A single field of a field group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiFieldDefinition {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub label: String,
    /// Backend type string as found in the export (`true_false`, `group`, ...).
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    pub kind: ZiFieldKind,
}

impl ZiFieldDefinition {
    /// Constructs a scalar field without default or choices.
    pub fn scalar(key: &str, name: &str, field_type: &str) -> Self {
        ZiFieldDefinition {
            key: key.to_string(),
            name: name.to_string(),
            label: String::new(),
            field_type: field_type.to_string(),
            required: false,
            kind: ZiFieldKind::Scalar {
                default: None,
                choices: None,
            },
        }
    }

    pub fn group(key: &str, name: &str, fields: Vec<ZiFieldDefinition>) -> Self {
        ZiFieldDefinition {
            key: key.to_string(),
            name: name.to_string(),
            label: String::new(),
            field_type: "group".to_string(),
            required: false,
            kind: ZiFieldKind::Group { fields },
        }
    }

    pub fn clone_of(key: &str, name: &str, targets: &[&str]) -> Self {
        ZiFieldDefinition {
            key: key.to_string(),
            name: name.to_string(),
            label: String::new(),
            field_type: "clone".to_string(),
            required: false,
            kind: ZiFieldKind::Clone {
                targets: targets.iter().map(|t| t.to_string()).collect(),
                prefix_name: false,
            },
        }
    }

    /// Sets the scalar default. Ignored on non-scalar kinds.
    pub fn with_default(mut self, value: Value) -> Self {
        if let ZiFieldKind::Scalar { default, .. } = &mut self.kind {
            *default = Some(value);
        }
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn is_clone(&self) -> bool {
        matches!(self.kind, ZiFieldKind::Clone { .. })
    }

    pub fn is_presentation(&self) -> bool {
        matches!(self.kind, ZiFieldKind::Presentation)
    }

    /// Child fields of groups and repeaters.
    pub fn children(&self) -> Option<&[ZiFieldDefinition]> {
        match &self.kind {
            ZiFieldKind::Group { fields } | ZiFieldKind::Repeater { fields } => Some(fields),
            _ => None,
        }
    }

    /// Value used when a section omits this field.
    ///
    /// Groups have no default of their own: their default is the object of
    /// every child default, or `None` when no child has one.
    pub fn effective_default(&self) -> Option<Value> {
        match &self.kind {
            ZiFieldKind::Scalar { default, .. } => default.clone(),
            ZiFieldKind::Group { fields } => {
                let mut composed = Map::new();
                for child in fields {
                    if let Some(value) = child.effective_default() {
                        composed.insert(child.name.clone(), value);
                    }
                }
                if composed.is_empty() {
                    None
                } else {
                    Some(Value::Object(composed))
                }
            }
            _ => None,
        }
    }

    /// Returns a copy whose key, and every descendant key, carries `prefix`.
    pub(crate) fn with_key_prefix(&self, prefix: &str) -> Self {
        let mut field = self.clone();
        field.apply_key_prefix(prefix);
        field
    }

    fn apply_key_prefix(&mut self, prefix: &str) {
        self.key = format!("{}_{}", prefix, self.key);
        match &mut self.kind {
            ZiFieldKind::Group { fields } | ZiFieldKind::Repeater { fields } => {
                for child in fields {
                    child.apply_key_prefix(prefix);
                }
            }
            ZiFieldKind::Flexible { layouts } => {
                for layout in layouts {
                    for child in &mut layout.fields {
                        child.apply_key_prefix(prefix);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Joins a dotted parent path with a child name.
pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}
