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

//! # Section Module
//!
//! Authors and generators write sections in a flat, forgiving shape:
//!
//! ```json
//! {"layout": "BasicContent", "heading": "Title", "heading_level": "h1", "content": "<p>x</p>"}
//! ```
//!
//! The transformer consumes the canonical nested shape:
//!
//! ```json
//! {"acf_fc_layout": "BasicContent", "heading": {"text": "Title", "level": "h1"}, "content": "<p>x</p>"}
//! ```
//!
//! [`ZiSectionNormalizer`] performs exactly that rewrite and nothing else.
//! Renamed keys keep the position of the key they replace, and normalizing
//! an already-canonical section returns it unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ZiTransformConfig;

/// A loosely-shaped input section.
pub type ZiRawSection = Map<String, Value>;

/// One canonical content-area entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZiSection(Map<String, Value>);

impl ZiSection {
    pub fn new(fields: Map<String, Value>) -> Self {
        ZiSection(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Layout name stored under `discriminator`, if it is a string.
    pub fn layout<'a>(&'a self, discriminator: &str) -> Option<&'a str> {
        self.0.get(discriminator).and_then(Value::as_str)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for ZiSection {
    fn from(fields: Map<String, Value>) -> Self {
        ZiSection(fields)
    }
}

#[derive(Clone, Debug)]
pub struct ZiSectionNormalizer {
    discriminator: String,
    alias: String,
    heading_key: String,
    heading_level_key: String,
    text_field: String,
    level_field: String,
}

impl Default for ZiSectionNormalizer {
    fn default() -> Self {
        Self::from_config(&ZiTransformConfig::default())
    }
}

impl ZiSectionNormalizer {
    pub fn from_config(config: &ZiTransformConfig) -> Self {
        ZiSectionNormalizer {
            discriminator: config.discriminator_key.clone(),
            alias: config.layout_alias.clone(),
            heading_key: config.heading_key.clone(),
            heading_level_key: config.heading_level_key.clone(),
            text_field: config.heading_text_field.clone(),
            level_field: config.heading_level_field.clone(),
        }
    }

    /// Normalizes every section, preserving order.
    pub fn normalize(&self, raw: Vec<ZiRawSection>) -> Vec<ZiSection> {
        raw.into_iter().map(|section| self.normalize_one(section)).collect()
    }

    pub fn normalize_one(&self, raw: ZiRawSection) -> ZiSection {
        let has_canonical = raw.contains_key(&self.discriminator);
        let heading = raw.get(&self.heading_key);
        let heading_absent = heading.is_none();
        let heading_nests_level = matches!(heading, Some(Value::String(_)) | Some(Value::Object(_)));
        let level = raw.get(&self.heading_level_key).cloned();

        let mut out = Map::with_capacity(raw.len());
        for (key, value) in raw {
            if key == self.alias {
                // The canonical key wins when both spellings are present.
                if !has_canonical {
                    out.insert(self.discriminator.clone(), value);
                }
            } else if key == self.heading_key {
                let promoted = match value {
                    Value::String(text) => {
                        let mut nested = Map::new();
                        nested.insert(self.text_field.clone(), Value::String(text));
                        if let Some(level) = &level {
                            nested.insert(self.level_field.clone(), level.clone());
                        }
                        Value::Object(nested)
                    }
                    other => other,
                };
                out.insert(key, promoted);
            } else if key == self.heading_level_key {
                if heading_absent {
                    let mut nested = Map::new();
                    nested.insert(self.level_field.clone(), value);
                    out.insert(self.heading_key.clone(), Value::Object(nested));
                } else if !heading_nests_level {
                    out.insert(key, value);
                }
            } else {
                out.insert(key, value);
            }
        }
        ZiSection(out)
    }
}
