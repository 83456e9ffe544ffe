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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, ZiError};
use crate::schema::clone::DEFAULT_MAX_CLONE_DEPTH;

/// How field names are spelled in the emitted sections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZiKeyStyle {
    /// Nested human-readable names (`heading.alignment.desktop`).
    #[default]
    FieldNames,
    /// Opaque backend field keys, with group leaves flattened.
    FieldKeys,
}

/// Configuration shared by the normalizer, transformer and payload
/// assembler. Every conventional key name used by the translation core is
/// configurable here so that sites with different field naming can reuse
/// the same pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiTransformConfig {
    /// Key naming the layout variant of a canonical section.
    pub discriminator_key: String,
    /// Short alias accepted on loosely-shaped input sections.
    pub layout_alias: String,
    pub heading_key: String,
    pub heading_level_key: String,
    /// Sub-field of the nested heading holding the heading text.
    pub heading_text_field: String,
    /// Sub-field of the nested heading holding the heading level.
    pub heading_level_field: String,
    /// Page variable used as the title when no override is given.
    pub title_variable: String,
    /// Page variable used as the slug when no override is given.
    pub slug_variable: String,
    pub default_status: String,
    /// Top-level payload key wrapping the content areas.
    pub payload_root: String,
    /// Name or key of the flexible field to extract. The first flexible
    /// field of the schema is used when unset.
    pub content_area: Option<String>,
    pub key_style: ZiKeyStyle,
    /// Deepest clone chain accepted before reporting a circular reference.
    pub max_clone_depth: usize,
    /// Whether the service appends section lint warnings to the response.
    pub lint_sections: bool,
}

impl Default for ZiTransformConfig {
    fn default() -> Self {
        ZiTransformConfig {
            discriminator_key: "acf_fc_layout".to_string(),
            layout_alias: "layout".to_string(),
            heading_key: "heading".to_string(),
            heading_level_key: "heading_level".to_string(),
            heading_text_field: "text".to_string(),
            heading_level_field: "level".to_string(),
            title_variable: "category_name".to_string(),
            slug_variable: "category_slug".to_string(),
            default_status: "draft".to_string(),
            payload_root: "acf".to_string(),
            content_area: None,
            key_style: ZiKeyStyle::FieldNames,
            max_clone_depth: DEFAULT_MAX_CLONE_DEPTH,
            lint_sections: false,
        }
    }
}

impl ZiTransformConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_style(mut self, style: ZiKeyStyle) -> Self {
        self.key_style = style;
        self
    }

    pub fn content_area(mut self, name: &str) -> Self {
        self.content_area = Some(name.to_string());
        self
    }

    pub fn max_clone_depth(mut self, depth: usize) -> Self {
        self.max_clone_depth = depth;
        self
    }

    pub fn lint_sections(mut self, enabled: bool) -> Self {
        self.lint_sections = enabled;
        self
    }
}

/// Partial configuration as read from a config document. Absent keys fall
/// back to [`ZiTransformConfig::default`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ZiTransformConfigBuilder {
    pub discriminator_key: Option<String>,
    pub layout_alias: Option<String>,
    pub heading_key: Option<String>,
    pub heading_level_key: Option<String>,
    pub heading_text_field: Option<String>,
    pub heading_level_field: Option<String>,
    pub title_variable: Option<String>,
    pub slug_variable: Option<String>,
    pub default_status: Option<String>,
    pub payload_root: Option<String>,
    pub content_area: Option<String>,
    pub key_style: Option<ZiKeyStyle>,
    pub max_clone_depth: Option<usize>,
    pub lint_sections: Option<bool>,
}

impl ZiTransformConfigBuilder {
    pub fn build(self) -> ZiTransformConfig {
        let base = ZiTransformConfig::default();
        ZiTransformConfig {
            discriminator_key: self.discriminator_key.unwrap_or(base.discriminator_key),
            layout_alias: self.layout_alias.unwrap_or(base.layout_alias),
            heading_key: self.heading_key.unwrap_or(base.heading_key),
            heading_level_key: self.heading_level_key.unwrap_or(base.heading_level_key),
            heading_text_field: self.heading_text_field.unwrap_or(base.heading_text_field),
            heading_level_field: self
                .heading_level_field
                .unwrap_or(base.heading_level_field),
            title_variable: self.title_variable.unwrap_or(base.title_variable),
            slug_variable: self.slug_variable.unwrap_or(base.slug_variable),
            default_status: self.default_status.unwrap_or(base.default_status),
            payload_root: self.payload_root.unwrap_or(base.payload_root),
            content_area: self.content_area.or(base.content_area),
            key_style: self.key_style.unwrap_or(base.key_style),
            max_clone_depth: self.max_clone_depth.unwrap_or(base.max_clone_depth),
            lint_sections: self.lint_sections.unwrap_or(base.lint_sections),
        }
    }

    pub fn from_json(value: &Value) -> Result<ZiTransformConfig> {
        if !value.is_object() {
            return Err(ZiError::validation("transform config must be object"));
        }
        let builder: ZiTransformConfigBuilder = serde_json::from_value(value.clone())?;
        Ok(builder.build())
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(source: &str) -> Result<ZiTransformConfig> {
        let builder: ZiTransformConfigBuilder = serde_yaml::from_str(source)?;
        Ok(builder.build())
    }
}
