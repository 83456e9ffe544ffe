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

//! # Payload Module
//!
//! Request and response documents, and assembly of the content-backend
//! payload around transformed sections.
//!
//! ```json
//! {
//!   "title": "Pokies",
//!   "slug": "pokies",
//!   "status": "draft",
//!   "acf": {"page_sections": [ ... ]},
//!   "yoast_wpseo_title": "..."
//! }
//! ```
//!
//! Title and slug fall back through explicit values, request variables and
//! (for the title) the first section heading. Empty strings do not count
//! as set. An explicit status is kept as given, even when empty.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ZiTransformConfig;
use crate::errors::{Result, ZiError};
use crate::section::{ZiRawSection, ZiSection};

/// Payload key of the SEO title.
pub const SEO_TITLE_KEY: &str = "yoast_wpseo_title";
/// Payload key of the SEO description.
pub const SEO_DESCRIPTION_KEY: &str = "yoast_wpseo_metadesc";

/// One transform request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiTransformRequest {
    pub site: String,
    pub sections: Vec<ZiRawSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
}

impl ZiTransformRequest {
    pub fn new(site: &str, sections: Vec<ZiRawSection>) -> Self {
        ZiTransformRequest {
            site: site.to_string(),
            sections,
            ..Default::default()
        }
    }

    /// Validates and decodes a raw request document.
    pub fn from_value(value: &Value) -> Result<Self> {
        let body = value
            .as_object()
            .ok_or_else(|| ZiError::validation("request body must be an object"))?;
        if !body.contains_key("site") || !body.contains_key("sections") {
            return Err(ZiError::validation("missing required fields: site, sections"));
        }
        let sections = body
            .get("sections")
            .and_then(Value::as_array)
            .ok_or_else(|| ZiError::validation("'sections' must be a list"))?;
        if let Some(index) = sections.iter().position(|s| !s.is_object()) {
            return Err(ZiError::validation(format!("section {} must be an object", index)));
        }
        serde_json::from_value(value.clone())
            .map_err(|err| ZiError::validation(format!("invalid request: {}", err)))
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).and_then(Value::as_str).filter(|s| !s.is_empty())
    }
}

/// Backend-ready document.
///
/// `fields` carries the payload root and any meta keys; it is flattened
/// into the top level on serialization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiTransformedPayload {
    pub title: String,
    pub slug: String,
    pub status: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ZiTransformedPayload {
    /// Sections stored under `root.content_area`.
    pub fn sections(&self, root: &str, content_area: &str) -> Option<&Vec<Value>> {
        self.fields
            .get(root)
            .and_then(|doc| doc.get(content_area))
            .and_then(Value::as_array)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiTransformResponse {
    pub payload: ZiTransformedPayload,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct ZiPayloadAssembler<'a> {
    config: &'a ZiTransformConfig,
}

impl<'a> ZiPayloadAssembler<'a> {
    pub fn new(config: &'a ZiTransformConfig) -> Self {
        Self { config }
    }

    /// Wraps transformed sections into a payload. `normalized` supplies the
    /// heading used as the last-resort title.
    pub fn assemble(
        &self,
        request: &ZiTransformRequest,
        normalized: &[ZiSection],
        content_area: &str,
        transformed: Vec<Value>,
    ) -> ZiTransformedPayload {
        let title = non_empty(request.title.as_deref())
            .or_else(|| request.variable(&self.config.title_variable))
            .or_else(|| self.first_heading(normalized))
            .unwrap_or_default()
            .to_string();
        let slug = non_empty(request.slug.as_deref())
            .or_else(|| request.variable(&self.config.slug_variable))
            .unwrap_or_default()
            .to_string();
        let status = request
            .status
            .clone()
            .unwrap_or_else(|| self.config.default_status.clone());

        let mut document = Map::new();
        document.insert(content_area.to_string(), Value::Array(transformed));
        let mut fields = Map::new();
        fields.insert(self.config.payload_root.clone(), Value::Object(document));
        if let Some(meta) = non_empty(request.meta_title.as_deref()) {
            fields.insert(SEO_TITLE_KEY.to_string(), Value::String(meta.to_string()));
        }
        if let Some(meta) = non_empty(request.meta_description.as_deref()) {
            fields.insert(SEO_DESCRIPTION_KEY.to_string(), Value::String(meta.to_string()));
        }

        ZiTransformedPayload {
            title,
            slug,
            status,
            fields,
        }
    }

    fn first_heading<'s>(&self, sections: &'s [ZiSection]) -> Option<&'s str> {
        sections
            .first()?
            .get(&self.config.heading_key)?
            .get(&self.config.heading_text_field)?
            .as_str()
            .filter(|s| !s.is_empty())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
