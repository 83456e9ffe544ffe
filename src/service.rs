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

//! # Service Module
//!
//! One entry point for a whole request:
//!
//! ```text
//! site check -> cached schema -> normalize -> transform (+ lint) -> assemble
//! ```
//!
//! Only request validation and schema loading can fail. Everything about
//! the sections themselves is reported as warnings in the response.

use std::sync::Arc;

use serde_json::Value;

use crate::cache::ZiSchemaCache;
use crate::config::ZiTransformConfig;
use crate::errors::Result;
use crate::payload::{ZiPayloadAssembler, ZiTransformRequest, ZiTransformResponse};
use crate::schema::layout::ZiLayoutSchemaMap;
use crate::section::ZiSectionNormalizer;
use crate::store::{validate_site, ZiSchemaSource};
use crate::transformer::ZiTransformer;
use crate::validate::ZiSectionValidator;

pub struct ZiTransformService {
    config: ZiTransformConfig,
    source: Arc<dyn ZiSchemaSource>,
    cache: Arc<ZiSchemaCache>,
    normalizer: ZiSectionNormalizer,
}

impl std::fmt::Debug for ZiTransformService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZiTransformService")
            .field("config", &self.config)
            .field("cached_sites", &self.cache.len())
            .finish()
    }
}

impl ZiTransformService {
    pub fn new(config: ZiTransformConfig, source: Arc<dyn ZiSchemaSource>, cache: Arc<ZiSchemaCache>) -> Self {
        let normalizer = ZiSectionNormalizer::from_config(&config);
        Self {
            config,
            source,
            cache,
            normalizer,
        }
    }

    pub fn config(&self) -> &ZiTransformConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ZiSchemaCache> {
        &self.cache
    }

    /// Cached schema for `site`, loading it through the source on a miss.
    pub fn schema(&self, site: &str) -> Result<Arc<ZiLayoutSchemaMap>> {
        validate_site(site)?;
        self.cache.get_or_build(site, || self.source.load(site))
    }

    /// Reloads the schema for `site` from the source, replacing the cached
    /// one only if the source changed.
    pub fn reload(&self, site: &str) -> Result<bool> {
        validate_site(site)?;
        let schema = self.source.load(site)?;
        Ok(self.cache.replace_if_changed(site, schema))
    }

    pub fn handle(&self, request: &ZiTransformRequest) -> Result<ZiTransformResponse> {
        let schema = self.schema(&request.site)?;

        let sections = self.normalizer.normalize(request.sections.clone());
        log::debug!(
            "normalized {} sections for site '{}'",
            sections.len(),
            request.site
        );

        let transformer = ZiTransformer::new(&schema, &self.config);
        let outcome = transformer.transform(&sections);
        let mut warnings = outcome.warning_messages();
        if self.config.lint_sections {
            let lint = ZiSectionValidator::new(&schema, &self.config).validate(&sections);
            for warning in lint {
                let message = warning.to_string();
                if !warnings.contains(&message) {
                    warnings.push(message);
                }
            }
        }

        let payload = ZiPayloadAssembler::new(&self.config).assemble(
            request,
            &sections,
            transformer.content_area_key(),
            outcome.sections,
        );
        Ok(ZiTransformResponse { payload, warnings })
    }

    /// Validates a raw request document, then handles it.
    pub fn handle_value(&self, body: &Value) -> Result<ZiTransformResponse> {
        let request = ZiTransformRequest::from_value(body)?;
        self.handle(&request)
    }
}
