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

//! # ZiPress Core Library
//!
//! ZiPress turns loosely-shaped page sections into payloads a
//! field-group-driven content backend accepts. It reads the backend's
//! field-group export, resolves clone fields into a concrete schema per
//! flexible layout, and merges each authored section against its layout
//! with defaults filled in.
//!
//! ## Module Overview
//!
//! - **schema**: export parsing, clone resolution, field trees and layout extraction
//! - **section**: canonical sections and the section normalizer
//! - **transformer**: schema merge and transform warnings
//! - **validate**: advisory lint of authored fields and choice values
//! - **payload**: request, payload and response documents
//! - **store**: schema sources (mapping directories and raw exports)
//! - **cache**: per-site schema cache
//! - **service**: the request-level entry point
//! - **config**: transform configuration and its builder
//!
//! ## Feature Flags
//!
//! - `yaml`: YAML field-group exports and mappings
//! - `full`: Enables all features
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use zipress::{ZiExportSource, ZiSchemaCache, ZiTransformConfig, ZiTransformService};
//!
//! let service = ZiTransformService::new(
//!     ZiTransformConfig::default(),
//!     Arc::new(ZiExportSource::new("acf-export.json")),
//!     Arc::new(ZiSchemaCache::new()),
//! );
//!
//! let response = service.handle_value(&serde_json::json!({
//!     "site": "main",
//!     "sections": [{"layout": "BasicContent", "heading": "Title", "heading_level": "h1"}]
//! }))?;
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return `Result<T, ZiError>`. Section-level problems
//! (unknown layouts, missing required fields) are not errors; they come
//! back as warnings next to the output.

pub mod cache;
pub mod config;
pub mod errors;
pub mod payload;
pub mod schema;
pub mod section;
pub mod service;
pub mod store;
pub mod transformer;
pub mod validate;

pub use cache::ZiSchemaCache;
pub use config::{ZiKeyStyle, ZiTransformConfig, ZiTransformConfigBuilder};
pub use errors::{Result, ZiError};
pub use payload::{ZiPayloadAssembler, ZiTransformRequest, ZiTransformResponse, ZiTransformedPayload};
pub use schema::{
    ZiCloneResolver, ZiFieldDefinition, ZiFieldGroup, ZiFieldGroupRegistry, ZiFieldKind,
    ZiFieldTreeBuilder, ZiLayoutDefinition, ZiLayoutExtractor, ZiLayoutMatch, ZiLayoutSchema,
    ZiLayoutSchemaMap, ZiResolved, ZiResolvedFieldSchema,
};
pub use section::{ZiRawSection, ZiSection, ZiSectionNormalizer};
pub use service::ZiTransformService;
pub use store::{validate_site, ZiExportSource, ZiMappingDirectory, ZiSchemaSource};
pub use transformer::{ZiTransformOutcome, ZiTransformWarning, ZiTransformer};
pub use validate::ZiSectionValidator;
