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

//! # Schema Store Module
//!
//! Where layout schema maps come from.
//!
//! - [`ZiMappingDirectory`] reads pre-extracted maps, one file per site
//!   (`<dir>/<site>.json`, `.yaml` or `.yml`), with an optional fallback
//!   map shared by every site without its own file.
//! - [`ZiExportSource`] reads a raw field-group export and runs the full
//!   resolve and extract chain on every load.
//!
//! Site identifiers are used as file stems and must match
//! `^[A-Za-z0-9_-]+$`.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ZiTransformConfig;
use crate::errors::{Result, ZiError};
use crate::schema::builder::ZiFieldTreeBuilder;
use crate::schema::field::{ZiFieldDefinition, ZiFieldKind};
use crate::schema::layout::{ZiLayoutExtractor, ZiLayoutSchemaMap};
use crate::schema::registry::ZiFieldGroupRegistry;

static SITE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("site name pattern is valid"));

/// Rejects site identifiers that are not safe file stems.
pub fn validate_site(site: &str) -> Result<()> {
    if SITE_NAME.is_match(site) {
        Ok(())
    } else {
        Err(ZiError::validation("invalid site name"))
    }
}

/// Loads the layout schema map of one site.
pub trait ZiSchemaSource: Send + Sync {
    fn load(&self, site: &str) -> Result<ZiLayoutSchemaMap>;
}

const MAPPING_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

#[derive(Clone, Debug)]
pub struct ZiMappingDirectory {
    root: PathBuf,
    fallback: Option<PathBuf>,
}

impl ZiMappingDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback = Some(path.into());
        self
    }

    /// Path that `load(site)` would read, if any.
    pub fn resolve_path(&self, site: &str) -> Option<PathBuf> {
        MAPPING_EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", site, ext)))
            .find(|path| path.is_file())
            .or_else(|| self.fallback.clone().filter(|path| path.is_file()))
    }

    /// Writes `schema` as `<root>/<site>.json`.
    pub fn save(&self, site: &str, schema: &ZiLayoutSchemaMap) -> Result<PathBuf> {
        validate_site(site)?;
        fs::create_dir_all(&self.root)?;
        let path = self.root.join(format!("{}.json", site));
        fs::write(&path, schema.to_json_string()?)?;
        Ok(path)
    }
}

impl ZiSchemaSource for ZiMappingDirectory {
    fn load(&self, site: &str) -> Result<ZiLayoutSchemaMap> {
        validate_site(site)?;
        let path = self
            .resolve_path(site)
            .ok_or_else(|| ZiError::Io(format!("no schema mapping for site '{}'", site)))?;
        log::debug!("loading schema mapping for site '{}' from {}", site, path.display());
        read_mapping(&path)
    }
}

fn read_mapping(path: &Path) -> Result<ZiLayoutSchemaMap> {
    let source = fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        #[cfg(feature = "yaml")]
        Some("yaml") | Some("yml") => ZiLayoutSchemaMap::from_yaml_str(&source),
        _ => ZiLayoutSchemaMap::from_json_str(&source),
    }
}

/// Builds schema maps straight from a field-group export.
#[derive(Clone, Debug)]
pub struct ZiExportSource {
    location: ZiExportLocation,
    group: Option<String>,
    content_area: Option<String>,
    max_clone_depth: usize,
}

#[derive(Clone, Debug)]
enum ZiExportLocation {
    /// One export serving every site.
    Shared(PathBuf),
    /// `<dir>/<site>.<ext>` per site.
    PerSite(PathBuf),
}

impl ZiExportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_location(ZiExportLocation::Shared(path.into()))
    }

    pub fn per_site(dir: impl Into<PathBuf>) -> Self {
        Self::with_location(ZiExportLocation::PerSite(dir.into()))
    }

    fn with_location(location: ZiExportLocation) -> Self {
        let config = ZiTransformConfig::default();
        Self {
            location,
            group: None,
            content_area: config.content_area,
            max_clone_depth: config.max_clone_depth,
        }
    }

    /// Builds only this group instead of the first one with a content area.
    pub fn group(mut self, key: &str) -> Self {
        self.group = Some(key.to_string());
        self
    }

    /// Takes the content-area selector and clone ceiling from `config`.
    pub fn configured(mut self, config: &ZiTransformConfig) -> Self {
        self.content_area = config.content_area.clone();
        self.max_clone_depth = config.max_clone_depth;
        self
    }

    fn export_path(&self, site: &str) -> Result<PathBuf> {
        match &self.location {
            ZiExportLocation::Shared(path) => Ok(path.clone()),
            ZiExportLocation::PerSite(dir) => MAPPING_EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{}.{}", site, ext)))
                .find(|path| path.is_file())
                .ok_or_else(|| ZiError::Io(format!("no field group export for site '{}'", site))),
        }
    }

    /// Resolves and extracts a schema map from export text.
    pub fn build_from_source(&self, source: &str, path: &Path) -> Result<ZiLayoutSchemaMap> {
        let registry = ZiFieldGroupRegistry::from_source_for_path(source, path)?;
        let group_key = match &self.group {
            Some(key) => key.clone(),
            None => registry
                .groups()
                .find(|group| has_flexible(&group.fields))
                .map(|group| group.key.clone())
                .ok_or_else(|| ZiError::schema("no field group defines a flexible content field"))?,
        };
        let schema = ZiFieldTreeBuilder::new(&registry)
            .with_max_depth(self.max_clone_depth)
            .build_group(&group_key)?;
        let map = ZiLayoutExtractor::extract_with(&schema, self.content_area.as_deref())?;
        Ok(map.with_source_digest(blake3::hash(source.as_bytes()).to_hex().to_string()))
    }
}

impl ZiSchemaSource for ZiExportSource {
    fn load(&self, site: &str) -> Result<ZiLayoutSchemaMap> {
        validate_site(site)?;
        let path = self.export_path(site)?;
        log::debug!("building schema for site '{}' from export {}", site, path.display());
        let source = fs::read_to_string(&path)?;
        self.build_from_source(&source, &path)
    }
}

fn has_flexible(fields: &[ZiFieldDefinition]) -> bool {
    fields.iter().any(|field| match &field.kind {
        ZiFieldKind::Flexible { .. } => true,
        ZiFieldKind::Group { fields } | ZiFieldKind::Repeater { fields } => has_flexible(fields),
        _ => false,
    })
}
