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

//! # Schema Cache Module
//!
//! Per-site layout schema maps, built lazily and shared as
//! `Arc<ZiLayoutSchemaMap>`.
//!
//! Each site owns a once-cell. Concurrent first requests for the same site
//! run the builder once; the others wait on the cell rather than on the
//! map, so requests for other sites and readers of built entries are never
//! blocked. A failed build removes the site's cell again, so the next
//! request retries and unknown sites do not accumulate.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;

use crate::errors::{Result, ZiError};
use crate::schema::layout::ZiLayoutSchemaMap;

type ZiSchemaCell = Arc<OnceCell<Arc<ZiLayoutSchemaMap>>>;

#[derive(Debug, Default)]
pub struct ZiSchemaCache {
    entries: DashMap<String, ZiSchemaCell>,
}

impl ZiSchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached schema for `site`, building it with `build` if
    /// no schema is cached yet.
    pub fn get_or_build<F>(&self, site: &str, build: F) -> Result<Arc<ZiLayoutSchemaMap>>
    where
        F: FnOnce() -> Result<ZiLayoutSchemaMap>,
    {
        // Clone the cell out so the shard lock is released before building.
        let cell = Arc::clone(
            self.entries
                .entry(site.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        );
        let built = cell.get_or_try_init(|| {
            let schema = build()?;
            log::info!(
                "cached schema for site '{}' ({} layouts)",
                site,
                schema.len()
            );
            Ok::<_, ZiError>(Arc::new(schema))
        });
        match built {
            Ok(schema) => Ok(Arc::clone(schema)),
            Err(err) => {
                // Drop the empty cell unless another caller replaced or filled it.
                self.entries.remove_if(site, |_, current| {
                    Arc::ptr_eq(current, &cell) && current.get().is_none()
                });
                Err(err)
            }
        }
    }

    pub fn get(&self, site: &str) -> Option<Arc<ZiLayoutSchemaMap>> {
        self.entries
            .get(site)
            .and_then(|cell| cell.get().map(Arc::clone))
    }

    /// Replaces the schema for `site`. Requests already holding the old
    /// schema keep using it.
    pub fn refresh(&self, site: &str, schema: ZiLayoutSchemaMap) -> Arc<ZiLayoutSchemaMap> {
        let schema = Arc::new(schema);
        self.entries.insert(
            site.to_string(),
            Arc::new(OnceCell::with_value(Arc::clone(&schema))),
        );
        log::info!("refreshed schema for site '{}'", site);
        schema
    }

    /// Replaces the schema only when its source digest differs from the
    /// cached one. Returns whether a replacement happened.
    pub fn replace_if_changed(&self, site: &str, schema: ZiLayoutSchemaMap) -> bool {
        if let Some(current) = self.get(site) {
            if current.source_digest.is_some() && current.source_digest == schema.source_digest {
                log::debug!("schema for site '{}' unchanged", site);
                return false;
            }
        }
        self.refresh(site, schema);
        true
    }

    pub fn invalidate(&self, site: &str) -> bool {
        self.entries.remove(site).is_some()
    }

    /// Number of sites with a built schema.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.value().get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
