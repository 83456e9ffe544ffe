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

//! # Schema Module
//!
//! Everything between a raw field-group export and a per-layout schema map.
//!
//! - **field**: the field definition tagged union
//! - **registry**: export parsing and group/field indexes
//! - **clone**: clone resolution with a depth ceiling
//! - **builder**: clone-free field tree construction
//! - **layout**: flexible-layout extraction
//!
//! ```rust
//! use zipress::schema::{ZiFieldGroupRegistry, ZiFieldTreeBuilder, ZiLayoutExtractor};
//!
//! let registry = ZiFieldGroupRegistry::from_path("acf-export.json")?;
//! let schema = ZiFieldTreeBuilder::new(&registry).build_group("group_6104225bab52f")?;
//! let layouts = ZiLayoutExtractor::extract(&schema)?;
//! ```

pub mod builder;
pub mod clone;
pub mod field;
pub mod layout;
pub mod registry;

pub use builder::{ZiFieldTreeBuilder, ZiResolvedFieldSchema};
pub use clone::{ZiCloneResolver, ZiResolved, DEFAULT_MAX_CLONE_DEPTH};
pub use field::{ZiFieldDefinition, ZiFieldKind, ZiLayoutDefinition, ZiScalarKind};
pub use layout::{ZiLayoutExtractor, ZiLayoutMatch, ZiLayoutSchema, ZiLayoutSchemaMap};
pub use registry::{ZiFieldGroup, ZiFieldGroupRegistry};
