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

//! # ZiPress Error Module
//!
//! This module defines the error type shared by every ZiPress component.
//!
//! ## Two Tiers
//!
//! ZiPress separates structural failures from content problems:
//!
//! - **Structural** conditions abort the operation and surface as [`ZiError`]:
//!   an unparseable field-group export, a clone chain deeper than the
//!   configured ceiling, or two layouts sharing a name.
//! - **Content** conditions never abort. Unknown layouts and missing required
//!   fields are collected as warnings next to a successful result (see
//!   [`crate::transformer::ZiTransformWarning`]).
//!
//! Structural variants carry the group key, field path or depth that was
//! reached so that a bad export can be diagnosed without opening it.
//!
//! ## Usage
//!
//! ```rust
//! use zipress::errors::{Result, ZiError};
//!
//! fn site_name(raw: &str) -> Result<&str> {
//!     if raw.is_empty() {
//!         return Err(ZiError::validation("site may not be empty"));
//!     }
//!     Ok(raw)
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convience result type used throughout ZiPress.
pub type Result<T> = std::result::Result<T, ZiError>;

/// Canonical error enumeration for ZiPress.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ZiError {
    /// Errors originating from filesystem IO while loading sources.
    #[error("io error: {0}")]
    Io(String),

    /// Malformed field-group source or an unusable resolved schema.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Validation errors triggered by invalid requests or identifiers.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Clone expansion went deeper than the configured ceiling, which only
    /// happens when field groups clone each other.
    #[error("circular clone reference at '{clone_key}' (path '{path}', depth {depth})")]
    CircularReference {
        clone_key: String,
        path: String,
        depth: usize,
    },

    /// Two layouts of one flexible field share a name.
    #[error("duplicate layout '{layout}' in content area '{content_area}'")]
    DuplicateLayout { content_area: String, layout: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for ZiError {
    fn from(err: io::Error) -> Self {
        ZiError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ZiError {
    fn from(err: serde_json::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

#[cfg(feature = "yaml")]
impl From<serde_yaml::Error> for ZiError {
    fn from(err: serde_yaml::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl ZiError {
    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        ZiError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct schema errors.
    pub fn schema<T: Into<String>>(message: T) -> Self {
        ZiError::Schema {
            message: message.into(),
        }
    }

    /// Helper to construct circular reference errors.
    pub fn circular(clone_key: impl Into<String>, path: impl Into<String>, depth: usize) -> Self {
        ZiError::CircularReference {
            clone_key: clone_key.into(),
            path: path.into(),
            depth,
        }
    }

    /// Helper to construct duplicate layout errors.
    pub fn duplicate_layout(content_area: impl Into<String>, layout: impl Into<String>) -> Self {
        ZiError::DuplicateLayout {
            content_area: content_area.into(),
            layout: layout.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        ZiError::Internal(message.into())
    }
}
