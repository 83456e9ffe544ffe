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

//! Advisory lint for canonical sections.
//!
//! Unlike the transformer, the lint looks at what the author wrote rather
//! than what is missing: fields the layout does not declare and select
//! values outside a declared choice set. It never changes a section.

use serde_json::{Map, Value};

use crate::config::ZiTransformConfig;
use crate::schema::field::{join_path, ZiFieldDefinition, ZiFieldKind};
use crate::schema::layout::{ZiLayoutMatch, ZiLayoutSchemaMap};
use crate::section::ZiSection;
use crate::transformer::ZiTransformWarning;

#[derive(Debug)]
pub struct ZiSectionValidator<'a> {
    schema: &'a ZiLayoutSchemaMap,
    discriminator: &'a str,
}

impl<'a> ZiSectionValidator<'a> {
    pub fn new(schema: &'a ZiLayoutSchemaMap, config: &'a ZiTransformConfig) -> Self {
        Self {
            schema,
            discriminator: &config.discriminator_key,
        }
    }

    pub fn validate(&self, sections: &[ZiSection]) -> Vec<ZiTransformWarning> {
        let mut warnings = Vec::new();
        for (index, section) in sections.iter().enumerate() {
            match self.schema.classify(section.fields(), self.discriminator) {
                ZiLayoutMatch::Missing => warnings.push(ZiTransformWarning::MissingLayout { index }),
                ZiLayoutMatch::Unknown(layout) => warnings.push(ZiTransformWarning::UnknownLayout {
                    layout: layout.to_string(),
                }),
                ZiLayoutMatch::Known(layout) => {
                    self.check_fields(&layout.fields, section.fields(), &layout.name, "", &mut warnings)
                }
            }
        }
        warnings
    }

    fn check_fields(
        &self,
        fields: &[ZiFieldDefinition],
        input: &Map<String, Value>,
        layout: &str,
        prefix: &str,
        warnings: &mut Vec<ZiTransformWarning>,
    ) {
        for (key, value) in input {
            if prefix.is_empty() && key == self.discriminator {
                continue;
            }
            let path = join_path(prefix, key);
            let field = match fields.iter().find(|f| &f.name == key) {
                Some(field) => field,
                None => {
                    warnings.push(ZiTransformWarning::UnknownField {
                        layout: layout.to_string(),
                        path,
                    });
                    continue;
                }
            };
            self.check_value(field, value, layout, &path, warnings);
        }
    }

    fn check_value(
        &self,
        field: &ZiFieldDefinition,
        value: &Value,
        layout: &str,
        path: &str,
        warnings: &mut Vec<ZiTransformWarning>,
    ) {
        match (&field.kind, value) {
            (ZiFieldKind::Group { fields }, Value::Object(map)) => {
                self.check_fields(fields, map, layout, path, warnings)
            }
            (ZiFieldKind::Repeater { fields }, Value::Array(rows)) => {
                for row in rows.iter().filter_map(Value::as_object) {
                    self.check_fields(fields, row, layout, path, warnings);
                }
            }
            (ZiFieldKind::Flexible { layouts }, Value::Array(rows)) => {
                for row in rows.iter().filter_map(Value::as_object) {
                    let name = row.get(self.discriminator).and_then(Value::as_str);
                    if let Some(nested) = layouts.iter().find(|l| Some(l.name.as_str()) == name) {
                        self.check_nested_row(&nested.fields, row, layout, path, warnings);
                    }
                }
            }
            (ZiFieldKind::Scalar { choices: Some(choices), .. }, _) => {
                if !value_in_choices(value, |choice| choices.contains_key(choice)) {
                    warnings.push(ZiTransformWarning::InvalidChoice {
                        layout: layout.to_string(),
                        path: path.to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    fn check_nested_row(
        &self,
        fields: &[ZiFieldDefinition],
        row: &Map<String, Value>,
        layout: &str,
        prefix: &str,
        warnings: &mut Vec<ZiTransformWarning>,
    ) {
        let mut rest = row.clone();
        rest.remove(self.discriminator);
        self.check_fields(fields, &rest, layout, prefix, warnings);
    }
}

/// Empty strings and non-string values are not choice violations.
fn value_in_choices(value: &Value, contains: impl Fn(&str) -> bool) -> bool {
    match value {
        Value::String(s) => s.is_empty() || contains(s),
        Value::Array(items) => items
            .iter()
            .all(|item| item.as_str().map_or(true, |s| s.is_empty() || contains(s))),
        _ => true,
    }
}
