// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of MATE HOME.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Legacy tagged attribute encoding
//!
//! One historical backend path serves readings where every scalar is wrapped
//! in a single-key envelope:
//!
//! ```json
//! {
//!   "sname": { "S": "bagno" },
//!   "ts": { "S": "2024-01-01T00:00:00Z" },
//!   "Activity": { "M": { "activity": { "M": {
//!     "all": { "L": [ { "N": "12" } ] },
//!     "breath": { "L": [ { "N": "4" } ] }
//!   } } } }
//! }
//! ```
//!
//! Decoding is total: anything that is not a recognised envelope is treated as
//! a missing value, so lookups through [`AttributeValue`] degrade to `None`
//! instead of failing the whole payload.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// One tagged value of the legacy encoding
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// `{ "S": "..." }`
    S(String),
    /// `{ "N": "..." }`, kept as the raw numeric string
    N(String),
    /// `{ "BOOL": true }`
    Bool(bool),
    /// `{ "NULL": true }`, also used for unrecognised list items
    Null,
    /// `{ "L": [ ... ] }`
    L(Vec<AttributeValue>),
    /// `{ "M": { ... } }`
    M(AttributeMap),
}

impl AttributeValue {
    /// Decode a single envelope, `None` when the value is not one
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.len() != 1 {
            return None;
        }
        let (tag, inner) = object.iter().next()?;

        match tag.as_str() {
            "S" => inner.as_str().map(|s| Self::S(s.to_owned())),
            "N" => match inner {
                Value::String(s) => Some(Self::N(s.clone())),
                Value::Number(n) => Some(Self::N(n.to_string())),
                _ => None,
            },
            "BOOL" => inner.as_bool().map(Self::Bool),
            "NULL" => Some(Self::Null),
            "L" => inner.as_array().map(|items| {
                Self::L(
                    items
                        .iter()
                        .map(|item| Self::from_json(item).unwrap_or(Self::Null))
                        .collect(),
                )
            }),
            "M" => inner.as_object().map(|fields| Self::M(decode_fields(fields))),
            _ => None,
        }
    }

    pub fn as_s(&self) -> Option<&str> {
        if let Self::S(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    pub fn as_n(&self) -> Option<&str> {
        if let Self::N(n) = self {
            Some(n.as_str())
        } else {
            None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    pub fn as_l(&self) -> Option<&[AttributeValue]> {
        if let Self::L(items) = self {
            Some(items.as_slice())
        } else {
            None
        }
    }

    pub fn as_m(&self) -> Option<&AttributeMap> {
        if let Self::M(fields) = self {
            Some(fields)
        } else {
            None
        }
    }

    /// Field of a map value
    pub fn field(&self, name: &str) -> Option<&AttributeValue> {
        self.as_m()?.get(name)
    }

    /// Walk nested maps, e.g. `["activity", "all"]` on `Activity`
    pub fn path(&self, names: &[&str]) -> Option<&AttributeValue> {
        names
            .iter()
            .try_fold(self, |value, name| value.field(name))
    }

    /// Raw numeric string of the first list element (`L[0].N`)
    pub fn first_n(&self) -> Option<&str> {
        self.as_l()?.first()?.as_n()
    }

    /// Numeric value parsed as float, `None` when absent or unparseable
    pub fn as_f64(&self) -> Option<f64> {
        self.as_n()?.trim().parse().ok()
    }
}

fn decode_fields(fields: &serde_json::Map<String, Value>) -> AttributeMap {
    fields
        .iter()
        .filter_map(|(name, value)| {
            AttributeValue::from_json(value).map(|decoded| (name.clone(), decoded))
        })
        .collect()
}

/// A reading in the legacy tagged encoding
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct RawLegacyReading {
    attributes: AttributeMap,
}

impl RawLegacyReading {
    pub fn new(attributes: AttributeMap) -> Self {
        Self { attributes }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }
}

impl From<Value> for RawLegacyReading {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::new(decode_fields(&fields)),
            _ => Self::default(),
        }
    }
}

/// Item of the legacy readings endpoint: `{ "reading": { ... } }`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeviceReadingItem {
    #[serde(default)]
    pub reading: RawLegacyReading,
}
