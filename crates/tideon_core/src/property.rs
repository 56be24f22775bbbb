//! Property values
//!
//! Only [`PropertyValue::Number`] participates in tweening. Text values are
//! carried through untouched so adapters can expose labels, colors, and
//! similar non-numeric fields on the same bag.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping of property names to values
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// A single property value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f32),
    Text(String),
}

impl PropertyValue {
    /// The numeric payload, if this is a number
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Text(_) => None,
        }
    }

    /// The text payload, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Number(_) => None,
            PropertyValue::Text(s) => Some(s),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, PropertyValue::Number(_))
    }
}

impl Default for PropertyValue {
    fn default() -> Self {
        PropertyValue::Number(0.0)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value as f32)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Number(value as f32)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Number(n) => write!(f, "{n}"),
            PropertyValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}
