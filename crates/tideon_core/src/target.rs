//! Animation targets
//!
//! A target is anything with named properties the engine can read and write.
//! The engine never owns a target: callers hand it a [`SharedTarget`] and keep
//! their own handle to observe the result.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{PropertyError, Result};
use crate::property::{PropertyMap, PropertyValue};

/// A read/write property surface
pub trait Target: Send {
    /// Read a property, `None` if the target has no such property
    fn get(&self, property: &str) -> Option<PropertyValue>;

    /// Write a property
    fn set(&mut self, property: &str, value: PropertyValue);

    /// Read a property as a number, `None` for missing or non-numeric values
    fn number(&self, property: &str) -> Option<f32> {
        self.get(property).and_then(|v| v.as_number())
    }
}

/// Shared handle to a target, as stored inside animation primitives
pub type SharedTarget = Arc<Mutex<dyn Target>>;

/// Wrap a target so it can be handed to the engine
///
/// The returned handle coerces to [`SharedTarget`] while keeping the concrete
/// type available to the caller.
pub fn shared<T: Target + 'static>(target: T) -> Arc<Mutex<T>> {
    Arc::new(Mutex::new(target))
}

/// Run `f` with exclusive access to a shared target
pub fn with_target<R>(target: &SharedTarget, f: impl FnOnce(&mut dyn Target) -> R) -> Result<R> {
    let mut guard = target.lock().map_err(|_| PropertyError::Poisoned)?;
    Ok(f(&mut *guard))
}

/// An insertion-ordered in-memory target
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag {
    properties: PropertyMap,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bag from an existing property map
    pub fn from_map(properties: PropertyMap) -> Self {
        Self { properties }
    }

    /// Builder: declare a property with its initial value
    pub fn with(mut self, property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }

    /// Declare (or overwrite) a property
    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(property.into(), value.into());
    }

    /// Update several declared properties at once
    ///
    /// Known properties are written even when some names are unknown; the
    /// first unknown name is reported.
    pub fn set_all<K, V, I>(&mut self, values: I) -> Result<()>
    where
        K: AsRef<str>,
        V: Into<PropertyValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut first_unknown = None;
        for (key, value) in values {
            let key = key.as_ref();
            match self.properties.get_mut(key) {
                Some(slot) => *slot = value.into(),
                None => {
                    tracing::warn!(property = key, "Unknown property");
                    first_unknown.get_or_insert_with(|| key.to_string());
                }
            }
        }

        match first_unknown {
            Some(key) => Err(PropertyError::Unknown(key)),
            None => Ok(()),
        }
    }

    pub fn contains(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy of the current property values
    pub fn snapshot(&self) -> PropertyMap {
        self.properties.clone()
    }
}

impl Target for PropertyBag {
    fn get(&self, property: &str) -> Option<PropertyValue> {
        self.properties.get(property).cloned()
    }

    fn set(&mut self, property: &str, value: PropertyValue) {
        match self.properties.get_mut(property) {
            Some(slot) => *slot = value,
            None => {
                self.properties.insert(property.to_string(), value);
            }
        }
    }
}
