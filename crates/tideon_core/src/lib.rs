//! Tideon Core
//!
//! The boundary between the tweening engine and whatever it animates:
//!
//! - **Property values**: numbers that can be tweened, text that passes through
//! - **Targets**: anything exposing named properties that can be read and written
//! - **Property bags**: an insertion-ordered, in-memory target
//!
//! # Example
//!
//! ```rust
//! use tideon_core::{PropertyBag, PropertyValue, Target};
//!
//! let mut bag = PropertyBag::new().with("x", 10.0).with("label", "box");
//!
//! bag.set("x", PropertyValue::Number(25.0));
//! assert_eq!(bag.number("x"), Some(25.0));
//!
//! // Text is readable but never numeric
//! assert_eq!(bag.number("label"), None);
//! ```

pub mod error;
pub mod property;
pub mod target;

pub use error::{PropertyError, Result};
pub use property::{PropertyMap, PropertyValue};
pub use target::{shared, with_target, PropertyBag, SharedTarget, Target};
