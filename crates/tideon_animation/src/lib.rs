//! Tideon Animation System
//!
//! Frame-stepped property tweens, easing, sequences, and stage programs.
//!
//! # Features
//!
//! - **Easing**: quadratic, cubic, expo, back, elastic, bounce, and drag curves
//! - **Tween Operators**: animate (eased delta), to, from, and mixed tweens
//! - **Sequences**: primitives chained so each completes before the next
//! - **Programs**: ordered stages advanced one tick at a time, optionally looping
//!
//! Nothing here keeps time. A driver calls [`Animator::tick`] at whatever
//! cadence it likes and every call advances at most one frame.
//!
//! # Example
//!
//! ```rust
//! use tideon_animation::{Animator, Easing, Mutation};
//! use tideon_core::{shared, PropertyBag, Target};
//!
//! let bag = shared(PropertyBag::new().with("x", 0.0));
//! let mut animator = Animator::new();
//! animator.standalone_animate(
//!     10,
//!     vec![Mutation::new(bag.clone()).change("x", 100.0).ease(Easing::EaseOut)],
//! );
//!
//! for _ in 0..10 {
//!     animator.tick();
//! }
//! assert_eq!(bag.lock().unwrap().number("x"), Some(100.0));
//! ```

pub mod animator;
pub mod curve;
pub mod easing;
pub mod playhead;
pub mod program;
pub mod sequence;
pub mod tween;

pub use animator::{Animator, AnimatorConfig};
pub use curve::{catmull_rom, CurvePath, Point};
pub use easing::{Easing, UnknownEasing};
pub use playhead::{CacheKey, Playhead, Progress, ScopedCache};
pub use program::{DirectStage, Program, Resolution, Stage, StageFn, StageFnId, StageRegistry};
pub use sequence::Sequence;
pub use tween::{MixTag, Mutation, Operator, Primitive, TaggedMutation};
