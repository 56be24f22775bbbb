//! Playhead: frame counting and scoped capture caches
//!
//! The playhead is the mutable half of an [`Animator`](crate::Animator) that
//! primitives and sequences advance. It owns:
//!
//! - the frame counter of the primitive currently in flight
//! - the step index into the sequence currently in flight
//! - the delay multiplier applied when primitives are built
//! - four capture caches (values and memoized results, each scoped to either
//!   the current primitive or the current sequence)
//!
//! Caches are cleared only at their scope's completion boundary, so a value
//! captured on the first frame is seen unchanged by every later frame.

use rustc_hash::FxHashMap;
use tideon_core::PropertyValue;

/// Result of advancing any schedulable unit by one call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// More calls are needed
    Continue,
    /// The unit finished; this call did no per-frame work
    Done,
}

impl Progress {
    pub fn is_done(self) -> bool {
        matches!(self, Progress::Done)
    }

    pub fn is_continue(self) -> bool {
        matches!(self, Progress::Continue)
    }
}

/// Key into a capture cache
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Index(i64),
    Name(String),
}

impl From<i32> for CacheKey {
    fn from(index: i32) -> Self {
        CacheKey::Index(index as i64)
    }
}

impl From<i64> for CacheKey {
    fn from(index: i64) -> Self {
        CacheKey::Index(index)
    }
}

impl From<u32> for CacheKey {
    fn from(index: u32) -> Self {
        CacheKey::Index(index as i64)
    }
}

impl From<usize> for CacheKey {
    fn from(index: usize) -> Self {
        CacheKey::Index(index as i64)
    }
}

impl From<&str> for CacheKey {
    fn from(name: &str) -> Self {
        CacheKey::Name(name.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(name: String) -> Self {
        CacheKey::Name(name)
    }
}

/// First-write-wins storage cleared at a scope boundary
#[derive(Clone, Debug, Default)]
pub struct ScopedCache {
    values: FxHashMap<CacheKey, PropertyValue>,
}

impl ScopedCache {
    /// Store `value` under `key` unless something is already there; return
    /// the stored value either way
    pub fn capture(&mut self, key: CacheKey, value: PropertyValue) -> PropertyValue {
        self.values.entry(key).or_insert(value).clone()
    }

    /// Compute a value on first request and reuse it afterwards
    pub fn memoize(&mut self, key: CacheKey, f: impl FnOnce() -> PropertyValue) -> PropertyValue {
        self.values.entry(key).or_insert_with(f).clone()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Frame counter, sequence cursor, and scoped caches for one animator
#[derive(Clone, Debug)]
pub struct Playhead {
    frame: u32,
    sequence_step: usize,
    delay_mult: f32,
    primitive_values: ScopedCache,
    primitive_memo: ScopedCache,
    sequence_values: ScopedCache,
    sequence_memo: ScopedCache,
}

impl Playhead {
    pub fn new() -> Self {
        Self {
            frame: 0,
            sequence_step: 0,
            delay_mult: 1.0,
            primitive_values: ScopedCache::default(),
            primitive_memo: ScopedCache::default(),
            sequence_values: ScopedCache::default(),
            sequence_memo: ScopedCache::default(),
        }
    }

    /// Frame of the primitive currently in flight
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Index of the primitive currently in flight within its sequence
    pub fn sequence_step(&self) -> usize {
        self.sequence_step
    }

    pub fn delay_mult(&self) -> f32 {
        self.delay_mult
    }

    /// Change the duration multiplier for primitives built from now on
    ///
    /// Ignored while a primitive is mid-flight (`frame > 0`) and for
    /// non-positive values.
    pub fn set_delay_mult(&mut self, mult: f32) {
        if self.frame == 0 && mult > 0.0 {
            self.delay_mult = mult;
        } else {
            tracing::debug!(
                mult,
                frame = self.frame,
                "Delay multiplier change ignored"
            );
        }
    }

    /// Normalize a requested tween duration into a frame count
    ///
    /// Durations of one frame or less become exactly one frame; longer ones
    /// are scaled by the delay multiplier and floored. Flooring is not
    /// clamped, so with a multiplier below 0.5 a duration of 2 or more can
    /// come out as zero frames, and such a tween completes without touching
    /// its targets.
    pub fn tween_frames(&self, duration: u32) -> u32 {
        if duration <= 1 {
            1
        } else {
            self.scale(duration)
        }
    }

    /// Scale a frame count by the delay multiplier without the one-frame floor
    pub fn scale(&self, frames: u32) -> u32 {
        (frames as f32 * self.delay_mult).floor() as u32
    }

    /// Run `per_frame` for the current frame if fewer than `frame_count`
    /// frames have elapsed
    ///
    /// Reports [`Progress::Done`] on the call after the last frame, clearing
    /// the primitive-scoped caches. A `frame_count` of zero is done on the
    /// first call and never invokes `per_frame`.
    pub fn step(&mut self, frame_count: u32, per_frame: impl FnOnce(u32)) -> Progress {
        if self.frame < frame_count {
            per_frame(self.frame);
            self.frame += 1;
            Progress::Continue
        } else {
            self.primitive_values.clear();
            self.primitive_memo.clear();
            Progress::Done
        }
    }

    /// Capture a value for the rest of the current primitive
    pub fn capture(&mut self, key: impl Into<CacheKey>, value: impl Into<PropertyValue>) -> PropertyValue {
        self.primitive_values.capture(key.into(), value.into())
    }

    /// Capture a value for the rest of the current sequence
    pub fn capture_in_sequence(
        &mut self,
        key: impl Into<CacheKey>,
        value: impl Into<PropertyValue>,
    ) -> PropertyValue {
        self.sequence_values.capture(key.into(), value.into())
    }

    /// Compute once per primitive and reuse on later frames
    pub fn memo(
        &mut self,
        key: impl Into<CacheKey>,
        f: impl FnOnce() -> PropertyValue,
    ) -> PropertyValue {
        self.primitive_memo.memoize(key.into(), f)
    }

    /// Compute once per sequence and reuse on later frames
    pub fn memo_in_sequence(
        &mut self,
        key: impl Into<CacheKey>,
        f: impl FnOnce() -> PropertyValue,
    ) -> PropertyValue {
        self.sequence_memo.memoize(key.into(), f)
    }

    pub fn primitive_cache(&self) -> &ScopedCache {
        &self.primitive_values
    }

    pub fn sequence_cache(&self) -> &ScopedCache {
        &self.sequence_values
    }

    /// Rewind the frame counter so the next primitive starts at frame zero
    pub(crate) fn rewind_frame(&mut self) {
        self.frame = 0;
    }

    pub(crate) fn set_sequence_step(&mut self, step: usize) {
        self.sequence_step = step;
    }

    /// Clear the sequence-scoped caches
    pub(crate) fn complete_sequence(&mut self) {
        self.sequence_values.clear();
        self.sequence_memo.clear();
    }
}

impl Default for Playhead {
    fn default() -> Self {
        Self::new()
    }
}
