//! Tween operators
//!
//! A [`Primitive`] is the smallest schedulable unit: a frame count plus
//! what to do on each frame. The tween operators differ only in how each
//! property moves:
//!
//! - **animate**: eased interpolation from the captured start to `start + delta`
//! - **to**: fixed per-frame nudges converging on an absolute target
//! - **from**: jump to `start + delta`, then nudge back to the start in
//!   equal steps
//! - **mix**: per-item choice of from/to/animate, sharing one offset guard
//!
//! Start values are captured on a primitive's first frame and held by the
//! primitive itself, so two primitives can never observe each other's
//! captures. Capture state is dropped when the primitive completes, which
//! lets a looping program replay it against fresh start values.

use smallvec::SmallVec;
use tideon_core::{with_target, PropertyMap, PropertyValue, SharedTarget};

use crate::curve::PathFollow;
use crate::easing::Easing;
use crate::playhead::{Playhead, Progress};

/// One target and the property changes to apply to it
#[derive(Clone)]
pub struct Mutation {
    pub target: SharedTarget,
    /// Deltas (animate/from) or absolute targets (to); text entries are ignored
    pub changes: PropertyMap,
    /// Only consulted by the animate operator
    pub easing: Easing,
}

impl Mutation {
    pub fn new(target: SharedTarget) -> Self {
        Self {
            target,
            changes: PropertyMap::default(),
            easing: Easing::Linear,
        }
    }

    /// Builder: add a property change
    pub fn change(mut self, property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.changes.insert(property.into(), value.into());
        self
    }

    /// Builder: set the easing
    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Tag this mutation for use in a mixed tween
    pub fn tagged(self, tag: MixTag) -> TaggedMutation {
        TaggedMutation {
            tag,
            mutation: self,
        }
    }
}

/// Per-item behaviour inside a mixed tween
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MixTag {
    /// Offset immediately, then return to the original value
    From,
    /// Converge on an absolute target value
    To,
    /// Flat per-frame delta, no easing
    Animate,
}

/// A mutation tagged for a mixed tween
#[derive(Clone)]
pub struct TaggedMutation {
    pub tag: MixTag,
    pub mutation: Mutation,
}

/// Which operator built a primitive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Animate,
    To,
    From,
    Mix,
    Func,
    Delay,
    Curve,
}

impl Operator {
    pub fn name(self) -> &'static str {
        match self {
            Operator::Animate => "animate",
            Operator::To => "to",
            Operator::From => "from",
            Operator::Mix => "mix",
            Operator::Func => "func",
            Operator::Delay => "delay",
            Operator::Curve => "curve",
        }
    }
}

/// How a single property moves across the frames of a tween
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Motion {
    /// Absolute eased interpolation, start to start + delta
    Eased,
    /// Fixed nudges toward an absolute target
    Converge,
    /// Fixed nudges of delta / duration
    Flat,
    /// Offset to start + delta on the first frame, then nudge back to start
    Return,
}

impl Motion {
    fn slot(self, current: f32, change: f32) -> Slot {
        match self {
            Motion::Converge => Slot {
                start: current,
                end: change,
            },
            Motion::Eased | Motion::Flat | Motion::Return => Slot {
                start: current,
                end: current + change,
            },
        }
    }
}

/// Captured endpoints of one (mutation, property) pair
#[derive(Clone, Copy, Debug, PartialEq)]
struct Slot {
    start: f32,
    end: f32,
}

/// First-frame state owned by a primitive
///
/// `slots` follows mutation order, then property order within each
/// mutation; `None` marks a property that does not participate.
#[derive(Debug, Default)]
struct Capture {
    slots: SmallVec<[Option<Slot>; 4]>,
    captured: bool,
    offset_applied: bool,
}

impl Capture {
    fn reset(&mut self) {
        self.slots.clear();
        self.captured = false;
        self.offset_applied = false;
    }
}

struct TweenItem {
    motion: Motion,
    mutation: Mutation,
}

struct Tween {
    items: Vec<TweenItem>,
}

impl Tween {
    fn capture(&self, capture: &mut Capture) {
        capture.slots.clear();
        for TweenItem { motion, mutation } in &self.items {
            for (property, change) in &mutation.changes {
                let slot = change.as_number().and_then(|change| {
                    read_number(&mutation.target, property).map(|current| motion.slot(current, change))
                });
                capture.slots.push(slot);
            }
        }
        capture.captured = true;
    }

    fn apply_frame(&self, frame: u32, duration: u32, capture: &mut Capture) {
        if duration == 0 {
            return;
        }
        if !capture.captured {
            self.capture(capture);
        }

        let applying_offset = !capture.offset_applied;
        let last = frame + 1 >= duration;
        let frames = duration as f32;
        let progress = (frame as f32 / frames).min(1.0);

        let mut slots = capture.slots.iter();
        for TweenItem { motion, mutation } in &self.items {
            let target = &mutation.target;
            for property in mutation.changes.keys() {
                let Some(Some(slot)) = slots.next() else {
                    continue;
                };

                match motion {
                    Motion::Eased => {
                        let value = if last {
                            slot.end
                        } else {
                            slot.start + (slot.end - slot.start) * mutation.easing.apply(progress)
                        };
                        write_number(target, property, value);
                    }
                    Motion::Converge | Motion::Flat => {
                        if last {
                            write_number(target, property, slot.end);
                        } else {
                            nudge(target, property, (slot.end - slot.start) / frames);
                        }
                    }
                    Motion::Return => {
                        if last {
                            write_number(target, property, slot.start);
                        } else if applying_offset {
                            write_number(target, property, slot.end);
                        } else {
                            // Frame 0 is the offset; the return spans d - 1 frames
                            nudge(target, property, (slot.start - slot.end) / (frames - 1.0));
                        }
                    }
                }
            }
        }

        capture.offset_applied = true;
    }
}

fn read_number(target: &SharedTarget, property: &str) -> Option<f32> {
    with_target(target, |t| t.number(property)).ok().flatten()
}

fn write_number(target: &SharedTarget, property: &str, value: f32) {
    if with_target(target, |t| t.set(property, PropertyValue::Number(value))).is_err() {
        tracing::trace!(property, "Target unavailable, write skipped");
    }
}

/// Add `delta` to a numeric property; non-numeric values are left alone
fn nudge(target: &SharedTarget, property: &str, delta: f32) {
    let nudged = with_target(target, |t| match t.number(property) {
        Some(current) => t.set(property, PropertyValue::Number(current + delta)),
        None => tracing::trace!(property, "Non-numeric property skipped"),
    });
    if nudged.is_err() {
        tracing::trace!(property, "Target unavailable, nudge skipped");
    }
}

enum PrimitiveKind {
    Tween(Tween),
    Func(Box<dyn FnMut(u32) + Send>),
    Delay,
    Curve(PathFollow),
}

/// A schedulable animation unit
///
/// Built by the [`Animator`](crate::Animator) operator methods with its
/// duration already normalized. Safe to store and re-invoke every frame.
pub struct Primitive {
    operator: Operator,
    duration: u32,
    kind: PrimitiveKind,
    capture: Capture,
}

impl Primitive {
    fn new(operator: Operator, duration: u32, kind: PrimitiveKind) -> Self {
        Self {
            operator,
            duration,
            kind,
            capture: Capture::default(),
        }
    }

    fn tween(
        operator: Operator,
        duration: u32,
        items: impl IntoIterator<Item = (Motion, Mutation)>,
    ) -> Self {
        let items = items
            .into_iter()
            .map(|(motion, mutation)| TweenItem { motion, mutation })
            .collect();
        Self::new(operator, duration, PrimitiveKind::Tween(Tween { items }))
    }

    pub(crate) fn animate(frames: u32, mutations: Vec<Mutation>) -> Self {
        let items = mutations.into_iter().map(|m| (Motion::Eased, m));
        Self::tween(Operator::Animate, frames, items)
    }

    pub(crate) fn to(frames: u32, mutations: Vec<Mutation>) -> Self {
        let items = mutations.into_iter().map(|m| (Motion::Converge, m));
        Self::tween(Operator::To, frames, items)
    }

    pub(crate) fn from(frames: u32, mutations: Vec<Mutation>) -> Self {
        let items = mutations.into_iter().map(|m| (Motion::Return, m));
        Self::tween(Operator::From, frames, items)
    }

    pub(crate) fn mix(frames: u32, mutations: Vec<TaggedMutation>) -> Self {
        let items = mutations.into_iter().map(|TaggedMutation { tag, mutation }| {
            let motion = match tag {
                MixTag::From => Motion::Return,
                MixTag::To => Motion::Converge,
                MixTag::Animate => Motion::Flat,
            };
            (motion, mutation)
        });
        Self::tween(Operator::Mix, frames, items)
    }

    pub(crate) fn func(frames: u32, f: impl FnMut(u32) + Send + 'static) -> Self {
        Self::new(Operator::Func, frames, PrimitiveKind::Func(Box::new(f)))
    }

    pub(crate) fn delay(frames: u32) -> Self {
        Self::new(Operator::Delay, frames, PrimitiveKind::Delay)
    }

    pub(crate) fn curve(frames: u32, follow: PathFollow) -> Self {
        Self::new(Operator::Curve, frames, PrimitiveKind::Curve(follow))
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Normalized frame count
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Run one frame, or report completion
    pub fn advance(&mut self, playhead: &mut Playhead) -> Progress {
        let operator = self.operator;
        let duration = self.duration;
        let Self { kind, capture, .. } = self;

        let progress = playhead.step(duration, |frame| {
            tracing::trace!(operator = operator.name(), frame, duration, "Primitive frame");
            match kind {
                PrimitiveKind::Tween(tween) => tween.apply_frame(frame, duration, capture),
                PrimitiveKind::Func(f) => f(frame),
                PrimitiveKind::Delay => {}
                PrimitiveKind::Curve(follow) => follow.apply_frame(frame, duration),
            }
        });

        if progress.is_done() {
            capture.reset();
        }
        progress
    }
}
