//! The animator: playhead + program behind one handle
//!
//! Operator methods build [`Primitive`]s with their durations normalized
//! against the current delay multiplier. The `standalone_*` variants wrap
//! the primitive in a one-item sequence and append it as a stage.

use tideon_core::{PropertyValue, SharedTarget};

use crate::curve::{CurvePath, PathFollow, Point};
use crate::easing::Easing;
use crate::playhead::{Playhead, Progress};
use crate::program::{Program, Stage, StageFnId, StageRegistry};
use crate::tween::{Mutation, Primitive, TaggedMutation};

/// Animator configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatorConfig {
    /// Multiplier applied to every duration at construction time
    pub delay_mult: f32,
    /// Restart from the first stage after the last one completes
    pub looping: bool,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            delay_mult: 1.0,
            looping: false,
        }
    }
}

/// A frame-stepped animation engine instance
///
/// Each animator owns its playhead, stages, and caches exclusively.
/// Independent animators can be ticked at unrelated cadences.
#[derive(Default)]
pub struct Animator {
    playhead: Playhead,
    program: Program,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnimatorConfig) -> Self {
        let mut animator = Self::new();
        animator.set_delay_mult(config.delay_mult);
        animator.set_looping(config.looping);
        animator
    }

    /// Advance the program by one frame
    pub fn tick(&mut self) {
        self.program.tick(&mut self.playhead);
    }

    pub fn add_stage(&mut self, stage: impl Into<Stage>) {
        self.program.add_stage(stage);
    }

    /// Register a stage function for [`Stage::Named`] lookups
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> StageFnId
    where
        F: FnMut(&mut Playhead, &[PropertyValue]) -> Progress + Send + 'static,
    {
        self.program.registry_mut().register(name, f)
    }

    pub fn registry(&self) -> &StageRegistry {
        self.program.registry()
    }

    pub fn registry_mut(&mut self) -> &mut StageRegistry {
        self.program.registry_mut()
    }

    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }

    pub fn playhead_mut(&mut self) -> &mut Playhead {
        &mut self.playhead
    }

    /// See [`Playhead::set_delay_mult`]
    pub fn set_delay_mult(&mut self, mult: f32) {
        self.playhead.set_delay_mult(mult);
    }

    pub fn delay_mult(&self) -> f32 {
        self.playhead.delay_mult()
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.program.set_looping(looping);
    }

    pub fn is_looping(&self) -> bool {
        self.program.is_looping()
    }

    pub fn is_running(&self) -> bool {
        self.program.is_running()
    }

    pub fn is_finished(&self) -> bool {
        self.program.is_finished()
    }

    pub fn current_stage(&self) -> usize {
        self.program.current_stage()
    }

    pub fn stage_count(&self) -> usize {
        self.program.stage_count()
    }

    pub fn frame(&self) -> u32 {
        self.playhead.frame()
    }

    pub fn sequence_step(&self) -> usize {
        self.playhead.sequence_step()
    }

    /// Drop every stage and rewind the program and playhead cursors
    ///
    /// A primitive interrupted here does not restore its targets.
    pub fn clear_stages(&mut self) {
        self.program.clear_stages();
        self.playhead.set_sequence_step(0);
        self.playhead.rewind_frame();
        self.playhead.complete_sequence();
    }

    fn tween_frames(&self, duration: u32, empty: bool) -> u32 {
        if empty {
            0
        } else {
            self.playhead.tween_frames(duration)
        }
    }

    /// Eased delta: each property moves from its start to `start + delta`
    pub fn animate(&self, duration: u32, mutations: Vec<Mutation>) -> Primitive {
        let frames = self.tween_frames(duration, mutations.is_empty());
        Primitive::animate(frames, mutations)
    }

    /// Converge on absolute target values
    pub fn to(&self, duration: u32, mutations: Vec<Mutation>) -> Primitive {
        let frames = self.tween_frames(duration, mutations.is_empty());
        Primitive::to(frames, mutations)
    }

    /// Jump by the delta, then return to the original values
    pub fn from(&self, duration: u32, mutations: Vec<Mutation>) -> Primitive {
        let frames = self.tween_frames(duration, mutations.is_empty());
        Primitive::from(frames, mutations)
    }

    pub fn mix(&self, duration: u32, mutations: Vec<TaggedMutation>) -> Primitive {
        let frames = self.tween_frames(duration, mutations.is_empty());
        Primitive::mix(frames, mutations)
    }

    /// Call `f` with the frame index once per frame
    pub fn func(&self, duration: u32, f: impl FnMut(u32) + Send + 'static) -> Primitive {
        Primitive::func(self.playhead.tween_frames(duration), f)
    }

    /// Wait without touching any target
    ///
    /// Unlike the tweens, a zero delay stays zero and completes immediately.
    pub fn delay(&self, duration: u32) -> Primitive {
        Primitive::delay(self.playhead.scale(duration))
    }

    /// Move `target`'s `x`/`y` along a spline through `points`
    ///
    /// Returns `None` for fewer than two points.
    pub fn curve(
        &self,
        target: SharedTarget,
        points: Vec<Point>,
        duration: u32,
        easing: Easing,
    ) -> Option<Primitive> {
        let path = CurvePath::new(points)?;
        let frames = self.playhead.tween_frames(duration);
        Some(Primitive::curve(
            frames,
            PathFollow {
                target,
                path,
                easing,
            },
        ))
    }

    pub fn standalone_animate(&mut self, duration: u32, mutations: Vec<Mutation>) {
        let primitive = self.animate(duration, mutations);
        self.add_stage(primitive);
    }

    pub fn standalone_to(&mut self, duration: u32, mutations: Vec<Mutation>) {
        let primitive = self.to(duration, mutations);
        self.add_stage(primitive);
    }

    pub fn standalone_from(&mut self, duration: u32, mutations: Vec<Mutation>) {
        let primitive = self.from(duration, mutations);
        self.add_stage(primitive);
    }

    pub fn standalone_mix(&mut self, duration: u32, mutations: Vec<TaggedMutation>) {
        let primitive = self.mix(duration, mutations);
        self.add_stage(primitive);
    }

    pub fn standalone_func(&mut self, duration: u32, f: impl FnMut(u32) + Send + 'static) {
        let primitive = self.func(duration, f);
        self.add_stage(primitive);
    }

    pub fn standalone_delay(&mut self, duration: u32) {
        let primitive = self.delay(duration);
        self.add_stage(primitive);
    }

    /// Schedule a curve; degenerate paths are skipped with a warning
    pub fn standalone_curve(
        &mut self,
        target: SharedTarget,
        points: Vec<Point>,
        duration: u32,
        easing: Easing,
    ) {
        let count = points.len();
        match self.curve(target, points, duration, easing) {
            Some(primitive) => self.add_stage(primitive),
            None => tracing::warn!(points = count, "Curve needs at least two points, skipped"),
        }
    }
}
