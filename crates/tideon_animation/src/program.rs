//! Stage program
//!
//! A program is an ordered list of stages advanced one at a time. Each stage
//! produces (and resumes) one sequence: either a [`Sequence`] the program
//! owns, a callable that drives the playhead directly, or a name resolved
//! through the [`StageRegistry`] on every tick.
//!
//! When the last stage completes the program either stops or, if looping,
//! wraps back to the first stage. `running` drops to `false` on the tick
//! that observes the end, and comes back on the next productive tick.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use tideon_core::PropertyValue;

use crate::playhead::{Playhead, Progress};
use crate::sequence::Sequence;
use crate::tween::Primitive;

new_key_type! {
    /// Handle to a registered stage function
    pub struct StageFnId;
}

/// A stage function looked up by name
pub type StageFn = dyn FnMut(&mut Playhead, &[PropertyValue]) -> Progress + Send;

/// A stage callable that drives the playhead directly
pub type DirectStage = Box<dyn FnMut(&mut Playhead) -> Progress + Send>;

/// One entry in a program
pub enum Stage {
    /// An owned sequence
    Sequence(Sequence),
    /// A callable, typically wrapping its own sequence
    Direct(DirectStage),
    /// A registry entry, resolved each tick
    Named {
        name: String,
        args: Vec<PropertyValue>,
    },
}

impl Stage {
    pub fn direct<F>(f: F) -> Self
    where
        F: FnMut(&mut Playhead) -> Progress + Send + 'static,
    {
        Stage::Direct(Box::new(f))
    }

    pub fn named(name: impl Into<String>, args: Vec<PropertyValue>) -> Self {
        Stage::Named {
            name: name.into(),
            args,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Stage::Sequence(_) => "sequence",
            Stage::Direct(_) => "direct",
            Stage::Named { .. } => "named",
        }
    }
}

impl From<Sequence> for Stage {
    fn from(sequence: Sequence) -> Self {
        Stage::Sequence(sequence)
    }
}

impl From<Primitive> for Stage {
    fn from(primitive: Primitive) -> Self {
        Stage::Sequence(Sequence::from(primitive))
    }
}

/// Result of a registry lookup
pub enum Resolution<'a> {
    Found(&'a mut StageFn),
    NotFound,
}

/// Name to stage-function registry
#[derive(Default)]
pub struct StageRegistry {
    functions: SlotMap<StageFnId, Box<StageFn>>,
    by_name: FxHashMap<String, StageFnId>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name`, replacing any function already there
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> StageFnId
    where
        F: FnMut(&mut Playhead, &[PropertyValue]) -> Progress + Send + 'static,
    {
        let name = name.into();
        let id = self.functions.insert(Box::new(f));
        if let Some(old) = self.by_name.insert(name.clone(), id) {
            self.functions.remove(old);
            tracing::debug!(stage = %name, "Stage function replaced");
        }
        id
    }

    /// Remove the function registered under `name`
    pub fn unregister(&mut self, name: &str) -> bool {
        match self.by_name.remove(name) {
            Some(id) => self.functions.remove(id).is_some(),
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn id(&self, name: &str) -> Option<StageFnId> {
        self.by_name.get(name).copied()
    }

    pub fn resolve(&mut self, name: &str) -> Resolution<'_> {
        let Some(id) = self.by_name.get(name) else {
            return Resolution::NotFound;
        };
        match self.functions.get_mut(*id) {
            Some(f) => Resolution::Found(f.as_mut()),
            None => Resolution::NotFound,
        }
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Ordered stages plus the program cursor
#[derive(Default)]
pub struct Program {
    stages: Vec<Stage>,
    index: usize,
    looping: bool,
    running: bool,
    registry: StageRegistry,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stage(&mut self, stage: impl Into<Stage>) {
        let stage = stage.into();
        tracing::debug!(
            kind = stage.kind(),
            position = self.stages.len(),
            "Stage added"
        );
        self.stages.push(stage);
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut StageRegistry {
        &mut self.registry
    }

    /// Advance the current stage by one call
    pub fn tick(&mut self, playhead: &mut Playhead) {
        let Self {
            stages,
            index,
            looping,
            running,
            registry,
        } = self;

        if *index >= stages.len() {
            if *looping {
                *index = 0;
                tracing::debug!(stages = stages.len(), "Program wrapped");
            }
            *running = false;
            return;
        }

        *running = true;
        let progress = match &mut stages[*index] {
            Stage::Sequence(sequence) => sequence.advance(playhead),
            Stage::Direct(f) => f(playhead),
            Stage::Named { name, args } => match registry.resolve(name) {
                Resolution::Found(f) => f(playhead, args.as_slice()),
                Resolution::NotFound => {
                    tracing::trace!(stage = %name, "No stage function registered");
                    Progress::Continue
                }
            },
        };

        if progress.is_done() {
            playhead.set_sequence_step(0);
            tracing::debug!(stage = *index, "Stage complete");
            *index += 1;
        }
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Index of the stage the next tick will advance
    pub fn current_stage(&self) -> usize {
        self.index
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Takes effect the next time the end of the program is reached
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// True once every stage has completed and the program will not wrap
    pub fn is_finished(&self) -> bool {
        !self.looping && self.index >= self.stages.len()
    }

    /// Drop every stage and rewind to the start
    pub fn clear_stages(&mut self) {
        tracing::debug!(stages = self.stages.len(), "Stages cleared");
        self.stages.clear();
        self.index = 0;
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn instant() -> Stage {
        Stage::from(Primitive::delay(0))
    }

    #[test]
    fn test_looping_program_wraps() {
        let mut program = Program::new();
        let mut playhead = Playhead::new();
        program.set_looping(true);
        program.add_stage(instant());
        program.add_stage(instant());

        program.tick(&mut playhead);
        assert_eq!(program.current_stage(), 1);
        assert!(program.is_running());

        program.tick(&mut playhead);
        assert_eq!(program.current_stage(), 2);
        assert!(program.is_running());

        program.tick(&mut playhead);
        assert_eq!(program.current_stage(), 0);
        assert!(!program.is_running());

        program.tick(&mut playhead);
        assert_eq!(program.current_stage(), 1);
        assert!(program.is_running());
        assert!(!program.is_finished());
    }

    #[test]
    fn test_looping_program_wraps_after_one_frame_stages() {
        let mut program = Program::new();
        let mut playhead = Playhead::new();
        program.set_looping(true);
        program.add_stage(Stage::from(Primitive::delay(1)));
        program.add_stage(Stage::from(Primitive::delay(1)));

        // Each stage takes its frame plus the call that reports it done
        let mut trail = Vec::new();
        for _ in 0..6 {
            program.tick(&mut playhead);
            trail.push((program.current_stage(), program.is_running()));
        }

        assert_eq!(
            trail,
            vec![
                (0, true),
                (1, true),
                (1, true),
                (2, true),
                (0, false),
                (0, true),
            ]
        );
    }

    #[test]
    fn test_non_looping_program_stops() {
        let mut program = Program::new();
        let mut playhead = Playhead::new();
        program.add_stage(instant());

        program.tick(&mut playhead);
        assert!(program.is_running());
        assert!(program.is_finished());

        for _ in 0..3 {
            program.tick(&mut playhead);
            assert!(!program.is_running());
            assert_eq!(program.current_stage(), 1);
        }
    }

    #[test]
    fn test_stage_completion_resets_sequence_step() {
        let mut program = Program::new();
        let mut playhead = Playhead::new();
        program.add_stage(Sequence::new().then(Primitive::delay(1)).then(Primitive::delay(1)));
        program.add_stage(Primitive::delay(5));

        for _ in 0..3 {
            program.tick(&mut playhead);
        }
        assert_eq!(playhead.sequence_step(), 1);

        program.tick(&mut playhead);
        assert_eq!(program.current_stage(), 1);
        assert_eq!(playhead.sequence_step(), 0);
        assert_eq!(playhead.frame(), 0);
    }

    #[test]
    fn test_unknown_named_stage_is_a_no_op() {
        let mut program = Program::new();
        let mut playhead = Playhead::new();
        program.add_stage(Stage::named("missing", Vec::new()));

        for _ in 0..5 {
            program.tick(&mut playhead);
        }
        assert_eq!(program.current_stage(), 0);
        assert!(program.is_running());
        assert_eq!(playhead.frame(), 0);
    }

    #[test]
    fn test_named_stage_receives_args() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut program = Program::new();
        let mut playhead = Playhead::new();
        program.registry_mut().register("record", move |_playhead, args| {
            sink.lock().unwrap().extend_from_slice(args);
            Progress::Done
        });
        program.add_stage(Stage::named("record", vec![PropertyValue::Number(1.0), "fade".into()]));

        program.tick(&mut playhead);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![PropertyValue::Number(1.0), PropertyValue::Text("fade".into())]
        );
        assert_eq!(program.current_stage(), 1);
    }

    #[test]
    fn test_direct_stage_drives_its_own_sequence() {
        let mut program = Program::new();
        let mut playhead = Playhead::new();
        let mut sequence = Sequence::from(Primitive::delay(2));
        program.add_stage(Stage::direct(move |playhead| playhead.advance_sequence(&mut sequence)));

        program.tick(&mut playhead);
        program.tick(&mut playhead);
        assert_eq!(program.current_stage(), 0);

        program.tick(&mut playhead);
        assert_eq!(program.current_stage(), 1);
    }

    #[test]
    fn test_registry_replace_and_unregister() {
        let mut registry = StageRegistry::new();
        let first = registry.register("a", |_, _| Progress::Continue);
        let second = registry.register("a", |_, _| Progress::Done);

        assert_ne!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.id("a"), Some(second));

        let mut playhead = Playhead::new();
        match registry.resolve("a") {
            Resolution::Found(f) => assert!(f(&mut playhead, &[]).is_done()),
            Resolution::NotFound => panic!("expected stage function"),
        }

        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert!(!registry.contains("a"));
        assert!(matches!(registry.resolve("a"), Resolution::NotFound));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clear_stages_rewinds() {
        let mut program = Program::new();
        let mut playhead = Playhead::new();
        program.add_stage(instant());
        program.add_stage(instant());
        program.tick(&mut playhead);

        program.clear_stages();
        assert_eq!(program.stage_count(), 0);
        assert_eq!(program.current_stage(), 0);
        assert!(!program.is_running());
        assert!(program.is_finished());
    }
}
