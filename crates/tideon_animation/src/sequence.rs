//! Sequences: primitives run to completion one after another

use crate::playhead::{Playhead, Progress};
use crate::tween::Primitive;

/// An ordered chain of primitives
///
/// The cursor lives on the [`Playhead`] (`sequence_step`), not here, so a
/// sequence can be rebuilt or swapped without losing program position.
#[derive(Default)]
pub struct Sequence {
    primitives: Vec<Primitive>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a primitive
    pub fn then(mut self, primitive: Primitive) -> Self {
        self.primitives.push(primitive);
        self
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Advance the primitive under the playhead's cursor by one call
    ///
    /// Reports [`Progress::Done`] once, on the call that completes the last
    /// primitive. The cursor then sits one past the end, and further calls
    /// are no-ops reporting [`Progress::Continue`] until the program resets
    /// it.
    pub fn advance(&mut self, playhead: &mut Playhead) -> Progress {
        let step = playhead.sequence_step();
        let len = self.primitives.len();

        if len == 0 {
            if step == 0 {
                playhead.set_sequence_step(1);
                playhead.complete_sequence();
                return Progress::Done;
            }
            return Progress::Continue;
        }

        let Some(primitive) = self.primitives.get_mut(step) else {
            tracing::trace!(step, len, "Sequence past end");
            return Progress::Continue;
        };

        if primitive.advance(playhead).is_continue() {
            return Progress::Continue;
        }

        playhead.rewind_frame();
        let next = step + 1;
        if next == len {
            playhead.set_sequence_step(next + 1);
            playhead.complete_sequence();
            tracing::trace!(len, "Sequence complete");
            Progress::Done
        } else {
            playhead.set_sequence_step(next);
            Progress::Continue
        }
    }
}

impl FromIterator<Primitive> for Sequence {
    fn from_iter<I: IntoIterator<Item = Primitive>>(iter: I) -> Self {
        Self {
            primitives: iter.into_iter().collect(),
        }
    }
}

impl From<Primitive> for Sequence {
    fn from(primitive: Primitive) -> Self {
        Self {
            primitives: vec![primitive],
        }
    }
}

impl Playhead {
    /// Advance `sequence` by one call; see [`Sequence::advance`]
    pub fn advance_sequence(&mut self, sequence: &mut Sequence) -> Progress {
        sequence.advance(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tideon_core::{shared, PropertyBag, Target};

    use crate::tween::Mutation;

    fn counting(frames: u32, log: &Arc<Mutex<Vec<(usize, u32)>>>, id: usize) -> Primitive {
        let log = log.clone();
        Primitive::func(frames, move |frame| log.lock().unwrap().push((id, frame)))
    }

    #[test]
    fn test_sequence_call_count() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut seq: Sequence = [2, 3, 1]
            .into_iter()
            .enumerate()
            .map(|(id, frames)| counting(frames, &log, id))
            .collect();
        let mut playhead = Playhead::new();

        // Each primitive needs d + 1 calls
        let total = (2 + 1) + (3 + 1) + (1 + 1);
        for _ in 0..total - 1 {
            assert_eq!(playhead.advance_sequence(&mut seq), Progress::Continue);
        }
        assert_eq!(playhead.advance_sequence(&mut seq), Progress::Done);

        assert_eq!(
            *log.lock().unwrap(),
            vec![(0, 0), (0, 1), (1, 0), (1, 1), (1, 2), (2, 0)]
        );
        assert_eq!(playhead.frame(), 0);
        assert_eq!(playhead.sequence_step(), 4);
    }

    #[test]
    fn test_past_end_does_not_rerun() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut seq = Sequence::new().then(counting(1, &log, 0));
        let mut playhead = Playhead::new();

        playhead.advance_sequence(&mut seq);
        assert!(playhead.advance_sequence(&mut seq).is_done());

        for _ in 0..3 {
            assert_eq!(playhead.advance_sequence(&mut seq), Progress::Continue);
        }
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_sequence_is_done_once() {
        let mut seq = Sequence::new();
        let mut playhead = Playhead::new();

        assert_eq!(playhead.advance_sequence(&mut seq), Progress::Done);
        assert_eq!(playhead.advance_sequence(&mut seq), Progress::Continue);
    }

    #[test]
    fn test_sequence_caches_cleared_on_completion() {
        let mut seq = Sequence::from(Primitive::delay(1));
        let mut playhead = Playhead::new();

        playhead.capture_in_sequence("origin", 3.0);
        playhead.advance_sequence(&mut seq);
        assert_eq!(playhead.sequence_cache().len(), 1);

        playhead.advance_sequence(&mut seq);
        assert!(playhead.sequence_cache().is_empty());
    }

    #[test]
    fn test_next_primitive_starts_at_frame_zero() {
        let bag = shared(PropertyBag::new().with("x", 0.0));
        let mut seq = Sequence::new()
            .then(Primitive::to(2, vec![Mutation::new(bag.clone()).change("x", 10.0)]))
            .then(Primitive::to(2, vec![Mutation::new(bag.clone()).change("x", 0.0)]));
        let mut playhead = Playhead::new();

        for _ in 0..3 {
            playhead.advance_sequence(&mut seq);
        }
        assert_eq!(bag.lock().unwrap().number("x"), Some(10.0));
        assert_eq!(playhead.frame(), 0);
        assert_eq!(playhead.sequence_step(), 1);

        playhead.advance_sequence(&mut seq);
        assert_eq!(bag.lock().unwrap().number("x"), Some(5.0));
        assert_eq!(playhead.frame(), 1);
    }
}
