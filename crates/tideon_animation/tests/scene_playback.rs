//! Integration test: a two-box scene played through the public API
//!
//! Stage 0 drives a multi-step sequence for `box1`; the remaining stages
//! are standalone tweens on `box2`. The program loops.

use std::sync::{Arc, Mutex};

use tideon_animation::{Animator, Easing, Mutation, Playhead, Progress, Sequence, Stage};
use tideon_core::{shared, PropertyBag, PropertyValue, Target};

type Bag = Arc<Mutex<PropertyBag>>;

fn box_bag() -> Bag {
    shared(
        PropertyBag::new()
            .with("x", 0.0)
            .with("y", 0.0)
            .with("opacity", 0.0)
            .with("width", 0.0)
            .with("height", 0.0)
            .with("rotation", 0.0)
            .with("label", "box"),
    )
}

fn num(bag: &Bag, property: &str) -> f32 {
    bag.lock().unwrap().number(property).unwrap()
}

fn ticks(animator: &mut Animator, n: usize) {
    for _ in 0..n {
        animator.tick();
    }
}

fn reset_box2(box2: &Bag) {
    let reset = box2
        .lock()
        .unwrap()
        .set_all([("x", 200.0_f32), ("y", 50.0), ("opacity", 1.0)]);
    assert!(reset.is_ok());
}

fn build_scene(box1: &Bag, box2: &Bag) -> Animator {
    let mut animator = Animator::new();

    let (b1, b2) = (box1.clone(), box2.clone());
    let mut sequence = Sequence::new()
        .then(animator.func(1, move |_| {
            let _ = b1.lock().unwrap().set_all([
                ("x", 10.0_f32),
                ("y", 50.0),
                ("opacity", 0.0),
                ("width", 100.0),
                ("height", 100.0),
                ("rotation", 0.0),
            ]);
            reset_box2(&b2);
        }))
        .then(animator.delay(50))
        .then(animator.to(
            60,
            vec![Mutation::new(box1.clone())
                .change("x", 200.0)
                .change("opacity", 1.0)
                .change("rotation", 90.0)
                .change("width", 200.0)
                .change("height", 200.0)],
        ))
        .then(animator.delay(20))
        .then(animator.animate(
            80,
            vec![Mutation::new(box1.clone())
                .change("x", 500.0)
                .ease(Easing::EaseOut)],
        ))
        .then(animator.to(60, vec![Mutation::new(box1.clone()).change("opacity", 0.0)]));

    animator.add_stage(Stage::direct(move |playhead: &mut Playhead| {
        playhead.advance_sequence(&mut sequence)
    }));

    let b2 = box2.clone();
    animator.standalone_func(1, move |_| reset_box2(&b2));
    animator.standalone_animate(
        150,
        vec![Mutation::new(box2.clone())
            .change("x", 800.0)
            .ease(Easing::Drag)],
    );
    animator.standalone_delay(20);
    animator.standalone_animate(20, vec![Mutation::new(box2.clone()).change("opacity", -1.0)]);
    let b2 = box2.clone();
    animator.standalone_func(1, move |_| reset_box2(&b2));

    animator.set_looping(true);
    animator
}

#[test]
fn test_scene_plays_and_loops() {
    let box1 = box_bag();
    let box2 = box_bag();
    let mut animator = build_scene(&box1, &box2);
    assert_eq!(animator.stage_count(), 6);

    // setup (2) + delay (51) + to (61)
    ticks(&mut animator, 114);
    assert_eq!(num(&box1, "x"), 200.0);
    assert_eq!(num(&box1, "opacity"), 1.0);
    assert_eq!(num(&box1, "rotation"), 90.0);
    assert_eq!(num(&box1, "width"), 200.0);
    assert_eq!(num(&box1, "height"), 200.0);
    assert_eq!(num(&box1, "y"), 50.0);
    assert_eq!(animator.current_stage(), 0);

    // delay (21) + eased animate (81)
    ticks(&mut animator, 102);
    assert_eq!(num(&box1, "x"), 700.0);

    ticks(&mut animator, 61);
    assert_eq!(num(&box1, "opacity"), 0.0);
    assert_eq!(animator.current_stage(), 1);
    assert_eq!(animator.sequence_step(), 0);

    // box2 reset, slide, pause, fade
    ticks(&mut animator, 2 + 151);
    assert_eq!(num(&box2, "x"), 1000.0);
    ticks(&mut animator, 21 + 21);
    assert_eq!(num(&box2, "opacity"), 0.0);

    ticks(&mut animator, 2);
    assert_eq!(num(&box2, "x"), 200.0);
    assert_eq!(num(&box2, "opacity"), 1.0);
    assert_eq!(animator.current_stage(), 6);
    assert!(animator.is_running());

    // The wrap tick reports not running
    animator.tick();
    assert_eq!(animator.current_stage(), 0);
    assert!(!animator.is_running());
    assert!(!animator.is_finished());
}

#[test]
fn test_text_properties_survive_playback() {
    let box1 = box_bag();
    let box2 = box_bag();
    let mut animator = build_scene(&box1, &box2);

    ticks(&mut animator, 600);
    assert_eq!(
        box1.lock().unwrap().get("label"),
        Some(PropertyValue::Text("box".into()))
    );
    assert_eq!(
        box2.lock().unwrap().get("label"),
        Some(PropertyValue::Text("box".into()))
    );
}

#[test]
fn test_independent_animators() {
    let a = box_bag();
    let b = box_bag();
    let mut fast = Animator::new();
    let mut slow = Animator::new();
    slow.set_delay_mult(2.0);

    fast.standalone_to(10, vec![Mutation::new(a.clone()).change("x", 10.0)]);
    slow.standalone_to(10, vec![Mutation::new(b.clone()).change("x", 10.0)]);

    ticks(&mut fast, 10);
    ticks(&mut slow, 10);
    assert_eq!(num(&a, "x"), 10.0);
    assert_eq!(num(&b, "x"), 5.0);

    ticks(&mut slow, 10);
    assert_eq!(num(&b, "x"), 10.0);
}

#[test]
fn test_memoized_start_in_direct_stage() {
    let bag = box_bag();
    let target = bag.clone();
    let mut animator = Animator::new();
    let mut frames = 0;

    // A hand-written stage that captures its origin once per sequence
    animator.add_stage(Stage::direct(move |playhead: &mut Playhead| {
        let origin = playhead
            .memo_in_sequence("origin", || {
                target
                    .lock()
                    .unwrap()
                    .get("x")
                    .unwrap_or_default()
            })
            .as_number()
            .unwrap_or(0.0);
        frames += 1;
        target
            .lock()
            .unwrap()
            .set("x", PropertyValue::Number(origin + frames as f32));
        if frames == 3 {
            Progress::Done
        } else {
            Progress::Continue
        }
    }));

    ticks(&mut animator, 3);
    assert_eq!(num(&bag, "x"), 3.0);
    assert!(animator.is_finished());
}
