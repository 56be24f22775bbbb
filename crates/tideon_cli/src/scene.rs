//! Building an animator from a scene description

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use std::sync::{Arc, Mutex};
use tideon_animation::{
    Animator, AnimatorConfig, Easing, MixTag, Mutation, Point, Primitive, Sequence, Stage,
    TaggedMutation,
};
use tideon_core::{shared, PropertyBag, PropertyMap, SharedTarget};

use crate::config::{ChangeConfig, SceneConfig, StepConfig, TagConfig};

type Bag = Arc<Mutex<PropertyBag>>;

/// A playable scene: the animator plus the bags it animates
pub struct Scene {
    pub name: String,
    pub animator: Animator,
    pub targets: IndexMap<String, Bag>,
}

impl Scene {
    pub fn build(config: &SceneConfig) -> Result<Self> {
        config.validate()?;

        let targets: IndexMap<String, Bag> = config
            .targets
            .iter()
            .map(|(name, props)| (name.clone(), shared(PropertyBag::from_map(props.clone()))))
            .collect();

        let mut animator = Animator::with_config(AnimatorConfig {
            delay_mult: config.scene.delay_mult,
            looping: config.scene.looping,
        });

        for (index, stage) in config.stages.iter().enumerate() {
            let sequence = stage
                .steps
                .iter()
                .map(|step| build_step(&animator, &targets, step))
                .collect::<Result<Sequence>>()
                .with_context(|| format!("Failed to build stage {index}"))?;
            animator.add_stage(Stage::Sequence(sequence));
        }

        tracing::info!(
            scene = %config.scene.name,
            targets = targets.len(),
            stages = animator.stage_count(),
            "Scene loaded"
        );

        Ok(Self {
            name: config.scene.name.clone(),
            animator,
            targets,
        })
    }

    /// Current values of every target, in declaration order
    pub fn snapshot(&self) -> Result<IndexMap<String, PropertyMap>> {
        self.targets
            .iter()
            .map(|(name, bag)| {
                let bag = bag
                    .lock()
                    .map_err(|_| anyhow!("Target '{name}' is poisoned"))?;
                Ok((name.clone(), bag.snapshot()))
            })
            .collect()
    }
}

fn lookup(targets: &IndexMap<String, Bag>, name: &str) -> Result<Bag> {
    targets
        .get(name)
        .cloned()
        .with_context(|| format!("Unknown target '{name}'"))
}

fn mutation(targets: &IndexMap<String, Bag>, change: &ChangeConfig) -> Result<Mutation> {
    let target: SharedTarget = lookup(targets, &change.target)?;
    let mut mutation = Mutation::new(target);
    mutation.changes = change.values.clone();
    if let Some(easing) = &change.easing {
        mutation = mutation.ease(Easing::by_name(easing));
    }
    Ok(mutation)
}

fn mutations(targets: &IndexMap<String, Bag>, changes: &[ChangeConfig]) -> Result<Vec<Mutation>> {
    changes.iter().map(|c| mutation(targets, c)).collect()
}

fn build_step(
    animator: &Animator,
    targets: &IndexMap<String, Bag>,
    step: &StepConfig,
) -> Result<Primitive> {
    let primitive = match step {
        StepConfig::Set { target, values } => {
            let bag = lookup(targets, target)?;
            let name = target.clone();
            let values = values.clone();
            animator.func(1, move |_| match bag.lock() {
                Ok(mut bag) => {
                    if let Err(err) = bag.set_all(values.iter().map(|(k, v)| (k, v.clone()))) {
                        tracing::warn!(bag = %name, %err, "Set skipped unknown property");
                    }
                }
                Err(_) => tracing::warn!(bag = %name, "Target poisoned, set skipped"),
            })
        }
        StepConfig::Delay { duration } => animator.delay(*duration),
        StepConfig::Animate { duration, changes } => {
            animator.animate(*duration, mutations(targets, changes)?)
        }
        StepConfig::To { duration, changes } => animator.to(*duration, mutations(targets, changes)?),
        StepConfig::From { duration, changes } => {
            animator.from(*duration, mutations(targets, changes)?)
        }
        StepConfig::Mix { duration, changes } => {
            let tagged = changes
                .iter()
                .map(|change| {
                    let tag = match change.tag {
                        TagConfig::From => MixTag::From,
                        TagConfig::To => MixTag::To,
                        TagConfig::Animate => MixTag::Animate,
                    };
                    Ok(TaggedMutation {
                        tag,
                        mutation: mutation(targets, change)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            animator.mix(*duration, tagged)
        }
        StepConfig::Curve {
            target,
            duration,
            easing,
            points,
        } => {
            let easing = easing.as_deref().map(Easing::by_name).unwrap_or_default();
            let points = points.iter().copied().map(Point::from).collect();
            animator
                .curve(lookup(targets, target)?, points, *duration, easing)
                .context("Curve needs at least two points")?
        }
    };

    tracing::debug!(
        op = step.op(),
        frames = primitive.duration(),
        "Step built"
    );
    Ok(primitive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tideon_core::{PropertyValue, Target};

    fn number(scene: &Scene, target: &str, property: &str) -> f32 {
        scene.targets[target].lock().unwrap().number(property).unwrap()
    }

    fn play(scene: &mut Scene, ticks: usize) {
        for _ in 0..ticks {
            scene.animator.tick();
        }
    }

    #[test]
    fn test_sample_scene_plays_to_completion() {
        let mut config = SceneConfig::sample("demo");
        config.scene.looping = false;
        let mut scene = Scene::build(&config).expect("sample builds");
        assert_eq!(scene.animator.stage_count(), 3);

        // set (2) + set (2) + delay (51) + to (61)
        play(&mut scene, 116);
        assert_eq!(number(&scene, "box1", "x"), 200.0);
        assert_eq!(number(&scene, "box1", "rotation"), 90.0);
        assert_eq!(number(&scene, "box2", "x"), 200.0);

        let mut ticks = 116;
        while !scene.animator.is_finished() {
            scene.animator.tick();
            ticks += 1;
            assert!(ticks < 10_000, "scene never finished");
        }

        // The curve ends on its last point, and the mix returned y first
        assert_eq!(number(&scene, "box1", "x"), 200.0);
        assert_eq!(number(&scene, "box1", "y"), 50.0);
        assert_eq!(number(&scene, "box1", "rotation"), 0.0);
        assert_eq!(number(&scene, "box2", "opacity"), 1.0);
    }

    #[test]
    fn test_set_step_ignores_unknown_properties() {
        let config: SceneConfig = toml::from_str(
            r#"
[scene]
name = "set"

[targets.dot]
x = 0

[[stages]]
steps = [{ op = "set", target = "dot", values = { x = 4, z = 9 } }]
"#,
        )
        .expect("valid scene");
        let mut scene = Scene::build(&config).expect("builds");

        play(&mut scene, 2);
        let snapshot = scene.snapshot().expect("snapshot");
        assert_eq!(snapshot["dot"].get("x"), Some(&PropertyValue::Number(4.0)));
        assert!(snapshot["dot"].get("z").is_none());
        assert!(scene.animator.is_finished());
    }

    #[test]
    fn test_unknown_target_fails_to_build() {
        let mut config = SceneConfig::sample("demo");
        config.targets.shift_remove("box2");
        assert!(Scene::build(&config).is_err());
    }

    #[test]
    fn test_delay_mult_scales_scene() {
        let config: SceneConfig = toml::from_str(
            r#"
[scene]
name = "slow"
delay_mult = 2.0

[targets.dot]
x = 0

[[stages]]
steps = [{ op = "to", duration = 5, changes = [{ target = "dot", values = { x = 10 } }] }]
"#,
        )
        .expect("valid scene");
        let mut scene = Scene::build(&config).expect("builds");

        play(&mut scene, 5);
        assert_eq!(number(&scene, "dot", "x"), 5.0);
        play(&mut scene, 6);
        assert_eq!(number(&scene, "dot", "x"), 10.0);
        assert!(scene.animator.is_finished());
    }
}
