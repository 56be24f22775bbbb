//! Scene file handling

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tideon_core::{PropertyMap, PropertyValue};

/// Top-level scene description (scene.toml)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SceneConfig {
    pub scene: SceneMeta,
    /// Named property bags, keyed by target name
    #[serde(default)]
    pub targets: IndexMap<String, PropertyMap>,
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

/// Scene metadata and playback settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SceneMeta {
    pub name: String,
    /// Restart from the first stage after the last one completes
    #[serde(default)]
    pub looping: bool,
    /// Multiplier applied to every duration
    #[serde(default = "default_delay_mult")]
    pub delay_mult: f32,
    /// Milliseconds between ticks when playing in real time
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_delay_mult() -> f32 {
    1.0
}

fn default_interval_ms() -> u64 {
    10
}

/// One stage: steps played as a sequence
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StageConfig {
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

/// One primitive in a stage
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StepConfig {
    /// Write values to a target in a single frame
    Set { target: String, values: PropertyMap },
    Delay { duration: u32 },
    Animate {
        duration: u32,
        changes: Vec<ChangeConfig>,
    },
    To {
        duration: u32,
        changes: Vec<ChangeConfig>,
    },
    From {
        duration: u32,
        changes: Vec<ChangeConfig>,
    },
    Mix {
        duration: u32,
        changes: Vec<ChangeConfig>,
    },
    Curve {
        target: String,
        duration: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        easing: Option<String>,
        points: Vec<[f32; 2]>,
    },
}

impl StepConfig {
    pub fn op(&self) -> &'static str {
        match self {
            StepConfig::Set { .. } => "set",
            StepConfig::Delay { .. } => "delay",
            StepConfig::Animate { .. } => "animate",
            StepConfig::To { .. } => "to",
            StepConfig::From { .. } => "from",
            StepConfig::Mix { .. } => "mix",
            StepConfig::Curve { .. } => "curve",
        }
    }

    /// Every target name this step refers to
    fn targets(&self) -> Vec<&str> {
        match self {
            StepConfig::Set { target, .. } | StepConfig::Curve { target, .. } => {
                vec![target.as_str()]
            }
            StepConfig::Delay { .. } => Vec::new(),
            StepConfig::Animate { changes, .. }
            | StepConfig::To { changes, .. }
            | StepConfig::From { changes, .. }
            | StepConfig::Mix { changes, .. } => {
                changes.iter().map(|c| c.target.as_str()).collect()
            }
        }
    }
}

/// Property changes for one target
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChangeConfig {
    pub target: String,
    pub values: PropertyMap,
    /// Easing name; only `animate` reads it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,
    /// Per-item behaviour; only `mix` reads it
    #[serde(default)]
    pub tag: TagConfig,
}

impl ChangeConfig {
    pub fn new(target: &str, pairs: &[(&str, f32)]) -> Self {
        Self {
            target: target.to_string(),
            values: values(pairs),
            easing: None,
            tag: TagConfig::default(),
        }
    }

    pub fn with_easing(mut self, easing: &str) -> Self {
        self.easing = Some(easing.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagConfig {
    From,
    To,
    #[default]
    Animate,
}

fn values(pairs: &[(&str, f32)]) -> PropertyMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), PropertyValue::Number(*v)))
        .collect()
}

impl SceneConfig {
    /// Load a scene from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "No scene found at {}. Run `tideon init` to create one.",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: SceneConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid scene {}", path.display()))?;

        Ok(config)
    }

    /// Check cross-references and value ranges
    pub fn validate(&self) -> Result<()> {
        if self.scene.delay_mult <= 0.0 {
            anyhow::bail!("delay_mult must be positive, got {}", self.scene.delay_mult);
        }
        if self.scene.interval_ms == 0 {
            anyhow::bail!("interval_ms must be at least 1");
        }

        for (stage, stage_config) in self.stages.iter().enumerate() {
            for (step, step_config) in stage_config.steps.iter().enumerate() {
                for target in step_config.targets() {
                    if !self.targets.contains_key(target) {
                        anyhow::bail!(
                            "Stage {stage} step {step} ({}): unknown target '{target}'",
                            step_config.op()
                        );
                    }
                }
                if let StepConfig::Curve { points, .. } = step_config {
                    if points.len() < 2 {
                        anyhow::bail!(
                            "Stage {stage} step {step} (curve): needs at least two points, got {}",
                            points.len()
                        );
                    }
                }
            }
        }

        Ok(())
    }

    /// A two-box demo scene
    pub fn sample(name: &str) -> Self {
        let box_props = values(&[
            ("x", 0.0),
            ("y", 0.0),
            ("opacity", 0.0),
            ("width", 0.0),
            ("height", 0.0),
            ("rotation", 0.0),
        ]);

        let mut targets = IndexMap::new();
        targets.insert("box1".to_string(), box_props.clone());
        targets.insert("box2".to_string(), box_props);

        let reset_box2 = StepConfig::Set {
            target: "box2".into(),
            values: values(&[("x", 200.0), ("y", 50.0), ("opacity", 1.0)]),
        };

        let box1 = StageConfig {
            steps: vec![
                StepConfig::Set {
                    target: "box1".into(),
                    values: values(&[
                        ("x", 10.0),
                        ("y", 50.0),
                        ("opacity", 0.0),
                        ("width", 100.0),
                        ("height", 100.0),
                        ("rotation", 0.0),
                    ]),
                },
                reset_box2.clone(),
                StepConfig::Delay { duration: 50 },
                StepConfig::To {
                    duration: 60,
                    changes: vec![ChangeConfig::new(
                        "box1",
                        &[
                            ("x", 200.0),
                            ("opacity", 1.0),
                            ("rotation", 90.0),
                            ("width", 200.0),
                            ("height", 200.0),
                        ],
                    )],
                },
                StepConfig::Delay { duration: 20 },
                StepConfig::Animate {
                    duration: 80,
                    changes: vec![
                        ChangeConfig::new("box1", &[("x", 500.0)]).with_easing("easeOut")
                    ],
                },
                StepConfig::To {
                    duration: 60,
                    changes: vec![ChangeConfig::new("box1", &[("opacity", 0.0)])],
                },
            ],
        };

        let box2 = StageConfig {
            steps: vec![
                StepConfig::Animate {
                    duration: 150,
                    changes: vec![
                        ChangeConfig::new("box2", &[("x", 800.0)]).with_easing("drag")
                    ],
                },
                StepConfig::Delay { duration: 20 },
                StepConfig::Animate {
                    duration: 20,
                    changes: vec![ChangeConfig::new("box2", &[("opacity", -1.0)])],
                },
                reset_box2,
            ],
        };

        let mut bob = ChangeConfig::new("box1", &[("y", -30.0)]);
        bob.tag = TagConfig::From;
        let mut spin = ChangeConfig::new("box1", &[("rotation", 0.0)]);
        spin.tag = TagConfig::To;

        let flourish = StageConfig {
            steps: vec![
                StepConfig::Set {
                    target: "box1".into(),
                    values: values(&[("x", 500.0), ("y", 50.0), ("opacity", 1.0)]),
                },
                StepConfig::Mix {
                    duration: 30,
                    changes: vec![bob, spin],
                },
                StepConfig::Curve {
                    target: "box1".into(),
                    duration: 60,
                    easing: Some("easeInOutCubic".into()),
                    points: vec![[500.0, 50.0], [350.0, 150.0], [200.0, 50.0]],
                },
            ],
        };

        Self {
            scene: SceneMeta {
                name: name.to_string(),
                looping: true,
                delay_mult: default_delay_mult(),
                interval_ms: default_interval_ms(),
            },
            targets,
            stages: vec![box1, box2, flourish],
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize scene")
    }
}
