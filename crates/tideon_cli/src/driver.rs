//! Fixed-interval playback
//!
//! The animator keeps no time of its own; the driver ticks it, either back
//! to back (headless) or on a tokio interval, and reports target values
//! after every tick.

use anyhow::{Context, Result};
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use tideon_core::PropertyMap;
use tokio::time::MissedTickBehavior;

use crate::scene::Scene;

/// How each tick is reported
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per tick
    #[default]
    Text,
    /// One JSON object per tick
    Json,
    /// Report nothing
    Quiet,
}

#[derive(Serialize)]
struct TickReport<'a> {
    tick: u64,
    stage: usize,
    running: bool,
    targets: &'a IndexMap<String, PropertyMap>,
}

pub struct Driver<W: Write> {
    scene: Scene,
    out: W,
    format: OutputFormat,
    max_ticks: Option<u64>,
    ticks: u64,
}

impl<W: Write> Driver<W> {
    pub fn new(scene: Scene, out: W, format: OutputFormat, max_ticks: Option<u64>) -> Self {
        Self {
            scene,
            out,
            format,
            max_ticks,
            ticks: 0,
        }
    }

    fn should_stop(&self) -> bool {
        self.max_ticks.is_some_and(|max| self.ticks >= max) || self.scene.animator.is_finished()
    }

    /// Tick once and report
    pub fn step(&mut self) -> Result<()> {
        self.scene.animator.tick();
        self.ticks += 1;
        self.report()
    }

    /// Tick as fast as possible until the scene finishes or the tick limit
    /// is reached
    pub fn run_headless(&mut self) -> Result<u64> {
        if self.max_ticks.is_none() && self.scene.animator.is_looping() {
            anyhow::bail!(
                "Scene '{}' loops forever; pass --ticks to bound a headless run",
                self.scene.name
            );
        }

        while !self.should_stop() {
            self.step()?;
        }
        self.finish()
    }

    /// Tick once per `interval` on a current-thread tokio runtime
    pub fn run_timed(&mut self, interval: Duration) -> Result<u64> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("Failed to start timer runtime")?;

        runtime.block_on(async {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            while !self.should_stop() {
                timer.tick().await;
                self.step()?;
            }
            Ok::<_, anyhow::Error>(())
        })?;

        self.finish()
    }

    fn finish(&mut self) -> Result<u64> {
        self.out.flush().context("Failed to flush output")?;
        tracing::info!(
            scene = %self.scene.name,
            ticks = self.ticks,
            finished = self.scene.animator.is_finished(),
            "Playback stopped"
        );
        Ok(self.ticks)
    }

    fn report(&mut self) -> Result<()> {
        if self.format == OutputFormat::Quiet {
            return Ok(());
        }

        let targets = self.scene.snapshot()?;
        let animator = &self.scene.animator;

        match self.format {
            OutputFormat::Json => {
                let report = TickReport {
                    tick: self.ticks,
                    stage: animator.current_stage(),
                    running: animator.is_running(),
                    targets: &targets,
                };
                serde_json::to_writer(&mut self.out, &report)
                    .context("Failed to encode tick report")?;
                writeln!(self.out)?;
            }
            OutputFormat::Text => {
                let mut line = format!(
                    "tick {:>5}  stage {}/{}",
                    self.ticks,
                    animator.current_stage(),
                    animator.stage_count()
                );
                for (name, props) in &targets {
                    line.push_str(&format!("  {name}:"));
                    for (property, value) in props {
                        line.push_str(&format!(" {property}={value}"));
                    }
                }
                writeln!(self.out, "{line}")?;
            }
            OutputFormat::Quiet => {}
        }
        Ok(())
    }
}
