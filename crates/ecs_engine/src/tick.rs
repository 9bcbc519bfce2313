//! Tick loop.
//!
//! Drives [`Engine::update`] at a chosen cadence: back to back, or throttled
//! to a fixed rate, until a tick count or a wall-clock budget is reached.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use ecs_component::EcsError;

use crate::engine::Engine;

/// Configuration for the tick loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Target ticks per second (0 = run ticks back to back).
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// Wall-clock budget for the whole run in seconds (0 = unlimited).
    pub max_duration_secs: f64,
}

impl TickConfig {
    /// Run back to back for `secs` seconds.
    #[must_use]
    pub fn for_duration(secs: f64) -> Self {
        Self {
            max_duration_secs: secs,
            ..Self::default()
        }
    }

    /// Run exactly `ticks` ticks back to back.
    #[must_use]
    pub fn for_ticks(ticks: u64) -> Self {
        Self {
            max_ticks: ticks,
            ..Self::default()
        }
    }

    /// Throttle the loop to `tick_rate` ticks per second.
    #[must_use]
    pub fn with_tick_rate(mut self, tick_rate: f64) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Interval between tick starts, or `None` when running back to back.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::InvalidConfig`] if `tick_rate` is negative, not a
    /// number, or so small that one tick would not fit in a [`Duration`].
    pub fn tick_duration(&self) -> Result<Option<Duration>, TickError> {
        if self.tick_rate == 0.0 {
            return Ok(None);
        }
        if self.tick_rate.is_nan() || self.tick_rate < 0.0 {
            return Err(TickError::invalid("tick_rate", self.tick_rate));
        }
        Duration::try_from_secs_f64(1.0 / self.tick_rate)
            .map(Some)
            .map_err(|_| TickError::invalid("tick_rate", self.tick_rate))
    }

    /// Wall-clock budget for a run, or `None` when unlimited.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::InvalidConfig`] if `max_duration_secs` is
    /// negative, not a number, or too large for a [`Duration`].
    pub fn max_duration(&self) -> Result<Option<Duration>, TickError> {
        if self.max_duration_secs == 0.0 {
            return Ok(None);
        }
        if self.max_duration_secs.is_nan() || self.max_duration_secs < 0.0 {
            return Err(TickError::invalid("max_duration_secs", self.max_duration_secs));
        }
        Duration::try_from_secs_f64(self.max_duration_secs)
            .map(Some)
            .map_err(|_| TickError::invalid("max_duration_secs", self.max_duration_secs))
    }

    /// Checks that every field converts to a usable duration.
    ///
    /// # Errors
    ///
    /// Returns the first [`TickError::InvalidConfig`] found.
    pub fn validate(&self) -> Result<(), TickError> {
        self.tick_duration()?;
        self.max_duration()?;
        Ok(())
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 0.0,
            max_ticks: 0,
            max_duration_secs: 0.0,
        }
    }
}

/// Errors returned by [`TickLoop::run`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickError {
    /// A configuration field does not describe a representable duration.
    #[error("invalid tick config: {field} = {value}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A system failed during a tick.
    #[error(transparent)]
    System(#[from] EcsError),
}

impl TickError {
    fn invalid(field: &'static str, value: f64) -> Self {
        Self::InvalidConfig { field, value }
    }
}

/// Summary of a completed [`TickLoop::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    /// Ticks executed by this run.
    pub ticks: u64,
    /// Wall-clock time spent, in seconds.
    pub elapsed_secs: f64,
    /// `ticks / elapsed_secs`, or 0 when no time elapsed.
    pub ticks_per_second: f64,
}

/// The tick loop state.
#[derive(Debug)]
pub struct TickLoop {
    /// Current tick counter.
    tick_id: u64,
    /// Tick configuration.
    config: TickConfig,
}

impl TickLoop {
    /// Create a new tick loop with the given configuration.
    #[must_use]
    pub fn new(config: TickConfig) -> Self {
        Self { tick_id: 0, config }
    }

    /// Returns the number of ticks executed so far.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    /// Run a single tick.
    ///
    /// # Errors
    ///
    /// Propagates the first system error; the tick counter is not advanced.
    pub fn tick(&mut self, engine: &mut Engine) -> Result<(), EcsError> {
        engine.update()?;
        self.tick_id += 1;
        debug!(tick_id = self.tick_id, "tick complete");
        Ok(())
    }

    /// Run ticks until `max_ticks` or `max_duration_secs` is reached.
    ///
    /// With neither limit set the loop runs until a system fails.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::InvalidConfig`] before the first tick if the
    /// configuration is out of range, and [`TickError::System`] for the first
    /// system error.
    pub fn run(&mut self, engine: &mut Engine) -> Result<TickReport, TickError> {
        let tick_duration = self.config.tick_duration()?;
        let max_duration = self.config.max_duration()?;
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            max_duration_secs = self.config.max_duration_secs,
            systems = engine.system_count(),
            entities = engine.world().len(),
            "starting tick loop"
        );

        let started = Instant::now();
        loop {
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                break;
            }
            if max_duration.is_some_and(|budget| started.elapsed() >= budget) {
                break;
            }

            let tick_start = Instant::now();
            self.tick(engine)?;
            tick_count += 1;

            if let Some(budget) = tick_duration {
                let elapsed = tick_start.elapsed();
                if elapsed < budget {
                    std::thread::sleep(budget - elapsed);
                } else {
                    warn!(
                        tick_id = self.tick_id,
                        elapsed_ms = elapsed.as_millis() as u64,
                        budget_ms = budget.as_millis() as u64,
                        "tick exceeded time budget"
                    );
                }
            }
        }

        let elapsed_secs = started.elapsed().as_secs_f64();
        let report = TickReport {
            ticks: tick_count,
            elapsed_secs,
            ticks_per_second: if elapsed_secs > 0.0 {
                tick_count as f64 / elapsed_secs
            } else {
                0.0
            },
        };
        info!(
            ticks = report.ticks,
            elapsed_secs = report.elapsed_secs,
            ticks_per_second = report.ticks_per_second,
            "tick loop complete"
        );
        Ok(report)
    }
}
