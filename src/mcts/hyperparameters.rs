//! MCTS Hyperparameters Configuration
//!
//! This module defines the tunable parameters of a search: the exploration
//! constant, the step and wall-clock budgets, the traversal depth cap and how
//! transitions are sampled.

use crate::{MctsPolicyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How the engine treats repeated traversals of the same edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// `step` is called once per edge; later traversals reuse the cached child
    #[default]
    Deterministic,
    /// `step` is called on every traversal and the sampled outcome is
    /// resolved through the transposition table
    Stochastic,
}

/// MCTS hyperparameters configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MCTSHyperparameters {
    /// Exploration weight in the UCB score
    /// Higher values = more exploration
    /// Default: 1.5
    pub cpuct: f64,

    /// Maximum number of simulations, 0 disables the step budget
    /// Default: 10_000
    pub max_step: u64,

    /// Maximum wall-clock time in seconds, 0 disables the time budget
    /// Default: 100.0
    pub max_time: f64,

    /// Maximum number of edges followed in one traversal
    /// Default: 512
    pub max_depth: usize,

    /// Default: deterministic
    pub transition_mode: TransitionMode,
}

impl Default for MCTSHyperparameters {
    fn default() -> Self {
        Self {
            cpuct: 1.5,
            max_step: 10_000,
            max_time: 100.0,
            max_depth: 512,
            transition_mode: TransitionMode::Deterministic,
        }
    }
}

impl MCTSHyperparameters {
    pub fn with_cpuct(mut self, cpuct: f64) -> Self {
        self.cpuct = cpuct;
        self
    }

    pub fn with_max_step(mut self, max_step: u64) -> Self {
        self.max_step = max_step;
        self
    }

    pub fn with_max_time(mut self, max_time: f64) -> Self {
        self.max_time = max_time;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_transition_mode(mut self, mode: TransitionMode) -> Self {
        self.transition_mode = mode;
        self
    }

    /// Loads and validates hyperparameters from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&raw)?;
        params.validate()?;
        Ok(params)
    }

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.cpuct.is_finite() || self.cpuct < 0.0 {
            return Err(MctsPolicyError::Configuration(format!(
                "cpuct must be a finite non-negative number, got {}",
                self.cpuct
            )));
        }
        if !self.max_time.is_finite() || self.max_time < 0.0 {
            return Err(MctsPolicyError::Configuration(format!(
                "max_time must be a finite non-negative number of seconds, got {}",
                self.max_time
            )));
        }
        if self.max_step == 0 && self.max_time == 0.0 {
            return Err(MctsPolicyError::Configuration(
                "at least one of max_step and max_time must be positive".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(MctsPolicyError::Configuration(
                "max_depth must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Wall-clock budget, `None` when disabled
    pub fn time_budget(&self) -> Option<Duration> {
        (self.max_time > 0.0).then(|| Duration::from_secs_f64(self.max_time))
    }

    /// Step budget, `None` when disabled
    pub fn step_budget(&self) -> Option<u64> {
        (self.max_step > 0).then_some(self.max_step)
    }

    /// Create a configuration string for logging
    pub fn to_config_string(&self) -> String {
        format!(
            "cpuct[{:.3}]_steps[{}]_time[{:.1}s]_depth[{}]_{:?}",
            self.cpuct, self.max_step, self.max_time, self.max_depth, self.transition_mode
        )
    }
}
