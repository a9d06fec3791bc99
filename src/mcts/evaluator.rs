//! Leaf evaluators.
//!
//! An evaluator gives a freshly expanded state a prior over its legal actions
//! and a scalar value estimate. The engine only needs the [`Evaluator`] trait;
//! [`UniformEvaluator`] and [`RolloutEvaluator`] cover the cases where no
//! learned model is available.

use crate::game::environment::Environment;
use crate::Result;
use rand::prelude::*;
use rand::rngs::StdRng;

/// Result of evaluating a state.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Non-negative weight per legal action, need not sum to one
    pub prior: Vec<f64>,

    /// Estimated return from the state onwards
    pub value: f64,
}

/// Trait for leaf evaluators.
pub trait Evaluator<S> {
    /// Evaluates `state`. The prior must have one entry per legal action.
    fn evaluate(&mut self, state: &S) -> Result<Evaluation>;
}

/// Equal weight on every action and a constant value.
#[derive(Debug, Clone)]
pub struct UniformEvaluator {
    action_count: usize,
    value: f64,
}

impl UniformEvaluator {
    pub fn new(action_count: usize) -> Self {
        Self {
            action_count,
            value: 0.0,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }
}

impl<S> Evaluator<S> for UniformEvaluator {
    fn evaluate(&mut self, _state: &S) -> Result<Evaluation> {
        Ok(Evaluation {
            prior: vec![1.0; self.action_count],
            value: self.value,
        })
    }
}

/// Estimates a state's value with one uniformly random playout.
///
/// Works on its own copy of the environment so rollouts never touch the
/// instance the engine searches with.
#[derive(Debug)]
pub struct RolloutEvaluator<E> {
    env: E,
    rng: StdRng,
    max_rollout_depth: usize,
}

impl<E: Environment> RolloutEvaluator<E> {
    pub fn new(env: E, seed: u64) -> Self {
        Self {
            env,
            rng: StdRng::seed_from_u64(seed),
            max_rollout_depth: 1_000,
        }
    }

    pub fn with_max_rollout_depth(mut self, depth: usize) -> Self {
        self.max_rollout_depth = depth;
        self
    }

    /// Sum of rewards along one random playout from `state`
    fn rollout(&mut self, state: &E::State) -> Result<f64> {
        let mut total_reward = 0.0;
        let mut current = state.clone();

        for _ in 0..self.max_rollout_depth {
            let count = self.env.legal_action_count(&current);
            if count == 0 {
                break;
            }
            let action = self.rng.random_range(0..count);
            let transition = self.env.step(&current, action)?;
            total_reward += transition.reward;
            match transition.next_state {
                Some(next) => current = next,
                None => break,
            }
        }

        Ok(total_reward)
    }
}

impl<E: Environment> Evaluator<E::State> for RolloutEvaluator<E> {
    fn evaluate(&mut self, state: &E::State) -> Result<Evaluation> {
        let count = self.env.legal_action_count(state);
        let value = self.rollout(state)?;
        Ok(Evaluation {
            prior: vec![1.0; count],
            value,
        })
    }
}
