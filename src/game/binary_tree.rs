//! Synthetic binary-decision environment
//!
//! A complete binary tree of depth `max_depth`. Every internal transition pays
//! nothing; the transition into a leaf at depth `max_depth` ends the episode and
//! pays that leaf's reward. Leaves are numbered left to right, so the first half
//! of the reward table lies under root action 0 and the second half under
//! root action 1.

use crate::game::environment::{Environment, Transition};
use crate::{MctsPolicyError, Result};
use rand::prelude::*;
use rand::rngs::StdRng;

const ACTION_NUMBER: usize = 2;

/// State of the binary tree: `(node number, depth)`.
///
/// The root is `(1, 0)`; action `a` leads from `(n, d)` to `(2n + a, d + 1)`,
/// which makes the node number unique across depths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinaryState {
    pub number: u64,
    pub depth: usize,
}

#[derive(Debug, Clone)]
pub struct BinaryTreeEnv {
    max_depth: usize,
    rewards: Vec<f64>,
}

impl BinaryTreeEnv {
    /// Creates a tree whose leaf rewards are drawn uniformly from `[0, 1)`.
    pub fn random(max_depth: usize, rng: &mut StdRng) -> Result<Self> {
        Self::check_depth(max_depth)?;
        let rewards = (0..ACTION_NUMBER.pow(max_depth as u32))
            .map(|_| rng.random_range(0.0..1.0))
            .collect();
        Ok(Self { max_depth, rewards })
    }

    /// Creates a tree with an explicit reward table of `2^max_depth` entries.
    pub fn with_rewards(max_depth: usize, rewards: Vec<f64>) -> Result<Self> {
        Self::check_depth(max_depth)?;
        let expected = ACTION_NUMBER.pow(max_depth as u32);
        if rewards.len() != expected {
            return Err(MctsPolicyError::Configuration(format!(
                "reward table for depth {} needs {} entries, got {}",
                max_depth,
                expected,
                rewards.len()
            )));
        }
        Ok(Self { max_depth, rewards })
    }

    fn check_depth(max_depth: usize) -> Result<()> {
        // 2^max_depth leaves must fit in the u64 node numbering
        if max_depth == 0 || max_depth > 62 {
            return Err(MctsPolicyError::Configuration(format!(
                "binary tree depth must be in 1..=62, got {}",
                max_depth
            )));
        }
        Ok(())
    }

    pub fn root_state() -> BinaryState {
        BinaryState {
            number: 1,
            depth: 0,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    fn leaf_count(&self) -> usize {
        self.rewards.len()
    }

    /// Best leaf reward reachable under each root action.
    pub fn max_reward(&self) -> [f64; ACTION_NUMBER] {
        let half = self.leaf_count() / 2;
        let best = |slice: &[f64]| slice.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        [best(&self.rewards[..half]), best(&self.rewards[half..])]
    }

    /// Root action leading to the higher maximum reward (lowest index on ties).
    pub fn best_action(&self) -> usize {
        let [left, right] = self.max_reward();
        if right > left {
            1
        } else {
            0
        }
    }
}

impl Environment for BinaryTreeEnv {
    type State = BinaryState;
    type Key = u64;

    fn legal_action_count(&self, state: &BinaryState) -> usize {
        if state.depth >= self.max_depth {
            0
        } else {
            ACTION_NUMBER
        }
    }

    fn is_legal(&self, state: &BinaryState, action: usize) -> bool {
        action < self.legal_action_count(state)
    }

    fn step(&mut self, state: &BinaryState, action: usize) -> Result<Transition<BinaryState>> {
        if !self.is_legal(state, action) {
            return Err(MctsPolicyError::IllegalAction {
                action,
                legal: self.legal_action_count(state),
            });
        }

        let next = BinaryState {
            number: state.number * 2 + action as u64,
            depth: state.depth + 1,
        };

        if next.depth == self.max_depth {
            let leaf = (next.number - self.leaf_count() as u64) as usize;
            Ok(Transition::terminal(self.rewards[leaf]))
        } else {
            Ok(Transition::new(next, 0.0))
        }
    }

    fn hash_key(&self, state: &BinaryState) -> u64 {
        state.number
    }
}
