//! Environment adapter consumed by the search engine.
//!
//! An environment describes a single-agent sequential decision problem:
//! which actions are available in a state, what happens when one is taken,
//! and how a state is identified for transposition lookups.

use crate::Result;
use std::fmt::Debug;
use std::hash::Hash;

/// Outcome of applying one action to a state.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    /// Next state, or `None` when the transition ends the episode
    pub next_state: Option<S>,
    /// Immediate reward for taking the action, defined for terminal transitions too
    pub reward: f64,
}

impl<S> Transition<S> {
    pub fn new(next_state: S, reward: f64) -> Self {
        Self {
            next_state: Some(next_state),
            reward,
        }
    }

    pub fn terminal(reward: f64) -> Self {
        Self {
            next_state: None,
            reward,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_state.is_none()
    }
}

/// Sequential decision environment searched by [`crate::mcts::MctsEngine`].
///
/// Actions are indices in `0..legal_action_count(state)`. The engine treats
/// states as immutable values: it clones what `step` returns and never hands a
/// state back for mutation.
pub trait Environment {
    type State: Clone + Debug;

    /// Canonical identifier of a state. Two states the environment considers
    /// identical must map to the same key.
    type Key: Eq + Hash + Clone + Debug;

    /// Number of actions available at `state`. Constant for a given state.
    fn legal_action_count(&self, state: &Self::State) -> usize;

    /// Whether `action` may be applied at `state`.
    fn is_legal(&self, state: &Self::State, action: usize) -> bool;

    /// Applies `action` to `state`.
    ///
    /// Takes `&mut self` so stochastic environments can draw from their own
    /// seeded random source.
    fn step(&mut self, state: &Self::State, action: usize) -> Result<Transition<Self::State>>;

    /// Transposition key of `state`.
    fn hash_key(&self, state: &Self::State) -> Self::Key;
}
