//! Budgeted MCTS engine
//!
//! This module implements the search loop over any [`Environment`] and
//! [`Evaluator`] pair. Each simulation runs to completion before the next one
//! starts:
//! 1. Selection: follow the highest UCB action from the root
//! 2. Expansion: step the environment on the first untraversed edge and insert
//!    the resulting state into the transposition table
//! 3. Evaluation: ask the evaluator for the new node's prior and value
//! 4. Backpropagation: credit every edge of the path with the reward-to-go
//!
//! Budgets are checked only between simulations.

use crate::game::environment::Environment;
use crate::mcts::evaluator::Evaluator;
use crate::mcts::hyperparameters::{MCTSHyperparameters, TransitionMode};
use crate::mcts::mcts_result::RootStatistics;
use crate::mcts::node::{normalize_prior, Child, Node, NodeId};
use crate::mcts::selection::{backpropagate, select_action, PathStep};
use crate::mcts::transposition::TranspositionTable;
use crate::{MctsPolicyError, Result};
use std::time::{Duration, Instant};

/// MCTS engine
#[derive(Debug)]
pub struct MctsEngine<'a, E: Environment, V> {
    env: &'a mut E,
    evaluator: &'a mut V,
    params: MCTSHyperparameters,
    table: TranspositionTable<E::Key, E::State>,
    root: Option<NodeId>,
    elapsed_steps: u64,
    started: Option<Instant>,
    elapsed: Duration,
}

impl<'a, E, V> MctsEngine<'a, E, V>
where
    E: Environment,
    V: Evaluator<E::State>,
{
    /// Creates a new MCTS engine
    ///
    /// # Arguments
    /// * `env` - Environment searched by the engine
    /// * `evaluator` - Leaf evaluator for newly expanded states
    /// * `params` - Exploration constant and budgets, validated here
    ///
    /// # Errors
    /// `Configuration` when the hyperparameters leave no usable budget or
    /// `cpuct` is negative
    pub fn new(env: &'a mut E, evaluator: &'a mut V, params: MCTSHyperparameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            env,
            evaluator,
            params,
            table: TranspositionTable::new(),
            root: None,
            elapsed_steps: 0,
            started: None,
            elapsed: Duration::ZERO,
        })
    }

    /// Runs simulations from `root_state` until the budget is exhausted
    ///
    /// At least one simulation always completes, whatever the time budget.
    ///
    /// # Returns
    /// A snapshot of the root statistics
    pub fn forward(&mut self, root_state: E::State) -> Result<RootStatistics> {
        self.start(root_state)?;
        log::debug!(
            "MCTS search started with {}",
            self.params.to_config_string()
        );

        loop {
            self.simulate()?;
            if self.budget_exhausted() {
                break;
            }
        }

        let stats = self.root_statistics().ok_or(MctsPolicyError::NoLegalActions)?;
        log::debug!(
            "MCTS search finished: {} simulations in {:?}, {} nodes",
            stats.simulations,
            stats.elapsed,
            stats.tree_size
        );
        Ok(stats)
    }

    /// Clears the tree and expands `root_state` as the new root
    ///
    /// # Errors
    /// `NoLegalActions` if the root has no legal action, or any
    /// environment/evaluator failure
    pub fn start(&mut self, root_state: E::State) -> Result<NodeId> {
        self.table.clear();
        self.root = None;
        self.elapsed_steps = 0;
        self.started = Some(Instant::now());
        self.elapsed = Duration::ZERO;

        let key = self.env.hash_key(&root_state);
        let (root, _) = self.create_node(key, root_state)?;
        self.root = Some(root);
        Ok(root)
    }

    /// Performs one simulation from the current root
    ///
    /// Fails before touching any statistic when a collaborator fails or the
    /// environment rejects the selected action.
    pub fn simulate(&mut self) -> Result<()> {
        let root = self
            .root
            .ok_or_else(|| MctsPolicyError::Configuration("search not started".to_string()))?;
        let cpuct = self.params.cpuct;
        let mut path: Vec<PathStep> = Vec::new();
        let mut current = root;

        let leaf_value = loop {
            if path.len() >= self.params.max_depth {
                break self.table.get(current).value_estimate;
            }

            // 1. Selection
            let node = self.table.get(current);
            let action = select_action(node, cpuct).ok_or(MctsPolicyError::NoLegalActions)?;
            if !self.env.is_legal(&node.state, action) {
                return Err(MctsPolicyError::IllegalAction {
                    action,
                    legal: node.action_count(),
                });
            }

            if self.params.transition_mode == TransitionMode::Deterministic {
                let reward = node.reward[action];
                match node.children[action] {
                    Some(Child::Node(next)) => {
                        path.push(PathStep { node: current, action, reward });
                        current = next;
                        continue;
                    }
                    Some(Child::Terminal) => {
                        path.push(PathStep { node: current, action, reward });
                        break 0.0;
                    }
                    None => {}
                }
            }

            // 2. Expansion
            let transition = self.env.step(&self.table.get(current).state, action)?;
            let reward = transition.reward;
            let Some(next_state) = transition.next_state else {
                self.link(current, action, Child::Terminal, reward);
                path.push(PathStep { node: current, action, reward });
                break 0.0;
            };

            let key = self.env.hash_key(&next_state);
            if let Some(existing) = self.table.lookup(&key) {
                // Transposition: share the node and keep descending
                self.link(current, action, Child::Node(existing), reward);
                path.push(PathStep { node: current, action, reward });
                current = existing;
                continue;
            }

            // 3. Evaluation
            let (child, value) = self.create_node(key, next_state)?;
            self.link(current, action, Child::Node(child), reward);
            path.push(PathStep { node: current, action, reward });
            break value;
        };

        // 4. Backpropagation
        backpropagate(&mut self.table, &path, leaf_value, cpuct);
        self.elapsed_steps += 1;
        self.elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
        Ok(())
    }

    /// Evaluates `state` and stores it under `key`
    fn create_node(&mut self, key: E::Key, state: E::State) -> Result<(NodeId, f64)> {
        let legal = self.env.legal_action_count(&state);
        if legal == 0 {
            return Err(MctsPolicyError::NoLegalActions);
        }

        let evaluation = self.evaluator.evaluate(&state)?;
        if evaluation.prior.len() != legal {
            return Err(MctsPolicyError::InvalidPrior(format!(
                "expected {} entries, got {}",
                legal,
                evaluation.prior.len()
            )));
        }
        if let Some(bad) = evaluation
            .prior
            .iter()
            .find(|p| !p.is_finite() || **p < 0.0)
        {
            return Err(MctsPolicyError::InvalidPrior(format!(
                "entries must be finite and non-negative, got {}",
                bad
            )));
        }
        if !evaluation.value.is_finite() {
            return Err(MctsPolicyError::Evaluator(format!(
                "value estimate must be finite, got {}",
                evaluation.value
            )));
        }

        log::trace!("expanding {:?} with value {:.4}", key, evaluation.value);
        let prior = normalize_prior(&evaluation.prior);
        let id = self
            .table
            .insert(Node::new(key, state, prior, evaluation.value));
        Ok((id, evaluation.value))
    }

    fn link(&mut self, parent: NodeId, action: usize, child: Child, reward: f64) {
        let node = self.table.get_mut(parent);
        node.children[action] = Some(child);
        node.reward[action] = reward;
    }

    fn budget_exhausted(&self) -> bool {
        if let Some(max_step) = self.params.step_budget() {
            if self.elapsed_steps >= max_step {
                return true;
            }
        }
        match self.params.time_budget() {
            Some(limit) => self.elapsed >= limit,
            None => false,
        }
    }

    /// Snapshot of the root as it stands, `None` before the first `start`
    pub fn root_statistics(&self) -> Option<RootStatistics> {
        let root = self.root?;
        Some(RootStatistics::from_root(
            self.table.get(root),
            self.elapsed_steps,
            self.elapsed(),
            self.table.len(),
        ))
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node<E::Key, E::State> {
        self.table.get(id)
    }

    /// Node stored for a transposition key
    pub fn lookup(&self, key: &E::Key) -> Option<NodeId> {
        self.table.lookup(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node<E::Key, E::State>)> {
        self.table.iter()
    }

    pub fn tree_size(&self) -> usize {
        self.table.len()
    }

    /// Completed simulations since the last `start`
    pub fn simulations(&self) -> u64 {
        self.elapsed_steps
    }

    /// Wall-clock time from `start` to the end of the last completed simulation
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn params(&self) -> &MCTSHyperparameters {
        &self.params
    }
}
