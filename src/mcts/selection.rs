//! Selection and backpropagation
//!
//! Selection scores every action of a node with
//! `Q(a) + cpuct × P(a) × sqrt(Σ_b N(b)) / (1 + N(a))` and follows the maximum,
//! breaking ties by the lowest action index. Backpropagation walks the recorded
//! path from the leaf back to the root, crediting each edge with the
//! undiscounted reward-to-go and refreshing the node's UCB scores.

use crate::mcts::node::{Node, NodeId};
use crate::mcts::transposition::TranspositionTable;
use std::hash::Hash;

/// One edge followed during a traversal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStep {
    pub node: NodeId,
    pub action: usize,
    /// Immediate reward of this transition
    pub reward: f64,
}

/// UCB score of every action at `node`
pub fn ucb_scores<K, S>(node: &Node<K, S>, cpuct: f64) -> Vec<f64> {
    let sqrt_total = (node.visit_sum() as f64).sqrt();
    (0..node.action_count())
        .map(|a| {
            let exploration =
                cpuct * node.prior[a] * sqrt_total / (1.0 + node.visit_count[a] as f64);
            node.mean_value(a) + exploration
        })
        .collect()
}

/// Index of the largest score, lowest index on ties. `None` for an empty slice.
pub fn argmax(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

/// Selects the action to follow at `node`.
///
/// # Returns
/// The chosen action, or `None` if the node has no actions
pub fn select_action<K, S>(node: &Node<K, S>, cpuct: f64) -> Option<usize> {
    argmax(&ucb_scores(node, cpuct))
}

/// Backpropagates a leaf value along `path`.
///
/// Walking from the leaf towards the root, each edge receives
/// `leaf_value` plus every reward collected from that edge onwards. Every node
/// on the path then stores the UCB scores of its updated statistics.
pub fn backpropagate<K, S>(
    table: &mut TranspositionTable<K, S>,
    path: &[PathStep],
    leaf_value: f64,
    cpuct: f64,
) where
    K: Eq + Hash + Clone,
{
    let mut value = leaf_value;
    for step in path.iter().rev() {
        value += step.reward;
        let node = table.get_mut(step.node);
        node.record(step.action, value);
        node.last_ucb = ucb_scores(node, cpuct);
    }
}
