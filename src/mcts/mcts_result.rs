use crate::mcts::node::Node;
use crate::mcts::selection::argmax;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Statistics of one root action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStatistics {
    pub visit_count: u64,
    pub mean_value: f64,
    pub ucb: f64,
    pub prior: f64,
}

/// Snapshot of the root node taken when a search finishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootStatistics {
    pub actions: Vec<ActionStatistics>,
    pub simulations: u64,
    pub elapsed: Duration,
    /// Number of distinct states in the transposition table
    pub tree_size: usize,
}

impl RootStatistics {
    pub(crate) fn from_root<K, S>(
        root: &Node<K, S>,
        simulations: u64,
        elapsed: Duration,
        tree_size: usize,
    ) -> Self {
        let actions = (0..root.action_count())
            .map(|a| ActionStatistics {
                visit_count: root.visit_count[a],
                mean_value: root.mean_value(a),
                ucb: root.last_ucb[a],
                prior: root.prior[a],
            })
            .collect();

        RootStatistics {
            actions,
            simulations,
            elapsed,
            tree_size,
        }
    }

    pub fn visit_counts(&self) -> Vec<u64> {
        self.actions.iter().map(|s| s.visit_count).collect()
    }

    pub fn mean_values(&self) -> Vec<f64> {
        self.actions.iter().map(|s| s.mean_value).collect()
    }

    pub fn ucb_scores(&self) -> Vec<f64> {
        self.actions.iter().map(|s| s.ucb).collect()
    }

    /// Action with the highest mean value, lowest index on ties
    pub fn best_action(&self) -> Option<usize> {
        argmax(&self.mean_values())
    }

    /// Action with the most visits, lowest index on ties
    pub fn most_visited_action(&self) -> Option<usize> {
        let visits: Vec<f64> = self.actions.iter().map(|s| s.visit_count as f64).collect();
        argmax(&visits)
    }

    /// Visit counts normalised to a probability distribution
    pub fn visit_distribution(&self) -> Vec<f64> {
        let total: u64 = self.actions.iter().map(|s| s.visit_count).sum();
        if total == 0 {
            return vec![0.0; self.actions.len()];
        }
        self.actions
            .iter()
            .map(|s| s.visit_count as f64 / total as f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_root() -> Node<u8, ()> {
        let mut root = Node::new(0, (), vec![0.5, 0.5], 0.0);
        root.record(0, 0.9);
        root.record(0, 0.7);
        root.record(1, 0.3);
        root.last_ucb = vec![1.2, 1.1];
        root
    }

    #[test]
    fn test_snapshot_from_root() {
        let stats = RootStatistics::from_root(&sample_root(), 3, Duration::from_millis(5), 4);

        assert_eq!(stats.visit_counts(), vec![2, 1]);
        assert!((stats.mean_values()[0] - 0.8).abs() < 1e-12);
        assert_eq!(stats.ucb_scores(), vec![1.2, 1.1]);
        assert_eq!(stats.simulations, 3);
        assert_eq!(stats.tree_size, 4);
        assert_eq!(stats.best_action(), Some(0));
        assert_eq!(stats.most_visited_action(), Some(0));
    }

    #[test]
    fn test_visit_distribution() {
        let stats = RootStatistics::from_root(&sample_root(), 3, Duration::ZERO, 1);
        let dist = stats.visit_distribution();
        assert!((dist[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_serializes_to_json() {
        let stats = RootStatistics::from_root(&sample_root(), 3, Duration::ZERO, 1);
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"visit_count\":2"));
        let back: RootStatistics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.visit_counts(), vec![2, 1]);
        assert_eq!(back.simulations, 3);
    }
}
