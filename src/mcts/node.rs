//! Search tree nodes
//!
//! A node stands for one distinct environment state. All statistics live on
//! the node's outgoing edges, indexed by action: visit counts, summed returns,
//! the evaluator prior, the last observed reward and the child link.

/// Index of a node in the transposition arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where an edge leads once it has been traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    /// Non-terminal successor stored in the arena
    Node(NodeId),
    /// The transition ended the episode; nothing to expand
    Terminal,
}

/// A node in the MCTS tree
#[derive(Debug, Clone)]
pub struct Node<K, S> {
    /// Canonical key of `state`, fixed for the node's lifetime
    pub key: K,

    /// Environment state, never mutated by the engine
    pub state: S,

    /// Number of times each action was selected and followed
    pub visit_count: Vec<u64>,

    /// Sum of returns credited to each action
    pub total_value: Vec<f64>,

    /// Normalised evaluator prior, fixed at expansion
    pub prior: Vec<f64>,

    /// Immediate reward seen the last time each action was taken
    pub reward: Vec<f64>,

    /// Child reached through each action, `None` until first traversal
    pub children: Vec<Option<Child>>,

    /// Evaluator value at expansion; stands in for Q on unvisited actions
    pub value_estimate: f64,

    /// UCB scores as of the last backpropagation through this node
    pub last_ucb: Vec<f64>,
}

impl<K, S> Node<K, S> {
    /// Creates an unvisited node with the given (already normalised) prior
    pub fn new(key: K, state: S, prior: Vec<f64>, value_estimate: f64) -> Self {
        let actions = prior.len();
        Node {
            key,
            state,
            visit_count: vec![0; actions],
            total_value: vec![0.0; actions],
            prior,
            reward: vec![0.0; actions],
            children: vec![None; actions],
            last_ucb: vec![value_estimate; actions],
            value_estimate,
        }
    }

    pub fn action_count(&self) -> usize {
        self.prior.len()
    }

    /// Total visits over all actions
    pub fn visit_sum(&self) -> u64 {
        self.visit_count.iter().sum()
    }

    /// Mean return of `action`, or the node's value estimate when unvisited
    pub fn mean_value(&self, action: usize) -> f64 {
        let n = self.visit_count[action];
        if n == 0 {
            self.value_estimate
        } else {
            self.total_value[action] / n as f64
        }
    }

    /// Credits one traversal of `action` with return `value`
    pub fn record(&mut self, action: usize, value: f64) {
        self.visit_count[action] += 1;
        self.total_value[action] += value;
    }

    /// Checks if every action has been traversed at least once
    pub fn is_fully_expanded(&self) -> bool {
        self.children.iter().all(Option::is_some)
    }
}

/// Normalises a raw evaluator prior so it sums to one.
///
/// An all-zero prior becomes uniform. Entries must already be non-negative
/// and finite.
pub fn normalize_prior(raw: &[f64]) -> Vec<f64> {
    let total: f64 = raw.iter().sum();
    if total > 0.0 && total.is_finite() {
        raw.iter().map(|p| p / total).collect()
    } else {
        vec![1.0 / raw.len() as f64; raw.len()]
    }
}
