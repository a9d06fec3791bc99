//! Arena-backed transposition table.
//!
//! Nodes are stored in a contiguous `Vec` and referenced by `NodeId`. The key
//! map guarantees one node per canonical state key, so every parent reaching
//! the same state links to the same `NodeId`.

use crate::mcts::node::{Node, NodeId};
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug)]
pub struct TranspositionTable<K, S> {
    nodes: Vec<Node<K, S>>,
    index: HashMap<K, NodeId>,
}

impl<K: Eq + Hash + Clone, S> TranspositionTable<K, S> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }

    pub fn lookup(&self, key: &K) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    /// Stores `node` under its own key. The caller must have checked that
    /// the key is absent.
    pub fn insert(&mut self, node: Node<K, S>) -> NodeId {
        debug_assert!(!self.index.contains_key(&node.key));
        let id = NodeId(self.nodes.len() as u32);
        self.index.insert(node.key.clone(), id);
        self.nodes.push(node);
        id
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node<K, S> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<K, S> {
        &mut self.nodes[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<K, S>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }
}

impl<K: Eq + Hash + Clone, S> Default for TranspositionTable<K, S> {
    fn default() -> Self {
        Self::new()
    }
}
