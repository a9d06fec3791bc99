pub mod algorithm;
pub mod evaluator;
pub mod hyperparameters;
pub mod mcts_result;
pub mod node;
pub mod selection;
pub mod transposition;

pub use algorithm::MctsEngine;
pub use evaluator::{Evaluation, Evaluator, RolloutEvaluator, UniformEvaluator};
pub use hyperparameters::{MCTSHyperparameters, TransitionMode};
pub use mcts_result::{ActionStatistics, RootStatistics};
pub use node::{Child, Node, NodeId};
