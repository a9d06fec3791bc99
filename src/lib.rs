//! # MCTS Policy Library
//!
//! A budgeted Monte Carlo Tree Search controller over pluggable, possibly
//! stochastic, single-agent decision environments.
//!
//! ## Features
//!
//! - **Search Engine**: selection, expansion, evaluation and backpropagation under
//!   a step or wall-clock budget
//! - **Transposition Table**: states reached through different move orders share one node
//! - **Environments**: the `Environment` trait plus a synthetic binary-decision tree
//! - **Evaluators**: uniform placeholder and random-rollout leaf evaluators
//!
//! ## Usage
//!
//! ```rust
//! use mcts_policy::{
//!     game::binary_tree::BinaryTreeEnv,
//!     mcts::{MCTSHyperparameters, MctsEngine, UniformEvaluator},
//! };
//!
//! let mut env = BinaryTreeEnv::with_rewards(2, vec![0.1, 0.9, 0.2, 0.3]).unwrap();
//! let mut evaluator = UniformEvaluator::new(2);
//! let params = MCTSHyperparameters::default().with_max_step(2_000);
//! let mut engine = MctsEngine::new(&mut env, &mut evaluator, params).unwrap();
//! let stats = engine.forward(BinaryTreeEnv::root_state()).unwrap();
//! assert_eq!(stats.best_action(), Some(0));
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Environment adapters and the synthetic test environment
pub mod game;

/// Monte Carlo Tree Search engine
pub mod mcts;

/// Logger initialisation for binaries
pub mod logging;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

/// Environment trait and implementations
pub use game::*;

/// MCTS engine exports
pub use mcts::*;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Main error type for the MCTS policy library
#[derive(Debug, thiserror::Error)]
pub enum MctsPolicyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Illegal action {action} (legal action count: {legal})")]
    IllegalAction { action: usize, legal: usize },

    #[error("State has no legal actions")]
    NoLegalActions,

    #[error("Invalid prior: {0}")]
    InvalidPrior(String),

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Evaluator error: {0}")]
    Evaluator(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Logging error: {0}")]
    Logging(#[from] flexi_logger::FlexiLoggerError),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MctsPolicyError>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
