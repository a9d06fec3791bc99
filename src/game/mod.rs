pub mod binary_tree;
pub mod environment;

pub use environment::{Environment, Transition};
