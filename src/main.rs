// main.rs - binary-tree MCTS experiment
use clap::Parser;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::path::PathBuf;

use mcts_policy::game::binary_tree::{BinaryState, BinaryTreeEnv};
use mcts_policy::logging::setup_logging;
use mcts_policy::mcts::{
    Evaluator, MCTSHyperparameters, MctsEngine, RolloutEvaluator, RootStatistics,
    UniformEvaluator,
};
use mcts_policy::Result;

#[derive(Parser, Debug)]
#[command(name = "mcts_policy")]
#[command(about = "Search a random binary decision tree and check that MCTS finds the better branch")]
struct Config {
    /// Maximum number of simulations (0 disables the step budget)
    #[arg(long, default_value_t = 10_000)]
    max_step: u64,

    /// Maximum search time in seconds (0 disables the time budget)
    #[arg(long, default_value_t = 100.0)]
    max_time: f64,

    /// Depth of the binary decision tree
    #[arg(long, default_value_t = 2)]
    max_depth: usize,

    /// Exploration constant
    #[arg(long, default_value_t = 1.5)]
    cpuct: f64,

    /// RNG seed for the reward table and rollouts
    #[arg(long, default_value_t = 2025)]
    seed: u64,

    /// Evaluate leaves with random rollouts instead of the uniform placeholder
    #[arg(long, default_value_t = false)]
    rollout: bool,

    /// JSON file with search hyperparameters, overrides the search flags
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write rotating log files to this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Config {
    fn hyperparameters(&self) -> Result<MCTSHyperparameters> {
        match &self.config {
            Some(path) => MCTSHyperparameters::from_json_file(path),
            None => Ok(MCTSHyperparameters::default()
                .with_cpuct(self.cpuct)
                .with_max_step(self.max_step)
                .with_max_time(self.max_time)),
        }
    }
}

fn search<V>(
    env: &mut BinaryTreeEnv,
    evaluator: &mut V,
    params: MCTSHyperparameters,
) -> Result<RootStatistics>
where
    V: Evaluator<BinaryState>,
{
    let mut engine = MctsEngine::new(env, evaluator, params)?;
    engine.forward(BinaryTreeEnv::root_state())
}

fn main() -> Result<()> {
    let config = Config::parse();
    let _logger = setup_logging(config.log_dir.as_deref())?;

    let params = config.hyperparameters()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut env = BinaryTreeEnv::random(config.max_depth, &mut rng)?;

    log::info!("Reward vector for all leaf nodes:");
    for (leaf, reward) in env.rewards().iter().enumerate() {
        log::info!("\t{} {:.6}", leaf, reward);
    }
    log::info!("Max reward per root action: {:?}", env.max_reward());
    log::info!("MCTS will search with {}", params.to_config_string());

    let stats = if config.rollout {
        let mut evaluator = RolloutEvaluator::new(env.clone(), rng.random());
        search(&mut env, &mut evaluator, params)?
    } else {
        let mut evaluator = UniformEvaluator::new(2);
        search(&mut env, &mut evaluator, params)?
    };

    log::info!(
        "On root node after {} simulations ({:?}):\n\tN is {:?}.\n\tQ is {:?}.\n\tucb {:?}.",
        stats.simulations,
        stats.elapsed,
        stats.visit_counts(),
        stats.mean_values(),
        stats.ucb_scores()
    );

    match stats.best_action() {
        Some(action) if action == env.best_action() => {
            log::info!("MCTS found the right action successfully!");
        }
        Some(action) => {
            log::info!(
                "MCTS failed, it selects action {} on the root node (expected {}).",
                action,
                env.best_action()
            );
        }
        None => log::info!("MCTS returned no root action."),
    }

    Ok(())
}
