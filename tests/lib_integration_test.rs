//! Integration tests for the MCTS policy library public API

use assert_matches::assert_matches;
use mcts_policy::{
    game::binary_tree::{BinaryState, BinaryTreeEnv},
    Child, Environment, Evaluation, Evaluator, MCTSHyperparameters, MctsEngine, MctsPolicyError,
    NodeId, Result, RolloutEvaluator, Transition, TransitionMode, UniformEvaluator, DESCRIPTION,
    NAME, VERSION,
};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::time::{Duration, Instant};

fn steps(n: u64) -> MCTSHyperparameters {
    MCTSHyperparameters::default()
        .with_max_step(n)
        .with_max_time(0.0)
}

/// Grid walk from (0, 0): action 0 moves right, action 1 moves up, the
/// episode ends once `x + y == size`. Moves commute, so (1, 1) is reachable
/// through two different action sequences.
struct LatticeEnv {
    size: u32,
}

impl Environment for LatticeEnv {
    type State = (u32, u32);
    type Key = (u32, u32);

    fn legal_action_count(&self, state: &(u32, u32)) -> usize {
        if state.0 + state.1 >= self.size {
            0
        } else {
            2
        }
    }

    fn is_legal(&self, state: &(u32, u32), action: usize) -> bool {
        action < self.legal_action_count(state)
    }

    fn step(&mut self, state: &(u32, u32), action: usize) -> Result<Transition<(u32, u32)>> {
        let next = if action == 0 {
            (state.0 + 1, state.1)
        } else {
            (state.0, state.1 + 1)
        };
        if next.0 + next.1 == self.size {
            Ok(Transition::terminal(next.0 as f64 / self.size as f64))
        } else {
            Ok(Transition::new(next, 0.0))
        }
    }

    fn hash_key(&self, state: &(u32, u32)) -> (u32, u32) {
        *state
    }
}

/// Binary tree whose environment refuses every action
struct RejectingEnv(BinaryTreeEnv);

impl Environment for RejectingEnv {
    type State = BinaryState;
    type Key = u64;

    fn legal_action_count(&self, state: &BinaryState) -> usize {
        self.0.legal_action_count(state)
    }

    fn is_legal(&self, _state: &BinaryState, _action: usize) -> bool {
        false
    }

    fn step(&mut self, state: &BinaryState, action: usize) -> Result<Transition<BinaryState>> {
        self.0.step(state, action)
    }

    fn hash_key(&self, state: &BinaryState) -> u64 {
        self.0.hash_key(state)
    }
}

/// Environment reporting no action anywhere
struct EmptyEnv;

impl Environment for EmptyEnv {
    type State = ();
    type Key = ();

    fn legal_action_count(&self, _state: &()) -> usize {
        0
    }

    fn is_legal(&self, _state: &(), _action: usize) -> bool {
        false
    }

    fn step(&mut self, _state: &(), _action: usize) -> Result<Transition<()>> {
        Err(MctsPolicyError::Environment("no transitions".to_string()))
    }

    fn hash_key(&self, _state: &()) {}
}

struct EmptyEvaluator;

impl Evaluator<()> for EmptyEvaluator {
    fn evaluate(&mut self, _state: &()) -> Result<Evaluation> {
        Ok(Evaluation {
            prior: vec![],
            value: 0.0,
        })
    }
}

#[test]
fn test_library_metadata() {
    assert!(!VERSION.is_empty());
    assert_eq!(NAME, "mcts_policy");
    assert!(!DESCRIPTION.is_empty());
}

#[test]
fn test_error_messages() {
    let err = MctsPolicyError::IllegalAction { action: 3, legal: 2 };
    assert_eq!(err.to_string(), "Illegal action 3 (legal action count: 2)");

    let err = MctsPolicyError::Configuration("no budget".to_string());
    assert!(err.to_string().contains("no budget"));
}

#[test]
fn test_recovers_best_action_on_fixed_table() {
    let mut env = BinaryTreeEnv::with_rewards(2, vec![0.1, 0.9, 0.2, 0.3]).unwrap();
    assert_eq!(env.max_reward(), [0.9, 0.3]);
    let mut evaluator = UniformEvaluator::new(2);
    let params = steps(10_000).with_cpuct(1.5);
    let mut engine = MctsEngine::new(&mut env, &mut evaluator, params).unwrap();

    let stats = engine.forward(BinaryTreeEnv::root_state()).unwrap();
    assert_eq!(stats.simulations, 10_000);
    assert_eq!(stats.best_action(), Some(0));
    drop(engine);
    assert_eq!(stats.best_action(), Some(env.best_action()));
}

#[test]
fn test_rollout_evaluator_recovers_best_action() {
    let mut env = BinaryTreeEnv::with_rewards(3, vec![0.1, 0.2, 0.95, 0.3, 0.4, 0.5, 0.1, 0.6])
        .unwrap();
    let mut evaluator = RolloutEvaluator::new(env.clone(), 11);
    let mut engine = MctsEngine::new(&mut env, &mut evaluator, steps(5_000)).unwrap();

    let stats = engine.forward(BinaryTreeEnv::root_state()).unwrap();
    assert_eq!(stats.best_action(), Some(0));
}

#[test]
fn test_transpositions_share_one_node() {
    let mut env = LatticeEnv { size: 3 };
    let mut evaluator = UniformEvaluator::new(2);
    let mut engine = MctsEngine::new(&mut env, &mut evaluator, steps(300)).unwrap();
    engine.forward((0, 0)).unwrap();

    let child_of = |id: NodeId, action: usize| match engine.node(id).children[action] {
        Some(Child::Node(next)) => next,
        other => panic!("expected an expanded child, got {:?}", other),
    };

    let root = engine.root().unwrap();
    let right_then_up = child_of(child_of(root, 0), 1);
    let up_then_right = child_of(child_of(root, 1), 0);

    assert_eq!(right_then_up, up_then_right);
    assert_eq!(engine.lookup(&(1, 1)), Some(right_then_up));
    // One node per non-terminal state: x + y < 3
    assert_eq!(engine.tree_size(), 6);
}

#[test]
fn test_visit_conservation() {
    let mut env = BinaryTreeEnv::random(4, &mut StdRng::seed_from_u64(5)).unwrap();
    let mut evaluator = UniformEvaluator::new(2);
    let mut engine = MctsEngine::new(&mut env, &mut evaluator, steps(1_500)).unwrap();
    let stats = engine.forward(BinaryTreeEnv::root_state()).unwrap();

    let root = engine.root().unwrap();
    assert_eq!(engine.node(root).visit_sum(), stats.simulations);

    // Visits entering each node through its parent edges
    let mut inflow: HashMap<NodeId, u64> = HashMap::new();
    for (_, node) in engine.nodes() {
        for (action, child) in node.children.iter().enumerate() {
            if let Some(Child::Node(next)) = child {
                *inflow.entry(*next).or_default() += node.visit_count[action];
            }
        }
    }

    for (id, node) in engine.nodes() {
        if id == root {
            continue;
        }
        // The simulation that created a node stops there
        assert_eq!(node.visit_sum() + 1, inflow[&id], "node {:?}", id);
    }
}

#[test]
fn test_visit_counts_never_decrease() {
    let mut env = LatticeEnv { size: 4 };
    let mut evaluator = UniformEvaluator::new(2);
    let mut engine = MctsEngine::new(&mut env, &mut evaluator, steps(1)).unwrap();
    engine.start((0, 0)).unwrap();

    let mut previous: HashMap<NodeId, Vec<u64>> = HashMap::new();
    for simulation in 1..=200u64 {
        engine.simulate().unwrap();
        assert_eq!(engine.simulations(), simulation);
        for (id, node) in engine.nodes() {
            if let Some(before) = previous.get(&id) {
                assert!(before
                    .iter()
                    .zip(&node.visit_count)
                    .all(|(old, new)| new >= old));
            }
            previous.insert(id, node.visit_count.clone());
        }
    }
}

#[test]
fn test_independent_engines_agree() {
    let run = || {
        let mut env = BinaryTreeEnv::random(3, &mut StdRng::seed_from_u64(17)).unwrap();
        let mut evaluator = RolloutEvaluator::new(env.clone(), 23);
        let mut engine = MctsEngine::new(&mut env, &mut evaluator, steps(2_000)).unwrap();
        engine.forward(BinaryTreeEnv::root_state()).unwrap()
    };

    let a = run();
    let b = run();
    assert_eq!(a.visit_counts(), b.visit_counts());
    assert_eq!(a.mean_values(), b.mean_values());
}

#[test]
fn test_time_budget_runs_until_expiry() {
    let mut env = BinaryTreeEnv::random(6, &mut StdRng::seed_from_u64(1)).unwrap();
    let mut evaluator = UniformEvaluator::new(2);
    let params = MCTSHyperparameters::default()
        .with_max_step(0)
        .with_max_time(0.05);
    let mut engine = MctsEngine::new(&mut env, &mut evaluator, params).unwrap();

    let wall = Instant::now();
    let stats = engine.forward(BinaryTreeEnv::root_state()).unwrap();
    let wall = wall.elapsed().as_secs_f64();

    assert!(stats.simulations >= 1);
    assert!(stats.elapsed.as_secs_f64() >= 0.05);
    // A simulation on a depth-6 tree takes microseconds, so stopping within
    // one simulation of the deadline leaves the search well under this bound
    assert!(stats.elapsed.as_secs_f64() < 0.05 + 0.5, "elapsed {:?}", stats.elapsed);
    assert!(wall < 0.05 + 0.5, "forward took {}s", wall);
    assert_eq!(stats.visit_counts().iter().sum::<u64>(), stats.simulations);

    // Nothing runs once the budget is spent
    let before = engine.simulations();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(engine.simulations(), before);
    assert_eq!(engine.elapsed(), stats.elapsed);
}

/// Environment whose transitions each take a fixed wall-clock time
struct SlowEnv {
    inner: BinaryTreeEnv,
    delay: Duration,
}

impl Environment for SlowEnv {
    type State = BinaryState;
    type Key = u64;

    fn legal_action_count(&self, state: &BinaryState) -> usize {
        self.inner.legal_action_count(state)
    }

    fn is_legal(&self, state: &BinaryState, action: usize) -> bool {
        self.inner.is_legal(state, action)
    }

    fn step(&mut self, state: &BinaryState, action: usize) -> Result<Transition<BinaryState>> {
        std::thread::sleep(self.delay);
        self.inner.step(state, action)
    }

    fn hash_key(&self, state: &BinaryState) -> u64 {
        self.inner.hash_key(state)
    }
}

#[test]
fn test_time_budget_overshoot_is_one_simulation() {
    // Every simulation steps exactly once in stochastic mode
    let mut env = SlowEnv {
        inner: BinaryTreeEnv::random(1, &mut StdRng::seed_from_u64(2)).unwrap(),
        delay: Duration::from_millis(10),
    };
    let mut evaluator = UniformEvaluator::new(2);
    let params = MCTSHyperparameters::default()
        .with_max_step(0)
        .with_max_time(0.1)
        .with_transition_mode(TransitionMode::Stochastic);
    let mut engine = MctsEngine::new(&mut env, &mut evaluator, params).unwrap();

    let stats = engine.forward(BinaryTreeEnv::root_state()).unwrap();
    let elapsed = stats.elapsed.as_secs_f64();
    assert!(elapsed >= 0.1);
    // Sleeps only ever run long, so at most ten 10 ms simulations fit
    assert!(stats.simulations <= 10, "{} simulations", stats.simulations);
    assert!(elapsed < 0.1 + 0.25, "elapsed {}s", elapsed);
}

#[test]
fn test_tiny_time_budget_still_completes_one_simulation() {
    let mut env = BinaryTreeEnv::random(2, &mut StdRng::seed_from_u64(1)).unwrap();
    let mut evaluator = UniformEvaluator::new(2);
    let params = MCTSHyperparameters::default()
        .with_max_step(0)
        .with_max_time(1e-9);
    let mut engine = MctsEngine::new(&mut env, &mut evaluator, params).unwrap();

    let stats = engine.forward(BinaryTreeEnv::root_state()).unwrap();
    assert!(stats.simulations >= 1);
}

#[test]
fn test_step_budget_binds_before_time_budget() {
    let mut env = BinaryTreeEnv::random(2, &mut StdRng::seed_from_u64(1)).unwrap();
    let mut evaluator = UniformEvaluator::new(2);
    let params = MCTSHyperparameters::default()
        .with_max_step(250)
        .with_max_time(60.0);
    let mut engine = MctsEngine::new(&mut env, &mut evaluator, params).unwrap();

    let stats = engine.forward(BinaryTreeEnv::root_state()).unwrap();
    assert_eq!(stats.simulations, 250);
}

#[test]
fn test_no_legal_actions_at_root() {
    let mut env = EmptyEnv;
    let mut evaluator = EmptyEvaluator;
    let mut engine = MctsEngine::new(&mut env, &mut evaluator, steps(10)).unwrap();
    assert_matches!(engine.forward(()), Err(MctsPolicyError::NoLegalActions));
}

#[test]
fn test_illegal_action_is_fatal() {
    let mut env = RejectingEnv(BinaryTreeEnv::with_rewards(1, vec![0.0, 1.0]).unwrap());
    let mut evaluator = UniformEvaluator::new(2);
    let mut engine = MctsEngine::new(&mut env, &mut evaluator, steps(10)).unwrap();

    assert_matches!(
        engine.forward(BinaryTreeEnv::root_state()),
        Err(MctsPolicyError::IllegalAction { action: 0, legal: 2 })
    );
    let stats = engine.root_statistics().unwrap();
    assert_eq!(stats.simulations, 0);
    assert_eq!(stats.visit_counts(), vec![0, 0]);
}

#[test]
fn test_forward_restarts_from_new_root() {
    let mut env = LatticeEnv { size: 3 };
    let mut evaluator = UniformEvaluator::new(2);
    let mut engine = MctsEngine::new(&mut env, &mut evaluator, steps(50)).unwrap();

    engine.forward((0, 0)).unwrap();
    let stats = engine.forward((1, 1)).unwrap();

    assert_eq!(stats.simulations, 50);
    assert_eq!(engine.lookup(&(0, 0)), None);
    assert_eq!(engine.tree_size(), 1);
}
