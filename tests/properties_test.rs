//! Checks of the engine's behavioural contracts: determinism, whitelist handling, boundary
//! behaviour, the per-layer CSP memoisation, and the relaxed-plan round trip.

mod helpers;

use std::collections::HashSet;

use helpers::propositional_problem;
use helpers::PropAction;
use stratum::heuristics::DirectCrpg;
use stratum::heuristics::Heuristic;
use stratum::heuristics::HeuristicValue;
use stratum::heuristics::UnreachedAtomRpg;
use stratum::options::HeuristicOptions;
use stratum::problem::Atom;
use stratum::problem::Problem;
use stratum::problem::TRUE;

fn chain() -> Problem {
    let (problem, _) = propositional_problem(
        &["a", "b", "c"],
        &["a"],
        &["c"],
        &[
            PropAction {
                name: "A",
                requires: &["a"],
                adds: &["b"],
            },
            PropAction {
                name: "B",
                requires: &["b"],
                adds: &["c"],
            },
        ],
    );
    problem
}

#[test]
fn evaluations_are_deterministic() {
    let problem = chain();
    let mut crpg = DirectCrpg::new(&problem, HeuristicOptions::default()).unwrap();

    let first = crpg.evaluate(problem.initial_state());
    let first_plan = crpg.last_relaxed_plan().unwrap().clone();
    let second = crpg.evaluate(problem.initial_state());
    let second_plan = crpg.last_relaxed_plan().unwrap().clone();

    assert_eq!(first, second);
    assert_eq!(first_plan, second_plan);
}

#[test]
fn a_goal_seed_returns_zero_without_expanding_a_single_layer() {
    let problem = chain();
    let mut crpg = DirectCrpg::new(&problem, HeuristicOptions::default()).unwrap();

    // A seed that already satisfies the goal:
    let variables: Vec<_> = problem.table().variables().collect();
    let all_true: Vec<Atom> = variables
        .iter()
        .map(|&variable| Atom::new(variable, TRUE))
        .collect();
    let seed = problem.state_from_atoms(&all_true);

    assert_eq!(crpg.evaluate(&seed), HeuristicValue::Estimate(0));
    assert_eq!(crpg.statistics().num_layers_built, 0);
}

#[test]
fn a_problem_without_actions_is_a_dead_end_after_one_sweep() {
    let (problem, _) = propositional_problem(&["p", "q"], &["p"], &["q"], &[]);
    let mut crpg = DirectCrpg::new(&problem, HeuristicOptions::default()).unwrap();

    assert_eq!(
        crpg.evaluate(problem.initial_state()),
        HeuristicValue::Unreachable
    );
    assert_eq!(crpg.statistics().num_layers_built, 0);
    assert_eq!(crpg.statistics().num_dead_ends, 1);
}

#[test]
fn a_tautological_precondition_still_counts_one_action() {
    let (problem, _) = propositional_problem(
        &["g"],
        &[],
        &["g"],
        &[PropAction {
            name: "free",
            requires: &[],
            adds: &["g"],
        }],
    );
    let mut crpg = DirectCrpg::new(&problem, HeuristicOptions::default()).unwrap();

    assert_eq!(
        crpg.evaluate(problem.initial_state()),
        HeuristicValue::Estimate(1)
    );
}

#[test]
fn widening_the_whitelist_never_hurts() {
    let problem = chain();
    let mut crpg = DirectCrpg::new(&problem, HeuristicOptions::default()).unwrap();
    let actions: Vec<_> = problem.actions().collect();

    let full = crpg.evaluate_whitelisted(problem.initial_state(), &actions);
    let only_first = crpg.evaluate_whitelisted(problem.initial_state(), &actions[..1]);
    let empty = crpg.evaluate_whitelisted(problem.initial_state(), &[]);

    assert!(full <= only_first);
    assert!(only_first <= empty);
    assert_eq!(full, HeuristicValue::Estimate(2));
    assert_eq!(only_first, HeuristicValue::Unreachable);
    assert_eq!(empty, HeuristicValue::Unreachable);
}

#[test]
fn the_whitelist_order_does_not_matter() {
    let problem = chain();
    let mut crpg = DirectCrpg::new(&problem, HeuristicOptions::default()).unwrap();
    let actions: Vec<_> = problem.actions().collect();
    let reversed: Vec<_> = actions.iter().rev().copied().collect();

    assert_eq!(
        crpg.evaluate_whitelisted(problem.initial_state(), &actions),
        crpg.evaluate_whitelisted(problem.initial_state(), &reversed)
    );
}

#[test]
fn the_layer_cap_reports_unreachability() {
    let problem = chain();
    let mut crpg = DirectCrpg::new(
        &problem,
        HeuristicOptions {
            max_layers: Some(1),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(
        crpg.evaluate(problem.initial_state()),
        HeuristicValue::Unreachable
    );
}

#[test]
fn extracted_plans_have_no_duplicate_steps() {
    let (problem, _) = propositional_problem(
        &["a", "x", "y", "g"],
        &["a"],
        &["g"],
        &[
            PropAction {
                name: "A1",
                requires: &["a"],
                adds: &["x"],
            },
            PropAction {
                name: "A2",
                requires: &["a"],
                adds: &["y"],
            },
            PropAction {
                name: "B",
                requires: &["x", "y"],
                adds: &["g"],
            },
        ],
    );
    let mut crpg = DirectCrpg::new(&problem, HeuristicOptions::default()).unwrap();
    let value = crpg.evaluate(problem.initial_state());
    let plan = crpg.last_relaxed_plan().unwrap();

    let unique: HashSet<_> = plan.steps.iter().collect();
    assert_eq!(unique.len(), plan.len());
    assert_eq!(value, HeuristicValue::Estimate(plan.cost));
}

/// Simulate the extracted relaxed plan under delete relaxation: apply the chosen actions'
/// effects (keeping old values) until a fixpoint, then the goal must be satisfied by the
/// accumulated atoms.
#[test]
fn the_extracted_plan_reaches_the_goal_under_delete_relaxation() {
    let (problem, variables) = propositional_problem(
        &["a", "x", "y", "g"],
        &["a"],
        &["g"],
        &[
            PropAction {
                name: "A1",
                requires: &["a"],
                adds: &["x"],
            },
            PropAction {
                name: "A2",
                requires: &["a"],
                adds: &["y"],
            },
            PropAction {
                name: "B",
                requires: &["x", "y"],
                adds: &["g"],
            },
        ],
    );
    let mut crpg = DirectCrpg::new(&problem, HeuristicOptions::default()).unwrap();
    let _ = crpg.evaluate(problem.initial_state());
    let plan = crpg.last_relaxed_plan().unwrap().clone();

    // The requirements and additions of the three actions, keyed by name.
    let semantics: std::collections::HashMap<&str, (Vec<&str>, Vec<&str>)> = [
        ("A1", (vec!["a"], vec!["x"])),
        ("A2", (vec!["a"], vec!["y"])),
        ("B", (vec!["x", "y"], vec!["g"])),
    ]
    .into_iter()
    .collect();

    let mut reached: HashSet<&str> = ["a"].into_iter().collect();
    loop {
        let before = reached.len();
        for step in &plan.steps {
            let name = problem.action(step.action).name.as_str();
            let (requires, adds) = &semantics[name];
            if requires.iter().all(|proposition| reached.contains(proposition)) {
                reached.extend(adds.iter().copied());
            }
        }
        if reached.len() == before {
            break;
        }
    }

    assert!(reached.contains("g"));
    let _ = variables;
}

#[test]
fn the_atom_centric_pass_instantiates_each_handler_at_most_once_per_layer() {
    // x and y are produced by two effects of the same action, visited in the same layer.
    let (problem, _) = propositional_problem(
        &["a", "x", "y"],
        &["a"],
        &["x", "y"],
        &[PropAction {
            name: "both",
            requires: &["a"],
            adds: &["x", "y"],
        }],
    );

    let mut unreached = UnreachedAtomRpg::new(&problem, HeuristicOptions::default());
    assert_eq!(
        unreached.evaluate(problem.initial_state()),
        HeuristicValue::Estimate(1)
    );

    let statistics = unreached.statistics();
    // One layer is built; the problem has two handlers (one per effect), and each may be
    // instantiated at most once in that layer.
    assert_eq!(statistics.num_layers_built, 1);
    assert!(statistics.num_effect_csp_instantiations <= 2);
}
