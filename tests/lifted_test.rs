//! The atom-centric pass on partially ground actions, quantified goals, and non-boolean
//! domains.

mod helpers;

use stratum::heuristics::DirectCrpg;
use stratum::heuristics::DirectHmax;
use stratum::heuristics::Heuristic;
use stratum::heuristics::HeuristicValue;
use stratum::heuristics::UnreachedAtomRpg;
use stratum::language::Formula;
use stratum::language::QuantifiedVariable;
use stratum::language::Term;
use stratum::options::HeuristicOptions;
use stratum::problem::Action;
use stratum::problem::ActionEffect;
use stratum::problem::Atom;
use stratum::problem::Problem;
use stratum::problem::SymbolId;
use stratum::problem::SymbolTable;
use stratum::problem::TypeId;
use stratum::problem::Value;
use stratum::problem::TRUE;

/// Two blocks, per-block `ready`/`marked` predicates, and a lifted `mark(x)` action. The goal
/// is built by the caller from the marked symbol, the block type, and the two block values.
fn marking_problem(make_goal: impl FnOnce(SymbolId, TypeId, Value, Value) -> Formula) -> Problem {
    let mut table = SymbolTable::new();
    let block = table.add_type("block");
    let a = table.add_object("a", block);
    let b = table.add_object("b", block);
    let ready = table.add_predicate("ready", vec![block]);
    let marked = table.add_predicate("marked", vec![block]);
    let ready_a = table.add_state_variable(ready, vec![a]).unwrap();
    let ready_b = table.add_state_variable(ready, vec![b]).unwrap();
    let _ = table.add_state_variable(marked, vec![a]).unwrap();
    let _ = table.add_state_variable(marked, vec![b]).unwrap();

    let mark = Action::lifted(
        "mark",
        vec![block],
        Formula::eq(
            Term::application(ready, vec![Term::parameter(0)]),
            Term::constant(TRUE),
        ),
        vec![ActionEffect::unconditional(
            Term::application(marked, vec![Term::parameter(0)]),
            Term::constant(TRUE),
        )],
    );

    let goal = make_goal(marked, block, a, b);
    Problem::new(
        table,
        vec![Atom::new(ready_a, TRUE), Atom::new(ready_b, TRUE)],
        goal,
        Formula::Tautology,
        vec![mark],
        true,
    )
    .unwrap()
}

#[test]
fn two_instantiations_of_one_schema_count_separately() {
    let problem = marking_problem(|marked, _block, a, b| {
        Formula::and(vec![
            Formula::eq(
                Term::application(marked, vec![Term::constant(a)]),
                Term::constant(TRUE),
            ),
            Formula::eq(
                Term::application(marked, vec![Term::constant(b)]),
                Term::constant(TRUE),
            ),
        ])
    });

    let mut unreached = UnreachedAtomRpg::new(&problem, HeuristicOptions::default());
    assert_eq!(
        unreached.evaluate(problem.initial_state()),
        HeuristicValue::Estimate(2)
    );

    let plan = unreached.last_relaxed_plan().unwrap();
    assert_eq!(plan.len(), 2);
    // Same schema, two different bindings.
    assert_eq!(plan.steps[0].action, plan.steps[1].action);
    assert_ne!(plan.steps[0].binding, plan.steps[1].binding);

    // Both marked atoms are produced by the same handler; within that layer it is
    // instantiated once and reused for the second atom.
    let statistics = unreached.statistics();
    assert!(statistics.num_effect_csp_cache_hits >= 1);
}

#[test]
fn an_existential_goal_needs_a_single_instantiation() {
    let problem = marking_problem(|marked, block, _a, _b| {
        // The lifted action occupies parameter slot 0, the quantifier uses its own slot.
        Formula::exists(
            vec![QuantifiedVariable {
                parameter: 1,
                ty: block,
            }],
            Formula::eq(
                Term::application(marked, vec![Term::parameter(1)]),
                Term::constant(TRUE),
            ),
        )
    });

    let mut unreached = UnreachedAtomRpg::new(&problem, HeuristicOptions::default());
    assert_eq!(
        unreached.evaluate(problem.initial_state()),
        HeuristicValue::Estimate(1)
    );
}

/// A bounded counter bumped through a static successor table.
fn counter_problem() -> Problem {
    let mut table = SymbolTable::new();
    let count = table.add_interval_type("count", 0, 3);
    let succ = table.add_static_function("succ", vec![count], count);
    table.set_static_mapping(succ, vec![0], 1);
    table.set_static_mapping(succ, vec![1], 2);
    table.set_static_mapping(succ, vec![2], 3);
    table.set_static_mapping(succ, vec![3], 3);
    let tally = table.add_fluent_function("tally", vec![], count);
    let tally_var = table.add_state_variable(tally, vec![]).unwrap();

    let bump = Action::ground(
        "bump",
        Formula::Tautology,
        vec![ActionEffect::unconditional(
            Term::state_variable(tally_var),
            Term::application(succ, vec![Term::state_variable(tally_var)]),
        )],
    );

    Problem::new(
        table,
        vec![Atom::new(tally_var, 0)],
        Formula::eq(Term::state_variable(tally_var), Term::constant(3)),
        Formula::Tautology,
        vec![bump],
        true,
    )
    .unwrap()
}

#[test]
fn a_counter_goal_appears_at_its_distance_layer() {
    let problem = counter_problem();

    // tally reaches 3 only at layer 3, one new value per layer.
    let mut hmax = DirectHmax::new(&problem, HeuristicOptions::default()).unwrap();
    assert_eq!(
        hmax.evaluate(problem.initial_state()),
        HeuristicValue::Estimate(3)
    );

    // The extracted plan deduplicates the single bump action, so the relaxed-plan cost
    // collapses to 1.
    let mut crpg = DirectCrpg::new(&problem, HeuristicOptions::default()).unwrap();
    assert_eq!(
        crpg.evaluate(problem.initial_state()),
        HeuristicValue::Estimate(1)
    );
}

#[test]
fn action_costs_are_summed_by_the_extractor() {
    let mut table = SymbolTable::new();
    let p = table.add_predicate("p", vec![]);
    let q = table.add_predicate("q", vec![]);
    let p_var = table.add_state_variable(p, vec![]).unwrap();
    let q_var = table.add_state_variable(q, vec![]).unwrap();

    let expensive = Action::ground(
        "expensive",
        Formula::eq(Term::state_variable(p_var), Term::constant(TRUE)),
        vec![ActionEffect::unconditional(
            Term::state_variable(q_var),
            Term::constant(TRUE),
        )],
    )
    .with_cost(5);

    let problem = Problem::new(
        table,
        vec![Atom::new(p_var, TRUE)],
        Formula::eq(Term::state_variable(q_var), Term::constant(TRUE)),
        Formula::Tautology,
        vec![expensive],
        true,
    )
    .unwrap();

    let mut crpg = DirectCrpg::new(&problem, HeuristicOptions::default()).unwrap();
    assert_eq!(
        crpg.evaluate(problem.initial_state()),
        HeuristicValue::Estimate(5)
    );
}

#[test]
fn the_min_layer_value_selector_is_deterministic() {
    let problem = counter_problem();
    let options = HeuristicOptions {
        use_min_hmax_value_selector: true,
        ..Default::default()
    };
    let mut first = DirectCrpg::new(&problem, options).unwrap();
    let mut second = DirectCrpg::new(&problem, options).unwrap();

    let h1 = first.evaluate(problem.initial_state());
    let h2 = second.evaluate(problem.initial_state());
    assert_eq!(h1, h2);
    assert_eq!(
        first.last_relaxed_plan().unwrap(),
        second.last_relaxed_plan().unwrap()
    );
}
