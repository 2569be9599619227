//! Shared builders for the integration tests: small propositional problems described by name.
#![allow(dead_code)] // used by the integration tests, but not every test binary uses everything

use std::collections::HashMap;

use stratum::language::Formula;
use stratum::language::Term;
use stratum::problem::Action;
use stratum::problem::ActionEffect;
use stratum::problem::Atom;
use stratum::problem::Problem;
use stratum::problem::SymbolTable;
use stratum::problem::VariableId;
use stratum::problem::TRUE;

/// Install a test logger so that `RUST_LOG=debug cargo test` shows the engine's traces.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A propositional action: a name, the propositions its precondition requires to be true, and
/// the propositions its effects make true.
pub struct PropAction<'a> {
    pub name: &'a str,
    pub requires: &'a [&'a str],
    pub adds: &'a [&'a str],
}

/// Build a purely propositional problem from proposition names.
///
/// Every proposition becomes a 0-ary predicate variable; `initial` lists the propositions true
/// in the initial state and `goal` the propositions the goal requires. Returns the problem and
/// the name-to-variable map so tests can build their own seeds and atoms.
pub fn propositional_problem(
    propositions: &[&str],
    initial: &[&str],
    goal: &[&str],
    actions: &[PropAction<'_>],
) -> (Problem, HashMap<String, VariableId>) {
    let mut table = SymbolTable::new();
    let mut variables = HashMap::new();
    for name in propositions {
        let symbol = table.add_predicate(name, vec![]);
        let variable = table.add_state_variable(symbol, vec![]).unwrap();
        let _ = variables.insert((*name).to_owned(), variable);
    }

    let truth = |variable: VariableId| {
        Formula::eq(Term::state_variable(variable), Term::constant(TRUE))
    };

    let initial_atoms: Vec<Atom> = initial
        .iter()
        .map(|name| Atom::new(variables[*name], TRUE))
        .collect();

    let goal_formula = Formula::and(goal.iter().map(|name| truth(variables[*name])).collect());

    let ground_actions: Vec<Action> = actions
        .iter()
        .map(|action| {
            let precondition = if action.requires.is_empty() {
                Formula::Tautology
            } else {
                Formula::and(
                    action
                        .requires
                        .iter()
                        .map(|name| truth(variables[*name]))
                        .collect(),
                )
            };
            let effects = action
                .adds
                .iter()
                .map(|name| {
                    ActionEffect::unconditional(
                        Term::state_variable(variables[*name]),
                        Term::constant(TRUE),
                    )
                })
                .collect();
            Action::ground(action.name, precondition, effects)
        })
        .collect();

    let problem = Problem::new(
        table,
        initial_atoms,
        goal_formula,
        Formula::Tautology,
        ground_actions,
        true,
    )
    .unwrap();

    (problem, variables)
}
