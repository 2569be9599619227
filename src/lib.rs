//! # Stratum
//! Stratum is a relaxed-planning-graph heuristic engine for classical planning over a
//! finite-domain lifted action language with function symbols and quantified conditions.
//!
//! The engine consumes an immutable [`Problem`] description (typed objects, state variables, an
//! initial state, a goal formula, state constraints, and ground or partially ground actions)
//! and answers one question for any seed state: how far is the goal, under delete relaxation?
//! Search algorithms sit on top and steer by that number.
//!
//! Three heuristic variants are available, selectable through
//! [`options::HeuristicOptions`]:
//! * [`heuristics::DirectCrpg`] — action-centric graph expansion scored by the cost of an
//!   extracted relaxed plan (an h_FF-style estimator).
//! * [`heuristics::DirectHmax`] — the same expansion scored by the index of the first layer in
//!   which the goal becomes satisfiable (an h_max-style estimator).
//! * [`heuristics::UnreachedAtomRpg`] — atom-centric expansion in which every not-yet-reached
//!   atom searches its potential achievers, each backed by a per-effect constraint problem that
//!   is instantiated at most once per layer.
//!
//! # Using Stratum
//! A problem is assembled from a [`problem::SymbolTable`] plus the initial state, goal, state
//! constraints, and actions; everything is validated when the [`Problem`] is constructed:
//! ```rust
//! use stratum::heuristics::{DirectCrpg, Heuristic, HeuristicValue};
//! use stratum::language::{Formula, Term};
//! use stratum::options::HeuristicOptions;
//! use stratum::problem::{Action, ActionEffect, Atom, Problem, SymbolTable, TRUE};
//!
//! // Two propositions, p and q.
//! let mut table = SymbolTable::new();
//! let p = table.add_predicate("p", vec![]);
//! let q = table.add_predicate("q", vec![]);
//! let p_var = table.add_state_variable(p, vec![]).unwrap();
//! let q_var = table.add_state_variable(q, vec![]).unwrap();
//!
//! // One action: when p holds, make q hold.
//! let reach = Action::ground(
//!     "reach",
//!     Formula::eq(Term::state_variable(p_var), Term::constant(TRUE)),
//!     vec![ActionEffect::unconditional(
//!         Term::state_variable(q_var),
//!         Term::constant(TRUE),
//!     )],
//! );
//!
//! // Initially p holds; the goal is q.
//! let problem = Problem::new(
//!     table,
//!     vec![Atom::new(p_var, TRUE)],
//!     Formula::eq(Term::state_variable(q_var), Term::constant(TRUE)),
//!     Formula::Tautology,
//!     vec![reach],
//!     true,
//! )
//! .unwrap();
//!
//! let mut heuristic = DirectCrpg::new(&problem, HeuristicOptions::default()).unwrap();
//! let h = heuristic.evaluate(problem.initial_state());
//! assert_eq!(h, HeuristicValue::Estimate(1));
//!
//! // The extracted relaxed plan is retained for inspection.
//! let plan = heuristic.last_relaxed_plan().unwrap();
//! assert_eq!(plan.len(), 1);
//! ```
//!
//! # Concurrency
//! The problem description, atom index, and compiled achievers are shared read-only; the
//! relaxed state, bookkeeping, and per-layer caches are owned exclusively by one in-flight
//! evaluation. A parallel outer search hands each worker its own driver.
//!
//! ## Feature flags
//! - `debug-checks`: enable the expensive internal consistency checks. These slow the engine
//!   down considerably, so they are off by default.

pub mod actions;
#[doc(hidden)]
pub mod asserts;
pub mod containers;
pub mod csp;
pub mod error;
pub mod heuristics;
pub mod language;
pub mod options;
pub mod problem;
pub mod rpg;
pub mod statistics;

pub use error::OptionsError;
pub use error::ProblemDefinitionError;
pub use heuristics::Heuristic;
pub use heuristics::HeuristicValue;
pub use options::HeuristicOptions;
pub use options::HeuristicVariant;
pub use problem::Problem;
