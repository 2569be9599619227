//! Satisfiability of a closed formula, with witness extraction over a relaxed state.

use std::ops::ControlFlow;

use crate::csp::witness::for_each_assignment;
use crate::csp::witness::AscendingValues;
use crate::csp::witness::ChoiceValuation;
use crate::csp::witness::MinLayerValues;
use crate::csp::witness::ValueOrder;
use crate::language::interpreter::Interpreter;
use crate::language::Binding;
use crate::language::Formula;
use crate::problem::AtomId;
use crate::problem::Problem;
use crate::problem::State;
use crate::problem::VariableId;
use crate::rpg::RelaxedState;
use crate::rpg::RpgBookkeeping;

/// A closed formula compiled for repeated satisfaction checks: the goal conjoined with the
/// state constraints, typically.
///
/// Against a concrete state the check is plain interpretation. Against a relaxed state the check
/// is existential and, on success, returns the set of atoms that witness it; these `causes` are
/// the roots of the backward relaxed-plan extraction.
#[derive(Debug, Clone)]
pub struct FormulaCsp {
    formula: Formula,
    scope: Vec<VariableId>,
}

impl FormulaCsp {
    /// Compile a closed formula. The scope is fixed because the formula has no free parameters.
    pub fn new(problem: &Problem, formula: Formula) -> FormulaCsp {
        let interpreter = Interpreter::new(problem.table());
        let mut binding = Binding::empty();
        let mut scope = Vec::new();
        interpreter.collect_formula_scope(&formula, &mut binding, &mut scope);
        scope.sort();
        scope.dedup();
        FormulaCsp { formula, scope }
    }

    /// The goal of the problem conjoined with its state constraints.
    pub fn goal(problem: &Problem) -> FormulaCsp {
        let formula = problem
            .goal()
            .clone()
            .conjoin(problem.state_constraints().clone());
        FormulaCsp::new(problem, formula)
    }

    /// Whether the formula holds in a concrete state.
    pub fn satisfied_in(&self, problem: &Problem, state: &State) -> bool {
        let interpreter = Interpreter::new(problem.table());
        let mut binding = Binding::empty();
        interpreter.formula_holds(&self.formula, state, &mut binding)
    }

    /// Whether the formula is satisfiable in the relaxed state; on success the witnessing atoms
    /// are returned.
    ///
    /// With `min_layer_values` set, candidate values are tried in order of the layer at which
    /// their atom was first achieved (ties by atom index), so the returned causes prefer cheap
    /// atoms. Otherwise values are tried in ascending order. Either order is deterministic.
    pub fn find_witness(
        &self,
        problem: &Problem,
        relaxed: &RelaxedState,
        bookkeeping: &RpgBookkeeping,
        min_layer_values: bool,
    ) -> Option<Vec<AtomId>> {
        if min_layer_values {
            let order = MinLayerValues {
                relaxed,
                bookkeeping,
                atom_index: problem.atom_index(),
            };
            self.search(problem, &order)
        } else {
            let order = AscendingValues { relaxed };
            self.search(problem, &order)
        }
    }

    fn search<O: ValueOrder>(&self, problem: &Problem, order: &O) -> Option<Vec<AtomId>> {
        let interpreter = Interpreter::new(problem.table());
        let mut valuation = ChoiceValuation::default();
        let mut binding = Binding::empty();
        let mut causes = None;

        let _ = for_each_assignment(
            order,
            &self.scope,
            &mut valuation,
            &mut |candidate: &ChoiceValuation| {
                if interpreter.formula_holds(&self.formula, candidate, &mut binding) {
                    causes = Some(candidate.chosen_atoms(&self.scope, problem.atom_index()));
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );

        causes
    }
}
