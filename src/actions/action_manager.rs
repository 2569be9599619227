//! The per-ground-action manager used by the action-centric expansion pass.

use std::ops::ControlFlow;

use log::trace;

use crate::actions::ActionId;
use crate::csp::witness::for_each_assignment;
use crate::csp::witness::AscendingValues;
use crate::csp::witness::ChoiceValuation;
use crate::language::interpreter::Interpreter;
use crate::language::Binding;
use crate::problem::Atom;
use crate::problem::Problem;
use crate::problem::VariableId;
use crate::rpg::RelaxedState;
use crate::rpg::RpgBookkeeping;
use crate::rpg::Support;

/// Precomputed per-effect data: the joint scope of the state variables the effect's
/// applicability and right-hand side can read, and the (fixed) state variable it writes.
#[derive(Debug, Clone)]
struct EffectScope {
    scope: Vec<VariableId>,
    target: VariableId,
}

/// Relaxed-semantics driver for one fully ground action.
///
/// `process` checks the precondition existentially against the relaxed state and, for every
/// conditional effect whose condition can likewise be witnessed, records the induced atoms as
/// novel in the bookkeeping together with one concrete support.
#[derive(Debug, Clone)]
pub(crate) struct GroundActionManager {
    action: ActionId,
    precondition_scope: Vec<VariableId>,
    effects: Vec<EffectScope>,
}

impl GroundActionManager {
    /// Precompute the scopes of a ground action. The action's formulas are closed, so every
    /// fluent application resolves to a fixed state variable here.
    pub(crate) fn new(problem: &Problem, action: ActionId) -> GroundActionManager {
        let interpreter = Interpreter::new(problem.table());
        let data = problem.action(action);
        let mut binding = Binding::empty();

        let mut precondition_scope = Vec::new();
        interpreter.collect_formula_scope(
            &data.precondition,
            &mut binding,
            &mut precondition_scope,
        );
        precondition_scope.sort();
        precondition_scope.dedup();

        let effects = data
            .effects
            .iter()
            .map(|effect| {
                let mut scope = precondition_scope.clone();
                interpreter.collect_formula_scope(&effect.condition, &mut binding, &mut scope);
                interpreter.collect_term_scope(&effect.value, &mut binding, &mut scope);
                scope.sort();
                scope.dedup();
                EffectScope {
                    scope,
                    target: interpreter.resolve_target(&effect.target, &mut binding),
                }
            })
            .collect();

        GroundActionManager {
            action,
            precondition_scope,
            effects,
        }
    }

    pub(crate) fn action(&self) -> ActionId {
        self.action
    }

    /// Whether the precondition can be witnessed by any choice of reached values.
    fn applicable(&self, problem: &Problem, relaxed: &RelaxedState) -> bool {
        let interpreter = Interpreter::new(problem.table());
        let precondition = &problem.action(self.action).precondition;
        let order = AscendingValues { relaxed };
        let mut valuation = ChoiceValuation::default();
        let mut binding = Binding::empty();

        for_each_assignment(
            &order,
            &self.precondition_scope,
            &mut valuation,
            &mut |candidate: &ChoiceValuation| {
                if interpreter.formula_holds(precondition, candidate, &mut binding) {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        )
        .is_break()
    }

    /// Apply the action to the layer under construction.
    ///
    /// Every satisfying choice of reached values induces one atom per effect; atoms achieved at
    /// an earlier layer (or already recorded this layer by an earlier action) are left alone, so
    /// the first achiever wins.
    pub(crate) fn process(
        &self,
        problem: &Problem,
        relaxed: &RelaxedState,
        bookkeeping: &mut RpgBookkeeping,
    ) {
        if !self.applicable(problem, relaxed) {
            trace!("action {} is not applicable in this layer", self.action);
            return;
        }

        let interpreter = Interpreter::new(problem.table());
        let data = problem.action(self.action);
        let order = AscendingValues { relaxed };

        for (effect, scopes) in data.effects.iter().zip(&self.effects) {
            let mut valuation = ChoiceValuation::default();
            let mut binding = Binding::empty();
            let _ = for_each_assignment(
                &order,
                &scopes.scope,
                &mut valuation,
                &mut |candidate: &ChoiceValuation| {
                    if !interpreter.formula_holds(&data.precondition, candidate, &mut binding)
                        || !interpreter.formula_holds(&effect.condition, candidate, &mut binding)
                    {
                        return ControlFlow::Continue(());
                    }
                    let value = interpreter.term_value(&effect.value, candidate, &mut binding);
                    if !problem
                        .table()
                        .value_in_variable_domain(scopes.target, value)
                    {
                        return ControlFlow::Continue(());
                    }
                    let Some(atom_id) = problem
                        .atom_index()
                        .index_of(Atom::new(scopes.target, value))
                    else {
                        return ControlFlow::Continue(());
                    };
                    if !bookkeeping.is_achieved(atom_id) {
                        let atoms = candidate.chosen_atoms(&scopes.scope, problem.atom_index());
                        let _ = bookkeeping.record(
                            atom_id,
                            Support {
                                action: self.action,
                                binding: Vec::new(),
                                atoms,
                            },
                        );
                    }
                    ControlFlow::Continue(())
                },
            );
        }
    }
}
