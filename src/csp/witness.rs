//! Enumeration of candidate valuations over a relaxed state.
//!
//! Satisfaction under a relaxed state is existential: a formula holds if *some* choice of one
//! reached value per mentioned state variable satisfies it. The enumeration below is the shared
//! backbone of the applicability checks, the goal-satisfaction witness, and the effect-CSP
//! instantiations. Its iteration order is part of the engine's determinism contract: variables
//! are visited in ascending id order and values in the order dictated by the [`ValueOrder`].

use std::ops::ControlFlow;

use crate::containers::HashMap;
use crate::problem::state::Valuation;
use crate::problem::Atom;
use crate::problem::AtomIndex;
use crate::problem::Value;
use crate::problem::VariableId;
use crate::rpg::RelaxedState;
use crate::rpg::RpgBookkeeping;

/// A candidate valuation built up during enumeration: one chosen value per scope variable.
#[derive(Debug, Default)]
pub(crate) struct ChoiceValuation {
    choices: HashMap<VariableId, Value>,
}

impl ChoiceValuation {
    pub(crate) fn set(&mut self, variable: VariableId, value: Value) {
        let _ = self.choices.insert(variable, value);
    }

    pub(crate) fn clear(&mut self, variable: VariableId) {
        let _ = self.choices.remove(&variable);
    }

    /// The chosen atoms, restricted to those the index can represent, in scope order.
    pub(crate) fn chosen_atoms(
        &self,
        scope: &[VariableId],
        atom_index: &AtomIndex,
    ) -> Vec<crate::problem::AtomId> {
        let mut atoms: Vec<crate::problem::AtomId> = scope
            .iter()
            .filter_map(|&variable| {
                let value = self.choices[&variable];
                atom_index.index_of(Atom::new(variable, value))
            })
            .collect();
        atoms.sort();
        atoms.dedup();
        atoms
    }
}

impl Valuation for ChoiceValuation {
    fn value_of(&self, variable: VariableId) -> Value {
        self.choices[&variable]
    }
}

/// The order in which reached values of a variable are tried during enumeration.
pub(crate) trait ValueOrder {
    fn ordered_values(&self, variable: VariableId) -> Vec<Value>;
}

/// Values in ascending order, exactly as the relaxed state stores them.
pub(crate) struct AscendingValues<'a> {
    pub(crate) relaxed: &'a RelaxedState,
}

impl ValueOrder for AscendingValues<'_> {
    fn ordered_values(&self, variable: VariableId) -> Vec<Value> {
        self.relaxed.values(variable).to_vec()
    }
}

/// Values ordered by the layer at which their atom was first achieved, so that goal witnesses
/// prefer cheap (early) atoms. Equal layers are tied-broken by atom index, which keeps the
/// selection deterministic.
pub(crate) struct MinLayerValues<'a> {
    pub(crate) relaxed: &'a RelaxedState,
    pub(crate) bookkeeping: &'a RpgBookkeeping,
    pub(crate) atom_index: &'a AtomIndex,
}

impl ValueOrder for MinLayerValues<'_> {
    fn ordered_values(&self, variable: VariableId) -> Vec<Value> {
        let mut ranked: Vec<(u32, u32, Value)> = self
            .relaxed
            .values(variable)
            .iter()
            .map(|&value| {
                match self.atom_index.index_of(Atom::new(variable, value)) {
                    Some(id) => {
                        // Unreached values sort last; they cannot occur for values drawn from
                        // the relaxed state, but the order must still be total.
                        let layer = self.bookkeeping.layer(id).unwrap_or(u32::MAX);
                        (layer, id.id(), value)
                    }
                    None => (u32::MAX, u32::MAX, value),
                }
            })
            .collect();
        ranked.sort();
        ranked.into_iter().map(|(_, _, value)| value).collect()
    }
}

/// Run `visit` for every assignment of the scope variables to reached values, in deterministic
/// order. `visit` may stop the enumeration early by returning [`ControlFlow::Break`].
pub(crate) fn for_each_assignment<O: ValueOrder>(
    order: &O,
    scope: &[VariableId],
    valuation: &mut ChoiceValuation,
    visit: &mut impl FnMut(&ChoiceValuation) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let Some((&variable, rest)) = scope.split_first() else {
        return visit(valuation);
    };
    for value in order.ordered_values(variable) {
        valuation.set(variable, value);
        for_each_assignment(order, rest, valuation, visit)?;
    }
    valuation.clear(variable);
    ControlFlow::Continue(())
}
