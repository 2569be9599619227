//! Bindings from parameter slots to values.

use crate::problem::symbols::Value;

/// A (possibly partial) assignment of values to parameter slots.
///
/// Action parameters and quantified variables share one slot space per action or formula; a slot
/// is bound while its quantifier is being instantiated or its parameter has been fixed by the
/// grounder, and unbound otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    slots: Vec<Option<Value>>,
}

impl Binding {
    /// The empty binding, suitable for closed formulas.
    pub fn empty() -> Binding {
        Binding::default()
    }

    /// A binding with the first `values.len()` slots bound, as produced for a fully ground
    /// action.
    pub fn from_values(values: &[Value]) -> Binding {
        Binding {
            slots: values.iter().map(|&value| Some(value)).collect(),
        }
    }

    pub fn value(&self, slot: usize) -> Option<Value> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn is_bound(&self, slot: usize) -> bool {
        self.value(slot).is_some()
    }

    pub fn bind(&mut self, slot: usize, value: Value) {
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, None);
        }
        self.slots[slot] = Some(value);
    }

    pub fn unbind(&mut self, slot: usize) {
        if slot < self.slots.len() {
            self.slots[slot] = None;
        }
    }
}
