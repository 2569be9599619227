//! Concrete planning states: a dense assignment from state variables to values.

use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

use fnv::FnvHasher;

use crate::containers::KeyedVec;
use crate::problem::atom_index::Atom;
use crate::problem::symbols::SymbolTable;
use crate::problem::symbols::Value;
use crate::problem::symbols::FALSE;
use crate::problem::symbols::TRUE;
use crate::problem::VariableId;
use crate::stratum_assert_moderate;

/// Anything that assigns a value to every state variable.
///
/// Both concrete [`State`]s and the candidate valuations explored by the witness searches
/// implement this, which lets the formula interpreter run unchanged against either.
pub trait Valuation {
    fn value_of(&self, variable: VariableId) -> Value;
}

/// Maps every state variable to a slot in either the boolean block or the multivalued block of a
/// [`State`].
///
/// Predicate variables are packed separately from multivalued ones so that predicative problems
/// pay one byte per variable. The layout is computed once per problem and shared by all states.
#[derive(Debug)]
pub struct StateLayout {
    /// Per variable: whether it lives in the boolean block, and its offset within its block.
    slots: KeyedVec<VariableId, (bool, u32)>,
    num_bool: usize,
    num_multi: usize,
}

impl StateLayout {
    pub fn new(table: &SymbolTable) -> StateLayout {
        let mut slots = KeyedVec::new();
        let mut num_bool = 0;
        let mut num_multi = 0;
        for variable in table.variables() {
            if table.is_predicate_variable(variable) {
                let _ = slots.push((true, num_bool as u32));
                num_bool += 1;
            } else {
                let _ = slots.push((false, num_multi as u32));
                num_multi += 1;
            }
        }
        StateLayout {
            slots,
            num_bool,
            num_multi,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.slots.len()
    }

    pub fn variables(&self) -> impl Iterator<Item = VariableId> {
        self.slots.keys()
    }
}

/// An assignment from every state variable to a value.
///
/// States are hashable and comparable by value; the hash is computed once per batch of updates
/// and cached, never recomputed in the middle of a batch. Copying a state is a pair of vector
/// clones, which keeps successor generation cheap.
#[derive(Debug, Clone)]
pub struct State {
    layout: Arc<StateLayout>,
    bool_values: Vec<bool>,
    multi_values: Vec<Value>,
    hash: u64,
}

impl State {
    /// Create a state from an initial-assignment list. Variables not mentioned default to 0,
    /// which for predicate variables means "false".
    pub fn new(layout: Arc<StateLayout>, atoms: &[Atom]) -> State {
        let mut state = State {
            bool_values: vec![false; layout.num_bool],
            multi_values: vec![0; layout.num_multi],
            layout,
            hash: 0,
        };
        for atom in atoms {
            state.set(*atom);
        }
        state.update_hash();
        state
    }

    /// The successor of this state under the given batch of atoms.
    pub fn successor(&self, atoms: &[Atom]) -> State {
        let mut next = self.clone();
        for atom in atoms {
            next.set(*atom);
        }
        next.update_hash();
        next
    }

    pub fn num_variables(&self) -> usize {
        self.layout.num_variables()
    }

    pub fn layout(&self) -> &Arc<StateLayout> {
        &self.layout
    }

    pub fn value(&self, variable: VariableId) -> Value {
        let (boolean, offset) = self.layout.slots[variable];
        if boolean {
            if self.bool_values[offset as usize] {
                TRUE
            } else {
                FALSE
            }
        } else {
            self.multi_values[offset as usize]
        }
    }

    pub fn contains(&self, atom: Atom) -> bool {
        self.value(atom.variable) == atom.value
    }

    fn set(&mut self, atom: Atom) {
        let (boolean, offset) = self.layout.slots[atom.variable];
        if boolean {
            stratum_assert_moderate!(
                atom.value == FALSE || atom.value == TRUE,
                "predicate variables only take the values 0 and 1"
            );
            self.bool_values[offset as usize] = atom.value == TRUE;
        } else {
            self.multi_values[offset as usize] = atom.value;
        }
    }

    fn update_hash(&mut self) {
        let mut hasher = FnvHasher::default();
        self.bool_values.hash(&mut hasher);
        self.multi_values.hash(&mut hasher);
        self.hash = hasher.finish();
    }
}

impl Valuation for State {
    fn value_of(&self, variable: VariableId) -> Value {
        self.value(variable)
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.bool_values == other.bool_values
            && self.multi_values == other.multi_values
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        hasher.write_u64(self.hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::symbols::SymbolTable;

    fn small_table() -> (SymbolTable, VariableId, VariableId) {
        let mut table = SymbolTable::new();
        let block = table.add_type("block");
        let a = table.add_object("a", block);
        let _b = table.add_object("b", block);
        let p = table.add_predicate("p", vec![]);
        let loc = table.add_fluent_function("loc", vec![block], block);
        let p_var = table.add_state_variable(p, vec![]).unwrap();
        let loc_a = table.add_state_variable(loc, vec![a]).unwrap();
        (table, p_var, loc_a)
    }

    #[test]
    fn unset_predicates_default_to_false() {
        let (table, p_var, loc_a) = small_table();
        let layout = Arc::new(StateLayout::new(&table));
        let state = State::new(layout, &[Atom::new(loc_a, 1)]);

        assert_eq!(state.value(p_var), FALSE);
        assert_eq!(state.value(loc_a), 1);
    }

    #[test]
    fn successor_states_do_not_alias_their_parent() {
        let (table, p_var, loc_a) = small_table();
        let layout = Arc::new(StateLayout::new(&table));
        let parent = State::new(layout, &[Atom::new(loc_a, 0)]);

        let child = parent.successor(&[Atom::new(p_var, TRUE)]);

        assert_eq!(parent.value(p_var), FALSE);
        assert_eq!(child.value(p_var), TRUE);
        assert_ne!(parent, child);
    }

    #[test]
    fn equal_assignments_compare_and_hash_equal() {
        let (table, p_var, loc_a) = small_table();
        let layout = Arc::new(StateLayout::new(&table));
        let first = State::new(Arc::clone(&layout), &[Atom::new(loc_a, 1)]);
        let second = State::new(layout, &[Atom::new(loc_a, 0)])
            .successor(&[Atom::new(loc_a, 1)]);

        assert_eq!(first, second);

        let mut set: crate::containers::HashSet<_> = crate::containers::HashSet::default();
        let _ = set.insert(first);
        assert!(set.contains(&second));
        let _ = p_var;
    }
}
