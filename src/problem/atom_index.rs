//! The bijection between ground atoms and dense integer indices.

use crate::containers::HashMap;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::problem::symbols::SymbolTable;
use crate::problem::symbols::Value;
use crate::problem::symbols::FALSE;
use crate::problem::VariableId;

/// A ground atom: the assertion that a state variable has a particular value.
///
/// A state contains an atom iff the variable is assigned that value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom {
    pub variable: VariableId,
    pub value: Value,
}

impl Atom {
    pub fn new(variable: VariableId, value: Value) -> Atom {
        Atom { variable, value }
    }
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.variable, self.value)
    }
}

impl std::fmt::Debug for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// The dense index assigned to a ground atom by the [`AtomIndex`].
#[derive(Clone, PartialEq, Eq, Copy, Hash, PartialOrd, Ord)]
pub struct AtomId {
    id: u32,
}

impl AtomId {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl StorageKey for AtomId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        AtomId { id: index as u32 }
    }
}

impl std::fmt::Display for AtomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a{}", self.id)
    }
}

impl std::fmt::Debug for AtomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// A bijection between the ground atoms of a problem and dense [`AtomId`]s.
///
/// The index is built once, when the problem is loaded, and never mutated afterwards; it is
/// shared read-only by every heuristic evaluation. Whether the negated form of a predicate atom
/// (`p=0`) receives an index is decided once at construction: problems without negated
/// preconditions or goals do not need those atoms, which roughly halves the index for
/// predicative problems.
#[derive(Debug, Clone)]
pub struct AtomIndex {
    atoms: KeyedVec<AtomId, Atom>,
    ids: HashMap<Atom, AtomId>,
    negated_atoms_allowed: bool,
}

impl AtomIndex {
    /// Enumerate every indexable atom of every state variable, in variable order and domain
    /// order.
    pub fn new(table: &SymbolTable, negated_atoms_allowed: bool) -> AtomIndex {
        let mut atoms = KeyedVec::new();
        let mut ids: HashMap<Atom, AtomId> = HashMap::default();

        for variable in table.variables() {
            for value in table.variable_domain_values(variable) {
                if !negated_atoms_allowed
                    && table.is_predicate_variable(variable)
                    && value == FALSE
                {
                    continue;
                }
                let atom = Atom::new(variable, value);
                let id = atoms.push(atom);
                let _ = ids.insert(atom, id);
            }
        }

        AtomIndex {
            atoms,
            ids,
            negated_atoms_allowed,
        }
    }

    /// The number of indexed atoms.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn negated_atoms_allowed(&self) -> bool {
        self.negated_atoms_allowed
    }

    /// The index of the given atom, or `None` when the atom is not indexable (a value outside
    /// the variable's domain, or a negated predicate atom when those are disabled).
    pub fn index_of(&self, atom: Atom) -> Option<AtomId> {
        self.ids.get(&atom).copied()
    }

    /// The atom behind an index.
    pub fn atom(&self, id: AtomId) -> Atom {
        self.atoms[id]
    }

    pub fn ids(&self) -> impl Iterator<Item = AtomId> {
        self.atoms.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::symbols::SymbolTable;
    use crate::problem::symbols::TRUE;

    fn two_variable_table() -> (SymbolTable, VariableId, VariableId) {
        let mut table = SymbolTable::new();
        let block = table.add_type("block");
        let a = table.add_object("a", block);
        let b = table.add_object("b", block);
        let p = table.add_predicate("p", vec![]);
        let loc = table.add_fluent_function("loc", vec![block], block);
        let p_var = table.add_state_variable(p, vec![]).unwrap();
        let loc_a = table.add_state_variable(loc, vec![a]).unwrap();
        let _ = b;
        (table, p_var, loc_a)
    }

    #[test]
    fn index_and_atom_are_inverse() {
        let (table, _, _) = two_variable_table();
        let index = AtomIndex::new(&table, true);

        for id in index.ids() {
            assert_eq!(index.index_of(index.atom(id)), Some(id));
        }
    }

    #[test]
    fn negated_predicate_atoms_can_be_excluded() {
        let (table, p_var, _) = two_variable_table();

        let with_negated = AtomIndex::new(&table, true);
        let without_negated = AtomIndex::new(&table, false);

        assert!(with_negated.index_of(Atom::new(p_var, FALSE)).is_some());
        assert!(without_negated.index_of(Atom::new(p_var, FALSE)).is_none());
        assert!(without_negated.index_of(Atom::new(p_var, TRUE)).is_some());
        assert_eq!(with_negated.len(), without_negated.len() + 1);
    }

    #[test]
    fn out_of_domain_values_are_not_indexed() {
        let (table, _, loc_a) = two_variable_table();
        let index = AtomIndex::new(&table, true);

        assert!(index.index_of(Atom::new(loc_a, 99)).is_none());
    }
}
