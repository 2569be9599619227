//! Layered bookkeeping for the relaxed planning graph: which layer first achieved every atom,
//! and through which support.

use crate::containers::KeyedVec;
use crate::problem::ActionId;
use crate::problem::AtomId;
use crate::problem::AtomIndex;
use crate::problem::State;
use crate::problem::Value;
use crate::stratum_assert_moderate;

/// The layer index of an atom in the relaxed planning graph. The seed state occupies layer 0.
pub type LayerIndex = u32;

/// The support recorded for an atom when it is first achieved: the achieving action (with the
/// parameter binding discovered for it, empty for fully ground actions) and the witness atoms
/// that made the action applicable. Every witness atom was achieved at a strictly earlier layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Support {
    pub action: ActionId,
    pub binding: Vec<Value>,
    pub atoms: Vec<AtomId>,
}

/// Per-evaluation record of the relaxed planning graph.
///
/// For every atom index this tracks the first layer at which the atom became reachable and one
/// concrete [`Support`] witnessed at that moment. First achiever wins: once an atom has a layer,
/// later supports are never recorded, which keeps `layer(i)` strictly minimal. Within one layer,
/// ties are broken by the order in which actions are processed (ascending action index).
#[derive(Debug, Clone)]
pub struct RpgBookkeeping {
    layers: KeyedVec<AtomId, Option<LayerIndex>>,
    supports: KeyedVec<AtomId, Option<Support>>,
    current_layer: LayerIndex,
    novel: Vec<AtomId>,
}

impl RpgBookkeeping {
    /// Bookkeeping seeded from a state: every atom true in the seed sits at layer 0 without a
    /// support, and layer 1 is under construction.
    pub fn new(seed: &State, atom_index: &AtomIndex) -> RpgBookkeeping {
        let mut layers: KeyedVec<AtomId, Option<LayerIndex>> = KeyedVec::new();
        layers.resize(atom_index.len(), None);
        let mut supports: KeyedVec<AtomId, Option<Support>> = KeyedVec::new();
        supports.resize(atom_index.len(), None);

        for variable in seed.layout().variables() {
            let atom = crate::problem::Atom::new(variable, seed.value(variable));
            if let Some(id) = atom_index.index_of(atom) {
                layers[id] = Some(0);
            }
        }

        RpgBookkeeping {
            layers,
            supports,
            current_layer: 1,
            novel: Vec::new(),
        }
    }

    /// The layer currently under construction.
    pub fn current_layer(&self) -> LayerIndex {
        self.current_layer
    }

    /// The layer at which the atom first became reachable, or `None` when it has not been
    /// reached yet.
    pub fn layer(&self, atom: AtomId) -> Option<LayerIndex> {
        self.layers[atom]
    }

    pub fn is_achieved(&self, atom: AtomId) -> bool {
        self.layers[atom].is_some()
    }

    /// The support recorded when the atom was first achieved. Seed atoms have no support.
    pub fn support(&self, atom: AtomId) -> Option<&Support> {
        self.supports[atom].as_ref()
    }

    /// Record `atom` as novel in the layer under construction. Returns false without touching
    /// anything when the atom was already achieved: the first achiever wins.
    pub fn record(&mut self, atom: AtomId, support: Support) -> bool {
        if self.layers[atom].is_some() {
            return false;
        }
        stratum_assert_moderate!(
            support
                .atoms
                .iter()
                .all(|&witness| match self.layers[witness] {
                    Some(layer) => layer < self.current_layer,
                    None => false,
                }),
            "support atoms are achieved at strictly earlier layers"
        );
        self.layers[atom] = Some(self.current_layer);
        self.supports[atom] = Some(support);
        self.novel.push(atom);
        true
    }

    /// The number of atoms that became reachable in the layer under construction.
    pub fn num_novel(&self) -> usize {
        self.novel.len()
    }

    /// The atoms that became reachable in the layer under construction.
    pub fn novel_atoms(&self) -> &[AtomId] {
        &self.novel
    }

    /// Close the layer under construction. The caller accumulates the novel atoms into the
    /// relaxed state before advancing.
    pub fn advance_layer(&mut self) {
        self.novel.clear();
        self.current_layer += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;
    use crate::problem::Atom;
    use crate::problem::StateLayout;
    use crate::problem::SymbolTable;
    use crate::problem::TRUE;
    use std::sync::Arc;

    fn seeded() -> (RpgBookkeeping, AtomIndex, AtomId, AtomId) {
        let mut table = SymbolTable::new();
        let p = table.add_predicate("p", vec![]);
        let q = table.add_predicate("q", vec![]);
        let p_var = table.add_state_variable(p, vec![]).unwrap();
        let q_var = table.add_state_variable(q, vec![]).unwrap();
        let layout = Arc::new(StateLayout::new(&table));
        let seed = crate::problem::State::new(layout, &[Atom::new(p_var, TRUE)]);
        let atom_index = AtomIndex::new(&table, true);
        let p_true = atom_index.index_of(Atom::new(p_var, TRUE)).unwrap();
        let q_true = atom_index.index_of(Atom::new(q_var, TRUE)).unwrap();
        let bookkeeping = RpgBookkeeping::new(&seed, &atom_index);
        (bookkeeping, atom_index, p_true, q_true)
    }

    #[test]
    fn seed_atoms_sit_at_layer_zero() {
        let (bookkeeping, _, p_true, q_true) = seeded();

        assert_eq!(bookkeeping.layer(p_true), Some(0));
        assert_eq!(bookkeeping.layer(q_true), None);
        assert_eq!(bookkeeping.current_layer(), 1);
    }

    #[test]
    fn first_achiever_wins() {
        let (mut bookkeeping, _, p_true, q_true) = seeded();

        let first = Support {
            action: ActionId::create_from_index(0),
            binding: vec![],
            atoms: vec![p_true],
        };
        let second = Support {
            action: ActionId::create_from_index(1),
            binding: vec![],
            atoms: vec![p_true],
        };

        assert!(bookkeeping.record(q_true, first.clone()));
        assert!(!bookkeeping.record(q_true, second));
        assert_eq!(bookkeeping.support(q_true), Some(&first));
        assert_eq!(bookkeeping.num_novel(), 1);
    }

    #[test]
    fn advancing_a_layer_clears_the_novel_set() {
        let (mut bookkeeping, _, p_true, q_true) = seeded();
        let _ = bookkeeping.record(
            q_true,
            Support {
                action: ActionId::create_from_index(0),
                binding: vec![],
                atoms: vec![p_true],
            },
        );

        bookkeeping.advance_layer();

        assert_eq!(bookkeeping.num_novel(), 0);
        assert_eq!(bookkeeping.current_layer(), 2);
        assert_eq!(bookkeeping.layer(q_true), Some(1));
    }
}
