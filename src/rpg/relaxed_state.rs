//! The relaxed-state container: per state variable, the set of values reached so far.

use crate::containers::HashSet;
use crate::containers::KeyedVec;
use crate::problem::Atom;
use crate::problem::State;
use crate::problem::Value;
use crate::problem::VariableId;
use crate::stratum_assert_moderate;

/// The set of values one state variable has reached, with deterministic (ascending) iteration
/// order.
#[derive(Debug, Clone, Default)]
struct ReachedValues {
    /// The reached values in ascending order.
    ordered: Vec<Value>,
    lookup: HashSet<Value>,
}

impl ReachedValues {
    fn insert(&mut self, value: Value) -> bool {
        if !self.lookup.insert(value) {
            return false;
        }
        let position = self.ordered.partition_point(|&reached| reached < value);
        self.ordered.insert(position, value);
        true
    }
}

/// The delete-relaxed counterpart of a [`State`]: for every state variable, the set of values
/// reachable so far.
///
/// The container is strictly monotone: values are only ever added, never removed, which gives
/// the expansion loop its termination guarantee. One relaxed state is owned exclusively by a
/// single in-flight heuristic evaluation.
#[derive(Debug, Clone)]
pub struct RelaxedState {
    values: KeyedVec<VariableId, ReachedValues>,
    num_atoms: usize,
}

impl RelaxedState {
    /// The relaxed state containing exactly the seed assignment: `R(v) = {s(v)}` for every `v`.
    pub fn from_seed(seed: &State) -> RelaxedState {
        let mut values: KeyedVec<VariableId, ReachedValues> = KeyedVec::new();
        values.resize(seed.num_variables(), ReachedValues::default());
        let mut relaxed = RelaxedState {
            values,
            num_atoms: 0,
        };
        for variable in seed.layout().variables() {
            relaxed.insert(Atom::new(variable, seed.value(variable)));
        }
        relaxed
    }

    /// The reached values of a variable, in ascending order.
    pub fn values(&self, variable: VariableId) -> &[Value] {
        &self.values[variable].ordered
    }

    pub fn contains(&self, atom: Atom) -> bool {
        self.values[atom.variable].lookup.contains(&atom.value)
    }

    /// The total number of (variable, value) pairs reached.
    pub fn num_atoms(&self) -> usize {
        self.num_atoms
    }

    /// Absorb a batch of novel atoms. Accumulation is the only mutation the container offers.
    pub fn accumulate(&mut self, atoms: impl IntoIterator<Item = Atom>) {
        for atom in atoms {
            self.insert(atom);
        }
    }

    fn insert(&mut self, atom: Atom) {
        if self.values[atom.variable].insert(atom.value) {
            self.num_atoms += 1;
        }
        stratum_assert_moderate!(
            self.contains(atom),
            "accumulated atoms are immediately visible"
        );
    }
}
