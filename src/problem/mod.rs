//! The immutable problem description: symbol tables, the atom index, states, and the problem
//! container itself.

pub(crate) mod atom_index;
#[allow(clippy::module_inception)]
pub(crate) mod problem;
pub(crate) mod state;
pub(crate) mod symbols;

pub use crate::actions::Action;
pub use crate::actions::ActionEffect;
pub use crate::actions::ActionId;
pub use atom_index::Atom;
pub use atom_index::AtomId;
pub use atom_index::AtomIndex;
pub use problem::Problem;
pub use state::State;
pub use state::StateLayout;
pub use state::Valuation;
pub use symbols::SymbolId;
pub use symbols::SymbolKind;
pub use symbols::SymbolTable;
pub use symbols::TypeId;
pub use symbols::TypeValues;
pub use symbols::Value;
pub use symbols::VariableDomain;
pub use symbols::VariableId;
pub use symbols::FALSE;
pub use symbols::TRUE;
