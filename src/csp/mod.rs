//! Constraint-satisfaction machinery: the witness search shared by every existential check
//! against a relaxed state, the goal-satisfiability handler, and the per-effect CSP contract
//! used by the atom-centric expansion.

mod effect_csp;
mod enumerative;
mod formula_csp;
pub(crate) mod witness;

pub use effect_csp::EffectCsp;
pub use effect_csp::EffectSupport;
pub use effect_csp::RpgView;
pub use enumerative::EnumerativeEffectCsp;
pub use enumerative::EnumerativeInstance;
pub use formula_csp::FormulaCsp;
