//! The contract between the atom-centric expansion and the per-effect constraint solver.

use crate::problem::ActionId;
use crate::problem::Atom;
use crate::problem::AtomId;
use crate::problem::Problem;
use crate::problem::Value;
use crate::rpg::RelaxedState;
use crate::rpg::RpgBookkeeping;

/// The read-only view of an in-flight evaluation handed to effect handlers: the problem's
/// immutable tables plus the relaxed state and bookkeeping of the layer under construction.
#[derive(Debug, Clone, Copy)]
pub struct RpgView<'a> {
    pub problem: &'a Problem,
    pub relaxed: &'a RelaxedState,
    pub bookkeeping: &'a RpgBookkeeping,
}

/// A support discovered by [`EffectCsp::find_support`]: the parameter binding instantiating the
/// handler's action, and the witness atoms drawn from the relaxed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectSupport {
    pub binding: Vec<Value>,
    pub atoms: Vec<AtomId>,
}

/// One effect of one (possibly partially ground) action, solvable as a constraint satisfaction
/// problem over the action's remaining free parameters.
///
/// The atom-centric expansion guarantees the following discipline, which implementations may
/// rely on: [`preinstantiate`](EffectCsp::preinstantiate) is called at most once per handler per
/// layer; a `None` result (inconsistency) is sticky for the remainder of the layer; a returned
/// instance is cached and reused for every atom the handler is asked about in that layer, and it
/// never outlives the layer.
pub trait EffectCsp {
    /// The per-layer instantiation of this handler's constraint problem.
    type Instance;

    /// The action this handler belongs to.
    fn action(&self) -> ActionId;

    /// Instantiate the constraint problem against the current relaxed state. Returns `None`
    /// when the instantiation is inconsistent, i.e. no parameter assignment can make the effect
    /// fire in this layer.
    fn preinstantiate(&self, view: &RpgView<'_>) -> Option<Self::Instance>;

    /// Search the cached instantiation for a parameter assignment that produces exactly `atom`
    /// and whose applicability atoms are all reached. The search must be deterministic.
    fn find_support(
        &self,
        atom: Atom,
        instance: &mut Self::Instance,
        view: &RpgView<'_>,
    ) -> Option<EffectSupport>;

    /// An over-approximation of the atoms this handler can ever produce, used to build the
    /// achievers index once at bootstrap.
    fn affected_atoms(&self, problem: &Problem) -> Vec<AtomId>;
}
