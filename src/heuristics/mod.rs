//! The heuristic drivers: layer expansion until the goal is reachable or a fixpoint is hit,
//! and the scoring of the resulting graph.

mod direct_crpg;
mod direct_hmax;
mod unreached_atom;

pub use direct_crpg::DirectCrpg;
pub use direct_hmax::DirectHmax;
pub use unreached_atom::UnreachedAtomRpg;

use crate::define_statistics;
use crate::error::ProblemDefinitionError;
use crate::options::HeuristicOptions;
use crate::options::HeuristicVariant;
use crate::problem::Problem;
use crate::problem::State;
use crate::rpg::RelaxedState;

/// The result of one heuristic evaluation.
///
/// `Estimate(0)` if and only if the seed state satisfies the goal; `Unreachable` if and only if
/// the delete-relaxed graph reached a fixpoint (or the layer cap) before covering the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicValue {
    Estimate(u64),
    Unreachable,
}

impl HeuristicValue {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, HeuristicValue::Unreachable)
    }
}

impl PartialOrd for HeuristicValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeuristicValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            (HeuristicValue::Estimate(lhs), HeuristicValue::Estimate(rhs)) => lhs.cmp(rhs),
            (HeuristicValue::Estimate(_), HeuristicValue::Unreachable) => {
                std::cmp::Ordering::Less
            }
            (HeuristicValue::Unreachable, HeuristicValue::Estimate(_)) => {
                std::cmp::Ordering::Greater
            }
            (HeuristicValue::Unreachable, HeuristicValue::Unreachable) => {
                std::cmp::Ordering::Equal
            }
        }
    }
}

impl std::fmt::Display for HeuristicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeuristicValue::Estimate(value) => write!(f, "{value}"),
            HeuristicValue::Unreachable => write!(f, "infinity"),
        }
    }
}

/// The interface the engine exposes upward to search algorithms.
///
/// Evaluations are stateless with respect to one another: the same seed always produces the
/// same value. Implementations keep per-driver counters, hence the `&mut self`.
pub trait Heuristic {
    fn evaluate(&mut self, seed: &State) -> HeuristicValue;
}

/// The outcome of a layer-pruning hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruningOutcome {
    /// Nothing was removed.
    Unchanged,
    /// Values were removed but the layer survives.
    Pruned,
    /// The layer is inconsistent; the evaluation reports unreachability.
    Failure,
}

/// A hook invoked after every layer accumulation, before the goal check.
///
/// The default does nothing; pruning the relaxed state with the problem's state constraints is
/// left to a later extension.
pub trait LayerPruner {
    fn prune(&mut self, _relaxed: &mut RelaxedState) -> PruningOutcome {
        PruningOutcome::Unchanged
    }
}

impl std::fmt::Debug for dyn LayerPruner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LayerPruner")
    }
}

/// The default [`LayerPruner`]: a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPruning;

impl LayerPruner for NoPruning {}

define_statistics!(
    /// Counters accumulated by a heuristic driver across its evaluations.
    EvaluationStatistics {
        /// The number of evaluations performed
        num_evaluations: u64,
        /// The number of graph layers built across all evaluations
        num_layers_built: u64,
        /// The number of atoms that first became reachable across all evaluations
        num_novel_atoms: u64,
        /// The number of evaluations that returned unreachable
        num_dead_ends: u64,
        /// The number of effect-CSP instantiations (at most one per handler per layer)
        num_effect_csp_instantiations: u64,
        /// The number of times a cached effect-CSP instantiation was reused within a layer
        num_effect_csp_cache_hits: u64,
        /// The number of times a handler was skipped because its failure was cached for the layer
        num_effect_csp_failure_hits: u64,
});

/// Construct the heuristic selected by `options.variant`.
pub fn create_heuristic<'p>(
    problem: &'p Problem,
    options: HeuristicOptions,
) -> Result<Box<dyn Heuristic + 'p>, ProblemDefinitionError> {
    Ok(match options.variant {
        HeuristicVariant::DirectCrpg => Box::new(DirectCrpg::new(problem, options)?),
        HeuristicVariant::DirectHmax => Box::new(DirectHmax::new(problem, options)?),
        HeuristicVariant::UnreachedAtom => Box::new(UnreachedAtomRpg::new(problem, options)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_dominates_every_estimate() {
        assert!(HeuristicValue::Estimate(u64::MAX) < HeuristicValue::Unreachable);
        assert!(HeuristicValue::Estimate(0) < HeuristicValue::Estimate(1));
        assert_eq!(
            HeuristicValue::Unreachable.cmp(&HeuristicValue::Unreachable),
            std::cmp::Ordering::Equal
        );
    }
}
