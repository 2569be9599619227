//! The layer-index variant of the action-centric heuristic.

use crate::error::ProblemDefinitionError;
use crate::heuristics::direct_crpg::Scoring;
use crate::heuristics::DirectCrpg;
use crate::heuristics::EvaluationStatistics;
use crate::heuristics::Heuristic;
use crate::heuristics::HeuristicValue;
use crate::options::HeuristicOptions;
use crate::problem::ActionId;
use crate::problem::Problem;
use crate::problem::State;

/// The h_max-like driver: identical expansion and bookkeeping to [`DirectCrpg`], but the
/// returned value is the index of the first layer at which the goal becomes satisfiable instead
/// of an extracted relaxed-plan cost.
#[derive(Debug)]
pub struct DirectHmax<'p> {
    inner: DirectCrpg<'p>,
}

impl<'p> DirectHmax<'p> {
    pub fn new(
        problem: &'p Problem,
        options: HeuristicOptions,
    ) -> Result<DirectHmax<'p>, ProblemDefinitionError> {
        Ok(DirectHmax {
            inner: DirectCrpg::with_scoring(problem, options, Scoring::GoalLayer)?,
        })
    }

    pub fn evaluate_whitelisted(
        &mut self,
        seed: &State,
        whitelist: &[ActionId],
    ) -> HeuristicValue {
        self.inner.evaluate_whitelisted(seed, whitelist)
    }

    pub fn statistics(&self) -> &EvaluationStatistics {
        self.inner.statistics()
    }
}

impl Heuristic for DirectHmax<'_> {
    fn evaluate(&mut self, seed: &State) -> HeuristicValue {
        self.inner.evaluate(seed)
    }
}
