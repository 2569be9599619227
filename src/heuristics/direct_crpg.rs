//! The action-centric relaxed-planning-graph heuristic, scored by relaxed-plan cost.

use log::debug;
use log::warn;

use crate::actions::GroundActionManager;
use crate::containers::StorageKey;
use crate::csp::FormulaCsp;
use crate::error::ProblemDefinitionError;
use crate::heuristics::EvaluationStatistics;
use crate::heuristics::Heuristic;
use crate::heuristics::HeuristicValue;
use crate::heuristics::LayerPruner;
use crate::heuristics::NoPruning;
use crate::heuristics::PruningOutcome;
use crate::options::HeuristicOptions;
use crate::problem::ActionId;
use crate::problem::Problem;
use crate::problem::State;
use crate::rpg::RelaxedPlan;
use crate::rpg::RelaxedPlanExtractor;
use crate::rpg::RelaxedState;
use crate::rpg::RpgBookkeeping;

/// How a goal layer is turned into a heuristic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scoring {
    /// Extract a relaxed plan and return its cost.
    RelaxedPlanCost,
    /// Return the index of the first layer in which the goal became satisfiable.
    GoalLayer,
}

/// The action-centric heuristic driver.
///
/// Every layer is built by sweeping the (whitelisted) ground actions in ascending index order
/// and letting each apply its relaxed effects; the sweep repeats until the goal is covered or a
/// layer yields no novel atom. On a goal layer a relaxed plan is extracted and its cost
/// returned; the plan itself is retained for the caller to inspect.
#[derive(Debug)]
pub struct DirectCrpg<'p> {
    problem: &'p Problem,
    managers: Vec<GroundActionManager>,
    all_actions: Vec<ActionId>,
    goal: FormulaCsp,
    options: HeuristicOptions,
    scoring: Scoring,
    pruner: Box<dyn LayerPruner>,
    statistics: EvaluationStatistics,
    last_plan: Option<RelaxedPlan>,
}

impl<'p> DirectCrpg<'p> {
    /// Build the driver for a fully ground problem.
    pub fn new(
        problem: &'p Problem,
        options: HeuristicOptions,
    ) -> Result<DirectCrpg<'p>, ProblemDefinitionError> {
        Self::with_scoring(problem, options, Scoring::RelaxedPlanCost)
    }

    pub(crate) fn with_scoring(
        problem: &'p Problem,
        options: HeuristicOptions,
        scoring: Scoring,
    ) -> Result<DirectCrpg<'p>, ProblemDefinitionError> {
        if let Some(action) = problem
            .actions()
            .find(|&action| !problem.action(action).is_ground())
        {
            return Err(ProblemDefinitionError::ActionNotGround {
                action: problem.action(action).name.clone(),
            });
        }

        let managers = problem
            .actions()
            .map(|action| GroundActionManager::new(problem, action))
            .collect();

        Ok(DirectCrpg {
            problem,
            managers,
            all_actions: problem.actions().collect(),
            goal: FormulaCsp::goal(problem),
            options,
            scoring,
            pruner: Box::new(NoPruning),
            statistics: EvaluationStatistics::default(),
            last_plan: None,
        })
    }

    /// Replace the layer-pruning hook. The default is a no-op.
    pub fn set_layer_pruner(&mut self, pruner: Box<dyn LayerPruner>) {
        self.pruner = pruner;
    }

    /// The relaxed plan extracted by the most recent evaluation that reached the goal.
    pub fn last_relaxed_plan(&self) -> Option<&RelaxedPlan> {
        self.last_plan.as_ref()
    }

    pub fn statistics(&self) -> &EvaluationStatistics {
        &self.statistics
    }

    /// Evaluate the heuristic for `seed`, restricted to the whitelisted ground actions.
    ///
    /// The whitelist is swept in ascending action order regardless of the order it is handed
    /// in, so two calls with permuted whitelists return the same value.
    pub fn evaluate_whitelisted(
        &mut self,
        seed: &State,
        whitelist: &[ActionId],
    ) -> HeuristicValue {
        self.statistics.num_evaluations += 1;
        self.last_plan = None;

        if self.goal.satisfied_in(self.problem, seed) {
            return HeuristicValue::Estimate(0);
        }

        let mut sweep = whitelist.to_vec();
        sweep.sort();
        sweep.dedup();

        let mut relaxed = RelaxedState::from_seed(seed);
        let mut bookkeeping = RpgBookkeeping::new(seed, self.problem.atom_index());

        loop {
            for &action in &sweep {
                self.managers[action.index()].process(self.problem, &relaxed, &mut bookkeeping);
            }

            if bookkeeping.num_novel() == 0 {
                debug!(
                    "fixpoint after {} layers without covering the goal",
                    bookkeeping.current_layer() - 1
                );
                self.statistics.num_dead_ends += 1;
                return HeuristicValue::Unreachable;
            }

            self.statistics.num_layers_built += 1;
            self.statistics.num_novel_atoms += bookkeeping.num_novel() as u64;
            let novel: Vec<_> = bookkeeping
                .novel_atoms()
                .iter()
                .map(|&id| self.problem.atom_index().atom(id))
                .collect();
            relaxed.accumulate(novel);

            if self.pruner.prune(&mut relaxed) == PruningOutcome::Failure {
                self.statistics.num_dead_ends += 1;
                return HeuristicValue::Unreachable;
            }

            if let Some(causes) = self.goal.find_witness(
                self.problem,
                &relaxed,
                &bookkeeping,
                self.options.use_min_hmax_value_selector,
            ) {
                return match self.scoring {
                    Scoring::RelaxedPlanCost => {
                        let extractor =
                            RelaxedPlanExtractor::new(self.problem, seed, &bookkeeping);
                        let plan = extractor.extract(&causes);
                        let cost = plan.cost;
                        self.last_plan = Some(plan);
                        HeuristicValue::Estimate(cost)
                    }
                    Scoring::GoalLayer => {
                        HeuristicValue::Estimate(u64::from(bookkeeping.current_layer()))
                    }
                };
            }

            bookkeeping.advance_layer();
            if let Some(cap) = self.options.max_layers {
                if bookkeeping.current_layer() > cap {
                    warn!("layer cap of {cap} exceeded; reporting the goal as unreachable");
                    self.statistics.num_dead_ends += 1;
                    return HeuristicValue::Unreachable;
                }
            }
        }
    }
}

impl Heuristic for DirectCrpg<'_> {
    fn evaluate(&mut self, seed: &State) -> HeuristicValue {
        let all_actions = self.all_actions.clone();
        self.evaluate_whitelisted(seed, &all_actions)
    }
}
