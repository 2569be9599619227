//! The atom-centric expansion: every not-yet-achieved atom searches its potential achievers for
//! a support, instantiating each achiever's constraint problem at most once per layer.

use log::debug;
use log::info;
use log::warn;

use crate::containers::KeyedVec;
use crate::csp::EffectCsp;
use crate::csp::EnumerativeEffectCsp;
use crate::csp::FormulaCsp;
use crate::csp::RpgView;
use crate::heuristics::EvaluationStatistics;
use crate::heuristics::Heuristic;
use crate::heuristics::HeuristicValue;
use crate::options::HeuristicOptions;
use crate::problem::AtomId;
use crate::problem::Problem;
use crate::problem::State;
use crate::rpg::RelaxedPlan;
use crate::rpg::RelaxedPlanExtractor;
use crate::rpg::RelaxedState;
use crate::rpg::RpgBookkeeping;
use crate::rpg::Support;

/// The atom-centric heuristic driver.
///
/// Instead of sweeping actions, each layer sweeps the atoms that have not been achieved yet and
/// asks the handlers in their precomputed achievers list for a support. A handler's constraint
/// problem is instantiated against the relaxed state at most once per layer: a failed
/// instantiation is sticky for the layer, a successful one is cached and reused for every atom
/// the handler is asked about. This memoisation is the central performance lever of the pass,
/// and the instrumentation counters make it observable.
pub struct UnreachedAtomRpg<'p, H: EffectCsp = EnumerativeEffectCsp> {
    problem: &'p Problem,
    handlers: Vec<H>,
    /// Per atom, the handler indices that can potentially produce it (an over-approximation).
    achievers: KeyedVec<AtomId, Vec<usize>>,
    goal: FormulaCsp,
    options: HeuristicOptions,
    statistics: EvaluationStatistics,
    last_plan: Option<RelaxedPlan>,
}

impl<'p> UnreachedAtomRpg<'p> {
    /// Build the driver with the in-crate enumerative effect solver, one handler per effect of
    /// every action.
    pub fn new(problem: &'p Problem, options: HeuristicOptions) -> UnreachedAtomRpg<'p> {
        Self::with_handlers(problem, EnumerativeEffectCsp::build_all(problem), options)
    }
}

impl<'p, H: EffectCsp> UnreachedAtomRpg<'p, H> {
    /// Build the driver from externally supplied effect handlers.
    pub fn with_handlers(
        problem: &'p Problem,
        handlers: Vec<H>,
        options: HeuristicOptions,
    ) -> UnreachedAtomRpg<'p, H> {
        let mut achievers: KeyedVec<AtomId, Vec<usize>> = KeyedVec::new();
        achievers.resize(problem.atom_index().len(), Vec::new());
        for (handler_index, handler) in handlers.iter().enumerate() {
            for atom in handler.affected_atoms(problem) {
                achievers[atom].push(handler_index);
            }
        }
        info!(
            "achievers index built: {} handlers over {} atoms",
            handlers.len(),
            problem.atom_index().len()
        );

        UnreachedAtomRpg {
            problem,
            handlers,
            achievers,
            goal: FormulaCsp::goal(problem),
            options,
            statistics: EvaluationStatistics::default(),
            last_plan: None,
        }
    }

    /// The relaxed plan extracted by the most recent evaluation that reached the goal.
    pub fn last_relaxed_plan(&self) -> Option<&RelaxedPlan> {
        self.last_plan.as_ref()
    }

    pub fn statistics(&self) -> &EvaluationStatistics {
        &self.statistics
    }

    fn expand_layer(
        &mut self,
        relaxed: &RelaxedState,
        bookkeeping: &mut RpgBookkeeping,
    ) {
        // The per-layer caches live exactly as long as this call: cache[i] holds handler i's
        // instantiation against the current relaxed state, failed[i] records that the
        // instantiation was found inconsistent.
        let mut cache: Vec<Option<H::Instance>> =
            (0..self.handlers.len()).map(|_| None).collect();
        let mut failed = vec![false; self.handlers.len()];

        for atom_id in self.problem.atom_index().ids() {
            if bookkeeping.is_achieved(atom_id) {
                continue;
            }
            let atom = self.problem.atom_index().atom(atom_id);

            let mut found = None;
            for &handler_index in &self.achievers[atom_id] {
                if failed[handler_index] {
                    self.statistics.num_effect_csp_failure_hits += 1;
                    continue;
                }

                let view = RpgView {
                    problem: self.problem,
                    relaxed,
                    bookkeeping,
                };
                if cache[handler_index].is_none() {
                    self.statistics.num_effect_csp_instantiations += 1;
                    match self.handlers[handler_index].preinstantiate(&view) {
                        Some(instance) => cache[handler_index] = Some(instance),
                        None => {
                            failed[handler_index] = true;
                            continue;
                        }
                    }
                } else {
                    self.statistics.num_effect_csp_cache_hits += 1;
                }

                let instance = cache[handler_index]
                    .as_mut()
                    .expect("the instantiation was just cached");
                if let Some(support) =
                    self.handlers[handler_index].find_support(atom, instance, &view)
                {
                    found = Some((handler_index, support));
                    break;
                }
            }

            if let Some((handler_index, support)) = found {
                let _ = bookkeeping.record(
                    atom_id,
                    Support {
                        action: self.handlers[handler_index].action(),
                        binding: support.binding,
                        atoms: support.atoms,
                    },
                );
            }
        }
    }
}

impl<H: EffectCsp> Heuristic for UnreachedAtomRpg<'_, H> {
    fn evaluate(&mut self, seed: &State) -> HeuristicValue {
        self.statistics.num_evaluations += 1;
        self.last_plan = None;

        if self.goal.satisfied_in(self.problem, seed) {
            return HeuristicValue::Estimate(0);
        }

        let mut relaxed = RelaxedState::from_seed(seed);
        let mut bookkeeping = RpgBookkeeping::new(seed, self.problem.atom_index());

        loop {
            self.expand_layer(&relaxed, &mut bookkeeping);

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

            if let Some(causes) = self.goal.find_witness(
                self.problem,
                &relaxed,
                &bookkeeping,
                self.options.use_min_hmax_value_selector,
            ) {
                let extractor = RelaxedPlanExtractor::new(self.problem, seed, &bookkeeping);
                let plan = extractor.extract(&causes);
                let cost = plan.cost;
                self.last_plan = Some(plan);
                return HeuristicValue::Estimate(cost);
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
