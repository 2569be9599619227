//! Backward extraction of a relaxed plan from the bookkeeping of a goal layer.

use std::collections::BTreeSet;

use log::trace;

use crate::problem::ActionId;
use crate::problem::AtomId;
use crate::problem::Problem;
use crate::problem::State;
use crate::problem::Value;
use crate::rpg::bookkeeping::RpgBookkeeping;
use crate::stratum_assert_moderate;

/// One selected step of a relaxed plan: an action together with the parameter binding its
/// support was discovered under (empty for fully ground actions).
///
/// The ordering ties the extraction's determinism contract down: steps are reported in
/// ascending (action, binding) order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlanStep {
    pub action: ActionId,
    pub binding: Vec<Value>,
}

/// The result of a relaxed-plan extraction. The cost is the sum of the selected actions' costs,
/// which for unit-cost problems equals the number of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaxedPlan {
    pub steps: Vec<PlanStep>,
    pub cost: u64,
}

impl RelaxedPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Extracts a relaxed plan by sweeping the bookkeeping backwards from the goal's witness atoms.
///
/// The extractor is created the moment a goal layer is detected; the driver retains the
/// extracted plan so that callers can inspect it after the evaluation returns.
#[derive(Debug)]
pub struct RelaxedPlanExtractor<'a> {
    problem: &'a Problem,
    seed: &'a State,
    bookkeeping: &'a RpgBookkeeping,
}

impl<'a> RelaxedPlanExtractor<'a> {
    pub fn new(
        problem: &'a Problem,
        seed: &'a State,
        bookkeeping: &'a RpgBookkeeping,
    ) -> RelaxedPlanExtractor<'a> {
        RelaxedPlanExtractor {
            problem,
            seed,
            bookkeeping,
        }
    }

    /// Resolve the supports of `causes` layer by layer, from the top layer down to 1, and
    /// return the selected actions.
    ///
    /// Both the pending atoms and the chosen steps are sets: each atom is enqueued at most
    /// once, and a step supports any number of atoms at the price of one selection.
    pub fn extract(&self, causes: &[AtomId]) -> RelaxedPlan {
        let num_layers = self.bookkeeping.current_layer() as usize + 1;
        let mut pending: Vec<Vec<AtomId>> = vec![Vec::new(); num_layers];
        let mut enqueued = vec![false; self.problem.atom_index().len()];
        let mut chosen: BTreeSet<PlanStep> = BTreeSet::new();

        for &cause in causes {
            Self::enqueue(
                cause,
                self.seed,
                self.problem,
                self.bookkeeping,
                &mut pending,
                &mut enqueued,
            );
        }

        for layer in (1..num_layers).rev() {
            // Supports only ever point at strictly earlier layers, so this bucket is complete
            // by the time the sweep reaches it. Draining it keeps the borrow on `pending` short.
            let bucket = std::mem::take(&mut pending[layer]);
            for atom in bucket {
                let support = self
                    .bookkeeping
                    .support(atom)
                    .expect("atoms above layer 0 carry the support that first achieved them");
                let _ = chosen.insert(PlanStep {
                    action: support.action,
                    binding: support.binding.clone(),
                });
                for &witness in &support.atoms {
                    stratum_assert_moderate!(
                        self.bookkeeping.layer(witness) < Some(layer as u32),
                        "witness atoms precede the atom they support"
                    );
                    Self::enqueue(
                        witness,
                        self.seed,
                        self.problem,
                        self.bookkeeping,
                        &mut pending,
                        &mut enqueued,
                    );
                }
            }
        }

        let cost = chosen
            .iter()
            .map(|step| u64::from(self.problem.action(step.action).cost))
            .sum();
        let plan = RelaxedPlan {
            steps: chosen.into_iter().collect(),
            cost,
        };
        trace!("extracted relaxed plan of {} steps", plan.len());
        plan
    }

    fn enqueue(
        atom: AtomId,
        seed: &State,
        problem: &Problem,
        bookkeeping: &RpgBookkeeping,
        pending: &mut [Vec<AtomId>],
        enqueued: &mut [bool],
    ) {
        if enqueued[atom.id() as usize] {
            return;
        }
        enqueued[atom.id() as usize] = true;

        // Atoms already true in the seed need no support.
        if seed.contains(problem.atom_index().atom(atom)) {
            return;
        }
        let layer = bookkeeping
            .layer(atom)
            .expect("extraction only visits reached atoms");
        if layer == 0 {
            return;
        }
        pending[layer as usize].push(atom);
    }
}
