//! A backtracking implementation of the effect-CSP contract.
//!
//! This solver enumerates the handler's free parameters in ascending slot order (values in type
//! order) and the mentioned state variables in ascending id order (values in ascending order),
//! so every answer it produces is deterministic. It performs no propagation beyond drawing
//! state-variable domains from the relaxed state; the contract in
//! [`EffectCsp`](crate::csp::EffectCsp) deliberately leaves propagation strength open.

use std::ops::ControlFlow;

use crate::csp::effect_csp::EffectCsp;
use crate::csp::effect_csp::EffectSupport;
use crate::csp::effect_csp::RpgView;
use crate::csp::witness::for_each_assignment;
use crate::csp::witness::AscendingValues;
use crate::csp::witness::ChoiceValuation;
use crate::language::interpreter::Interpreter;
use crate::language::Binding;
use crate::language::Term;
use crate::problem::ActionId;
use crate::problem::Atom;
use crate::problem::AtomId;
use crate::problem::Problem;
use crate::problem::Value;
use crate::problem::VariableId;

/// The per-layer instantiation kept by the enumerative solver: the parameter domains drawn when
/// the handler was first visited in the layer.
#[derive(Debug, Clone)]
pub struct EnumerativeInstance {
    parameter_domains: Vec<Vec<Value>>,
}

/// One (action, effect) pair solved by plain backtracking.
#[derive(Debug, Clone)]
pub struct EnumerativeEffectCsp {
    action: ActionId,
    effect_index: usize,
}

impl EnumerativeEffectCsp {
    /// One handler per effect of every action of the problem, in (action, effect) order.
    pub fn build_all(problem: &Problem) -> Vec<EnumerativeEffectCsp> {
        problem
            .actions()
            .flat_map(|action| {
                (0..problem.action(action).effects.len()).map(move |effect_index| {
                    EnumerativeEffectCsp {
                        action,
                        effect_index,
                    }
                })
            })
            .collect()
    }

    fn parameter_domains(&self, problem: &Problem) -> Vec<Vec<Value>> {
        problem
            .action(self.action)
            .parameters
            .iter()
            .map(|&ty| problem.table().type_values(ty).collect())
            .collect()
    }

    /// Run `visit` for every assignment of the free parameters, in deterministic order.
    fn for_each_binding(
        domains: &[Vec<Value>],
        slot: usize,
        binding: &mut Binding,
        visit: &mut impl FnMut(&mut Binding) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        if slot == domains.len() {
            return visit(binding);
        }
        for &value in &domains[slot] {
            binding.bind(slot, value);
            Self::for_each_binding(domains, slot + 1, binding, visit)?;
        }
        binding.unbind(slot);
        ControlFlow::Continue(())
    }

    /// Whether some choice of reached values satisfies the applicability formulas under the
    /// given (complete) parameter binding. `accept` sees each satisfying candidate together
    /// with the scope it ranges over and may reject it to continue the search.
    fn witness_applicability(
        &self,
        view: &RpgView<'_>,
        binding: &mut Binding,
        extra_scope: &[VariableId],
        mut accept: impl FnMut(&ChoiceValuation, &[VariableId], &mut Binding) -> bool,
    ) -> bool {
        let problem = view.problem;
        let interpreter = Interpreter::new(problem.table());
        let data = problem.action(self.action);
        let effect = &data.effects[self.effect_index];

        let mut scope = extra_scope.to_vec();
        interpreter.collect_formula_scope(&data.precondition, binding, &mut scope);
        interpreter.collect_formula_scope(&effect.condition, binding, &mut scope);
        scope.sort();
        scope.dedup();

        let order = AscendingValues {
            relaxed: view.relaxed,
        };
        let mut valuation = ChoiceValuation::default();
        let mut found = false;
        let scope_ref = &scope;
        let _ = for_each_assignment(
            &order,
            scope_ref,
            &mut valuation,
            &mut |candidate: &ChoiceValuation| {
                if interpreter.formula_holds(&data.precondition, candidate, binding)
                    && interpreter.formula_holds(&effect.condition, candidate, binding)
                    && accept(candidate, scope_ref, binding)
                {
                    found = true;
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );
        found
    }
}

impl EffectCsp for EnumerativeEffectCsp {
    type Instance = EnumerativeInstance;

    fn action(&self) -> ActionId {
        self.action
    }

    fn preinstantiate(&self, view: &RpgView<'_>) -> Option<Self::Instance> {
        let domains = self.parameter_domains(view.problem);

        // Consistency check: some parameter assignment must make the effect applicable, else
        // the instantiation is inconsistent and the failure is cached for the layer.
        let mut binding = Binding::empty();
        let consistent = Self::for_each_binding(&domains, 0, &mut binding, &mut |binding| {
            if self.witness_applicability(view, binding, &[], |_, _, _| true) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .is_break();

        consistent.then_some(EnumerativeInstance {
            parameter_domains: domains,
        })
    }

    fn find_support(
        &self,
        atom: Atom,
        instance: &mut Self::Instance,
        view: &RpgView<'_>,
    ) -> Option<EffectSupport> {
        let problem = view.problem;
        let interpreter = Interpreter::new(problem.table());
        let effect = &problem.action(self.action).effects[self.effect_index];
        let arity = problem.action(self.action).parameters.len();

        let mut support = None;
        let mut binding = Binding::empty();
        let _ = Self::for_each_binding(
            &instance.parameter_domains,
            0,
            &mut binding,
            &mut |binding| {
                // The effect must write precisely the requested variable under this binding.
                if interpreter.resolve_target(&effect.target, binding) != atom.variable {
                    return ControlFlow::Continue(());
                }
                let mut value_scope = Vec::new();
                interpreter.collect_term_scope(&effect.value, binding, &mut value_scope);

                let found = self.witness_applicability(
                    view,
                    binding,
                    &value_scope,
                    |candidate, scope, binding| {
                        if interpreter.term_value(&effect.value, candidate, binding) != atom.value
                        {
                            return false;
                        }
                        let parameters =
                            (0..arity).map(|slot| {
                                binding.value(slot).expect(
                                    "free parameters are bound throughout the enumeration",
                                )
                            });
                        support = Some(EffectSupport {
                            binding: parameters.collect(),
                            atoms: candidate.chosen_atoms(scope, problem.atom_index()),
                        });
                        true
                    },
                );
                if found {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );
        support
    }

    fn affected_atoms(&self, problem: &Problem) -> Vec<AtomId> {
        let data = problem.action(self.action);
        let effect = &data.effects[self.effect_index];
        let table = problem.table();

        let variables: Vec<VariableId> = match &effect.target {
            Term::StateVariable(variable) => vec![*variable],
            Term::Application { symbol, .. } => table.variables_of_symbol(*symbol).collect(),
            _ => Vec::new(),
        };

        let mut atoms = Vec::new();
        for variable in variables {
            match &effect.value {
                // A constant right-hand side can only ever produce that one value.
                Term::Constant(value) => {
                    if let Some(id) = problem.atom_index().index_of(Atom::new(variable, *value)) {
                        atoms.push(id);
                    }
                }
                _ => {
                    for value in table.variable_domain_values(variable) {
                        if let Some(id) =
                            problem.atom_index().index_of(Atom::new(variable, value))
                        {
                            atoms.push(id);
                        }
                    }
                }
            }
        }
        atoms
    }
}
