//! Evaluation of terms and formulas against a valuation and a binding.
//!
//! Interpretation is total: the malformed references that could make it fail (unknown symbols,
//! arity mismatches, unbound parameters, partial static extensions, undeclared state variables)
//! are all rejected when the problem is constructed.

use crate::language::binding::Binding;
use crate::language::formulas::Formula;
use crate::language::formulas::Quantifier;
use crate::language::formulas::QuantifiedVariable;
use crate::language::terms::Term;
use crate::problem::state::Valuation;
use crate::problem::symbols::SymbolTable;
use crate::problem::symbols::Value;
use crate::problem::SymbolId;
use crate::problem::VariableId;

/// Interprets the language against the symbol tables of one problem.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Interpreter<'a> {
    table: &'a SymbolTable,
}

/// Used where a term is known to be state-independent, such as the arguments of a fluent
/// application.
struct StatelessValuation;

impl Valuation for StatelessValuation {
    fn value_of(&self, _variable: VariableId) -> Value {
        unreachable!("fluent arguments are state-independent; checked at problem construction")
    }
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(table: &'a SymbolTable) -> Interpreter<'a> {
        Interpreter { table }
    }

    /// The value of `term` under the given valuation and binding.
    pub(crate) fn term_value<V: Valuation>(
        &self,
        term: &Term,
        valuation: &V,
        binding: &mut Binding,
    ) -> Value {
        match term {
            Term::Constant(value) => *value,
            Term::Parameter(slot) => binding
                .value(*slot)
                .expect("parameters are bound before evaluation; checked at problem construction"),
            Term::StateVariable(variable) => valuation.value_of(*variable),
            Term::Application { symbol, args } => {
                if self.table.is_static_symbol(*symbol) {
                    let arguments: Vec<Value> = args
                        .iter()
                        .map(|arg| self.term_value(arg, valuation, binding))
                        .collect();
                    self.table
                        .static_value(*symbol, &arguments)
                        .expect("static extensions are total; checked at problem construction")
                } else {
                    let variable = self.resolve_fluent(*symbol, args, binding);
                    valuation.value_of(variable)
                }
            }
            Term::Arithmetic { op, lhs, rhs } => op.apply(
                self.term_value(lhs, valuation, binding),
                self.term_value(rhs, valuation, binding),
            ),
        }
    }

    /// Whether `formula` holds under the given valuation and binding.
    pub(crate) fn formula_holds<V: Valuation>(
        &self,
        formula: &Formula,
        valuation: &V,
        binding: &mut Binding,
    ) -> bool {
        match formula {
            Formula::Tautology => true,
            Formula::Contradiction => false,
            Formula::Relation {
                comparison,
                lhs,
                rhs,
            } => comparison.holds(
                self.term_value(lhs, valuation, binding),
                self.term_value(rhs, valuation, binding),
            ),
            Formula::Conjunction(subformulas) => subformulas
                .iter()
                .all(|subformula| self.formula_holds(subformula, valuation, binding)),
            Formula::Disjunction(subformulas) => subformulas
                .iter()
                .any(|subformula| self.formula_holds(subformula, valuation, binding)),
            Formula::Negation(subformula) => !self.formula_holds(subformula, valuation, binding),
            Formula::Quantified {
                quantifier,
                variables,
                body,
            } => self.quantified_holds(*quantifier, variables, body, valuation, binding),
        }
    }

    fn quantified_holds<V: Valuation>(
        &self,
        quantifier: Quantifier,
        variables: &[QuantifiedVariable],
        body: &Formula,
        valuation: &V,
        binding: &mut Binding,
    ) -> bool {
        let Some((first, rest)) = variables.split_first() else {
            return self.formula_holds(body, valuation, binding);
        };

        let values: Vec<Value> = self.table.type_values(first.ty).collect();
        let mut holds = match quantifier {
            Quantifier::Exists => false,
            Quantifier::Forall => true,
        };
        for value in values {
            binding.bind(first.parameter, value);
            let inner = self.quantified_holds(quantifier, rest, body, valuation, binding);
            binding.unbind(first.parameter);
            match quantifier {
                Quantifier::Exists if inner => {
                    holds = true;
                    break;
                }
                Quantifier::Forall if !inner => {
                    holds = false;
                    break;
                }
                _ => {}
            }
        }
        holds
    }

    /// The state variable a fluent application resolves to under the given binding.
    pub(crate) fn resolve_fluent(
        &self,
        symbol: SymbolId,
        args: &[Term],
        binding: &mut Binding,
    ) -> VariableId {
        let arguments: Vec<Value> = args
            .iter()
            .map(|arg| self.term_value(arg, &StatelessValuation, binding))
            .collect();
        self.table
            .resolve_variable(symbol, &arguments)
            .expect("every fluent application is declared; checked at problem construction")
    }

    /// The state variable an effect target denotes under the given binding.
    pub(crate) fn resolve_target(&self, target: &Term, binding: &mut Binding) -> VariableId {
        match target {
            Term::StateVariable(variable) => *variable,
            Term::Application { symbol, args } => self.resolve_fluent(*symbol, args, binding),
            _ => unreachable!("effect targets denote state variables; checked at construction"),
        }
    }

    /// Collect the state variables `formula` can read under the given binding, expanding
    /// quantifiers so that fluent applications over quantified parameters are resolved.
    ///
    /// The result may contain duplicates; callers sort and deduplicate.
    pub(crate) fn collect_formula_scope(
        &self,
        formula: &Formula,
        binding: &mut Binding,
        scope: &mut Vec<VariableId>,
    ) {
        match formula {
            Formula::Tautology | Formula::Contradiction => {}
            Formula::Relation { lhs, rhs, .. } => {
                self.collect_term_scope(lhs, binding, scope);
                self.collect_term_scope(rhs, binding, scope);
            }
            Formula::Conjunction(subformulas) | Formula::Disjunction(subformulas) => {
                for subformula in subformulas {
                    self.collect_formula_scope(subformula, binding, scope);
                }
            }
            Formula::Negation(subformula) => {
                self.collect_formula_scope(subformula, binding, scope)
            }
            Formula::Quantified {
                variables, body, ..
            } => self.collect_quantified_scope(variables, body, binding, scope),
        }
    }

    fn collect_quantified_scope(
        &self,
        variables: &[QuantifiedVariable],
        body: &Formula,
        binding: &mut Binding,
        scope: &mut Vec<VariableId>,
    ) {
        let Some((first, rest)) = variables.split_first() else {
            self.collect_formula_scope(body, binding, scope);
            return;
        };
        let values: Vec<Value> = self.table.type_values(first.ty).collect();
        for value in values {
            binding.bind(first.parameter, value);
            self.collect_quantified_scope(rest, body, binding, scope);
            binding.unbind(first.parameter);
        }
    }

    /// Collect the state variables `term` can read under the given binding.
    pub(crate) fn collect_term_scope(
        &self,
        term: &Term,
        binding: &mut Binding,
        scope: &mut Vec<VariableId>,
    ) {
        match term {
            Term::Constant(_) | Term::Parameter(_) => {}
            Term::StateVariable(variable) => scope.push(*variable),
            Term::Application { symbol, args } => {
                if self.table.is_static_symbol(*symbol) {
                    for arg in args {
                        self.collect_term_scope(arg, binding, scope);
                    }
                } else {
                    scope.push(self.resolve_fluent(*symbol, args, binding));
                }
            }
            Term::Arithmetic { lhs, rhs, .. } => {
                self.collect_term_scope(lhs, binding, scope);
                self.collect_term_scope(rhs, binding, scope);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;
    use crate::language::formulas::Comparison;
    use crate::problem::atom_index::Atom;
    use crate::problem::state::State;
    use crate::problem::state::StateLayout;
    use crate::problem::symbols::TRUE;
    use std::sync::Arc;

    fn logistics_table() -> (SymbolTable, Vec<VariableId>, Vec<Value>) {
        let mut table = SymbolTable::new();
        let block = table.add_type("block");
        let a = table.add_object("a", block);
        let b = table.add_object("b", block);
        let loc = table.add_fluent_function("loc", vec![block], block);
        let loc_a = table.add_state_variable(loc, vec![a]).unwrap();
        let loc_b = table.add_state_variable(loc, vec![b]).unwrap();
        (table, vec![loc_a, loc_b], vec![a, b])
    }

    #[test]
    fn relations_compare_term_values() {
        let (table, vars, objects) = logistics_table();
        let layout = Arc::new(StateLayout::new(&table));
        let state = State::new(
            layout,
            &[Atom::new(vars[0], objects[1]), Atom::new(vars[1], objects[1])],
        );
        let interpreter = Interpreter::new(&table);
        let mut binding = Binding::empty();

        let same_place = Formula::eq(
            Term::state_variable(vars[0]),
            Term::state_variable(vars[1]),
        );
        assert!(interpreter.formula_holds(&same_place, &state, &mut binding));

        let apart = Formula::relation(
            Comparison::Neq,
            Term::state_variable(vars[0]),
            Term::state_variable(vars[1]),
        );
        assert!(!interpreter.formula_holds(&apart, &state, &mut binding));
    }

    #[test]
    fn existential_quantifiers_search_the_type() {
        let (mut table, vars, objects) = logistics_table();
        let block = crate::problem::TypeId::create_from_index(0);
        let somewhere = table.add_predicate("somewhere", vec![]);
        let somewhere_var = table.add_state_variable(somewhere, vec![]).unwrap();
        let layout = Arc::new(StateLayout::new(&table));
        let state = State::new(
            layout,
            &[
                Atom::new(vars[0], objects[0]),
                Atom::new(vars[1], objects[1]),
                Atom::new(somewhere_var, TRUE),
            ],
        );
        let interpreter = Interpreter::new(&table);
        let mut binding = Binding::empty();

        // exists x: loc(x) = b
        let loc_symbol = table.variable_symbol(vars[0]);
        let formula = Formula::exists(
            vec![QuantifiedVariable {
                parameter: 0,
                ty: block,
            }],
            Formula::eq(
                Term::application(loc_symbol, vec![Term::parameter(0)]),
                Term::constant(objects[1]),
            ),
        );
        assert!(interpreter.formula_holds(&formula, &state, &mut binding));

        // forall x: loc(x) = b does not hold since loc(a) = a.
        let formula = Formula::forall(
            vec![QuantifiedVariable {
                parameter: 0,
                ty: block,
            }],
            Formula::eq(
                Term::application(loc_symbol, vec![Term::parameter(0)]),
                Term::constant(objects[1]),
            ),
        );
        assert!(!interpreter.formula_holds(&formula, &state, &mut binding));
    }

    #[test]
    fn scope_collection_expands_quantifiers() {
        let (table, vars, _objects) = logistics_table();
        let block = crate::problem::TypeId::create_from_index(0);
        let loc_symbol = table.variable_symbol(vars[0]);
        let interpreter = Interpreter::new(&table);

        let formula = Formula::exists(
            vec![QuantifiedVariable {
                parameter: 0,
                ty: block,
            }],
            Formula::eq(
                Term::application(loc_symbol, vec![Term::parameter(0)]),
                Term::constant(0),
            ),
        );

        let mut scope = Vec::new();
        let mut binding = Binding::empty();
        interpreter.collect_formula_scope(&formula, &mut binding, &mut scope);
        scope.sort();
        scope.dedup();
        assert_eq!(scope, vars);
    }
}
