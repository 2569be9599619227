//! The immutable problem description consumed by the heuristic engine.

use std::sync::Arc;

use itertools::Itertools;
use log::info;

use crate::actions::Action;
use crate::actions::ActionId;
use crate::containers::HashSet;
use crate::containers::KeyedVec;
use crate::error::ProblemDefinitionError;
use crate::language::Formula;
use crate::language::Term;
use crate::problem::atom_index::Atom;
use crate::problem::atom_index::AtomIndex;
use crate::problem::state::State;
use crate::problem::state::StateLayout;
use crate::problem::symbols::SymbolTable;
use crate::statistics::log_statistic;
use crate::statistics::should_log_statistics;

/// Everything the engine knows about one planning problem: the symbol tables, the atom index,
/// the initial state, the goal and state-constraint formulas, and the action table.
///
/// A problem is validated exhaustively at construction and immutable afterwards; heuristic
/// evaluations share it read-only, which is what makes running evaluations in parallel sound.
#[derive(Debug)]
pub struct Problem {
    table: SymbolTable,
    atom_index: AtomIndex,
    layout: Arc<StateLayout>,
    initial_state: State,
    goal: Formula,
    state_constraints: Formula,
    actions: KeyedVec<ActionId, Action>,
}

impl Problem {
    /// Assemble and validate a problem description.
    ///
    /// This is the place where every inconsistency the engine refuses to run with is caught:
    /// empty types, partial static extensions, malformed formulas and effects, initial values
    /// outside their variable's domain, and uncovered state variables.
    pub fn new(
        table: SymbolTable,
        initial_atoms: Vec<Atom>,
        goal: Formula,
        state_constraints: Formula,
        actions: Vec<Action>,
        negated_atoms_allowed: bool,
    ) -> Result<Problem, ProblemDefinitionError> {
        table.validate()?;
        if table.num_variables() == 0 {
            return Err(ProblemDefinitionError::NoStateVariables);
        }
        Self::validate_fluent_coverage(&table)?;
        Self::validate_initial_atoms(&table, &initial_atoms)?;

        let validator = FormulaValidator { table: &table };
        validator.validate_closed_formula(&goal)?;
        validator.validate_closed_formula(&state_constraints)?;
        for action in &actions {
            validator.validate_action(action)?;
        }

        let layout = Arc::new(StateLayout::new(&table));
        let initial_state = State::new(Arc::clone(&layout), &initial_atoms);
        let atom_index = AtomIndex::new(&table, negated_atoms_allowed);

        let mut action_table: KeyedVec<ActionId, Action> = KeyedVec::new();
        for action in actions {
            let _ = action_table.push(action);
        }

        let problem = Problem {
            table,
            atom_index,
            layout,
            initial_state,
            goal,
            state_constraints,
            actions: action_table,
        };
        problem.report_bootstrap_statistics();
        Ok(problem)
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn atom_index(&self) -> &AtomIndex {
        &self.atom_index
    }

    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    pub fn goal(&self) -> &Formula {
        &self.goal
    }

    pub fn state_constraints(&self) -> &Formula {
        &self.state_constraints
    }

    pub fn action(&self, action: ActionId) -> &Action {
        &self.actions[action]
    }

    pub fn actions(&self) -> impl Iterator<Item = ActionId> {
        self.actions.keys()
    }

    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// Whether every action of the problem is fully ground.
    pub fn is_ground(&self) -> bool {
        self.actions.iter().all(|action| action.is_ground())
    }

    /// Build a state over this problem's layout from an assignment list. Useful for search
    /// algorithms constructing seed states of their own.
    pub fn state_from_atoms(&self, atoms: &[Atom]) -> State {
        State::new(Arc::clone(&self.layout), atoms)
    }

    fn report_bootstrap_statistics(&self) {
        info!(
            "problem bootstrapped: {} variables, {} atoms, {} actions",
            self.table.num_variables(),
            self.atom_index.len(),
            self.actions.len()
        );
        if should_log_statistics() {
            log_statistic("num_objects", self.table.num_objects());
            log_statistic("num_state_variables", self.table.num_variables());
            log_statistic("num_atoms", self.atom_index.len());
            log_statistic("num_actions", self.actions.len());
        }
    }

    /// Every fluent application must resolve to a declared state variable, for any choice of
    /// arguments; interpretation relies on it.
    fn validate_fluent_coverage(table: &SymbolTable) -> Result<(), ProblemDefinitionError> {
        for symbol in table.symbols() {
            if table.is_static_symbol(symbol) {
                continue;
            }
            let signature = table.symbol_signature(symbol).to_vec();
            let mut tuples = signature
                .iter()
                .map(|&ty| table.type_values(ty).collect::<Vec<_>>())
                .multi_cartesian_product();
            if signature.is_empty() {
                if table.resolve_variable(symbol, &[]).is_none() {
                    return Err(ProblemDefinitionError::UndeclaredStateVariable {
                        symbol: table.symbol_name(symbol).to_owned(),
                        arguments: "()".to_owned(),
                    });
                }
                continue;
            }
            if let Some(missing) =
                tuples.find(|tuple| table.resolve_variable(symbol, tuple).is_none())
            {
                return Err(ProblemDefinitionError::UndeclaredStateVariable {
                    symbol: table.symbol_name(symbol).to_owned(),
                    arguments: format!("({})", missing.iter().join(", ")),
                });
            }
        }
        Ok(())
    }

    fn validate_initial_atoms(
        table: &SymbolTable,
        initial_atoms: &[Atom],
    ) -> Result<(), ProblemDefinitionError> {
        for atom in initial_atoms {
            if !table.value_in_variable_domain(atom.variable, atom.value) {
                return Err(ProblemDefinitionError::ValueOutsideDomain {
                    variable: table.variable_name(atom.variable).to_owned(),
                    value: atom.value,
                });
            }
        }

        // Predicates default to false; every other variable must be covered explicitly, unless
        // 0 happens to lie in its domain and can serve as the default.
        let covered: HashSet<_> = initial_atoms.iter().map(|atom| atom.variable).collect();
        for variable in table.variables() {
            if table.is_predicate_variable(variable) || covered.contains(&variable) {
                continue;
            }
            if !table.value_in_variable_domain(variable, 0) {
                return Err(ProblemDefinitionError::UninitialisedVariable {
                    variable: table.variable_name(variable).to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Checks formulas and effects for the malformations interpretation cannot tolerate.
struct FormulaValidator<'a> {
    table: &'a SymbolTable,
}

impl FormulaValidator<'_> {
    fn validate_closed_formula(&self, formula: &Formula) -> Result<(), ProblemDefinitionError> {
        let mut bound = HashSet::default();
        self.validate_formula(formula, &mut bound)
    }

    fn validate_action(&self, action: &Action) -> Result<(), ProblemDefinitionError> {
        let mut bound: HashSet<usize> = (0..action.parameters.len()).collect();
        self.validate_formula(&action.precondition, &mut bound)?;
        for effect in &action.effects {
            self.validate_formula(&effect.condition, &mut bound)?;
            match &effect.target {
                Term::StateVariable(_) => {}
                Term::Application { symbol, args } if !self.table.is_static_symbol(*symbol) => {
                    self.check_arity(*symbol, args.len())?;
                    for arg in args {
                        self.validate_stateless_term(arg, &bound)?;
                    }
                }
                _ => {
                    return Err(ProblemDefinitionError::MalformedEffectTarget {
                        action: action.name.clone(),
                    })
                }
            }
            self.validate_term(&effect.value, &mut bound)?;
        }
        Ok(())
    }

    fn validate_formula(
        &self,
        formula: &Formula,
        bound: &mut HashSet<usize>,
    ) -> Result<(), ProblemDefinitionError> {
        match formula {
            Formula::Tautology | Formula::Contradiction => Ok(()),
            Formula::Relation { lhs, rhs, .. } => {
                self.validate_term(lhs, bound)?;
                self.validate_term(rhs, bound)
            }
            Formula::Conjunction(subformulas) | Formula::Disjunction(subformulas) => {
                subformulas
                    .iter()
                    .try_for_each(|subformula| self.validate_formula(subformula, bound))
            }
            Formula::Negation(subformula) => self.validate_formula(subformula, bound),
            Formula::Quantified {
                variables, body, ..
            } => {
                for variable in variables {
                    if !bound.insert(variable.parameter) {
                        return Err(ProblemDefinitionError::ShadowedParameter {
                            parameter: variable.parameter,
                        });
                    }
                }
                self.validate_formula(body, bound)?;
                for variable in variables {
                    let _ = bound.remove(&variable.parameter);
                }
                Ok(())
            }
        }
    }

    fn validate_term(
        &self,
        term: &Term,
        bound: &mut HashSet<usize>,
    ) -> Result<(), ProblemDefinitionError> {
        match term {
            Term::Constant(_) | Term::StateVariable(_) => Ok(()),
            Term::Parameter(slot) => {
                if bound.contains(slot) {
                    Ok(())
                } else {
                    Err(ProblemDefinitionError::UnboundParameter { parameter: *slot })
                }
            }
            Term::Application { symbol, args } => {
                self.check_arity(*symbol, args.len())?;
                if self.table.is_static_symbol(*symbol) {
                    args.iter().try_for_each(|arg| self.validate_term(arg, bound))
                } else {
                    // Fluent applications resolve to a state variable before evaluation, so
                    // their arguments must be evaluable without a state.
                    args.iter()
                        .try_for_each(|arg| self.validate_stateless_term(arg, bound))
                }
            }
            Term::Arithmetic { lhs, rhs, .. } => {
                self.validate_term(lhs, bound)?;
                self.validate_term(rhs, bound)
            }
        }
    }

    fn validate_stateless_term(
        &self,
        term: &Term,
        bound: &HashSet<usize>,
    ) -> Result<(), ProblemDefinitionError> {
        match term {
            Term::Constant(_) => Ok(()),
            Term::Parameter(slot) => {
                if bound.contains(slot) {
                    Ok(())
                } else {
                    Err(ProblemDefinitionError::UnboundParameter { parameter: *slot })
                }
            }
            Term::StateVariable(_) => Err(ProblemDefinitionError::StatefulFluentArgument),
            Term::Application { symbol, args } => {
                if !self.table.is_static_symbol(*symbol) {
                    return Err(ProblemDefinitionError::StatefulFluentArgument);
                }
                self.check_arity(*symbol, args.len())?;
                args.iter()
                    .try_for_each(|arg| self.validate_stateless_term(arg, bound))
            }
            Term::Arithmetic { lhs, rhs, .. } => {
                self.validate_stateless_term(lhs, bound)?;
                self.validate_stateless_term(rhs, bound)
            }
        }
    }

    fn check_arity(
        &self,
        symbol: crate::problem::SymbolId,
        found: usize,
    ) -> Result<(), ProblemDefinitionError> {
        let expected = self.table.symbol_signature(symbol).len();
        if expected != found {
            return Err(ProblemDefinitionError::ArityMismatch {
                symbol: self.table.symbol_name(symbol).to_owned(),
                expected,
                found,
            });
        }
        Ok(())
    }
}
