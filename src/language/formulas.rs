//! The formula half of the language: everything that denotes a truth value.

use crate::language::terms::Term;
use crate::problem::symbols::Value;
use crate::problem::TypeId;

/// A comparison between two term values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
}

impl Comparison {
    pub(crate) fn holds(self, lhs: Value, rhs: Value) -> bool {
        match self {
            Comparison::Eq => lhs == rhs,
            Comparison::Neq => lhs != rhs,
            Comparison::Lt => lhs < rhs,
            Comparison::Leq => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Geq => lhs >= rhs,
        }
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparison::Eq => write!(f, "="),
            Comparison::Neq => write!(f, "!="),
            Comparison::Lt => write!(f, "<"),
            Comparison::Leq => write!(f, "<="),
            Comparison::Gt => write!(f, ">"),
            Comparison::Geq => write!(f, ">="),
        }
    }
}

/// The quantifier of a [`Formula::Quantified`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Exists,
    Forall,
}

/// A variable bound by a quantifier: the parameter slot it occupies and the type it ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantifiedVariable {
    pub parameter: usize,
    pub ty: TypeId,
}

/// A formula of the action language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    Tautology,
    Contradiction,
    /// An atomic constraint comparing two term values.
    Relation {
        comparison: Comparison,
        lhs: Term,
        rhs: Term,
    },
    Conjunction(Vec<Formula>),
    Disjunction(Vec<Formula>),
    Negation(Box<Formula>),
    Quantified {
        quantifier: Quantifier,
        variables: Vec<QuantifiedVariable>,
        body: Box<Formula>,
    },
}

impl Formula {
    pub fn relation(comparison: Comparison, lhs: Term, rhs: Term) -> Formula {
        Formula::Relation {
            comparison,
            lhs,
            rhs,
        }
    }

    pub fn eq(lhs: Term, rhs: Term) -> Formula {
        Formula::relation(Comparison::Eq, lhs, rhs)
    }

    pub fn neq(lhs: Term, rhs: Term) -> Formula {
        Formula::relation(Comparison::Neq, lhs, rhs)
    }

    pub fn and(subformulas: Vec<Formula>) -> Formula {
        Formula::Conjunction(subformulas)
    }

    pub fn or(subformulas: Vec<Formula>) -> Formula {
        Formula::Disjunction(subformulas)
    }

    pub fn not(subformula: Formula) -> Formula {
        Formula::Negation(Box::new(subformula))
    }

    pub fn exists(variables: Vec<QuantifiedVariable>, body: Formula) -> Formula {
        Formula::Quantified {
            quantifier: Quantifier::Exists,
            variables,
            body: Box::new(body),
        }
    }

    pub fn forall(variables: Vec<QuantifiedVariable>, body: Formula) -> Formula {
        Formula::Quantified {
            quantifier: Quantifier::Forall,
            variables,
            body: Box::new(body),
        }
    }

    /// The conjunction of two formulas, absorbing tautologies so that a problem without state
    /// constraints does not pay for them on every goal check.
    pub fn conjoin(self, other: Formula) -> Formula {
        match (self, other) {
            (Formula::Tautology, other) => other,
            (formula, Formula::Tautology) => formula,
            (Formula::Conjunction(mut left), Formula::Conjunction(right)) => {
                left.extend(right);
                Formula::Conjunction(left)
            }
            (Formula::Conjunction(mut left), right) => {
                left.push(right);
                Formula::Conjunction(left)
            }
            (left, right) => Formula::Conjunction(vec![left, right]),
        }
    }
}
