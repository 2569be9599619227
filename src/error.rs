//! Fatal diagnostics raised while a problem description is assembled.
//!
//! An unreachable goal is *not* an error; it is surfaced as
//! [`HeuristicValue::Unreachable`](crate::heuristics::HeuristicValue::Unreachable). The variants
//! below all indicate an inconsistent problem description which the engine refuses to run.

use thiserror::Error;

/// The diagnostics raised when an inconsistent problem description is handed to the engine.
///
/// These are fatal at construction time; it is the loader's responsibility to catch them before
/// handing the problem off to a search algorithm.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProblemDefinitionError {
    #[error("type '{0}' has no objects")]
    EmptyType(String),

    #[error("value {value} is outside the domain of state variable '{variable}'")]
    ValueOutsideDomain { variable: String, value: i32 },

    #[error("state variable '{variable}' has no value in the initial state")]
    UninitialisedVariable { variable: String },

    #[error("symbol '{symbol}' applied to {found} arguments, but its signature has {expected}")]
    ArityMismatch {
        symbol: String,
        expected: usize,
        found: usize,
    },

    #[error("'{0}' is a fluent symbol; only static symbols can be looked up in a table")]
    NotStatic(String),

    #[error("'{0}' is a static symbol; state variables can only be built from fluent symbols")]
    NotFluent(String),

    #[error("the extension of static symbol '{symbol}' is undefined for arguments {arguments}")]
    PartialStaticExtension { symbol: String, arguments: String },

    #[error("no state variable has been declared for '{symbol}' applied to {arguments}")]
    UndeclaredStateVariable { symbol: String, arguments: String },

    #[error("parameter #{parameter} is referenced but never bound")]
    UnboundParameter { parameter: usize },

    #[error("quantifier rebinds parameter #{parameter} which is already in scope")]
    ShadowedParameter { parameter: usize },

    #[error("action '{action}' is not ground; the action-centric expansion requires ground actions")]
    ActionNotGround { action: String },

    #[error("the left-hand side of an effect of action '{action}' does not denote a state variable")]
    MalformedEffectTarget { action: String },

    #[error("arguments of a fluent application may not mention state variables")]
    StatefulFluentArgument,

    #[error("the problem declares no state variables")]
    NoStateVariables,
}

/// Raised when the key/value configuration map contains an entry the engine does not recognise
/// or cannot parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("unrecognised configuration key '{0}'")]
    UnrecognisedKey(String),

    #[error("invalid value '{value}' for configuration key '{key}'")]
    InvalidValue { key: String, value: String },
}
