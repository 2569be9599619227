//! The type, object, symbol, and state-variable tables of a planning problem.
//!
//! Everything in the engine refers to these tables through dense numeric ids; the tables
//! themselves are immutable once the [`Problem`](crate::problem::Problem) owning them has been
//! constructed.

use std::fmt::Write as _;

use itertools::Itertools;

use crate::containers::HashMap;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::error::ProblemDefinitionError;
use crate::stratum_assert_simple;

/// The value of a state variable or the interpretation of a term.
///
/// Objects are identified with their (non-negative) value, so a single integer type doubles as
/// object id and as arithmetic operand. Predicate variables use [`FALSE`] and [`TRUE`].
pub type Value = i32;

/// The value of a false predicate variable.
pub const FALSE: Value = 0;
/// The value of a true predicate variable.
pub const TRUE: Value = 1;

/// The id of an object type. Types partition the objects of a problem.
#[derive(Clone, PartialEq, Eq, Copy, Hash)]
pub struct TypeId {
    id: u32,
}

impl TypeId {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl StorageKey for TypeId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        TypeId { id: index as u32 }
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.id)
    }
}

impl std::fmt::Debug for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// The id of a predicate or function symbol.
#[derive(Clone, PartialEq, Eq, Copy, Hash)]
pub struct SymbolId {
    id: u32,
}

impl SymbolId {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl StorageKey for SymbolId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        SymbolId { id: index as u32 }
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "f{}", self.id)
    }
}

impl std::fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// The id of a ground state variable, e.g. `loc(a)`.
#[derive(Clone, PartialEq, Eq, Copy, Hash, PartialOrd, Ord)]
pub struct VariableId {
    id: u32,
}

impl VariableId {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl StorageKey for VariableId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        VariableId { id: index as u32 }
    }
}

impl std::fmt::Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}

impl std::fmt::Debug for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// How the members of a type are stored.
#[derive(Debug, Clone)]
enum TypeKind {
    /// An enumerated set of objects, in insertion order.
    Objects(Vec<Value>),
    /// A bounded integer range, both ends inclusive.
    Interval { lo: Value, hi: Value },
}

#[derive(Debug, Clone)]
struct TypeInfo {
    name: String,
    kind: TypeKind,
}

#[derive(Debug, Clone)]
struct ObjectInfo {
    name: String,
    ty: TypeId,
}

/// Whether a symbol denotes a predicate (boolean-valued) or a function into a codomain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Predicate,
    Function { codomain: TypeId },
}

#[derive(Debug, Clone)]
struct SymbolInfo {
    name: String,
    signature: Vec<TypeId>,
    kind: SymbolKind,
    is_static: bool,
    /// The extension of a static symbol, mapping argument tuples to values. Empty for fluent
    /// symbols.
    extension: HashMap<Vec<Value>, Value>,
}

/// The domain of values a state variable ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableDomain {
    /// Predicate variables take the values [`FALSE`] and [`TRUE`].
    Boolean,
    /// All other variables range over their declared type.
    Typed(TypeId),
}

#[derive(Debug, Clone)]
struct VariableInfo {
    name: String,
    symbol: SymbolId,
    args: Vec<Value>,
    domain: VariableDomain,
}

/// Iterator over the values of a type.
#[derive(Debug, Clone)]
pub enum TypeValues<'a> {
    Objects(std::slice::Iter<'a, Value>),
    Interval(std::ops::RangeInclusive<Value>),
}

impl Iterator for TypeValues<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            TypeValues::Objects(iter) => iter.next().copied(),
            TypeValues::Interval(range) => range.next(),
        }
    }
}

/// The immutable tables describing the vocabulary of a planning problem: its types, objects,
/// predicate/function symbols, and ground state variables.
///
/// The table is assembled by the problem loader through the `add_*` methods and checked for
/// consistency when the [`Problem`](crate::problem::Problem) is constructed. After that point it
/// is shared read-only by every heuristic evaluation.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    types: KeyedVec<TypeId, TypeInfo>,
    /// Objects indexed by their value.
    objects: Vec<ObjectInfo>,
    symbols: KeyedVec<SymbolId, SymbolInfo>,
    variables: KeyedVec<VariableId, VariableInfo>,
    variable_lookup: HashMap<(SymbolId, Vec<Value>), VariableId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Declare a new object type with an (initially empty) enumerated member set.
    pub fn add_type(&mut self, name: &str) -> TypeId {
        self.types.push(TypeInfo {
            name: name.to_owned(),
            kind: TypeKind::Objects(Vec::new()),
        })
    }

    /// Declare a bounded integer type with both ends inclusive.
    pub fn add_interval_type(&mut self, name: &str, lo: Value, hi: Value) -> TypeId {
        self.types.push(TypeInfo {
            name: name.to_owned(),
            kind: TypeKind::Interval { lo, hi },
        })
    }

    /// Declare a new object of the given enumerated type and return its value.
    pub fn add_object(&mut self, name: &str, ty: TypeId) -> Value {
        stratum_assert_simple!(
            matches!(self.types[ty].kind, TypeKind::Objects(_)),
            "objects can only be added to enumerated types"
        );
        let value = self.objects.len() as Value;
        self.objects.push(ObjectInfo {
            name: name.to_owned(),
            ty,
        });
        if let TypeKind::Objects(members) = &mut self.types[ty].kind {
            members.push(value);
        }
        value
    }

    /// Declare a fluent predicate symbol.
    pub fn add_predicate(&mut self, name: &str, signature: Vec<TypeId>) -> SymbolId {
        self.symbols.push(SymbolInfo {
            name: name.to_owned(),
            signature,
            kind: SymbolKind::Predicate,
            is_static: false,
            extension: HashMap::default(),
        })
    }

    /// Declare a fluent function symbol with the given codomain type.
    pub fn add_fluent_function(
        &mut self,
        name: &str,
        signature: Vec<TypeId>,
        codomain: TypeId,
    ) -> SymbolId {
        self.symbols.push(SymbolInfo {
            name: name.to_owned(),
            signature,
            kind: SymbolKind::Function { codomain },
            is_static: false,
            extension: HashMap::default(),
        })
    }

    /// Declare a static function symbol. Its extension is filled in through
    /// [`SymbolTable::set_static_mapping`] and must be total over the signature; totality is
    /// checked when the problem is constructed.
    pub fn add_static_function(
        &mut self,
        name: &str,
        signature: Vec<TypeId>,
        codomain: TypeId,
    ) -> SymbolId {
        self.symbols.push(SymbolInfo {
            name: name.to_owned(),
            signature,
            kind: SymbolKind::Function { codomain },
            is_static: true,
            extension: HashMap::default(),
        })
    }

    /// Record one tuple of the extension of a static symbol.
    pub fn set_static_mapping(&mut self, symbol: SymbolId, args: Vec<Value>, value: Value) {
        stratum_assert_simple!(
            self.symbols[symbol].is_static,
            "extensions can only be set for static symbols"
        );
        let _ = self.symbols[symbol].extension.insert(args, value);
    }

    /// Declare the ground state variable `symbol(args)`.
    ///
    /// The symbol must be fluent and the arguments must match its signature; the variable's
    /// domain is derived from the symbol kind.
    pub fn add_state_variable(
        &mut self,
        symbol: SymbolId,
        args: Vec<Value>,
    ) -> Result<VariableId, ProblemDefinitionError> {
        let info = &self.symbols[symbol];
        if info.is_static {
            return Err(ProblemDefinitionError::NotFluent(info.name.clone()));
        }
        if info.signature.len() != args.len() {
            return Err(ProblemDefinitionError::ArityMismatch {
                symbol: info.name.clone(),
                expected: info.signature.len(),
                found: args.len(),
            });
        }
        let domain = match info.kind {
            SymbolKind::Predicate => VariableDomain::Boolean,
            SymbolKind::Function { codomain } => VariableDomain::Typed(codomain),
        };
        let name = self.render_application(symbol, &args);
        let id = self.variables.push(VariableInfo {
            name,
            symbol,
            args: args.clone(),
            domain,
        });
        let _ = self.variable_lookup.insert((symbol, args), id);
        Ok(id)
    }

    pub fn num_types(&self) -> usize {
        self.types.len()
    }

    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn num_symbols(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> {
        self.symbols.keys()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variables(&self) -> impl Iterator<Item = VariableId> {
        self.variables.keys()
    }

    pub fn variable_name(&self, variable: VariableId) -> &str {
        &self.variables[variable].name
    }

    pub fn variable_symbol(&self, variable: VariableId) -> SymbolId {
        self.variables[variable].symbol
    }

    /// The argument tuple the variable was built from, e.g. `[a]` for `loc(a)`.
    pub fn variable_args(&self, variable: VariableId) -> &[Value] {
        &self.variables[variable].args
    }

    pub fn variable_domain(&self, variable: VariableId) -> VariableDomain {
        self.variables[variable].domain
    }

    pub fn is_predicate_variable(&self, variable: VariableId) -> bool {
        matches!(self.variables[variable].domain, VariableDomain::Boolean)
    }

    /// The values the given state variable ranges over, in ascending order for boolean and
    /// interval domains and in object insertion order otherwise.
    pub fn variable_domain_values(&self, variable: VariableId) -> TypeValues<'_> {
        static BOOLEAN: [Value; 2] = [FALSE, TRUE];
        match self.variables[variable].domain {
            VariableDomain::Boolean => TypeValues::Objects(BOOLEAN.iter()),
            VariableDomain::Typed(ty) => self.type_values(ty),
        }
    }

    /// Whether `value` lies in the domain of the given state variable.
    pub fn value_in_variable_domain(&self, variable: VariableId, value: Value) -> bool {
        match self.variables[variable].domain {
            VariableDomain::Boolean => value == FALSE || value == TRUE,
            VariableDomain::Typed(ty) => self.value_in_type(ty, value),
        }
    }

    /// The members of a type.
    pub fn type_values(&self, ty: TypeId) -> TypeValues<'_> {
        match &self.types[ty].kind {
            TypeKind::Objects(members) => TypeValues::Objects(members.iter()),
            TypeKind::Interval { lo, hi } => TypeValues::Interval(*lo..=*hi),
        }
    }

    pub fn value_in_type(&self, ty: TypeId, value: Value) -> bool {
        match &self.types[ty].kind {
            TypeKind::Objects(members) => members.contains(&value),
            TypeKind::Interval { lo, hi } => (*lo..=*hi).contains(&value),
        }
    }

    pub fn type_name(&self, ty: TypeId) -> &str {
        &self.types[ty].name
    }

    pub fn symbol_name(&self, symbol: SymbolId) -> &str {
        &self.symbols[symbol].name
    }

    pub fn symbol_signature(&self, symbol: SymbolId) -> &[TypeId] {
        &self.symbols[symbol].signature
    }

    pub fn symbol_kind(&self, symbol: SymbolId) -> SymbolKind {
        self.symbols[symbol].kind
    }

    pub fn is_static_symbol(&self, symbol: SymbolId) -> bool {
        self.symbols[symbol].is_static
    }

    /// Whether all symbols of the problem are predicates.
    pub fn is_predicative(&self) -> bool {
        self.symbols
            .iter()
            .all(|info| matches!(info.kind, SymbolKind::Predicate))
    }

    /// Look up the value of a static symbol for the given argument tuple.
    pub fn static_value(&self, symbol: SymbolId, args: &[Value]) -> Option<Value> {
        self.symbols[symbol].extension.get(args).copied()
    }

    /// The declared state variables built from the given symbol.
    pub fn variables_of_symbol(
        &self,
        symbol: SymbolId,
    ) -> impl Iterator<Item = VariableId> + '_ {
        self.variables
            .keys()
            .filter(move |&variable| self.variables[variable].symbol == symbol)
    }

    /// Resolve the state variable `symbol(args)`, if it has been declared.
    pub fn resolve_variable(&self, symbol: SymbolId, args: &[Value]) -> Option<VariableId> {
        self.variable_lookup
            .get(&(symbol, args.to_vec()))
            .copied()
    }

    pub fn object_name(&self, value: Value) -> Option<&str> {
        self.objects
            .get(usize::try_from(value).ok()?)
            .map(|info| info.name.as_str())
    }

    /// The type an object belongs to, or `None` when the value is not an object.
    pub fn object_type(&self, value: Value) -> Option<TypeId> {
        self.objects
            .get(usize::try_from(value).ok()?)
            .map(|info| info.ty)
    }

    fn render_application(&self, symbol: SymbolId, args: &[Value]) -> String {
        let mut rendered = self.symbols[symbol].name.clone();
        if !args.is_empty() {
            let _ = write!(
                rendered,
                "({})",
                args.iter()
                    .map(|&value| match self.object_name(value) {
                        Some(name) => name.to_owned(),
                        None => value.to_string(),
                    })
                    .join(", ")
            );
        }
        rendered
    }

    /// Check the table for the inconsistencies the engine refuses to run with: empty types and
    /// partial static extensions.
    pub(crate) fn validate(&self) -> Result<(), ProblemDefinitionError> {
        for ty in self.types.keys() {
            let empty = match &self.types[ty].kind {
                TypeKind::Objects(members) => members.is_empty(),
                TypeKind::Interval { lo, hi } => lo > hi,
            };
            if empty {
                return Err(ProblemDefinitionError::EmptyType(
                    self.types[ty].name.clone(),
                ));
            }
        }

        for symbol in self.symbols.keys() {
            let info = &self.symbols[symbol];
            if !info.is_static {
                continue;
            }
            // Static extensions must be total so that interpretation never fails mid-evaluation.
            let mut argument_tuples = info
                .signature
                .iter()
                .map(|&ty| self.type_values(ty).collect::<Vec<_>>())
                .multi_cartesian_product();
            if info.signature.is_empty() {
                // `multi_cartesian_product` yields nothing for an empty product; a 0-ary static
                // symbol still needs its single entry.
                if !info.extension.contains_key(&Vec::new()) {
                    return Err(ProblemDefinitionError::PartialStaticExtension {
                        symbol: info.name.clone(),
                        arguments: "()".to_owned(),
                    });
                }
                continue;
            }
            if let Some(missing) =
                argument_tuples.find(|tuple| !info.extension.contains_key(tuple))
            {
                return Err(ProblemDefinitionError::PartialStaticExtension {
                    symbol: info.name.clone(),
                    arguments: format!("({})", missing.iter().join(", ")),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_variables_resolve_back_to_their_id() {
        let mut table = SymbolTable::new();
        let block = table.add_type("block");
        let a = table.add_object("a", block);
        let location = table.add_fluent_function("loc", vec![block], block);

        let var = table.add_state_variable(location, vec![a]).unwrap();

        assert_eq!(table.resolve_variable(location, &[a]), Some(var));
        assert_eq!(table.variable_name(var), "loc(a)");
        assert!(!table.is_predicate_variable(var));
    }

    #[test]
    fn predicate_variables_range_over_booleans() {
        let mut table = SymbolTable::new();
        let p = table.add_predicate("p", vec![]);
        let var = table.add_state_variable(p, vec![]).unwrap();

        let values: Vec<Value> = table.variable_domain_values(var).collect();
        assert_eq!(values, vec![FALSE, TRUE]);
    }

    #[test]
    fn state_variables_require_fluent_symbols() {
        let mut table = SymbolTable::new();
        let counter = table.add_interval_type("count", 0, 3);
        let limit = table.add_static_function("limit", vec![], counter);

        let result = table.add_state_variable(limit, vec![]);
        assert!(matches!(result, Err(ProblemDefinitionError::NotFluent(_))));
    }

    #[test]
    fn validation_rejects_empty_types() {
        let mut table = SymbolTable::new();
        let _ = table.add_type("ghost");

        assert!(matches!(
            table.validate(),
            Err(ProblemDefinitionError::EmptyType(_))
        ));
    }

    #[test]
    fn validation_rejects_partial_static_extensions() {
        let mut table = SymbolTable::new();
        let block = table.add_type("block");
        let a = table.add_object("a", block);
        let _b = table.add_object("b", block);
        let weight = table.add_static_function("weight", vec![block], block);
        table.set_static_mapping(weight, vec![a], a);

        assert!(matches!(
            table.validate(),
            Err(ProblemDefinitionError::PartialStaticExtension { .. })
        ));
    }
}
