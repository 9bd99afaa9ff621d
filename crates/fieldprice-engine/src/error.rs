//! Engine error types.
//!
//! Each component reports its own error enum; [`PricingError`] wraps the
//! lower layers because pricing touches all of them.

use fieldprice_core::entity::EntityRef;
use fieldprice_core::enums::FieldKind;
use fieldprice_core::{ChoiceId, ConstantId, EventId, FieldId};
use fieldprice_formula::FormulaError;

/// Errors from the variable catalog.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    /// The field kind has no variable catalog.
    #[error("unsupported field kind '{kind}' on field {field}")]
    UnsupportedFieldKind { field: FieldId, kind: FieldKind },
}

/// Errors from resolving an event constant's value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstantError {
    /// No value for the event and the default was not requested.
    #[error("event constant {constant} has no value for event {event}")]
    NoValueSpecified { constant: ConstantId, event: EventId },

    /// No value for the event and the requested default is absent.
    #[error("event constant {constant} has no value for event {event} and no default value")]
    NoDefaultValueSpecified { constant: ConstantId, event: EventId },

    /// A formula references a constant that is not part of the snapshot.
    #[error("unknown event constant {0}")]
    UnknownConstant(ConstantId),
}

/// Errors from walking the cross-field dependency graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// `a` (transitively) depends on `b` and `b` directly depends on `a`.
    #[error("Circular dependency: {a} depends on {b} while {b} depends on {a}")]
    CircularDependency { a: FieldId, b: FieldId },

    /// The field id is not part of the resolver's snapshot.
    #[error("field {0} does not exist")]
    UnknownField(FieldId),

    /// A formula references `field{id}` for an id that does not exist.
    #[error("field {field} references unknown field {referenced}")]
    DanglingReference { field: FieldId, referenced: FieldId },

    /// A formula in the graph does not parse.
    #[error("formula of field {field} is invalid: {source}")]
    Formula {
        field: FieldId,
        #[source]
        source: FormulaError,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ResolveError {
    /// Returns `true` if this is a [`ResolveError::CircularDependency`].
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }
}

/// A reason a candidate formula must not be saved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("syntax error at offset {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("formula must produce a number, got {0}")]
    NonNumericResult(&'static str),

    #[error("formula may divide by zero (checked with value = {probe})")]
    DivisionByZeroRisk { probe: f64 },

    #[error("variable '{variable}' cannot be used in formulas of {kind} fields")]
    ForbiddenVariableUsage { variable: String, kind: FieldKind },

    #[error("type error: {0}")]
    TypeMismatch(String),

    #[error("Circular dependency: {a} depends on {b} while {b} depends on {a}")]
    CircularDependency { a: FieldId, b: FieldId },

    #[error("formula cannot be evaluated: {0}")]
    Evaluation(FormulaError),

    #[error(transparent)]
    Resolve(ResolveError),
}

impl From<ResolveError> for ValidationError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::CircularDependency { a, b } => Self::CircularDependency { a, b },
            other => Self::Resolve(other),
        }
    }
}

/// Errors that abort the price computation of one entity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("{0} has no base price")]
    BasePriceUndefined(EntityRef),

    #[error("field {field} ({kind}) cannot take a {shape} answer")]
    AnswerKindMismatch {
        field: FieldId,
        kind: FieldKind,
        shape: &'static str,
    },

    #[error("field {field} has no choice option {choice}")]
    UnknownChoice { field: FieldId, choice: ChoiceId },

    #[error("single choice field {field} has {count} selected options")]
    TooManyChoices { field: FieldId, count: usize },

    #[error("field {field}: {source}")]
    Evaluation {
        field: FieldId,
        #[source]
        source: FormulaError,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Constant(#[from] ConstantError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl PricingError {
    /// Returns `true` if a formula needed a variable nobody supplied.
    pub fn is_unresolved_variable(&self) -> bool {
        matches!(
            self,
            Self::Evaluation {
                source: FormulaError::UnresolvedVariable(_),
                ..
            }
        )
    }
}

/// Errors from loading snapshot and request files.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
