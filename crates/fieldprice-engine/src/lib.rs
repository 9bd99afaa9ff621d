//! Pricing engine for formula-priced custom fields.
//!
//! The engine turns a read-only snapshot of one event's custom fields and
//! event constants into:
//! - the variables each field's formula may use ([`catalog`], [`constants`],
//!   [`export`]),
//! - the cross-field dependency graph with cycle detection ([`resolver`]),
//! - static validation of candidate formulas ([`validator`]),
//! - priced summands for one entity's answers ([`pricing`], [`summand`]).

pub mod catalog;
pub mod constants;
pub mod error;
pub mod evaluator;
pub mod export;
pub mod pricing;
pub mod resolver;
pub mod snapshot;
pub mod summand;
pub mod validator;

pub use error::{CatalogError, ConstantError, PricingError, ResolveError, SnapshotError, ValidationError};
pub use pricing::{PriceCalculator, PricingOptions};
pub use resolver::DependencyResolver;
pub use snapshot::{EventSnapshot, PricingRequest};
pub use summand::{EntityPriceTag, PricedEntity, Summand, SummandCause};
pub use validator::{FieldReport, FormulaValidator, ValidationOptions};
