//! Price formula language.
//!
//! Formulas are small arithmetic/boolean expressions attached to custom fields.
//! They are tokenized, parsed into an [`ast::Expr`], and evaluated against a
//! map of named [`types::Value`]s. [`typing`] checks the same rules
//! statically. Compiled formulas are cached per formula text by
//! [`cache::FormulaCache`].

pub mod ast;
pub mod cache;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod types;
pub mod typing;

pub use ast::Expr;
pub use cache::FormulaCache;
pub use types::{Bindings, FormulaError, Result, Value};
pub use typing::ValueType;
