//! Domain model for formula-priced custom fields.
//!
//! This crate holds the plain data types shared by the formula, engine and CLI
//! crates: custom fields and their choice options, event constants, formula
//! variables, entity references and the answers entered for a fillout.

pub mod answer;
pub mod constant;
pub mod entity;
pub mod enums;
pub mod field;
pub mod variable;

/// Identifier of a custom field. Stable and never reused.
pub type FieldId = u64;

/// Identifier of a choice option of a choice field.
pub type ChoiceId = u64;

/// Identifier of an event constant.
pub type ConstantId = u64;

/// Identifier of an event.
pub type EventId = u64;
