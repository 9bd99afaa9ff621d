//! Formula variables and the naming scheme that ties them to fields,
//! choice options and event constants.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::VariableKind;
use crate::{ChoiceId, ConstantId, FieldId};

/// Name of the implicit raw-answer variable.
pub const VALUE: &str = "value";

/// Name of the "field is filled in" variable.
pub const VALUE_NOT_EMPTY: &str = "valueNotEmpty";

/// Name of the "number of selected options" variable of choice fields.
pub const CHOICES_SELECTED_COUNT: &str = "choicesSelectedCount";

const FIELD_PREFIX: &str = "field";
const CONSTANT_PREFIX: &str = "eventSpecific";
const CHOICE_PREFIX: &str = "choice";
const CHOICE_SUFFIX: &str = "selected";

/// One name exposed into a formula's namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormulaVariable {
    pub name: String,
    pub kind: VariableKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

impl FormulaVariable {
    pub fn numeric(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Numeric,
            label: label.into(),
        }
    }

    pub fn boolean(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Boolean,
            label: label.into(),
        }
    }
}

/// Variables keyed by name, in name order.
pub type VariableMap = BTreeMap<String, FormulaVariable>;

/// `field{id}`: the variable another field exports.
pub fn field_variable_name(id: FieldId) -> String {
    format!("{FIELD_PREFIX}{id}")
}

/// `eventSpecific{id}`: the variable of an event constant.
pub fn constant_variable_name(id: ConstantId) -> String {
    format!("{CONSTANT_PREFIX}{id}")
}

/// `choice{id}selected`: whether a choice option is selected.
pub fn choice_variable_name(id: ChoiceId) -> String {
    format!("{CHOICE_PREFIX}{id}{CHOICE_SUFFIX}")
}

/// Parses `field{id}` back to the field id. The whole identifier must match.
pub fn parse_field_reference(name: &str) -> Option<FieldId> {
    parse_numeric_suffix(name.strip_prefix(FIELD_PREFIX)?)
}

/// Parses `eventSpecific{id}` back to the constant id.
pub fn parse_constant_reference(name: &str) -> Option<ConstantId> {
    parse_numeric_suffix(name.strip_prefix(CONSTANT_PREFIX)?)
}

/// Parses `choice{id}selected` back to the option id.
pub fn parse_choice_reference(name: &str) -> Option<ChoiceId> {
    let inner = name.strip_prefix(CHOICE_PREFIX)?.strip_suffix(CHOICE_SUFFIX)?;
    parse_numeric_suffix(inner)
}

fn parse_numeric_suffix(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
