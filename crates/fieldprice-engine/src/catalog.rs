//! Variable catalog: the names a field's own formula can read.
//!
//! [`local_variables`] describes the scope statically; [`local_bindings`]
//! fills the same names (plus the implicit `value`) from a concrete answer.

use fieldprice_core::answer::AnswerValue;
use fieldprice_core::enums::FieldKind;
use fieldprice_core::field::CustomField;
use fieldprice_core::variable::{
    choice_variable_name, FormulaVariable, VariableMap, CHOICES_SELECTED_COUNT, VALUE,
    VALUE_NOT_EMPTY,
};
use fieldprice_core::ChoiceId;
use fieldprice_formula::{Bindings, Value};

use crate::error::{CatalogError, PricingError};

/// Returns the local variables of `field`, keyed by name.
pub fn local_variables(field: &CustomField) -> Result<VariableMap, CatalogError> {
    let mut vars = VariableMap::new();
    let mut add = |var: FormulaVariable| {
        vars.insert(var.name.clone(), var);
    };

    match &field.kind {
        FieldKind::Number => {
            add(FormulaVariable::numeric(VALUE, "answer"));
            add(FormulaVariable::boolean(VALUE_NOT_EMPTY, "answer given"));
        }
        FieldKind::Text | FieldKind::Textarea | FieldKind::Date | FieldKind::DateTime => {
            add(FormulaVariable::boolean(VALUE_NOT_EMPTY, "answer given"));
        }
        FieldKind::SingleChoice | FieldKind::MultiChoice => {
            for option in &field.options {
                add(FormulaVariable::boolean(
                    choice_variable_name(option.id),
                    option.label.clone(),
                ));
            }
            add(FormulaVariable::numeric(
                CHOICES_SELECTED_COUNT,
                "selected options",
            ));
        }
        FieldKind::Other(_) => {
            return Err(CatalogError::UnsupportedFieldKind {
                field: field.id,
                kind: field.kind.clone(),
            });
        }
    }

    Ok(vars)
}

/// Computes the runtime values of `field`'s local variables for one answer.
///
/// Besides the catalog names this binds `value` wherever the field kind
/// permits it: the number for Number fields (0 when empty), the selected
/// option id for single choice fields (0 when none), the trimmed text parsed
/// as a number for text kinds (left unbound when it is not numeric) and the
/// Unix timestamp in seconds for date kinds.
pub fn local_bindings(field: &CustomField, answer: &AnswerValue) -> Result<Bindings, PricingError> {
    let mut bindings = Bindings::new();
    let filled = !answer.is_empty();

    match (&field.kind, answer) {
        (FieldKind::Other(_), _) => {
            return Err(CatalogError::UnsupportedFieldKind {
                field: field.id,
                kind: field.kind.clone(),
            }
            .into());
        }
        (FieldKind::Number, AnswerValue::Empty) => {
            bindings.insert(VALUE.into(), Value::Number(0.0));
        }
        (FieldKind::Number, AnswerValue::Number(n)) => {
            bindings.insert(VALUE.into(), Value::Number(*n));
        }
        (FieldKind::Text | FieldKind::Textarea, AnswerValue::Empty) => {
            bindings.insert(VALUE.into(), Value::Number(0.0));
        }
        (FieldKind::Text | FieldKind::Textarea, AnswerValue::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                bindings.insert(VALUE.into(), Value::Number(0.0));
            } else if let Ok(n) = text.parse::<f64>() {
                if n.is_finite() {
                    bindings.insert(VALUE.into(), Value::Number(n));
                }
            }
        }
        (FieldKind::Date | FieldKind::DateTime, AnswerValue::Empty) => {
            bindings.insert(VALUE.into(), Value::Number(0.0));
        }
        (FieldKind::Date, AnswerValue::Date(date)) => {
            let seconds = date
                .and_hms_opt(0, 0, 0)
                .map_or(0, |midnight| midnight.and_utc().timestamp());
            bindings.insert(VALUE.into(), Value::Number(seconds as f64));
        }
        (FieldKind::DateTime, AnswerValue::DateTime(at)) => {
            bindings.insert(VALUE.into(), Value::Number(at.and_utc().timestamp() as f64));
        }
        (FieldKind::SingleChoice | FieldKind::MultiChoice, AnswerValue::Empty) => {
            bind_choices(field, &[], &mut bindings)?;
        }
        (FieldKind::SingleChoice | FieldKind::MultiChoice, AnswerValue::Choices(ids)) => {
            bind_choices(field, ids, &mut bindings)?;
        }
        _ => return Err(mismatch(field, answer)),
    }

    if !field.kind.is_choice() {
        bindings.insert(VALUE_NOT_EMPTY.into(), Value::Bool(filled));
    }
    Ok(bindings)
}

fn bind_choices(
    field: &CustomField,
    ids: &[ChoiceId],
    bindings: &mut Bindings,
) -> Result<(), PricingError> {
    let mut selected: Vec<ChoiceId> = Vec::with_capacity(ids.len());
    for &id in ids {
        if field.option(id).is_none() {
            return Err(PricingError::UnknownChoice {
                field: field.id,
                choice: id,
            });
        }
        if !selected.contains(&id) {
            selected.push(id);
        }
    }

    if field.kind == FieldKind::SingleChoice {
        if selected.len() > 1 {
            return Err(PricingError::TooManyChoices {
                field: field.id,
                count: selected.len(),
            });
        }
        let chosen = selected.first().map_or(0.0, |&id| id as f64);
        bindings.insert(VALUE.into(), Value::Number(chosen));
    }

    for option in &field.options {
        bindings.insert(
            choice_variable_name(option.id),
            Value::Bool(selected.contains(&option.id)),
        );
    }
    bindings.insert(
        CHOICES_SELECTED_COUNT.into(),
        Value::Number(selected.len() as f64),
    );
    Ok(())
}

fn mismatch(field: &CustomField, answer: &AnswerValue) -> PricingError {
    PricingError::AnswerKindMismatch {
        field: field.id,
        kind: field.kind.clone(),
        shape: answer.shape(),
    }
}
