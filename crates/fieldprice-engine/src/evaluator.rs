//! Test values and static types used by validation.

use fieldprice_core::enums::VariableKind;
use fieldprice_core::variable::{FormulaVariable, VariableMap, VALUE};
use fieldprice_formula::{Bindings, Value, ValueType};

/// Binds every variable to a harmless test value: `true` for booleans and
/// `1` for numbers.
pub fn test_values<'a, I>(variables: I) -> Bindings
where
    I: IntoIterator<Item = &'a FormulaVariable>,
{
    variables
        .into_iter()
        .map(|var| {
            let value = match var.kind {
                VariableKind::Boolean => Value::Bool(true),
                VariableKind::Numeric => Value::Number(1.0),
            };
            (var.name.clone(), value)
        })
        .collect()
}

/// The formula type of a catalog variable kind.
pub fn value_type(kind: VariableKind) -> ValueType {
    match kind {
        VariableKind::Numeric => ValueType::Number,
        VariableKind::Boolean => ValueType::Boolean,
    }
}

/// Static type of `name` in a scope. The implicit `value` is always a number.
pub fn type_in_scope(usable: &VariableMap, name: &str) -> Option<ValueType> {
    if name == VALUE {
        return Some(ValueType::Number);
    }
    usable.get(name).map(|var| value_type(var.kind))
}
