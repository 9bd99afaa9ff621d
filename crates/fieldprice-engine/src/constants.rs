//! Event constant registry.

use fieldprice_core::constant::EventConstant;
use fieldprice_core::variable::{constant_variable_name, FormulaVariable, VariableMap};
use fieldprice_core::EventId;

use crate::error::ConstantError;

/// Exposes every constant as a numeric `eventSpecific{id}` variable.
pub fn global_variables(constants: &[EventConstant]) -> VariableMap {
    constants
        .iter()
        .map(|c| {
            let var = FormulaVariable::numeric(constant_variable_name(c.id), c.description.clone());
            (var.name.clone(), var)
        })
        .collect()
}

/// Resolves the value of `constant` for `event_id`.
///
/// The per-event value wins. Without one, the default is used only when
/// `allow_default` is set.
pub fn resolve(
    constant: &EventConstant,
    event_id: EventId,
    allow_default: bool,
) -> Result<f64, ConstantError> {
    if let Some(value) = constant.value_for(event_id) {
        return Ok(value);
    }
    if !allow_default {
        return Err(ConstantError::NoValueSpecified {
            constant: constant.id,
            event: event_id,
        });
    }
    constant
        .default_value
        .ok_or(ConstantError::NoDefaultValueSpecified {
            constant: constant.id,
            event: event_id,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldprice_core::enums::VariableKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn constants_become_numeric_globals() {
        let vars = global_variables(&[
            EventConstant::new(1, "Early bird discount"),
            EventConstant::new(12, "Bus fare"),
        ]);
        let names: Vec<_> = vars.keys().cloned().collect();
        assert_eq!(names, vec!["eventSpecific1", "eventSpecific12"]);
        assert_eq!(vars["eventSpecific12"].kind, VariableKind::Numeric);
        assert_eq!(vars["eventSpecific12"].label, "Bus fare");
    }

    #[test]
    fn event_value_wins_over_default() {
        let c = EventConstant::new(1, "fee").with_default(5.0).with_value(7, 8.0);
        assert_eq!(resolve(&c, 7, true), Ok(8.0));
        assert_eq!(resolve(&c, 7, false), Ok(8.0));
    }

    #[test]
    fn default_only_when_requested() {
        let c = EventConstant::new(1, "fee").with_default(5.0);
        assert_eq!(resolve(&c, 7, true), Ok(5.0));
        assert_eq!(
            resolve(&c, 7, false),
            Err(ConstantError::NoValueSpecified { constant: 1, event: 7 })
        );
    }

    #[test]
    fn missing_default_is_reported() {
        let c = EventConstant::new(3, "fee").with_value(1, 2.0);
        assert_eq!(
            resolve(&c, 7, true),
            Err(ConstantError::NoDefaultValueSpecified { constant: 3, event: 7 })
        );
    }

    #[test]
    fn removed_value_falls_back() {
        let mut c = EventConstant::new(1, "fee").with_default(1.0).with_value(7, 9.0);
        assert!(c.remove_value(7));
        assert_eq!(resolve(&c, 7, true), Ok(1.0));
    }
}
