//! Cross-field exporter.

use fieldprice_core::field::CustomField;
use fieldprice_core::variable::{field_variable_name, FormulaVariable};

/// The variable through which other formulas read `field`'s computed price.
///
/// Only formula-bearing fields export anything. The export is numeric
/// regardless of the field's own kind.
pub fn exported_variable(field: &CustomField) -> Option<FormulaVariable> {
    field.has_formula().then(|| {
        FormulaVariable::numeric(field_variable_name(field.id), field.display_name())
    })
}
