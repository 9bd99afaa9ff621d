//! Static validation of candidate formulas.
//!
//! Checks run in a fixed order: syntax, unknown identifiers, static types
//! (every branch, numeric result), the numeric and zero probes, forbidden
//! `value` usage, and finally cycles in the dependency graph with the
//! candidate substituted in.

use fieldprice_core::variable::{VariableMap, VALUE};
use fieldprice_core::FieldId;
use fieldprice_formula::typing::infer_number;
use fieldprice_formula::{Bindings, FormulaError, Value};
use tracing::debug;

use crate::error::{ResolveError, ValidationError};
use crate::evaluator::{test_values, type_in_scope};
use crate::resolver::DependencyResolver;

/// Probe values and reporting mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationOptions {
    /// Bound to `value` while checking that the result is a number.
    pub numeric_probe: f64,
    /// Bound to `value` while checking for division by zero.
    pub zero_probe: f64,
    /// Collect every error in snapshot reports instead of the first.
    pub collect_all: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            numeric_probe: 10.0,
            zero_probe: 0.0,
            collect_all: false,
        }
    }
}

/// Validation outcome of one field's saved formula.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldReport {
    pub field_id: FieldId,
    pub errors: Vec<ValidationError>,
}

impl FieldReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates formulas against the scopes and graph of one resolver.
pub struct FormulaValidator<'r> {
    resolver: &'r DependencyResolver,
    options: ValidationOptions,
}

struct Collected {
    errors: Vec<ValidationError>,
    stop_at_first: bool,
}

impl Collected {
    /// Records an error; returns `true` when checking should stop.
    fn push(&mut self, err: ValidationError) -> bool {
        self.errors.push(err);
        self.stop_at_first
    }
}

impl<'r> FormulaValidator<'r> {
    pub fn new(resolver: &'r DependencyResolver) -> Self {
        Self::with_options(resolver, ValidationOptions::default())
    }

    pub fn with_options(resolver: &'r DependencyResolver, options: ValidationOptions) -> Self {
        Self { resolver, options }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Checks `candidate` as the new formula of `field`; returns the first
    /// problem found.
    pub fn validate(&self, field: FieldId, candidate: &str) -> Result<(), ValidationError> {
        match self.run(field, candidate, true).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Like [`validate`](Self::validate) but keeps checking after a failure.
    /// A syntax error still ends the run.
    pub fn validate_all(&self, field: FieldId, candidate: &str) -> Vec<ValidationError> {
        self.run(field, candidate, false)
    }

    /// Validates the formula currently saved on `field`. Fields without a
    /// formula are always valid.
    pub fn validate_field(&self, field: FieldId) -> Result<(), ValidationError> {
        let target = self.resolver.field(field).map_err(ValidationError::from)?;
        match target.formula() {
            Some(formula) => self.validate(field, formula),
            None => Ok(()),
        }
    }

    /// Validates every formula-bearing field, in id order.
    pub fn validate_snapshot(&self) -> Vec<FieldReport> {
        self.resolver
            .fields()
            .filter_map(|field| {
                let formula = field.formula()?;
                Some(FieldReport {
                    field_id: field.id,
                    errors: self.run(field.id, formula, !self.options.collect_all),
                })
            })
            .collect()
    }

    /// The bindings used by the numeric-result check: test values for every
    /// usable variable plus `value` at the numeric probe.
    pub fn numeric_probe_bindings(&self, field: FieldId) -> Result<Bindings, ResolveError> {
        let usable = self.resolver.usable_variables_for(field)?;
        Ok(self.probe_bindings(&usable, self.options.numeric_probe))
    }

    fn probe_bindings(&self, usable: &VariableMap, value: f64) -> Bindings {
        let mut bindings = test_values(usable.values());
        bindings.insert(VALUE.to_string(), Value::Number(value));
        bindings
    }

    fn run(&self, field: FieldId, candidate: &str, stop_at_first: bool) -> Vec<ValidationError> {
        let mut collected = Collected {
            errors: Vec::new(),
            stop_at_first,
        };
        self.check(field, candidate, &mut collected);
        if !collected.errors.is_empty() {
            debug!(
                field,
                formula = candidate,
                errors = collected.errors.len(),
                "formula rejected"
            );
        }
        collected.errors
    }

    fn check(&self, field_id: FieldId, candidate: &str, out: &mut Collected) {
        let field = match self.resolver.field(field_id) {
            Ok(field) => field,
            Err(err) => {
                out.push(err.into());
                return;
            }
        };

        let expr = match self.resolver.cache().compile(candidate) {
            Ok(expr) => expr,
            Err(FormulaError::Syntax { position, message }) => {
                out.push(ValidationError::Syntax { position, message });
                return;
            }
            Err(other) => {
                out.push(ValidationError::Evaluation(other));
                return;
            }
        };

        let mut usable = match crate::catalog::local_variables(field) {
            Ok(local) => local,
            Err(err) => {
                if out.push(ValidationError::Resolve(err.into())) {
                    return;
                }
                VariableMap::new()
            }
        };
        usable.extend(self.resolver.imported_variables_for(field_id));

        let mut all_known = true;
        for name in expr.variables() {
            if name != VALUE && !usable.contains_key(name) {
                all_known = false;
                if out.push(ValidationError::UnknownVariable(name.to_string())) {
                    return;
                }
            }
        }

        let mut well_typed = all_known;
        if all_known {
            if let Err(err) = infer_number(&expr, &|name: &str| type_in_scope(&usable, name)) {
                well_typed = false;
                if out.push(formula_error(err, self.options.numeric_probe)) {
                    return;
                }
            }
        }

        if well_typed {
            let numeric = self.options.numeric_probe;
            let mut zero_reported = false;
            let result = self
                .resolver
                .cache()
                .evaluate(candidate, &self.probe_bindings(&usable, numeric));
            if let Err(err) = result {
                zero_reported = matches!(err, FormulaError::DivisionByZero);
                if out.push(formula_error(err, numeric)) {
                    return;
                }
            }

            if !zero_reported {
                let zero = self.options.zero_probe;
                let result = self
                    .resolver
                    .cache()
                    .evaluate(candidate, &self.probe_bindings(&usable, zero));
                if let Err(FormulaError::DivisionByZero) = result {
                    if out.push(ValidationError::DivisionByZeroRisk { probe: zero }) {
                        return;
                    }
                }
            }
        }

        if !field.kind.permits_value() && expr.references(VALUE) {
            let err = ValidationError::ForbiddenVariableUsage {
                variable: VALUE.to_string(),
                kind: field.kind.clone(),
            };
            if out.push(err) {
                return;
            }
        }

        let graph = match self.resolver.with_formula(field_id, candidate) {
            Ok(graph) => graph,
            Err(err) => {
                out.push(err.into());
                return;
            }
        };
        match graph.dependencies_for(field_id) {
            Ok(_) => {}
            // Already reported as an unknown variable.
            Err(ResolveError::DanglingReference { field, .. }) if field == field_id => {}
            Err(err) => {
                out.push(err.into());
            }
        }
    }
}

/// Maps a formula failure to a validation error. `probe` is reported for
/// division by zero, which only evaluation can raise.
fn formula_error(err: FormulaError, probe: f64) -> ValidationError {
    match err {
        FormulaError::DivisionByZero => ValidationError::DivisionByZeroRisk { probe },
        FormulaError::NonNumericResult(found) => ValidationError::NonNumericResult(found),
        err @ FormulaError::TypeMismatch { .. } => ValidationError::TypeMismatch(err.to_string()),
        FormulaError::Syntax { position, message } => ValidationError::Syntax { position, message },
        other => ValidationError::Evaluation(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldprice_core::constant::EventConstant;
    use fieldprice_core::enums::FieldKind;
    use fieldprice_core::field::{CustomField, FieldBuilder};
    use pretty_assertions::assert_eq;

    fn resolver(fields: Vec<CustomField>) -> DependencyResolver {
        DependencyResolver::new(fields, vec![EventConstant::new(7, "fee").with_default(3.0)])
    }

    fn number(id: FieldId) -> CustomField {
        FieldBuilder::new(id, FieldKind::Number).build()
    }

    #[test]
    fn accepts_plain_arithmetic() {
        let r = resolver(vec![number(1)]);
        let v = FormulaValidator::new(&r);
        assert_eq!(v.validate(1, "value * 2 + eventSpecific7"), Ok(()));
    }

    #[test]
    fn syntax_error_reports_offset() {
        let r = resolver(vec![number(1)]);
        let v = FormulaValidator::new(&r);
        assert_eq!(
            v.validate(1, "value *"),
            Err(ValidationError::Syntax {
                position: 7,
                message: "unexpected end of formula".into(),
            })
        );
    }

    #[test]
    fn boolean_result_is_rejected() {
        let r = resolver(vec![number(1)]);
        let v = FormulaValidator::new(&r);
        assert_eq!(
            v.validate(1, "value > 3"),
            Err(ValidationError::NonNumericResult("boolean"))
        );
    }

    #[test]
    fn division_by_value_is_risky() {
        let r = resolver(vec![number(1)]);
        let v = FormulaValidator::new(&r);
        assert_eq!(
            v.validate(1, "10 / value"),
            Err(ValidationError::DivisionByZeroRisk { probe: 0.0 })
        );
        assert_eq!(v.validate(1, "10 / (value + 1)"), Ok(()));
    }

    #[test]
    fn division_by_zero_at_numeric_probe() {
        let r = resolver(vec![number(1)]);
        let v = FormulaValidator::new(&r);
        assert_eq!(
            v.validate(1, "1 / (value - 10)"),
            Err(ValidationError::DivisionByZeroRisk { probe: 10.0 })
        );
    }

    #[test]
    fn multi_choice_must_not_use_value() {
        let field = FieldBuilder::new(4, FieldKind::MultiChoice)
            .option(5, "a")
            .build();
        let r = resolver(vec![field]);
        let v = FormulaValidator::new(&r);
        let err = v.validate(4, "value * 2").unwrap_err();
        assert_eq!(
            err,
            ValidationError::ForbiddenVariableUsage {
                variable: "value".into(),
                kind: FieldKind::MultiChoice,
            }
        );
        assert!(err.to_string().contains("multi_choice"));
        assert_eq!(v.validate(4, "choice5selected ? 12 : 0"), Ok(()));
    }

    #[test]
    fn unknown_identifier() {
        let r = resolver(vec![number(1)]);
        let v = FormulaValidator::new(&r);
        assert_eq!(
            v.validate(1, "value + discount"),
            Err(ValidationError::UnknownVariable("discount".into()))
        );
    }

    #[test]
    fn field_without_formula_cannot_be_referenced() {
        let r = resolver(vec![number(1), number(2)]);
        let v = FormulaValidator::new(&r);
        assert_eq!(
            v.validate(1, "field2 * 2"),
            Err(ValidationError::UnknownVariable("field2".into()))
        );
    }

    #[test]
    fn arithmetic_on_boolean_is_a_type_error() {
        let r = resolver(vec![number(1)]);
        let v = FormulaValidator::new(&r);
        assert!(matches!(
            v.validate(1, "valueNotEmpty * 2"),
            Err(ValidationError::TypeMismatch(_))
        ));
    }

    #[test]
    fn type_errors_in_untaken_branches_are_rejected() {
        let r = resolver(vec![number(1)]);
        let v = FormulaValidator::new(&r);
        assert_eq!(
            v.validate(1, "valueNotEmpty ? value : valueNotEmpty * 2"),
            Err(ValidationError::TypeMismatch(
                "operator '*' expects a number, got boolean".into()
            ))
        );
        assert_eq!(
            v.validate(1, "valueNotEmpty ? value : valueNotEmpty"),
            Err(ValidationError::TypeMismatch(
                "operator '?:' expects a number in both branches, got boolean".into()
            ))
        );
        assert_eq!(v.validate(1, "valueNotEmpty ? value : 2 * value"), Ok(()));
    }

    #[test]
    fn type_error_is_reported_once_when_collecting() {
        let r = resolver(vec![number(1)]);
        let v = FormulaValidator::new(&r);
        assert_eq!(
            v.validate_all(1, "(value > 1) + 2"),
            vec![ValidationError::TypeMismatch(
                "operator '+' expects a number, got boolean".into()
            )]
        );
    }

    #[test]
    fn candidate_closing_a_cycle_is_rejected() {
        let r = resolver(vec![
            FieldBuilder::new(2, FieldKind::Number).formula("field3 * 2").build(),
            FieldBuilder::new(3, FieldKind::Number).formula("value").build(),
        ]);
        let v = FormulaValidator::new(&r);
        let err = v.validate(3, "field2 + 1").unwrap_err();
        assert_eq!(err, ValidationError::CircularDependency { a: 3, b: 2 });
        assert_eq!(
            err.to_string(),
            "Circular dependency: 3 depends on 2 while 2 depends on 3"
        );
        assert_eq!(v.validate(3, "value + 1"), Ok(()));
    }

    #[test]
    fn validate_all_collects_independent_errors() {
        let field = FieldBuilder::new(4, FieldKind::MultiChoice)
            .option(5, "a")
            .build();
        let r = resolver(vec![field]);
        let v = FormulaValidator::new(&r);
        assert_eq!(
            v.validate_all(4, "bonus + value"),
            vec![
                ValidationError::UnknownVariable("bonus".into()),
                ValidationError::ForbiddenVariableUsage {
                    variable: "value".into(),
                    kind: FieldKind::MultiChoice,
                },
            ]
        );
        assert_eq!(v.validate_all(4, "(").len(), 1);
    }

    #[test]
    fn unsupported_kind_is_reported() {
        let field = FieldBuilder::new(9, FieldKind::from("signature")).build();
        let r = resolver(vec![field]);
        let v = FormulaValidator::new(&r);
        assert!(matches!(
            v.validate(9, "5"),
            Err(ValidationError::Resolve(ResolveError::Catalog(_)))
        ));
    }

    #[test]
    fn probes_come_from_options() {
        let r = resolver(vec![number(1)]);
        let options = ValidationOptions {
            numeric_probe: 10.0,
            zero_probe: 5.0,
            collect_all: false,
        };
        let v = FormulaValidator::with_options(&r, options);
        assert_eq!(
            v.validate(1, "1 / (value - 5)"),
            Err(ValidationError::DivisionByZeroRisk { probe: 5.0 })
        );
        assert_eq!(v.validate(1, "10 / value"), Ok(()));
    }

    #[test]
    fn validated_formula_evaluates_with_probe_bindings() {
        let r = resolver(vec![
            number(1),
            FieldBuilder::new(2, FieldKind::SingleChoice)
                .option(5, "a")
                .formula("choice5selected ? 4 : 0")
                .build(),
        ]);
        let v = FormulaValidator::new(&r);
        for formula in [
            "value * 2",
            "field2 + eventSpecific7",
            "valueNotEmpty ? value / 2 : 0",
            "10 / (value + 1)",
        ] {
            assert_eq!(v.validate(1, formula), Ok(()), "{formula}");
            let bindings = v.numeric_probe_bindings(1).unwrap();
            assert!(r.cache().evaluate(formula, &bindings).is_ok(), "{formula}");
        }
    }

    #[test]
    fn snapshot_report_covers_formula_fields() {
        let r = resolver(vec![
            FieldBuilder::new(1, FieldKind::Number).formula("value * 2").build(),
            number(2),
            FieldBuilder::new(3, FieldKind::Number).formula("10 / value").build(),
        ]);
        let v = FormulaValidator::new(&r);
        let reports = v.validate_snapshot();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].is_ok());
        assert_eq!(reports[1].field_id, 3);
        assert_eq!(
            reports[1].errors,
            vec![ValidationError::DivisionByZeroRisk { probe: 0.0 }]
        );
        assert_eq!(v.validate_field(2), Ok(()));
        assert!(v.validate_field(3).is_err());
    }
}
