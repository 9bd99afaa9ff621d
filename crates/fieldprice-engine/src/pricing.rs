//! Runtime pricing of one entity's answers.

use std::collections::{HashMap, HashSet};

use fieldprice_core::answer::{AnswerSheet, AnswerValue};
use fieldprice_core::variable::{parse_constant_reference, parse_field_reference};
use fieldprice_core::{EventId, FieldId};
use fieldprice_formula::eval::evaluate_number;
use fieldprice_formula::Value;
use tracing::debug;

use crate::catalog::local_bindings;
use crate::constants::resolve;
use crate::error::{ConstantError, PricingError};
use crate::resolver::DependencyResolver;
use crate::summand::{EntityPriceTag, PricedEntity, Summand};

type Result<T> = std::result::Result<T, PricingError>;

/// Runtime pricing switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingOptions {
    /// Fall back to an event constant's default when the event has no value.
    pub allow_constant_defaults: bool,
    /// Fail when the priced entity has no base price.
    pub require_base_price: bool,
}

impl Default for PricingOptions {
    fn default() -> Self {
        Self {
            allow_constant_defaults: true,
            require_base_price: false,
        }
    }
}

/// Evaluates formulas for one event.
pub struct PriceCalculator<'r> {
    resolver: &'r DependencyResolver,
    event_id: EventId,
    options: PricingOptions,
}

impl<'r> PriceCalculator<'r> {
    pub fn new(resolver: &'r DependencyResolver, event_id: EventId) -> Self {
        Self::with_options(resolver, event_id, PricingOptions::default())
    }

    pub fn with_options(
        resolver: &'r DependencyResolver,
        event_id: EventId,
        options: PricingOptions,
    ) -> Self {
        Self {
            resolver,
            event_id,
            options,
        }
    }

    /// Builds the price tag of `entity`.
    ///
    /// The base price comes first (when defined, or always when required),
    /// followed by one summand per answered formula-bearing field in sheet
    /// order. Only the first answer per field counts.
    pub fn price_tag(
        &self,
        entity: &dyn PricedEntity,
        answers: &AnswerSheet,
    ) -> Result<EntityPriceTag> {
        let impacts = entity.entity_ref();
        let mut tag = EntityPriceTag::new(impacts);
        if entity.base_price().is_some() || self.options.require_base_price {
            tag.push(Summand::base_price(entity)?);
        }

        let mut memo = HashMap::new();
        let mut seen = HashSet::new();
        for answer in answers.iter() {
            if !seen.insert(answer.field_id) {
                continue;
            }
            let field = self.resolver.field(answer.field_id)?;
            if !field.has_formula() {
                continue;
            }
            let Some(value) = self.value_of(field.id, answers, &mut memo)? else {
                continue;
            };
            tag.push(Summand::custom_field_value(
                value,
                impacts,
                field.id,
                field.display_name(),
                answer.source,
                answer.value.clone(),
            ));
        }

        debug!(
            entity = %impacts,
            summands = tag.len(),
            price = ?tag.price(),
            "priced entity"
        );
        Ok(tag)
    }

    /// Evaluates the formula of a single field, dependencies included.
    /// Returns `None` if the field has no formula.
    pub fn evaluate_field(&self, field: FieldId, answers: &AnswerSheet) -> Result<Option<f64>> {
        self.value_of(field, answers, &mut HashMap::new())
    }

    fn value_of(
        &self,
        field: FieldId,
        answers: &AnswerSheet,
        memo: &mut HashMap<FieldId, f64>,
    ) -> Result<Option<f64>> {
        if let Some(&value) = memo.get(&field) {
            return Ok(Some(value));
        }
        for dep in self.resolver.transitive_dependencies_for(field)? {
            if memo.contains_key(&dep) {
                continue;
            }
            if let Some(value) = self.compute(dep, answers, memo)? {
                memo.insert(dep, value);
            }
        }
        let value = self.compute(field, answers, memo)?;
        if let Some(value) = value {
            memo.insert(field, value);
        }
        Ok(value)
    }

    /// Evaluates one field's formula assuming its dependencies are in `memo`.
    /// Fields without a formula produce nothing.
    fn compute(
        &self,
        field_id: FieldId,
        answers: &AnswerSheet,
        memo: &HashMap<FieldId, f64>,
    ) -> Result<Option<f64>> {
        let field = self.resolver.field(field_id)?;
        let Some(expr) = self.resolver.formula(field)? else {
            return Ok(None);
        };

        let empty = AnswerValue::Empty;
        let answer = answers.get(field_id).map_or(&empty, |a| &a.value);
        let mut bindings = local_bindings(field, answer)?;

        for name in expr.variables() {
            if let Some(id) = parse_constant_reference(name) {
                let constant = self
                    .resolver
                    .constant(id)
                    .ok_or(ConstantError::UnknownConstant(id))?;
                let value = resolve(constant, self.event_id, self.options.allow_constant_defaults)?;
                bindings.insert(name.to_string(), Value::Number(value));
            } else if let Some(id) = parse_field_reference(name) {
                if let Some(&value) = memo.get(&id) {
                    bindings.insert(name.to_string(), Value::Number(value));
                }
            }
        }

        let value = evaluate_number(&expr, &bindings).map_err(|source| PricingError::Evaluation {
            field: field_id,
            source,
        })?;
        debug!(field = field_id, value, "evaluated field formula");
        Ok(Some(value))
    }
}
