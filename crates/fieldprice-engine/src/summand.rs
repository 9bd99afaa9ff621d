//! Priced summands and the per-entity price tag.

use std::collections::BTreeMap;

use fieldprice_core::answer::AnswerValue;
use fieldprice_core::entity::EntityRef;
use fieldprice_core::FieldId;
use serde::Serialize;

use crate::error::PricingError;

/// Anything that can carry a price tag.
pub trait PricedEntity {
    fn entity_ref(&self) -> EntityRef;

    /// The fixed price before any field contributions, if one is defined.
    fn base_price(&self) -> Option<f64>;
}

/// Why a summand exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SummandCause {
    BasePrice {
        entity: EntityRef,
    },
    CustomFieldValue {
        field_id: FieldId,
        field_name: String,
        /// Entity whose fillout supplied the answer.
        source: EntityRef,
        answer: AnswerValue,
    },
}

/// One priced contribution to an entity's total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summand {
    pub value: f64,
    pub impacts: EntityRef,
    pub cause: SummandCause,
}

impl Summand {
    /// The base price summand of `entity`. Fails when no base price is set.
    pub fn base_price(entity: &dyn PricedEntity) -> Result<Self, PricingError> {
        let impacts = entity.entity_ref();
        let value = entity
            .base_price()
            .ok_or(PricingError::BasePriceUndefined(impacts))?;
        Ok(Self {
            value,
            impacts,
            cause: SummandCause::BasePrice { entity: impacts },
        })
    }

    pub fn custom_field_value(
        value: f64,
        impacts: EntityRef,
        field_id: FieldId,
        field_name: impl Into<String>,
        source: EntityRef,
        answer: AnswerValue,
    ) -> Self {
        Self {
            value,
            impacts,
            cause: SummandCause::CustomFieldValue {
                field_id,
                field_name: field_name.into(),
                source,
                answer,
            },
        }
    }

    /// The causing field, for custom field summands.
    pub fn field_id(&self) -> Option<FieldId> {
        match &self.cause {
            SummandCause::CustomFieldValue { field_id, .. } => Some(*field_id),
            SummandCause::BasePrice { .. } => None,
        }
    }
}

/// The ordered summands making up one entity's price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityPriceTag {
    pub entity: EntityRef,
    summands: Vec<Summand>,
}

impl EntityPriceTag {
    pub fn new(entity: EntityRef) -> Self {
        Self {
            entity,
            summands: Vec::new(),
        }
    }

    pub fn push(&mut self, summand: Summand) {
        self.summands.push(summand);
    }

    pub fn summands(&self) -> &[Summand] {
        &self.summands
    }

    pub fn len(&self) -> usize {
        self.summands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summands.is_empty()
    }

    /// Sum of all summands, or `None` when there are none.
    pub fn price(&self) -> Option<f64> {
        if self.summands.is_empty() {
            return None;
        }
        Some(self.summands.iter().map(|s| s.value).sum())
    }

    /// Sum of the custom field summands per causing field.
    pub fn totals_by_field(&self) -> BTreeMap<FieldId, f64> {
        let mut totals = BTreeMap::new();
        for summand in &self.summands {
            if let Some(field) = summand.field_id() {
                *totals.entry(field).or_insert(0.0) += summand.value;
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Guest {
        id: u64,
        base: Option<f64>,
    }

    impl PricedEntity for Guest {
        fn entity_ref(&self) -> EntityRef {
            EntityRef::participant(self.id)
        }

        fn base_price(&self) -> Option<f64> {
            self.base
        }
    }

    fn field_summand(value: f64, field: FieldId) -> Summand {
        let p = EntityRef::participant(1);
        Summand::custom_field_value(value, p, field, "f", p, AnswerValue::Number(1.0))
    }

    #[test]
    fn empty_tag_has_no_price() {
        let tag = EntityPriceTag::new(EntityRef::participant(1));
        assert_eq!(tag.price(), None);
        assert!(tag.is_empty());
    }

    #[test]
    fn price_is_sum_of_summands() {
        let guest = Guest {
            id: 1,
            base: Some(100.0),
        };
        let mut tag = EntityPriceTag::new(guest.entity_ref());
        tag.push(Summand::base_price(&guest).unwrap());
        tag.push(field_summand(12.5, 3));
        tag.push(field_summand(-2.5, 3));
        tag.push(field_summand(4.0, 5));
        assert_eq!(tag.len(), 4);
        assert_eq!(tag.price(), Some(114.0));
        assert_eq!(
            tag.totals_by_field(),
            BTreeMap::from([(3, 10.0), (5, 4.0)])
        );
    }

    #[test]
    fn base_price_must_be_defined() {
        let guest = Guest { id: 2, base: None };
        assert_eq!(
            Summand::base_price(&guest),
            Err(PricingError::BasePriceUndefined(EntityRef::participant(2)))
        );
    }

    #[test]
    fn summand_json_shape() {
        let guest = Guest {
            id: 1,
            base: Some(5.0),
        };
        let json = serde_json::to_value(Summand::base_price(&guest).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "value": 5.0,
                "impacts": {"kind": "participant", "id": 1},
                "cause": {"type": "base_price", "entity": {"kind": "participant", "id": 1}}
            })
        );
    }
}
