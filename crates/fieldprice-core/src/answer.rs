//! Answers entered for custom fields during a fillout.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::entity::EntityRef;
use crate::{ChoiceId, FieldId};

/// The concrete answer to one custom field.
///
/// Serialised as `{"type": "number", "value": 3}`; `Empty` has no value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Selected option ids (one for single choice, any number for multi choice).
    Choices(Vec<ChoiceId>),
}

impl AnswerValue {
    /// Returns `true` if nothing meaningful was entered.
    ///
    /// Whitespace-only text and an empty selection count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Choices(ids) => ids.is_empty(),
            Self::Number(_) | Self::Date(_) | Self::DateTime(_) => false,
        }
    }

    /// Short name of the answer shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Choices(_) => "choices",
        }
    }
}

/// An answer together with the field it answers and the entity whose fillout
/// supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAnswer {
    pub field_id: FieldId,

    #[serde(default)]
    pub value: AnswerValue,

    /// May differ from the priced entity, e.g. a registration-level answer
    /// that applies to each of its participants.
    pub source: EntityRef,
}

/// Ordered answers visible while pricing one entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    answers: Vec<FieldAnswer>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an answer. Lookups return the first answer recorded for a field.
    pub fn push(&mut self, answer: FieldAnswer) {
        self.answers.push(answer);
    }

    pub fn with(mut self, field_id: FieldId, value: AnswerValue, source: EntityRef) -> Self {
        self.push(FieldAnswer {
            field_id,
            value,
            source,
        });
        self
    }

    /// Returns the first answer recorded for `field_id`.
    pub fn get(&self, field_id: FieldId) -> Option<&FieldAnswer> {
        self.answers.iter().find(|a| a.field_id == field_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldAnswer> {
        self.answers.iter()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl From<Vec<FieldAnswer>> for AnswerSheet {
    fn from(answers: Vec<FieldAnswer>) -> Self {
        Self { answers }
    }
}
