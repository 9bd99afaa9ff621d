//! Custom fields ("attributes") and their choice options.

use serde::{Deserialize, Serialize};

use crate::enums::FieldKind;
use crate::{ChoiceId, FieldId};

/// One selectable option of a single or multi choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: ChoiceId,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

/// An organizer-defined question whose answer may affect the price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: FieldId,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Field kind (serialised as "kind" in JSON/TOML).
    pub kind: FieldKind,

    /// Optional price formula. Blank strings are treated as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,

    /// Ordered options; only meaningful for choice kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
}

impl CustomField {
    /// Returns the trimmed formula, or `None` if unset or blank.
    pub fn formula(&self) -> Option<&str> {
        self.formula
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }

    /// Returns `true` if the field carries a non-blank price formula.
    pub fn has_formula(&self) -> bool {
        self.formula().is_some()
    }

    /// Looks up one of this field's choice options.
    pub fn option(&self, id: ChoiceId) -> Option<&ChoiceOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// Human label: the name when set, otherwise `field {id}`.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("field {}", self.id)
        } else {
            self.name.clone()
        }
    }
}

/// Builder for [`CustomField`], mostly used by tests and snapshot tooling.
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    field: CustomField,
}

impl FieldBuilder {
    /// Creates a new builder for a field with the given id and kind.
    pub fn new(id: FieldId, kind: FieldKind) -> Self {
        Self {
            field: CustomField {
                id,
                name: String::new(),
                kind,
                formula: None,
                options: Vec::new(),
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.field.name = name.into();
        self
    }

    pub fn formula(mut self, formula: impl Into<String>) -> Self {
        self.field.formula = Some(formula.into());
        self
    }

    pub fn option(mut self, id: ChoiceId, label: impl Into<String>) -> Self {
        self.field.options.push(ChoiceOption {
            id,
            label: label.into(),
        });
        self
    }

    pub fn build(self) -> CustomField {
        self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_formula_counts_as_absent() {
        let field = FieldBuilder::new(1, FieldKind::Number).formula("   ").build();
        assert_eq!(field.formula(), None);
        assert!(!field.has_formula());
    }

    #[test]
    fn formula_is_trimmed() {
        let field = FieldBuilder::new(1, FieldKind::Number)
            .formula(" value * 2 ")
            .build();
        assert_eq!(field.formula(), Some("value * 2"));
    }

    #[test]
    fn builder_collects_options_in_order() {
        let field = FieldBuilder::new(4, FieldKind::MultiChoice)
            .name("Workshops")
            .option(5, "Morning")
            .option(6, "Evening")
            .build();
        let ids: Vec<_> = field.options.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![5, 6]);
        assert_eq!(field.option(6).map(|o| o.label.as_str()), Some("Evening"));
        assert_eq!(field.display_name(), "Workshops");
    }

    #[test]
    fn field_deserializes_from_json() {
        let json = r#"{"id": 3, "kind": "single_choice", "formula": "choice7selected ? 5 : 0",
                       "options": [{"id": 7, "label": "Yes"}]}"#;
        let field: CustomField = serde_json::from_str(json).unwrap();
        assert_eq!(field.kind, FieldKind::SingleChoice);
        assert_eq!(field.options.len(), 1);
        assert_eq!(field.display_name(), "field 3");
    }
}
