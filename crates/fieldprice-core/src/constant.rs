//! Event constants ("event-specific variables").
//!
//! An event constant is a named number the organizer defines once and then
//! overrides per event. Formulas see it as `eventSpecific{id}`.

use serde::{Deserialize, Serialize};

use crate::{ConstantId, EventId};

/// The value of an event constant for one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventConstantValue {
    pub event_id: EventId,
    pub value: f64,
}

/// An organizer-defined numeric constant with optional per-event values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConstant {
    pub id: ConstantId,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,

    /// At most one entry per event.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<EventConstantValue>,
}

impl EventConstant {
    pub fn new(id: ConstantId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            default_value: None,
            values: Vec::new(),
        }
    }

    pub fn with_default(mut self, default: f64) -> Self {
        self.default_value = Some(default);
        self
    }

    pub fn with_value(mut self, event_id: EventId, value: f64) -> Self {
        self.set_value(event_id, value);
        self
    }

    /// Returns the value stored for `event_id`, ignoring the default.
    pub fn value_for(&self, event_id: EventId) -> Option<f64> {
        self.values
            .iter()
            .find(|v| v.event_id == event_id)
            .map(|v| v.value)
    }

    /// Sets the value for `event_id`, replacing an existing one.
    pub fn set_value(&mut self, event_id: EventId, value: f64) {
        match self.values.iter_mut().find(|v| v.event_id == event_id) {
            Some(existing) => existing.value = value,
            None => self.values.push(EventConstantValue { event_id, value }),
        }
    }

    /// Removes the value for `event_id`. Returns `true` if one was removed.
    pub fn remove_value(&mut self, event_id: EventId) -> bool {
        let before = self.values.len();
        self.values.retain(|v| v.event_id != event_id);
        self.values.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_value_keeps_one_entry_per_event() {
        let mut c = EventConstant::new(1, "Meal price");
        c.set_value(10, 4.5);
        c.set_value(10, 5.0);
        c.set_value(11, 6.0);
        assert_eq!(c.values.len(), 2);
        assert_eq!(c.value_for(10), Some(5.0));
        assert_eq!(c.value_for(11), Some(6.0));
    }

    #[test]
    fn remove_value_reports_removal() {
        let mut c = EventConstant::new(1, "Meal price").with_value(10, 4.5);
        assert!(c.remove_value(10));
        assert!(!c.remove_value(10));
        assert_eq!(c.value_for(10), None);
    }

    #[test]
    fn value_for_ignores_default() {
        let c = EventConstant::new(2, "Fee").with_default(3.0);
        assert_eq!(c.value_for(1), None);
        assert_eq!(c.default_value, Some(3.0));
    }
}
