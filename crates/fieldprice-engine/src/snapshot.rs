//! Snapshot and pricing request files (TOML and JSON).

use std::path::Path;
use std::sync::Arc;

use fieldprice_core::answer::AnswerSheet;
use fieldprice_core::constant::EventConstant;
use fieldprice_core::entity::EntityRef;
use fieldprice_core::field::CustomField;
use fieldprice_core::EventId;
use fieldprice_formula::FormulaCache;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SnapshotError;
use crate::resolver::DependencyResolver;
use crate::summand::PricedEntity;

/// The fields and constants of one event, as read from a file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub event_id: EventId,

    #[serde(default)]
    pub fields: Vec<CustomField>,

    #[serde(default)]
    pub constants: Vec<EventConstant>,
}

impl EventSnapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let snapshot: Self = load(path)?;
        debug!(
            path = %path.display(),
            event = snapshot.event_id,
            fields = snapshot.fields.len(),
            constants = snapshot.constants.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    pub fn resolver(&self) -> DependencyResolver {
        DependencyResolver::new(self.fields.iter().cloned(), self.constants.clone())
    }

    pub fn resolver_with_cache(&self, cache: Arc<FormulaCache>) -> DependencyResolver {
        DependencyResolver::with_cache(self.fields.iter().cloned(), self.constants.clone(), cache)
    }
}

/// One entity to price together with the answers visible to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub entity: EntityRef,

    #[serde(default, alias = "basePrice", skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,

    #[serde(default)]
    pub answers: AnswerSheet,
}

impl PricingRequest {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        load(path)
    }
}

impl PricedEntity for PricingRequest {
    fn entity_ref(&self) -> EntityRef {
        self.entity
    }

    fn base_price(&self) -> Option<f64> {
        self.base_price
    }
}

/// Parses a document from a TOML string.
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T, SnapshotError> {
    toml::from_str(content).map_err(|e| SnapshotError::Parse(e.to_string()))
}

/// Parses a document from a JSON string.
pub fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, SnapshotError> {
    serde_json::from_str(content).map_err(|e| SnapshotError::Parse(e.to_string()))
}

/// Loads a document, choosing the format by extension. Unknown extensions
/// are tried as JSON first, then TOML.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, SnapshotError> {
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_toml(&content),
        Some("json") => parse_json(&content),
        _ => parse_json(&content).or_else(|_| parse_toml(&content)),
    }
}
