//! References to priced entities (participants, registrations, staff).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::EntityKind;

/// A structured reference to a priced entity.
///
/// Rendered as `{kind}#{id}`, e.g. `participant#12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: u64,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: u64) -> Self {
        Self { kind, id }
    }

    pub fn participant(id: u64) -> Self {
        Self::new(EntityKind::Participant, id)
    }

    pub fn registration(id: u64) -> Self {
        Self::new(EntityKind::Registration, id)
    }

    pub fn staff(id: u64) -> Self {
        Self::new(EntityKind::Staff, id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}
