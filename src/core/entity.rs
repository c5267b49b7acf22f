//! Entity identification.
//!
//! Every game object that can own triggers (court players, attached ability
//! cards, in-play assets, tokens) has a unique `EntityId`. Trigger sources are
//! always entity ids, which is what makes bulk unregistration by source work.
//!
//! ```
//! use court_engine::core::EntityId;
//!
//! let star = EntityId::new(7);
//! assert_eq!(star.raw(), 7);
//! assert_eq!(format!("{}", star), "Entity(7)");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for any game entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create a new entity ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
