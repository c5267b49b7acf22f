//! Effect catalog: definition lookup by slug.
//!
//! The lifecycle manager reads content only through the [`EffectCatalog`]
//! capability. [`CardCatalog`] is the in-memory implementation, loaded from
//! code or JSON.
//!
//! ## Example
//!
//! ```
//! use court_engine::cards::{AbilityDef, CardCatalog, CardDef, EffectCatalog, TriggerSpec};
//! use court_engine::effects::Effect;
//!
//! let mut catalog = CardCatalog::new();
//! catalog.register(CardDef::new("guard", "Guard").with_ability(AbilityDef::triggered(
//!     "Hustle",
//!     TriggerSpec::new("standard-action.after", Effect::Noop),
//! )));
//!
//! assert_eq!(catalog.abilities("guard").len(), 1);
//! assert!(catalog.abilities("center").is_empty());
//! ```

use rustc_hash::FxHashMap;

use super::definition::{AbilityDef, AssetPower, CardDef, InlineCardDef};
use crate::error::{EngineError, Result};

/// Read-only access to card content.
pub trait EffectCatalog {
    /// Abilities of the player or card with this slug. Empty if unknown.
    fn abilities(&self, slug: &str) -> Vec<AbilityDef>;

    /// Asset power of the card with this slug, if it has one.
    fn asset_power(&self, slug: &str) -> Option<AssetPower>;

    /// Abilities carried by an inline (token) definition.
    fn abilities_from_card(&self, definition: &InlineCardDef) -> Vec<AbilityDef> {
        definition.abilities.clone()
    }
}

/// In-memory catalog of card definitions.
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: FxHashMap<String, CardDef>,
}

impl CardCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON array of card definitions.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] on malformed JSON or duplicate slugs.
    pub fn from_json(json: &str) -> Result<Self> {
        let defs: Vec<CardDef> =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        let mut catalog = Self::new();
        for def in defs {
            if catalog.contains(&def.slug) {
                return Err(EngineError::Config(format!(
                    "duplicate card slug: {}",
                    def.slug
                )));
            }
            catalog.register(def);
        }
        Ok(catalog)
    }

    /// Register a definition, replacing any entry with the same slug.
    pub fn register(&mut self, def: CardDef) {
        self.cards.insert(def.slug.clone(), def);
    }

    /// Get a definition by slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&CardDef> {
        self.cards.get(slug)
    }

    /// Check if a slug is registered.
    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.cards.contains_key(slug)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl EffectCatalog for CardCatalog {
    fn abilities(&self, slug: &str) -> Vec<AbilityDef> {
        self.get(slug).map(|d| d.abilities.clone()).unwrap_or_default()
    }

    fn asset_power(&self, slug: &str) -> Option<AssetPower> {
        self.get(slug).and_then(|d| d.power.clone())
    }
}
