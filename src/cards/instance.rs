//! Card instances: runtime card state.
//!
//! A `CardInstance` is one physical card in a game. Its entity id is the
//! trigger source for everything the card registers, so detaching or
//! removing the card unregisters all of it in one call.
//!
//! Tokens have no catalog entry; they carry their definition inline.

use serde::{Deserialize, Serialize};

use super::definition::InlineCardDef;
use crate::core::entity::EntityId;
use crate::core::team::Team;

/// A card instance in a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Entity id (trigger source for the card's abilities).
    pub id: EntityId,

    /// Catalog key. Tokens carry their definition inline instead.
    pub slug: String,

    /// Owning team.
    pub team: Team,

    /// Player this card is attached to, if any.
    pub attached_to: Option<EntityId>,

    /// Face-down assets are hidden responses.
    pub face_down: bool,

    /// Inline definition for tokens.
    pub token: Option<InlineCardDef>,
}

impl CardInstance {
    /// Create a face-up catalog card.
    #[must_use]
    pub fn new(id: EntityId, slug: impl Into<String>, team: Team) -> Self {
        Self {
            id,
            slug: slug.into(),
            team,
            attached_to: None,
            face_down: false,
            token: None,
        }
    }

    /// Create a token from an inline definition.
    #[must_use]
    pub fn token(id: EntityId, team: Team, definition: InlineCardDef) -> Self {
        Self {
            id,
            slug: format!("token:{}", definition.name),
            team,
            attached_to: None,
            face_down: false,
            token: Some(definition),
        }
    }

    /// Set face-down (builder pattern).
    #[must_use]
    pub fn with_face_down(mut self, face_down: bool) -> Self {
        self.face_down = face_down;
        self
    }

    /// Whether the card is a token.
    #[must_use]
    pub fn is_token(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_card_is_face_up() {
        let card = CardInstance::new(EntityId(4), "full-court-press", Team::Away);
        assert!(!card.face_down);
        assert!(!card.is_token());
        assert!(card.attached_to.is_none());
    }

    #[test]
    fn test_token_slug() {
        let card = CardInstance::token(EntityId(5), Team::Home, InlineCardDef::new("Mascot"));
        assert!(card.is_token());
        assert_eq!(card.slug, "token:Mascot");
    }

    #[test]
    fn test_face_down_builder() {
        let card = CardInstance::new(EntityId(6), "trap", Team::Home).with_face_down(true);
        assert!(card.face_down);
    }
}
