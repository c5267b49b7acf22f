//! Player and game actions.
//!
//! Actions are what the driver resolves. Each variant names the entities it
//! touches; effects of the action are expressed as request events and terminal
//! effects, never applied directly by the caller.
//!
//! ```
//! use court_engine::core::{GameAction, EntityId, Team};
//!
//! let shot = GameAction::Shoot { shooter: EntityId(3), distance: 6 };
//! assert_eq!(shot.kind(), "shoot");
//!
//! let end = GameAction::EndPhase { team: Team::Home };
//! assert!(end.runs_effects());
//! ```

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::team::Team;
use crate::cards::InlineCardDef;

/// A game action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Attempt a shot with a court player.
    Shoot {
        /// The shooting player.
        shooter: EntityId,
        /// Distance from the basket in court squares.
        distance: i64,
    },

    /// End the current phase.
    EndPhase {
        /// Team requesting the transition.
        team: Team,
    },

    /// Swap a court player for a bench player.
    Substitute {
        /// Team making the swap.
        team: Team,
        /// Player leaving the court.
        out: EntityId,
        /// Player entering from the bench.
        incoming: EntityId,
    },

    /// Attach a card from hand to a court player.
    AttachCard {
        /// Card being attached.
        card: EntityId,
        /// Player receiving it.
        player: EntityId,
    },

    /// Detach a card from its player.
    DetachCard {
        /// Card being detached.
        card: EntityId,
    },

    /// Play a card from hand. Asset cards stay in play; others go to discard.
    PlayCard {
        /// Card being played.
        card: EntityId,
        /// Play the asset face down.
        face_down: bool,
    },

    /// Create a token asset from an inline definition.
    CreateToken {
        /// Owning team.
        team: Team,
        /// Token definition.
        definition: InlineCardDef,
    },

    /// Take an asset out of play.
    RemoveAsset {
        /// Asset being removed.
        card: EntityId,
    },
}

impl GameAction {
    /// Short tag, used in event payloads and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            GameAction::Shoot { .. } => "shoot",
            GameAction::EndPhase { .. } => "end-phase",
            GameAction::Substitute { .. } => "substitute",
            GameAction::AttachCard { .. } => "attach-card",
            GameAction::DetachCard { .. } => "detach-card",
            GameAction::PlayCard { .. } => "play-card",
            GameAction::CreateToken { .. } => "create-token",
            GameAction::RemoveAsset { .. } => "remove-asset",
        }
    }

    /// Whether resolving the action fires events and runs effects, so its
    /// consequences can only be known by diffing states.
    #[must_use]
    pub fn runs_effects(&self) -> bool {
        matches!(self, GameAction::Shoot { .. } | GameAction::EndPhase { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        let actions = [
            GameAction::Shoot { shooter: EntityId(1), distance: 2 },
            GameAction::EndPhase { team: Team::Away },
            GameAction::Substitute { team: Team::Home, out: EntityId(1), incoming: EntityId(2) },
            GameAction::AttachCard { card: EntityId(3), player: EntityId(1) },
            GameAction::DetachCard { card: EntityId(3) },
            GameAction::PlayCard { card: EntityId(4), face_down: false },
            GameAction::CreateToken { team: Team::Home, definition: InlineCardDef::new("Fan") },
            GameAction::RemoveAsset { card: EntityId(4) },
        ];
        let mut kinds: Vec<_> = actions.iter().map(GameAction::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), actions.len());
    }

    #[test]
    fn test_action_serialization() {
        let action = GameAction::Substitute {
            team: Team::Away,
            out: EntityId(5),
            incoming: EntityId(9),
        };
        let json = serde_json::to_string(&action).unwrap();
        let back: GameAction = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }
}
