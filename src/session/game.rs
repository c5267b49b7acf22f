//! Persisted session data.

use serde::{Deserialize, Serialize};

use crate::core::GameState;
use crate::effects::Pipeline;
use crate::error::{EngineError, Result};
use crate::responses::PendingChoice;
use crate::triggers::{EventCounters, TriggerRegistry};

/// Everything that outlives a single action: state, registry and occurrence
/// counters.
///
/// A session paused on a choice is still just this value; serialize it,
/// restore it in another process, and submit the answer there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    /// Game state.
    pub state: GameState,
    /// Registered triggers.
    pub registry: TriggerRegistry,
    /// Occurrence counters.
    pub counters: EventCounters,
}

impl GameSession {
    /// Assemble a session.
    #[must_use]
    pub fn new(state: GameState, registry: TriggerRegistry) -> Self {
        Self {
            state,
            registry,
            counters: EventCounters::new(),
        }
    }

    /// The choice the session is waiting on.
    #[must_use]
    pub fn pending_choice(&self) -> Option<&PendingChoice> {
        self.state.pending_choice.as_ref()
    }

    /// Take back the results of a finished dispatch. The lock set and depth
    /// are dropped.
    pub(crate) fn commit(&mut self, pipeline: Pipeline) {
        self.state = pipeline.state;
        self.registry = pipeline.registry;
        self.counters = pipeline.events.counters;
    }

    /// Serialize with `bincode`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Persistence`] on encoder failure.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| EngineError::Persistence(e.to_string()))
    }

    /// Restore from [`Self::to_bytes`] output.
    ///
    /// # Errors
    ///
    /// [`EngineError::Persistence`] on malformed input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| EngineError::Persistence(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Team;

    #[test]
    fn test_bytes_round_trip() {
        let mut state = GameState::new(3);
        state.add_player(Team::Home, "guard", 2, [("shooting", 5)], true);
        let session = GameSession::new(state, TriggerRegistry::new());

        let bytes = session.to_bytes().unwrap();
        assert_eq!(GameSession::from_bytes(&bytes).unwrap(), session);
    }

    #[test]
    fn test_garbage_is_persistence_error() {
        let err = GameSession::from_bytes(&[0xff, 0x01]).unwrap_err();
        assert!(matches!(err, EngineError::Persistence(_)));
    }
}
