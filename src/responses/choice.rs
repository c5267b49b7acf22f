//! Pending choices.
//!
//! A [`PendingChoice`] is a paused effect chain: who must answer, what they
//! may answer, and the continuation to run once they do. It lives in
//! [`GameState::pending_choice`](crate::core::GameState), so a paused game is
//! a plain value that can be persisted and resumed later.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::Team;
use crate::effects::{Effect, EffectContext, EffectResult, Pipeline};
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::expr::Value;

/// Variable a submitted selection is bound to.
pub const SELECTION_VAR: &str = "selection";

/// Unique identifier for a choice. Never reused within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChoiceId(pub u32);

impl ChoiceId {
    /// Create a choice ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Choice({})", self.0)
    }
}

/// A paused point in an effect chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChoice {
    /// Choice id.
    pub id: ChoiceId,
    /// Kind of choice (`response`, ...).
    pub choice_type: String,
    /// Allowed selections.
    pub options: Vec<String>,
    /// Team that must answer.
    pub waiting_for: Team,
    /// Evaluated prompt data.
    pub details: BTreeMap<String, Value>,
    /// Context the continuation runs in.
    pub context: EffectContext,
    /// What runs once the choice is answered.
    pub continuation: Effect,
}

impl PendingChoice {
    /// Whether `selection` is one of the options.
    #[must_use]
    pub fn allows(&self, selection: &str) -> bool {
        self.options.iter().any(|o| o == selection)
    }
}

/// Answer the pending choice and resume its chain.
///
/// The choice is cleared before the continuation runs, so the continuation
/// may offer the next choice.
///
/// # Errors
///
/// - [`EngineError::ChoiceNotPending`] if no choice is pending or `id` is
///   not the pending one (including an id that was already answered).
/// - [`EngineError::InvalidSelection`] if `selection` is not an option.
/// - Any fatal error from the continuation.
///
/// The pipeline is consumed either way; callers that want to retry after an
/// error keep their own copy.
pub fn submit_choice(
    engine: &Engine,
    mut pipeline: Pipeline,
    id: ChoiceId,
    selection: &str,
) -> Result<EffectResult> {
    let Some(choice) = pipeline.state.pending_choice.take().filter(|c| c.id == id) else {
        return Err(EngineError::ChoiceNotPending { id });
    };
    if !choice.allows(selection) {
        return Err(EngineError::InvalidSelection {
            id,
            selection: selection.to_string(),
        });
    }

    info!(choice = %id, selection, waiting_for = %choice.waiting_for, "choice submitted");
    let ctx = choice.context.with_var(SELECTION_VAR, selection);
    engine.apply_effect(pipeline, &choice.continuation, &ctx)
}
