//! Values threaded through effect application.

use crate::core::GameState;
use crate::responses::PendingChoice;
use crate::triggers::{EventContext, TriggerRegistry};

/// State, registry and event context, moved through every dispatch and
/// effect application and handed back in each result.
///
/// All three are `im`-backed, so cloning a pipeline to keep a rollback
/// point is cheap.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    /// Authoritative game state.
    pub state: GameState,
    /// Registered triggers.
    pub registry: TriggerRegistry,
    /// Counters, reentrancy lock and depth.
    pub events: EventContext,
}

impl Pipeline {
    /// Assemble a pipeline.
    #[must_use]
    pub fn new(state: GameState, registry: TriggerRegistry, events: EventContext) -> Self {
        Self {
            state,
            registry,
            events,
        }
    }
}

/// Outcome of applying one effect tree.
#[derive(Clone, Debug)]
pub struct EffectResult {
    /// Pipeline after the effect.
    pub pipeline: Pipeline,
    /// The effect vetoed the event it answers.
    pub prevented: bool,
    /// Effects that took hold, by kind.
    pub applied: Vec<String>,
    /// Non-fatal failures (missing target, ...).
    pub failed: Vec<String>,
    /// Set when the effect paused on a player decision.
    pub pending: Option<PendingChoice>,
}

impl EffectResult {
    /// A result with nothing applied yet.
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            prevented: false,
            applied: Vec::new(),
            failed: Vec::new(),
            pending: None,
        }
    }

    /// Whether the chain paused.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Fold a nested result into this one, taking over its pipeline.
    pub(crate) fn absorb(&mut self, other: EffectResult) {
        self.pipeline = other.pipeline;
        self.prevented |= other.prevented;
        self.applied.extend(other.applied);
        self.failed.extend(other.failed);
        if other.pending.is_some() {
            self.pending = other.pending;
        }
    }
}
