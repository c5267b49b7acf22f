//! Event context: the safety state threaded through one dispatch.
//!
//! Three mechanisms together act as a bounded, inspectable call stack:
//!
//! - **Causation**: every event carries the ids of the triggers that led to
//!   it; a trigger never fires on an event it helped cause.
//! - **Lock set**: ids of triggers whose effects are executing right now, a
//!   second re-entrancy check independent of causation.
//! - **Depth**: nesting level of dispatch calls, bounded by `max_depth`.
//!
//! Occurrence counters live here too and are scoped by `(turn, event type,
//! team)`. Counters persist in the session between actions; the lock set and
//! depth only live for one top-level dispatch.

use im::{OrdMap, OrdSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{Team, MAX_EVENT_DEPTH};
use crate::error::{EngineError, Result};

use super::event::{Causation, EventType, GameEvent};
use super::registry::{Trigger, TriggerId};

/// Scope of an occurrence counter.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CounterKey {
    /// Turn number.
    pub turn: u32,
    /// Event type.
    pub event_type: EventType,
    /// Acting team.
    pub team: Option<Team>,
}

/// Occurrence counters by scope.
///
/// Entries from past turns are never read again and are harmless.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounters {
    counts: OrdMap<CounterKey, u32>,
}

impl EventCounters {
    /// Create empty counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count for a scope, 0 if never fired.
    #[must_use]
    pub fn get(&self, turn: u32, event_type: &EventType, team: Option<Team>) -> u32 {
        let key = CounterKey {
            turn,
            event_type: event_type.clone(),
            team,
        };
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Increment a scope and return the new count.
    pub fn increment(&mut self, turn: u32, event_type: &EventType, team: Option<Team>) -> u32 {
        let key = CounterKey {
            turn,
            event_type: event_type.clone(),
            team,
        };
        let count = self.counts.get(&key).copied().unwrap_or(0) + 1;
        self.counts.insert(key, count);
        count
    }

    /// Number of tracked scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if no event has been counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Safety state for one top-level dispatch and everything it recursively
/// fires.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    /// Occurrence counters.
    pub counters: EventCounters,

    /// Triggers whose effects are executing.
    pub executing: OrdSet<TriggerId>,

    /// Current dispatch nesting level.
    pub depth: u32,

    /// Deepest allowed nesting level.
    pub max_depth: u32,
}

impl Default for EventContext {
    fn default() -> Self {
        Self::new(EventCounters::default())
    }
}

impl EventContext {
    /// Create a context at depth 0 with the default depth bound.
    #[must_use]
    pub fn new(counters: EventCounters) -> Self {
        Self {
            counters,
            executing: OrdSet::new(),
            depth: 0,
            max_depth: MAX_EVENT_DEPTH,
        }
    }

    /// Set the depth bound (builder pattern).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enter one dispatch level.
    ///
    /// # Errors
    ///
    /// [`EngineError::DepthExceeded`] when the new depth is past `max_depth`.
    /// The depth is left unchanged in that case.
    pub fn increment_depth(&mut self) -> Result<u32> {
        let depth = self.depth + 1;
        if depth > self.max_depth {
            warn!(depth, max_depth = self.max_depth, "event recursion limit exceeded");
            return Err(EngineError::DepthExceeded {
                depth,
                max_depth: self.max_depth,
            });
        }
        self.depth = depth;
        Ok(depth)
    }

    /// Leave one dispatch level.
    pub fn decrement_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Count an event occurrence and return its ordinal this turn.
    pub fn increment_counter(&mut self, turn: u32, event: &GameEvent) -> u32 {
        self.counters.increment(turn, &event.event_type, event.team)
    }

    /// Mark a trigger as executing.
    pub fn lock_trigger(&mut self, id: TriggerId) {
        self.executing.insert(id);
    }

    /// Clear a trigger's executing mark.
    pub fn unlock_trigger(&mut self, id: TriggerId) {
        self.executing.remove(&id);
    }

    /// Whether a trigger's effect is executing.
    #[must_use]
    pub fn is_locked(&self, id: TriggerId) -> bool {
        self.executing.contains(&id)
    }

    /// A trigger may fire on an event unless it caused the event or is
    /// already executing.
    #[must_use]
    pub fn can_trigger_fire(&self, trigger: &Trigger, event: &GameEvent) -> bool {
        !event.caused_by(trigger.id) && !self.is_locked(trigger.id)
    }
}

/// Append a trigger to a causation chain.
#[must_use]
pub fn add_to_causation(causation: &Causation, trigger: TriggerId) -> Causation {
    let mut chain = causation.clone();
    chain.push(trigger);
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;

    #[test]
    fn test_counters_are_scoped() {
        let mut ctx = EventContext::default();
        let home = GameEvent::for_team("x", Team::Home);
        let away = GameEvent::for_team("x", Team::Away);

        assert_eq!(ctx.increment_counter(3, &home), 1);
        assert_eq!(ctx.increment_counter(3, &home), 2);
        assert_eq!(ctx.increment_counter(3, &away), 1);
        assert_eq!(ctx.increment_counter(4, &home), 1);
        assert_eq!(ctx.counters.get(3, &EventType::from("x"), Some(Team::Home)), 2);
    }

    #[test]
    fn test_depth_bound() {
        let mut ctx = EventContext::default().with_max_depth(2);
        assert_eq!(ctx.increment_depth().unwrap(), 1);
        assert_eq!(ctx.increment_depth().unwrap(), 2);

        let err = ctx.increment_depth().unwrap_err();
        assert!(matches!(err, EngineError::DepthExceeded { depth: 3, max_depth: 2 }));
        assert_eq!(ctx.depth, 2);

        ctx.decrement_depth();
        ctx.decrement_depth();
        ctx.decrement_depth();
        assert_eq!(ctx.depth, 0);
    }

    #[test]
    fn test_can_trigger_fire() {
        let mut ctx = EventContext::default();
        let mut trigger = Trigger::new("t", "x", Effect::Noop);
        trigger.id = TriggerId::new(4);

        let fresh = GameEvent::new("x");
        assert!(ctx.can_trigger_fire(&trigger, &fresh));

        let caused = GameEvent::new("x")
            .with_causation(add_to_causation(&Causation::new(), TriggerId::new(4)));
        assert!(!ctx.can_trigger_fire(&trigger, &caused));

        ctx.lock_trigger(trigger.id);
        assert!(!ctx.can_trigger_fire(&trigger, &fresh));
        ctx.unlock_trigger(trigger.id);
        assert!(ctx.can_trigger_fire(&trigger, &fresh));
    }

    #[test]
    fn test_add_to_causation_appends() {
        let chain = add_to_causation(&Causation::new(), TriggerId::new(1));
        let chain = add_to_causation(&chain, TriggerId::new(2));
        assert_eq!(chain.as_slice(), &[TriggerId::new(1), TriggerId::new(2)]);
    }
}
