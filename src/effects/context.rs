//! Per-application effect context.
//!
//! An [`EffectContext`] travels with an effect tree: which trigger is
//! running, its bindings, the event being answered, the causation chain any
//! nested event inherits, and variables bound by `Bind` or by a choice
//! submission. It is plain data so a paused chain can carry it inside the
//! pending choice.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::GameState;
use crate::expr::{Document, Value};
use crate::triggers::{add_to_causation, Causation, GameEvent, TriggerBindings, TriggerId};

/// Context an effect is applied in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectContext {
    /// Trigger whose effect this is, if any.
    pub trigger: Option<TriggerId>,

    /// `self`/`source`/`owner` bindings.
    pub bindings: TriggerBindings,

    /// Event being answered.
    pub event: Option<GameEvent>,

    /// Causation inherited by events fired from this context.
    pub causation: Causation,

    /// Bound variables, readable as top-level document keys.
    pub vars: BTreeMap<String, Value>,
}

impl EffectContext {
    /// Empty context: no trigger, no event, empty causation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a trigger firing on an event. The trigger is appended to
    /// the event's causation.
    #[must_use]
    pub fn for_trigger(trigger: TriggerId, bindings: TriggerBindings, event: &GameEvent) -> Self {
        Self {
            trigger: Some(trigger),
            bindings,
            event: Some(event.clone()),
            causation: add_to_causation(&event.causation, trigger),
            vars: BTreeMap::new(),
        }
    }

    /// Replace bindings (builder pattern).
    #[must_use]
    pub fn with_bindings(mut self, bindings: TriggerBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Set the event (builder pattern). Causation is taken from the event.
    #[must_use]
    pub fn with_event(mut self, event: GameEvent) -> Self {
        self.causation = event.causation.clone();
        self.event = Some(event);
        self
    }

    /// Bind a variable (builder pattern).
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Look up a bound variable.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Build the document conditions and effect parameters evaluate against.
    ///
    /// Later layers overwrite earlier ones: game summary, last skill test,
    /// bindings, event fields, then variables.
    #[must_use]
    pub fn document(&self, state: &GameState) -> Document {
        let mut doc = Document::new();
        if let Value::Map(summary) = state.summary_value() {
            doc.merge(&summary);
        }
        doc.insert(
            "skill_test",
            state
                .last_skill_test
                .as_ref()
                .map_or(Value::Null, |r| r.to_value()),
        );

        let b = &self.bindings;
        doc.insert("self", b.self_.map_or(Value::Null, |id| state.entity_value(id)));
        doc.insert("source", b.source.map_or(Value::Null, |id| state.entity_value(id)));
        doc.insert("owner", Value::from(b.owner));

        if let Some(event) = &self.event {
            doc.merge(&event.document_fields());
        }
        doc.merge(&self.vars);
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Team;
    use smallvec::smallvec;

    #[test]
    fn test_for_trigger_extends_causation() {
        let event = GameEvent::new("x").with_causation(smallvec![TriggerId::new(2)]);
        let ctx = EffectContext::for_trigger(TriggerId::new(7), TriggerBindings::default(), &event);
        assert_eq!(ctx.causation.as_slice(), &[TriggerId::new(2), TriggerId::new(7)]);
        // The event itself is untouched.
        assert_eq!(ctx.event.as_ref().unwrap().causation.len(), 1);
    }

    #[test]
    fn test_document_layers() {
        let mut state = GameState::new(0);
        let guard = state.add_player(Team::Home, "guard", 2, [("shooting", 5)], true);
        let event = GameEvent::for_team("standard-action.before", Team::Home)
            .with_field("actor", guard)
            .with_field("turn", 99i64);

        let ctx = EffectContext::new()
            .with_bindings(TriggerBindings::entity(guard, Team::Home))
            .with_event(event)
            .with_var("selection", "Pass");
        let doc = ctx.document(&state);

        assert_eq!(doc.get("self.stats.shooting"), Some(&Value::Int(5)));
        assert_eq!(doc.get("owner"), Some(&Value::from(Team::Home)));
        assert_eq!(doc.get("event.actor"), Some(&Value::from(guard)));
        assert_eq!(doc.get("selection"), Some(&Value::from("Pass")));
        // Event fields shadow the summary.
        assert_eq!(doc.get("turn"), Some(&Value::Int(99)));
        assert_eq!(doc.get("skill_test"), Some(&Value::Null));
        assert_eq!(doc.get("scores.home"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_unbound_entities_are_null() {
        let doc = EffectContext::new().document(&GameState::new(0));
        assert_eq!(doc.get("self"), Some(&Value::Null));
        assert_eq!(doc.get("owner"), Some(&Value::Null));
        assert!(!doc.contains_key("event"));
    }
}
