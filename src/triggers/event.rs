//! Game event types.
//!
//! Events represent things that are about to happen or just happened. Actions
//! produce *request* events; triggers intercept them and answer with effects.
//!
//! ## Event Data
//!
//! - `event_type`: What kind of event this is (an opaque tag)
//! - `team`: The acting team, if any
//! - `payload`: Named fields, merged into the trigger document
//! - `causation`: Ids of the triggers whose effects led to this event
//! - `occurrence_this_turn`: Stamped by the dispatcher
//!
//! ## Example
//!
//! ```
//! use court_engine::triggers::{GameEvent, TriggerId, STANDARD_ACTION_BEFORE};
//! use court_engine::core::Team;
//!
//! let event = GameEvent::for_team(STANDARD_ACTION_BEFORE, Team::Home)
//!     .with_field("action", "shoot")
//!     .with_field("distance", 6i64);
//!
//! assert_eq!(event.field("action").and_then(|v| v.as_text()), Some("shoot"));
//! assert!(!event.caused_by(TriggerId::new(1)));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Team;
use crate::expr::Value;

use super::registry::TriggerId;

/// Fired before a standard action (shoot, pass, ...) resolves.
pub const STANDARD_ACTION_BEFORE: &str = "standard-action.before";

/// Fired after a standard action resolved.
pub const STANDARD_ACTION_AFTER: &str = "standard-action.after";

/// Request to end the current phase. Vetoable.
pub const PHASE_END_REQUEST: &str = "phase-end.request";

/// Event type tag. Content defines what event types exist.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(String);

impl EventType {
    /// Create an event type.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interceptable request events end in `.request`.
    #[must_use]
    pub fn is_request(&self) -> bool {
        self.0.ends_with(".request")
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered trigger ids that led to an event.
pub type Causation = SmallVec<[TriggerId; 4]>;

/// A game event with contextual data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// The type of event.
    pub event_type: EventType,

    /// The acting team.
    pub team: Option<Team>,

    /// Named fields.
    pub payload: BTreeMap<String, Value>,

    /// Triggers whose effects led here, oldest first.
    pub causation: Causation,

    /// How many times this (turn, type, team) has fired, this one included.
    /// Zero until the dispatcher stamps it.
    pub occurrence_this_turn: u32,
}

impl GameEvent {
    /// Create a new event with just a type.
    pub fn new(event_type: impl Into<EventType>) -> Self {
        Self {
            event_type: event_type.into(),
            team: None,
            payload: BTreeMap::new(),
            causation: Causation::new(),
            occurrence_this_turn: 0,
        }
    }

    /// Create an event for a team.
    pub fn for_team(event_type: impl Into<EventType>, team: Team) -> Self {
        Self::new(event_type).with_team(team)
    }

    /// Set the team (builder pattern).
    #[must_use]
    pub fn with_team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }

    /// Add a payload field (builder pattern).
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Set the causation chain (builder pattern).
    #[must_use]
    pub fn with_causation(mut self, causation: Causation) -> Self {
        self.causation = causation;
        self
    }

    /// Get a payload field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Whether a trigger is part of this event's causation chain.
    #[must_use]
    pub fn caused_by(&self, trigger: TriggerId) -> bool {
        self.causation.contains(&trigger)
    }

    /// Fields this event contributes to a trigger document: the payload plus
    /// `event_type`, `team` and `occurrence`, also nested under `event`.
    #[must_use]
    pub fn document_fields(&self) -> BTreeMap<String, Value> {
        let mut fields = self.payload.clone();
        fields.insert("event_type".to_string(), Value::from(self.event_type.as_str()));
        fields.insert("team".to_string(), Value::from(self.team));
        fields.insert("occurrence".to_string(), Value::from(self.occurrence_this_turn));
        let nested = Value::Map(fields.clone());
        fields.insert("event".to_string(), nested);
        fields
    }
}
