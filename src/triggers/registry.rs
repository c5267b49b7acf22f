//! Trigger registry.
//!
//! The registry stores triggers and provides lookup by event type and by
//! source. It is an immutable-style value: backed by `im` maps, cloned in O(1)
//! and threaded through the event pipeline alongside the game state.
//!
//! Trigger ids are allocated monotonically, so ascending id order is
//! registration order. Lookup results are sorted by `(priority, id)`:
//! lower priority fires first, ties break by registration order.

use im::{OrdMap, OrdSet};
use serde::{Deserialize, Serialize};

use crate::cards::TriggerSpec;
use crate::core::{EntityId, Team};
use crate::effects::Effect;
use crate::expr::Expr;

use super::event::EventType;

/// Unique identifier for a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

impl TriggerId {
    /// Create a new trigger ID.
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

impl std::fmt::Display for TriggerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Trigger({})", self.0)
    }
}

/// Whether the trigger reacts before or after the action its event describes.
///
/// Descriptive only. Dispatch selects triggers by event type, and the
/// before/after split lives in the event names (`standard-action.before`,
/// `standard-action.after`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TriggerTiming {
    /// Before the action resolves (can veto or modify it).
    Before,
    /// After the action resolved.
    #[default]
    After,
}

/// The entities a trigger is bound to.
///
/// These become the `source`, `owner` and `self` keys of the trigger's
/// condition document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerBindings {
    /// Entity that registered the trigger. Bulk unregistration keys on this.
    pub source: Option<EntityId>,
    /// Team controlling the trigger.
    pub owner: Option<Team>,
    /// Entity the ability belongs to (a player, for attached abilities).
    #[serde(rename = "self")]
    pub self_: Option<EntityId>,
}

impl TriggerBindings {
    /// Bindings for an entity acting on its own behalf.
    #[must_use]
    pub fn entity(id: EntityId, owner: Team) -> Self {
        Self {
            source: Some(id),
            owner: Some(owner),
            self_: Some(id),
        }
    }
}

/// A registered trigger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    /// Unique identifier, assigned by the registry.
    pub id: TriggerId,

    /// Human-readable name (for debugging).
    pub name: String,

    /// Event types this trigger listens for.
    pub event_types: Vec<EventType>,

    /// Before/after the action. Metadata for tooling and logs; not read by
    /// dispatch.
    pub timing: TriggerTiming,

    /// Lower fires first.
    pub priority: i32,

    /// Optional condition over the trigger document.
    pub condition: Option<Expr>,

    /// Effect to apply when the trigger fires.
    pub effect: Effect,

    /// Unregister after the first firing.
    pub once: bool,

    /// Source/owner/self bindings.
    pub bindings: TriggerBindings,

    /// Response triggers are surfaced as prompts, never auto-fired.
    pub response: bool,
}

impl Trigger {
    /// Create a new trigger for one event type.
    pub fn new(name: impl Into<String>, event_type: impl Into<EventType>, effect: Effect) -> Self {
        Self {
            id: TriggerId::new(0),
            name: name.into(),
            event_types: vec![event_type.into()],
            timing: TriggerTiming::default(),
            priority: 0,
            condition: None,
            effect,
            once: false,
            bindings: TriggerBindings::default(),
            response: false,
        }
    }

    /// Instantiate a catalog spec with bindings.
    pub fn from_spec(name: impl Into<String>, spec: &TriggerSpec, bindings: TriggerBindings) -> Self {
        Self {
            id: TriggerId::new(0),
            name: name.into(),
            event_types: spec.event_types.clone(),
            timing: spec.timing,
            priority: spec.priority,
            condition: spec.condition.clone(),
            effect: spec.effect.clone(),
            once: spec.once,
            bindings,
            response: false,
        }
    }

    /// Add an event type to listen for (builder pattern).
    #[must_use]
    pub fn also_on(mut self, event_type: impl Into<EventType>) -> Self {
        let event_type = event_type.into();
        if !self.event_types.contains(&event_type) {
            self.event_types.push(event_type);
        }
        self
    }

    /// Set the timing (builder pattern).
    #[must_use]
    pub fn with_timing(mut self, timing: TriggerTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Set priority (builder pattern). Lower fires first.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: Expr) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Mark as fire-once (builder pattern).
    #[must_use]
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    /// Set all bindings (builder pattern).
    #[must_use]
    pub fn with_bindings(mut self, bindings: TriggerBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Set the source entity (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.bindings.source = Some(source);
        self
    }

    /// Set the owning team (builder pattern).
    #[must_use]
    pub fn with_owner(mut self, owner: Team) -> Self {
        self.bindings.owner = Some(owner);
        self
    }

    /// Mark as a response trigger (builder pattern).
    #[must_use]
    pub fn as_response(mut self) -> Self {
        self.response = true;
        self
    }

    /// Whether this trigger listens for an event type.
    #[must_use]
    pub fn listens_for(&self, event_type: &EventType) -> bool {
        self.event_types.contains(event_type)
    }
}

/// Registry for triggers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRegistry {
    /// All registered triggers.
    triggers: OrdMap<TriggerId, Trigger>,

    /// Index by event type.
    by_event_type: OrdMap<EventType, OrdSet<TriggerId>>,

    /// Next trigger ID to allocate.
    next_id: u32,
}

impl Default for TriggerRegistry {
    fn default() -> Self {
        Self {
            triggers: OrdMap::new(),
            by_event_type: OrdMap::new(),
            next_id: 1,
        }
    }
}

impl TriggerRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger, returns its newly assigned ID.
    pub fn register(&mut self, mut trigger: Trigger) -> TriggerId {
        let id = TriggerId::new(self.next_id);
        self.next_id += 1;
        trigger.id = id;

        for event_type in &trigger.event_types {
            self.by_event_type
                .entry(event_type.clone())
                .or_insert_with(OrdSet::new)
                .insert(id);
        }

        self.triggers.insert(id, trigger);
        id
    }

    /// Unregister a trigger.
    pub fn unregister(&mut self, id: TriggerId) -> Option<Trigger> {
        let trigger = self.triggers.remove(&id)?;
        for event_type in &trigger.event_types {
            let now_empty = match self.by_event_type.get_mut(event_type) {
                Some(ids) => {
                    ids.remove(&id);
                    ids.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.by_event_type.remove(event_type);
            }
        }
        Some(trigger)
    }

    /// Remove all triggers registered by a source entity.
    ///
    /// Returns how many were removed.
    pub fn unregister_by_source(&mut self, source: EntityId) -> usize {
        let to_remove: Vec<_> = self
            .triggers
            .values()
            .filter(|t| t.bindings.source == Some(source))
            .map(|t| t.id)
            .collect();

        for &id in &to_remove {
            self.unregister(id);
        }
        to_remove.len()
    }

    /// Get a trigger by ID.
    #[must_use]
    pub fn get(&self, id: TriggerId) -> Option<&Trigger> {
        self.triggers.get(&id)
    }

    /// Check whether a trigger is still registered.
    #[must_use]
    pub fn contains(&self, id: TriggerId) -> bool {
        self.triggers.contains_key(&id)
    }

    /// All triggers listening for an event type, sorted ascending by
    /// priority, then by registration order.
    #[must_use]
    pub fn triggers_for_event(&self, event_type: &EventType) -> Vec<Trigger> {
        let Some(ids) = self.by_event_type.get(event_type) else {
            return Vec::new();
        };
        let mut triggers: Vec<Trigger> = ids
            .iter()
            .filter_map(|id| self.triggers.get(id).cloned())
            .collect();
        triggers.sort_by_key(|t| (t.priority, t.id));
        triggers
    }

    /// Triggers registered by a source entity, in registration order.
    pub fn triggers_for_source(&self, source: EntityId) -> impl Iterator<Item = &Trigger> {
        self.triggers
            .values()
            .filter(move |t| t.bindings.source == Some(source))
    }

    /// Get total trigger count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Iterate all triggers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.values()
    }
}
