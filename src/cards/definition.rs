//! Card catalog definitions: static ability and power data.
//!
//! A catalog entry describes what a card or player *can* do. The lifecycle
//! manager turns the triggered parts of these definitions into registered
//! [`Trigger`](crate::triggers::Trigger)s when the entity enters play.
//!
//! ## Example
//!
//! ```
//! use court_engine::cards::{AbilityDef, TriggerSpec};
//! use court_engine::effects::Effect;
//! use court_engine::expr::Expr;
//!
//! let clutch = AbilityDef::triggered(
//!     "Clutch",
//!     TriggerSpec::new("standard-action.after", Effect::modify_score(Expr::path("owner"), 1))
//!         .with_priority(50)
//!         .with_condition(Expr::path_eq("success", true)),
//! );
//!
//! assert!(!clutch.passive);
//! assert_eq!(clutch.trigger.unwrap().priority, 50);
//! ```

use serde::{Deserialize, Serialize};

use crate::effects::Effect;
use crate::expr::Expr;
use crate::triggers::{EventType, TriggerTiming};

/// Template for a trigger, instantiated once per entity in play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSpec {
    /// Event types to listen for.
    pub event_types: Vec<EventType>,

    /// Before or after the action the event describes.
    #[serde(default)]
    pub timing: TriggerTiming,

    /// Lower fires first.
    #[serde(default)]
    pub priority: i32,

    /// Optional condition over the trigger document.
    #[serde(default)]
    pub condition: Option<Expr>,

    /// Effect applied when the trigger fires.
    pub effect: Effect,

    /// Fire at most once, then unregister.
    #[serde(default)]
    pub once: bool,
}

impl TriggerSpec {
    /// Create a spec for one event type.
    pub fn new(event_type: impl Into<EventType>, effect: Effect) -> Self {
        Self {
            event_types: vec![event_type.into()],
            timing: TriggerTiming::default(),
            priority: 0,
            condition: None,
            effect,
            once: false,
        }
    }

    /// Listen for another event type (builder pattern).
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

    /// Set priority (builder pattern).
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
}

/// A named ability of a player or card.
///
/// Passive abilities are read by rule content directly and never become
/// triggers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDef {
    /// Display name.
    pub name: String,

    /// Passive abilities register nothing.
    #[serde(default)]
    pub passive: bool,

    /// The trigger to register for a non-passive ability.
    #[serde(default)]
    pub trigger: Option<TriggerSpec>,
}

impl AbilityDef {
    /// A triggered ability.
    pub fn triggered(name: impl Into<String>, trigger: TriggerSpec) -> Self {
        Self {
            name: name.into(),
            passive: false,
            trigger: Some(trigger),
        }
    }

    /// A passive ability.
    pub fn passive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passive: true,
            trigger: None,
        }
    }

    /// The trigger spec, if this ability registers one.
    #[must_use]
    pub fn trigger_spec(&self) -> Option<&TriggerSpec> {
        if self.passive {
            None
        } else {
            self.trigger.as_ref()
        }
    }
}

/// An interactive response on a face-down asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// Event type the response can interrupt.
    pub event_type: EventType,

    /// Optional condition over the trigger document.
    #[serde(default)]
    pub condition: Option<Expr>,

    /// Prompt shown to the defending team.
    pub prompt: String,

    /// Effect applied when the defender picks "Apply".
    pub effect: Effect,
}

impl ResponseSpec {
    /// Create a response spec.
    pub fn new(event_type: impl Into<EventType>, prompt: impl Into<String>, effect: Effect) -> Self {
        Self {
            event_type: event_type.into(),
            condition: None,
            prompt: prompt.into(),
            effect,
        }
    }

    /// Set the condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: Expr) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// The in-play power of an asset card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPower {
    /// Display name.
    pub name: String,

    /// Triggers registered while the asset is in play.
    #[serde(default)]
    pub triggers: Vec<TriggerSpec>,

    /// Optional face-down response.
    #[serde(default)]
    pub response: Option<ResponseSpec>,
}

impl AssetPower {
    /// Create a power with no triggers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triggers: Vec::new(),
            response: None,
        }
    }

    /// Add a trigger (builder pattern).
    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerSpec) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Set the response (builder pattern).
    #[must_use]
    pub fn with_response(mut self, response: ResponseSpec) -> Self {
        self.response = Some(response);
        self
    }

    /// Whether the asset is a response-type asset.
    #[must_use]
    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }
}

/// A card definition carried inline by a token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineCardDef {
    /// Display name.
    pub name: String,

    /// Abilities, registered like attached abilities.
    #[serde(default)]
    pub abilities: Vec<AbilityDef>,

    /// Power, registered like an asset power.
    #[serde(default)]
    pub power: Option<AssetPower>,
}

impl InlineCardDef {
    /// Create an empty definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abilities: Vec::new(),
            power: None,
        }
    }

    /// Add an ability (builder pattern).
    #[must_use]
    pub fn with_ability(mut self, ability: AbilityDef) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Set the power (builder pattern).
    #[must_use]
    pub fn with_power(mut self, power: AssetPower) -> Self {
        self.power = Some(power);
        self
    }
}

/// A catalog entry, keyed by slug.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDef {
    /// Catalog key.
    pub slug: String,

    /// Display name.
    pub name: String,

    /// Abilities of a player, or of an attachable card.
    #[serde(default)]
    pub abilities: Vec<AbilityDef>,

    /// Power when played as an asset.
    #[serde(default)]
    pub power: Option<AssetPower>,
}

impl CardDef {
    /// Create an entry with no abilities.
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            abilities: Vec::new(),
            power: None,
        }
    }

    /// Add an ability (builder pattern).
    #[must_use]
    pub fn with_ability(mut self, ability: AbilityDef) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Set the power (builder pattern).
    #[must_use]
    pub fn with_power(mut self, power: AssetPower) -> Self {
        self.power = Some(power);
        self
    }
}
