//! Event-driven trigger system.
//!
//! Triggers let card content intercept request events and answer them with
//! effects. The core knows no rule: default rules are triggers too, just at
//! a late priority.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: a request event with payload and causation chain
//! - [`Trigger`] / [`TriggerRegistry`]: what listens, indexed by event type
//! - [`EventContext`]: counters, reentrancy lock and recursion depth
//! - [`fire_request_event`]: the dispatch loop, and [`resume_request_event`]
//!   to finish one that paused on a choice
//! - lifecycle functions: keep the registry in step with what is in play
//!
//! ## Recursion Safety
//!
//! Three independent guards keep trigger chains finite:
//! 1. A trigger never fires on an event whose causation chain holds its id.
//! 2. A trigger never fires while its own effect is still executing.
//! 3. Dispatch depth is bounded; overflow aborts the action.
//!
//! ## Example
//!
//! ```
//! use court_engine::core::GameState;
//! use court_engine::effects::Effect;
//! use court_engine::triggers::{GameEvent, Trigger, TriggerRegistry};
//! use court_engine::Engine;
//!
//! let mut registry = TriggerRegistry::new();
//! let early = registry.register(Trigger::new("early", "ping", Effect::Noop).with_priority(5));
//! let veto = registry.register(Trigger::new("veto", "ping", Effect::prevent("no")).with_priority(100));
//!
//! let engine = Engine::default();
//! let pipeline = engine.pipeline(GameState::new(0), registry, Default::default());
//! let result = engine.fire_request_event(pipeline, GameEvent::new("ping")).unwrap();
//!
//! assert!(result.prevented);
//! assert_eq!(result.fired().collect::<Vec<_>>(), vec![early, veto]);
//! ```

mod context;
mod dispatcher;
mod event;
mod lifecycle;
mod registry;

pub use context::{add_to_causation, CounterKey, EventContext, EventCounters};
pub use dispatcher::{
    fire_request_event, resume_request_event, DispatchResult, EffectSummary, FiringStatus, SkipReason,
    TriggerFiring,
};
pub(crate) use dispatcher::suspend_dispatch;
pub use event::{
    Causation, EventType, GameEvent, PHASE_END_REQUEST, STANDARD_ACTION_AFTER,
    STANDARD_ACTION_BEFORE,
};
pub use lifecycle::{
    initialize_game_triggers, reconcile_registry, register_asset_triggers,
    register_attached_abilities, register_player_abilities, unregister_asset_triggers,
    unregister_attached_abilities, unregister_player_abilities, update_registry_for_action,
};
pub use registry::{Trigger, TriggerBindings, TriggerId, TriggerRegistry, TriggerTiming};
