//! # court-engine
//!
//! Event-driven trigger/effect engine for a turn-based card-and-board game.
//!
//! ## Design Principles
//!
//! 1. **Rules as Triggers**: Actions raise request events; registered
//!    triggers (card abilities and default rules alike) answer with effects.
//!    Only terminal effects mutate state, so any card can rewrite or veto
//!    any rule.
//!
//! 2. **Bounded Recursion**: Causation chains, a reentrancy lock and a depth
//!    bound keep trigger cascades finite.
//!
//! 3. **Continuations as Data**: A chain paused on a player decision is an
//!    effect tree stored in the state. Sessions serialize and resume across
//!    process restarts.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: State and registry are `im`-backed and
//!   threaded through dispatch by value; cloning is O(1).
//!
//! - **Explicit Runtime**: The function table, condition evaluator and
//!   effect applier live in an [`Engine`] passed by reference; there is no
//!   global registry.
//!
//! ## Modules
//!
//! - `core`: Entity ids, teams, state, actions, RNG, configuration
//! - `cards`: Card definitions, instances and the catalog capability
//! - `expr`: Values, documents, expressions and their evaluation
//! - `effects`: Effect trees and their application
//! - `triggers`: Events, registry, dispatch and trigger lifecycle
//! - `responses`: Pending choices and response chains
//! - `rules`: Skill tests, phases and default rules
//! - `session`: Persisted sessions and the game driver

pub mod cards;
pub mod core;
pub mod effects;
pub mod engine;
pub mod error;
pub mod expr;
pub mod responses;
pub mod rules;
pub mod session;
pub mod triggers;

// Re-export commonly used types
pub use crate::core::{EngineConfig, EntityId, GameAction, GameRng, GameRngState, GameState, Team};

pub use crate::cards::{AbilityDef, AssetPower, CardCatalog, CardDef, EffectCatalog, ResponseSpec, TriggerSpec};

pub use crate::expr::{ConditionEvaluator, Document, Expr, FunctionTable, Outcome, Value};

pub use crate::effects::{Effect, EffectApplier, EffectContext, EffectResult, Pipeline, StandardApplier};

pub use crate::triggers::{
    fire_request_event, update_registry_for_action, DispatchResult, EventType, GameEvent, Trigger, TriggerId,
    TriggerRegistry,
};

pub use crate::responses::{ChoiceId, PendingChoice};

pub use crate::engine::Engine;
pub use crate::error::{EngineError, Result};
pub use crate::session::{ActionOutcome, GameDriver, GameSession};
