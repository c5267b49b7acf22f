//! Core engine types: entities, teams, state, actions, RNG, configuration.

pub mod action;
pub mod config;
pub mod entity;
pub mod rng;
pub mod state;
pub mod team;

pub use action::GameAction;
pub use config::{EngineConfig, DEFAULT_RULE_PRIORITY, MAX_EVENT_DEPTH};
pub use entity::EntityId;
pub use rng::{GameRng, GameRngState};
pub use state::{CardZone, CourtPlayer, GameState, TeamState, OPENING_PHASE};
pub use team::{Team, TeamMap};
