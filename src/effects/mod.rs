//! Effect system.
//!
//! Effects are what triggers produce:
//! - `Effect`: serializable effect tree, doubling as a continuation
//! - `EffectContext`: trigger, bindings, event, causation and variables
//! - `Pipeline` / `EffectResult`: values threaded through application
//! - `EffectApplier`: the seam the dispatcher calls through
//!
//! ## Design Philosophy
//!
//! Only terminal effects mutate authoritative state. Everything else either
//! routes (sequence, branch, bind), asks (offer a choice), or re-enters the
//! dispatcher (fire an event), which lets card content rewrite or veto core
//! rules without the core knowing about any card.

mod applier;
mod context;
mod effect;
mod pipeline;

pub use applier::{EffectApplier, StandardApplier};
pub use context::EffectContext;
pub use effect::Effect;
pub use pipeline::{EffectResult, Pipeline};
