//! Card system: catalog definitions, instances, and the catalog capability.
//!
//! ## Key Types
//!
//! - `CardDef`: Catalog entry (abilities, asset power)
//! - `AbilityDef` / `TriggerSpec`: Triggered abilities as data
//! - `AssetPower` / `ResponseSpec`: In-play asset powers and face-down responses
//! - `InlineCardDef`: Definition carried by a token
//! - `CardInstance`: Runtime card state (team, attachment, face-down)
//! - `EffectCatalog`: Lookup capability used by the lifecycle manager

pub mod catalog;
pub mod definition;
pub mod instance;

pub use catalog::{CardCatalog, EffectCatalog};
pub use definition::{AbilityDef, AssetPower, CardDef, InlineCardDef, ResponseSpec, TriggerSpec};
pub use instance::CardInstance;
