//! Sessions and the game driver.
//!
//! - [`GameSession`]: the data one game carries between actions
//! - [`GameDriver`]: resolves actions and choice submissions against a
//!   session, keeping its registry in sync

mod driver;
mod game;

pub use driver::{ActionOutcome, GameDriver, SHOOTING_STAT};
pub use game::GameSession;
