//! Pausable effect chains and opponent responses.
//!
//! - [`PendingChoice`] / [`submit_choice`]: pause and resume
//! - [`find_matching_responses`] / [`build_response_chain`]: turn the
//!   defending team's face-down response assets into nested prompts

mod chain;
mod choice;

pub use chain::{build_response_chain, find_matching_responses, ResponseMatch, APPLY, PASS, RESPONSE_CHOICE};
pub use choice::{submit_choice, ChoiceId, PendingChoice, SELECTION_VAR};
