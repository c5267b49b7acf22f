//! Phase progression.
//!
//! A turn runs `offense -> defense -> end`; ending the `end` phase starts
//! the next turn with the other team active.

use crate::core::GameState;

/// Phases of a turn, in order.
pub const PHASES: [&str; 3] = ["offense", "defense", "end"];

/// The phase following `phase`, and whether a new turn starts.
///
/// Unknown phases restart the cycle.
#[must_use]
pub fn next_phase(phase: &str) -> (&'static str, bool) {
    match PHASES.iter().position(|p| *p == phase) {
        Some(i) if i + 1 < PHASES.len() => (PHASES[i + 1], false),
        Some(_) => (PHASES[0], true),
        None => (PHASES[0], false),
    }
}

/// Move the state to the next phase, advancing the turn when the cycle wraps.
pub fn advance_phase(state: &mut GameState) {
    let (phase, new_turn) = next_phase(&state.phase);
    state.phase = phase.to_string();
    if new_turn {
        state.turn += 1;
        state.active_team = state.active_team.opponent();
    }
}
