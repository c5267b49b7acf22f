//! Rule content consumed by the trigger core.
//!
//! Everything here is pure data or pure functions: skill-test math, phase
//! progression, and the default catch-all rules. The core never hardcodes a
//! rule; it only registers these like any other trigger.

pub mod defaults;
pub mod phases;
pub mod skill;

pub use defaults::{default_rules, scoring_rule, SCORING_RULE};
pub use phases::{advance_phase, next_phase, PHASES};
pub use skill::{
    combine_advantage_sources, compute_difficulty, distance_advantage, resolve_skill_test,
    select_fate, size_advantage, Advantage, AdvantageSource, SkillTestResult, BONUS_MARGIN,
    FATE_MAX, FATE_MIN,
};
