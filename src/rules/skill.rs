//! Skill tests.
//!
//! A skill test pits an effective stat against a fate draw:
//!
//! 1. Every advantage source contributes a signed step in `[-2, 2]`; the sum
//!    is clamped back into that range ([`combine_advantage_sources`]).
//! 2. Net advantage decides how many values are drawn from `1..=8` and
//!    whether the best, worst or single value is kept ([`select_fate`]).
//! 3. Difficulty is `8 - stat` ([`compute_difficulty`]); the test succeeds
//!    when the kept value is at least the difficulty. A margin of 2 or more
//!    grants a bonus.
//!
//! ```
//! use court_engine::rules::{combine_advantage_sources, Advantage, AdvantageSource};
//!
//! let net = combine_advantage_sources(&[
//!     AdvantageSource::new("close range", Advantage::Advantage),
//!     AdvantageSource::new("tall defender", Advantage::DoubleDisadvantage),
//! ]);
//! assert_eq!(net, Advantage::Disadvantage);
//! ```

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameRng};
use crate::expr::Value;

/// Lowest fate value.
pub const FATE_MIN: i64 = 1;

/// Highest fate value.
pub const FATE_MAX: i64 = 8;

/// Margin over difficulty that grants a bonus.
pub const BONUS_MARGIN: i64 = 2;

/// Net advantage on a skill test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Advantage {
    /// Three draws, keep the worst.
    DoubleDisadvantage,
    /// Two draws, keep the worst.
    Disadvantage,
    /// One draw.
    #[default]
    Neutral,
    /// Two draws, keep the best.
    Advantage,
    /// Three draws, keep the best.
    DoubleAdvantage,
}

impl Advantage {
    /// Signed step in `[-2, 2]`.
    #[must_use]
    pub const fn step(self) -> i64 {
        match self {
            Advantage::DoubleDisadvantage => -2,
            Advantage::Disadvantage => -1,
            Advantage::Neutral => 0,
            Advantage::Advantage => 1,
            Advantage::DoubleAdvantage => 2,
        }
    }

    /// Map a step back to an advantage, clamping into `[-2, 2]`.
    #[must_use]
    pub fn from_step(step: i64) -> Self {
        match step.clamp(-2, 2) {
            -2 => Advantage::DoubleDisadvantage,
            -1 => Advantage::Disadvantage,
            0 => Advantage::Neutral,
            1 => Advantage::Advantage,
            _ => Advantage::DoubleAdvantage,
        }
    }

    /// Number of fate values drawn.
    #[must_use]
    pub const fn draw_count(self) -> usize {
        match self {
            Advantage::Neutral => 1,
            Advantage::Advantage | Advantage::Disadvantage => 2,
            Advantage::DoubleAdvantage | Advantage::DoubleDisadvantage => 3,
        }
    }
}

/// One contribution to net advantage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvantageSource {
    /// What grants it (for display and logs).
    pub source: String,
    /// The contribution.
    pub advantage: Advantage,
}

impl AdvantageSource {
    /// Create a source.
    pub fn new(source: impl Into<String>, advantage: Advantage) -> Self {
        Self {
            source: source.into(),
            advantage,
        }
    }
}

/// Sum all sources and clamp.
#[must_use]
pub fn combine_advantage_sources(sources: &[AdvantageSource]) -> Advantage {
    Advantage::from_step(sources.iter().map(|s| s.advantage.step()).sum())
}

/// Difficulty for an effective stat.
#[must_use]
pub const fn compute_difficulty(stat: i64) -> i64 {
    FATE_MAX - stat
}

/// Pick the kept value from the drawn ones: best with advantage, worst
/// with disadvantage, the first draw otherwise.
///
/// Returns `None` when nothing was drawn.
#[must_use]
pub fn select_fate(advantage: Advantage, draws: &[i64]) -> Option<i64> {
    match advantage.step() {
        s if s > 0 => draws.iter().copied().max(),
        s if s < 0 => draws.iter().copied().min(),
        _ => draws.first().copied(),
    }
}

/// Advantage from shot distance: point blank is easier, deep range harder.
#[must_use]
pub fn distance_advantage(distance: i64) -> Option<AdvantageSource> {
    match distance {
        d if d <= 1 => Some(AdvantageSource::new("point blank", Advantage::Advantage)),
        d if d >= 7 => Some(AdvantageSource::new("deep range", Advantage::Disadvantage)),
        _ => None,
    }
}

/// Advantage from relative size: two or more classes of difference count.
#[must_use]
pub fn size_advantage(actor_size: i64, opponent_size: i64) -> Option<AdvantageSource> {
    match actor_size - opponent_size {
        d if d >= 2 => Some(AdvantageSource::new("size mismatch", Advantage::Advantage)),
        d if d <= -2 => Some(AdvantageSource::new("outsized", Advantage::Disadvantage)),
        _ => None,
    }
}

/// Outcome of a resolved skill test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTestResult {
    /// Tested entity.
    pub actor: EntityId,
    /// Stat used.
    pub stat: String,
    /// Difficulty faced.
    pub difficulty: i64,
    /// Net advantage.
    pub advantage: Advantage,
    /// Every value drawn.
    pub draws: Vec<i64>,
    /// Kept value.
    pub fate: i64,
    /// Kept value reached the difficulty.
    pub success: bool,
    /// Success with a margin of at least [`BONUS_MARGIN`].
    pub bonus: bool,
}

impl SkillTestResult {
    /// Kept value minus difficulty.
    #[must_use]
    pub fn margin(&self) -> i64 {
        self.fate - self.difficulty
    }

    /// Render for documents (`skill_test.success`, ...).
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::map([
            ("actor", Value::from(self.actor)),
            ("stat", Value::from(self.stat.as_str())),
            ("difficulty", Value::Int(self.difficulty)),
            ("fate", Value::Int(self.fate)),
            ("margin", Value::Int(self.margin())),
            ("success", Value::Bool(self.success)),
            ("bonus", Value::Bool(self.bonus)),
        ])
    }
}

/// Run a skill test with the game RNG.
pub fn resolve_skill_test(
    rng: &mut GameRng,
    actor: EntityId,
    stat: &str,
    stat_value: i64,
    sources: &[AdvantageSource],
) -> SkillTestResult {
    let advantage = combine_advantage_sources(sources);
    let draws: Vec<i64> = (0..advantage.draw_count())
        .map(|_| rng.gen_inclusive(FATE_MIN, FATE_MAX))
        .collect();
    let fate = select_fate(advantage, &draws).unwrap_or(FATE_MIN);
    let difficulty = compute_difficulty(stat_value);
    let success = fate >= difficulty;
    SkillTestResult {
        actor,
        stat: stat.to_string(),
        difficulty,
        advantage,
        draws,
        fate,
        success,
        bonus: success && fate - difficulty >= BONUS_MARGIN,
    }
}
