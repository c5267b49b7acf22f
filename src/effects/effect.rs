//! Effect definitions.
//!
//! Effects are plain serializable data. Composite effects nest, which makes
//! an effect tree double as a continuation: a paused chain is just the
//! remaining tree, stored in the pending choice and persisted with the state.
//!
//! ## Control Effects
//!
//! - `Noop`, `Sequence`, `When`, `Bind`
//! - `Prevent`: veto the event being dispatched
//! - `FireEvent`: emit a nested request event
//! - `OfferChoice`: pause for a player decision
//! - `ApplyResponse`: reveal a response asset and apply its effect
//! - `ResumeDispatch`: finish a dispatch that paused on a choice
//!
//! ## Terminal Effects
//!
//! Only these mutate authoritative state:
//! - `RevealAsset`, `SkillTest`, `ModifyScore`, `ModifyStat`
//! - `SetPhase`, `AdvancePhase`
//! - the pending-choice write of `OfferChoice`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::EntityId;
use crate::expr::Expr;
use crate::rules::AdvantageSource;
use crate::triggers::{EventType, GameEvent, TriggerId};

/// An effect descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    // === Control ===

    /// Do nothing.
    Noop,

    /// Apply effects in order, stopping at the first pause.
    Sequence(Vec<Effect>),

    /// Veto the event currently being dispatched.
    Prevent {
        /// Why (for logs and results).
        reason: String,
    },

    /// Fire a nested request event. Causation is inherited from the context.
    FireEvent {
        /// Type of the new event.
        event_type: EventType,
        /// Acting team, if any.
        team: Option<Expr>,
        /// Payload fields, evaluated against the current document.
        fields: BTreeMap<String, Expr>,
    },

    /// Branch on a condition. Only `Satisfied` takes the `then` branch.
    When {
        /// Condition.
        condition: Expr,
        /// Applied when satisfied.
        then: Box<Effect>,
        /// Applied otherwise.
        otherwise: Box<Effect>,
    },

    /// Evaluate a value and bind it as a variable for the inner effect.
    Bind {
        /// Variable name, readable as a top-level document path.
        name: String,
        /// Value to bind.
        value: Expr,
        /// Inner effect.
        then: Box<Effect>,
    },

    /// Pause for a player decision. On submission the selection is bound as
    /// `selection` and `continuation` is applied.
    OfferChoice {
        /// Kind of choice (`response`, ...).
        choice_type: String,
        /// Allowed selections.
        options: Vec<String>,
        /// Team that must answer.
        waiting_for: Expr,
        /// Extra data shown with the prompt.
        details: BTreeMap<String, Expr>,
        /// Applied once the choice is answered.
        continuation: Box<Effect>,
    },

    /// Reveal a response asset and apply its response effect on behalf of
    /// the asset.
    ApplyResponse {
        /// The response asset.
        asset: EntityId,
        /// Prompt that was shown.
        prompt: String,
        /// The response effect.
        effect: Box<Effect>,
    },

    /// The unfinished part of a dispatch that paused on a choice. Built by
    /// the dispatcher around the paused trigger's continuation; card content
    /// does not write it.
    ResumeDispatch {
        /// Rest of the paused trigger's effect.
        paused: Box<Effect>,
        /// The event being dispatched, already stamped.
        event: GameEvent,
        /// Triggers not yet considered, in firing order.
        remaining: Vec<TriggerId>,
        /// Veto collected before the pause.
        prevented: bool,
        /// Rest of the action the event requests. Skipped when the event
        /// ends up vetoed, and the veto is then reported.
        then: Option<Box<Effect>>,
    },

    // === Terminal ===

    /// Turn an asset face up.
    RevealAsset {
        /// Asset to reveal.
        asset: Expr,
    },

    /// Run a skill test and record the result in the state.
    SkillTest {
        /// Tested player.
        actor: Expr,
        /// Stat to test.
        stat: String,
        /// Advantage sources.
        sources: Vec<AdvantageSource>,
    },

    /// Add points to a team.
    ModifyScore {
        /// Scoring team.
        team: Expr,
        /// Points (may be negative).
        amount: Expr,
    },

    /// Change a player's stat.
    ModifyStat {
        /// Affected player.
        player: Expr,
        /// Stat name.
        stat: String,
        /// Delta.
        amount: Expr,
    },

    /// Jump to a named phase.
    SetPhase {
        /// Target phase.
        phase: String,
    },

    /// Move to the next phase, wrapping into a new turn.
    AdvancePhase,
}

impl Effect {
    /// Veto effect.
    pub fn prevent(reason: impl Into<String>) -> Self {
        Self::Prevent {
            reason: reason.into(),
        }
    }

    /// Fire an event with no team and no fields.
    pub fn fire(event_type: impl Into<EventType>) -> Self {
        Self::FireEvent {
            event_type: event_type.into(),
            team: None,
            fields: BTreeMap::new(),
        }
    }

    /// Branch with no `otherwise`.
    pub fn when(condition: Expr, then: Effect) -> Self {
        Self::When {
            condition,
            then: Box::new(then),
            otherwise: Box::new(Effect::Noop),
        }
    }

    /// Add a literal number of points.
    pub fn modify_score(team: Expr, amount: i64) -> Self {
        Self::ModifyScore {
            team,
            amount: Expr::lit(amount),
        }
    }

    /// Change a stat by a literal delta.
    pub fn modify_stat(player: Expr, stat: impl Into<String>, amount: i64) -> Self {
        Self::ModifyStat {
            player,
            stat: stat.into(),
            amount: Expr::lit(amount),
        }
    }

    /// Set the team of a `FireEvent` (builder pattern). No-op on other effects.
    #[must_use]
    pub fn with_team(mut self, team_expr: Expr) -> Self {
        if let Self::FireEvent { team, .. } = &mut self {
            *team = Some(team_expr);
        }
        self
    }

    /// Add a field to a `FireEvent` (builder pattern). No-op on other effects.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Expr) -> Self {
        if let Self::FireEvent { fields, .. } = &mut self {
            fields.insert(key.into(), value);
        }
        self
    }

    /// Short tag for logs and result lists.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Effect::Noop => "noop",
            Effect::Sequence(_) => "sequence",
            Effect::Prevent { .. } => "prevent",
            Effect::FireEvent { .. } => "fire-event",
            Effect::When { .. } => "when",
            Effect::Bind { .. } => "bind",
            Effect::OfferChoice { .. } => "offer-choice",
            Effect::ApplyResponse { .. } => "apply-response",
            Effect::ResumeDispatch { .. } => "resume-dispatch",
            Effect::RevealAsset { .. } => "reveal-asset",
            Effect::SkillTest { .. } => "skill-test",
            Effect::ModifyScore { .. } => "modify-score",
            Effect::ModifyStat { .. } => "modify-stat",
            Effect::SetPhase { .. } => "set-phase",
            Effect::AdvancePhase => "advance-phase",
        }
    }

    /// Whether this effect mutates authoritative state directly.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Effect::RevealAsset { .. }
                | Effect::SkillTest { .. }
                | Effect::ModifyScore { .. }
                | Effect::ModifyStat { .. }
                | Effect::SetPhase { .. }
                | Effect::AdvancePhase
        )
    }
}
