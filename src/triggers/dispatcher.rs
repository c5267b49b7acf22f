//! Request-event dispatch.
//!
//! [`fire_request_event`] is the central loop: stamp the event, walk the
//! registered triggers in priority order, fire the eligible ones through the
//! effect applier. Effects may fire further events, which re-enter this
//! function; the depth counter, the causation chain and the executing set
//! together bound that recursion.
//!
//! A dispatch that pauses on a choice is not abandoned. The triggers it has
//! not reached are stored in the choice's continuation and
//! [`resume_request_event`] picks them up once the choice is answered.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::event::GameEvent;
use super::registry::{Trigger, TriggerId};
use crate::effects::{Effect, EffectContext, EffectResult, Pipeline};
use crate::engine::Engine;
use crate::error::Result;
use crate::expr::Outcome;
use crate::responses::PendingChoice;

/// Why an eligible-looking trigger did not run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Removed by an earlier trigger of the same dispatch.
    Unregistered,
    /// Its id is in the event's causation chain.
    InCausation,
    /// Its effect is already executing further up the stack.
    Executing,
}

/// What a fired trigger's effect did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectSummary {
    /// The effect vetoed the event.
    pub prevented: bool,
    /// Effects that took hold.
    pub applied: Vec<String>,
    /// Non-fatal failures.
    pub failed: Vec<String>,
    /// The effect paused on a choice.
    pub paused: bool,
}

impl From<&EffectResult> for EffectSummary {
    fn from(result: &EffectResult) -> Self {
        Self {
            prevented: result.prevented,
            applied: result.applied.clone(),
            failed: result.failed.clone(),
            paused: result.is_pending(),
        }
    }
}

/// Status of one trigger in a dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FiringStatus {
    /// Condition held; effect applied.
    Fired(EffectSummary),
    /// Not eligible.
    Skipped(SkipReason),
    /// Condition came out `Conflict` or `Open`.
    NotSatisfied(Outcome),
}

/// One entry of [`DispatchResult::results`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerFiring {
    /// Trigger id.
    pub trigger: TriggerId,
    /// Trigger name.
    pub name: String,
    /// Priority it ran at.
    pub priority: i32,
    /// What happened.
    pub status: FiringStatus,
}

impl TriggerFiring {
    /// Whether the trigger's effect ran.
    #[must_use]
    pub fn fired(&self) -> bool {
        matches!(self.status, FiringStatus::Fired(_))
    }
}

/// Outcome of dispatching one event.
#[derive(Clone, Debug)]
pub struct DispatchResult {
    /// Pipeline after every fired effect.
    pub pipeline: Pipeline,
    /// The event, with `occurrence_this_turn` stamped.
    pub event: GameEvent,
    /// One entry per candidate trigger, in the order considered.
    pub results: Vec<TriggerFiring>,
    /// Any fired effect vetoed the event.
    pub prevented: bool,
    /// A fired effect paused. Its continuation is an
    /// [`Effect::ResumeDispatch`] holding the triggers not yet considered.
    pub pending: Option<PendingChoice>,
}

impl DispatchResult {
    /// Ids of the triggers that fired, in firing order.
    pub fn fired(&self) -> impl Iterator<Item = TriggerId> + '_ {
        self.results.iter().filter(|r| r.fired()).map(|r| r.trigger)
    }

    /// Chain `next` behind this dispatch.
    ///
    /// When nothing paused, `next` is handed back for the caller to apply.
    /// When a trigger paused, `next` is stored in the pending continuation
    /// behind the remaining triggers, to run only if the resumed dispatch
    /// ends without a veto, and `None` is returned.
    pub fn then(&mut self, next: Effect) -> Option<Effect> {
        let Some(choice) = self.pending.as_mut() else {
            return Some(next);
        };
        if let Effect::ResumeDispatch { then, .. } = &mut choice.continuation {
            *then = Some(Box::new(next));
            self.pipeline.state.pending_choice = Some(choice.clone());
            return None;
        }
        suspend_dispatch(
            &mut self.pipeline,
            choice,
            &self.event,
            Vec::new(),
            self.prevented,
            Some(Box::new(next)),
        );
        None
    }
}

/// Dispatch a request event.
///
/// Response triggers are never fired here; they are surfaced through
/// [`crate::responses::find_matching_responses`]. A `once` trigger is
/// unregistered right after it fires.
///
/// If a fired effect pauses on a choice, the triggers not yet considered
/// are carried in the choice's continuation as an
/// [`Effect::ResumeDispatch`] and run once the choice is answered.
///
/// # Errors
///
/// [`crate::EngineError::DepthExceeded`] past the configured depth, and any
/// fatal error from condition evaluation or effect application. The whole
/// action is aborted in that case.
pub fn fire_request_event(
    engine: &Engine,
    mut pipeline: Pipeline,
    mut event: GameEvent,
) -> Result<DispatchResult> {
    let depth = pipeline.events.increment_depth()?;
    event.occurrence_this_turn = pipeline.events.increment_counter(pipeline.state.turn, &event);
    debug!(
        event_type = %event.event_type,
        team = ?event.team,
        depth,
        occurrence = event.occurrence_this_turn,
        "dispatching event"
    );

    let candidates: Vec<Trigger> = pipeline
        .registry
        .triggers_for_event(&event.event_type)
        .into_iter()
        .filter(|t| !t.response)
        .collect();
    let mut dispatch = dispatch_candidates(engine, pipeline, event, candidates, false)?;
    dispatch.pipeline.events.decrement_depth();
    Ok(dispatch)
}

/// Pick a paused dispatch back up at `remaining`.
///
/// The event is not stamped again. Triggers that left the registry while
/// the choice was pending are dropped; the others are re-checked against
/// the causation chain and the executing set as usual.
///
/// # Errors
///
/// As [`fire_request_event`].
pub fn resume_request_event(
    engine: &Engine,
    mut pipeline: Pipeline,
    event: GameEvent,
    remaining: &[TriggerId],
    prevented: bool,
) -> Result<DispatchResult> {
    let depth = pipeline.events.increment_depth()?;
    let candidates: Vec<Trigger> = remaining
        .iter()
        .filter_map(|id| pipeline.registry.get(*id).cloned())
        .collect();
    debug!(
        event_type = %event.event_type,
        depth,
        remaining = candidates.len(),
        prevented,
        "resuming dispatch"
    );
    let mut dispatch = dispatch_candidates(engine, pipeline, event, candidates, prevented)?;
    dispatch.pipeline.events.decrement_depth();
    Ok(dispatch)
}

/// Wrap a paused choice's continuation in a [`Effect::ResumeDispatch`] and
/// store the choice back in the state.
pub(crate) fn suspend_dispatch(
    pipeline: &mut Pipeline,
    choice: &mut PendingChoice,
    event: &GameEvent,
    remaining: Vec<TriggerId>,
    prevented: bool,
    then: Option<Box<Effect>>,
) {
    let paused = std::mem::replace(&mut choice.continuation, Effect::Noop);
    choice.continuation = Effect::ResumeDispatch {
        paused: Box::new(paused),
        event: event.clone(),
        remaining,
        prevented,
        then,
    };
    pipeline.state.pending_choice = Some(choice.clone());
}

fn dispatch_candidates(
    engine: &Engine,
    mut pipeline: Pipeline,
    event: GameEvent,
    candidates: Vec<Trigger>,
    mut prevented: bool,
) -> Result<DispatchResult> {
    let mut results = Vec::with_capacity(candidates.len());
    let mut pending = None;
    let mut candidates = candidates.into_iter();

    while let Some(trigger) = candidates.next() {
        let status = if !pipeline.registry.contains(trigger.id) {
            FiringStatus::Skipped(SkipReason::Unregistered)
        } else if !pipeline.events.can_trigger_fire(&trigger, &event) {
            FiringStatus::Skipped(if event.caused_by(trigger.id) {
                SkipReason::InCausation
            } else {
                SkipReason::Executing
            })
        } else {
            let ctx = EffectContext::for_trigger(trigger.id, trigger.bindings, &event);
            let outcome = match &trigger.condition {
                Some(condition) => engine.evaluate(condition, &ctx.document(&pipeline.state))?,
                None => Outcome::Satisfied,
            };
            if outcome.is_satisfied() {
                pipeline.events.lock_trigger(trigger.id);
                let effect = engine.apply_effect(pipeline, &trigger.effect, &ctx)?;
                let summary = EffectSummary::from(&effect);
                pipeline = effect.pipeline;
                pipeline.events.unlock_trigger(trigger.id);
                if trigger.once {
                    pipeline.registry.unregister(trigger.id);
                }
                prevented |= effect.prevented;
                pending = effect.pending;
                FiringStatus::Fired(summary)
            } else {
                FiringStatus::NotSatisfied(outcome)
            }
        };

        trace!(
            trigger = %trigger.id,
            name = %trigger.name,
            priority = trigger.priority,
            status = ?status,
            "trigger considered"
        );
        results.push(TriggerFiring {
            trigger: trigger.id,
            name: trigger.name,
            priority: trigger.priority,
            status,
        });

        if let Some(choice) = pending.as_mut() {
            let remaining: Vec<TriggerId> = candidates.by_ref().map(|t| t.id).collect();
            debug!(
                event_type = %event.event_type,
                trigger = %trigger.id,
                remaining = remaining.len(),
                "dispatch paused"
            );
            suspend_dispatch(&mut pipeline, choice, &event, remaining, prevented, None);
            break;
        }
    }

    Ok(DispatchResult {
        pipeline,
        event,
        results,
        prevented,
        pending,
    })
}
