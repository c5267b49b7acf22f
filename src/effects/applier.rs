//! Effect application.
//!
//! The dispatcher never interprets effects; it hands them to an
//! [`EffectApplier`]. [`StandardApplier`] implements the crate's effect
//! vocabulary.
//!
//! ## Failure Modes
//!
//! - A target that evaluates to `Null`, or names an entity that is not in
//!   the game, is recorded in [`EffectResult::failed`] and application
//!   continues.
//! - A value of the wrong shape, an unknown function, or the recursion
//!   guard aborts with an error.
//!
//! ## Pausing
//!
//! `OfferChoice` writes the pending choice and returns a pending result.
//! `Sequence` stops at the first pending member and folds the remaining
//! members into the pending choice's continuation, so nothing of the paused
//! chain lives outside the state. A dispatch that pauses leaves an
//! `Effect::ResumeDispatch` at the root of the continuation, so the
//! triggers it had not reached yet and the rest of the action it gates
//! run once the choice is answered.

use std::collections::BTreeMap;

use tracing::{debug, info, trace};

use super::context::EffectContext;
use super::effect::Effect;
use super::pipeline::{EffectResult, Pipeline};
use crate::core::{EntityId, Team};
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::expr::{Expr, Value};
use crate::responses::PendingChoice;
use crate::rules::{advance_phase, resolve_skill_test};
use crate::triggers::{suspend_dispatch, GameEvent, TriggerBindings};

/// Applies effect trees to a pipeline.
///
/// Implementations receive the engine so effects can re-enter dispatch
/// through [`Engine::fire_request_event`] and nested effects through
/// [`Engine::apply_effect`].
pub trait EffectApplier: Send + Sync {
    /// Apply `effect` in `ctx`.
    ///
    /// # Errors
    ///
    /// Fatal conditions only: recursion overflow, unknown functions, type
    /// mismatches, a second pending choice.
    fn apply(
        &self,
        engine: &Engine,
        pipeline: Pipeline,
        effect: &Effect,
        ctx: &EffectContext,
    ) -> Result<EffectResult>;
}

/// The built-in effect vocabulary.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardApplier;

impl EffectApplier for StandardApplier {
    fn apply(
        &self,
        engine: &Engine,
        pipeline: Pipeline,
        effect: &Effect,
        ctx: &EffectContext,
    ) -> Result<EffectResult> {
        trace!(effect = effect.kind(), trigger = ?ctx.trigger, "applying effect");
        let mut result = EffectResult::new(pipeline);

        match effect {
            // === Control ===
            Effect::Noop => {}

            Effect::Sequence(effects) => {
                for (i, member) in effects.iter().enumerate() {
                    let pipeline = std::mem::take(&mut result.pipeline);
                    result.absorb(engine.apply_effect(pipeline, member, ctx)?);
                    if result.is_pending() {
                        splice_remaining(&mut result, &effects[i + 1..]);
                        break;
                    }
                }
            }

            Effect::Prevent { reason } => {
                debug!(reason = %reason, trigger = ?ctx.trigger, "event prevented");
                result.prevented = true;
                result.applied.push(format!("prevent: {reason}"));
            }

            Effect::FireEvent {
                event_type,
                team,
                fields,
            } => {
                let doc = ctx.document(&result.pipeline.state);
                let team = match team {
                    Some(expr) => team_target(&engine.eval_value(expr, &doc)?)?,
                    None => None,
                };
                let mut event = GameEvent::new(event_type.clone()).with_causation(ctx.causation.clone());
                event.team = team;
                for (key, expr) in fields {
                    event.payload.insert(key.clone(), engine.eval_value(expr, &doc)?);
                }

                let pipeline = std::mem::take(&mut result.pipeline);
                let dispatch = engine.fire_request_event(pipeline, event)?;
                result.pipeline = dispatch.pipeline;
                // A veto applies to the nested event, not to the one this
                // effect answers.
                result.applied.push(if dispatch.prevented {
                    format!("fire-event: {event_type} (prevented)")
                } else {
                    format!("fire-event: {event_type}")
                });
                result.pending = dispatch.pending;
            }

            Effect::When {
                condition,
                then,
                otherwise,
            } => {
                let doc = ctx.document(&result.pipeline.state);
                let branch = if engine.evaluate(condition, &doc)?.is_satisfied() {
                    then
                } else {
                    otherwise
                };
                let pipeline = std::mem::take(&mut result.pipeline);
                result.absorb(engine.apply_effect(pipeline, branch, ctx)?);
            }

            Effect::Bind { name, value, then } => {
                let doc = ctx.document(&result.pipeline.state);
                let value = engine.eval_value(value, &doc)?;
                let child = ctx.clone().with_var(name.clone(), value);
                let pipeline = std::mem::take(&mut result.pipeline);
                result.absorb(engine.apply_effect(pipeline, then, &child)?);
            }

            Effect::OfferChoice {
                choice_type,
                options,
                waiting_for,
                details,
                continuation,
            } => {
                let state = &mut result.pipeline.state;
                if let Some(existing) = &state.pending_choice {
                    return Err(EngineError::ChoiceAlreadyPending {
                        existing: existing.id,
                    });
                }
                let doc = ctx.document(state);
                let waiting = engine.eval_value(waiting_for, &doc)?;
                let waiting_for = team_target(&waiting)?.ok_or_else(|| EngineError::TypeMismatch {
                    expected: "team",
                    found: waiting.type_name().to_string(),
                })?;
                let details: BTreeMap<String, Value> = details
                    .iter()
                    .map(|(k, expr)| Ok((k.clone(), engine.eval_value(expr, &doc)?)))
                    .collect::<Result<_>>()?;

                let choice = PendingChoice {
                    id: state.alloc_choice(),
                    choice_type: choice_type.clone(),
                    options: options.clone(),
                    waiting_for,
                    details,
                    context: ctx.clone(),
                    continuation: (**continuation).clone(),
                };
                info!(
                    choice = %choice.id,
                    choice_type = %choice.choice_type,
                    waiting_for = %waiting_for,
                    "choice offered"
                );
                state.pending_choice = Some(choice.clone());
                result.applied.push(effect.kind().to_string());
                result.pending = Some(choice);
            }

            Effect::ApplyResponse {
                asset,
                prompt,
                effect: response,
            } => {
                let Some(card) = result.pipeline.state.card_mut(*asset) else {
                    result.failed.push(format!("apply-response: unknown asset {asset}"));
                    return Ok(result);
                };
                card.face_down = false;
                let team = card.team;
                info!(asset = %asset, prompt = %prompt, "response applied");
                result.applied.push(effect.kind().to_string());

                let child = EffectContext {
                    bindings: TriggerBindings::entity(*asset, team),
                    ..ctx.clone()
                };
                let pipeline = std::mem::take(&mut result.pipeline);
                result.absorb(engine.apply_effect(pipeline, response, &child)?);
            }

            Effect::ResumeDispatch {
                paused,
                event,
                remaining,
                prevented,
                then,
            } => {
                let pipeline = std::mem::take(&mut result.pipeline);
                let inner = engine.apply_effect(pipeline, paused, ctx)?;
                // The paused trigger's veto answers the dispatched event, not
                // whatever this continuation sits in.
                let prevented = *prevented || inner.prevented;
                result.pipeline = inner.pipeline;
                result.applied.extend(inner.applied);
                result.failed.extend(inner.failed);
                if let Some(mut choice) = inner.pending {
                    suspend_dispatch(
                        &mut result.pipeline,
                        &mut choice,
                        event,
                        remaining.clone(),
                        prevented,
                        then.clone(),
                    );
                    result.pending = Some(choice);
                    return Ok(result);
                }

                let pipeline = std::mem::take(&mut result.pipeline);
                let mut dispatch = engine.resume_request_event(pipeline, event.clone(), remaining, prevented)?;
                result.applied.push(format!("{}: {}", effect.kind(), event.event_type));
                if dispatch.pending.is_some() {
                    // Paused again: the new resume node takes over the gate.
                    if let Some(next) = then {
                        dispatch.then((**next).clone());
                    }
                    result.pipeline = dispatch.pipeline;
                    result.pending = dispatch.pending;
                    return Ok(result);
                }

                result.pipeline = dispatch.pipeline;
                let Some(then) = then else {
                    return Ok(result);
                };
                if dispatch.prevented {
                    debug!(event_type = %event.event_type, "resumed event prevented");
                    result.prevented = true;
                    return Ok(result);
                }
                let child = EffectContext::new().with_event(dispatch.event);
                let pipeline = std::mem::take(&mut result.pipeline);
                result.absorb(engine.apply_effect(pipeline, then, &child)?);
            }

            // === Terminal ===
            Effect::RevealAsset { asset } => {
                let Some(id) = resolve_entity(engine, &result.pipeline, asset, ctx)? else {
                    result.failed.push("reveal-asset: no target".to_string());
                    return Ok(result);
                };
                match result.pipeline.state.card_mut(id) {
                    Some(card) => {
                        card.face_down = false;
                        result.applied.push(effect.kind().to_string());
                    }
                    None => result.failed.push(format!("reveal-asset: unknown card {id}")),
                }
            }

            Effect::SkillTest {
                actor,
                stat,
                sources,
            } => {
                let Some(id) = resolve_entity(engine, &result.pipeline, actor, ctx)? else {
                    result.failed.push("skill-test: no actor".to_string());
                    return Ok(result);
                };
                let state = &mut result.pipeline.state;
                let Some(stat_value) = state.player(id).map(|p| p.stat(stat)) else {
                    result.failed.push(format!("skill-test: unknown player {id}"));
                    return Ok(result);
                };
                let test = state.with_rng(|rng| resolve_skill_test(rng, id, stat, stat_value, sources));
                debug!(
                    actor = %id,
                    stat = %stat,
                    difficulty = test.difficulty,
                    fate = test.fate,
                    success = test.success,
                    "skill test resolved"
                );
                state.last_skill_test = Some(test);
                result.applied.push(effect.kind().to_string());
            }

            Effect::ModifyScore { team, amount } => {
                let doc = ctx.document(&result.pipeline.state);
                let team = team_target(&engine.eval_value(team, &doc)?)?;
                let amount = int_value(&engine.eval_value(amount, &doc)?)?;
                match (team, amount) {
                    (Some(team), Some(amount)) => {
                        let score = &mut result.pipeline.state.teams[team].score;
                        *score = score.saturating_add(amount);
                        debug!(team = %team, amount, "score changed");
                        result.applied.push(effect.kind().to_string());
                    }
                    _ => result.failed.push("modify-score: no target".to_string()),
                }
            }

            Effect::ModifyStat {
                player,
                stat,
                amount,
            } => {
                let doc = ctx.document(&result.pipeline.state);
                let id = entity_target(&engine.eval_value(player, &doc)?)?;
                let amount = int_value(&engine.eval_value(amount, &doc)?)?;
                let player = id.and_then(|id| result.pipeline.state.player_mut(id));
                match (player, amount) {
                    (Some(p), Some(amount)) => {
                        let value = p.stats.entry(stat.clone()).or_insert(0);
                        *value = value.saturating_add(amount);
                        result.applied.push(effect.kind().to_string());
                    }
                    _ => result.failed.push(format!("modify-stat: no target for {stat}")),
                }
            }

            Effect::SetPhase { phase } => {
                result.pipeline.state.phase = phase.clone();
                result.applied.push(effect.kind().to_string());
            }

            Effect::AdvancePhase => {
                advance_phase(&mut result.pipeline.state);
                debug!(
                    turn = result.pipeline.state.turn,
                    phase = %result.pipeline.state.phase,
                    "phase advanced"
                );
                result.applied.push(effect.kind().to_string());
            }
        }

        Ok(result)
    }
}

/// Fold the members after a paused one into the pending continuation.
fn splice_remaining(result: &mut EffectResult, rest: &[Effect]) {
    if rest.is_empty() {
        return;
    }
    let Some(pending) = result.pending.as_mut() else {
        return;
    };
    let mut members = Vec::with_capacity(rest.len() + 1);
    members.push(std::mem::replace(&mut pending.continuation, Effect::Noop));
    members.extend(rest.iter().cloned());
    pending.continuation = Effect::Sequence(members);
    result.pipeline.state.pending_choice = Some(pending.clone());
}

fn resolve_entity(
    engine: &Engine,
    pipeline: &Pipeline,
    expr: &Expr,
    ctx: &EffectContext,
) -> Result<Option<EntityId>> {
    let doc = ctx.document(&pipeline.state);
    entity_target(&engine.eval_value(expr, &doc)?)
}

/// An entity is named by its id or by its document map.
fn entity_target(value: &Value) -> Result<Option<EntityId>> {
    match value {
        Value::Null => Ok(None),
        Value::Int(_) => Ok(value.as_entity()),
        Value::Map(m) => Ok(m.get("id").and_then(Value::as_entity)),
        other => Err(EngineError::TypeMismatch {
            expected: "entity",
            found: other.type_name().to_string(),
        }),
    }
}

fn team_target(value: &Value) -> Result<Option<Team>> {
    match value {
        Value::Null => Ok(None),
        Value::Text(tag) => Team::parse(tag).map(Some).ok_or_else(|| EngineError::TypeMismatch {
            expected: "team",
            found: format!("text {tag:?}"),
        }),
        other => Err(EngineError::TypeMismatch {
            expected: "team",
            found: other.type_name().to_string(),
        }),
    }
}

fn int_value(value: &Value) -> Result<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Int(v) => Ok(Some(*v)),
        other => Err(EngineError::TypeMismatch {
            expected: "int",
            found: other.type_name().to_string(),
        }),
    }
}
