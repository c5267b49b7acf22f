//! Action orchestration.
//!
//! [`GameDriver`] turns a [`GameAction`] into events and effects:
//!
//! | Action | Flow |
//! |---|---|
//! | `Shoot` | before-event, opponent responses, skill test, after-event |
//! | `EndPhase` | phase-end request, phase advance unless prevented |
//! | others | direct state change |
//!
//! Every action ends by syncing the registry with the new state. An action
//! that fails leaves the session untouched.

use tracing::{debug, info};

use super::game::GameSession;
use crate::cards::EffectCatalog;
use crate::core::{CardZone, EntityId, GameAction, GameState, Team};
use crate::effects::{Effect, EffectContext, EffectResult, Pipeline};
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::expr::Expr;
use crate::responses::{build_response_chain, find_matching_responses, ChoiceId, PendingChoice};
use crate::rules::{distance_advantage, size_advantage};
use crate::triggers::{
    initialize_game_triggers, reconcile_registry, update_registry_for_action, DispatchResult, GameEvent,
    PHASE_END_REQUEST, STANDARD_ACTION_AFTER, STANDARD_ACTION_BEFORE,
};

/// Stat a shot is tested against.
pub const SHOOTING_STAT: &str = "shooting";

/// What an action or a choice submission did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// The action's request event was vetoed.
    pub prevented: bool,
    /// Top-level events the driver fired, stamped.
    pub events: Vec<GameEvent>,
    /// Effects that took hold.
    pub applied: Vec<String>,
    /// Non-fatal failures.
    pub failed: Vec<String>,
    /// The choice the session now waits on.
    pub pending: Option<PendingChoice>,
}

impl ActionOutcome {
    fn record(&mut self, result: EffectResult) -> Pipeline {
        self.applied.extend(result.applied);
        self.failed.extend(result.failed);
        self.pending = result.pending;
        result.pipeline
    }
}

/// Drives sessions with one engine and one catalog.
#[derive(Debug)]
pub struct GameDriver<C: EffectCatalog> {
    engine: Engine,
    catalog: C,
}

impl<C: EffectCatalog> GameDriver<C> {
    /// Create a driver.
    pub fn new(engine: Engine, catalog: C) -> Self {
        Self { engine, catalog }
    }

    /// The engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The catalog.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Start a session on `state` with a freshly built registry.
    pub fn new_session(&self, state: GameState) -> GameSession {
        let registry = initialize_game_triggers(self.engine.config(), &state, &self.catalog);
        GameSession::new(state, registry)
    }

    /// Start a session on an empty game seeded from the engine config.
    pub fn new_game(&self) -> GameSession {
        self.new_session(GameState::from_config(self.engine.config()))
    }

    /// Resolve an action.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidAction`] while a choice is pending, or for an
    ///   action the state does not allow.
    /// - [`EngineError::UnknownEntity`] for missing players or cards.
    /// - Any fatal dispatch error. The session is unchanged on error.
    pub fn perform(&self, session: &mut GameSession, action: GameAction) -> Result<ActionOutcome> {
        if let Some(choice) = session.pending_choice() {
            return Err(EngineError::invalid_action(format!(
                "{} is waiting for {}",
                choice.id, choice.waiting_for
            )));
        }
        info!(action = action.kind(), turn = session.state.turn, phase = %session.state.phase, "performing action");

        let pipeline = self.engine.pipeline(
            session.state.clone(),
            session.registry.clone(),
            session.counters.clone(),
        );
        let (mut pipeline, outcome) = match &action {
            GameAction::Shoot { shooter, distance } => self.shoot(pipeline, *shooter, *distance)?,
            GameAction::EndPhase { team } => self.end_phase(pipeline, *team)?,
            other => {
                let mut pipeline = pipeline;
                self.apply_direct(&mut pipeline.state, other)?;
                let outcome = ActionOutcome {
                    applied: vec![other.kind().to_string()],
                    ..ActionOutcome::default()
                };
                (pipeline, outcome)
            }
        };

        update_registry_for_action(
            &mut pipeline.registry,
            &self.catalog,
            &session.state,
            &pipeline.state,
            &action,
        );
        session.commit(pipeline);
        Ok(outcome)
    }

    /// Answer the session's pending choice and resume the paused chain.
    ///
    /// # Errors
    ///
    /// Unknown or already answered choice, invalid selection, fatal effect
    /// errors. The session is unchanged on error.
    pub fn submit_choice(
        &self,
        session: &mut GameSession,
        id: ChoiceId,
        selection: &str,
    ) -> Result<ActionOutcome> {
        let pipeline = self.engine.pipeline(
            session.state.clone(),
            session.registry.clone(),
            session.counters.clone(),
        );
        let result = self.engine.submit_choice(pipeline, id, selection)?;

        let mut outcome = ActionOutcome {
            prevented: result.prevented,
            ..ActionOutcome::default()
        };
        let mut pipeline = outcome.record(result);
        reconcile_registry(&mut pipeline.registry, &self.catalog, &session.state, &pipeline.state);
        session.commit(pipeline);
        Ok(outcome)
    }

    // === Standard Actions ===

    fn shoot(&self, pipeline: Pipeline, shooter: EntityId, distance: i64) -> Result<(Pipeline, ActionOutcome)> {
        let state = &pipeline.state;
        let player = state.player(shooter).ok_or(EngineError::UnknownEntity(shooter))?;
        if !state.is_on_court(shooter) {
            return Err(EngineError::invalid_action(format!("{shooter} is not on court")));
        }
        let team = player.team;
        let defending = team.opponent();

        let mut sources: Vec<_> = distance_advantage(distance).into_iter().collect();
        let tallest_defender = state
            .teams[defending]
            .on_court
            .iter()
            .filter_map(|id| state.player(*id))
            .map(|p| p.size)
            .max();
        if let Some(size) = tallest_defender {
            sources.extend(size_advantage(player.size, size));
        }

        let terminal = Effect::Sequence(vec![
            Effect::SkillTest {
                actor: Expr::lit(shooter),
                stat: SHOOTING_STAT.to_string(),
                sources,
            },
            Effect::fire(STANDARD_ACTION_AFTER)
                .with_team(Expr::lit(team))
                .with_field("action", Expr::lit("shoot"))
                .with_field("actor", Expr::lit(shooter))
                .with_field("distance", Expr::lit(distance))
                .with_field("success", Expr::path("skill_test.success"))
                .with_field("bonus", Expr::path("skill_test.bonus")),
        ]);

        let before = GameEvent::for_team(STANDARD_ACTION_BEFORE, team)
            .with_field("action", "shoot")
            .with_field("actor", shooter)
            .with_field("distance", distance);
        let dispatch = self.engine.fire_request_event(pipeline, before)?;
        let mut outcome = ActionOutcome::default();
        outcome.events.push(dispatch.event.clone());
        if dispatch.prevented {
            debug!(shooter = %shooter, "shot prevented");
            outcome.prevented = true;
            outcome.pending = dispatch.pending;
            return Ok((dispatch.pipeline, outcome));
        }

        let matches = find_matching_responses(
            &self.engine,
            &dispatch.pipeline.state,
            &self.catalog,
            &dispatch.pipeline.registry,
            &dispatch.event,
            defending,
        )?;
        debug!(shooter = %shooter, responses = matches.len(), "shot responses found");
        let chain = build_response_chain(&matches, defending, terminal);
        self.continue_after(dispatch, chain, outcome)
    }

    fn end_phase(&self, pipeline: Pipeline, team: Team) -> Result<(Pipeline, ActionOutcome)> {
        if team != pipeline.state.active_team {
            return Err(EngineError::invalid_action(format!("{team} is not the active team")));
        }
        let request = GameEvent::for_team(PHASE_END_REQUEST, team)
            .with_field("phase", pipeline.state.phase.as_str());
        let dispatch = self.engine.fire_request_event(pipeline, request)?;
        let mut outcome = ActionOutcome::default();
        outcome.events.push(dispatch.event.clone());
        if dispatch.prevented {
            debug!(team = %team, "phase end prevented");
            outcome.prevented = true;
            outcome.pending = dispatch.pending;
            return Ok((dispatch.pipeline, outcome));
        }
        self.continue_after(dispatch, Effect::AdvancePhase, outcome)
    }

    /// Run `next` after a dispatch. If a trigger paused the dispatch, `next`
    /// waits in the pending continuation behind the triggers not yet
    /// considered and is skipped if one of them vetoes the event.
    fn continue_after(
        &self,
        mut dispatch: DispatchResult,
        next: Effect,
        mut outcome: ActionOutcome,
    ) -> Result<(Pipeline, ActionOutcome)> {
        let Some(next) = dispatch.then(next) else {
            outcome.pending = dispatch.pending;
            return Ok((dispatch.pipeline, outcome));
        };

        let ctx = EffectContext::new().with_event(dispatch.event);
        let result = self.engine.apply_effect(dispatch.pipeline, &next, &ctx)?;
        let pipeline = outcome.record(result);
        Ok((pipeline, outcome))
    }

    // === Direct Actions ===

    fn apply_direct(&self, state: &mut GameState, action: &GameAction) -> Result<()> {
        match action {
            GameAction::Substitute { team, out, incoming } => state.substitute(*team, *out, *incoming),
            GameAction::AttachCard { card, player } => {
                require_in_hand(state, *card)?;
                if !state.is_on_court(*player) {
                    return Err(EngineError::invalid_action(format!("{player} is not on court")));
                }
                state.attach_card(*card, *player)
            }
            GameAction::DetachCard { card } => state.detach_card(*card),
            GameAction::PlayCard { card, face_down } => {
                require_in_hand(state, *card)?;
                let slug = state.card(*card).map(|c| c.slug.clone()).unwrap_or_default();
                if self.catalog.asset_power(&slug).is_some() {
                    state.move_card(*card, CardZone::Assets)?;
                    if let Some(instance) = state.card_mut(*card) {
                        instance.face_down = *face_down;
                    }
                } else {
                    state.move_card(*card, CardZone::Discard)?;
                }
                Ok(())
            }
            GameAction::CreateToken { team, definition } => {
                state.add_token(*team, definition.clone());
                Ok(())
            }
            GameAction::RemoveAsset { card } => state.remove_asset(*card),
            GameAction::Shoot { .. } | GameAction::EndPhase { .. } => Err(EngineError::invalid_action(
                format!("{} runs effects and cannot be applied directly", action.kind()),
            )),
        }
    }
}

fn require_in_hand(state: &GameState, card: EntityId) -> Result<()> {
    match state.zone_of(card) {
        Some(CardZone::Hand) => Ok(()),
        Some(_) => Err(EngineError::invalid_action(format!("{card} is not in hand"))),
        None => Err(EngineError::UnknownEntity(card)),
    }
}
