//! Response chains.
//!
//! Before an action resolves, the defending team may reveal face-down
//! response assets. Each candidate becomes an "Apply or Pass" prompt; the
//! prompts are nested around the action's terminal continuation so that the
//! first response found is asked first, and every path ends in the terminal.
//!
//! ```text
//! offer R1 ── Apply? reveal R1, apply R1 ──┐
//!                                          ├─ offer R2 ── Apply? reveal R2, apply R2 ──┐
//!                                          │                                           ├─ terminal
//! ```

use std::collections::BTreeMap;

use crate::cards::EffectCatalog;
use crate::core::{EntityId, GameState, Team};
use crate::effects::{Effect, EffectContext};
use crate::engine::Engine;
use crate::error::Result;
use crate::expr::Expr;
use crate::triggers::{GameEvent, TriggerId, TriggerRegistry};

use super::choice::SELECTION_VAR;

/// `choice_type` of response prompts.
pub const RESPONSE_CHOICE: &str = "response";

/// Selection that reveals and applies the response.
pub const APPLY: &str = "Apply";

/// Selection that declines the response.
pub const PASS: &str = "Pass";

/// A response the defending team may use against an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseMatch {
    /// The response trigger.
    pub trigger: TriggerId,
    /// The face-down asset carrying it.
    pub asset: EntityId,
    /// Prompt to show.
    pub prompt: String,
    /// Effect applied on "Apply".
    pub effect: Effect,
}

/// Find the defending team's responses to `event`.
///
/// Only face-down assets whose power has a response are considered. A
/// response matches when its trigger listens for the event type and its
/// condition is satisfied. Results are in registration order.
///
/// # Errors
///
/// Fatal condition-evaluation errors.
pub fn find_matching_responses(
    engine: &Engine,
    state: &GameState,
    catalog: &dyn EffectCatalog,
    registry: &TriggerRegistry,
    event: &GameEvent,
    defending: Team,
) -> Result<Vec<ResponseMatch>> {
    let mut matches = Vec::new();
    for &asset in &state.teams[defending].assets {
        let Some(card) = state.card(asset).filter(|c| c.face_down) else {
            continue;
        };
        let has_response = match &card.token {
            Some(definition) => definition.power.as_ref().is_some_and(|p| p.has_response()),
            None => catalog.asset_power(&card.slug).is_some_and(|p| p.has_response()),
        };
        if !has_response {
            continue;
        }

        let candidates = registry
            .triggers_for_source(asset)
            .filter(|t| t.response && t.listens_for(&event.event_type));
        for trigger in candidates {
            if let Some(condition) = &trigger.condition {
                let doc = EffectContext::for_trigger(trigger.id, trigger.bindings, event).document(state);
                if !engine.evaluate(condition, &doc)?.is_satisfied() {
                    continue;
                }
            }
            if let Effect::ApplyResponse { prompt, effect, .. } = &trigger.effect {
                matches.push(ResponseMatch {
                    trigger: trigger.id,
                    asset,
                    prompt: prompt.clone(),
                    effect: (**effect).clone(),
                });
            }
        }
    }
    matches.sort_by_key(|m| m.trigger);
    Ok(matches)
}

/// Wrap `terminal` in one "Apply or Pass" prompt per match, first match
/// outermost.
#[must_use]
pub fn build_response_chain(matches: &[ResponseMatch], defending: Team, terminal: Effect) -> Effect {
    matches.iter().rev().fold(terminal, |chain, m| {
        let apply = Effect::ApplyResponse {
            asset: m.asset,
            prompt: m.prompt.clone(),
            effect: Box::new(m.effect.clone()),
        };
        let details = BTreeMap::from([
            ("asset".to_string(), Expr::lit(m.asset)),
            ("prompt".to_string(), Expr::lit(m.prompt.as_str())),
        ]);
        Effect::OfferChoice {
            choice_type: RESPONSE_CHOICE.to_string(),
            options: vec![APPLY.to_string(), PASS.to_string()],
            waiting_for: Expr::lit(defending),
            details,
            continuation: Box::new(Effect::Sequence(vec![
                Effect::when(Expr::path_eq(SELECTION_VAR, APPLY), apply),
                chain,
            ])),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{AssetPower, CardCatalog, CardDef, ResponseSpec};
    use crate::triggers::{register_asset_triggers, STANDARD_ACTION_BEFORE};

    fn catalog() -> CardCatalog {
        let mut catalog = CardCatalog::new();
        catalog.register(CardDef::new("trap", "Trap").with_power(
            AssetPower::new("Snap").with_response(
                ResponseSpec::new(STANDARD_ACTION_BEFORE, "Spring the trap?", Effect::prevent("trap"))
                    .with_condition(Expr::path_eq("action", "shoot")),
            ),
        ));
        catalog
    }

    fn setup(face_down: bool) -> (GameState, TriggerRegistry, EntityId) {
        let mut state = GameState::new(0);
        let trap = state.add_asset(Team::Away, "trap", face_down);
        let mut registry = TriggerRegistry::new();
        register_asset_triggers(&mut registry, &catalog(), &state, trap);
        (state, registry, trap)
    }

    fn shoot() -> GameEvent {
        GameEvent::for_team(STANDARD_ACTION_BEFORE, Team::Home).with_field("action", "shoot")
    }

    #[test]
    fn test_finds_face_down_response() {
        let (state, registry, trap) = setup(true);
        let found =
            find_matching_responses(&Engine::default(), &state, &catalog(), &registry, &shoot(), Team::Away)
                .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].asset, trap);
        assert_eq!(found[0].prompt, "Spring the trap?");
    }

    #[test]
    fn test_ignores_revealed_and_other_team() {
        let (state, registry, _) = setup(false);
        let engine = Engine::default();
        let found = find_matching_responses(&engine, &state, &catalog(), &registry, &shoot(), Team::Away);
        assert!(found.unwrap().is_empty());

        let (state, registry, _) = setup(true);
        let found = find_matching_responses(&engine, &state, &catalog(), &registry, &shoot(), Team::Home);
        assert!(found.unwrap().is_empty());
    }

    #[test]
    fn test_condition_filters() {
        let (state, registry, _) = setup(true);
        let pass = GameEvent::for_team(STANDARD_ACTION_BEFORE, Team::Home).with_field("action", "pass");
        let found =
            find_matching_responses(&Engine::default(), &state, &catalog(), &registry, &pass, Team::Away);
        assert!(found.unwrap().is_empty());
    }

    #[test]
    fn test_chain_nesting_order() {
        let m = |n: u32| ResponseMatch {
            trigger: TriggerId::new(n),
            asset: EntityId(n),
            prompt: format!("R{n}"),
            effect: Effect::Noop,
        };
        let chain = build_response_chain(&[m(1), m(2)], Team::Away, Effect::AdvancePhase);

        let Effect::OfferChoice { details, continuation, .. } = chain else {
            panic!("outermost node should be an offer");
        };
        assert_eq!(details["asset"], Expr::lit(EntityId(1)));
        let Effect::Sequence(steps) = *continuation else {
            panic!("continuation should be a sequence");
        };
        let Effect::OfferChoice { details, continuation, .. } = &steps[1] else {
            panic!("second offer should follow the first");
        };
        assert_eq!(details["asset"], Expr::lit(EntityId(2)));
        let Effect::Sequence(inner) = continuation.as_ref() else {
            panic!("continuation should be a sequence");
        };
        assert_eq!(inner[1], Effect::AdvancePhase);
    }

    #[test]
    fn test_no_matches_is_terminal() {
        assert_eq!(build_response_chain(&[], Team::Home, Effect::Noop), Effect::Noop);
    }
}
