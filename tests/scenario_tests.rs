//! End-to-end shot scenarios.
//!
//! Each test plays a shot through [`GameDriver`] with real card content:
//! shooter abilities on the before-event, defensive responses, vetoes,
//! play calls that pause inside the dispatch, and sessions persisted while
//! a choice waits.

use std::collections::BTreeMap;

use court_engine::cards::{AbilityDef, AssetPower, CardCatalog, CardDef, ResponseSpec, TriggerSpec};
use court_engine::core::{EntityId, GameAction, GameState, Team};
use court_engine::effects::Effect;
use court_engine::expr::Expr;
use court_engine::responses::{APPLY, PASS, RESPONSE_CHOICE};
use court_engine::triggers::{STANDARD_ACTION_AFTER, STANDARD_ACTION_BEFORE};
use court_engine::{Engine, GameDriver, GameSession};
use tracing_subscriber::EnvFilter;

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("court_engine=debug")))
        .with_test_writer()
        .try_init();
}

fn catalog() -> CardCatalog {
    let mut catalog = CardCatalog::new();
    catalog.register(CardDef::new("sniper", "Sniper").with_ability(AbilityDef::triggered(
        "Quick Release",
        TriggerSpec::new(
            STANDARD_ACTION_BEFORE,
            Effect::modify_stat(Expr::path("self"), "shooting", 1),
        )
        .with_condition(Expr::eq(Expr::path("actor"), Expr::path("self.id"))),
    )));
    catalog.register(CardDef::new("press", "Press").with_power(AssetPower::new("Full Court").with_response(
        ResponseSpec::new(
            STANDARD_ACTION_BEFORE,
            "Trap the shooter?",
            Effect::modify_stat(Expr::path("event.actor"), "shooting", -20),
        )
        .with_condition(Expr::path_eq("action", "shoot")),
    )));
    catalog.register(CardDef::new("wall", "Wall").with_power(AssetPower::new("Perimeter").with_trigger(
        TriggerSpec::new(STANDARD_ACTION_BEFORE, Effect::prevent("contested"))
            .with_condition(Expr::ge(Expr::path("distance"), Expr::lit(7i64))),
    )));
    catalog.register(CardDef::new("playbook", "Playbook").with_power(AssetPower::new("Play Call").with_trigger(
        TriggerSpec::new(
            STANDARD_ACTION_BEFORE,
            Effect::OfferChoice {
                choice_type: "play-call".to_string(),
                options: vec!["Drive".to_string(), "Pull Up".to_string()],
                waiting_for: Expr::path("owner"),
                details: BTreeMap::new(),
                continuation: Box::new(Effect::when(
                    Expr::path_eq("selection", "Drive"),
                    Effect::modify_stat(Expr::path("actor"), "shooting", -20),
                )),
            },
        ),
    )));
    catalog.register(CardDef::new("mascot", "Mascot").with_power(AssetPower::new("Celebrate").with_trigger(
        TriggerSpec::new(STANDARD_ACTION_AFTER, offer("celebrate", &["Dance", "Skip"], Effect::Noop)).with_priority(5),
    )));
    catalog.register(CardDef::new("huddle", "Huddle").with_power(AssetPower::new("Call Timeout").with_trigger(
        TriggerSpec::new(STANDARD_ACTION_BEFORE, offer("huddle", &["Go", "Wait"], Effect::Noop)).with_priority(10),
    )));
    catalog.register(CardDef::new("buzzer", "Buzzer").with_power(AssetPower::new("Shot Clock").with_trigger(
        TriggerSpec::new(STANDARD_ACTION_BEFORE, Effect::prevent("shot clock"))
            .with_priority(50)
            .with_condition(Expr::ge(Expr::path("distance"), Expr::lit(7i64))),
    )));
    catalog.register(CardDef::new("coach", "Coach").with_power(AssetPower::new("Challenge").with_trigger(
        TriggerSpec::new(
            STANDARD_ACTION_BEFORE,
            offer(
                "challenge",
                &["Block", "Allow"],
                Effect::when(Expr::path_eq("selection", "Block"), Effect::prevent("challenged")),
            ),
        )
        .with_priority(10),
    )));
    catalog
}

fn offer(choice_type: &str, options: &[&str], continuation: Effect) -> Effect {
    Effect::OfferChoice {
        choice_type: choice_type.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        waiting_for: Expr::path("owner"),
        details: BTreeMap::new(),
        continuation: Box::new(continuation),
    }
}

fn driver() -> GameDriver<CardCatalog> {
    GameDriver::new(Engine::default(), catalog())
}

/// Home sniper (shooting 10, so every shot makes it with a bonus) against
/// an away defender of the same size.
fn setup(away_assets: &[(&str, bool)], home_assets: &[&str]) -> (GameState, EntityId) {
    let mut state = GameState::new(5);
    let shooter = state.add_player(Team::Home, "sniper", 2, [("shooting", 10)], true);
    state.add_player(Team::Away, "stopper", 2, [("shooting", 4)], true);
    for (slug, face_down) in away_assets {
        state.add_asset(Team::Away, *slug, *face_down);
    }
    for slug in home_assets {
        state.add_asset(Team::Home, *slug, false);
    }
    (state, shooter)
}

fn after_fired(applied: &[String]) -> bool {
    applied.iter().any(|a| a == &format!("fire-event: {STANDARD_ACTION_AFTER}"))
}

/// No responses in play: the shot resolves in one action.
#[test]
fn test_uncontested_shot_scores() {
    init_test_logging();
    let driver = driver();
    let (state, shooter) = setup(&[], &[]);
    let mut session = driver.new_session(state);

    let outcome = driver
        .perform(&mut session, GameAction::Shoot { shooter, distance: 3 })
        .unwrap();

    assert!(outcome.pending.is_none());
    assert!(!outcome.prevented);
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].occurrence_this_turn, 1);
    assert!(after_fired(&outcome.applied));
    // Quick Release fired on the before-event.
    assert_eq!(session.state.player(shooter).unwrap().stat("shooting"), 11);
    assert_eq!(session.state.teams[Team::Home].score, 3);
}

/// A face-down away response pauses the shot; applying it reveals the
/// asset and the shot then resolves with the response's effect in place.
#[test]
fn test_response_applied() {
    init_test_logging();
    let driver = driver();
    let (state, shooter) = setup(&[("press", true)], &[]);
    let press = state.teams[Team::Away].assets[0];
    let mut session = driver.new_session(state);

    let outcome = driver
        .perform(&mut session, GameAction::Shoot { shooter, distance: 3 })
        .unwrap();
    let choice = outcome.pending.unwrap();
    assert_eq!(choice.choice_type, RESPONSE_CHOICE);
    assert_eq!(choice.options, vec![APPLY.to_string(), PASS.to_string()]);
    assert_eq!(choice.waiting_for, Team::Away);
    assert!(!after_fired(&outcome.applied));
    // The before-event already ran.
    assert_eq!(session.state.player(shooter).unwrap().stat("shooting"), 11);
    assert!(session.state.card(press).unwrap().face_down);

    let outcome = driver.submit_choice(&mut session, choice.id, APPLY).unwrap();
    assert!(outcome.pending.is_none());
    assert!(after_fired(&outcome.applied));
    assert!(!session.state.card(press).unwrap().face_down);
    assert_eq!(session.state.player(shooter).unwrap().stat("shooting"), -9);

    let test = session.state.last_skill_test.clone().unwrap();
    assert!(!test.success);
    assert_eq!(session.state.teams[Team::Home].score, 0);
}

/// Passing leaves the asset hidden and the shot unaffected.
#[test]
fn test_response_passed() {
    let driver = driver();
    let (state, shooter) = setup(&[("press", true)], &[]);
    let press = state.teams[Team::Away].assets[0];
    let mut session = driver.new_session(state);

    let choice = driver
        .perform(&mut session, GameAction::Shoot { shooter, distance: 3 })
        .unwrap()
        .pending
        .unwrap();
    driver.submit_choice(&mut session, choice.id, PASS).unwrap();

    assert!(session.state.card(press).unwrap().face_down);
    assert_eq!(session.state.teams[Team::Home].score, 3);
}

/// A face-up response asset is never offered.
#[test]
fn test_face_up_response_not_offered() {
    let driver = driver();
    let (state, shooter) = setup(&[("press", false)], &[]);
    let mut session = driver.new_session(state);

    let outcome = driver
        .perform(&mut session, GameAction::Shoot { shooter, distance: 3 })
        .unwrap();
    assert!(outcome.pending.is_none());
    assert_eq!(session.state.teams[Team::Home].score, 3);
}

/// A before-trigger veto stops the shot before any response is offered.
#[test]
fn test_prevented_shot() {
    let driver = driver();
    let (state, shooter) = setup(&[("press", true), ("wall", false)], &[]);
    let mut session = driver.new_session(state);

    let outcome = driver
        .perform(&mut session, GameAction::Shoot { shooter, distance: 8 })
        .unwrap();
    assert!(outcome.prevented);
    assert!(outcome.pending.is_none());
    assert!(session.state.last_skill_test.is_none());
    assert_eq!(session.state.teams[Team::Home].score, 0);

    // Inside the wall's range the shot goes up again.
    let outcome = driver
        .perform(&mut session, GameAction::Shoot { shooter, distance: 4 })
        .unwrap();
    assert!(!outcome.prevented);
    assert_eq!(outcome.events[0].occurrence_this_turn, 2);
}

/// A play call that pauses inside the before-dispatch carries the rest of
/// the shot in its continuation.
#[test]
fn test_pause_inside_before_event() {
    let driver = driver();
    let (state, shooter) = setup(&[], &["playbook"]);
    let mut session = driver.new_session(state);

    let call = driver
        .perform(&mut session, GameAction::Shoot { shooter, distance: 3 })
        .unwrap()
        .pending
        .unwrap();
    assert_eq!(call.choice_type, "play-call");
    assert_eq!(call.waiting_for, Team::Home);
    assert!(session.state.last_skill_test.is_none());

    let outcome = driver.submit_choice(&mut session, call.id, "Pull Up").unwrap();
    assert!(outcome.pending.is_none());
    assert!(after_fired(&outcome.applied));
    assert_eq!(session.state.teams[Team::Home].score, 3);
}

/// Play call first, then the defense's response: one choice at a time.
#[test]
fn test_play_call_then_response() {
    let driver = driver();
    let (state, shooter) = setup(&[("press", true)], &["playbook"]);
    let mut session = driver.new_session(state);

    let call = driver
        .perform(&mut session, GameAction::Shoot { shooter, distance: 3 })
        .unwrap()
        .pending
        .unwrap();
    assert_eq!(call.choice_type, "play-call");

    let outcome = driver.submit_choice(&mut session, call.id, "Drive").unwrap();
    let response = outcome.pending.unwrap();
    assert_eq!(response.choice_type, RESPONSE_CHOICE);
    assert_eq!(session.pending_choice().map(|c| c.id), Some(response.id));

    driver.submit_choice(&mut session, response.id, PASS).unwrap();
    assert!(session.pending_choice().is_none());
    // Drive cost 20 shooting: 10 + 1 - 20.
    assert_eq!(session.state.player(shooter).unwrap().stat("shooting"), -9);
    assert!(!session.state.last_skill_test.clone().unwrap().success);
}

/// A session paused on a response survives a bincode round trip and
/// resumes under a fresh driver.
#[test]
fn test_persisted_session_resumes() {
    init_test_logging();
    let (state, shooter) = setup(&[("press", true)], &[]);
    let press = state.teams[Team::Away].assets[0];
    let bytes = {
        let driver = driver();
        let mut session = driver.new_session(state);
        driver
            .perform(&mut session, GameAction::Shoot { shooter, distance: 3 })
            .unwrap();
        assert!(session.pending_choice().is_some());
        let bytes = session.to_bytes().unwrap();
        assert_eq!(GameSession::from_bytes(&bytes).unwrap(), session);
        bytes
    };

    let driver = driver();
    let mut restored = GameSession::from_bytes(&bytes).unwrap();
    let choice = restored.pending_choice().cloned().unwrap();
    assert_eq!(choice.waiting_for, Team::Away);

    let outcome = driver.submit_choice(&mut restored, choice.id, APPLY).unwrap();
    assert!(after_fired(&outcome.applied));
    assert!(!restored.state.card(press).unwrap().face_down);
    assert!(restored.pending_choice().is_none());
    assert_eq!(restored.state.teams[Team::Home].score, 0);
}

/// Same seed, same choices, same game.
#[test]
fn test_replay_is_deterministic() {
    let play = || {
        let driver = driver();
        let mut state = GameState::new(99);
        let shooter = state.add_player(Team::Home, "sniper", 2, [("shooting", 2)], true);
        let mut session = driver.new_session(state);
        for distance in [1, 4, 8, 2] {
            driver
                .perform(&mut session, GameAction::Shoot { shooter, distance })
                .unwrap();
        }
        session
    };
    assert_eq!(play(), play());
}

/// A card ability that pauses the after-event still lets the scoring rule
/// behind it run once the choice is answered.
#[test]
fn test_after_event_pause_keeps_scoring_rule() {
    let driver = driver();
    let (state, shooter) = setup(&[], &["mascot"]);
    let mut session = driver.new_session(state);

    let outcome = driver
        .perform(&mut session, GameAction::Shoot { shooter, distance: 3 })
        .unwrap();
    let celebrate = outcome.pending.unwrap();
    assert_eq!(celebrate.choice_type, "celebrate");
    assert!(session.state.last_skill_test.clone().unwrap().success);
    assert_eq!(session.state.teams[Team::Home].score, 0);

    let outcome = driver.submit_choice(&mut session, celebrate.id, "Dance").unwrap();
    assert!(outcome.pending.is_none());
    assert!(!outcome.prevented);
    assert_eq!(session.state.teams[Team::Home].score, 3);
}

/// A lower-priority veto behind a paused before-trigger still cancels the
/// shot.
#[test]
fn test_before_event_pause_keeps_later_veto() {
    let driver = driver();
    let (state, shooter) = setup(&[("buzzer", false)], &["huddle"]);
    let mut session = driver.new_session(state);

    let outcome = driver
        .perform(&mut session, GameAction::Shoot { shooter, distance: 8 })
        .unwrap();
    assert!(!outcome.prevented);
    let huddle = outcome.pending.unwrap();
    assert_eq!(huddle.choice_type, "huddle");

    let outcome = driver.submit_choice(&mut session, huddle.id, "Go").unwrap();
    assert!(outcome.prevented);
    assert!(outcome.pending.is_none());
    assert!(!after_fired(&outcome.applied));
    assert!(session.state.last_skill_test.is_none());
    assert_eq!(session.state.teams[Team::Home].score, 0);

    // Inside the buzzer's range the same pause lets the shot through.
    let huddle = driver
        .perform(&mut session, GameAction::Shoot { shooter, distance: 3 })
        .unwrap()
        .pending
        .unwrap();
    let outcome = driver.submit_choice(&mut session, huddle.id, "Go").unwrap();
    assert!(!outcome.prevented);
    assert!(after_fired(&outcome.applied));
    assert_eq!(session.state.teams[Team::Home].score, 3);
}

/// A veto decided in the answered choice cancels the shot.
#[test]
fn test_veto_on_resume_cancels_shot() {
    let driver = driver();
    let (state, shooter) = setup(&[("coach", false)], &[]);
    let mut session = driver.new_session(state);

    let challenge = driver
        .perform(&mut session, GameAction::Shoot { shooter, distance: 3 })
        .unwrap()
        .pending
        .unwrap();
    assert_eq!(challenge.waiting_for, Team::Away);

    let outcome = driver.submit_choice(&mut session, challenge.id, "Block").unwrap();
    assert!(outcome.prevented);
    assert!(!after_fired(&outcome.applied));
    assert!(session.state.last_skill_test.is_none());
    assert_eq!(session.state.teams[Team::Home].score, 0);

    let challenge = driver
        .perform(&mut session, GameAction::Shoot { shooter, distance: 3 })
        .unwrap()
        .pending
        .unwrap();
    let outcome = driver.submit_choice(&mut session, challenge.id, "Allow").unwrap();
    assert!(!outcome.prevented);
    assert!(after_fired(&outcome.applied));
    assert_eq!(session.state.teams[Team::Home].score, 3);
}
