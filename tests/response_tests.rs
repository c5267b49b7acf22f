//! Response chain integration tests.
//!
//! A shot against a team holding two face-down responses pauses once per
//! response. These tests walk the chain through the driver and check that
//! only the chosen responses apply and the shot resolves exactly once.

use court_engine::cards::{AssetPower, CardCatalog, CardDef, ResponseSpec};
use court_engine::core::{EntityId, GameAction, GameState, Team};
use court_engine::effects::Effect;
use court_engine::expr::{Expr, Value};
use court_engine::responses::{APPLY, PASS, RESPONSE_CHOICE};
use court_engine::triggers::{STANDARD_ACTION_AFTER, STANDARD_ACTION_BEFORE};
use court_engine::{Engine, EngineError, GameDriver, GameSession};

fn response_card(slug: &str, prompt: &str, points: i64) -> CardDef {
    CardDef::new(slug, slug).with_power(AssetPower::new(prompt).with_response(ResponseSpec::new(
        STANDARD_ACTION_BEFORE,
        prompt,
        Effect::modify_score(Expr::lit(Team::Away), points),
    )))
}

fn driver() -> GameDriver<CardCatalog> {
    let mut catalog = CardCatalog::new();
    catalog.register(response_card("trap", "Spring the trap?", 10));
    catalog.register(response_card("charm", "Use the charm?", 1));
    GameDriver::new(Engine::default(), catalog)
}

struct Court {
    session: GameSession,
    shooter: EntityId,
    trap: EntityId,
    charm: EntityId,
}

/// A home shooter who cannot miss against two face-down away responses.
fn court(driver: &GameDriver<CardCatalog>) -> Court {
    let mut state = GameState::new(11);
    let shooter = state.add_player(Team::Home, "sniper", 2, [("shooting", 10)], true);
    state.add_player(Team::Away, "stopper", 2, [("shooting", 3)], true);
    let trap = state.add_asset(Team::Away, "trap", true);
    let charm = state.add_asset(Team::Away, "charm", true);
    Court {
        session: driver.new_session(state),
        shooter,
        trap,
        charm,
    }
}

fn shoot(shooter: EntityId) -> GameAction {
    GameAction::Shoot { shooter, distance: 3 }
}

/// Pass on the first response, apply the second: only the second applies
/// and the shot resolves once.
#[test]
fn test_pass_then_apply() {
    let driver = driver();
    let Court {
        mut session,
        shooter,
        trap,
        charm,
    } = court(&driver);

    let outcome = driver.perform(&mut session, shoot(shooter)).unwrap();
    let first = outcome.pending.unwrap();
    assert_eq!(first.choice_type, RESPONSE_CHOICE);
    assert_eq!(first.options, vec![APPLY.to_string(), PASS.to_string()]);
    assert_eq!(first.waiting_for, Team::Away);
    assert_eq!(first.details["asset"], Value::from(trap));
    assert_eq!(session.pending_choice(), Some(&first));
    assert!(session.state.last_skill_test.is_none());

    let outcome = driver.submit_choice(&mut session, first.id, PASS).unwrap();
    let second = outcome.pending.unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(second.details["asset"], Value::from(charm));
    assert_eq!(session.pending_choice().map(|c| c.id), Some(second.id));
    assert!(session.state.last_skill_test.is_none());

    let outcome = driver.submit_choice(&mut session, second.id, APPLY).unwrap();
    assert!(outcome.pending.is_none());
    assert!(session.pending_choice().is_none());
    assert_eq!(
        outcome.applied.iter().filter(|a| a.as_str() == "apply-response").count(),
        1
    );
    assert_eq!(
        outcome
            .applied
            .iter()
            .filter(|a| a.as_str() == "skill-test")
            .count(),
        1
    );
    assert!(outcome
        .applied
        .iter()
        .any(|a| a == &format!("fire-event: {STANDARD_ACTION_AFTER}")));

    // Charm applied once, trap never.
    assert_eq!(session.state.teams[Team::Away].score, 1);
    assert!(session.state.card(trap).unwrap().face_down);
    assert!(!session.state.card(charm).unwrap().face_down);

    // The shot resolved once: stat 10 always succeeds with a bonus.
    let test = session.state.last_skill_test.clone().unwrap();
    assert!(test.success && test.bonus);
    assert_eq!(session.state.teams[Team::Home].score, 3);
}

/// Answered choices cannot be answered again.
#[test]
fn test_resubmission_is_rejected() {
    let driver = driver();
    let Court {
        mut session, shooter, ..
    } = court(&driver);

    let first = driver.perform(&mut session, shoot(shooter)).unwrap().pending.unwrap();
    let second = driver
        .submit_choice(&mut session, first.id, PASS)
        .unwrap()
        .pending
        .unwrap();

    let snapshot = session.clone();
    let err = driver.submit_choice(&mut session, first.id, APPLY).unwrap_err();
    assert!(matches!(err, EngineError::ChoiceNotPending { id } if id == first.id));
    assert_eq!(session, snapshot);

    driver.submit_choice(&mut session, second.id, PASS).unwrap();
    let err = driver.submit_choice(&mut session, second.id, PASS).unwrap_err();
    assert!(matches!(err, EngineError::ChoiceNotPending { .. }));
}

/// A selection outside the options leaves the choice pending.
#[test]
fn test_invalid_selection_keeps_choice() {
    let driver = driver();
    let Court {
        mut session, shooter, ..
    } = court(&driver);

    let first = driver.perform(&mut session, shoot(shooter)).unwrap().pending.unwrap();
    let err = driver.submit_choice(&mut session, first.id, "Maybe").unwrap_err();
    assert!(matches!(err, EngineError::InvalidSelection { .. }));
    assert_eq!(session.pending_choice(), Some(&first));
}

/// No new action starts while a choice is pending.
#[test]
fn test_actions_blocked_while_pending() {
    let driver = driver();
    let Court {
        mut session, shooter, ..
    } = court(&driver);

    driver.perform(&mut session, shoot(shooter)).unwrap();
    let err = driver
        .perform(&mut session, GameAction::EndPhase { team: Team::Home })
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAction { .. }));
}

/// Passing every response still resolves the shot.
#[test]
fn test_pass_all() {
    let driver = driver();
    let Court {
        mut session, shooter, ..
    } = court(&driver);

    let first = driver.perform(&mut session, shoot(shooter)).unwrap().pending.unwrap();
    let second = driver
        .submit_choice(&mut session, first.id, PASS)
        .unwrap()
        .pending
        .unwrap();
    driver.submit_choice(&mut session, second.id, PASS).unwrap();

    assert_eq!(session.state.teams[Team::Away].score, 0);
    assert_eq!(session.state.teams[Team::Home].score, 3);
}

/// Revealed responses are no longer offered.
#[test]
fn test_revealed_response_not_offered_again() {
    let driver = driver();
    let Court {
        mut session,
        shooter,
        trap,
        charm,
    } = court(&driver);

    let first = driver.perform(&mut session, shoot(shooter)).unwrap().pending.unwrap();
    let second = driver
        .submit_choice(&mut session, first.id, APPLY)
        .unwrap()
        .pending
        .unwrap();
    driver.submit_choice(&mut session, second.id, PASS).unwrap();
    assert!(!session.state.card(trap).unwrap().face_down);

    let next = driver.perform(&mut session, shoot(shooter)).unwrap().pending.unwrap();
    assert_eq!(next.details["asset"], Value::from(charm));
}
