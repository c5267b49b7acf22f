//! Game state.
//!
//! ## GameState
//!
//! Authoritative state of one game:
//! - Turn, phase, active team
//! - Court players and card instances by entity id
//! - Per-team zones (court, bench, hand, assets, discard) and score
//! - The single pending choice, if any
//! - Fate RNG state
//!
//! All collections use `im` persistent data structures, so the state can be
//! threaded through the event pipeline by value and cloned in O(1) at every
//! dispatch boundary.
//!
//! ## Documents
//!
//! [`GameState::entity_value`] renders a player or card as a [`Value`] map;
//! conditions read entities through these maps (`self.stats.shooting`,
//! `source.face_down`).

use std::collections::BTreeMap;

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use super::config::EngineConfig;
use super::entity::EntityId;
use super::rng::{GameRng, GameRngState};
use super::team::{Team, TeamMap};
use crate::cards::{CardInstance, InlineCardDef};
use crate::error::{EngineError, Result};
use crate::expr::Value;
use crate::responses::{ChoiceId, PendingChoice};
use crate::rules::SkillTestResult;

/// Phase a new game starts in.
pub const OPENING_PHASE: &str = "offense";

/// A player on a team roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtPlayer {
    /// Entity id (trigger source for the player's abilities).
    pub id: EntityId,
    /// Catalog key.
    pub slug: String,
    /// Team the player belongs to.
    pub team: Team,
    /// Size class, compared for size advantage.
    pub size: i64,
    /// Named stats (`shooting`, `defense`, ...).
    pub stats: BTreeMap<String, i64>,
}

impl CourtPlayer {
    /// Read a stat, 0 if absent.
    #[must_use]
    pub fn stat(&self, name: &str) -> i64 {
        self.stats.get(name).copied().unwrap_or(0)
    }
}

/// Zones a card can occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardZone {
    /// In the team's hand.
    Hand,
    /// In play as a team asset.
    Assets,
    /// In the discard pile.
    Discard,
    /// Attached to a court player.
    Attached,
}

/// Per-team zones and score.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamState {
    /// Points scored.
    pub score: i64,
    /// Players on court.
    pub on_court: Vector<EntityId>,
    /// Players on the bench.
    pub bench: Vector<EntityId>,
    /// Cards in hand.
    pub hand: Vector<EntityId>,
    /// In-play assets.
    pub assets: Vector<EntityId>,
    /// Discarded cards.
    pub discard: Vector<EntityId>,
}

impl TeamState {
    fn zone_mut(&mut self, zone: CardZone) -> Option<&mut Vector<EntityId>> {
        match zone {
            CardZone::Hand => Some(&mut self.hand),
            CardZone::Assets => Some(&mut self.assets),
            CardZone::Discard => Some(&mut self.discard),
            CardZone::Attached => None,
        }
    }
}

fn remove_from(list: &mut Vector<EntityId>, id: EntityId) -> bool {
    match list.index_of(&id) {
        Some(pos) => {
            list.remove(pos);
            true
        }
        None => false,
    }
}

/// Complete state of one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Turn number (starts at 1).
    pub turn: u32,

    /// Current phase name.
    pub phase: String,

    /// Team whose turn it is.
    pub active_team: Team,

    /// Every rostered player.
    pub players: OrdMap<EntityId, CourtPlayer>,

    /// Every card instance.
    pub cards: OrdMap<EntityId, CardInstance>,

    /// Per-team zones and score.
    pub teams: TeamMap<TeamState>,

    /// The one paused choice, if any.
    pub pending_choice: Option<PendingChoice>,

    /// Most recent skill test outcome.
    pub last_skill_test: Option<SkillTestResult>,

    /// Fate RNG position.
    pub rng: GameRngState,

    next_entity: u32,
    next_choice: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GameState {
    /// Create an empty game on turn 1 with HOME active.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            turn: 1,
            phase: OPENING_PHASE.to_string(),
            active_team: Team::Home,
            players: OrdMap::new(),
            cards: OrdMap::new(),
            teams: TeamMap::default(),
            pending_choice: None,
            last_skill_test: None,
            rng: GameRngState::seeded(seed),
            next_entity: 1,
            next_choice: 1,
        }
    }

    /// Create an empty game seeded from the engine configuration.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.rng_seed)
    }

    // === Entity Management ===

    /// Allocate a new entity ID.
    pub fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    /// Allocate a new choice ID. Ids are never reused.
    pub fn alloc_choice(&mut self) -> ChoiceId {
        let id = ChoiceId::new(self.next_choice);
        self.next_choice += 1;
        id
    }

    /// Add a player to a team, on court or on the bench.
    pub fn add_player(
        &mut self,
        team: Team,
        slug: impl Into<String>,
        size: i64,
        stats: impl IntoIterator<Item = (&'static str, i64)>,
        on_court: bool,
    ) -> EntityId {
        let id = self.alloc_entity();
        let player = CourtPlayer {
            id,
            slug: slug.into(),
            team,
            size,
            stats: stats.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        };
        self.players.insert(id, player);
        let side = &mut self.teams[team];
        if on_court {
            side.on_court.push_back(id);
        } else {
            side.bench.push_back(id);
        }
        id
    }

    fn add_card(&mut self, card: CardInstance, zone: CardZone) -> EntityId {
        let (id, team) = (card.id, card.team);
        self.cards.insert(id, card);
        if let Some(list) = self.teams[team].zone_mut(zone) {
            list.push_back(id);
        }
        id
    }

    /// Put a new card into a team's hand.
    pub fn add_card_to_hand(&mut self, team: Team, slug: impl Into<String>) -> EntityId {
        let id = self.alloc_entity();
        self.add_card(CardInstance::new(id, slug, team), CardZone::Hand)
    }

    /// Put a new card straight into play as an asset.
    pub fn add_asset(&mut self, team: Team, slug: impl Into<String>, face_down: bool) -> EntityId {
        let id = self.alloc_entity();
        let card = CardInstance::new(id, slug, team).with_face_down(face_down);
        self.add_card(card, CardZone::Assets)
    }

    /// Create a token asset from an inline definition.
    pub fn add_token(&mut self, team: Team, definition: InlineCardDef) -> EntityId {
        let id = self.alloc_entity();
        self.add_card(CardInstance::token(id, team, definition), CardZone::Assets)
    }

    /// Get a player.
    #[must_use]
    pub fn player(&self, id: EntityId) -> Option<&CourtPlayer> {
        self.players.get(&id)
    }

    /// Get a mutable player.
    pub fn player_mut(&mut self, id: EntityId) -> Option<&mut CourtPlayer> {
        self.players.get_mut(&id)
    }

    /// Get a card.
    #[must_use]
    pub fn card(&self, id: EntityId) -> Option<&CardInstance> {
        self.cards.get(&id)
    }

    /// Get a mutable card.
    pub fn card_mut(&mut self, id: EntityId) -> Option<&mut CardInstance> {
        self.cards.get_mut(&id)
    }

    /// Team owning a player or card.
    #[must_use]
    pub fn team_of(&self, id: EntityId) -> Option<Team> {
        self.player(id)
            .map(|p| p.team)
            .or_else(|| self.card(id).map(|c| c.team))
    }

    // === Zones ===

    /// Whether a player is on court.
    #[must_use]
    pub fn is_on_court(&self, id: EntityId) -> bool {
        self.player(id)
            .is_some_and(|p| self.teams[p.team].on_court.contains(&id))
    }

    /// Zone a card currently occupies.
    #[must_use]
    pub fn zone_of(&self, id: EntityId) -> Option<CardZone> {
        let card = self.card(id)?;
        if card.attached_to.is_some() {
            return Some(CardZone::Attached);
        }
        let side = &self.teams[card.team];
        if side.hand.contains(&id) {
            Some(CardZone::Hand)
        } else if side.assets.contains(&id) {
            Some(CardZone::Assets)
        } else if side.discard.contains(&id) {
            Some(CardZone::Discard)
        } else {
            None
        }
    }

    /// Cards attached to a player, in entity order.
    #[must_use]
    pub fn attachments_of(&self, player: EntityId) -> Vec<EntityId> {
        self.cards
            .values()
            .filter(|c| c.attached_to == Some(player))
            .map(|c| c.id)
            .collect()
    }

    /// Move a card to another zone (not `Attached`; use [`Self::attach_card`]).
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownEntity`] if the card does not exist.
    pub fn move_card(&mut self, id: EntityId, zone: CardZone) -> Result<()> {
        let card = self.cards.get_mut(&id).ok_or(EngineError::UnknownEntity(id))?;
        card.attached_to = None;
        let team = card.team;
        let side = &mut self.teams[team];
        remove_from(&mut side.hand, id);
        remove_from(&mut side.assets, id);
        remove_from(&mut side.discard, id);
        if let Some(list) = side.zone_mut(zone) {
            list.push_back(id);
        }
        Ok(())
    }

    /// Attach a card to a court player.
    ///
    /// # Errors
    ///
    /// Unknown card or player, or a player from the other team.
    pub fn attach_card(&mut self, card: EntityId, player: EntityId) -> Result<()> {
        let player_team = self.player(player).ok_or(EngineError::UnknownEntity(player))?.team;
        let card_team = self.card(card).ok_or(EngineError::UnknownEntity(card))?.team;
        if card_team != player_team {
            return Err(EngineError::invalid_action(format!(
                "{card} belongs to {card_team}, {player} plays for {player_team}"
            )));
        }
        self.move_card(card, CardZone::Attached)?;
        if let Some(c) = self.cards.get_mut(&card) {
            c.attached_to = Some(player);
        }
        Ok(())
    }

    /// Detach a card into the discard pile.
    ///
    /// # Errors
    ///
    /// Unknown card, or a card that is not attached.
    pub fn detach_card(&mut self, card: EntityId) -> Result<()> {
        if self.zone_of(card) != Some(CardZone::Attached) {
            return Err(EngineError::invalid_action(format!("{card} is not attached")));
        }
        self.move_card(card, CardZone::Discard)
    }

    /// Swap a court player for a bench player.
    ///
    /// # Errors
    ///
    /// If `out` is not on court or `incoming` is not on the same team's bench.
    pub fn substitute(&mut self, team: Team, out: EntityId, incoming: EntityId) -> Result<()> {
        let side = &mut self.teams[team];
        let (Some(court_pos), Some(bench_pos)) =
            (side.on_court.index_of(&out), side.bench.index_of(&incoming))
        else {
            return Err(EngineError::invalid_action(format!(
                "cannot substitute {incoming} for {out} on {team}"
            )));
        };
        side.on_court.set(court_pos, incoming);
        side.bench.set(bench_pos, out);
        Ok(())
    }

    /// Take an asset out of play into the discard pile. Tokens cease to exist.
    ///
    /// # Errors
    ///
    /// If the card is not an in-play asset.
    pub fn remove_asset(&mut self, card: EntityId) -> Result<()> {
        if self.zone_of(card) != Some(CardZone::Assets) {
            return Err(EngineError::invalid_action(format!("{card} is not in play")));
        }
        if let Some(token) = self.card(card).filter(|c| c.is_token()) {
            let team = token.team;
            remove_from(&mut self.teams[team].assets, card);
            self.cards.remove(&card);
            return Ok(());
        }
        self.move_card(card, CardZone::Discard)
    }

    /// All in-play assets of both teams.
    pub fn assets_in_play(&self) -> impl Iterator<Item = EntityId> + '_ {
        Team::ALL
            .into_iter()
            .flat_map(move |team| self.teams[team].assets.iter().copied())
    }

    /// All on-court players of both teams.
    pub fn players_on_court(&self) -> impl Iterator<Item = EntityId> + '_ {
        Team::ALL
            .into_iter()
            .flat_map(move |team| self.teams[team].on_court.iter().copied())
    }

    // === Fate ===

    /// Draw with the game RNG, persisting the new position.
    pub fn with_rng<T>(&mut self, f: impl FnOnce(&mut GameRng) -> T) -> T {
        let mut rng = GameRng::from_state(&self.rng);
        let out = f(&mut rng);
        self.rng = rng.state();
        out
    }

    // === Documents ===

    /// Render a player or card as a document map, `Null` if unknown.
    #[must_use]
    pub fn entity_value(&self, id: EntityId) -> Value {
        if let Some(p) = self.player(id) {
            let stats = p.stats.iter().map(|(k, v)| (k.clone(), Value::Int(*v)));
            return Value::map([
                ("id", Value::from(id)),
                ("kind", Value::from("player")),
                ("slug", Value::from(p.slug.as_str())),
                ("team", Value::from(p.team)),
                ("size", Value::Int(p.size)),
                ("on_court", Value::Bool(self.is_on_court(id))),
                ("stats", Value::Map(stats.collect())),
            ]);
        }
        if let Some(c) = self.card(id) {
            return Value::map([
                ("id", Value::from(id)),
                ("kind", Value::from("card")),
                ("slug", Value::from(c.slug.as_str())),
                ("team", Value::from(c.team)),
                ("face_down", Value::Bool(c.face_down)),
                ("attached_to", Value::from(c.attached_to)),
            ]);
        }
        Value::Null
    }

    /// Game-level fields every document carries.
    #[must_use]
    pub fn summary_value(&self) -> Value {
        let scores = Team::ALL
            .into_iter()
            .map(|t| (t.as_str(), Value::Int(self.teams[t].score)));
        Value::map([
            ("turn", Value::from(self.turn)),
            ("phase", Value::from(self.phase.as_str())),
            ("active_team", Value::from(self.active_team)),
            ("scores", Value::map(scores)),
        ])
    }
}
