//! Trigger lifecycle.
//!
//! Keeps the registry in step with what is in play. Every trigger created
//! here is sourced by the entity that carries it, so leaving play is always
//! a bulk [`TriggerRegistry::unregister_by_source`].
//!
//! | Entity | Registered when | Bindings |
//! |---|---|---|
//! | Court player | game start, substituted in | self = source = player |
//! | Attached card | attached, or on an entering player | source = card, self = player |
//! | Asset / token | game start, played, created | self = source = asset |

use rustc_hash::FxHashSet;
use tracing::debug;

use super::registry::{Trigger, TriggerBindings, TriggerId, TriggerRegistry};
use crate::cards::{AbilityDef, AssetPower, CardInstance, EffectCatalog};
use crate::core::{EngineConfig, EntityId, GameAction, GameState};
use crate::effects::Effect;
use crate::rules::default_rules;

fn register_abilities(
    registry: &mut TriggerRegistry,
    owner_slug: &str,
    abilities: &[AbilityDef],
    bindings: TriggerBindings,
) -> Vec<TriggerId> {
    abilities
        .iter()
        .filter_map(|ability| {
            let spec = ability.trigger_spec()?;
            let name = format!("{owner_slug}:{}", ability.name);
            Some(registry.register(Trigger::from_spec(name, spec, bindings)))
        })
        .collect()
}

fn card_abilities(catalog: &dyn EffectCatalog, card: &CardInstance) -> Vec<AbilityDef> {
    match &card.token {
        Some(definition) => catalog.abilities_from_card(definition),
        None => catalog.abilities(&card.slug),
    }
}

fn card_power(catalog: &dyn EffectCatalog, card: &CardInstance) -> Option<AssetPower> {
    match &card.token {
        Some(definition) => definition.power.clone(),
        None => catalog.asset_power(&card.slug),
    }
}

// === Registration ===

/// Register a court player's triggered abilities. Passive abilities are
/// skipped.
pub fn register_player_abilities(
    registry: &mut TriggerRegistry,
    catalog: &dyn EffectCatalog,
    state: &GameState,
    player: EntityId,
) -> Vec<TriggerId> {
    let Some(p) = state.player(player) else {
        return Vec::new();
    };
    let bindings = TriggerBindings::entity(player, p.team);
    let ids = register_abilities(registry, &p.slug, &catalog.abilities(&p.slug), bindings);
    debug!(player = %player, count = ids.len(), "player abilities registered");
    ids
}

/// Register the abilities an attached card grants to its player.
pub fn register_attached_abilities(
    registry: &mut TriggerRegistry,
    catalog: &dyn EffectCatalog,
    state: &GameState,
    card: EntityId,
) -> Vec<TriggerId> {
    let Some(instance) = state.card(card) else {
        return Vec::new();
    };
    let bindings = TriggerBindings {
        source: Some(card),
        owner: Some(instance.team),
        self_: instance.attached_to,
    };
    let abilities = card_abilities(catalog, instance);
    let ids = register_abilities(registry, &instance.slug, &abilities, bindings);
    debug!(card = %card, count = ids.len(), "attached abilities registered");
    ids
}

/// Register an in-play asset: its abilities, its power's triggers and, if
/// the power has one, its response trigger.
pub fn register_asset_triggers(
    registry: &mut TriggerRegistry,
    catalog: &dyn EffectCatalog,
    state: &GameState,
    card: EntityId,
) -> Vec<TriggerId> {
    let Some(instance) = state.card(card) else {
        return Vec::new();
    };
    let bindings = TriggerBindings::entity(card, instance.team);
    let mut ids = register_abilities(
        registry,
        &instance.slug,
        &card_abilities(catalog, instance),
        bindings,
    );

    if let Some(power) = card_power(catalog, instance) {
        for spec in &power.triggers {
            let name = format!("{}:{}", instance.slug, power.name);
            ids.push(registry.register(Trigger::from_spec(name, spec, bindings)));
        }
        if let Some(response) = &power.response {
            let effect = Effect::ApplyResponse {
                asset: card,
                prompt: response.prompt.clone(),
                effect: Box::new(response.effect.clone()),
            };
            let name = format!("{}:{}:response", instance.slug, power.name);
            let mut trigger = Trigger::new(name, response.event_type.clone(), effect)
                .with_bindings(bindings)
                .as_response();
            trigger.condition = response.condition.clone();
            ids.push(registry.register(trigger));
        }
    }
    debug!(card = %card, count = ids.len(), "asset triggers registered");
    ids
}

// === Unregistration ===

/// Remove everything a player registered. Returns how many triggers went.
pub fn unregister_player_abilities(registry: &mut TriggerRegistry, player: EntityId) -> usize {
    let removed = registry.unregister_by_source(player);
    debug!(player = %player, removed, "player abilities unregistered");
    removed
}

/// Remove everything an attached card registered.
pub fn unregister_attached_abilities(registry: &mut TriggerRegistry, card: EntityId) -> usize {
    let removed = registry.unregister_by_source(card);
    debug!(card = %card, removed, "attached abilities unregistered");
    removed
}

/// Remove everything an asset registered.
pub fn unregister_asset_triggers(registry: &mut TriggerRegistry, card: EntityId) -> usize {
    let removed = registry.unregister_by_source(card);
    debug!(card = %card, removed, "asset triggers unregistered");
    removed
}

fn register_player_with_attachments(
    registry: &mut TriggerRegistry,
    catalog: &dyn EffectCatalog,
    state: &GameState,
    player: EntityId,
) {
    register_player_abilities(registry, catalog, state, player);
    for card in state.attachments_of(player) {
        register_attached_abilities(registry, catalog, state, card);
    }
}

fn unregister_player_with_attachments(registry: &mut TriggerRegistry, state: &GameState, player: EntityId) {
    unregister_player_abilities(registry, player);
    for card in state.attachments_of(player) {
        unregister_attached_abilities(registry, card);
    }
}

// === Game Level ===

/// Build the registry for a game: default rules, then every on-court player
/// with their attachments, then every in-play asset. Bench players
/// contribute nothing.
#[must_use]
pub fn initialize_game_triggers(
    config: &EngineConfig,
    state: &GameState,
    catalog: &dyn EffectCatalog,
) -> TriggerRegistry {
    let mut registry = TriggerRegistry::new();
    for rule in default_rules(config) {
        registry.register(rule);
    }
    for player in state.players_on_court() {
        register_player_with_attachments(&mut registry, catalog, state, player);
    }
    for asset in state.assets_in_play() {
        register_asset_triggers(&mut registry, catalog, state, asset);
    }
    debug!(triggers = registry.len(), "game triggers initialized");
    registry
}

/// Bring the registry in line with `new` after `action` turned `old` into
/// `new`.
///
/// Actions with a known footprint touch only the entities they name.
/// Actions that run effects can change anything, so those diff the two
/// states.
pub fn update_registry_for_action(
    registry: &mut TriggerRegistry,
    catalog: &dyn EffectCatalog,
    old: &GameState,
    new: &GameState,
    action: &GameAction,
) {
    match action {
        GameAction::Shoot { .. } | GameAction::EndPhase { .. } => {
            reconcile_registry(registry, catalog, old, new);
        }
        GameAction::Substitute { out, incoming, .. } => {
            unregister_player_with_attachments(registry, old, *out);
            if new.is_on_court(*incoming) {
                register_player_with_attachments(registry, catalog, new, *incoming);
            }
        }
        GameAction::AttachCard { card, player } => {
            if new.is_on_court(*player) {
                register_attached_abilities(registry, catalog, new, *card);
            }
        }
        GameAction::DetachCard { card } => {
            unregister_attached_abilities(registry, *card);
        }
        GameAction::PlayCard { card, .. } => {
            // Asset or discard, by where the card ended up.
            let team = new.team_of(*card);
            if team.is_some_and(|t| new.teams[t].assets.contains(card)) {
                register_asset_triggers(registry, catalog, new, *card);
            }
        }
        GameAction::CreateToken { team, .. } => {
            let before: FxHashSet<EntityId> = old.teams[*team].assets.iter().copied().collect();
            for token in new.teams[*team].assets.iter().filter(|id| !before.contains(*id)) {
                register_asset_triggers(registry, catalog, new, *token);
            }
        }
        GameAction::RemoveAsset { card } => {
            unregister_asset_triggers(registry, *card);
        }
    }
}

/// Diff in-play assets and on-court players between two states, registering
/// arrivals and unregistering departures.
pub fn reconcile_registry(
    registry: &mut TriggerRegistry,
    catalog: &dyn EffectCatalog,
    old: &GameState,
    new: &GameState,
) {
    let old_assets: FxHashSet<EntityId> = old.assets_in_play().collect();
    let new_assets: FxHashSet<EntityId> = new.assets_in_play().collect();
    for gone in old.assets_in_play().filter(|id| !new_assets.contains(id)) {
        unregister_asset_triggers(registry, gone);
    }
    for added in new.assets_in_play().filter(|id| !old_assets.contains(id)) {
        register_asset_triggers(registry, catalog, new, added);
    }

    let old_players: FxHashSet<EntityId> = old.players_on_court().collect();
    let new_players: FxHashSet<EntityId> = new.players_on_court().collect();
    for gone in old.players_on_court().filter(|id| !new_players.contains(id)) {
        unregister_player_with_attachments(registry, old, gone);
    }
    for added in new.players_on_court().filter(|id| !old_players.contains(id)) {
        register_player_with_attachments(registry, catalog, new, added);
    }
}
