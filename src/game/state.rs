//! Canonical match state

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::action::ActionSubmission;
use super::combatant::{Archetype, Combatant, CombatantId, Controller};
use super::event::{ChatMessage, KillFeedEntry, TurnResult};
use super::mapgen::MapGenerator;
use super::rules::Rules;
use super::types::{Grid, Position};
use super::zone::DangerZone;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Created, not started
    Lobby,
    /// Accepting one action per living combatant
    Action,
    /// Turn resolution in progress
    Resolving,
    /// At most one combatant left
    Finished,
}

/// Match state (owned by its controller)
#[derive(Debug, Clone, Serialize)]
pub struct MatchState {
    pub id: Uuid,
    pub seed: u64,
    pub rules: Rules,
    pub turn: u32,
    pub phase: MatchPhase,
    pub grid: Grid,
    /// Keyed by join index, so iteration is the canonical tie-break order
    pub combatants: BTreeMap<CombatantId, Combatant>,
    pub zone: DangerZone,
    pub messages: Vec<ChatMessage>,
    pub kill_feed: Vec<KillFeedEntry>,
    /// Actions buffered for the current turn
    pub pending: BTreeMap<CombatantId, ActionSubmission>,
    pub history: Vec<TurnResult>,
    pub winner: Option<CombatantId>,
}

impl MatchState {
    /// Empty match on a given grid; combatants keep the ids they carry
    pub fn new(id: Uuid, seed: u64, rules: Rules, grid: Grid, roster: Vec<Combatant>) -> Self {
        Self {
            id,
            seed,
            rules,
            turn: 0,
            phase: MatchPhase::Lobby,
            grid,
            combatants: roster.into_iter().map(|c| (c.id, c)).collect(),
            zone: DangerZone::new(&rules.zone),
            messages: Vec::new(),
            kill_feed: Vec::new(),
            pending: BTreeMap::new(),
            history: Vec::new(),
            winner: None,
        }
    }

    /// Standard match: one human as `player_0` and the five agent
    /// archetypes as `player_1..=player_5`, on a generated map
    pub fn standard(id: Uuid, seed: u64, rules: Rules, player_name: &str) -> Self {
        let map = MapGenerator::generate(seed);
        let spawn = |i: usize| {
            map.spawn_points
                .get(i)
                .or_else(|| map.spawn_points.get(i % map.spawn_points.len().max(1)))
                .copied()
                .unwrap_or(Position::new(0, 0))
        };

        let mut roster = vec![Combatant::new(
            CombatantId(0),
            player_name,
            Controller::Human,
            None,
            spawn(0),
        )];
        for (i, archetype) in Archetype::ALL.into_iter().enumerate() {
            roster.push(Combatant::new(
                CombatantId(i as u8 + 1),
                archetype.codename(),
                Controller::Agent,
                Some(archetype),
                spawn(i + 1),
            ));
        }

        Self::new(id, seed, rules, map.grid, roster)
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    pub fn alive(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.values().filter(|c| c.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    pub fn alive_ids(&self) -> Vec<CombatantId> {
        self.alive().map(|c| c.id).collect()
    }

    pub fn eliminated_ids(&self) -> Vec<CombatantId> {
        self.combatants
            .values()
            .filter(|c| !c.alive)
            .map(|c| c.id)
            .collect()
    }

    /// Living combatants that have not submitted this turn
    pub fn awaiting(&self) -> Vec<CombatantId> {
        self.alive()
            .filter(|c| !self.pending.contains_key(&c.id))
            .map(|c| c.id)
            .collect()
    }
}
