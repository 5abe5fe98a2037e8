//! Per-combatant snapshots filtered through fog of war

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::combatant::{Archetype, Combatant, CombatantId};
use super::event::{ChatMessage, KillFeedEntry};
use super::fog::{FogOfWar, VisibleTile};
use super::state::{MatchPhase, MatchState};
use super::types::{Position, Weapon};
use super::zone::DangerZone;

/// What a combatant may know about someone else in sight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSighting {
    pub id: CombatantId,
    pub name: String,
    pub archetype: Option<Archetype>,
    pub position: Position,
    pub hp: u32,
    pub equipped: Weapon,
}

impl From<&Combatant> for CombatantSighting {
    fn from(c: &Combatant) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            archetype: c.archetype,
            position: c.position,
            hp: c.hp,
            equipped: c.equipped,
        }
    }
}

/// A combatant's view of the match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub match_id: Uuid,
    pub turn: u32,
    pub phase: MatchPhase,
    /// The viewer, unfiltered
    pub you: Combatant,
    pub visible_tiles: Vec<VisibleTile>,
    pub visible_combatants: Vec<CombatantSighting>,
    pub zone: DangerZone,
    pub messages: Vec<ChatMessage>,
    pub kill_feed: Vec<KillFeedEntry>,
    pub alive: Vec<CombatantId>,
    pub eliminated: Vec<CombatantId>,
    pub winner: Option<CombatantId>,
}

impl PlayerView {
    /// Tile the viewer is standing on
    pub fn own_tile(&self) -> Option<&VisibleTile> {
        self.visible_tiles
            .iter()
            .find(|t| t.x == self.you.position.x && t.y == self.you.position.y)
    }
}

/// Builds fog-filtered views from the canonical state
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    /// View for `viewer`, or None if no such combatant exists
    pub fn player_view(state: &MatchState, viewer: CombatantId) -> Option<PlayerView> {
        let you = state.combatant(viewer)?;

        let visible_combatants =
            FogOfWar::visible_combatants(you, state.combatants.values(), &state.grid, &state.rules)
                .into_iter()
                .map(CombatantSighting::from)
                .collect();

        let messages = state
            .messages
            .iter()
            .filter(|m| m.visible_to(viewer))
            .cloned()
            .collect();

        Some(PlayerView {
            match_id: state.id,
            turn: state.turn,
            phase: state.phase,
            you: you.clone(),
            visible_tiles: FogOfWar::visible_tiles(you, &state.grid, &state.rules),
            visible_combatants,
            zone: state.zone,
            messages,
            kill_feed: state.kill_feed.clone(),
            alive: state.alive_ids(),
            eliminated: state.eliminated_ids(),
            winner: state.winner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::Recipient;
    use crate::game::combatant::Controller;
    use crate::game::rules::Rules;
    use crate::game::types::Grid;

    fn state() -> MatchState {
        let roster = vec![
            Combatant::new(CombatantId(0), "Ada", Controller::Human, None, Position::new(5, 5)),
            Combatant::new(CombatantId(1), "VIPER", Controller::Agent, Some(Archetype::Viper), Position::new(6, 5)),
            Combatant::new(CombatantId(2), "BLAZE", Controller::Agent, Some(Archetype::Blaze), Position::new(11, 11)),
        ];
        MatchState::new(Uuid::nil(), 3, Rules::default(), Grid::open(), roster)
    }

    #[test]
    fn only_nearby_combatants_are_listed() {
        let view = SnapshotBuilder::player_view(&state(), CombatantId(0)).unwrap();
        assert_eq!(view.visible_combatants.len(), 1);
        assert_eq!(view.visible_combatants[0].id, CombatantId(1));
        assert_eq!(view.you.name, "Ada");
        assert_eq!(view.own_tile().map(|t| (t.x, t.y)), Some((5, 5)));
    }

    #[test]
    fn private_messages_are_filtered() {
        let mut s = state();
        s.messages.push(ChatMessage {
            turn: 1,
            from: CombatantId(1),
            from_name: "VIPER".into(),
            to: Recipient::Combatant(CombatantId(2)),
            text: "truce?".into(),
            private: true,
        });
        s.messages.push(ChatMessage {
            turn: 1,
            from: CombatantId(2),
            from_name: "BLAZE".into(),
            to: Recipient::All,
            text: "come at me".into(),
            private: false,
        });

        let view = SnapshotBuilder::player_view(&s, CombatantId(0)).unwrap();
        assert_eq!(view.messages.len(), 1);
        assert_eq!(view.messages[0].text, "come at me");

        let view = SnapshotBuilder::player_view(&s, CombatantId(2)).unwrap();
        assert_eq!(view.messages.len(), 2);
    }

    #[test]
    fn unknown_viewer() {
        assert!(SnapshotBuilder::player_view(&state(), CombatantId(9)).is_none());
    }
}
