//! Built-in rule-of-thumb policy for agent combatants

use std::future::Future;

use super::{DecisionError, DecisionProvider};
use crate::game::combat::WeaponStats;
use crate::game::{Action, ActionSubmission, Archetype, Direction, Item, PlayerView, Position};

/// Hp at or below which a held medkit gets used
const HEAL_THRESHOLD: u32 = 50;
/// Hp below which Ghost fakes its death
const DEAD_SIGNAL_THRESHOLD: u32 = 50;

/// Deterministic policy: heal, shoot, use the special, loot, stay in the
/// zone, head for visible loot, otherwise alternate scouting and hiding.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicProvider;

impl HeuristicProvider {
    pub fn choose(view: &PlayerView) -> Action {
        let me = &view.you;
        let stats = WeaponStats::for_weapon(me.equipped);

        if me.hp <= HEAL_THRESHOLD && me.holds(Item::Medkit) {
            return Action::UseItem {
                item: Item::Medkit,
                target: None,
            };
        }

        let can_fire = !(stats.requires_setup && me.status.moved_last_turn);
        let in_range = view
            .visible_combatants
            .iter()
            .filter(|c| me.position.chebyshev(c.position) <= stats.range)
            .min_by_key(|c| (c.hp, c.id));
        if let (true, Some(target)) = (can_fire, in_range) {
            return Action::Attack {
                target: target.position,
                weapon: None,
            };
        }

        if let Some(special) = Self::special(view) {
            return special;
        }

        if view.own_tile().is_some_and(|t| !t.tile.items.is_empty()) {
            return Action::Loot;
        }

        if view.zone.active && !view.zone.safe_area.contains(me.position) {
            if let Some(step) = Self::step_towards(me.position, view.zone.safe_area.center()) {
                return step;
            }
        }

        let nearest_loot = view
            .visible_tiles
            .iter()
            .filter(|t| !t.tile.items.is_empty())
            .map(|t| Position::new(t.x, t.y))
            .min_by_key(|p| (me.position.manhattan(*p), p.y, p.x));
        if let Some(step) = nearest_loot.and_then(|p| Self::step_towards(me.position, p)) {
            return step;
        }

        if view.turn % 2 == 1 {
            Action::Scout
        } else {
            Action::Hide
        }
    }

    fn special(view: &PlayerView) -> Option<Action> {
        let me = &view.you;
        if me.status.special_used {
            return None;
        }
        let nearest = view
            .visible_combatants
            .iter()
            .min_by_key(|c| (me.position.manhattan(c.position), c.id));

        match me.archetype? {
            Archetype::Viper => nearest.map(|c| Action::MarkTarget { target_id: c.id }),
            Archetype::Blaze => nearest
                .filter(|c| me.position.manhattan(c.position) <= 2)
                .map(|_| Action::WarCry),
            Archetype::Ghost => (me.hp < DEAD_SIGNAL_THRESHOLD).then_some(Action::DeadSignal),
            Archetype::Rook => {
                let tiles: Vec<Position> = Direction::ALL
                    .iter()
                    .map(|d| {
                        let (dx, dy) = d.vector();
                        me.position.offset(dx * 2, dy * 2)
                    })
                    .filter(Position::in_bounds)
                    .collect();
                (nearest.is_none() && !tiles.is_empty()).then_some(Action::Overwatch { tiles })
            }
            Archetype::Oracle => None,
        }
    }

    fn step_towards(from: Position, to: Position) -> Option<Action> {
        let direction = Direction::towards(from, to)?;
        let distance = from.chebyshev(to).clamp(1, 2) as u32;
        Some(Action::Move { direction, distance })
    }
}

impl DecisionProvider for HeuristicProvider {
    fn decide(
        &self,
        view: PlayerView,
    ) -> impl Future<Output = Result<ActionSubmission, DecisionError>> + Send {
        std::future::ready(Ok(ActionSubmission::new(Self::choose(&view))))
    }
}
