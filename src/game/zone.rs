//! Danger zone - shrinking safe rectangle

use serde::{Deserialize, Serialize};

use super::combatant::{Combatant, CombatantId};
use super::rules::ZoneRules;
use super::types::{Position, MAP_HEIGHT, MAP_WIDTH};

/// Inclusive safe rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeArea {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl SafeArea {
    pub fn full_map() -> Self {
        Self {
            min_x: 0,
            min_y: 0,
            max_x: MAP_WIDTH - 1,
            max_y: MAP_HEIGHT - 1,
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.min_x && pos.x <= self.max_x && pos.y >= self.min_y && pos.y <= self.max_y
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }

    pub fn center(&self) -> Position {
        Position::new((self.min_x + self.max_x) / 2, (self.min_y + self.max_y) / 2)
    }
}

/// Zone state machine: inactive until the start turn, then shrinking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DangerZone {
    pub safe_area: SafeArea,
    pub turns_until_next_shrink: u32,
    pub active: bool,
}

impl DangerZone {
    pub fn new(rules: &ZoneRules) -> Self {
        Self {
            safe_area: SafeArea::full_map(),
            turns_until_next_shrink: rules.start_turn,
            active: false,
        }
    }

    /// Zone state for `turn`. Pure in (turn, rules), so the rectangle can only
    /// shrink as turns advance.
    pub fn at_turn(turn: u32, rules: &ZoneRules) -> Self {
        if turn < rules.start_turn {
            return Self {
                safe_area: SafeArea::full_map(),
                turns_until_next_shrink: rules.start_turn - turn,
                active: false,
            };
        }

        let interval = rules.shrink_interval.max(1);
        let since_start = turn - rules.start_turn;
        let shrink_count = (since_start / interval + 1) as i32;
        let turns_until_next_shrink = interval - since_start % interval;

        let min = rules.min_half_extent;
        let center_x = MAP_WIDTH / 2;
        let center_y = MAP_HEIGHT / 2;
        let max_shrink = MAP_WIDTH / 2 - min;
        let shrink = shrink_count.min(max_shrink);

        Self {
            safe_area: SafeArea {
                min_x: shrink.min(center_x - min),
                min_y: shrink.min(center_y - min),
                max_x: (MAP_WIDTH - 1 - shrink).max(center_x + min),
                max_y: (MAP_HEIGHT - 1 - shrink).max(center_y + min),
            },
            turns_until_next_shrink,
            active: true,
        }
    }

    pub fn advance(&mut self, turn: u32, rules: &ZoneRules) {
        *self = Self::at_turn(turn, rules);
    }

    pub fn is_safe(&self, pos: Position) -> bool {
        !self.active || self.safe_area.contains(pos)
    }

    /// Damage every living combatant outside the safe area. Returns who was
    /// hit, in iteration order, with their remaining hp.
    ///
    /// "Living" means not yet eliminated: a combatant brought to 0 hp earlier
    /// in the turn is still hit, so the zone becomes its last damage source.
    pub fn apply_damage<'a>(
        &self,
        combatants: impl IntoIterator<Item = &'a mut Combatant>,
        damage: u32,
    ) -> Vec<(CombatantId, u32)> {
        if !self.active {
            return Vec::new();
        }

        combatants
            .into_iter()
            .filter(|c| c.alive && !self.safe_area.contains(c.position))
            .map(|c| {
                c.take_damage(damage);
                (c.id, c.hp)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::combatant::Controller;

    #[test]
    fn inactive_before_start() {
        let rules = ZoneRules::default();
        let zone = DangerZone::at_turn(2, &rules);
        assert!(!zone.active);
        assert_eq!(zone.safe_area, SafeArea::full_map());
        assert_eq!(zone.turns_until_next_shrink, 3);
    }

    #[test]
    fn shrinks_on_start_turn() {
        let rules = ZoneRules::default();
        let zone = DangerZone::at_turn(5, &rules);
        assert!(zone.active);
        assert_eq!(
            zone.safe_area,
            SafeArea {
                min_x: 1,
                min_y: 1,
                max_x: 10,
                max_y: 10
            }
        );
        assert_eq!(zone.turns_until_next_shrink, 3);
        assert_eq!(DangerZone::at_turn(7, &rules).turns_until_next_shrink, 1);
        assert_eq!(DangerZone::at_turn(8, &rules).safe_area.min_x, 2);
    }

    #[test]
    fn bottoms_out_at_minimum() {
        let rules = ZoneRules::default();
        let zone = DangerZone::at_turn(200, &rules);
        assert_eq!(
            zone.safe_area,
            SafeArea {
                min_x: 4,
                min_y: 4,
                max_x: 8,
                max_y: 8
            }
        );
    }

    #[test]
    fn damages_only_outside() {
        let rules = ZoneRules::default();
        let zone = DangerZone::at_turn(5, &rules);
        let mut inside = Combatant::new(CombatantId(0), "in", Controller::Agent, None, Position::new(5, 5));
        let mut outside = Combatant::new(CombatantId(1), "out", Controller::Agent, None, Position::new(0, 5));
        let hit = zone.apply_damage([&mut inside, &mut outside], rules.damage);
        assert_eq!(hit, vec![(CombatantId(1), 80)]);
        assert_eq!(inside.hp, 100);
    }

    #[test]
    fn downed_but_not_eliminated_still_burns() {
        let rules = ZoneRules::default();
        let zone = DangerZone::at_turn(5, &rules);
        let mut downed = Combatant::new(CombatantId(0), "down", Controller::Agent, None, Position::new(0, 0));
        downed.hp = 0;
        let mut gone = Combatant::new(CombatantId(1), "gone", Controller::Agent, None, Position::new(0, 1));
        gone.hp = 0;
        gone.alive = false;

        let hit = zone.apply_damage([&mut downed, &mut gone], rules.damage);
        assert_eq!(hit, vec![(CombatantId(0), 0)]);
        assert_eq!(downed.damage_taken, rules.damage);
        assert_eq!(gone.damage_taken, 0);
    }
}
