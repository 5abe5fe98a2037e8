//! Combatant state and status effects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::types::{Item, Loot, Position, Weapon};

/// Starting and maximum health
pub const MAX_HP: u32 = 100;

/// Combatant identifier; the inner value is the join index, which is also
/// the canonical ordering used for every tie-break during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CombatantId(pub u8);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player_{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid combatant id: {0}")]
pub struct InvalidCombatantId(String);

impl FromStr for CombatantId {
    type Err = InvalidCombatantId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("player_")
            .and_then(|n| n.parse().ok())
            .map(CombatantId)
            .ok_or_else(|| InvalidCombatantId(s.to_string()))
    }
}

impl TryFrom<String> for CombatantId {
    type Error = InvalidCombatantId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CombatantId> for String {
    fn from(id: CombatantId) -> Self {
        id.to_string()
    }
}

/// Who picks this combatant's actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    Human,
    Agent,
}

/// The five fixed personas, each with one special ability per match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Marks targets; dodges better while hiding
    Viper,
    /// War cry; adrenaline movement at low health
    Blaze,
    /// Dead signal; stronger traps
    Ghost,
    /// False flag messages
    Oracle,
    /// Overwatch; building specialist
    Rook,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::Viper,
        Archetype::Blaze,
        Archetype::Ghost,
        Archetype::Oracle,
        Archetype::Rook,
    ];

    /// Display name used when the archetype is played by an agent
    pub fn codename(self) -> &'static str {
        match self {
            Archetype::Viper => "VIPER",
            Archetype::Blaze => "BLAZE",
            Archetype::Ghost => "GHOST",
            Archetype::Oracle => "ORACLE",
            Archetype::Rook => "ROOK",
        }
    }
}

/// A status that runs for a number of turns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEffect<T> {
    pub payload: T,
    pub turns_left: u32,
}

impl<T> TimedEffect<T> {
    pub fn new(payload: T, turns: u32) -> Self {
        Self {
            payload,
            turns_left: turns,
        }
    }

    pub fn is_live(&self) -> bool {
        self.turns_left > 0
    }

    /// Count down one turn; true once the effect has run out
    pub fn tick(&mut self) -> bool {
        self.turns_left = self.turns_left.saturating_sub(1);
        self.turns_left == 0
    }
}

/// Tick an optional effect in place, dropping it on expiry
pub fn tick_effect<T>(slot: &mut Option<TimedEffect<T>>) {
    if slot.as_mut().is_some_and(TimedEffect::tick) {
        *slot = None;
    }
}

/// Transient per-combatant flags and timers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub hiding: bool,
    pub scouting: bool,
    /// One-hit armor charge
    pub armored: bool,
    pub immobilized: bool,
    pub moved_last_turn: bool,
    pub special_used: bool,
    pub mark: Option<TimedEffect<CombatantId>>,
    pub dead_signal: Option<TimedEffect<()>>,
    pub overwatch: Option<TimedEffect<Vec<Position>>>,
}

impl Status {
    /// End-of-turn countdown for mark and dead signal. Overwatch counts down
    /// when it is checked at the start of the next turn instead.
    pub fn decay(&mut self) {
        tick_effect(&mut self.mark);
        tick_effect(&mut self.dead_signal);
        self.immobilized = false;
    }
}

/// Authoritative combatant state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub controller: Controller,
    pub archetype: Option<Archetype>,

    pub hp: u32,
    pub max_hp: u32,
    pub alive: bool,
    pub position: Position,

    pub inventory: Vec<Loot>,
    pub equipped: Weapon,

    pub status: Status,

    // Stats
    pub kills: u32,
    pub damage_dealt: u32,
    pub damage_taken: u32,
}

impl Combatant {
    pub fn new(
        id: CombatantId,
        name: impl Into<String>,
        controller: Controller,
        archetype: Option<Archetype>,
        position: Position,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            controller,
            archetype,
            hp: MAX_HP,
            max_hp: MAX_HP,
            alive: true,
            position,
            inventory: vec![Loot::Weapon(Weapon::Knife)],
            equipped: Weapon::Knife,
            status: Status::default(),
            kills: 0,
            damage_dealt: 0,
            damage_taken: 0,
        }
    }

    pub fn is(&self, archetype: Archetype) -> bool {
        self.archetype == Some(archetype)
    }

    pub fn holds(&self, loot: impl Into<Loot>) -> bool {
        let loot = loot.into();
        self.inventory.contains(&loot)
    }

    /// Remove one item from the inventory; false if none is held
    pub fn consume(&mut self, item: Item) -> bool {
        match self.inventory.iter().position(|l| *l == Loot::Item(item)) {
            Some(idx) => {
                self.inventory.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    /// Equip the best held weapon
    pub fn equip_best(&mut self) {
        if let Some(best) = Weapon::PRIORITY.into_iter().find(|w| self.holds(*w)) {
            self.equipped = best;
        }
    }

    /// Lower hp by `amount`, clamping at zero
    pub fn take_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
        self.damage_taken += amount;
    }

    /// Heal up to `amount` without passing max hp; returns the amount healed
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_hp.saturating_sub(self.hp));
        self.hp += healed;
        healed
    }

    /// Whether this combatant currently holds a live mark on `target`
    pub fn is_marking(&self, target: CombatantId) -> bool {
        self.status
            .mark
            .as_ref()
            .is_some_and(|m| m.payload == target && m.is_live())
    }

    pub fn dead_signal_active(&self) -> bool {
        self.status.dead_signal.as_ref().is_some_and(TimedEffect::is_live)
    }

    /// Overwatch tiles while the zone is armed
    pub fn overwatch_tiles(&self) -> Option<&[Position]> {
        self.status
            .overwatch
            .as_ref()
            .filter(|o| o.is_live())
            .map(|o| o.payload.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combatant() -> Combatant {
        Combatant::new(
            CombatantId(1),
            "VIPER",
            Controller::Agent,
            Some(Archetype::Viper),
            Position::new(0, 0),
        )
    }

    #[test]
    fn id_round_trips_through_string() {
        assert_eq!("player_3".parse::<CombatantId>().unwrap(), CombatantId(3));
        assert!("zone".parse::<CombatantId>().is_err());
        assert_eq!(serde_json::to_string(&CombatantId(4)).unwrap(), "\"player_4\"");
    }

    #[test]
    fn timed_effect_expires_after_its_turns() {
        let mut slot = Some(TimedEffect::new((), 2));
        tick_effect(&mut slot);
        assert!(slot.is_some());
        tick_effect(&mut slot);
        assert!(slot.is_none());
    }

    #[test]
    fn equip_best_follows_priority() {
        let mut c = combatant();
        c.inventory.push(Loot::Weapon(Weapon::Pistol));
        c.inventory.push(Loot::Weapon(Weapon::Rifle));
        c.equip_best();
        assert_eq!(c.equipped, Weapon::Rifle);
    }

    #[test]
    fn heal_caps_at_max() {
        let mut c = combatant();
        c.hp = 80;
        assert_eq!(c.heal(40), 20);
        assert_eq!(c.hp, MAX_HP);
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut c = combatant();
        c.take_damage(150);
        assert_eq!(c.hp, 0);
    }

    #[test]
    fn consume_removes_one() {
        let mut c = combatant();
        c.inventory.push(Loot::Item(Item::Medkit));
        c.inventory.push(Loot::Item(Item::Medkit));
        assert!(c.consume(Item::Medkit));
        assert!(c.holds(Item::Medkit));
        assert!(c.consume(Item::Medkit));
        assert!(!c.consume(Item::Medkit));
    }
}
