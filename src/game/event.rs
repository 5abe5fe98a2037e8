//! Turn events, kill feed and chat log entries

use serde::{Deserialize, Serialize};

use super::action::Recipient;
use super::combatant::CombatantId;
use super::types::{Item, Loot, Position, Weapon};

/// Event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Move,
    Attack,
    Loot,
    Hide,
    Scout,
    UseItem,
    TrapTriggered,
    Elimination,
    DangerZone,
    OverwatchFire,
    SpecialAbility,
    Damage,
}

/// Why an attack did no damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissReason {
    NoWeapon,
    OutOfRange,
    WallBlocked,
    NotSetUp,
    NoTarget,
    Dodged,
}

/// Why an item use did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FizzleReason {
    NotHeld,
    NoTarget,
    OutOfRange,
}

/// What a kill or damage is credited to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageCause {
    Weapon(Weapon),
    Item(Item),
    Zone,
}

impl DamageCause {
    pub fn label(&self) -> &'static str {
        match self {
            DamageCause::Weapon(w) => w.name(),
            DamageCause::Item(i) => i.name(),
            DamageCause::Zone => "danger_zone",
        }
    }
}

/// Structured event data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    Hid,
    Scouted,
    Moved {
        from: Position,
        to: Position,
    },
    MoveBlocked {
        from: Position,
        toward: Position,
    },
    TrapTriggered {
        damage: u32,
        at: Position,
    },
    OverwatchFire {
        weapon: Weapon,
        damage: u32,
        tile: Position,
    },
    AttackHit {
        weapon: Weapon,
        damage: u32,
        /// False for silent (knife) kills
        reveal: bool,
        target_hp: u32,
    },
    AttackMissed {
        weapon: Weapon,
        reason: MissReason,
    },
    ArmorAbsorbed {
        absorbed: u32,
    },
    Healed {
        amount: u32,
        hp: u32,
    },
    GrenadeThrown {
        at: Position,
    },
    BlastDamage {
        damage: u32,
    },
    TrapPlaced {
        at: Position,
    },
    ArmorEquipped,
    SmokeDeployed {
        at: Position,
    },
    ItemFizzled {
        item: Item,
        reason: FizzleReason,
    },
    Looted {
        items: Vec<Loot>,
        equipped: Weapon,
    },
    MarkTarget {
        target: CombatantId,
    },
    WarCry {
        revealed: Vec<CombatantId>,
        flinched: Vec<CombatantId>,
    },
    DeadSignal,
    FalseFlag,
    Overwatch {
        tiles: Vec<Position>,
    },
    ZoneDamage {
        damage: u32,
        hp: u32,
    },
    Eliminated {
        killer: Option<CombatantId>,
        killer_name: String,
        cause: DamageCause,
    },
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Hid => EventKind::Hide,
            EventPayload::Scouted => EventKind::Scout,
            EventPayload::Moved { .. } | EventPayload::MoveBlocked { .. } => EventKind::Move,
            EventPayload::TrapTriggered { .. } => EventKind::TrapTriggered,
            EventPayload::OverwatchFire { .. } => EventKind::OverwatchFire,
            EventPayload::AttackHit { .. } | EventPayload::AttackMissed { .. } => EventKind::Attack,
            EventPayload::ArmorAbsorbed { .. } | EventPayload::BlastDamage { .. } => {
                EventKind::Damage
            }
            EventPayload::Healed { .. }
            | EventPayload::GrenadeThrown { .. }
            | EventPayload::TrapPlaced { .. }
            | EventPayload::ArmorEquipped
            | EventPayload::SmokeDeployed { .. }
            | EventPayload::ItemFizzled { .. } => EventKind::UseItem,
            EventPayload::Looted { .. } => EventKind::Loot,
            EventPayload::MarkTarget { .. }
            | EventPayload::WarCry { .. }
            | EventPayload::DeadSignal
            | EventPayload::FalseFlag
            | EventPayload::Overwatch { .. } => EventKind::SpecialAbility,
            EventPayload::ZoneDamage { .. } => EventKind::DangerZone,
            EventPayload::Eliminated { .. } => EventKind::Elimination,
        }
    }
}

/// One entry of a turn's event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// 1-based, strictly increasing within a turn
    pub order: u32,
    pub kind: EventKind,
    pub actor: Option<CombatantId>,
    pub target: Option<CombatantId>,
    pub payload: EventPayload,
    pub narration: String,
}

/// Kill feed entry; `killer` is None for zone deaths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillFeedEntry {
    pub turn: u32,
    pub killer: Option<CombatantId>,
    pub killer_name: String,
    pub victim: CombatantId,
    pub victim_name: String,
    pub cause: DamageCause,
    pub narration: String,
}

/// Logged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub turn: u32,
    pub from: CombatantId,
    pub from_name: String,
    pub to: Recipient,
    pub text: String,
    pub private: bool,
}

impl ChatMessage {
    /// Whether `viewer` may read this message
    pub fn visible_to(&self, viewer: CombatantId) -> bool {
        match self.to {
            Recipient::All => true,
            Recipient::Combatant(id) => id == viewer || self.from == viewer,
        }
    }
}

/// Outcome of resolving one turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    pub turn: u32,
    pub events: Vec<GameEvent>,
    pub eliminated: Vec<CombatantId>,
    pub narration_summary: String,
}

impl TurnResult {
    pub fn new(turn: u32, events: Vec<GameEvent>, eliminated: Vec<CombatantId>) -> Self {
        let narration_summary = summarize(turn, &events);
        Self {
            turn,
            events,
            eliminated,
            narration_summary,
        }
    }
}

/// Join the notable narrations of a turn
fn summarize(turn: u32, events: &[GameEvent]) -> String {
    let notable: Vec<&str> = events
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                EventKind::Attack | EventKind::Elimination | EventKind::SpecialAbility
            )
        })
        .map(|e| e.narration.as_str())
        .collect();

    if notable.is_empty() {
        format!("Turn {} passes quietly. The tension builds.", turn)
    } else {
        notable.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(order: u32, payload: EventPayload, narration: &str) -> GameEvent {
        GameEvent {
            order,
            kind: payload.kind(),
            actor: None,
            target: None,
            payload,
            narration: narration.to_string(),
        }
    }

    #[test]
    fn summary_keeps_notable_events_only() {
        let events = vec![
            event(1, EventPayload::Hid, "A hides."),
            event(
                2,
                EventPayload::AttackMissed {
                    weapon: Weapon::Pistol,
                    reason: MissReason::NoTarget,
                },
                "B fires at empty ground.",
            ),
            event(3, EventPayload::DeadSignal, "C goes dark."),
        ];
        let result = TurnResult::new(4, events, vec![]);
        assert_eq!(result.narration_summary, "B fires at empty ground. C goes dark.");
    }

    #[test]
    fn quiet_turn_summary() {
        let result = TurnResult::new(7, vec![event(1, EventPayload::Scouted, "A scouts.")], vec![]);
        assert_eq!(
            result.narration_summary,
            "Turn 7 passes quietly. The tension builds."
        );
    }

    #[test]
    fn private_messages_reach_sender_and_recipient_only() {
        let msg = ChatMessage {
            turn: 1,
            from: CombatantId(1),
            from_name: "VIPER".into(),
            to: Recipient::Combatant(CombatantId(2)),
            text: "truce?".into(),
            private: true,
        };
        assert!(msg.visible_to(CombatantId(1)));
        assert!(msg.visible_to(CombatantId(2)));
        assert!(!msg.visible_to(CombatantId(3)));
    }
}
