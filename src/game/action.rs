//! Player actions submitted once per turn

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::combatant::{Archetype, CombatantId};
use super::types::{Direction, Item, Position, Weapon};

/// Message addressee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Recipient {
    All,
    Combatant(CombatantId),
}

impl Recipient {
    pub fn is_public(&self) -> bool {
        matches!(self, Recipient::All)
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipient::All => f.write_str("all"),
            Recipient::Combatant(id) => id.fmt(f),
        }
    }
}

impl FromStr for Recipient {
    type Err = super::combatant::InvalidCombatantId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Recipient::All)
        } else {
            s.parse().map(Recipient::Combatant)
        }
    }
}

impl TryFrom<String> for Recipient {
    type Error = super::combatant::InvalidCombatantId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Recipient> for String {
    fn from(r: Recipient) -> Self {
        r.to_string()
    }
}

/// A message attached to an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub to: Recipient,
    pub text: String,
}

fn default_distance() -> u32 {
    1
}

/// One turn's action. Each variant carries only what it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Move {
        direction: Direction,
        #[serde(default = "default_distance")]
        distance: u32,
    },
    Attack {
        target: Position,
        /// Defaults to the equipped weapon
        #[serde(default)]
        weapon: Option<Weapon>,
    },
    Loot,
    Hide,
    Scout,
    UseItem {
        item: Item,
        #[serde(default)]
        target: Option<Position>,
    },
    MarkTarget {
        target_id: CombatantId,
    },
    WarCry,
    DeadSignal,
    FalseFlag {
        fake_sender: CombatantId,
        to: Recipient,
        text: String,
    },
    Overwatch {
        tiles: Vec<Position>,
    },
}

impl Action {
    pub fn is_move(&self) -> bool {
        matches!(self, Action::Move { .. })
    }

    /// The archetype allowed to use this action, for special abilities
    pub fn required_archetype(&self) -> Option<Archetype> {
        match self {
            Action::MarkTarget { .. } => Some(Archetype::Viper),
            Action::WarCry => Some(Archetype::Blaze),
            Action::DeadSignal => Some(Archetype::Ghost),
            Action::FalseFlag { .. } => Some(Archetype::Oracle),
            Action::Overwatch { .. } => Some(Archetype::Rook),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Move { .. } => "move",
            Action::Attack { .. } => "attack",
            Action::Loot => "loot",
            Action::Hide => "hide",
            Action::Scout => "scout",
            Action::UseItem { .. } => "use_item",
            Action::MarkTarget { .. } => "mark_target",
            Action::WarCry => "war_cry",
            Action::DeadSignal => "dead_signal",
            Action::FalseFlag { .. } => "false_flag",
            Action::Overwatch { .. } => "overwatch",
        }
    }
}

/// An action plus the messages sent alongside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSubmission {
    pub action: Action,
    #[serde(default)]
    pub messages: Vec<OutboundMessage>,
}

impl ActionSubmission {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            messages: Vec::new(),
        }
    }

    /// What a combatant does when no usable decision arrives
    pub fn fallback() -> Self {
        Self::new(Action::Hide)
    }

    pub fn with_message(mut self, to: Recipient, text: impl Into<String>) -> Self {
        self.messages.push(OutboundMessage {
            to,
            text: text.into(),
        });
        self
    }
}

impl From<Action> for ActionSubmission {
    fn from(action: Action) -> Self {
        Self::new(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_json() {
        let json = r#"{
            "action": {"type": "move", "direction": "NE", "distance": 2},
            "messages": [{"to": "all", "text": "coming for you"}]
        }"#;
        let sub: ActionSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(
            sub.action,
            Action::Move {
                direction: Direction::NE,
                distance: 2
            }
        );
        assert_eq!(sub.messages[0].to, Recipient::All);
    }

    #[test]
    fn missing_fields_are_rejected() {
        let json = r#"{"action": {"type": "attack"}}"#;
        assert!(serde_json::from_str::<ActionSubmission>(json).is_err());
    }

    #[test]
    fn distance_defaults_to_one() {
        let sub: ActionSubmission =
            serde_json::from_str(r#"{"action": {"type": "move", "direction": "S"}}"#).unwrap();
        assert_eq!(
            sub.action,
            Action::Move {
                direction: Direction::S,
                distance: 1
            }
        );
    }

    #[test]
    fn recipient_parses_ids() {
        assert_eq!(
            "player_2".parse::<Recipient>().unwrap(),
            Recipient::Combatant(CombatantId(2))
        );
        assert_eq!("all".parse::<Recipient>().unwrap(), Recipient::All);
    }
}
