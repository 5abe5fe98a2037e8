//! Tunable match rules

use serde::{Deserialize, Serialize};

/// Danger zone schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneRules {
    /// First turn on which the zone is active
    pub start_turn: u32,
    /// Turns between shrinks
    pub shrink_interval: u32,
    /// Flat damage per turn outside the safe area
    pub damage: u32,
    /// Smallest half-extent of the safe area around the map centre
    pub min_half_extent: i32,
}

impl Default for ZoneRules {
    fn default() -> Self {
        Self {
            start_turn: 5,
            shrink_interval: 3,
            damage: 20,
            min_half_extent: 2,
        }
    }
}

/// Per-match rule set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    pub zone: ZoneRules,
    /// Manhattan vision radius
    pub vision_radius: i32,
    /// Vision radius while scouting
    pub scout_radius: i32,
    /// Chance a hiding target dodges an attack
    pub dodge_chance: f64,
    /// Dodge chance for Viper
    pub viper_dodge_chance: f64,
    /// Chance a war cry cancels a nearby action
    pub flinch_chance: f64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            zone: ZoneRules::default(),
            vision_radius: 3,
            scout_radius: 6,
            dodge_chance: 0.5,
            viper_dodge_chance: 0.65,
            flinch_chance: 0.3,
        }
    }
}
