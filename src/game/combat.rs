//! Combat tables - weapon stats, item stats, damage formulas

use super::combatant::{Archetype, Combatant};
use super::types::{Terrain, Weapon};

/// Shotgun damage at point-blank range
pub const SHOTGUN_CLOSE_RANGE_DAMAGE: u32 = 60;
/// Ranged damage reduction for a target standing in a building
pub const BUILDING_RANGED_REDUCTION: u32 = 10;
pub const ROOK_BUILDING_RANGED_REDUCTION: u32 = 20;
/// Floor after building reduction
pub const BUILDING_MIN_DAMAGE: u32 = 5;
/// Rook's bonus when firing from a building
pub const ROOK_BUILDING_DAMAGE_BONUS: u32 = 5;
/// Damage absorbed by an armor vest charge
pub const ARMOR_ABSORB: u32 = 15;

pub const MEDKIT_HEAL: u32 = 40;
pub const GRENADE_RANGE: i32 = 3;
pub const GRENADE_DAMAGE: u32 = 30;
pub const GRENADE_RADIUS: i32 = 1;
pub const TRAP_DAMAGE: u32 = 25;
pub const GHOST_TRAP_DAMAGE: u32 = 35;
pub const SMOKE_DURATION: u32 = 2;

pub const DEFAULT_MOVE_RANGE: u32 = 2;
pub const BLAZE_ADRENALINE_MOVE_RANGE: u32 = 3;
pub const BLAZE_ADRENALINE_THRESHOLD: u32 = 40;

pub const MARK_DURATION: u32 = 3;
pub const DEAD_SIGNAL_DURATION: u32 = 2;
pub const OVERWATCH_DURATION: u32 = 2;
pub const WAR_CRY_REVEAL_RADIUS: i32 = 4;
pub const WAR_CRY_FLINCH_RADIUS: i32 = 2;

/// Weapon stats per weapon type
#[derive(Debug, Clone, Copy)]
pub struct WeaponStats {
    /// Chebyshev range
    pub range: i32,
    /// Damage per hit
    pub damage: u32,
    /// Hits do not reveal the attacker
    pub silent: bool,
    /// Attacker must not have moved the previous turn
    pub requires_setup: bool,
}

impl WeaponStats {
    pub fn for_weapon(weapon: Weapon) -> Self {
        match weapon {
            Weapon::Knife => Self {
                range: 1,
                damage: 35,
                silent: true,
                requires_setup: false,
            },
            Weapon::Pistol => Self {
                range: 3,
                damage: 25,
                silent: false,
                requires_setup: false,
            },
            Weapon::Shotgun => Self {
                range: 2,
                damage: 45,
                silent: false,
                requires_setup: false,
            },
            Weapon::Rifle => Self {
                range: 5,
                damage: 30,
                silent: false,
                requires_setup: false,
            },
            Weapon::Sniper => Self {
                range: 7,
                damage: 50,
                silent: false,
                requires_setup: true,
            },
        }
    }
}

/// Combat formulas shared by attacks, overwatch and items
pub struct CombatSystem;

impl CombatSystem {
    /// Rook's bonus for firing a non-knife weapon from a building
    pub fn building_bonus(attacker: &Combatant, attacker_terrain: Option<Terrain>, weapon: Weapon) -> u32 {
        if attacker.is(Archetype::Rook)
            && attacker_terrain == Some(Terrain::Building)
            && weapon != Weapon::Knife
        {
            ROOK_BUILDING_DAMAGE_BONUS
        } else {
            0
        }
    }

    /// Overwatch fire: base weapon damage plus the building bonus
    pub fn overwatch_damage(watcher: &Combatant, watcher_terrain: Option<Terrain>) -> u32 {
        WeaponStats::for_weapon(watcher.equipped).damage
            + Self::building_bonus(watcher, watcher_terrain, watcher.equipped)
    }

    /// Attack damage before armor
    pub fn attack_damage(
        attacker: &Combatant,
        attacker_terrain: Option<Terrain>,
        target: &Combatant,
        target_terrain: Option<Terrain>,
        weapon: Weapon,
        distance: i32,
    ) -> u32 {
        let stats = WeaponStats::for_weapon(weapon);
        let mut damage = if weapon == Weapon::Shotgun && distance <= 1 {
            SHOTGUN_CLOSE_RANGE_DAMAGE
        } else {
            stats.damage
        };

        damage += Self::building_bonus(attacker, attacker_terrain, weapon);

        if weapon != Weapon::Knife && target_terrain == Some(Terrain::Building) {
            let reduction = if target.is(Archetype::Rook) {
                ROOK_BUILDING_RANGED_REDUCTION
            } else {
                BUILDING_RANGED_REDUCTION
            };
            damage = damage.saturating_sub(reduction).max(BUILDING_MIN_DAMAGE);
        }

        damage
    }

    /// Apply an armor charge if present. Returns (net damage, absorbed).
    pub fn absorb(target: &mut Combatant, damage: u32) -> (u32, u32) {
        if target.status.armored {
            target.status.armored = false;
            (damage.saturating_sub(ARMOR_ABSORB), ARMOR_ABSORB)
        } else {
            (damage, 0)
        }
    }

    /// Dodge chance for a hiding target
    pub fn dodge_chance(target: &Combatant, base: f64, viper: f64) -> f64 {
        if target.is(Archetype::Viper) {
            viper
        } else {
            base
        }
    }

    /// Movement cap; Blaze gets an adrenaline bonus at low health
    pub fn max_move(combatant: &Combatant) -> u32 {
        if combatant.is(Archetype::Blaze) && combatant.hp < BLAZE_ADRENALINE_THRESHOLD {
            BLAZE_ADRENALINE_MOVE_RANGE
        } else {
            DEFAULT_MOVE_RANGE
        }
    }

    pub fn trap_damage(owner: &Combatant) -> u32 {
        if owner.is(Archetype::Ghost) {
            GHOST_TRAP_DAMAGE
        } else {
            TRAP_DAMAGE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::combatant::{CombatantId, Controller};
    use crate::game::types::Position;

    fn combatant(archetype: Option<Archetype>) -> Combatant {
        Combatant::new(CombatantId(0), "test", Controller::Agent, archetype, Position::new(0, 0))
    }

    #[test]
    fn shotgun_point_blank() {
        let a = combatant(None);
        let t = combatant(None);
        assert_eq!(CombatSystem::attack_damage(&a, None, &t, None, Weapon::Shotgun, 1), 60);
        assert_eq!(CombatSystem::attack_damage(&a, None, &t, None, Weapon::Shotgun, 2), 45);
    }

    #[test]
    fn building_cover_has_floor() {
        let a = combatant(None);
        let rook = combatant(Some(Archetype::Rook));
        let plain = combatant(None);
        let b = Some(Terrain::Building);
        assert_eq!(CombatSystem::attack_damage(&a, None, &plain, b, Weapon::Pistol, 3), 15);
        assert_eq!(CombatSystem::attack_damage(&a, None, &rook, b, Weapon::Pistol, 3), 5);
        // Knife ignores cover
        assert_eq!(CombatSystem::attack_damage(&a, None, &rook, b, Weapon::Knife, 1), 35);
    }

    #[test]
    fn rook_fires_harder_from_building() {
        let mut rook = combatant(Some(Archetype::Rook));
        let t = combatant(None);
        let b = Some(Terrain::Building);
        assert_eq!(CombatSystem::attack_damage(&rook, b, &t, None, Weapon::Rifle, 4), 35);
        assert_eq!(CombatSystem::attack_damage(&rook, b, &t, None, Weapon::Knife, 1), 35);
        rook.equipped = Weapon::Rifle;
        assert_eq!(CombatSystem::overwatch_damage(&rook, b), 35);
        assert_eq!(CombatSystem::overwatch_damage(&rook, None), 30);
    }

    #[test]
    fn armor_absorbs_once() {
        let mut t = combatant(None);
        t.status.armored = true;
        assert_eq!(CombatSystem::absorb(&mut t, 25), (10, ARMOR_ABSORB));
        assert_eq!(CombatSystem::absorb(&mut t, 25), (25, 0));
    }

    #[test]
    fn blaze_adrenaline() {
        let mut blaze = combatant(Some(Archetype::Blaze));
        assert_eq!(CombatSystem::max_move(&blaze), 2);
        blaze.hp = 39;
        assert_eq!(CombatSystem::max_move(&blaze), 3);
    }
}
