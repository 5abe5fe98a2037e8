//! Fog of war - per-combatant visibility

use serde::{Deserialize, Serialize};

use super::combatant::Combatant;
use super::rules::Rules;
use super::types::{Grid, Position, Terrain, Tile};

/// A tile as seen by a combatant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleTile {
    pub x: i32,
    pub y: i32,
    pub tile: Tile,
}

/// Visibility rules
pub struct FogOfWar;

impl FogOfWar {
    pub fn vision_radius(combatant: &Combatant, rules: &Rules) -> i32 {
        if combatant.status.scouting {
            rules.scout_radius
        } else {
            rules.vision_radius
        }
    }

    /// Every in-bounds tile within the combatant's Manhattan vision radius
    pub fn visible_tiles(combatant: &Combatant, grid: &Grid, rules: &Rules) -> Vec<VisibleTile> {
        let radius = Self::vision_radius(combatant, rules);
        let origin = combatant.position;

        (-radius..=radius)
            .flat_map(|dy| (-radius..=radius).map(move |dx| origin.offset(dx, dy)))
            .filter(|p| p.manhattan(origin) <= radius)
            .filter_map(|p| {
                grid.get(p).map(|tile| VisibleTile {
                    x: p.x,
                    y: p.y,
                    tile: tile.clone(),
                })
            })
            .collect()
    }

    /// Radius, smoke and bush checks for a combatant standing at `target`
    fn position_visible(observer: Position, target: Position, radius: i32, grid: &Grid) -> bool {
        let dist = observer.manhattan(target);
        if dist > radius {
            return false;
        }
        if grid.get(target).is_some_and(Tile::is_smoked) {
            return false;
        }
        if grid.is_terrain(target, Terrain::Bush) && dist > 1 {
            return false;
        }
        true
    }

    /// Whether `observer` can currently see `target`.
    ///
    /// Dead signal is checked first and hides the target from everyone. A live
    /// mark then bypasses radius, smoke and bush.
    pub fn can_see(observer: &Combatant, target: &Combatant, grid: &Grid, rules: &Rules) -> bool {
        if observer.id == target.id || !target.alive {
            return false;
        }
        if target.dead_signal_active() {
            return false;
        }
        if observer.is_marking(target.id) {
            return true;
        }
        Self::position_visible(
            observer.position,
            target.position,
            Self::vision_radius(observer, rules),
            grid,
        )
    }

    /// Other combatants visible to `observer`, in join order
    pub fn visible_combatants<'a>(
        observer: &Combatant,
        all: impl IntoIterator<Item = &'a Combatant>,
        grid: &Grid,
        rules: &Rules,
    ) -> Vec<&'a Combatant> {
        all.into_iter()
            .filter(|c| Self::can_see(observer, c, grid, rules))
            .collect()
    }
}
