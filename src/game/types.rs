//! Grid, terrain and loot definitions shared by every game system

use serde::{Deserialize, Serialize};
use std::fmt;

use super::combatant::CombatantId;

/// Map width in tiles
pub const MAP_WIDTH: i32 = 12;
/// Map height in tiles
pub const MAP_HEIGHT: i32 = 12;

/// A grid cell. Signed so direction arithmetic and external targets can be
/// bounds-checked instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// King-move distance, used for weapon ranges
    pub fn chebyshev(&self, other: Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }

    pub fn in_bounds(&self) -> bool {
        self.x >= 0 && self.x < MAP_WIDTH && self.y >= 0 && self.y < MAP_HEIGHT
    }

    /// Clamp onto the map
    pub fn clamped(&self) -> Position {
        Position::new(
            self.x.clamp(0, MAP_WIDTH - 1),
            self.y.clamp(0, MAP_HEIGHT - 1),
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Compass direction for movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// Unit vector; north is towards y = 0
    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::N => (0, -1),
            Direction::NE => (1, -1),
            Direction::E => (1, 0),
            Direction::SE => (1, 1),
            Direction::S => (0, 1),
            Direction::SW => (-1, 1),
            Direction::W => (-1, 0),
            Direction::NW => (-1, -1),
        }
    }

    /// Direction that best approaches `to` from `from`, if they differ
    pub fn towards(from: Position, to: Position) -> Option<Direction> {
        let dx = (to.x - from.x).signum();
        let dy = (to.y - from.y).signum();
        Direction::ALL.into_iter().find(|d| d.vector() == (dx, dy))
    }
}

/// Terrain type of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Open,
    /// Blocks movement and line of fire
    Wall,
    /// Caps movement to a single step
    Water,
    /// Ranged cover
    Building,
    /// Conceals occupants beyond arm's length
    Bush,
}

/// Weapons, ordered from worst to best for auto-equip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weapon {
    Knife,
    Pistol,
    Shotgun,
    Rifle,
    Sniper,
}

impl Weapon {
    /// Auto-equip ranking, best first
    pub const PRIORITY: [Weapon; 5] = [
        Weapon::Sniper,
        Weapon::Rifle,
        Weapon::Shotgun,
        Weapon::Pistol,
        Weapon::Knife,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weapon::Knife => "knife",
            Weapon::Pistol => "pistol",
            Weapon::Shotgun => "shotgun",
            Weapon::Rifle => "rifle",
            Weapon::Sniper => "sniper",
        }
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Consumable items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Item {
    Medkit,
    Grenade,
    Trap,
    ArmorVest,
    SmokeBomb,
}

impl Item {
    pub fn name(self) -> &'static str {
        match self {
            Item::Medkit => "medkit",
            Item::Grenade => "grenade",
            Item::Trap => "trap",
            Item::ArmorVest => "armor_vest",
            Item::SmokeBomb => "smoke_bomb",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything that can lie on a tile or sit in an inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Loot {
    Weapon(Weapon),
    Item(Item),
}

impl fmt::Display for Loot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loot::Weapon(w) => w.fmt(f),
            Loot::Item(i) => i.fmt(f),
        }
    }
}

impl From<Weapon> for Loot {
    fn from(w: Weapon) -> Self {
        Loot::Weapon(w)
    }
}

impl From<Item> for Loot {
    fn from(i: Item) -> Self {
        Loot::Item(i)
    }
}

/// A trap armed on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub owner: CombatantId,
    pub damage: u32,
}

/// One map cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: Terrain,
    pub items: Vec<Loot>,
    pub trap: Option<Trap>,
    /// Remaining smoke turns, 0 when clear
    pub smoke_turns: u32,
}

impl Tile {
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            items: Vec::new(),
            trap: None,
            smoke_turns: 0,
        }
    }

    pub fn is_smoked(&self) -> bool {
        self.smoke_turns > 0
    }
}

/// The 12x12 tile grid, stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    tiles: Vec<Tile>,
}

impl Grid {
    /// Build from row-major tiles; the caller supplies exactly 144
    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), (MAP_WIDTH * MAP_HEIGHT) as usize);
        Self { tiles }
    }

    /// All-open grid, mostly useful for scenario setups
    pub fn open() -> Self {
        Self::from_tiles(vec![Tile::new(Terrain::Open); (MAP_WIDTH * MAP_HEIGHT) as usize])
    }

    fn index(pos: Position) -> Option<usize> {
        pos.in_bounds()
            .then(|| (pos.y * MAP_WIDTH + pos.x) as usize)
    }

    pub fn get(&self, pos: Position) -> Option<&Tile> {
        Self::index(pos).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        Self::index(pos).map(move |i| &mut self.tiles[i])
    }

    pub fn terrain(&self, pos: Position) -> Option<Terrain> {
        self.get(pos).map(|t| t.terrain)
    }

    pub fn is_terrain(&self, pos: Position, terrain: Terrain) -> bool {
        self.terrain(pos) == Some(terrain)
    }

    /// Out-of-map cells count as walls
    pub fn is_wall(&self, pos: Position) -> bool {
        self.terrain(pos).map_or(true, |t| t == Terrain::Wall)
    }

    pub fn set_terrain(&mut self, pos: Position, terrain: Terrain) {
        if let Some(tile) = self.get_mut(pos) {
            tile.terrain = terrain;
        }
    }

    /// Every position in row-major order
    pub fn positions() -> impl Iterator<Item = Position> {
        (0..MAP_HEIGHT).flat_map(|y| (0..MAP_WIDTH).map(move |x| Position::new(x, y)))
    }

    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// Stepped line-of-fire check. Walks diagonally then straight from `from`
    /// towards `to`, excluding both endpoints; leaving the map blocks the shot.
    pub fn wall_between(&self, from: Position, to: Position) -> bool {
        let dx = (to.x - from.x).signum();
        let dy = (to.y - from.y).signum();
        let mut cx = from.x + dx;
        let mut cy = from.y + dy;

        while cx != to.x || cy != to.y {
            if self.is_wall(Position::new(cx, cy)) {
                return true;
            }
            if cx != to.x {
                cx += dx;
            }
            if cy != to.y {
                cy += dy;
            }
        }
        false
    }
}
