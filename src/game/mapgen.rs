//! Seeded procedural map and spawn generation

use tracing::debug;

use super::types::{Grid, Item, Loot, Position, Terrain, Tile, Weapon, MAP_HEIGHT, MAP_WIDTH};

/// Number of spawn points per map
pub const SPAWN_COUNT: usize = 6;
/// Preferred minimum Manhattan distance between spawns
pub const SPAWN_MIN_SEPARATION: i32 = 4;

/// Terrain share of the map, in percent. Whatever is left is padded as open.
const TERRAIN_DISTRIBUTION: [(Terrain, u32); 5] = [
    (Terrain::Wall, 20),
    (Terrain::Building, 10),
    (Terrain::Bush, 10),
    (Terrain::Water, 5),
    (Terrain::Open, 55),
];

/// Items scattered on every map, nearest to the centre first
const ITEM_QUOTA: [(Loot, usize); 9] = [
    (Loot::Weapon(Weapon::Pistol), 3),
    (Loot::Weapon(Weapon::Shotgun), 2),
    (Loot::Weapon(Weapon::Rifle), 2),
    (Loot::Weapon(Weapon::Sniper), 1),
    (Loot::Item(Item::Medkit), 5),
    (Loot::Item(Item::Grenade), 4),
    (Loot::Item(Item::Trap), 3),
    (Loot::Item(Item::ArmorVest), 2),
    (Loot::Item(Item::SmokeBomb), 2),
];

/// Park-Miller minimal standard generator
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    const MULTIPLIER: u64 = 16_807;
    const MODULUS: u64 = 2_147_483_647;

    pub fn new(seed: u64) -> Self {
        let state = seed % Self::MODULUS;
        // Zero is a fixed point of the recurrence
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Uniform value in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state * Self::MULTIPLIER % Self::MODULUS;
        (self.state - 1) as f64 / (Self::MODULUS - 1) as f64
    }

    /// Uniform index in 0..n
    pub fn below(&mut self, n: usize) -> usize {
        ((self.next_f64() * n as f64) as usize).min(n.saturating_sub(1))
    }

    /// Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}

/// Output of map generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMap {
    pub grid: Grid,
    pub spawn_points: Vec<Position>,
}

/// Map generator; a pure function of the seed
pub struct MapGenerator;

impl MapGenerator {
    pub fn generate(seed: u64) -> GeneratedMap {
        let mut rng = Lcg::new(seed);

        let mut grid = Self::terrain(&mut rng);
        Self::clear_border_walls(&mut grid);
        Self::place_items(&mut grid, &mut rng);
        let spawn_points = Self::pick_spawns(&mut grid, &mut rng);

        debug!(seed, spawns = spawn_points.len(), "Generated map");

        GeneratedMap { grid, spawn_points }
    }

    fn terrain(rng: &mut Lcg) -> Grid {
        let total = (MAP_WIDTH * MAP_HEIGHT) as usize;
        let mut pool: Vec<Terrain> = Vec::with_capacity(total);

        for (terrain, pct) in TERRAIN_DISTRIBUTION {
            let count = (total as f64 * f64::from(pct) / 100.0).round() as usize;
            pool.extend(std::iter::repeat(terrain).take(count));
        }
        pool.truncate(total);
        pool.resize(total, Terrain::Open);

        rng.shuffle(&mut pool);

        Grid::from_tiles(pool.into_iter().map(Tile::new).collect())
    }

    fn border() -> impl Iterator<Item = Position> {
        let horizontal = (0..MAP_WIDTH).flat_map(|x| {
            [Position::new(x, 0), Position::new(x, MAP_HEIGHT - 1)]
        });
        let vertical = (1..MAP_HEIGHT - 1).flat_map(|y| {
            [Position::new(0, y), Position::new(MAP_WIDTH - 1, y)]
        });
        horizontal.chain(vertical)
    }

    fn clear_border_walls(grid: &mut Grid) {
        for pos in Self::border() {
            if grid.is_terrain(pos, Terrain::Wall) {
                grid.set_terrain(pos, Terrain::Open);
            }
        }
    }

    fn place_items(grid: &mut Grid, rng: &mut Lcg) {
        let center = Position::new(MAP_WIDTH / 2, MAP_HEIGHT / 2);

        let mut ranked: Vec<(f64, Position)> = Grid::positions()
            .filter(|p| !grid.is_wall(*p))
            .map(|p| {
                let jitter = (rng.next_f64() - 0.5) * 4.0;
                (f64::from(p.manhattan(center)) + jitter, p)
            })
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

        let drops = ITEM_QUOTA
            .iter()
            .flat_map(|(loot, count)| std::iter::repeat(*loot).take(*count));

        for ((_, pos), loot) in ranked.into_iter().zip(drops) {
            if let Some(tile) = grid.get_mut(pos) {
                tile.items.push(loot);
            }
        }
    }

    fn pick_spawns(grid: &mut Grid, rng: &mut Lcg) -> Vec<Position> {
        let mut edges: Vec<Position> = Self::border().filter(|p| !grid.is_wall(*p)).collect();
        rng.shuffle(&mut edges);

        let mut spawns: Vec<Position> = Vec::with_capacity(SPAWN_COUNT);
        for pos in &edges {
            if spawns.len() >= SPAWN_COUNT {
                break;
            }
            if spawns.iter().all(|s| s.manhattan(*pos) >= SPAWN_MIN_SEPARATION) {
                spawns.push(*pos);
            }
        }

        // Relax the separation if the border could not fit six
        for pos in &edges {
            if spawns.len() >= SPAWN_COUNT {
                break;
            }
            if !spawns.contains(pos) {
                spawns.push(*pos);
            }
        }

        for pos in &spawns {
            if let Some(tile) = grid.get_mut(*pos) {
                tile.items.clear();
            }
        }

        spawns
    }
}
