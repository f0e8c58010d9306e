use std::collections::HashSet;

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::buildings::{Building, BuildingKind};
use crate::grid::TileGrid;

/// Noise below this marks a candidate lake centroid; relaxed when the map
/// offers no spot.
const LAKE_NOISE_THRESHOLD: f32 = 0.35;
const LAKE_THRESHOLD_RELAXATION: f32 = 0.1;
const LAKE_RELAXATION_ATTEMPTS: usize = 3;
const LAKE_MIN_TILES: usize = 40;
const LAKE_MAX_TILES: usize = 80;

/// Each map edge independently rolls this chance of carving a coastline.
const OCEAN_EDGE_CHANCE: f64 = 0.4;
const OCEAN_DEPTH_FRACTION: f32 = 0.18;

/// Land adjacent to fresh water is worth more.
const SHORE_LAND_VALUE: f32 = 60.0;

const TREE_NOISE_THRESHOLD: f32 = 0.72;
const TREE_NOISE_CHANCE: f32 = 0.7;
const TREE_SHORE_CHANCE: f32 = 0.3;
/// Half-width of the near-water window for shore vegetation.
const SHORE_WINDOW: i32 = 2;

const LAKE_NAMES: &[&str] = &[
    "Mirror", "Crescent", "Heron", "Willow", "Stillwater", "Loon", "Granite", "Drift", "Ember",
    "Fog",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaterBodyKind {
    Lake,
    Ocean,
}

/// Produced once at generation; immutable afterwards, though the player may
/// later terraform individual member tiles back to land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterBody {
    pub id: u32,
    pub name: String,
    pub kind: WaterBodyKind,
    pub tiles: Vec<(usize, usize)>,
    pub centroid: (f32, f32),
}

impl WaterBody {
    fn from_tiles(id: u32, name: String, kind: WaterBodyKind, tiles: Vec<(usize, usize)>) -> Self {
        let n = tiles.len().max(1) as f32;
        let (sx, sy) = tiles
            .iter()
            .fold((0.0f32, 0.0f32), |(ax, ay), &(x, y)| {
                (ax + x as f32, ay + y as f32)
            });
        Self {
            id,
            name,
            kind,
            tiles,
            centroid: (sx / n, sy / n),
        }
    }
}

fn value_noise(seed: i32, frequency: f32) -> FastNoiseLite {
    let mut noise = FastNoiseLite::with_seed(seed);
    noise.set_noise_type(Some(NoiseType::Value));
    noise.set_fractal_type(Some(FractalType::FBm));
    noise.set_fractal_octaves(Some(4));
    noise.set_frequency(Some(frequency));
    noise
}

#[inline]
fn sample01(noise: &FastNoiseLite, x: f32, y: f32) -> f32 {
    ((noise.get_noise_2d(x, y) + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Generate a fresh world: grass everywhere, then lakes, edge oceans,
/// shoreline land value, and vegetation.
pub fn generate_world(size: usize, rng: &mut impl Rng) -> (TileGrid, Vec<WaterBody>) {
    let mut grid = TileGrid::new(size);
    let mut bodies = Vec::new();
    let mut used_names = HashSet::new();
    let mut next_id = 0u32;

    let terrain_noise = value_noise(rng.gen(), 0.045);
    let mut field = vec![0.0f32; size * size];
    for y in 0..size {
        for x in 0..size {
            field[y * size + x] = sample01(&terrain_noise, x as f32, y as f32);
        }
    }

    // Water claim mask shared by lakes and oceans.
    let mut water = vec![false; size * size];

    let lake_count = rng.gen_range(2..=3);
    let seeds = pick_lake_seeds(&field, size, lake_count);
    for seed in seeds {
        let target = rng.gen_range(LAKE_MIN_TILES..=LAKE_MAX_TILES);
        let tiles = grow_lake(&field, size, &mut water, seed, target);
        if tiles.is_empty() {
            continue;
        }
        let name = unique_lake_name(&mut used_names, rng);
        bodies.push(WaterBody::from_tiles(
            next_id,
            name,
            WaterBodyKind::Lake,
            tiles,
        ));
        next_id += 1;
    }

    let coarse = value_noise(rng.gen(), 0.015);
    let fine = value_noise(rng.gen(), 0.12);
    for edge in 0..4usize {
        if !rng.gen_bool(OCEAN_EDGE_CHANCE) {
            continue;
        }
        let tiles = carve_ocean_edge(size, edge, &coarse, &fine, &mut water, rng);
        if tiles.is_empty() {
            continue;
        }
        let name = unique_ocean_name(edge, &mut used_names);
        bodies.push(WaterBody::from_tiles(
            next_id,
            name,
            WaterBodyKind::Ocean,
            tiles,
        ));
        next_id += 1;
    }

    for y in 0..size {
        for x in 0..size {
            if water[y * size + x] {
                let tile = grid.tile_mut(x, y);
                tile.building = Building::structural(BuildingKind::Water);
            }
        }
    }

    // Shoreline premium on land touching water.
    for y in 0..size {
        for x in 0..size {
            if water[y * size + x] {
                continue;
            }
            let (neighbors, count) = grid.neighbors4(x, y);
            if neighbors[..count]
                .iter()
                .any(|&(nx, ny)| water[ny * size + nx])
            {
                grid.tile_mut(x, y).land_value = SHORE_LAND_VALUE;
            }
        }
    }

    plant_vegetation(&mut grid, &water, rng);

    (grid, bodies)
}

fn pick_lake_seeds(field: &[f32], size: usize, count: usize) -> Vec<(usize, usize)> {
    let margin = (size / 10).max(4);
    let min_dist = (size / 4) as f32;
    let mut threshold = LAKE_NOISE_THRESHOLD;

    for _ in 0..LAKE_RELAXATION_ATTEMPTS {
        let mut candidates: Vec<(usize, usize)> = Vec::new();
        for y in margin..size.saturating_sub(margin) {
            for x in margin..size.saturating_sub(margin) {
                if field[y * size + x] < threshold {
                    candidates.push((x, y));
                }
            }
        }
        candidates.sort_by(|a, b| {
            field[a.1 * size + a.0]
                .partial_cmp(&field[b.1 * size + b.0])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut seeds: Vec<(usize, usize)> = Vec::new();
        for candidate in candidates {
            let far_enough = seeds.iter().all(|&(sx, sy)| {
                let dx = sx as f32 - candidate.0 as f32;
                let dy = sy as f32 - candidate.1 as f32;
                (dx * dx + dy * dy).sqrt() >= min_dist
            });
            if far_enough {
                seeds.push(candidate);
                if seeds.len() == count {
                    return seeds;
                }
            }
        }
        threshold += LAKE_THRESHOLD_RELAXATION;
    }

    // Guaranteed placement: symmetric defaults.
    let near = size / 4;
    let far = 3 * size / 4;
    [(near, near), (far, far), (near, far)][..count.min(3)].to_vec()
}

/// Grow a lake from its seed by repeatedly admitting the nearest unclaimed
/// neighbor tile, tie-broken by noise value.
fn grow_lake(
    field: &[f32],
    size: usize,
    water: &mut [bool],
    seed: (usize, usize),
    target: usize,
) -> Vec<(usize, usize)> {
    if water[seed.1 * size + seed.0] {
        return Vec::new();
    }
    let mut tiles = vec![seed];
    water[seed.1 * size + seed.0] = true;

    while tiles.len() < target {
        let mut best: Option<((usize, usize), (f32, f32))> = None;
        for &(lx, ly) in &tiles {
            let neighbors = [
                (lx.wrapping_sub(1), ly),
                (lx + 1, ly),
                (lx, ly.wrapping_sub(1)),
                (lx, ly + 1),
            ];
            for (nx, ny) in neighbors {
                if nx >= size || ny >= size || water[ny * size + nx] {
                    continue;
                }
                let dx = nx as f32 - seed.0 as f32;
                let dy = ny as f32 - seed.1 as f32;
                let key = (dx * dx + dy * dy, field[ny * size + nx]);
                let better = match best {
                    None => true,
                    Some((_, k)) => key < k,
                };
                if better {
                    best = Some(((nx, ny), key));
                }
            }
        }
        let Some((tile, _)) = best else {
            break;
        };
        water[tile.1 * size + tile.0] = true;
        tiles.push(tile);
    }
    tiles
}

/// Carve one edge's coastline: a noise-driven span with per-column depth
/// blended from coarse and fine noise, clamped to [1, 18% of size].
fn carve_ocean_edge(
    size: usize,
    edge: usize,
    coarse: &FastNoiseLite,
    fine: &FastNoiseLite,
    water: &mut [bool],
    rng: &mut impl Rng,
) -> Vec<(usize, usize)> {
    let max_depth = ((size as f32 * OCEAN_DEPTH_FRACTION) as usize).max(1);
    let span_frac = 0.5 + sample01(coarse, edge as f32 * 97.0, 41.0) * 0.5;
    let span = ((size as f32 * span_frac) as usize).clamp(1, size);
    let start = rng.gen_range(0..=size - span);

    let mut tiles = Vec::new();
    for i in start..start + span {
        let blended = 0.7 * sample01(coarse, i as f32, edge as f32 * 13.0)
            + 0.3 * sample01(fine, i as f32, edge as f32 * 13.0);
        let depth = (1.0 + blended * (max_depth.saturating_sub(1)) as f32) as usize;
        let depth = depth.clamp(1, max_depth);
        for d in 0..depth {
            let (x, y) = match edge {
                0 => (i, d),            // north
                1 => (i, size - 1 - d), // south
                2 => (d, i),            // west
                _ => (size - 1 - d, i), // east
            };
            if !water[y * size + x] {
                water[y * size + x] = true;
                tiles.push((x, y));
            }
        }
    }
    tiles
}

fn plant_vegetation(grid: &mut TileGrid, water: &[bool], rng: &mut impl Rng) {
    let size = grid.size();
    let veg_noise = value_noise(rng.gen(), 0.09);
    for y in 0..size {
        for x in 0..size {
            if water[y * size + x] {
                continue;
            }
            let n = sample01(&veg_noise, x as f32, y as f32);
            let plant = if n > TREE_NOISE_THRESHOLD {
                rng.gen::<f32>() < TREE_NOISE_CHANCE
            } else {
                near_water(water, size, x, y) && rng.gen::<f32>() < TREE_SHORE_CHANCE
            };
            if plant {
                grid.tile_mut(x, y).building = Building::structural(BuildingKind::Tree);
            }
        }
    }
}

fn near_water(water: &[bool], size: usize, x: usize, y: usize) -> bool {
    for dy in -SHORE_WINDOW..=SHORE_WINDOW {
        for dx in -SHORE_WINDOW..=SHORE_WINDOW {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx >= 0
                && ny >= 0
                && (nx as usize) < size
                && (ny as usize) < size
                && water[ny as usize * size + nx as usize]
            {
                return true;
            }
        }
    }
    false
}

fn unique_lake_name(used: &mut HashSet<String>, rng: &mut impl Rng) -> String {
    for _ in 0..LAKE_NAMES.len() * 4 {
        let base = LAKE_NAMES[rng.gen_range(0..LAKE_NAMES.len())];
        let name = format!("Lake {base}");
        if used.insert(name.clone()) {
            return name;
        }
    }
    let mut n = 2;
    loop {
        let name = format!("Lake {n}");
        if used.insert(name.clone()) {
            return name;
        }
        n += 1;
    }
}

fn unique_ocean_name(edge: usize, used: &mut HashSet<String>) -> String {
    let base = match edge {
        0 => "Northern Sea",
        1 => "Southern Sea",
        2 => "Western Sea",
        _ => "Eastern Sea",
    };
    if used.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let name = format!("{base} {n}");
        if used.insert(name.clone()) {
            return name;
        }
        n += 1;
    }
}
