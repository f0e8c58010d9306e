use rand::Rng;

use crate::buildings::BuildingKind;
use crate::grid::TileGrid;

/// Pollution level at or above which a tile spreads to its neighbors.
const DIFFUSION_THRESHOLD: f32 = 30.0;
/// Share of the source level received by a land neighbor.
const LAND_DIFFUSION_RATE: f32 = 0.1;
/// Water carries pollution at full rate.
const WATER_DIFFUSION_RATE: f32 = 1.0;
/// Chance that the categorical pollution kind rides along a diffusion step.
const KIND_PROPAGATION_CHANCE: f32 = 0.5;
/// Multiplicative decay applied to every tile each tick.
const DECAY_FACTOR: f32 = 0.99;
/// Water towers scrub this much pollution off adjacent tiles per tick.
const SCRUB_AMOUNT: f32 = 5.0;
/// Levels below this snap to zero so quiescent rows stop being rewritten.
const QUIESCENT_LEVEL: f32 = 0.01;

/// Emission and absorption from building stats, plus the water-tower scrub.
pub fn produce(grid: &mut TileGrid) {
    let size = grid.size();
    for y in 0..size {
        for x in 0..size {
            let tile = grid.get(x, y);
            let kind = tile.building.kind;
            let active = tile.building.is_complete() && !tile.building.abandoned;
            let level = tile.pollution;
            let tagged = tile.pollution_kind.is_some();
            if !active {
                continue;
            }
            let stats = kind.stats();
            if stats.pollution != 0.0 {
                let next = (level + stats.pollution).clamp(0.0, 100.0);
                let tag = stats.pollution > 0.0 && !tagged;
                // Saturated emitters and dry absorbers would rewrite their
                // row for nothing.
                if next != level || tag {
                    let tile = grid.tile_mut(x, y);
                    tile.pollution = next;
                    if tag {
                        tile.pollution_kind = stats.pollution_kind;
                    }
                }
            }
            if kind == BuildingKind::WaterTower {
                scrub_neighbors(grid, x, y);
            }
        }
    }
}

fn scrub_neighbors(grid: &mut TileGrid, x: usize, y: usize) {
    let (neighbors, count) = grid.neighbors4(x, y);
    for &(nx, ny) in &neighbors[..count] {
        if grid.get(nx, ny).pollution > 0.0 {
            let tile = grid.tile_mut(nx, ny);
            tile.pollution = (tile.pollution - SCRUB_AMOUNT).max(0.0);
            if tile.pollution == 0.0 {
                tile.pollution_kind = None;
            }
        }
    }
}

/// Threshold diffusion into the 4-neighborhood. Sources are snapshotted
/// first so a tile polluted this step does not immediately re-diffuse.
pub fn diffuse(grid: &mut TileGrid, rng: &mut impl Rng) {
    let size = grid.size();
    let mut sources = Vec::new();
    for y in 0..size {
        for x in 0..size {
            let tile = grid.get(x, y);
            if tile.pollution >= DIFFUSION_THRESHOLD {
                sources.push((x, y, tile.pollution, tile.pollution_kind));
            }
        }
    }

    for (x, y, level, kind) in sources {
        let (neighbors, count) = grid.neighbors4(x, y);
        for &(nx, ny) in &neighbors[..count] {
            let rate = if grid.get(nx, ny).is_water() {
                WATER_DIFFUSION_RATE
            } else {
                LAND_DIFFUSION_RATE
            };
            let tile = grid.tile_mut(nx, ny);
            tile.pollution = (tile.pollution + level * rate).min(100.0);
            if tile.pollution_kind.is_none() && rng.gen::<f32>() < KIND_PROPAGATION_CHANCE {
                tile.pollution_kind = kind;
            }
        }
    }
}

/// 1%/tick decay across the grid.
pub fn decay(grid: &mut TileGrid) {
    let size = grid.size();
    for y in 0..size {
        for x in 0..size {
            if grid.get(x, y).pollution <= 0.0 {
                continue;
            }
            let tile = grid.tile_mut(x, y);
            tile.pollution *= DECAY_FACTOR;
            if tile.pollution < QUIESCENT_LEVEL {
                tile.pollution = 0.0;
                tile.pollution_kind = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::{Building, PollutionKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn factory() -> Building {
        Building {
            level: 1,
            ..Building::structural(BuildingKind::Factory)
        }
    }

    #[test]
    fn test_factories_emit_and_tag_pollution() {
        let mut grid = TileGrid::new(16);
        grid.tile_mut(4, 4).building = factory();
        produce(&mut grid);
        let tile = grid.get(4, 4);
        assert!(tile.pollution > 0.0);
        assert_eq!(tile.pollution_kind, Some(PollutionKind::Smoke));
    }

    #[test]
    fn test_parks_absorb_pollution() {
        let mut grid = TileGrid::new(16);
        grid.tile_mut(4, 4).pollution = 10.0;
        grid.tile_mut(4, 4).building = Building {
            level: 1,
            ..Building::structural(BuildingKind::SmallPark)
        };
        produce(&mut grid);
        assert!(grid.get(4, 4).pollution < 10.0);
    }

    #[test]
    fn test_water_tower_scrubs_neighbors() {
        let mut grid = TileGrid::new(16);
        grid.tile_mut(5, 5).building = Building {
            level: 1,
            ..Building::structural(BuildingKind::WaterTower)
        };
        grid.tile_mut(5, 4).pollution = 20.0;
        produce(&mut grid);
        assert_eq!(grid.get(5, 4).pollution, 15.0);
    }

    #[test]
    fn test_diffusion_threshold_and_rates() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = TileGrid::new(16);
        grid.tile_mut(5, 5).pollution = 40.0;
        grid.tile_mut(4, 5).building = Building::structural(BuildingKind::Water);
        diffuse(&mut grid, &mut rng);
        // Water neighbor takes the full level, land neighbors a tenth.
        assert_eq!(grid.get(4, 5).pollution, 40.0);
        assert_eq!(grid.get(6, 5).pollution, 4.0);

        let mut calm = TileGrid::new(16);
        calm.tile_mut(5, 5).pollution = 29.0;
        diffuse(&mut calm, &mut rng);
        assert_eq!(calm.get(6, 5).pollution, 0.0);
    }

    #[test]
    fn test_decay_reaches_zero() {
        let mut grid = TileGrid::new(8);
        grid.tile_mut(2, 2).pollution = 0.5;
        grid.tile_mut(2, 2).pollution_kind = Some(PollutionKind::Waste);
        for _ in 0..600 {
            decay(&mut grid);
        }
        assert_eq!(grid.get(2, 2).pollution, 0.0);
        assert_eq!(grid.get(2, 2).pollution_kind, None);
    }
}
