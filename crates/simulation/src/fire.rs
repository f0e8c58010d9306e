use rand::Rng;

use crate::buildings::Building;
use crate::coverage::ServiceCoverage;
use crate::grid::{TileGrid, ZoneKind};

/// Divisor turning fire coverage (0-100) into a self-extinguish probability.
const EXTINGUISH_DIVISOR: f32 = 300.0;
/// Burn progress gained per tick while a fire keeps burning.
const BURN_RATE: f32 = 2.0 / 3.0;
/// Base per-neighbor spread probability.
const SPREAD_BASE_CHANCE: f32 = 0.005;
/// How strongly fire coverage suppresses spread.
const SPREAD_COVERAGE_DAMPING: f32 = 0.95;
/// Spontaneous ignition probability per flammable tile per tick.
const SELF_IGNITE_CHANCE: f32 = 0.000_03;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireEvent {
    Ignited { x: usize, y: usize },
    BurnedDown { x: usize, y: usize },
}

/// One tick of the fire model: extinguish/progress existing fires, spread to
/// neighbors of tiles that were already burning, then spontaneous ignition.
pub fn fire_pass(
    grid: &mut TileGrid,
    coverage: &ServiceCoverage,
    rng: &mut impl Rng,
) -> Vec<FireEvent> {
    let size = grid.size();
    let mut events = Vec::new();

    // Snapshot so spread sees the start-of-tick burning set, not fires lit
    // moments ago.
    let mut burning: Vec<(usize, usize)> = Vec::new();
    for y in 0..size {
        for x in 0..size {
            if grid.get(x, y).building.on_fire {
                burning.push((x, y));
            }
        }
    }

    for &(x, y) in &burning {
        let fire_coverage = coverage.fire_at(x, y);
        if rng.gen::<f32>() < fire_coverage / EXTINGUISH_DIVISOR {
            let building = &mut grid.tile_mut(x, y).building;
            building.on_fire = false;
            building.fire_progress = 0.0;
            continue;
        }
        let progress = grid.get(x, y).building.fire_progress + BURN_RATE;
        if progress >= 100.0 {
            let tile = grid.tile_mut(x, y);
            tile.building = Building::default();
            tile.zone = ZoneKind::None;
            events.push(FireEvent::BurnedDown { x, y });
        } else {
            grid.tile_mut(x, y).building.fire_progress = progress;
        }
    }

    // Spread from the snapshot.
    for y in 0..size {
        for x in 0..size {
            let building = &grid.get(x, y).building;
            if building.on_fire || !building.kind.is_flammable() {
                continue;
            }
            let adjacent_fires = {
                let (neighbors, count) = grid.neighbors4(x, y);
                neighbors[..count]
                    .iter()
                    .filter(|&&pos| burning.contains(&pos))
                    .count() as f32
            };
            if adjacent_fires == 0.0 {
                continue;
            }
            let damping = 1.0 - SPREAD_COVERAGE_DAMPING * coverage.fire_at(x, y) / 100.0;
            if rng.gen::<f32>() < SPREAD_BASE_CHANCE * adjacent_fires * damping {
                ignite(grid, x, y);
                events.push(FireEvent::Ignited { x, y });
            }
        }
    }

    // Spontaneous ignition, independent of neighbors.
    for y in 0..size {
        for x in 0..size {
            let building = &grid.get(x, y).building;
            if !building.on_fire
                && building.kind.is_flammable()
                && rng.gen::<f32>() < SELF_IGNITE_CHANCE
            {
                ignite(grid, x, y);
                events.push(FireEvent::Ignited { x, y });
            }
        }
    }

    events
}

fn ignite(grid: &mut TileGrid, x: usize, y: usize) {
    let building = &mut grid.tile_mut(x, y).building;
    building.on_fire = true;
    building.fire_progress = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::BuildingKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn burning_house() -> Building {
        Building {
            level: 1,
            on_fire: true,
            fire_progress: 0.0,
            ..Building::structural(BuildingKind::House)
        }
    }

    #[test]
    fn test_unchecked_fire_burns_down_to_grass() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = TileGrid::new(8);
        grid.tile_mut(3, 3).zone = ZoneKind::Residential;
        grid.tile_mut(3, 3).building = burning_house();
        let coverage = ServiceCoverage::new(8);

        let mut destroyed = false;
        for _ in 0..200 {
            let events = fire_pass(&mut grid, &coverage, &mut rng);
            if events.contains(&FireEvent::BurnedDown { x: 3, y: 3 }) {
                destroyed = true;
                break;
            }
        }
        assert!(destroyed, "fire with zero coverage must raze the building");
        assert_eq!(grid.get(3, 3).building.kind, BuildingKind::Grass);
        assert_eq!(grid.get(3, 3).zone, ZoneKind::None);
    }

    #[test]
    fn test_full_coverage_extinguishes_eventually() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut grid = TileGrid::new(8);
        grid.tile_mut(3, 3).building = burning_house();
        let mut coverage = ServiceCoverage::new(8);
        coverage.fire.fill(100.0);

        let mut extinguished = false;
        for _ in 0..200 {
            let _ = fire_pass(&mut grid, &coverage, &mut rng);
            let building = &grid.get(3, 3).building;
            if !building.on_fire && building.kind == BuildingKind::House {
                extinguished = true;
                break;
            }
        }
        assert!(
            extinguished,
            "p=1/3 per tick must extinguish within 200 ticks"
        );
    }

    #[test]
    fn test_structural_tiles_never_ignite() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut grid = TileGrid::new(8);
        grid.tile_mut(3, 3).building = burning_house();
        // Surrounded by roads and water.
        grid.tile_mut(2, 3).building = Building::structural(BuildingKind::Road);
        grid.tile_mut(4, 3).building = Building::structural(BuildingKind::Water);
        let coverage = ServiceCoverage::new(8);

        for _ in 0..100 {
            let _ = fire_pass(&mut grid, &coverage, &mut rng);
        }
        assert!(!grid.get(2, 3).building.on_fire);
        assert!(!grid.get(4, 3).building.on_fire);
    }
}
