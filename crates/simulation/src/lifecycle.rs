use rand::Rng;

use crate::buildings::{merge_target, Building, BuildingKind};
use crate::coverage::ServiceCoverage;
use crate::grid::TileGrid;

// Growth/abandonment tuning. Load-bearing balance constants; changing any
// of them shifts the whole growth curve.
const CONSTRUCTION_BASE_SPEED: f32 = 24.0;
const CONSTRUCTION_SPEED_JITTER: f32 = 12.0;
const CONSTRUCTION_DRAG: f32 = 1.3;

const ABANDON_DEMAND_FLOOR: f32 = -20.0;
const ABANDON_MIN_AGE: f32 = 30.0;
const ABANDON_BASE_CAP: f32 = 0.02;
const ABANDON_UNPOWERED_PENALTY: f32 = 0.005;
const ABANDON_UNWATERED_PENALTY: f32 = 0.005;
const ABANDON_LOW_LEVEL_PENALTY: f32 = 0.003;
const ABANDONED_AGE_RATE: f32 = 0.1;

const CLEAR_DEMAND_FLOOR: f32 = 10.0;
const CLEAR_CHANCE_CAP: f32 = 0.12;

const CONSOLIDATE_BASE_CHANCE: f32 = 0.08;
const CONSOLIDATE_MIN_AGE: f32 = 12.0;
const CROSS_MERGE_DEMAND: f32 = 70.0;

const DEMAND_BOOST_FLOOR: f32 = 30.0;
const OCCUPANCY_FACTOR: f32 = 0.8;
const FOOTPRINT_AREA_PENALTY: f32 = 0.25;

/// Population and jobs for a completed building at the given level and
/// utility service. Kinds without stats contribute zero.
pub fn occupancy(kind: BuildingKind, level: u8, powered: bool, watered: bool) -> (u32, u32) {
    let stats = kind.stats();
    let efficiency = 0.5 * powered as u8 as f32 + 0.5 * watered as u8 as f32;
    let level = level.max(1) as f32;
    let population =
        (stats.max_population as f32 * level * efficiency * OCCUPANCY_FACTOR).floor() as u32;
    let jobs = (stats.max_jobs as f32 * level * efficiency * OCCUPANCY_FACTOR).floor() as u32;
    (population, jobs)
}

/// Advance construction on an unfinished building. Utilities gate progress
/// unless the kind is a starter or a utility plant (those bootstrap the
/// city and cannot wait for themselves).
pub fn advance_construction(grid: &mut TileGrid, x: usize, y: usize, rng: &mut impl Rng) {
    let building = &grid.get(x, y).building;
    let kind = building.kind;
    let served = building.powered && building.watered;
    if !served && !kind.is_starter() && !kind.is_utility_plant() {
        return;
    }
    let area = kind.footprint_area() as f32;
    let speed = (CONSTRUCTION_BASE_SPEED + rng.gen_range(0.0..CONSTRUCTION_SPEED_JITTER))
        / area.sqrt()
        / CONSTRUCTION_DRAG;
    let building = &mut grid.tile_mut(x, y).building;
    building.construction_progress = (building.construction_progress + speed).min(100.0);
}

/// One lifecycle step for a completed, zoned, developable building anchored
/// at (x, y).
pub fn evolve_building(
    grid: &mut TileGrid,
    x: usize,
    y: usize,
    coverage: &ServiceCoverage,
    demand: f32,
    rng: &mut impl Rng,
) {
    let building = &grid.get(x, y).building;
    let kind = building.kind;
    let level = building.level;
    let age = building.age;
    let powered = building.powered;
    let watered = building.watered;

    if building.abandoned {
        let building = &mut grid.tile_mut(x, y).building;
        building.population = 0;
        building.jobs = 0;
        building.age += ABANDONED_AGE_RATE;
        if demand > CLEAR_DEMAND_FLOOR {
            let chance = ((demand - CLEAR_DEMAND_FLOOR) / 90.0 * CLEAR_CHANCE_CAP)
                .min(CLEAR_CHANCE_CAP);
            if rng.gen::<f32>() < chance {
                clear_footprint(grid, x, y);
            }
        }
        return;
    }

    // Abandonment check: persistent lack of service in a collapsing market.
    if (!powered || !watered) && demand < ABANDON_DEMAND_FLOOR && age > ABANDON_MIN_AGE {
        let deficit = ((-demand - 20.0) / 80.0).clamp(0.0, 1.0);
        let mut chance = deficit * ABANDON_BASE_CAP;
        if !powered {
            chance += ABANDON_UNPOWERED_PENALTY;
        }
        if !watered {
            chance += ABANDON_UNWATERED_PENALTY;
        }
        if level <= 1 {
            chance += ABANDON_LOW_LEVEL_PENALTY;
        }
        if rng.gen::<f32>() < chance {
            let building = &mut grid.tile_mut(x, y).building;
            building.abandoned = true;
            building.population = 0;
            building.jobs = 0;
            return;
        }
    }

    grid.tile_mut(x, y).building.age += 1.0;

    let tile = grid.get(x, y);
    let land_value = tile.land_value;
    let demand_boost = ((demand - DEMAND_BOOST_FLOOR) / 70.0).max(0.0) * 0.7;
    let target_level = (land_value / 24.0
        + coverage.quality_average(x, y) / 28.0
        + (age + 1.0) / 60.0
        + demand_boost)
        .clamp(1.0, 5.0) as u8;

    if kind.is_mergeable() && powered && watered && age > CONSOLIDATE_MIN_AGE {
        let chance = CONSOLIDATE_BASE_CHANCE * (1.0 + (demand / 100.0).max(0.0));
        if rng.gen::<f32>() < chance && try_consolidate(grid, x, y, demand, target_level) {
            return;
        }
    }

    let building = &mut grid.tile_mut(x, y).building;
    if target_level > building.level && building.level < 5 {
        building.level += 1;
    }
    let (population, jobs) = occupancy(kind, building.level, powered, watered);
    building.population = population;
    building.jobs = jobs;
}

/// Reset the whole footprint anchored at (x, y) to grass, propagating the
/// current power/water flags onto the fresh grass tiles. Zoning survives.
pub fn clear_footprint(grid: &mut TileGrid, x: usize, y: usize) {
    let (w, h) = grid.get(x, y).building.kind.footprint();
    for dy in 0..h {
        for dx in 0..w {
            let (tx, ty) = (x + dx, y + dy);
            if !grid.in_bounds(tx, ty) {
                continue;
            }
            let occupant = &grid.get(tx, ty).building;
            let belongs = (tx, ty) == (x, y)
                || occupant.filler_anchor == Some((dx as i8, dy as i8));
            if !belongs {
                continue;
            }
            let powered = occupant.powered;
            let watered = occupant.watered;
            let tile = grid.tile_mut(tx, ty);
            tile.building = Building {
                powered,
                watered,
                ..Building::default()
            };
        }
    }
}

/// Attempt a footprint merge into the zone's consolidation target. Candidate
/// origins are every placement of the target footprint that covers (x, y);
/// the winner maximizes adjacent road/bridge count minus an area penalty.
fn try_consolidate(
    grid: &mut TileGrid,
    x: usize,
    y: usize,
    demand: f32,
    target_level: u8,
) -> bool {
    let zone = grid.get(x, y).zone;
    let Some(target_kind) = merge_target(zone) else {
        return false;
    };
    let (w, h) = target_kind.footprint();
    let allow_cross = demand > CROSS_MERGE_DEMAND;

    let mut best: Option<((usize, usize), f32)> = None;
    for oy in y.saturating_sub(h - 1)..=y {
        for ox in x.saturating_sub(w - 1)..=x {
            if !footprint_fits(grid, ox, oy, w, h, x, y, zone, allow_cross) {
                continue;
            }
            let score = road_adjacency(grid, ox, oy, w, h) as f32
                - (w * h) as f32 * FOOTPRINT_AREA_PENALTY;
            if best.map_or(true, |(_, s)| score > s) {
                best = Some(((ox, oy), score));
            }
        }
    }

    let Some(((ox, oy), _)) = best else {
        return false;
    };

    let powered = grid.get(x, y).building.powered;
    let watered = grid.get(x, y).building.watered;
    for dy in 0..h {
        for dx in 0..w {
            let tile = grid.tile_mut(ox + dx, oy + dy);
            tile.zone = zone;
            tile.building = if (dx, dy) == (0, 0) {
                let (population, jobs) =
                    occupancy(target_kind, target_level, powered, watered);
                Building {
                    kind: target_kind,
                    level: target_level,
                    population,
                    jobs,
                    powered,
                    watered,
                    ..Building::structural(target_kind)
                }
            } else {
                Building::filler(dx as i8, dy as i8)
            };
        }
    }
    true
}

/// A candidate origin works when every covered tile is either the evolving
/// building itself, vacant zoned grass, or (cross-merge only) another small
/// mergeable building of the same zone.
#[allow(clippy::too_many_arguments)]
fn footprint_fits(
    grid: &TileGrid,
    ox: usize,
    oy: usize,
    w: usize,
    h: usize,
    x: usize,
    y: usize,
    zone: crate::grid::ZoneKind,
    allow_cross: bool,
) -> bool {
    if !grid.in_bounds(ox + w - 1, oy + h - 1) {
        return false;
    }
    for dy in 0..h {
        for dx in 0..w {
            let (tx, ty) = (ox + dx, oy + dy);
            if (tx, ty) == (x, y) {
                continue;
            }
            let tile = grid.get(tx, ty);
            if tile.zone != zone {
                return false;
            }
            let building = &tile.building;
            let absorbable = building.kind == BuildingKind::Grass
                || (allow_cross
                    && building.kind.is_mergeable()
                    && building.is_complete()
                    && !building.abandoned
                    && !building.on_fire);
            if !absorbable {
                return false;
            }
        }
    }
    true
}

/// Road/bridge tiles orthogonally adjacent to the footprint's perimeter.
fn road_adjacency(grid: &TileGrid, ox: usize, oy: usize, w: usize, h: usize) -> u32 {
    let mut count = 0;
    let mut check = |tx: i32, ty: i32| {
        if grid.in_bounds_i(tx, ty) {
            let kind = grid.get(tx as usize, ty as usize).building.kind;
            if matches!(kind, BuildingKind::Road | BuildingKind::Bridge) {
                count += 1;
            }
        }
    };
    for dx in 0..w as i32 {
        check(ox as i32 + dx, oy as i32 - 1);
        check(ox as i32 + dx, oy as i32 + h as i32);
    }
    for dy in 0..h as i32 {
        check(ox as i32 - 1, oy as i32 + dy);
        check(ox as i32 + w as i32, oy as i32 + dy);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::calculate_service_coverage;
    use crate::grid::ZoneKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn served_house(age: f32) -> Building {
        Building {
            level: 1,
            age,
            powered: true,
            watered: true,
            ..Building::structural(BuildingKind::House)
        }
    }

    #[test]
    fn test_occupancy_formula() {
        // House holds 10; level 2, fully served: 10 * 2 * 1.0 * 0.8 = 16.
        assert_eq!(occupancy(BuildingKind::House, 2, true, true).0, 16);
        // Half efficiency when only powered: 10 * 2 * 0.5 * 0.8 = 8.
        assert_eq!(occupancy(BuildingKind::House, 2, true, false).0, 8);
        assert_eq!(occupancy(BuildingKind::Road, 3, true, true), (0, 0));
    }

    #[test]
    fn test_construction_requires_utilities_for_non_starters() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = TileGrid::new(8);
        grid.tile_mut(2, 2).building = Building::under_construction(BuildingKind::OfficeTower);
        advance_construction(&mut grid, 2, 2, &mut rng);
        assert_eq!(grid.get(2, 2).building.construction_progress, 0.0);

        grid.tile_mut(2, 2).building.powered = true;
        grid.tile_mut(2, 2).building.watered = true;
        advance_construction(&mut grid, 2, 2, &mut rng);
        assert!(grid.get(2, 2).building.construction_progress > 0.0);
    }

    #[test]
    fn test_starters_construct_unserved() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut grid = TileGrid::new(8);
        grid.tile_mut(2, 2).building = Building::under_construction(BuildingKind::SmallHouse);
        advance_construction(&mut grid, 2, 2, &mut rng);
        assert!(grid.get(2, 2).building.construction_progress > 0.0);
    }

    #[test]
    fn test_construction_progress_monotone_and_capped() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = TileGrid::new(8);
        grid.tile_mut(2, 2).building = Building::under_construction(BuildingKind::SmallHouse);
        let mut last = 0.0;
        for _ in 0..50 {
            advance_construction(&mut grid, 2, 2, &mut rng);
            let progress = grid.get(2, 2).building.construction_progress;
            assert!(progress >= last);
            assert!(progress <= 100.0);
            last = progress;
        }
        assert_eq!(last, 100.0);
    }

    #[test]
    fn test_served_building_gains_population() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut grid = TileGrid::new(8);
        grid.tile_mut(3, 3).zone = ZoneKind::Residential;
        grid.tile_mut(3, 3).building = served_house(5.0);
        let coverage = calculate_service_coverage(&grid);
        evolve_building(&mut grid, 3, 3, &coverage, 0.0, &mut rng);
        let building = &grid.get(3, 3).building;
        assert!(building.population > 0);
        assert_eq!(building.age, 6.0);
        assert!(!building.abandoned);
    }

    #[test]
    fn test_unserved_building_abandons_under_negative_demand() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut grid = TileGrid::new(8);
        grid.tile_mut(3, 3).zone = ZoneKind::Residential;
        let mut house = served_house(40.0);
        house.powered = false;
        house.watered = false;
        grid.tile_mut(3, 3).building = house;
        let coverage = calculate_service_coverage(&grid);

        let mut abandoned = false;
        for _ in 0..5000 {
            evolve_building(&mut grid, 3, 3, &coverage, -80.0, &mut rng);
            if grid.get(3, 3).building.abandoned {
                abandoned = true;
                break;
            }
        }
        assert!(abandoned, "deep negative demand must eventually abandon");
        assert_eq!(grid.get(3, 3).building.population, 0);
    }

    #[test]
    fn test_abandoned_building_clears_under_positive_demand() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut grid = TileGrid::new(8);
        grid.tile_mut(3, 3).zone = ZoneKind::Residential;
        let mut house = served_house(40.0);
        house.abandoned = true;
        grid.tile_mut(3, 3).building = house;
        let coverage = calculate_service_coverage(&grid);

        let mut cleared = false;
        for _ in 0..2000 {
            evolve_building(&mut grid, 3, 3, &coverage, 90.0, &mut rng);
            if grid.get(3, 3).building.kind == BuildingKind::Grass {
                cleared = true;
                break;
            }
        }
        assert!(cleared, "high demand must eventually clear the ruin");
        // Zoning survives clearing so the lot can redevelop.
        assert_eq!(grid.get(3, 3).zone, ZoneKind::Residential);
    }

    #[test]
    fn test_consolidation_merges_into_larger_footprint() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = TileGrid::new(12);
        // A road along y=1 for adjacency scoring, a 2x2 zoned block below it.
        for x in 0..12 {
            grid.tile_mut(x, 1).building = Building::structural(BuildingKind::Road);
        }
        for (tx, ty) in [(4, 2), (5, 2), (4, 3), (5, 3)] {
            grid.tile_mut(tx, ty).zone = ZoneKind::Residential;
        }
        let mut house = served_house(20.0);
        house.kind = BuildingKind::House;
        grid.tile_mut(4, 2).building = house;
        let coverage = calculate_service_coverage(&grid);

        let mut merged = false;
        for _ in 0..500 {
            evolve_building(&mut grid, 4, 2, &coverage, 40.0, &mut rng);
            if grid.get(4, 2).building.kind == BuildingKind::ApartmentBlock {
                merged = true;
                break;
            }
        }
        assert!(merged, "mergeable house beside open zoned land must merge");
        // The other three tiles are fillers pointing back at the anchor.
        assert_eq!(grid.get(5, 2).building.kind, BuildingKind::Filler);
        assert_eq!(grid.get(5, 2).building.filler_anchor, Some((1, 0)));
        assert_eq!(grid.get(5, 3).building.filler_anchor, Some((1, 1)));
    }

    #[test]
    fn test_clear_footprint_preserves_utilities() {
        let mut grid = TileGrid::new(8);
        let mut mall = Building::structural(BuildingKind::Mall);
        mall.level = 1;
        mall.powered = true;
        mall.watered = true;
        grid.tile_mut(2, 2).building = mall;
        let mut filler = Building::filler(1, 0);
        filler.powered = true;
        grid.tile_mut(3, 2).building = filler;
        grid.tile_mut(2, 3).building = Building::filler(0, 1);
        grid.tile_mut(3, 3).building = Building::filler(1, 1);

        clear_footprint(&mut grid, 2, 2);
        for (tx, ty) in [(2, 2), (3, 2), (2, 3), (3, 3)] {
            assert_eq!(grid.get(tx, ty).building.kind, BuildingKind::Grass);
        }
        assert!(grid.get(2, 2).building.powered);
        assert!(grid.get(3, 2).building.powered);
        assert!(!grid.get(2, 3).building.powered);
    }
}
