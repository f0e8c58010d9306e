//! The tick orchestrator: one call advances the world by one step. The input
//! state is never mutated; the returned state shares grid rows with it until
//! a row is first written (copy-on-write), so static stretches of the map
//! cost nothing.

use rand::Rng;

use crate::advisors::generate_advisor_messages;
use crate::budget::update_budget_costs;
use crate::buildings::{spawn_candidates, Building, BuildingKind};
use crate::config::{
    DEMAND_SMOOTHING, HISTORY_INTERVAL_MONTHS, INCOME_INTERVAL_DAYS, ROAD_ACCESS_RANGE,
    SPAWN_BASE_CHANCE,
};
use crate::coverage::{calculate_service_coverage, ServiceCoverage};
use crate::fire::{fire_pass, FireEvent};
use crate::grid::{TileGrid, ZoneKind};
use crate::lifecycle::{advance_construction, evolve_building, occupancy};
use crate::notifications::{Notification, NotificationPriority};
use crate::pollution;
use crate::road_access::has_road_access;
use crate::state::GameState;
use crate::stats::{calculate_stats, HistorySample, RciDemand};

pub fn simulate_tick(state: &GameState) -> GameState {
    simulate_tick_with_rng(state, &mut rand::thread_rng())
}

pub fn simulate_tick_with_rng(state: &GameState, rng: &mut impl Rng) -> GameState {
    let mut next = state.clone();

    // Coverage is recomputed from the incoming grid and used throughout this
    // tick; spawn and growth read the previous tick's smoothed demand.
    let coverage = calculate_service_coverage(&state.grid);
    let demand = state.stats.demand;

    grid_pass(&mut next.grid, &coverage, &demand, rng);

    pollution::produce(&mut next.grid);
    pollution::diffuse(&mut next.grid, rng);
    pollution::decay(&mut next.grid);

    let fire_events = if next.settings.disasters_enabled {
        fire_pass(&mut next.grid, &coverage, rng)
    } else {
        Vec::new()
    };

    update_budget_costs(&next.grid, &mut next.budget);
    next.budget.ease_tax_rate();

    let mut stats = calculate_stats(&next.grid, &next.budget, &coverage);
    stats.money = state.stats.money;
    stats.demand = state
        .stats
        .demand
        .smoothed_toward(&stats.demand, DEMAND_SMOOTHING);

    let advance = next.clock.advance();
    if advance.new_day && next.clock.day % INCOME_INTERVAL_DAYS == 0 {
        stats.money += stats.income - stats.expenses;
    }
    next.stats = stats;

    next.advisors = generate_advisor_messages(&next.grid, &next.stats);

    for event in fire_events {
        let notification = match event {
            FireEvent::Ignited { x, y } => Notification::new(
                format!(
                    "{} on fire at ({x}, {y})",
                    next.grid.get(x, y).building.kind.name()
                ),
                NotificationPriority::Emergency,
                Some((x, y)),
                &next.clock,
            ),
            FireEvent::BurnedDown { x, y } => Notification::new(
                format!("A building at ({x}, {y}) burned to the ground"),
                NotificationPriority::Warning,
                Some((x, y)),
                &next.clock,
            ),
        };
        next.notify(notification);
    }

    if advance.new_month && next.clock.total_months() % HISTORY_INTERVAL_MONTHS == 0 {
        next.history.push(HistorySample {
            year: next.clock.year,
            month: next.clock.month,
            population: next.stats.population,
            jobs: next.stats.jobs,
            money: next.stats.money,
        });
    }

    next
}

/// Full-grid scan. Tiles that need no change are never written, so their
/// rows stay shared with the previous state.
fn grid_pass(grid: &mut TileGrid, coverage: &ServiceCoverage, demand: &RciDemand, rng: &mut impl Rng) {
    let size = grid.size();
    for y in 0..size {
        for x in 0..size {
            let tile = grid.get(x, y);
            let kind = tile.building.kind;
            let zone = tile.zone;
            let powered = tile.building.powered;
            let watered = tile.building.watered;
            let complete = tile.building.is_complete();
            let on_fire = tile.building.on_fire;
            let abandoned = tile.building.abandoned;

            match kind {
                // Static infrastructure: nothing to do per tick.
                BuildingKind::Water
                | BuildingKind::Road
                | BuildingKind::Rail
                | BuildingKind::Bridge
                | BuildingKind::Tree => {}
                BuildingKind::Filler => {
                    if grid.is_orphaned_filler(x, y) {
                        // The anchor is gone; the placeholder reverts to grass.
                        grid.tile_mut(x, y).building = Building {
                            powered,
                            watered,
                            ..Building::default()
                        };
                    } else {
                        sync_utility_flags(grid, coverage, x, y, powered, watered);
                    }
                }
                BuildingKind::Grass => {
                    let want_power = coverage.is_powered(x, y);
                    let want_water = coverage.is_watered(x, y);
                    if zone.is_zoned() {
                        if powered != want_power || watered != want_water {
                            let building = &mut grid.tile_mut(x, y).building;
                            building.powered = want_power;
                            building.watered = want_water;
                        }
                        try_spawn(grid, coverage, x, y, zone, demand.for_zone(zone), rng);
                    } else if powered != want_power || watered != want_water {
                        let building = &mut grid.tile_mut(x, y).building;
                        building.powered = want_power;
                        building.watered = want_water;
                    }
                }
                _ => {
                    let (powered, watered) =
                        sync_utility_flags(grid, coverage, x, y, powered, watered);
                    if on_fire {
                        continue;
                    }
                    if !complete {
                        advance_construction(grid, x, y, rng);
                    } else if kind.is_developable() {
                        evolve_building(grid, x, y, coverage, demand.for_zone(zone), rng);
                    } else {
                        // Placed services and landmarks: age and staff them.
                        let level = grid.get(x, y).building.level;
                        let (_, jobs) = occupancy(kind, level, powered, watered);
                        let building = &mut grid.tile_mut(x, y).building;
                        building.age += 1.0;
                        if !abandoned {
                            building.jobs = jobs;
                        }
                    }
                }
            }
        }
    }
}

fn sync_utility_flags(
    grid: &mut TileGrid,
    coverage: &ServiceCoverage,
    x: usize,
    y: usize,
    current_power: bool,
    current_water: bool,
) -> (bool, bool) {
    let powered = coverage.is_powered(x, y);
    let watered = coverage.is_watered(x, y);
    if powered != current_power || watered != current_water {
        let building = &mut grid.tile_mut(x, y).building;
        building.powered = powered;
        building.watered = watered;
    }
    (powered, watered)
}

/// Demand-scaled spawn roll on a vacant zoned grass tile, gated by road
/// access and (for non-starter kinds) full utilities.
fn try_spawn(
    grid: &mut TileGrid,
    coverage: &ServiceCoverage,
    x: usize,
    y: usize,
    zone: ZoneKind,
    zone_demand: f32,
    rng: &mut impl Rng,
) {
    let chance = SPAWN_BASE_CHANCE * ((zone_demand + 30.0) / 80.0).clamp(0.0, 1.0);
    if rng.gen::<f32>() >= chance {
        return;
    }
    if !has_road_access(grid, x, y, ROAD_ACCESS_RANGE) {
        return;
    }
    let candidates = spawn_candidates(zone);
    if candidates.is_empty() {
        return;
    }
    let kind = candidates[rng.gen_range(0..candidates.len())];
    let powered = coverage.is_powered(x, y);
    let watered = coverage.is_watered(x, y);
    if !kind.is_starter() && !(powered && watered) {
        return;
    }
    let building = &mut grid.tile_mut(x, y).building;
    *building = Building::under_construction(kind);
    building.powered = powered;
    building.watered = watered;
}
