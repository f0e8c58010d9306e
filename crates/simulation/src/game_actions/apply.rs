//! Pure state transforms behind the action queue. Every function takes the
//! current state by reference and returns a fresh state on success; on error
//! the caller keeps the input unchanged. Grid rows are shared, so the clone
//! is cheap.

use crate::bridges::{self, TrackKind};
use crate::buildings::{Building, BuildingKind};
use crate::config::{MAX_WORLD_SIZE, MIN_WORLD_SIZE, ROAD_ACCESS_RANGE};
use crate::coverage::calculate_service_coverage;
use crate::grid::{TileGrid, ZoneKind};
use crate::lifecycle::clear_footprint;
use crate::road_access::has_road_access;
use crate::state::GameState;

use super::actions::{ActionError, DevelopmentBlocker};

const ZONE_COST: f64 = 5.0;
const BULLDOZE_COST: f64 = 5.0;
const SUBWAY_COST: f64 = 120.0;
const TERRAFORM_COST: f64 = 50.0;
/// Demand at or below which spawn probability bottoms out.
const SPAWN_DEMAND_FLOOR: f32 = -30.0;

fn charge(state: &mut GameState, cost: f64) -> Result<(), ActionError> {
    if cost > 0.0 && state.stats.money < cost {
        return Err(ActionError::InsufficientFunds);
    }
    state.stats.money -= cost;
    Ok(())
}

/// Zoning (kind = None) or placement (kind = Some). Placement on water, on
/// incompatible structures, or with a blocked footprint is rejected.
pub fn place_building(
    state: &GameState,
    x: usize,
    y: usize,
    kind: Option<BuildingKind>,
    zone: Option<ZoneKind>,
) -> Result<GameState, ActionError> {
    if !state.grid.in_bounds(x, y) {
        return Err(ActionError::OutOfBounds);
    }
    match kind {
        None => {
            let zone = zone.ok_or(ActionError::InvalidTarget)?;
            zone_tile(state, x, y, zone)
        }
        Some(kind) => place_kind(state, x, y, kind),
    }
}

fn zone_tile(
    state: &GameState,
    x: usize,
    y: usize,
    zone: ZoneKind,
) -> Result<GameState, ActionError> {
    let tile = state.grid.get(x, y);
    if tile.is_water() {
        return Err(ActionError::OnWater);
    }
    if !tile.is_vacant_grass() {
        return Err(ActionError::Occupied);
    }
    let mut next = state.clone();
    charge(&mut next, ZONE_COST)?;
    next.grid.tile_mut(x, y).zone = zone;
    Ok(next)
}

fn place_kind(
    state: &GameState,
    x: usize,
    y: usize,
    kind: BuildingKind,
) -> Result<GameState, ActionError> {
    match kind {
        BuildingKind::Grass | BuildingKind::Filler | BuildingKind::Water | BuildingKind::Bridge => {
            Err(ActionError::InvalidTarget)
        }
        BuildingKind::Road | BuildingKind::Tree => place_structural(state, x, y, kind),
        BuildingKind::Rail => place_rail(state, x, y),
        _ => place_footprint_building(state, x, y, kind),
    }
}

fn place_structural(
    state: &GameState,
    x: usize,
    y: usize,
    kind: BuildingKind,
) -> Result<GameState, ActionError> {
    let tile = state.grid.get(x, y);
    if tile.is_water() {
        return Err(ActionError::OnWater);
    }
    if !tile.is_vacant_grass() {
        return Err(ActionError::Occupied);
    }
    let mut next = state.clone();
    charge(&mut next, kind.build_cost())?;
    let tile = next.grid.tile_mut(x, y);
    tile.building = Building::structural(kind);
    tile.zone = ZoneKind::None;
    Ok(next)
}

/// Rail placed on an existing road becomes an overlay; on open grass it is a
/// dedicated rail tile.
fn place_rail(state: &GameState, x: usize, y: usize) -> Result<GameState, ActionError> {
    let tile = state.grid.get(x, y);
    if tile.kind() == BuildingKind::Road {
        if tile.has_rail_overlay {
            return Err(ActionError::Occupied);
        }
        let mut next = state.clone();
        charge(&mut next, BuildingKind::Rail.build_cost())?;
        next.grid.tile_mut(x, y).has_rail_overlay = true;
        return Ok(next);
    }
    place_structural(state, x, y, BuildingKind::Rail)
}

fn place_footprint_building(
    state: &GameState,
    x: usize,
    y: usize,
    kind: BuildingKind,
) -> Result<GameState, ActionError> {
    let (w, h) = kind.footprint();
    for dy in 0..h {
        for dx in 0..w {
            let (tx, ty) = (x + dx, y + dy);
            if !state.grid.in_bounds(tx, ty) {
                return Err(ActionError::FootprintBlocked);
            }
            let tile = state.grid.get(tx, ty);
            if tile.is_water() {
                return Err(ActionError::OnWater);
            }
            if !tile.is_vacant_grass() {
                return Err(ActionError::FootprintBlocked);
            }
        }
    }
    let mut next = state.clone();
    charge(&mut next, kind.build_cost())?;
    for dy in 0..h {
        for dx in 0..w {
            let tile = next.grid.tile_mut(x + dx, y + dy);
            tile.zone = ZoneKind::None;
            tile.building = if (dx, dy) == (0, 0) {
                Building::under_construction(kind)
            } else {
                Building::filler(dx as i8, dy as i8)
            };
        }
    }
    Ok(next)
}

pub fn bulldoze_tile(state: &GameState, x: usize, y: usize) -> Result<GameState, ActionError> {
    if !state.grid.in_bounds(x, y) {
        return Err(ActionError::OutOfBounds);
    }
    let tile = state.grid.get(x, y);
    match tile.kind() {
        BuildingKind::Water => Err(ActionError::InvalidTarget),
        BuildingKind::Grass => {
            // Bulldozing zoned grass removes the zoning.
            if !tile.zone.is_zoned() {
                return Err(ActionError::InvalidTarget);
            }
            let mut next = state.clone();
            charge(&mut next, BULLDOZE_COST)?;
            next.grid.tile_mut(x, y).zone = ZoneKind::None;
            Ok(next)
        }
        BuildingKind::Road | BuildingKind::Rail | BuildingKind::Tree => {
            let mut next = state.clone();
            charge(&mut next, BULLDOZE_COST)?;
            let tile = next.grid.tile_mut(x, y);
            tile.building = Building::default();
            tile.has_rail_overlay = false;
            Ok(next)
        }
        BuildingKind::Bridge => {
            let mut next = state.clone();
            charge(&mut next, BULLDOZE_COST)?;
            next.grid.tile_mut(x, y).building = Building::structural(BuildingKind::Water);
            Ok(next)
        }
        _ => {
            let (ax, ay) = state.grid.anchor_of(x, y).ok_or(ActionError::InvalidTarget)?;
            let mut next = state.clone();
            charge(&mut next, BULLDOZE_COST)?;
            clear_footprint(&mut next.grid, ax, ay);
            Ok(next)
        }
    }
}

pub fn upgrade_service_building(
    state: &GameState,
    x: usize,
    y: usize,
) -> Result<GameState, ActionError> {
    if !state.grid.in_bounds(x, y) {
        return Err(ActionError::OutOfBounds);
    }
    let building = &state.grid.get(x, y).building;
    if building.kind.service_class().is_none() || !building.is_complete() || building.abandoned {
        return Err(ActionError::InvalidTarget);
    }
    if building.level >= 5 {
        return Err(ActionError::InvalidTarget);
    }
    let next_level = building.level + 1;
    let cost = building.kind.build_cost() * 0.5 * next_level as f64;
    let mut next = state.clone();
    charge(&mut next, cost)?;
    next.grid.tile_mut(x, y).building.level = next_level;
    Ok(next)
}

pub fn place_subway(state: &GameState, x: usize, y: usize) -> Result<GameState, ActionError> {
    if !state.grid.in_bounds(x, y) {
        return Err(ActionError::OutOfBounds);
    }
    let tile = state.grid.get(x, y);
    if tile.is_water() {
        return Err(ActionError::OnWater);
    }
    if tile.has_subway {
        return Err(ActionError::Occupied);
    }
    let mut next = state.clone();
    charge(&mut next, SUBWAY_COST)?;
    next.grid.tile_mut(x, y).has_subway = true;
    Ok(next)
}

pub fn remove_subway(state: &GameState, x: usize, y: usize) -> Result<GameState, ActionError> {
    if !state.grid.in_bounds(x, y) {
        return Err(ActionError::OutOfBounds);
    }
    if !state.grid.get(x, y).has_subway {
        return Err(ActionError::InvalidTarget);
    }
    let mut next = state.clone();
    charge(&mut next, BULLDOZE_COST)?;
    next.grid.tile_mut(x, y).has_subway = false;
    Ok(next)
}

pub fn place_water_terraform(
    state: &GameState,
    x: usize,
    y: usize,
) -> Result<GameState, ActionError> {
    if !state.grid.in_bounds(x, y) {
        return Err(ActionError::OutOfBounds);
    }
    if !state.grid.get(x, y).is_vacant_grass() {
        return Err(ActionError::Occupied);
    }
    let mut next = state.clone();
    charge(&mut next, TERRAFORM_COST)?;
    let tile = next.grid.tile_mut(x, y);
    tile.building = Building::structural(BuildingKind::Water);
    tile.zone = ZoneKind::None;
    Ok(next)
}

/// Fill a water tile in. Water bodies stay as generated; a filled member
/// tile is tolerated by design.
pub fn place_land_terraform(
    state: &GameState,
    x: usize,
    y: usize,
) -> Result<GameState, ActionError> {
    if !state.grid.in_bounds(x, y) {
        return Err(ActionError::OutOfBounds);
    }
    if !state.grid.get(x, y).is_water() {
        return Err(ActionError::InvalidTarget);
    }
    let mut next = state.clone();
    charge(&mut next, TERRAFORM_COST)?;
    next.grid.tile_mut(x, y).building = Building::default();
    Ok(next)
}

pub fn expand_grid(state: &GameState, amount: usize) -> Result<GameState, ActionError> {
    if amount == 0 || state.grid.size() + amount > MAX_WORLD_SIZE {
        return Err(ActionError::InvalidTarget);
    }
    let mut next = state.clone();
    next.grid = next.grid.expanded(amount);
    Ok(next)
}

pub fn shrink_grid(state: &GameState, amount: usize) -> Result<GameState, ActionError> {
    if amount == 0 {
        return Err(ActionError::InvalidTarget);
    }
    let shrunk = state
        .grid
        .shrunk(amount, MIN_WORLD_SIZE)
        .ok_or(ActionError::GridTooSmall)?;
    let mut next = state.clone();
    next.grid = shrunk;
    Ok(next)
}

pub fn create_bridges_on_path(
    state: &GameState,
    path: &[(usize, usize)],
    track: TrackKind,
) -> GameState {
    let mut next = state.clone();
    bridges::create_bridges_on_path(&mut next.grid, path, track);
    next
}

/// Diagnostic: why hasn't this tile developed? Empty when nothing blocks it.
pub fn get_development_blockers(
    state: &GameState,
    x: usize,
    y: usize,
) -> Vec<DevelopmentBlocker> {
    if !state.grid.in_bounds(x, y) {
        return vec![DevelopmentBlocker::NotZoned];
    }
    let tile = state.grid.get(x, y);
    if !tile.zone.is_zoned() {
        return vec![DevelopmentBlocker::NotZoned];
    }
    if !tile.is_vacant_grass() {
        return vec![DevelopmentBlocker::TileOccupied];
    }

    let mut blockers = Vec::new();
    if !has_road_access(&state.grid, x, y, ROAD_ACCESS_RANGE) {
        blockers.push(DevelopmentBlocker::NoRoadAccess);
    }
    let coverage = calculate_service_coverage(&state.grid);
    if !coverage.is_powered(x, y) {
        blockers.push(DevelopmentBlocker::NoPower);
    }
    if !coverage.is_watered(x, y) {
        blockers.push(DevelopmentBlocker::NoWater);
    }
    if state.stats.demand.for_zone(tile.zone) <= SPAWN_DEMAND_FLOOR {
        blockers.push(DevelopmentBlocker::LowDemand);
    }
    blockers
}

/// Water adjacency for a footprint at (x, y): whether any edge touches
/// water, and whether a waterfront sprite should flip to face it. The south
/// edge is checked first and faces forward; a west-side hit flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterAdjacency {
    pub has_water: bool,
    pub should_flip: bool,
}

pub fn get_water_adjacency(
    grid: &TileGrid,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> WaterAdjacency {
    let water_at = |tx: i32, ty: i32| -> bool {
        grid.in_bounds_i(tx, ty) && grid.get(tx as usize, ty as usize).is_water()
    };

    // South edge: forward-facing.
    for dx in 0..width as i32 {
        if water_at(x as i32 + dx, y as i32 + height as i32) {
            return WaterAdjacency {
                has_water: true,
                should_flip: false,
            };
        }
    }
    // West edge: flipped.
    for dy in 0..height as i32 {
        if water_at(x as i32 - 1, y as i32 + dy) {
            return WaterAdjacency {
                has_water: true,
                should_flip: true,
            };
        }
    }
    // East and north edges: forward-facing.
    for dy in 0..height as i32 {
        if water_at(x as i32 + width as i32, y as i32 + dy) {
            return WaterAdjacency {
                has_water: true,
                should_flip: false,
            };
        }
    }
    for dx in 0..width as i32 {
        if water_at(x as i32 + dx, y as i32 - 1) {
            return WaterAdjacency {
                has_water: true,
                should_flip: false,
            };
        }
    }
    WaterAdjacency {
        has_water: false,
        should_flip: false,
    }
}
