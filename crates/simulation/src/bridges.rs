use serde::{Deserialize, Serialize};
use xxhash_rust::xxh32::xxh32;

use crate::buildings::{Building, BuildingKind};
use crate::grid::TileGrid;

/// Longest water run a bridge may cross.
pub const MAX_BRIDGE_SPAN: usize = 10;

/// Span length at or below which a crossing is a `Large` bridge; longer
/// spans become suspension bridges.
const LARGE_SPAN_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    Road,
    Rail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeOrientation {
    NorthSouth,
    EastWest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgePosition {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeClass {
    Small,
    Large,
    Suspension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BridgeTile {
    pub class: BridgeClass,
    pub orientation: BridgeOrientation,
    pub span: u8,
    pub position: BridgePosition,
    pub variant: u8,
    pub track: TrackKind,
}

fn classify(span: usize) -> BridgeClass {
    if span == 1 {
        BridgeClass::Small
    } else if span <= LARGE_SPAN_LIMIT {
        BridgeClass::Large
    } else {
        BridgeClass::Suspension
    }
}

fn matches_track(grid: &TileGrid, x: usize, y: usize, track: TrackKind) -> bool {
    let tile = grid.get(x, y);
    match track {
        TrackKind::Road => tile.building.kind == BuildingKind::Road,
        TrackKind::Rail => tile.building.kind == BuildingKind::Rail || tile.has_rail_overlay,
    }
}

/// Deterministic cosmetic variant from the run's first tile coordinates.
fn cosmetic_variant(x: usize, y: usize) -> u8 {
    let mut bytes = [0u8; 8];
    bytes[..4].copy_from_slice(&(x as u32).to_le_bytes());
    bytes[4..].copy_from_slice(&(y as u32).to_le_bytes());
    (xxh32(&bytes, 0) % 4) as u8
}

/// Scan a just-committed road/rail path for water crossings and synthesize
/// bridge tiles over each valid run. Returns the number of bridge tiles
/// created.
pub fn create_bridges_on_path(
    grid: &mut TileGrid,
    path: &[(usize, usize)],
    track: TrackKind,
) -> usize {
    let mut created = 0;
    for &(x, y) in path {
        if !grid.in_bounds(x, y) || !matches_track(grid, x, y, track) {
            continue;
        }
        for (dx, dy) in [(1i32, 0i32), (-1, 0), (0, 1), (0, -1)] {
            created += try_span(grid, x, y, dx, dy, track);
        }
    }
    created
}

/// Walk one direction from a track tile; on `water* track` with the run
/// within the span cap, replace the water tiles with a bridge.
fn try_span(grid: &mut TileGrid, x: usize, y: usize, dx: i32, dy: i32, track: TrackKind) -> usize {
    let mut run: Vec<(usize, usize)> = Vec::new();
    let mut cx = x as i32 + dx;
    let mut cy = y as i32 + dy;

    loop {
        if !grid.in_bounds_i(cx, cy) || run.len() > MAX_BRIDGE_SPAN {
            return 0;
        }
        let (ux, uy) = (cx as usize, cy as usize);
        if grid.get(ux, uy).is_water() {
            run.push((ux, uy));
        } else if matches_track(grid, ux, uy, track) && !run.is_empty() {
            break;
        } else {
            // Any other tile, an existing bridge included, kills the run.
            return 0;
        }
        cx += dx;
        cy += dy;
    }

    let span = run.len();
    let class = classify(span);
    let orientation = if dy == 0 {
        BridgeOrientation::EastWest
    } else {
        BridgeOrientation::NorthSouth
    };
    let variant = cosmetic_variant(run[0].0, run[0].1);

    for (i, &(bx, by)) in run.iter().enumerate() {
        let position = if i == 0 {
            BridgePosition::Start
        } else if i == span - 1 {
            BridgePosition::End
        } else {
            BridgePosition::Middle
        };
        grid.tile_mut(bx, by).building = Building::bridge(BridgeTile {
            class,
            orientation,
            span: span as u8,
            position,
            variant,
            track,
        });
    }
    span
}

#[cfg(test)]
mod tests {
    use super::*;

    fn road(grid: &mut TileGrid, x: usize, y: usize) {
        grid.tile_mut(x, y).building = Building::structural(BuildingKind::Road);
    }

    fn water(grid: &mut TileGrid, x: usize, y: usize) {
        grid.tile_mut(x, y).building = Building::structural(BuildingKind::Water);
    }

    #[test]
    fn test_three_tile_crossing_becomes_large_bridge() {
        let mut grid = TileGrid::new(16);
        road(&mut grid, 2, 5);
        water(&mut grid, 3, 5);
        water(&mut grid, 4, 5);
        water(&mut grid, 5, 5);
        road(&mut grid, 6, 5);

        let created = create_bridges_on_path(&mut grid, &[(2, 5)], TrackKind::Road);
        assert_eq!(created, 3);

        let expected = [
            (3, BridgePosition::Start),
            (4, BridgePosition::Middle),
            (5, BridgePosition::End),
        ];
        for (x, position) in expected {
            let bridge = grid.get(x, 5).building.bridge.expect("bridge tile");
            assert_eq!(bridge.class, BridgeClass::Large);
            assert_eq!(bridge.span, 3);
            assert_eq!(bridge.position, position);
            assert_eq!(bridge.orientation, BridgeOrientation::EastWest);
            assert_eq!(bridge.track, TrackKind::Road);
        }
    }

    #[test]
    fn test_single_tile_crossing_is_small() {
        let mut grid = TileGrid::new(16);
        road(&mut grid, 4, 4);
        water(&mut grid, 4, 5);
        road(&mut grid, 4, 6);
        create_bridges_on_path(&mut grid, &[(4, 4)], TrackKind::Road);
        let bridge = grid.get(4, 5).building.bridge.unwrap();
        assert_eq!(bridge.class, BridgeClass::Small);
        assert_eq!(bridge.orientation, BridgeOrientation::NorthSouth);
    }

    #[test]
    fn test_long_crossing_is_suspension_and_capped() {
        let mut grid = TileGrid::new(24);
        road(&mut grid, 2, 8);
        for x in 3..11 {
            water(&mut grid, x, 8);
        }
        road(&mut grid, 11, 8);
        let created = create_bridges_on_path(&mut grid, &[(2, 8)], TrackKind::Road);
        assert_eq!(created, 8);
        assert_eq!(
            grid.get(3, 8).building.bridge.unwrap().class,
            BridgeClass::Suspension
        );

        // Beyond the cap nothing is built.
        let mut wide = TileGrid::new(24);
        road(&mut wide, 2, 8);
        for x in 3..14 {
            water(&mut wide, x, 8);
        }
        road(&mut wide, 14, 8);
        assert_eq!(create_bridges_on_path(&mut wide, &[(2, 8)], TrackKind::Road), 0);
    }

    #[test]
    fn test_interrupted_run_builds_nothing() {
        let mut grid = TileGrid::new(16);
        road(&mut grid, 2, 5);
        water(&mut grid, 3, 5);
        grid.tile_mut(4, 5).building = Building::structural(BuildingKind::Grass);
        water(&mut grid, 5, 5);
        road(&mut grid, 6, 5);
        assert_eq!(create_bridges_on_path(&mut grid, &[(2, 5)], TrackKind::Road), 0);
    }

    #[test]
    fn test_mismatched_track_terminator_builds_nothing() {
        let mut grid = TileGrid::new(16);
        road(&mut grid, 2, 5);
        water(&mut grid, 3, 5);
        grid.tile_mut(4, 5).building = Building::structural(BuildingKind::Rail);
        assert_eq!(create_bridges_on_path(&mut grid, &[(2, 5)], TrackKind::Road), 0);
    }

    #[test]
    fn test_existing_bridge_not_rebuilt() {
        let mut grid = TileGrid::new(16);
        road(&mut grid, 2, 5);
        water(&mut grid, 3, 5);
        water(&mut grid, 4, 5);
        road(&mut grid, 5, 5);
        create_bridges_on_path(&mut grid, &[(2, 5)], TrackKind::Road);
        let before = grid.get(3, 5).building.clone();
        // Re-committing the path scans again; the bridge tiles end the run.
        assert_eq!(create_bridges_on_path(&mut grid, &[(2, 5)], TrackKind::Road), 0);
        assert_eq!(grid.get(3, 5).building, before);
    }

    #[test]
    fn test_variant_is_deterministic() {
        assert_eq!(cosmetic_variant(7, 9), cosmetic_variant(7, 9));
        assert!(cosmetic_variant(7, 9) < 4);
    }
}
