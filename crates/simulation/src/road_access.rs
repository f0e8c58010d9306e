use std::collections::VecDeque;

use crate::buildings::BuildingKind;
use crate::grid::TileGrid;

/// Breadth-first reachability: is (x, y) within `max_distance` hops of a road
/// or bridge tile, travelling only through tiles of the starting tile's zone?
///
/// The visited buffer is local and sized to the search window, so the cost is
/// proportional to `max_distance^2` regardless of grid size.
pub fn has_road_access(grid: &TileGrid, x: usize, y: usize, max_distance: usize) -> bool {
    let start_zone = grid.get(x, y).zone;
    if !start_zone.is_zoned() {
        return false;
    }

    let window = 2 * max_distance + 1;
    let mut visited = vec![false; window * window];
    // Window-local index; the window is centered on the start tile.
    let local_idx = |tx: usize, ty: usize| -> Option<usize> {
        let lx = (tx + max_distance).checked_sub(x)?;
        let ly = (ty + max_distance).checked_sub(y)?;
        if lx >= window || ly >= window {
            return None;
        }
        Some(ly * window + lx)
    };

    let mut queue: VecDeque<((usize, usize), usize)> = VecDeque::new();
    visited[local_idx(x, y).expect("start tile is the window center")] = true;
    queue.push_back(((x, y), 0));

    while let Some(((cx, cy), dist)) = queue.pop_front() {
        if dist >= max_distance {
            continue;
        }
        let (neighbors, count) = grid.neighbors4(cx, cy);
        for &(nx, ny) in &neighbors[..count] {
            let Some(idx) = local_idx(nx, ny) else {
                continue;
            };
            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            let tile = grid.get(nx, ny);
            match tile.building.kind {
                BuildingKind::Road | BuildingKind::Bridge => return true,
                BuildingKind::Water => {}
                // Interior nodes must share the start zone; occupancy is
                // irrelevant.
                _ if tile.zone == start_zone => queue.push_back(((nx, ny), dist + 1)),
                _ => {}
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::Building;
    use crate::config::ROAD_ACCESS_RANGE;
    use crate::grid::ZoneKind;

    fn zoned_grid(size: usize) -> TileGrid {
        let mut grid = TileGrid::new(size);
        for y in 0..size {
            for x in 0..size {
                grid.tile_mut(x, y).zone = ZoneKind::Residential;
            }
        }
        grid
    }

    #[test]
    fn test_unzoned_tile_has_no_access() {
        let mut grid = TileGrid::new(16);
        grid.tile_mut(5, 4).building = Building::structural(BuildingKind::Road);
        assert!(!has_road_access(&grid, 5, 5, ROAD_ACCESS_RANGE));
    }

    #[test]
    fn test_adjacent_road_found() {
        let mut grid = zoned_grid(16);
        grid.tile_mut(5, 4).building = Building::structural(BuildingKind::Road);
        assert!(has_road_access(&grid, 5, 5, ROAD_ACCESS_RANGE));
    }

    #[test]
    fn test_distance_bound_respected() {
        let mut grid = zoned_grid(32);
        grid.tile_mut(20, 8).building = Building::structural(BuildingKind::Road);
        // 12 hops away along x from (8, 8): outside the budget of 8.
        assert!(!has_road_access(&grid, 8, 8, ROAD_ACCESS_RANGE));
        assert!(has_road_access(&grid, 14, 8, ROAD_ACCESS_RANGE));
    }

    #[test]
    fn test_zone_mismatch_blocks_traversal() {
        let mut grid = zoned_grid(16);
        // A commercial stripe between the start tile and the road.
        for y in 0..16 {
            grid.tile_mut(6, y).zone = ZoneKind::Commercial;
        }
        grid.tile_mut(8, 5).building = Building::structural(BuildingKind::Road);
        // Zone wall at x=6 blocks every path from (4, 5); the road at (8, 5)
        // sits beyond it, and its own tile is only reachable through x=6.
        assert!(!has_road_access(&grid, 4, 5, 8));
        // From inside the stripe's east side the road is adjacent.
        assert!(has_road_access(&grid, 7, 5, 8));
    }

    #[test]
    fn test_water_blocks_traversal() {
        let mut grid = zoned_grid(16);
        for y in 0..16 {
            grid.tile_mut(6, y).building = Building::structural(BuildingKind::Water);
        }
        grid.tile_mut(9, 5).building = Building::structural(BuildingKind::Road);
        assert!(!has_road_access(&grid, 4, 5, 8));
    }

    #[test]
    fn test_bridge_counts_as_road() {
        let mut grid = zoned_grid(16);
        grid.tile_mut(5, 4).building =
            Building::structural(BuildingKind::Bridge);
        assert!(has_road_access(&grid, 5, 5, ROAD_ACCESS_RANGE));
    }
}
