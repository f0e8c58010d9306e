use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::buildings::{Building, BuildingKind, PollutionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ZoneKind {
    #[default]
    None,
    Residential,
    Commercial,
    Industrial,
}

impl ZoneKind {
    pub fn is_zoned(self) -> bool {
        self != ZoneKind::None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub zone: ZoneKind,
    pub building: Building,
    pub land_value: f32,
    pub pollution: f32,
    pub pollution_kind: Option<PollutionKind>,
    /// Reserved, never computed by this core.
    pub crime: f32,
    /// Reserved, never computed by this core.
    pub traffic: f32,
    pub has_subway: bool,
    pub has_rail_overlay: bool,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            zone: ZoneKind::None,
            building: Building::default(),
            land_value: 30.0,
            pollution: 0.0,
            pollution_kind: None,
            crime: 0.0,
            traffic: 0.0,
            has_subway: false,
            has_rail_overlay: false,
        }
    }
}

impl Tile {
    pub fn kind(&self) -> BuildingKind {
        self.building.kind
    }

    pub fn is_water(&self) -> bool {
        self.building.kind == BuildingKind::Water
    }

    /// Grass with nothing on it; zoning does not count as occupancy.
    pub fn is_vacant_grass(&self) -> bool {
        self.building.kind == BuildingKind::Grass
    }
}

/// The world grid. Rows are `Arc`-shared: cloning the grid is cheap, and a
/// row is deep-copied only on its first mutation (`Arc::make_mut`), so a tick
/// that leaves a row untouched never allocates for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    rows: Vec<Arc<Vec<Tile>>>,
    size: usize,
}

impl TileGrid {
    pub fn new(size: usize) -> Self {
        let rows = (0..size)
            .map(|_| Arc::new(vec![Tile::default(); size]))
            .collect();
        Self { rows, size }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    #[inline]
    pub fn in_bounds_i(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &Tile {
        &self.rows[y][x]
    }

    /// Mutable access; clones the row the first time it diverges from a
    /// shared row this generation.
    #[inline]
    pub fn tile_mut(&mut self, x: usize, y: usize) -> &mut Tile {
        &mut Arc::make_mut(&mut self.rows[y])[x]
    }

    /// Whether row `y` is still physically shared with `other` (no
    /// copy-on-write has split it). Used by tests asserting tick purity.
    pub fn row_shared_with(&self, other: &TileGrid, y: usize) -> bool {
        Arc::ptr_eq(&self.rows[y], &other.rows[y])
    }

    /// Returns up to 4 cardinal neighbors and the count of valid entries.
    /// Use `&result[..count]` to iterate over valid neighbors.
    pub fn neighbors4(&self, x: usize, y: usize) -> ([(usize, usize); 4], usize) {
        let mut result = [(0, 0); 4];
        let mut count = 0;
        if x > 0 {
            result[count] = (x - 1, y);
            count += 1;
        }
        if x + 1 < self.size {
            result[count] = (x + 1, y);
            count += 1;
        }
        if y > 0 {
            result[count] = (x, y - 1);
            count += 1;
        }
        if y + 1 < self.size {
            result[count] = (x, y + 1);
            count += 1;
        }
        (result, count)
    }

    /// Resolve the anchor coordinates of the building occupying (x, y):
    /// the tile itself, or the tile its filler offset points at.
    pub fn anchor_of(&self, x: usize, y: usize) -> Option<(usize, usize)> {
        let tile = self.get(x, y);
        match tile.building.kind {
            BuildingKind::Filler => {
                let (dx, dy) = tile.building.filler_anchor?;
                let ax = x.checked_sub(dx as usize)?;
                let ay = y.checked_sub(dy as usize)?;
                Some((ax, ay))
            }
            _ => Some((x, y)),
        }
    }

    /// A filler whose anchor no longer hosts a footprint covering it.
    pub fn is_orphaned_filler(&self, x: usize, y: usize) -> bool {
        let tile = self.get(x, y);
        if tile.building.kind != BuildingKind::Filler {
            return false;
        }
        let Some((dx, dy)) = tile.building.filler_anchor else {
            return true;
        };
        let Some(ax) = x.checked_sub(dx as usize) else {
            return true;
        };
        let Some(ay) = y.checked_sub(dy as usize) else {
            return true;
        };
        let anchor = self.get(ax, ay).building.kind;
        if anchor.is_structural() {
            return true;
        }
        let (w, h) = anchor.footprint();
        (dx as usize) >= w || (dy as usize) >= h
    }

    /// Grow the grid by `amount` tiles on the east and south sides, keeping
    /// every original coordinate intact.
    pub fn expanded(&self, amount: usize) -> TileGrid {
        let new_size = self.size + amount;
        let mut rows: Vec<Arc<Vec<Tile>>> = Vec::with_capacity(new_size);
        for row in &self.rows {
            let mut cells = row.as_ref().clone();
            cells.resize(new_size, Tile::default());
            rows.push(Arc::new(cells));
        }
        for _ in 0..amount {
            rows.push(Arc::new(vec![Tile::default(); new_size]));
        }
        TileGrid {
            rows,
            size: new_size,
        }
    }

    /// Drop `amount` tiles from the east and south sides. Returns `None`
    /// when the result would fall below `min_size`.
    pub fn shrunk(&self, amount: usize, min_size: usize) -> Option<TileGrid> {
        let new_size = self.size.checked_sub(amount)?;
        if new_size < min_size {
            return None;
        }
        let rows = self.rows[..new_size]
            .iter()
            .map(|row| {
                let mut cells = row.as_ref().clone();
                cells.truncate(new_size);
                Arc::new(cells)
            })
            .collect();
        Some(TileGrid {
            rows,
            size: new_size,
        })
    }
}
