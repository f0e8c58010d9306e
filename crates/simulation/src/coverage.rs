use crate::buildings::ServiceClass;
use crate::grid::TileGrid;

/// Per-tile service fields recomputed from scratch every tick. The four
/// quality services accumulate additively with linear falloff and cap at 100;
/// power and water are a plain union of circles.
#[derive(Debug, Clone)]
pub struct ServiceCoverage {
    size: usize,
    pub police: Vec<f32>,
    pub fire: Vec<f32>,
    pub health: Vec<f32>,
    pub education: Vec<f32>,
    pub power: Vec<bool>,
    pub water: Vec<bool>,
}

impl ServiceCoverage {
    pub fn new(size: usize) -> Self {
        let n = size * size;
        Self {
            size,
            police: vec![0.0; n],
            fire: vec![0.0; n],
            health: vec![0.0; n],
            education: vec![0.0; n],
            power: vec![false; n],
            water: vec![false; n],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    #[inline]
    pub fn is_powered(&self, x: usize, y: usize) -> bool {
        self.power[self.idx(x, y)]
    }

    #[inline]
    pub fn is_watered(&self, x: usize, y: usize) -> bool {
        self.water[self.idx(x, y)]
    }

    #[inline]
    pub fn fire_at(&self, x: usize, y: usize) -> f32 {
        self.fire[self.idx(x, y)]
    }

    /// Mean of the four quality fields at one tile.
    pub fn quality_average(&self, x: usize, y: usize) -> f32 {
        let i = self.idx(x, y);
        (self.police[i] + self.fire[i] + self.health[i] + self.education[i]) / 4.0
    }
}

/// Effective radius grows 20% per level above 1, floored to whole tiles.
pub fn effective_range(base_range: u32, level: u8) -> u32 {
    let level = level.max(1);
    (base_range as f32 * (1.0 + (level - 1) as f32 * 0.2)) as u32
}

pub fn calculate_service_coverage(grid: &TileGrid) -> ServiceCoverage {
    let size = grid.size();
    let mut coverage = ServiceCoverage::new(size);

    for y in 0..size {
        for x in 0..size {
            let building = &grid.get(x, y).building;
            let Some(class) = building.kind.service_class() else {
                continue;
            };
            if !building.is_complete() || building.abandoned {
                continue;
            }
            let range = effective_range(building.kind.base_range(), building.level);
            if range == 0 {
                continue;
            }
            apply_source(&mut coverage, grid, x, y, range, class);
        }
    }
    coverage
}

fn apply_source(
    coverage: &mut ServiceCoverage,
    grid: &TileGrid,
    sx: usize,
    sy: usize,
    range: u32,
    class: ServiceClass,
) {
    let r = range as i32;
    let range_f = range as f32;
    for dy in -r..=r {
        for dx in -r..=r {
            let tx = sx as i32 + dx;
            let ty = sy as i32 + dy;
            if !grid.in_bounds_i(tx, ty) {
                continue;
            }
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            if dist > range_f {
                continue;
            }
            let idx = coverage.idx(tx as usize, ty as usize);
            match class {
                ServiceClass::Power => coverage.power[idx] = true,
                ServiceClass::Water => coverage.water[idx] = true,
                _ => {
                    let contribution = ((1.0 - dist / range_f) * 100.0).max(0.0);
                    let field = match class {
                        ServiceClass::Police => &mut coverage.police,
                        ServiceClass::Fire => &mut coverage.fire,
                        ServiceClass::Health => &mut coverage.health,
                        ServiceClass::Education => &mut coverage.education,
                        ServiceClass::Power | ServiceClass::Water => unreachable!(),
                    };
                    field[idx] = (field[idx] + contribution).min(100.0);
                }
            }
        }
    }
}
