use serde::{Deserialize, Serialize};

use crate::budget::Budget;
use crate::buildings::BuildingKind;
use crate::coverage::ServiceCoverage;
use crate::grid::{TileGrid, ZoneKind};

// Demand model weights. Residents chase jobs; commerce and industry chase
// customers and workers. Fixed design constants, not runtime tunables.
const RES_JOB_PULL: f32 = 1.25;
const COM_POP_PULL: f32 = 0.5;
const IND_POP_PULL: f32 = 0.35;

/// Commercial jobs count 15% extra in aggregate when the tile is
/// subway-served. Aggregate only: the per-building jobs field is unboosted.
const SUBWAY_JOBS_BONUS: f32 = 1.15;

// Quality score weights.
const SAFETY_POLICE_W: f32 = 0.75;
const SAFETY_FIRE_W: f32 = 0.25;
const HEALTH_COVERAGE_W: f32 = 0.7;
const HEALTH_POLLUTION_W: f32 = 0.3;
const ENV_POLLUTION_W: f32 = 0.5;
const ENV_GREEN_W: f32 = 0.35;
const ENV_WATER_W: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RciDemand {
    pub residential: f32,
    pub commercial: f32,
    pub industrial: f32,
}

impl RciDemand {
    pub fn for_zone(&self, zone: ZoneKind) -> f32 {
        match zone {
            ZoneKind::Residential => self.residential,
            ZoneKind::Commercial => self.commercial,
            ZoneKind::Industrial => self.industrial,
            ZoneKind::None => 0.0,
        }
    }

    /// Exponential smoothing of `self` toward `target`.
    pub fn smoothed_toward(&self, target: &RciDemand, factor: f32) -> RciDemand {
        let blend = |from: f32, to: f32| from + (to - from) * factor;
        RciDemand {
            residential: blend(self.residential, target.residential),
            commercial: blend(self.commercial, target.commercial),
            industrial: blend(self.industrial, target.industrial),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CityStats {
    pub population: u32,
    pub jobs: u32,
    pub money: f64,
    pub income: f64,
    pub expenses: f64,
    pub happiness: f32,
    pub health: f32,
    pub education: f32,
    pub safety: f32,
    pub environment: f32,
    pub demand: RciDemand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    pub year: u32,
    pub month: u32,
    pub population: u32,
    pub jobs: u32,
    pub money: f64,
}

/// Single full-grid aggregation pass. `money` is left at zero; the
/// orchestrator carries the treasury across ticks.
pub fn calculate_stats(grid: &TileGrid, budget: &Budget, coverage: &ServiceCoverage) -> CityStats {
    let size = grid.size();

    let mut population: u32 = 0;
    let mut jobs: u32 = 0;
    let mut commercial_jobs: f32 = 0.0;
    let mut industrial_jobs: f32 = 0.0;
    let mut pollution_sum: f32 = 0.0;
    let mut green_tiles: u32 = 0;
    let mut water_tiles: u32 = 0;
    let mut subway_tiles: u32 = 0;
    let mut rail_tiles: u32 = 0;
    let mut landmark_bonus: f32 = 0.0;

    // Coverage averaged over inhabited tiles; an empty map falls back to the
    // whole grid so the scores stay defined.
    let mut inhabited: u32 = 0;
    let mut police_sum: f32 = 0.0;
    let mut fire_sum: f32 = 0.0;
    let mut health_sum: f32 = 0.0;
    let mut education_sum: f32 = 0.0;

    for y in 0..size {
        for x in 0..size {
            let tile = grid.get(x, y);
            let building = &tile.building;
            pollution_sum += tile.pollution;

            if tile.has_subway {
                subway_tiles += 1;
            }
            if tile.has_rail_overlay || building.kind == BuildingKind::Rail {
                rail_tiles += 1;
            }

            match building.kind {
                BuildingKind::Tree => green_tiles += 1,
                BuildingKind::Water => water_tiles += 1,
                BuildingKind::CityHall => landmark_bonus += 4.0,
                BuildingKind::Airport => landmark_bonus += 8.0,
                BuildingKind::Stadium => landmark_bonus += 6.0,
                BuildingKind::Museum => landmark_bonus += 3.0,
                BuildingKind::AmusementPark => landmark_bonus += 5.0,
                kind if kind.is_park() => green_tiles += 1,
                _ => {}
            }

            population += building.population;
            jobs += building.jobs;
            match tile.zone {
                ZoneKind::Commercial => {
                    let boost = if tile.has_subway {
                        SUBWAY_JOBS_BONUS
                    } else {
                        1.0
                    };
                    commercial_jobs += building.jobs as f32 * boost;
                }
                ZoneKind::Industrial => industrial_jobs += building.jobs as f32,
                _ => {}
            }

            if building.population + building.jobs > 0 {
                inhabited += 1;
                let idx = coverage.idx(x, y);
                police_sum += coverage.police[idx];
                fire_sum += coverage.fire[idx];
                health_sum += coverage.health[idx];
                education_sum += coverage.education[idx];
            }
        }
    }

    let total_tiles = (size * size) as f32;
    let samples = if inhabited > 0 {
        inhabited as f32
    } else {
        police_sum = coverage.police.iter().sum();
        fire_sum = coverage.fire.iter().sum();
        health_sum = coverage.health.iter().sum();
        education_sum = coverage.education.iter().sum();
        total_tiles
    };

    let police_avg = police_sum / samples;
    let fire_avg = fire_sum / samples;
    let health_avg = health_sum / samples;
    let education_avg = education_sum / samples;
    let pollution_avg = pollution_sum / total_tiles;
    let green_ratio = green_tiles as f32 / total_tiles;
    let water_ratio = water_tiles as f32 / total_tiles;

    landmark_bonus += (subway_tiles as f32 / 4.0).min(8.0);
    landmark_bonus += (rail_tiles as f32 / 8.0).min(6.0);

    let demand = derive_demand(
        population,
        commercial_jobs,
        industrial_jobs,
        jobs,
        landmark_bonus,
        budget.effective_tax_rate,
    );

    let pop = population as f32;
    let employment = if population == 0 {
        1.0
    } else {
        (jobs as f32 / (pop * 0.6)).min(1.0)
    };

    let safety = (police_avg * SAFETY_POLICE_W + fire_avg * SAFETY_FIRE_W).clamp(0.0, 100.0);
    let health = (health_avg * HEALTH_COVERAGE_W + (100.0 - pollution_avg) * HEALTH_POLLUTION_W)
        .clamp(0.0, 100.0);
    let education = education_avg.clamp(0.0, 100.0);
    let environment = ((100.0 - pollution_avg) * ENV_POLLUTION_W
        + green_ratio * 100.0 * ENV_GREEN_W
        + water_ratio * 100.0 * ENV_WATER_W)
        .clamp(0.0, 100.0);
    let happiness = (safety * 0.2
        + health * 0.25
        + education * 0.15
        + environment * 0.2
        + employment * 100.0 * 0.2)
        .clamp(0.0, 100.0);

    let tax = budget.tax_rate as f64;
    let income = population as f64 * tax * 0.1 + jobs as f64 * tax * 0.05;
    let expenses = budget.total_expenses();

    CityStats {
        population,
        jobs,
        money: 0.0,
        income,
        expenses,
        happiness,
        health,
        education,
        safety,
        environment,
        demand,
    }
}

fn derive_demand(
    population: u32,
    commercial_jobs: f32,
    industrial_jobs: f32,
    total_jobs: u32,
    landmark_bonus: f32,
    effective_tax: f32,
) -> RciDemand {
    let pop = population as f32;
    let jobs = total_jobs as f32;

    let residential_raw = (jobs * RES_JOB_PULL - pop) / (pop + jobs + 1.0) * 100.0;
    let commercial_raw =
        (pop * COM_POP_PULL - commercial_jobs) / (pop * COM_POP_PULL + commercial_jobs + 1.0)
            * 100.0;
    let industrial_raw =
        (pop * IND_POP_PULL - industrial_jobs) / (pop * IND_POP_PULL + industrial_jobs + 1.0)
            * 100.0;

    let tax_multiplier = (1.0 - (effective_tax - 9.0) / 91.0).max(0.0);
    let tax_modifier = (9.0 - effective_tax) * 2.0;
    let shape = |raw: f32| {
        ((raw + landmark_bonus) * tax_multiplier + tax_modifier).clamp(-100.0, 100.0)
    };

    RciDemand {
        residential: shape(residential_raw),
        commercial: shape(commercial_raw),
        industrial: shape(industrial_raw),
    }
}
