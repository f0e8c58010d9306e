use serde::{Deserialize, Serialize};

use crate::buildings::BuildingKind;
use crate::config::TAX_EASE_RATE;
use crate::grid::TileGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BudgetCategory {
    Police,
    Fire,
    Health,
    Education,
    Transportation,
    Parks,
    Power,
    Water,
}

pub const ALL_CATEGORIES: [BudgetCategory; 8] = [
    BudgetCategory::Police,
    BudgetCategory::Fire,
    BudgetCategory::Health,
    BudgetCategory::Education,
    BudgetCategory::Transportation,
    BudgetCategory::Parks,
    BudgetCategory::Power,
    BudgetCategory::Water,
];

/// One funded budget line: the funding percentage is player-set, the cost is
/// recomputed from live building counts every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryFunds {
    pub funding: f32,
    pub cost: f64,
}

impl Default for CategoryFunds {
    fn default() -> Self {
        Self {
            funding: 100.0,
            cost: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub police: CategoryFunds,
    pub fire: CategoryFunds,
    pub health: CategoryFunds,
    pub education: CategoryFunds,
    pub transportation: CategoryFunds,
    pub parks: CategoryFunds,
    pub power: CategoryFunds,
    pub water: CategoryFunds,
    /// Player-set tax rate in percent.
    pub tax_rate: f32,
    /// Trails `tax_rate`; tax changes bite gradually.
    pub effective_tax_rate: f32,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            police: CategoryFunds::default(),
            fire: CategoryFunds::default(),
            health: CategoryFunds::default(),
            education: CategoryFunds::default(),
            transportation: CategoryFunds::default(),
            parks: CategoryFunds::default(),
            power: CategoryFunds::default(),
            water: CategoryFunds::default(),
            tax_rate: 9.0,
            effective_tax_rate: 9.0,
        }
    }
}

impl Budget {
    pub fn category(&self, category: BudgetCategory) -> &CategoryFunds {
        match category {
            BudgetCategory::Police => &self.police,
            BudgetCategory::Fire => &self.fire,
            BudgetCategory::Health => &self.health,
            BudgetCategory::Education => &self.education,
            BudgetCategory::Transportation => &self.transportation,
            BudgetCategory::Parks => &self.parks,
            BudgetCategory::Power => &self.power,
            BudgetCategory::Water => &self.water,
        }
    }

    pub fn category_mut(&mut self, category: BudgetCategory) -> &mut CategoryFunds {
        match category {
            BudgetCategory::Police => &mut self.police,
            BudgetCategory::Fire => &mut self.fire,
            BudgetCategory::Health => &mut self.health,
            BudgetCategory::Education => &mut self.education,
            BudgetCategory::Transportation => &mut self.transportation,
            BudgetCategory::Parks => &mut self.parks,
            BudgetCategory::Power => &mut self.power,
            BudgetCategory::Water => &mut self.water,
        }
    }

    /// Total expenses across categories, floored per category.
    pub fn total_expenses(&self) -> f64 {
        ALL_CATEGORIES
            .iter()
            .map(|&c| {
                let funds = self.category(c);
                (funds.cost * funds.funding as f64 / 100.0).floor()
            })
            .sum()
    }

    /// One easing step of the effective tax rate toward the player-set rate.
    pub fn ease_tax_rate(&mut self) {
        let delta = self.tax_rate - self.effective_tax_rate;
        self.effective_tax_rate += delta.clamp(-TAX_EASE_RATE, TAX_EASE_RATE);
    }
}

/// Per-unit running cost feeding a budget category, keyed by building kind.
fn unit_cost(kind: BuildingKind) -> Option<(BudgetCategory, f64)> {
    let entry = match kind {
        BuildingKind::PoliceStation => (BudgetCategory::Police, 50.0),
        BuildingKind::PoliceHq => (BudgetCategory::Police, 120.0),
        BuildingKind::FireStation => (BudgetCategory::Fire, 50.0),
        BuildingKind::FireHq => (BudgetCategory::Fire, 120.0),
        BuildingKind::Clinic => (BudgetCategory::Health, 30.0),
        BuildingKind::Hospital => (BudgetCategory::Health, 100.0),
        BuildingKind::School => (BudgetCategory::Education, 40.0),
        BuildingKind::HighSchool => (BudgetCategory::Education, 70.0),
        BuildingKind::University => (BudgetCategory::Education, 150.0),
        BuildingKind::Library => (BudgetCategory::Education, 15.0),
        BuildingKind::Museum => (BudgetCategory::Education, 25.0),
        BuildingKind::CoalPlant => (BudgetCategory::Power, 80.0),
        BuildingKind::GasPlant => (BudgetCategory::Power, 70.0),
        BuildingKind::SolarFarm => (BudgetCategory::Power, 30.0),
        BuildingKind::WindTurbine => (BudgetCategory::Power, 15.0),
        BuildingKind::NuclearPlant => (BudgetCategory::Power, 250.0),
        BuildingKind::WaterTower => (BudgetCategory::Water, 25.0),
        BuildingKind::PumpingStation => (BudgetCategory::Water, 60.0),
        BuildingKind::SmallPark => (BudgetCategory::Parks, 5.0),
        BuildingKind::LargePark => (BudgetCategory::Parks, 12.0),
        BuildingKind::Playground => (BudgetCategory::Parks, 6.0),
        BuildingKind::Stadium => (BudgetCategory::Parks, 35.0),
        BuildingKind::AmusementPark => (BudgetCategory::Parks, 40.0),
        BuildingKind::TrainStation => (BudgetCategory::Transportation, 60.0),
        BuildingKind::SubwayStation => (BudgetCategory::Transportation, 80.0),
        BuildingKind::Airport => (BudgetCategory::Transportation, 300.0),
        BuildingKind::Road => (BudgetCategory::Transportation, 0.2),
        BuildingKind::Rail => (BudgetCategory::Transportation, 0.5),
        BuildingKind::Bridge => (BudgetCategory::Transportation, 1.0),
        _ => return None,
    };
    Some(entry)
}

/// Recompute every category's cost from the live grid.
pub fn update_budget_costs(grid: &TileGrid, budget: &mut Budget) {
    for category in ALL_CATEGORIES {
        budget.category_mut(category).cost = 0.0;
    }
    for y in 0..grid.size() {
        for x in 0..grid.size() {
            let tile = grid.get(x, y);
            if let Some((category, cost)) = unit_cost(tile.building.kind) {
                budget.category_mut(category).cost += cost;
            }
            if tile.has_subway {
                budget.category_mut(BudgetCategory::Transportation).cost += 0.4;
            }
            if tile.has_rail_overlay {
                budget.category_mut(BudgetCategory::Transportation).cost += 0.5;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::Building;

    #[test]
    fn test_costs_follow_building_counts() {
        let mut grid = TileGrid::new(16);
        grid.tile_mut(2, 2).building = Building {
            level: 1,
            ..Building::structural(BuildingKind::PoliceStation)
        };
        grid.tile_mut(4, 4).building = Building {
            level: 1,
            ..Building::structural(BuildingKind::PoliceStation)
        };
        let mut budget = Budget::default();
        update_budget_costs(&grid, &mut budget);
        assert_eq!(budget.police.cost, 100.0);
        assert_eq!(budget.fire.cost, 0.0);
    }

    #[test]
    fn test_funding_scales_expenses() {
        let mut budget = Budget::default();
        budget.police.cost = 100.0;
        assert_eq!(budget.total_expenses(), 100.0);
        budget.police.funding = 50.0;
        assert_eq!(budget.total_expenses(), 50.0);
        // Floored per category.
        budget.police.funding = 33.0;
        assert_eq!(budget.total_expenses(), 33.0);
    }

    #[test]
    fn test_tax_easing_converges() {
        let mut budget = Budget::default();
        budget.tax_rate = 12.0;
        for _ in 0..200 {
            budget.ease_tax_rate();
        }
        assert!((budget.effective_tax_rate - 12.0).abs() < 1e-3);
    }
}
