//! Drains the [`ActionQueue`] each fixed-update tick and applies every
//! queued [`GameAction`] through the pure transforms in [`super::apply`],
//! recording outcomes in the [`ActionResultLog`].

use bevy::prelude::*;

use crate::state::GameState;
use crate::SimulationSet;

use super::actions::{ActionResult, GameAction};
use super::apply;
use super::queue::{ActionQueue, ActionResultLog};

pub fn execute_queued_actions(
    mut queue: ResMut<ActionQueue>,
    mut log: ResMut<ActionResultLog>,
    state: Option<ResMut<GameState>>,
) {
    let Some(mut state) = state else {
        return;
    };
    for action in queue.drain() {
        let result = execute_single(&action, &mut state);
        log.push(action, result);
    }
}

fn execute_single(action: &GameAction, state: &mut GameState) -> ActionResult {
    // Pure transforms hand back a fresh state; errors leave it untouched.
    let outcome = match action {
        GameAction::PlaceBuilding { x, y, kind, zone } => {
            apply::place_building(state, *x, *y, *kind, *zone)
        }
        GameAction::BulldozeTile { x, y } => apply::bulldoze_tile(state, *x, *y),
        GameAction::UpgradeServiceBuilding { x, y } => {
            apply::upgrade_service_building(state, *x, *y)
        }
        GameAction::PlaceSubway { x, y } => apply::place_subway(state, *x, *y),
        GameAction::RemoveSubway { x, y } => apply::remove_subway(state, *x, *y),
        GameAction::PlaceWaterTerraform { x, y } => apply::place_water_terraform(state, *x, *y),
        GameAction::PlaceLandTerraform { x, y } => apply::place_land_terraform(state, *x, *y),
        GameAction::ExpandGrid { amount } => apply::expand_grid(state, *amount),
        GameAction::ShrinkGrid { amount } => apply::shrink_grid(state, *amount),
        GameAction::CreateBridgesOnPath { path, track } => {
            Ok(apply::create_bridges_on_path(state, path, *track))
        }
        GameAction::SetTaxRate { rate } => {
            state.budget.tax_rate = rate.clamp(0.0, 100.0);
            return ActionResult::Success;
        }
        GameAction::SetFunding { category, funding } => {
            state.budget.category_mut(*category).funding = funding.clamp(0.0, 150.0);
            return ActionResult::Success;
        }
        GameAction::SetDisastersEnabled { enabled } => {
            state.settings.disasters_enabled = *enabled;
            return ActionResult::Success;
        }
        GameAction::SetPaused { paused } => {
            state.clock.paused = *paused;
            return ActionResult::Success;
        }
        GameAction::SetSpeed { speed } => {
            state.clock.speed = speed.clamp(0.25, 16.0);
            return ActionResult::Success;
        }
    };
    match outcome {
        Ok(next) => {
            *state = next;
            ActionResult::Success
        }
        Err(error) => ActionResult::Error(error),
    }
}

pub struct GameActionsPlugin;

impl Plugin for GameActionsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActionQueue>()
            .init_resource::<ActionResultLog>()
            .add_systems(
                FixedUpdate,
                execute_queued_actions.in_set(SimulationSet::Actions),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::BuildingKind;
    use crate::game_actions::actions::ActionError;
    use crate::grid::ZoneKind;
    use crate::world_init::create_initial_game_state;

    fn flat_state() -> GameState {
        let mut state = create_initial_game_state(32, "Testville");
        // Level the map for deterministic placement tests.
        for y in 0..32 {
            for x in 0..32 {
                let tile = state.grid.tile_mut(x, y);
                tile.building = crate::buildings::Building::default();
                tile.zone = ZoneKind::None;
            }
        }
        state.stats.money = 100_000.0;
        state
    }

    #[test]
    fn test_zoning_and_placement() {
        let mut state = flat_state();
        let result = execute_single(
            &GameAction::PlaceBuilding {
                x: 4,
                y: 4,
                kind: None,
                zone: Some(ZoneKind::Residential),
            },
            &mut state,
        );
        assert!(result.is_success());
        assert_eq!(state.grid.get(4, 4).zone, ZoneKind::Residential);

        let result = execute_single(
            &GameAction::PlaceBuilding {
                x: 6,
                y: 4,
                kind: Some(BuildingKind::FireStation),
                zone: None,
            },
            &mut state,
        );
        assert!(result.is_success());
        assert_eq!(state.grid.get(6, 4).kind(), BuildingKind::FireStation);
    }

    #[test]
    fn test_insufficient_funds_is_a_no_op() {
        let mut state = flat_state();
        state.stats.money = 1.0;
        let before = state.clone();
        let result = execute_single(
            &GameAction::PlaceBuilding {
                x: 4,
                y: 4,
                kind: Some(BuildingKind::Airport),
                zone: None,
            },
            &mut state,
        );
        assert_eq!(
            result,
            ActionResult::Error(ActionError::InsufficientFunds)
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_rail_on_road_becomes_overlay() {
        let mut state = flat_state();
        let ok = execute_single(
            &GameAction::PlaceBuilding {
                x: 3,
                y: 3,
                kind: Some(BuildingKind::Road),
                zone: None,
            },
            &mut state,
        );
        assert!(ok.is_success());
        let ok = execute_single(
            &GameAction::PlaceBuilding {
                x: 3,
                y: 3,
                kind: Some(BuildingKind::Rail),
                zone: None,
            },
            &mut state,
        );
        assert!(ok.is_success());
        let tile = state.grid.get(3, 3);
        assert_eq!(tile.kind(), BuildingKind::Road);
        assert!(tile.has_rail_overlay);
    }

    #[test]
    fn test_bulldoze_footprint_clears_fillers() {
        let mut state = flat_state();
        let ok = execute_single(
            &GameAction::PlaceBuilding {
                x: 8,
                y: 8,
                kind: Some(BuildingKind::Hospital),
                zone: None,
            },
            &mut state,
        );
        assert!(ok.is_success());
        assert_eq!(state.grid.get(9, 9).kind(), BuildingKind::Filler);

        // Bulldozing through a filler tile clears the whole footprint.
        let ok = execute_single(&GameAction::BulldozeTile { x: 9, y: 9 }, &mut state);
        assert!(ok.is_success());
        for (tx, ty) in [(8, 8), (9, 8), (8, 9), (9, 9)] {
            assert_eq!(state.grid.get(tx, ty).kind(), BuildingKind::Grass);
        }
    }

    #[test]
    fn test_shrink_below_minimum_is_sentinel_error() {
        let mut state = flat_state();
        let result = execute_single(&GameAction::ShrinkGrid { amount: 16 }, &mut state);
        assert_eq!(result, ActionResult::Error(ActionError::GridTooSmall));
        assert_eq!(state.grid.size(), 32);
    }

    #[test]
    fn test_expand_then_shrink_restores_contents() {
        let mut state = flat_state();
        let ok = execute_single(
            &GameAction::PlaceBuilding {
                x: 10,
                y: 10,
                kind: Some(BuildingKind::Road),
                zone: None,
            },
            &mut state,
        );
        assert!(ok.is_success());
        let before = state.grid.clone();

        assert!(execute_single(&GameAction::ExpandGrid { amount: 8 }, &mut state).is_success());
        assert_eq!(state.grid.size(), 40);
        assert!(execute_single(&GameAction::ShrinkGrid { amount: 8 }, &mut state).is_success());
        assert_eq!(state.grid, before);
    }

    #[test]
    fn test_subway_overlay_roundtrip() {
        let mut state = flat_state();
        assert!(execute_single(&GameAction::PlaceSubway { x: 2, y: 2 }, &mut state).is_success());
        assert!(state.grid.get(2, 2).has_subway);
        assert_eq!(
            execute_single(&GameAction::PlaceSubway { x: 2, y: 2 }, &mut state),
            ActionResult::Error(ActionError::Occupied)
        );
        assert!(execute_single(&GameAction::RemoveSubway { x: 2, y: 2 }, &mut state).is_success());
        assert!(!state.grid.get(2, 2).has_subway);
    }

    #[test]
    fn test_terraform_roundtrip() {
        let mut state = flat_state();
        assert!(
            execute_single(&GameAction::PlaceWaterTerraform { x: 5, y: 5 }, &mut state)
                .is_success()
        );
        assert!(state.grid.get(5, 5).is_water());
        assert!(
            execute_single(&GameAction::PlaceLandTerraform { x: 5, y: 5 }, &mut state)
                .is_success()
        );
        assert!(state.grid.get(5, 5).is_vacant_grass());
    }

    #[test]
    fn test_development_blockers_reported() {
        let mut state = flat_state();
        state.grid.tile_mut(4, 4).zone = ZoneKind::Residential;
        let blockers = apply::get_development_blockers(&state, 4, 4);
        assert!(blockers.contains(&crate::game_actions::DevelopmentBlocker::NoRoadAccess));
        assert!(blockers.contains(&crate::game_actions::DevelopmentBlocker::NoPower));
        assert!(blockers.contains(&crate::game_actions::DevelopmentBlocker::NoWater));
    }

    #[test]
    fn test_water_adjacency_footprint_cases() {
        let mut state = flat_state();
        // Water exactly below a 2x2 footprint at (10, 10): forward-facing.
        state.grid.tile_mut(10, 12).building =
            crate::buildings::Building::structural(BuildingKind::Water);
        let adjacency = apply::get_water_adjacency(&state.grid, 10, 10, 2, 2);
        assert!(adjacency.has_water);
        assert!(!adjacency.should_flip);

        // Water only on the west side: flipped.
        let mut state = flat_state();
        state.grid.tile_mut(9, 10).building =
            crate::buildings::Building::structural(BuildingKind::Water);
        let adjacency = apply::get_water_adjacency(&state.grid, 10, 10, 2, 2);
        assert!(adjacency.has_water);
        assert!(adjacency.should_flip);

        let dry = apply::get_water_adjacency(&state.grid, 20, 20, 2, 2);
        assert!(!dry.has_water);
    }
}
