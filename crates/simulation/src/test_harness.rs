//! Headless integration harness: a fluent builder wrapping `bevy::app::App`
//! + [`SimulationPlugin`] for driving the simulation without a window or
//! renderer. Also used by the benchmarks.

use bevy::app::App;
use bevy::prelude::*;

use crate::buildings::{Building, BuildingKind};
use crate::game_actions::{ActionQueue, ActionResultLog, GameAction};
use crate::grid::{TileGrid, ZoneKind};
use crate::state::GameState;
use crate::world_init::{create_initial_game_state, SkipWorldInit};
use crate::SimulationPlugin;

pub struct TestTown {
    app: App,
}

impl Default for TestTown {
    fn default() -> Self {
        Self::flat(48)
    }
}

impl TestTown {
    /// A town on a procedurally generated map.
    pub fn generated(size: usize) -> Self {
        Self::with_state(create_initial_game_state(size, "Test Town"))
    }

    /// A town on an all-grass map with a padded treasury, for deterministic
    /// placement tests.
    pub fn flat(size: usize) -> Self {
        let mut state = create_initial_game_state(size, "Test Town");
        state.grid = TileGrid::new(size);
        state.water_bodies.clear();
        state.stats.money = 100_000.0;
        Self::with_state(state)
    }

    fn with_state(state: GameState) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        // Inserted before SimulationPlugin so init_world skips generation.
        app.insert_resource(SkipWorldInit);
        app.add_plugins(SimulationPlugin);
        app.insert_resource(state);
        // One update so Startup systems run.
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Setup helpers
    // -----------------------------------------------------------------------

    pub fn queue(&mut self, action: GameAction) -> &mut Self {
        self.app
            .world_mut()
            .resource_mut::<ActionQueue>()
            .push(action);
        self
    }

    /// Write a road line directly into the grid (no cost, no queue).
    pub fn with_road_line(
        &mut self,
        from: (usize, usize),
        to: (usize, usize),
    ) -> &mut Self {
        let mut state = self.app.world_mut().resource_mut::<GameState>();
        for y in from.1.min(to.1)..=from.1.max(to.1) {
            for x in from.0.min(to.0)..=from.0.max(to.0) {
                let tile = state.grid.tile_mut(x, y);
                tile.building = Building::structural(BuildingKind::Road);
                tile.zone = ZoneKind::None;
            }
        }
        self
    }

    pub fn with_zone_rect(
        &mut self,
        min: (usize, usize),
        max: (usize, usize),
        zone: ZoneKind,
    ) -> &mut Self {
        let mut state = self.app.world_mut().resource_mut::<GameState>();
        for y in min.1..=max.1 {
            for x in min.0..=max.0 {
                state.grid.tile_mut(x, y).zone = zone;
            }
        }
        self
    }

    /// Drop a completed building straight onto the grid.
    pub fn with_completed(&mut self, kind: BuildingKind, x: usize, y: usize) -> &mut Self {
        let mut state = self.app.world_mut().resource_mut::<GameState>();
        state.grid.tile_mut(x, y).building = Building {
            level: 1,
            ..Building::structural(kind)
        };
        self
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Advance `n` fixed-update ticks.
    pub fn tick(&mut self, n: u32) {
        // Drive real time by exactly one fixed timestep per frame so that the
        // `FixedUpdate` schedule runs exactly once per `update()`. Under
        // `MinimalPlugins` the default automatic strategy would recompute time
        // from the wall clock and discard any manual virtual-time advance.
        let step = self.app.world().resource::<Time<Fixed>>().timestep();
        self.app
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(step));
        for _ in 0..n {
            self.app.update();
        }
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    pub fn state(&self) -> &GameState {
        self.app.world().resource::<GameState>()
    }

    pub fn results(&self) -> &ActionResultLog {
        self.app.world().resource::<ActionResultLog>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_ticks_the_clock() {
        let mut town = TestTown::flat(32);
        assert_eq!(town.state().clock.tick, 0);
        town.tick(3);
        assert_eq!(town.state().clock.tick, 3);
    }

    #[test]
    fn test_queued_action_applies_before_tick() {
        let mut town = TestTown::flat(32);
        town.queue(GameAction::PlaceBuilding {
            x: 5,
            y: 5,
            kind: Some(BuildingKind::Road),
            zone: None,
        });
        town.tick(1);
        assert_eq!(town.state().grid.get(5, 5).kind(), BuildingKind::Road);
        assert!(town.results().last().unwrap().1.is_success());
    }
}
