use bevy::prelude::*;

pub mod advisors;
pub mod bridges;
pub mod budget;
pub mod buildings;
pub mod clock;
pub mod config;
pub mod coverage;
pub mod fire;
pub mod game_actions;
pub mod grid;
pub mod lifecycle;
pub mod notifications;
pub mod pollution;
pub mod road_access;
pub mod state;
pub mod stats;
pub mod terrain;
pub mod test_harness;
pub mod tick;
pub mod world_init;

pub use state::GameState;
pub use tick::simulate_tick;

/// Fixed-update ordering: queued player actions apply before the tick runs,
/// so a tick always sees a settled grid.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Actions,
    Simulation,
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (SimulationSet::Actions, SimulationSet::Simulation).chain(),
        )
        .add_systems(Startup, world_init::init_world)
        .add_plugins(game_actions::GameActionsPlugin)
        .add_systems(
            FixedUpdate,
            advance_simulation.in_set(SimulationSet::Simulation),
        );
    }
}

/// Swap the world state for the next tick's. Pausing stops the clock without
/// tearing the app down.
pub fn advance_simulation(state: Option<ResMut<GameState>>) {
    let Some(mut state) = state else {
        return;
    };
    if state.clock.paused {
        return;
    }
    let next = tick::simulate_tick(&state);
    *state = next;
}
