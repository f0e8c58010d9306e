use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{DEFAULT_WORLD_SIZE, MAX_WORLD_SIZE, MIN_WORLD_SIZE};
use crate::state::GameState;
use crate::stats::CityStats;
use crate::terrain::generate_world;

/// Treasury a new city starts with.
const STARTING_MONEY: f64 = 20_000.0;

pub fn create_initial_game_state(size: usize, name: &str) -> GameState {
    create_initial_game_state_with_rng(size, name, &mut rand::thread_rng())
}

pub fn create_initial_game_state_with_rng(
    size: usize,
    name: &str,
    rng: &mut impl Rng,
) -> GameState {
    let size = size.clamp(MIN_WORLD_SIZE, MAX_WORLD_SIZE);
    let (grid, water_bodies) = generate_world(size, rng);
    GameState {
        name: name.to_string(),
        grid,
        clock: Default::default(),
        budget: Default::default(),
        stats: CityStats {
            money: STARTING_MONEY,
            ..Default::default()
        },
        water_bodies,
        notifications: Vec::new(),
        advisors: Vec::new(),
        history: Vec::new(),
        settings: Default::default(),
    }
}

/// Reproducible bootstrap: the same seed always yields the same world.
pub fn create_initial_game_state_from_seed(size: usize, name: &str, seed: u64) -> GameState {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    create_initial_game_state_with_rng(size, name, &mut rng)
}

/// Insert this resource before [`SimulationPlugin`] to stop `init_world`
/// from generating a world (tests insert their own state).
#[derive(Resource)]
pub struct SkipWorldInit;

pub fn init_world(mut commands: Commands, skip: Option<Res<SkipWorldInit>>) {
    if skip.is_some() {
        return;
    }
    info!("generating a fresh {DEFAULT_WORLD_SIZE}x{DEFAULT_WORLD_SIZE} world");
    commands.insert_resource(create_initial_game_state(DEFAULT_WORLD_SIZE, "New Town"));
}
