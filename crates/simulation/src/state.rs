use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::advisors::AdvisorMessage;
use crate::budget::Budget;
use crate::clock::GameClock;
use crate::grid::TileGrid;
use crate::notifications::{push_notification, Notification};
use crate::stats::{CityStats, HistorySample};
use crate::terrain::WaterBody;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    pub disasters_enabled: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            disasters_enabled: true,
        }
    }
}

/// The whole world state. Cloning is cheap: grid rows are shared until
/// written, so `simulate_tick` and the action transforms can hand back a new
/// state without copying untouched rows.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub name: String,
    pub grid: TileGrid,
    pub clock: GameClock,
    pub budget: Budget,
    pub stats: CityStats,
    pub water_bodies: Vec<WaterBody>,
    pub notifications: Vec<Notification>,
    pub advisors: Vec<AdvisorMessage>,
    pub history: Vec<HistorySample>,
    pub settings: GameSettings,
}

impl GameState {
    pub fn notify(&mut self, notification: Notification) {
        push_notification(&mut self.notifications, notification);
    }
}
