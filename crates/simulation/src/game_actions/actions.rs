use serde::{Deserialize, Serialize};

use crate::bridges::TrackKind;
use crate::budget::BudgetCategory;
use crate::buildings::BuildingKind;
use crate::grid::ZoneKind;

/// Everything an external caller may do to the world between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameAction {
    PlaceBuilding {
        x: usize,
        y: usize,
        kind: Option<BuildingKind>,
        zone: Option<ZoneKind>,
    },
    BulldozeTile {
        x: usize,
        y: usize,
    },
    UpgradeServiceBuilding {
        x: usize,
        y: usize,
    },
    PlaceSubway {
        x: usize,
        y: usize,
    },
    RemoveSubway {
        x: usize,
        y: usize,
    },
    PlaceWaterTerraform {
        x: usize,
        y: usize,
    },
    PlaceLandTerraform {
        x: usize,
        y: usize,
    },
    ExpandGrid {
        amount: usize,
    },
    ShrinkGrid {
        amount: usize,
    },
    CreateBridgesOnPath {
        path: Vec<(usize, usize)>,
        track: TrackKind,
    },
    SetTaxRate {
        rate: f32,
    },
    SetFunding {
        category: BudgetCategory,
        funding: f32,
    },
    SetDisastersEnabled {
        enabled: bool,
    },
    SetPaused {
        paused: bool,
    },
    SetSpeed {
        speed: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionError {
    OutOfBounds,
    OnWater,
    Occupied,
    FootprintBlocked,
    InsufficientFunds,
    InvalidTarget,
    GridTooSmall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionResult {
    Success,
    Error(ActionError),
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success)
    }
}

/// Why a vacant zoned tile has not developed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevelopmentBlocker {
    NotZoned,
    TileOccupied,
    NoRoadAccess,
    NoPower,
    NoWater,
    LowDemand,
}
