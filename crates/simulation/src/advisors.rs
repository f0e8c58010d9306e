use serde::{Deserialize, Serialize};

use crate::grid::TileGrid;
use crate::stats::CityStats;

/// Unserved-building counts above this threshold escalate to High priority.
const ESCALATION_COUNT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvisorDomain {
    Infrastructure,
    Finance,
    Safety,
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AdvisorPriority {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorMessage {
    pub domain: AdvisorDomain,
    pub priority: AdvisorPriority,
    pub text: String,
}

/// Rule-based advisor messages, regenerated from scratch every tick.
pub fn generate_advisor_messages(grid: &TileGrid, stats: &CityStats) -> Vec<AdvisorMessage> {
    let mut messages = Vec::new();

    let mut unpowered: u32 = 0;
    let mut unwatered: u32 = 0;
    let mut burning: u32 = 0;
    for y in 0..grid.size() {
        for x in 0..grid.size() {
            let building = &grid.get(x, y).building;
            if building.on_fire {
                burning += 1;
            }
            if !building.kind.is_developable() || !building.is_complete() || building.abandoned {
                continue;
            }
            if !building.powered {
                unpowered += 1;
            }
            if !building.watered {
                unwatered += 1;
            }
        }
    }

    let count_priority = |count: u32| {
        if count > ESCALATION_COUNT {
            AdvisorPriority::High
        } else {
            AdvisorPriority::Medium
        }
    };

    if unpowered > 0 {
        messages.push(AdvisorMessage {
            domain: AdvisorDomain::Infrastructure,
            priority: count_priority(unpowered),
            text: format!("{unpowered} buildings have no power"),
        });
    }
    if unwatered > 0 {
        messages.push(AdvisorMessage {
            domain: AdvisorDomain::Infrastructure,
            priority: count_priority(unwatered),
            text: format!("{unwatered} buildings have no water"),
        });
    }
    if burning > 0 {
        messages.push(AdvisorMessage {
            domain: AdvisorDomain::Safety,
            priority: AdvisorPriority::High,
            text: format!("{burning} buildings are on fire"),
        });
    }
    if stats.money < 0.0 {
        messages.push(AdvisorMessage {
            domain: AdvisorDomain::Finance,
            priority: AdvisorPriority::High,
            text: "The treasury is empty".to_string(),
        });
    }
    if stats.environment < 35.0 {
        messages.push(AdvisorMessage {
            domain: AdvisorDomain::Environment,
            priority: AdvisorPriority::Medium,
            text: "Pollution is dragging the environment down".to_string(),
        });
    }

    messages
}
