/// Side length of a freshly created world when the caller does not choose one.
pub const DEFAULT_WORLD_SIZE: usize = 96;

/// Smallest side length `shrink_grid` may leave behind.
pub const MIN_WORLD_SIZE: usize = 24;

/// Largest supported side length.
pub const MAX_WORLD_SIZE: usize = 256;

/// Largest building footprint edge in tiles.
pub const MAX_FOOTPRINT: usize = 4;

pub const TICKS_PER_DAY: u32 = 30;
pub const DAYS_PER_MONTH: u32 = 30;
pub const MONTHS_PER_YEAR: u32 = 12;

/// Net income is credited every this many simulated days.
pub const INCOME_INTERVAL_DAYS: u32 = 7;

/// A history sample is appended every this many simulated months.
pub const HISTORY_INTERVAL_MONTHS: u32 = 3;

/// BFS hop budget for road reachability checks.
pub const ROAD_ACCESS_RANGE: usize = 8;

/// Per-tick easing rate of the effective tax rate toward the player-set rate.
pub const TAX_EASE_RATE: f32 = 0.03;

/// Exponential smoothing factor applied to zone demand between ticks.
pub const DEMAND_SMOOTHING: f32 = 0.12;

/// Base per-tick probability that a vacant zoned tile spawns a building,
/// before demand scaling.
pub const SPAWN_BASE_CHANCE: f32 = 0.05;
