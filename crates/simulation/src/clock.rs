use serde::{Deserialize, Serialize};

use crate::config::{DAYS_PER_MONTH, MONTHS_PER_YEAR, TICKS_PER_DAY};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameClock {
    /// Tick within the current day, 0..TICKS_PER_DAY.
    pub tick: u32,
    /// 1..=DAYS_PER_MONTH.
    pub day: u32,
    /// 1..=MONTHS_PER_YEAR.
    pub month: u32,
    pub year: u32,
    pub paused: bool,
    pub speed: f32,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            tick: 0,
            day: 1,
            month: 1,
            year: 1,
            paused: false,
            speed: 1.0,
        }
    }
}

/// Rollovers produced by a single advance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockAdvance {
    pub new_day: bool,
    pub new_month: bool,
}

impl GameClock {
    pub fn advance(&mut self) -> ClockAdvance {
        let mut events = ClockAdvance::default();
        self.tick += 1;
        if self.tick >= TICKS_PER_DAY {
            self.tick = 0;
            self.day += 1;
            events.new_day = true;
            if self.day > DAYS_PER_MONTH {
                self.day = 1;
                self.month += 1;
                events.new_month = true;
                if self.month > MONTHS_PER_YEAR {
                    self.month = 1;
                    self.year += 1;
                }
            }
        }
        events
    }

    /// Months elapsed since the start of year 1.
    pub fn total_months(&self) -> u32 {
        (self.year - 1) * MONTHS_PER_YEAR + (self.month - 1)
    }

    pub fn formatted(&self) -> String {
        format!("Y{} M{:02} D{:02}", self.year, self.month, self.day)
    }
}
