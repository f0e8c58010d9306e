use serde::{Deserialize, Serialize};

use crate::clock::GameClock;

/// Only this many of the newest notifications are retained.
pub const MAX_NOTIFICATIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NotificationPriority {
    Emergency,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub text: String,
    pub priority: NotificationPriority,
    pub location: Option<(usize, usize)>,
    pub day: u32,
    pub month: u32,
    pub year: u32,
}

impl Notification {
    pub fn new(
        text: impl Into<String>,
        priority: NotificationPriority,
        location: Option<(usize, usize)>,
        clock: &GameClock,
    ) -> Self {
        Self {
            text: text.into(),
            priority,
            location,
            day: clock.day,
            month: clock.month,
            year: clock.year,
        }
    }
}

/// Append and trim to the newest `MAX_NOTIFICATIONS`.
pub fn push_notification(log: &mut Vec<Notification>, notification: Notification) {
    log.push(notification);
    if log.len() > MAX_NOTIFICATIONS {
        let overflow = log.len() - MAX_NOTIFICATIONS;
        log.drain(..overflow);
    }
}
