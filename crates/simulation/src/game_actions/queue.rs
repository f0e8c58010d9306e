use bevy::prelude::*;

use super::actions::{ActionResult, GameAction};

/// Pending actions, drained in order once per fixed-update tick.
#[derive(Resource, Default)]
pub struct ActionQueue {
    pending: Vec<GameAction>,
}

impl ActionQueue {
    pub fn push(&mut self, action: GameAction) {
        self.pending.push(action);
    }

    pub fn drain(&mut self) -> Vec<GameAction> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Executed actions are retained for UI feedback, newest last.
const RESULT_LOG_CAP: usize = 64;

#[derive(Resource, Default)]
pub struct ActionResultLog {
    entries: Vec<(GameAction, ActionResult)>,
}

impl ActionResultLog {
    pub fn push(&mut self, action: GameAction, result: ActionResult) {
        self.entries.push((action, result));
        if self.entries.len() > RESULT_LOG_CAP {
            let overflow = self.entries.len() - RESULT_LOG_CAP;
            self.entries.drain(..overflow);
        }
    }

    pub fn entries(&self) -> &[(GameAction, ActionResult)] {
        &self.entries
    }

    pub fn last(&self) -> Option<&(GameAction, ActionResult)> {
        self.entries.last()
    }
}
