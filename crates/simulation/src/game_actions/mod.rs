pub mod actions;
pub mod apply;
pub mod executor;
pub mod queue;

pub use actions::*;
pub use apply::*;
pub use executor::{execute_queued_actions, GameActionsPlugin};
pub use queue::{ActionQueue, ActionResultLog};
