//! Error types
//!
//! These cover precondition violations that are caught at the offending call.
//! Listener failures are not errors of the bus itself; see [`crate::event::HandlerResult`].

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SchedulerError {
    #[error("tick has no action set")]
    MissingAction,
    #[error("tick delay must be finite and non-negative, got {0}")]
    InvalidDelay(f32),
}

#[derive(Debug, Error, PartialEq)]
pub enum LootError {
    #[error("lootable item {item_id} has invalid weight {weight}")]
    NegativeWeight { item_id: u32, weight: f64 },
    #[error("lootable item {item_id} amount range {min}..={max} is empty")]
    InvalidAmountRange { item_id: u32, min: u32, max: u32 },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error("listener {0} is already handling an event")]
    ListenerBusy(&'static str),
}
