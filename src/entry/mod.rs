pub mod commands;
pub mod config;
pub mod controller;
pub mod state;

pub use config::EntryConfig;
pub use controller::{EntryController, EntrySnapshot, KeyOutcome};
pub use state::{EntryPhase, EntryState};
