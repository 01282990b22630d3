pub mod analytics;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod controller;
pub mod daemon;
pub mod error;
pub mod events;
pub mod ipc;
pub mod monitor;
pub mod phase;
pub mod session;

pub use controller::{SessionController, SessionMode, StatusSnapshot, TickInput, TickOutcome};
pub use daemon::Daemon;
pub use error::EngineError;
pub use events::EngineEvent;
