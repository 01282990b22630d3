use thiserror::Error;

/// Recoverable engine errors.
///
/// Nothing in the engine is fatal to the process; both variants are surfaced
/// to the caller and leave session state untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// `start` was requested while a session is active.
    #[error("a session is already running")]
    AlreadyRunning,

    /// Analytics were requested before any sample was recorded.
    #[error("no samples recorded yet")]
    NoData,
}
