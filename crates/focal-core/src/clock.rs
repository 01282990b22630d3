use chrono::{DateTime, Utc};

/// Timestamp source for the engine.
///
/// Every time-dependent operation takes its `now` from a `Clock` owned by the
/// caller, so engine logic can be driven by a manual clock in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock backed by `chrono::Utc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
