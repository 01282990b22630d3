use serde::{Deserialize, Serialize};

use crate::classifier::DistractionSource;
use crate::phase::Phase;

/// Events the engine pushes to the presentation layer.
///
/// Delivered on a broadcast channel; the engine never blocks on (or waits
/// for) observers, and a transition is a fact whether or not anything was
/// listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    PhaseChanged { from: Phase, to: Phase },
    /// Pulse fired on a distracted tick during a Work phase.
    DistractionWarning { source: DistractionSource },
}
