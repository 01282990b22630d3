use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::analytics::{self, Report};
use crate::classifier::DistractionClassifier;
use crate::config::{EngineConfig, UnproductiveList};
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::phase::{Phase, PhaseChange, PhaseMachine};
use crate::session::{Sample, SessionAccumulator, Totals};

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// How the session interprets elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    /// Track continuously with no phase cycle.
    FreeRun,
    /// Cycle through Work/Break/LongBreak phases.
    Pomodoro,
}

impl SessionMode {
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::FreeRun => "free-run",
            Self::Pomodoro => "pomodoro",
        }
    }
}

/// Latest sampled values handed to one tick. `None` means the sampler had
/// nothing this tick; the engine fails open.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub app_token: Option<String>,
    pub face_present: Option<bool>,
}

/// What one tick did.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub sample: Sample,
    pub phase_change: Option<PhaseChange>,
    /// A distraction warning pulse fired (Work phase only).
    pub warned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStatus {
    pub phase: Phase,
    pub time_left_secs: u64,
    pub completed_work_phases: u32,
}

/// Point-in-time view of the session, shipped over IPC for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub running: bool,
    pub session_id: Option<Uuid>,
    pub mode: Option<SessionMode>,
    pub started_at: Option<DateTime<Utc>>,
    pub totals: Option<Totals>,
    pub phase: Option<PhaseStatus>,
    pub current_app: Option<String>,
}

impl StatusSnapshot {
    const IDLE: Self = Self {
        running: false,
        session_id: None,
        mode: None,
        started_at: None,
        totals: None,
        phase: None,
        current_app: None,
    };
}

struct ActiveSession {
    id: Uuid,
    mode: SessionMode,
    started_at: DateTime<Utc>,
    classifier: DistractionClassifier,
    phases: Option<PhaseMachine>,
    accumulator: SessionAccumulator,
}

/// Owns the session lifecycle and all session-wide mutable state.
///
/// Single-writer by contract: callers serialize `start`/`tick`/`stop` (the
/// daemon holds the controller behind one lock), so a stop racing an
/// in-flight tick either lands before it (the tick becomes a no-op) or after
/// it (the tick completes) - partial totals are never observable.
pub struct SessionController {
    config: EngineConfig,
    unproductive: Arc<RwLock<UnproductiveList>>,
    events: broadcast::Sender<EngineEvent>,
    session: Option<ActiveSession>,
}

impl SessionController {
    #[must_use]
    pub fn new(config: EngineConfig, unproductive: Arc<RwLock<UnproductiveList>>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            unproductive,
            events,
            session: None,
        }
    }

    /// Subscribe to engine events. The engine never waits on subscribers.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Begin a new session, resetting every accumulator.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyRunning`] (leaving the active session
    /// untouched) when a session is already in progress.
    pub fn start(&mut self, mode: SessionMode, now: DateTime<Utc>) -> Result<Uuid, EngineError> {
        if self.session.is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        let id = Uuid::new_v4();
        let phases = match mode {
            SessionMode::Pomodoro => Some(PhaseMachine::new(&self.config, now)),
            SessionMode::FreeRun => None,
        };
        self.session = Some(ActiveSession {
            id,
            mode,
            started_at: now,
            classifier: DistractionClassifier::new(&self.config, now),
            phases,
            accumulator: SessionAccumulator::new(now, self.config.own_window_token.clone()),
        });
        log::info!("started {} session {id}", mode.description());
        Ok(id)
    }

    /// End the session, destroying its state. Idempotent.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!("stopped session {}", session.id);
        }
    }

    /// Advance the engine by one tick: classify, then (in Pomodoro mode)
    /// advance the phase cycle, then accumulate. No-op when not running.
    pub fn tick(&mut self, input: TickInput, now: DateTime<Utc>) -> Option<TickOutcome> {
        let session = self.session.as_mut()?;

        let app_token = input.app_token.map(|token| token.trim().to_lowercase());
        let verdict = {
            let unproductive = self.unproductive.read().unwrap();
            session
                .classifier
                .classify(app_token.as_deref(), input.face_present, now, &unproductive)
        };

        let phase_change = session
            .phases
            .as_mut()
            .and_then(|machine| machine.advance(now));

        let sample = Sample {
            timestamp: now,
            app_token: app_token.unwrap_or_default(),
            distracted: verdict.distracted,
            face_present: input.face_present.unwrap_or(false),
        };
        session.accumulator.record(sample.clone(), self.config.tick_secs);

        let warned = verdict.distracted
            && session
                .phases
                .as_ref()
                .is_some_and(|machine| machine.phase().warns_on_distraction());

        if let Some(change) = phase_change {
            let _ = self.events.send(EngineEvent::PhaseChanged {
                from: change.from,
                to: change.to,
            });
        }
        if let Some(source) = verdict.source.filter(|_| warned) {
            let _ = self.events.send(EngineEvent::DistractionWarning { source });
        }

        Some(TickOutcome {
            sample,
            phase_change,
            warned,
        })
    }

    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> StatusSnapshot {
        let Some(session) = &self.session else {
            return StatusSnapshot::IDLE;
        };

        let phase = session.phases.as_ref().map(|machine| {
            #[allow(clippy::cast_sign_loss)]
            let time_left_secs = machine.time_left(now).num_seconds().max(0) as u64;
            PhaseStatus {
                phase: machine.phase(),
                time_left_secs,
                completed_work_phases: machine.completed_work_phases(),
            }
        });

        StatusSnapshot {
            running: true,
            session_id: Some(session.id),
            mode: Some(session.mode),
            started_at: Some(session.started_at),
            totals: Some(session.accumulator.totals(now)),
            phase,
            current_app: session
                .accumulator
                .last_sample()
                .map(|sample| sample.app_token.clone())
                .filter(|token| !token.is_empty()),
        }
    }

    /// Summary of the running session at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoData`] when no session is active or no
    /// sample has been recorded yet.
    pub fn summarize(&self, now: DateTime<Utc>) -> Result<Report, EngineError> {
        let session = self.session.as_ref().ok_or(EngineError::NoData)?;
        analytics::summarize(&session.accumulator, now)
    }

    #[must_use]
    pub fn totals(&self, now: DateTime<Utc>) -> Option<Totals> {
        self.session
            .as_ref()
            .map(|session| session.accumulator.totals(now))
    }
}
