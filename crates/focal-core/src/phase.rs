use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// Pomodoro cycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Work,
    Break,
    LongBreak,
}

impl Phase {
    /// Get human-readable description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Break => "Break",
            Self::LongBreak => "Long break",
        }
    }

    /// Distraction warnings are only meaningful while working.
    #[must_use]
    pub const fn warns_on_distraction(&self) -> bool {
        matches!(self, Self::Work)
    }
}

/// A completed phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
}

/// Work/Break/LongBreak cycle driver.
///
/// Evaluated once per tick; performs at most one transition per evaluation,
/// so phases are never skipped. The machine cycles indefinitely until the
/// session controller stops the session.
#[derive(Debug, Clone)]
pub struct PhaseMachine {
    phase: Phase,
    phase_started_at: DateTime<Utc>,
    completed_work_phases: u32,
    work_duration: Duration,
    break_duration: Duration,
    long_break_duration: Duration,
    work_phases_per_cycle: u32,
}

impl PhaseMachine {
    /// Start the cycle in the Work phase.
    #[must_use]
    pub fn new(config: &EngineConfig, now: DateTime<Utc>) -> Self {
        Self {
            phase: Phase::Work,
            phase_started_at: now,
            completed_work_phases: 0,
            work_duration: config.work_duration,
            break_duration: config.break_duration,
            long_break_duration: config.long_break_duration,
            work_phases_per_cycle: config.work_phases_per_cycle,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Work phases completed since the last long break, in `[0, cycle)`.
    #[must_use]
    pub const fn completed_work_phases(&self) -> u32 {
        self.completed_work_phases
    }

    #[must_use]
    pub const fn duration_of(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Work => self.work_duration,
            Phase::Break => self.break_duration,
            Phase::LongBreak => self.long_break_duration,
        }
    }

    /// Time remaining in the current phase, clamped to zero.
    #[must_use]
    pub fn time_left(&self, now: DateTime<Utc>) -> Duration {
        let left = self.duration_of(self.phase) - (now - self.phase_started_at);
        left.max(Duration::zero())
    }

    /// Advance the cycle if the current phase has run its full duration.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Option<PhaseChange> {
        if now - self.phase_started_at < self.duration_of(self.phase) {
            return None;
        }

        let from = self.phase;
        let to = match from {
            Phase::Work => {
                self.completed_work_phases += 1;
                if self.completed_work_phases >= self.work_phases_per_cycle {
                    self.completed_work_phases = 0;
                    Phase::LongBreak
                } else {
                    Phase::Break
                }
            }
            Phase::Break | Phase::LongBreak => Phase::Work,
        };

        self.phase = to;
        self.phase_started_at = now;
        log::debug!("phase transition: {} -> {}", from.description(), to.description());
        Some(PhaseChange { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn short_config() -> EngineConfig {
        EngineConfig {
            work_duration: Duration::seconds(2),
            break_duration: Duration::seconds(1),
            long_break_duration: Duration::seconds(3),
            ..EngineConfig::default()
        }
    }

    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_work_completes_into_break_then_back_to_work() {
        let start = start_time();
        let mut machine = PhaseMachine::new(&short_config(), start);

        assert_eq!(machine.advance(start + Duration::seconds(1)), None);

        let change = machine.advance(start + Duration::seconds(2)).unwrap();
        assert_eq!(change, PhaseChange { from: Phase::Work, to: Phase::Break });
        assert_eq!(machine.completed_work_phases(), 1);

        let change = machine.advance(start + Duration::seconds(3)).unwrap();
        assert_eq!(change, PhaseChange { from: Phase::Break, to: Phase::Work });
        assert_eq!(machine.completed_work_phases(), 1);
    }

    #[test]
    fn test_fourth_work_phase_earns_long_break_and_resets_counter() {
        let mut now = start_time();
        let mut machine = PhaseMachine::new(&short_config(), now);

        for round in 1..=3 {
            now += Duration::seconds(2);
            assert_eq!(machine.advance(now).unwrap().to, Phase::Break);
            assert_eq!(machine.completed_work_phases(), round);
            now += Duration::seconds(1);
            assert_eq!(machine.advance(now).unwrap().to, Phase::Work);
        }

        now += Duration::seconds(2);
        assert_eq!(machine.advance(now).unwrap().to, Phase::LongBreak);
        assert_eq!(machine.completed_work_phases(), 0);

        now += Duration::seconds(3);
        assert_eq!(machine.advance(now).unwrap().to, Phase::Work);
    }

    #[test]
    fn test_at_most_one_transition_per_evaluation() {
        let start = start_time();
        let mut machine = PhaseMachine::new(&short_config(), start);

        // Far past several phase lengths: a single evaluation still performs
        // exactly one transition, anchored at the evaluation time.
        let late = start + Duration::seconds(30);
        assert_eq!(machine.advance(late).unwrap().to, Phase::Break);
        assert_eq!(machine.phase(), Phase::Break);
        assert_eq!(machine.advance(late), None);
    }

    #[test]
    fn test_time_left_clamps_to_zero() {
        let start = start_time();
        let machine = PhaseMachine::new(&short_config(), start);

        assert_eq!(machine.time_left(start + Duration::seconds(1)), Duration::seconds(1));
        assert_eq!(machine.time_left(start + Duration::seconds(10)), Duration::zero());
    }

    #[test]
    fn test_warning_scope_is_work_only() {
        assert!(Phase::Work.warns_on_distraction());
        assert!(!Phase::Break.warns_on_distraction());
        assert!(!Phase::LongBreak.warns_on_distraction());
    }
}
