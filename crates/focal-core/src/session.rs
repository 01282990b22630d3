use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One tick's classification result, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    /// Lowercased foreground-window identity; empty when the sampler failed.
    pub app_token: String,
    pub distracted: bool,
    pub face_present: bool,
}

/// One row of the usage ledger, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUsage {
    pub app: String,
    pub seconds: u64,
}

/// Running totals at a point in time.
///
/// `productive_secs` is always derived from elapsed time minus distracted
/// time, clamped at zero against clock skew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total_secs: u64,
    pub productive_secs: u64,
    pub distracted_secs: u64,
}

#[derive(Debug, Clone)]
struct LedgerEntry {
    seconds: u64,
    /// Insertion rank, used to break ties deterministically.
    first_seen: usize,
}

/// Per-application accumulated seconds, first-seen order retained.
#[derive(Debug, Clone, Default)]
pub struct UsageLedger {
    entries: HashMap<String, LedgerEntry>,
}

impl UsageLedger {
    fn charge(&mut self, app_token: &str, seconds: u64) {
        let first_seen = self.entries.len();
        self.entries
            .entry(app_token.to_string())
            .or_insert(LedgerEntry {
                seconds: 0,
                first_seen,
            })
            .seconds += seconds;
    }

    #[must_use]
    pub fn seconds_for(&self, app_token: &str) -> u64 {
        self.entries.get(app_token).map_or(0, |entry| entry.seconds)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `n` applications by accumulated seconds, ties broken by
    /// first-seen order.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<AppUsage> {
        let mut rows: Vec<(&String, &LedgerEntry)> = self.entries.iter().collect();
        rows.sort_by(|a, b| {
            b.1.seconds
                .cmp(&a.1.seconds)
                .then(a.1.first_seen.cmp(&b.1.first_seen))
        });
        rows.into_iter()
            .take(n)
            .map(|(app, entry)| AppUsage {
                app: app.clone(),
                seconds: entry.seconds,
            })
            .collect()
    }
}

/// Owns the ordered sample log, distracted-time counter, and usage ledger
/// for one session. Samples are appended and never mutated or removed.
#[derive(Debug, Clone)]
pub struct SessionAccumulator {
    started_at: DateTime<Utc>,
    distracted_secs: u64,
    samples: Vec<Sample>,
    ledger: UsageLedger,
    own_window_token: String,
}

impl SessionAccumulator {
    #[must_use]
    pub fn new(started_at: DateTime<Utc>, own_window_token: String) -> Self {
        Self {
            started_at,
            distracted_secs: 0,
            samples: Vec::new(),
            ledger: UsageLedger::default(),
            own_window_token,
        }
    }

    /// Record one tick.
    ///
    /// A distracted sample charges `tick_secs` to distracted time; every
    /// sample with a usable token charges `tick_secs` to the ledger. The
    /// tracker's own window and blank (failed-sampler) tokens never enter
    /// the ledger, but their ticks still count toward elapsed time.
    pub fn record(&mut self, sample: Sample, tick_secs: u32) {
        if sample.distracted {
            self.distracted_secs += u64::from(tick_secs);
        }
        if !sample.app_token.is_empty() && !sample.app_token.contains(&self.own_window_token) {
            self.ledger.charge(&sample.app_token, u64::from(tick_secs));
        }
        self.samples.push(sample);
    }

    #[must_use]
    pub fn totals(&self, now: DateTime<Utc>) -> Totals {
        #[allow(clippy::cast_sign_loss)]
        let total_secs = (now - self.started_at).num_seconds().max(0) as u64;
        Totals {
            total_secs,
            productive_secs: total_secs.saturating_sub(self.distracted_secs),
            distracted_secs: self.distracted_secs,
        }
    }

    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[must_use]
    pub fn last_sample(&self) -> Option<&Sample> {
        self.samples.last()
    }

    #[must_use]
    pub const fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn sample(at: DateTime<Utc>, app: &str, distracted: bool) -> Sample {
        Sample {
            timestamp: at,
            app_token: app.to_string(),
            distracted,
            face_present: true,
        }
    }

    fn accumulator() -> SessionAccumulator {
        SessionAccumulator::new(start_time(), String::from("focal"))
    }

    #[test]
    fn test_totals_split_elapsed_between_productive_and_distracted() {
        let start = start_time();
        let mut acc = accumulator();

        for secs in 0..10 {
            let at = start + Duration::seconds(secs);
            acc.record(sample(at, "editor", secs >= 7), 1);
        }

        let totals = acc.totals(start + Duration::seconds(10));
        assert_eq!(totals.total_secs, 10);
        assert_eq!(totals.distracted_secs, 3);
        assert_eq!(totals.productive_secs, 7);
    }

    #[test]
    fn test_totals_clamp_against_clock_skew() {
        let start = start_time();
        let mut acc = accumulator();
        acc.record(sample(start, "editor", true), 1);

        // now earlier than session start: elapsed clamps to zero and the
        // derived productive time cannot go negative.
        let totals = acc.totals(start - Duration::seconds(30));
        assert_eq!(totals.total_secs, 0);
        assert_eq!(totals.productive_secs, 0);
        assert_eq!(totals.distracted_secs, 1);
    }

    #[test]
    fn test_own_window_and_blank_tokens_skip_the_ledger() {
        let start = start_time();
        let mut acc = accumulator();

        acc.record(sample(start, "focal - session", false), 1);
        acc.record(sample(start + Duration::seconds(1), "", false), 1);
        acc.record(sample(start + Duration::seconds(2), "editor", false), 1);

        assert_eq!(acc.sample_count(), 3);
        assert_eq!(acc.ledger().len(), 1);
        assert_eq!(acc.ledger().seconds_for("editor"), 1);
    }

    #[test]
    fn test_distracted_time_is_monotonic() {
        let start = start_time();
        let mut acc = accumulator();
        let mut previous = 0;

        for secs in 0..20 {
            let at = start + Duration::seconds(secs);
            acc.record(sample(at, "editor", secs % 3 == 0), 1);
            let distracted = acc.totals(at + Duration::seconds(1)).distracted_secs;
            assert!(distracted >= previous);
            previous = distracted;
        }
    }

    #[test]
    fn test_ledger_top_orders_by_duration_then_first_seen() {
        let start = start_time();
        let mut acc = accumulator();

        let mut tick = 0;
        let mut run = |acc: &mut SessionAccumulator, app: &str, ticks: u32| {
            for _ in 0..ticks {
                let at = start + Duration::seconds(i64::from(tick));
                acc.record(sample(at, app, false), 1);
                tick += 1;
            }
        };

        run(&mut acc, "editor", 5);
        run(&mut acc, "terminal", 3);
        run(&mut acc, "mail", 3);
        run(&mut acc, "chat", 1);

        let top = acc.ledger().top(3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0], AppUsage { app: "editor".to_string(), seconds: 5 });
        // terminal and mail tie at 3s; terminal was seen first.
        assert_eq!(top[1].app, "terminal");
        assert_eq!(top[2].app, "mail");
    }
}
