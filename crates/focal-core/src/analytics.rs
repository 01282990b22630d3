use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::session::{AppUsage, SessionAccumulator};

/// How many applications the report lists.
pub const TOP_APP_COUNT: usize = 3;

/// Session summary derived at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub total_secs: u64,
    pub productive_secs: u64,
    pub distracted_secs: u64,
    pub productive_pct: f64,
    pub distracted_pct: f64,
    pub top_apps: Vec<AppUsage>,
}

/// Derive a summary from the accumulator's current state.
///
/// Pure over the accumulator; safe to call at any time without mutating
/// session state. Percentages are computed against elapsed time at `now`
/// and reported as zero when no time has elapsed yet.
///
/// # Errors
///
/// Returns [`EngineError::NoData`] when no sample has been recorded.
pub fn summarize(
    accumulator: &SessionAccumulator,
    now: DateTime<Utc>,
) -> Result<Report, EngineError> {
    if accumulator.sample_count() == 0 {
        return Err(EngineError::NoData);
    }

    let totals = accumulator.totals(now);
    Ok(Report {
        total_secs: totals.total_secs,
        productive_secs: totals.productive_secs,
        distracted_secs: totals.distracted_secs,
        productive_pct: percentage(totals.productive_secs, totals.total_secs),
        distracted_pct: percentage(totals.distracted_secs, totals.total_secs),
        top_apps: accumulator.ledger().top(TOP_APP_COUNT),
    })
}

/// Render seconds as `HH:MM:SS`.
#[must_use]
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Sample;
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

    #[test]
    fn test_summarize_empty_session_is_no_data() {
        let acc = SessionAccumulator::new(start_time(), String::from("focal"));
        assert_eq!(summarize(&acc, start_time()), Err(EngineError::NoData));
    }

    #[test]
    fn test_single_tick_percentages_sum_to_one_hundred() {
        let start = start_time();
        let mut acc = SessionAccumulator::new(start, String::from("focal"));
        acc.record(sample(start, "editor", false), 1);

        let report = summarize(&acc, start + Duration::seconds(1)).unwrap();
        assert!(report.total_secs > 0);
        assert!((report.productive_pct + report.distracted_pct - 100.0).abs() < 1e-9);
        assert!((report.productive_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_elapsed_reports_zero_percentages() {
        let start = start_time();
        let mut acc = SessionAccumulator::new(start, String::from("focal"));
        acc.record(sample(start, "editor", false), 1);

        // Queried at the same instant the session started.
        let report = summarize(&acc, start).unwrap();
        assert_eq!(report.total_secs, 0);
        assert!((report.productive_pct).abs() < f64::EPSILON);
        assert!((report.distracted_pct).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_splits_and_ranks_apps() {
        let start = start_time();
        let mut acc = SessionAccumulator::new(start, String::from("focal"));

        for secs in 0..6 {
            let at = start + Duration::seconds(secs);
            acc.record(sample(at, "chrome", true), 1);
        }
        for secs in 6..10 {
            let at = start + Duration::seconds(secs);
            acc.record(sample(at, "editor", false), 1);
        }

        let report = summarize(&acc, start + Duration::seconds(10)).unwrap();
        assert_eq!(report.total_secs, 10);
        assert_eq!(report.distracted_secs, 6);
        assert_eq!(report.productive_secs, 4);
        assert!((report.distracted_pct - 60.0).abs() < 1e-9);
        assert_eq!(report.top_apps.len(), 2);
        assert_eq!(report.top_apps[0].app, "chrome");
        assert_eq!(report.top_apps[0].seconds, 6);
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(61), "00:01:01");
        assert_eq!(format_hms(3_725), "01:02:05");
        assert_eq!(format_hms(90_000), "25:00:00");
    }
}
