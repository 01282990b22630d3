use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, UnproductiveList};

/// Which rule marked the tick as distracted.
///
/// When both rules fire on the same tick, the app rule takes precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistractionSource {
    /// The foreground window matched the unproductive list.
    UnproductiveApp,
    /// No face seen for longer than the grace period.
    FaceAway,
}

/// Per-tick classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub distracted: bool,
    pub source: Option<DistractionSource>,
}

impl Verdict {
    const ATTENTIVE: Self = Self {
        distracted: false,
        source: None,
    };

    const fn distracted_by(source: DistractionSource) -> Self {
        Self {
            distracted: true,
            source: Some(source),
        }
    }
}

/// Fuses the window-identity and face-presence signals into one judgement.
///
/// The two signals are independent: either alone marks the tick distracted,
/// and both must be clear for the tick to count as attentive. The only state
/// held here is the timestamp of the last face sighting.
pub struct DistractionClassifier {
    face_grace: Duration,
    own_window_token: String,
    last_face_seen_at: DateTime<Utc>,
}

impl DistractionClassifier {
    /// `started_at` seeds the face sighting so the grace period must elapse
    /// before face absence can fire, even if no camera frame has arrived yet.
    #[must_use]
    pub fn new(config: &EngineConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            face_grace: config.face_grace,
            own_window_token: config.own_window_token.clone(),
            last_face_seen_at: started_at,
        }
    }

    /// Classify one tick.
    ///
    /// `None` for either signal means the sampler had nothing this tick; the
    /// corresponding rule fails open (a missing face sample leaves the grace
    /// window untouched rather than counting as absence).
    pub fn classify(
        &mut self,
        app_token: Option<&str>,
        face_present: Option<bool>,
        now: DateTime<Utc>,
        unproductive: &UnproductiveList,
    ) -> Verdict {
        let distracted_by_app = app_token.is_some_and(|token| self.app_rule(token, unproductive));
        let face_away = self.face_rule(face_present, now);

        if distracted_by_app {
            Verdict::distracted_by(DistractionSource::UnproductiveApp)
        } else if face_away {
            Verdict::distracted_by(DistractionSource::FaceAway)
        } else {
            Verdict::ATTENTIVE
        }
    }

    #[must_use]
    pub fn last_face_seen_at(&self) -> DateTime<Utc> {
        self.last_face_seen_at
    }

    fn app_rule(&self, app_token: &str, unproductive: &UnproductiveList) -> bool {
        let token = app_token.to_lowercase();
        if token.is_empty() || token.contains(&self.own_window_token) {
            return false;
        }
        let matched = unproductive.contains_match(&token);
        if matched {
            log::debug!("'{token}' matched the unproductive list");
        }
        matched
    }

    fn face_rule(&mut self, face_present: Option<bool>, now: DateTime<Utc>) -> bool {
        match face_present {
            Some(true) => {
                self.last_face_seen_at = now;
                false
            }
            Some(false) => now - self.last_face_seen_at > self.face_grace,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        start_time() + Duration::seconds(secs)
    }

    fn classifier() -> DistractionClassifier {
        DistractionClassifier::new(&EngineConfig::default(), start_time())
    }

    #[test]
    fn test_app_rule_and_face_grace_scenario() {
        let mut list = UnproductiveList::default();
        list.add("chrome");
        let mut clf = classifier();

        // t=0: unproductive app, face present
        let verdict = clf.classify(Some("chrome"), Some(true), at(0), &list);
        assert_eq!(verdict.source, Some(DistractionSource::UnproductiveApp));

        // t=1..5: productive app, face absent, grace not yet elapsed
        for secs in 1..=5 {
            let verdict = clf.classify(Some("editor"), Some(false), at(secs), &list);
            assert!(!verdict.distracted, "attentive expected at t={secs}");
        }

        // t=6: face absent for longer than the 5s grace
        let verdict = clf.classify(Some("editor"), Some(false), at(6), &list);
        assert_eq!(verdict.source, Some(DistractionSource::FaceAway));
    }

    #[test]
    fn test_grace_runs_from_session_start() {
        let list = UnproductiveList::default();
        let mut clf = classifier();

        // No camera frame has arrived yet; absence cannot fire inside grace.
        assert!(!clf.classify(Some("editor"), Some(false), at(3), &list).distracted);
        assert!(clf.classify(Some("editor"), Some(false), at(6), &list).distracted);
    }

    #[test]
    fn test_face_sighting_resets_grace() {
        let list = UnproductiveList::default();
        let mut clf = classifier();

        assert!(!clf.classify(Some("editor"), Some(true), at(60), &list).distracted);
        assert_eq!(clf.last_face_seen_at(), at(60));
        assert!(!clf.classify(Some("editor"), Some(false), at(65), &list).distracted);
        assert!(clf.classify(Some("editor"), Some(false), at(66), &list).distracted);
    }

    #[test]
    fn test_own_window_excluded_from_app_rule() {
        let mut list = UnproductiveList::default();
        list.add("focal");
        let mut clf = classifier();

        let verdict = clf.classify(Some("focal - session"), Some(true), at(1), &list);
        assert!(!verdict.distracted);
    }

    #[test]
    fn test_missing_signals_fail_open() {
        let mut list = UnproductiveList::default();
        list.add("chrome");
        let mut clf = classifier();

        // Window sampler gap: app rule cannot fire.
        assert!(!clf.classify(None, Some(true), at(1), &list).distracted);

        // Face sampler gap far past the grace window: face rule stays quiet.
        assert!(!clf.classify(Some("editor"), None, at(120), &list).distracted);
    }

    #[test]
    fn test_app_rule_takes_precedence_over_face_rule() {
        let mut list = UnproductiveList::default();
        list.add("chrome");
        let mut clf = classifier();

        let verdict = clf.classify(Some("chrome"), Some(false), at(30), &list);
        assert_eq!(verdict.source, Some(DistractionSource::UnproductiveApp));
    }
}
