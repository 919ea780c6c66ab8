// src/detect/state.rs

//! Per-source detection state machine.
//!
//! ```text
//!                 ok                 ok (changed / unchanged)
//! Uninitialized ─────► Baseline ─────────────────────────► Steady ◄─┐
//!       │                 │                                  │  └───┘ ok
//!       └────── err ──────┴──────────► Failing ◄──── err ────┘
//!                                         │ ok: back to Baseline/Steady
//! ```
//!
//! A [`SourceState`] is owned by exactly one polling loop and has no interior
//! mutability, no channels and no I/O, so every transition can be unit
//! tested directly.

use chrono::{DateTime, Local};

use crate::detect::diff::diff_snapshots;
use crate::detect::fingerprint::fingerprint;
use crate::detect::snapshot::Snapshot;
use crate::fetch::{Content, FetchError};
use crate::report::ChangeReport;
use crate::source::SourceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing fetched successfully yet.
    Uninitialized,
    /// First snapshot captured; nothing compared yet.
    Baseline,
    /// At least one comparison done.
    Steady,
    /// The most recent fetch failed; the snapshot (if any) is kept.
    Failing,
}

/// Result of feeding one fetch outcome into a [`SourceState`].
#[derive(Debug)]
pub enum Observation {
    /// First successful fetch; the baseline was stored silently.
    BaselineCaptured,
    /// Content equal to (or, for script sets, equivalent to) the snapshot.
    Unchanged,
    /// Content changed; the snapshot was replaced.
    Changed(ChangeReport),
    /// The fetch failed (or the content could not be compared).
    Failed {
        consecutive_failures: u32,
        error: FetchError,
    },
}

/// Runtime record for one source.
#[derive(Debug)]
pub struct SourceState {
    source: SourceId,
    snapshot: Option<Snapshot>,
    phase: Phase,
    consecutive_failures: u32,
    last_checked: Option<DateTime<Local>>,
}

impl SourceState {
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            snapshot: None,
            phase: Phase::Uninitialized,
            consecutive_failures: 0,
            last_checked: None,
        }
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_checked(&self) -> Option<DateTime<Local>> {
        self.last_checked
    }

    /// Feed one fetch outcome observed at `now`.
    ///
    /// The snapshot is only replaced after a successful comparison; failures
    /// never touch it, so an outage cannot show up as removed content.
    pub fn observe(
        &mut self,
        fetched: Result<Content, FetchError>,
        now: DateTime<Local>,
    ) -> Observation {
        self.last_checked = Some(now);

        let content = match fetched {
            Ok(content) => content,
            Err(error) => return self.record_failure(error),
        };
        let fp = fingerprint(&content);

        let Some(previous) = self.snapshot.as_ref() else {
            self.snapshot = Some(Snapshot::with_fingerprint(content, fp));
            self.settle(Phase::Baseline);
            return Observation::BaselineCaptured;
        };

        if previous.fingerprint() == fp {
            self.settle(Phase::Steady);
            return Observation::Unchanged;
        }

        let next = Snapshot::with_fingerprint(content, fp);
        let entries = match diff_snapshots(previous, &next) {
            Ok(entries) => entries,
            Err(error) => return self.record_failure(error),
        };

        self.snapshot = Some(next);
        self.settle(Phase::Steady);

        match ChangeReport::new(self.source.clone(), now, entries) {
            Some(report) => Observation::Changed(report),
            None => Observation::Unchanged,
        }
    }

    fn record_failure(&mut self, error: FetchError) -> Observation {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.phase = Phase::Failing;
        Observation::Failed {
            consecutive_failures: self.consecutive_failures,
            error,
        }
    }

    fn settle(&mut self, phase: Phase) {
        self.consecutive_failures = 0;
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::ScriptSet;
    use crate::report::ChangeEntry;

    fn lines(items: &[&str]) -> Result<Content, FetchError> {
        Ok(Content::Lines(items.iter().map(|s| s.to_string()).collect()))
    }

    fn scripts(items: &[&str]) -> Result<Content, FetchError> {
        Ok(Content::Scripts(ScriptSet::from_references(items.iter().copied())))
    }

    fn gone() -> Result<Content, FetchError> {
        Err(FetchError::NotFound("a.txt".to_string()))
    }

    fn state() -> SourceState {
        SourceState::new(SourceId::new("a.txt"))
    }

    #[test]
    fn first_observation_is_silent() {
        let mut st = state();
        assert_eq!(st.phase(), Phase::Uninitialized);
        assert!(matches!(
            st.observe(lines(&["a", "b"]), Local::now()),
            Observation::BaselineCaptured
        ));
        assert_eq!(st.phase(), Phase::Baseline);
        assert_eq!(st.snapshot().map(Snapshot::len), Some(2));
    }

    #[test]
    fn empty_first_observation_is_still_a_baseline() {
        let mut st = state();
        assert!(matches!(
            st.observe(lines(&[]), Local::now()),
            Observation::BaselineCaptured
        ));
        assert!(matches!(
            st.observe(lines(&["x"]), Local::now()),
            Observation::Changed(_)
        ));
    }

    #[test]
    fn identical_content_is_unchanged() {
        let mut st = state();
        st.observe(lines(&["a"]), Local::now());
        assert!(matches!(
            st.observe(lines(&["a"]), Local::now()),
            Observation::Unchanged
        ));
        assert_eq!(st.phase(), Phase::Steady);
    }

    #[test]
    fn change_produces_report_and_replaces_snapshot() {
        let mut st = state();
        st.observe(lines(&["a", "b", "c"]), Local::now());

        let Observation::Changed(report) = st.observe(lines(&["a", "x", "c"]), Local::now()) else {
            panic!("expected a change");
        };
        assert_eq!(report.source().as_str(), "a.txt");
        assert_eq!(
            report.entries(),
            &[ChangeEntry::removed(2, "b"), ChangeEntry::added(2, "x")]
        );

        // The new content is now the baseline for the next comparison.
        assert!(matches!(
            st.observe(lines(&["a", "x", "c"]), Local::now()),
            Observation::Unchanged
        ));
    }

    #[test]
    fn failure_keeps_snapshot_and_recovers_silently() {
        let mut st = state();
        st.observe(lines(&["a", "b"]), Local::now());
        let before = st.snapshot().cloned();

        for expected in 1..=3 {
            match st.observe(gone(), Local::now()) {
                Observation::Failed {
                    consecutive_failures,
                    ..
                } => assert_eq!(consecutive_failures, expected),
                other => panic!("expected failure, got {other:?}"),
            }
            assert_eq!(st.phase(), Phase::Failing);
            assert_eq!(st.snapshot().cloned(), before);
        }

        assert!(matches!(
            st.observe(lines(&["a", "b"]), Local::now()),
            Observation::Unchanged
        ));
        assert_eq!(st.consecutive_failures(), 0);
        assert_eq!(st.phase(), Phase::Steady);
    }

    #[test]
    fn failure_before_baseline_then_success_captures_baseline() {
        let mut st = state();
        st.observe(gone(), Local::now());
        assert_eq!(st.phase(), Phase::Failing);
        assert!(st.snapshot().is_none());

        assert!(matches!(
            st.observe(lines(&["a"]), Local::now()),
            Observation::BaselineCaptured
        ));
        assert_eq!(st.phase(), Phase::Baseline);
    }

    #[test]
    fn kind_mismatch_is_a_failure_not_a_diff() {
        let mut st = state();
        st.observe(lines(&["a"]), Local::now());
        assert!(matches!(
            st.observe(scripts(&["/a.js"]), Local::now()),
            Observation::Failed {
                error: FetchError::KindMismatch { .. },
                ..
            }
        ));
        assert!(matches!(st.snapshot(), Some(Snapshot::Lines { .. })));
    }

    #[test]
    fn reordered_scripts_refresh_snapshot_without_report() {
        let mut st = SourceState::new(SourceId::new("https://example.com/"));
        st.observe(scripts(&["/a.js", "/b.js"]), Local::now());
        assert!(matches!(
            st.observe(scripts(&["/b.js", "/a.js"]), Local::now()),
            Observation::Unchanged
        ));
        let Observation::Changed(report) =
            st.observe(scripts(&["/b.js", "/c.js"]), Local::now())
        else {
            panic!("expected a change");
        };
        assert_eq!(
            report.entries(),
            &[
                ChangeEntry::removed_ref("/a.js", None),
                ChangeEntry::added_ref("/c.js", None),
            ]
        );
    }

    #[test]
    fn records_last_check_time() {
        let mut st = state();
        assert!(st.last_checked().is_none());
        let now = Local::now();
        st.observe(gone(), now);
        assert_eq!(st.last_checked(), Some(now));
    }
}
