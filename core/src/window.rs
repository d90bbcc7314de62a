//! The fixed historical window that all timestamps fall in.
//!
//! The window end is an explicit anchor from the run configuration,
//! not wall-clock time read mid-run, so a fixed anchor plus a fixed
//! seed reproduces every timestamp byte-for-byte.

use crate::rng::PhaseRng;
use chrono::{Duration, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl HistoryWindow {
    /// Length of the history window in days (~6 months).
    pub const DAYS: i64 = 180;

    pub fn ending_at(end: NaiveDateTime) -> Self {
        Self {
            start: end - Duration::days(Self::DAYS),
            end,
        }
    }

    /// Uniform timestamp over the full window, second granularity.
    pub fn sample(&self, rng: &mut PhaseRng) -> NaiveDateTime {
        let span = (self.end - self.start).num_seconds();
        self.start + Duration::seconds(rng.next_u64_below(span as u64 + 1) as i64)
    }

    /// Uniform timestamp over the trailing `days` of the window.
    pub fn sample_recent(&self, rng: &mut PhaseRng, days: i64) -> NaiveDateTime {
        let start = self.end - Duration::days(days);
        let span = (self.end - start).num_seconds();
        start + Duration::seconds(rng.next_u64_below(span as u64 + 1) as i64)
    }

    /// A uniformly chosen past day with the hour forced into 0-4,
    /// random minute and second. Used by the odd-hour fraud pattern.
    pub fn odd_hour(&self, rng: &mut PhaseRng) -> NaiveDateTime {
        let day = rng.next_u64_below(Self::DAYS as u64 + 1) as i64;
        let base = self.end - Duration::days(day);
        let hour = rng.next_u64_below(5) as u32;
        let minute = rng.next_u64_below(60) as u32;
        let second = rng.next_u64_below(60) as u32;
        base.date()
            .and_hms_opt(hour, minute, second)
            .expect("hour < 5, minute/second < 60")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::PhaseRng;
    use chrono::{NaiveDate, Timelike};

    fn anchor() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 30)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn window_spans_180_days() {
        let window = HistoryWindow::ending_at(anchor());
        assert_eq!((window.end - window.start).num_days(), 180);
    }

    #[test]
    fn samples_stay_inside_window() {
        let window = HistoryWindow::ending_at(anchor());
        let mut rng = PhaseRng::new(42, 1);
        for _ in 0..1000 {
            let ts = window.sample(&mut rng);
            assert!(ts >= window.start && ts <= window.end);
        }
    }

    #[test]
    fn recent_samples_stay_in_trailing_days() {
        let window = HistoryWindow::ending_at(anchor());
        let mut rng = PhaseRng::new(42, 1);
        let cutoff = window.end - Duration::days(7);
        for _ in 0..500 {
            let ts = window.sample_recent(&mut rng, 7);
            assert!(ts >= cutoff && ts <= window.end);
        }
    }

    #[test]
    fn odd_hours_are_forced_into_small_hours() {
        let window = HistoryWindow::ending_at(anchor());
        let mut rng = PhaseRng::new(42, 2);
        for _ in 0..500 {
            let ts = window.odd_hour(&mut rng);
            assert!(ts.hour() <= 4, "odd-hour timestamp at hour {}", ts.hour());
        }
    }
}
