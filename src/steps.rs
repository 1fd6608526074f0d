use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed average stride length in meters.
pub const STRIDE_LENGTH_METERS: f64 = 0.762;

pub fn steps_to_meters(steps: u32) -> f64 {
    steps as f64 * STRIDE_LENGTH_METERS
}

/// Steps counted since local midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStepCounter {
    pub steps: u32,
    pub last_reset_date: NaiveDate,
}

impl DailyStepCounter {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            steps: 0,
            last_reset_date: today,
        }
    }

    /// Zero the counter when `today` differs from the stored reset date.
    ///
    /// Returns true if a reset happened; a second call on the same day is a no-op.
    pub fn reset_if_new_day(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == today {
            return false;
        }
        self.steps = 0;
        self.last_reset_date = today;
        true
    }

    /// Replace the counter with the platform's steps-since-midnight baseline.
    pub fn set_baseline(&mut self, steps: u32) {
        self.steps = steps;
    }

    pub fn increment(&mut self) -> u32 {
        self.steps = self.steps.saturating_add(1);
        self.steps
    }

    pub fn distance_meters(&self) -> f64 {
        steps_to_meters(self.steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_reset_same_day_is_noop() {
        let mut counter = DailyStepCounter {
            steps: 4200,
            last_reset_date: day(19),
        };
        assert!(!counter.reset_if_new_day(day(19)));
        assert!(!counter.reset_if_new_day(day(19)));
        assert_eq!(counter.steps, 4200);
    }

    #[test]
    fn test_reset_on_new_day_happens_once() {
        let mut counter = DailyStepCounter {
            steps: 4200,
            last_reset_date: day(18),
        };
        assert!(counter.reset_if_new_day(day(19)));
        assert_eq!(counter.steps, 0);
        assert_eq!(counter.last_reset_date, day(19));

        counter.increment();
        assert!(!counter.reset_if_new_day(day(19)));
        assert_eq!(counter.steps, 1);
    }

    #[test]
    fn test_baseline_then_increment() {
        let mut counter = DailyStepCounter::new(day(19));
        counter.set_baseline(1000);
        assert_eq!(counter.increment(), 1001);
        assert_eq!(counter.increment(), 1002);
    }

    #[test]
    fn test_increment_saturates() {
        let mut counter = DailyStepCounter::new(day(19));
        counter.set_baseline(u32::MAX);
        assert_eq!(counter.increment(), u32::MAX);
    }

    #[test]
    fn test_distance() {
        let mut counter = DailyStepCounter::new(day(19));
        counter.set_baseline(1000);
        assert_relative_eq!(counter.distance_meters(), 762.0, epsilon = 1e-9);
        assert_eq!(steps_to_meters(0), 0.0);
    }
}
