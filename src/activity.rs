use serde::{Deserialize, Serialize};

// Thresholds in m/s^2, checked highest first
const DRIVING_THRESHOLD: f64 = 3.0;
const RUNNING_THRESHOLD: f64 = 1.5;
const WALKING_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityState {
    #[default]
    Stationary,
    Walking,
    Running,
    Driving,
}

impl ActivityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityState::Stationary => "STATIONARY",
            ActivityState::Walking => "WALKING",
            ActivityState::Running => "RUNNING",
            ActivityState::Driving => "DRIVING",
        }
    }
}

impl std::fmt::Display for ActivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a single acceleration magnitude. No memory of prior samples.
///
/// NaN falls through every comparison and lands on `Stationary`.
pub fn classify(magnitude: f64) -> ActivityState {
    if magnitude > DRIVING_THRESHOLD {
        ActivityState::Driving
    } else if magnitude > RUNNING_THRESHOLD {
        ActivityState::Running
    } else if magnitude > WALKING_THRESHOLD {
        ActivityState::Walking
    } else {
        ActivityState::Stationary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank(state: ActivityState) -> u8 {
        match state {
            ActivityState::Stationary => 0,
            ActivityState::Walking => 1,
            ActivityState::Running => 2,
            ActivityState::Driving => 3,
        }
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(3.1), ActivityState::Driving);
        assert_eq!(classify(3.0), ActivityState::Running);
        assert_eq!(classify(2.9), ActivityState::Running);
        assert_eq!(classify(1.5), ActivityState::Walking);
        assert_eq!(classify(0.51), ActivityState::Walking);
        assert_eq!(classify(0.5), ActivityState::Stationary);
        assert_eq!(classify(0.0), ActivityState::Stationary);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let mut prev = classify(0.0);
        for i in 1..=1000 {
            let state = classify(i as f64 * 0.005);
            assert!(rank(state) >= rank(prev), "slower state at {}", i);
            prev = state;
        }
        assert_eq!(prev, ActivityState::Driving);
    }

    #[test]
    fn test_classify_non_finite() {
        assert_eq!(classify(f64::NAN), ActivityState::Stationary);
        assert_eq!(classify(f64::INFINITY), ActivityState::Driving);
    }

    #[test]
    fn test_display() {
        assert_eq!(ActivityState::Walking.to_string(), "WALKING");
        assert_eq!(ActivityState::default(), ActivityState::Stationary);
    }
}
