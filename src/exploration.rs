use serde::{Deserialize, Serialize};

use crate::steps::steps_to_meters;

/// Number of visited markers that counts as a fully explored neighborhood.
pub const NEIGHBORHOOD_SIZE: usize = 100;

/// A place reported by the app's own location logic. Not validated or deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMarker {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationMarker {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorationProgress {
    pub locations_visited: Vec<LocationMarker>,
    pub total_distance_meters: f64,
    pub coverage_percent: f64,
}

impl ExplorationProgress {
    /// Append a visit and recompute coverage.
    ///
    /// Distance grows by the full cumulative daily step distance on every call,
    /// not by the delta since the previous visit.
    pub fn record_visit(&mut self, marker: LocationMarker, current_steps: u32) {
        self.locations_visited.push(marker);
        self.total_distance_meters += steps_to_meters(current_steps);
        self.coverage_percent = coverage_for(self.locations_visited.len());
    }
}

pub fn coverage_for(visited: usize) -> f64 {
    (visited as f64 / NEIGHBORHOOD_SIZE as f64 * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_coverage_is_clamped() {
        let mut progress = ExplorationProgress::default();
        for i in 0..150 {
            progress.record_visit(LocationMarker::new(format!("poi-{}", i), 0.0, 0.0), 0);
        }
        assert_eq!(progress.locations_visited.len(), 150);
        assert_eq!(progress.coverage_percent, 100.0);
    }

    #[test]
    fn test_duplicates_inflate_coverage() {
        let mut progress = ExplorationProgress::default();
        let cafe = LocationMarker::new("cafe", 52.37, 4.89);
        for _ in 0..3 {
            progress.record_visit(cafe.clone(), 0);
        }
        assert_eq!(progress.locations_visited.len(), 3);
        assert_relative_eq!(progress.coverage_percent, 3.0);
    }

    #[test]
    fn test_distance_uses_cumulative_steps() {
        let mut progress = ExplorationProgress::default();
        progress.record_visit(LocationMarker::new("a", 0.0, 0.0), 1000);
        progress.record_visit(LocationMarker::new("b", 0.0, 0.0), 1000);
        // Same cumulative count counted twice
        assert_relative_eq!(progress.total_distance_meters, 1524.0, epsilon = 1e-9);
    }

    #[test]
    fn test_json_field_names() {
        let mut progress = ExplorationProgress::default();
        progress.record_visit(LocationMarker::new("a", 1.0, 2.0), 10);
        let json = serde_json::to_string(&progress).unwrap();
        assert!(json.contains("locationsVisited"));
        assert!(json.contains("coveragePercent"));

        let decoded: ExplorationProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, progress);
    }
}
