use crate::activity::ActivityState;

/// Discovery radius in meters for an activity state.
///
/// No hysteresis: the radius follows every classification.
pub fn radius_for(state: ActivityState) -> u32 {
    match state {
        ActivityState::Stationary => 100,
        ActivityState::Walking => 500,
        ActivityState::Running => 1000,
        ActivityState::Driving => 5000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::classify;

    #[test]
    fn test_radius_table() {
        assert_eq!(radius_for(ActivityState::Stationary), 100);
        assert_eq!(radius_for(ActivityState::Walking), 500);
        assert_eq!(radius_for(ActivityState::Running), 1000);
        assert_eq!(radius_for(ActivityState::Driving), 5000);
    }

    #[test]
    fn test_radius_flaps_with_classification() {
        // Trembling hand around the walking threshold
        let radii: Vec<u32> = [0.49, 0.51, 0.49, 0.51]
            .iter()
            .map(|m| radius_for(classify(*m)))
            .collect();
        assert_eq!(radii, vec![100, 500, 100, 500]);
    }
}
