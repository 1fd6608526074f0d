use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::toggles::SensorKind;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    // ── Sampling intervals (ms) ──
    pub motion_interval_ms: u64,
    pub shake_interval_ms: u64,
    pub barometer_interval_ms: u64,
    pub compass_interval_ms: u64,
    pub ambient_light_interval_ms: u64,
    pub pedometer_interval_ms: u64,

    // ── Shake detection ──
    pub shake_threshold: f64,
    pub shake_cooldown_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            motion_interval_ms: 1000,
            shake_interval_ms: 100,
            barometer_interval_ms: 60_000,
            compass_interval_ms: 500,
            ambient_light_interval_ms: 1000,
            pedometer_interval_ms: 1000,
            shake_threshold: 2.5,
            shake_cooldown_ms: 1000,
        }
    }
}

impl SamplingConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Interval hint passed to a sensor port on subscribe.
    pub fn interval_for(&self, kind: SensorKind) -> Duration {
        let ms = match kind {
            SensorKind::StepCounter => self.pedometer_interval_ms,
            SensorKind::Motion => self.motion_interval_ms,
            SensorKind::Shake => self.shake_interval_ms,
            SensorKind::Barometer => self.barometer_interval_ms,
            SensorKind::Compass => self.compass_interval_ms,
            SensorKind::AmbientLight => self.ambient_light_interval_ms,
        };
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_intervals() {
        let config = SamplingConfig::default();
        assert_eq!(config.interval_for(SensorKind::Motion), Duration::from_secs(1));
        assert_eq!(config.interval_for(SensorKind::Barometer), Duration::from_secs(60));
        assert_eq!(config.interval_for(SensorKind::Compass), Duration::from_millis(500));
        assert_eq!(config.interval_for(SensorKind::Shake), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SamplingConfig =
            serde_json::from_str(r#"{ "compass_interval_ms": 250, "shake_threshold": 3.0 }"#)
                .unwrap();
        assert_eq!(config.compass_interval_ms, 250);
        assert_eq!(config.shake_threshold, 3.0);
        assert_eq!(config.motion_interval_ms, 1000);
        assert_eq!(config.shake_cooldown_ms, 1000);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = SamplingConfig::from_json_file("/nonexistent/discovery.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
