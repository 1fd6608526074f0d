use serde::{Deserialize, Serialize};
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::activity::ActivityState;
use crate::exploration::ExplorationProgress;
use crate::toggles::{SensorKind, SensorToggles};
use crate::weather::{PressureTrend, WeatherCondition};

/// Every value the engine publishes, captured at one instant.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DiscoverySnapshot {
    pub timestamp: f64,
    pub toggles: SensorToggles,
    pub active_subscriptions: Vec<SensorKind>,
    // Steps
    pub daily_steps: u32,
    pub step_distance_meters: f64,
    // Motion
    pub current_activity: ActivityState,
    pub proximity_radius_meters: u32,
    // Barometer
    pub atmospheric_pressure_hpa: Option<f64>,
    pub weather_condition: WeatherCondition,
    pub pressure_trend: PressureTrend,
    pub pressure_samples: usize,
    // Compass
    pub compass_heading_degrees: f64,
    pub compass_cardinal: String,
    pub ambient_light_lux: Option<f64>,
    pub exploration: ExplorationProgress,
}

impl DiscoverySnapshot {
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

pub fn current_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
