use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum retained pressure samples.
pub const PRESSURE_HISTORY_CAPACITY: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Stormy,
    Rainy,
    #[default]
    Normal,
    Clear,
}

impl WeatherCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Stormy => "stormy",
            WeatherCondition::Rainy => "rainy",
            WeatherCondition::Normal => "normal",
            WeatherCondition::Clear => "clear",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureTrend {
    Rising,
    Falling,
    #[default]
    Steady,
}

/// Band-based inference from station pressure in hPa.
///
/// Bands: `< 1000` stormy, `[1000, 1010)` rainy, `> 1020` clear, otherwise normal.
pub fn infer(pressure_hpa: f64) -> WeatherCondition {
    if pressure_hpa < 1000.0 {
        WeatherCondition::Stormy
    } else if pressure_hpa < 1010.0 {
        WeatherCondition::Rainy
    } else if pressure_hpa > 1020.0 {
        WeatherCondition::Clear
    } else {
        WeatherCondition::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureEntry {
    pub pressure: f64,
    pub timestamp: f64,
    pub condition: WeatherCondition,
}

/// FIFO of the most recent pressure samples, capped at [`PRESSURE_HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default)]
pub struct PressureHistory {
    entries: VecDeque<PressureEntry>,
}

impl PressureHistory {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(PRESSURE_HISTORY_CAPACITY + 1),
        }
    }

    /// Classify and append a sample, evicting the oldest entry past capacity.
    pub fn record(&mut self, pressure: f64, timestamp: f64) -> WeatherCondition {
        let condition = infer(pressure);
        self.entries.push_back(PressureEntry {
            pressure,
            timestamp,
            condition,
        });
        while self.entries.len() > PRESSURE_HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        condition
    }

    /// Sign of the difference between the last two samples.
    pub fn trend(&self) -> PressureTrend {
        let n = self.entries.len();
        if n < 2 {
            return PressureTrend::Steady;
        }
        let delta = self.entries[n - 1].pressure - self.entries[n - 2].pressure;
        if delta > 0.0 {
            PressureTrend::Rising
        } else if delta < 0.0 {
            PressureTrend::Falling
        } else {
            PressureTrend::Steady
        }
    }

    pub fn latest(&self) -> Option<&PressureEntry> {
        self.entries.back()
    }

    pub fn entries(&self) -> impl Iterator<Item = &PressureEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
