use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccelData {
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelData {
    pub fn new(x: f64, y: f64, z: f64, timestamp: f64) -> Self {
        Self { timestamp, x, y, z }
    }

    /// Gravity-inclusive magnitude in m/s^2.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MagData {
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BaroData {
    pub timestamp: f64,
    pub pressure_hpa: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightData {
    pub timestamp: f64,
    pub lux: f64,
}

/// One step reported by the pedometer's incremental stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepEvent {
    pub timestamp: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accel_magnitude() {
        let accel = AccelData::new(3.0, 4.0, 0.0, 0.0);
        assert_eq!(accel.magnitude(), 5.0);
    }

    #[test]
    fn test_accel_magnitude_at_rest_is_zero() {
        let accel = AccelData::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(accel.magnitude(), 0.0);
    }
}
