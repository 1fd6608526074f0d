use serde::{Deserialize, Serialize};

const CARDINALS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompassReading {
    /// Always in `[0, 360)`.
    pub heading_degrees: f64,
}

impl CompassReading {
    pub fn cardinal(&self) -> &'static str {
        cardinal(self.heading_degrees)
    }
}

/// Heading from the horizontal magnetometer components.
///
/// Axis convention: `heading = atan2(y, x)`, so `(1, 0)` reads 0° (N) and
/// `(0, 1)` reads 90° (E). A zero vector or non-finite input reads 0°.
pub fn normalize(x: f64, y: f64) -> CompassReading {
    if !x.is_finite() || !y.is_finite() || (x == 0.0 && y == 0.0) {
        return CompassReading::default();
    }

    let mut heading = y.atan2(x).to_degrees();
    if heading < 0.0 {
        heading += 360.0;
    }
    // -1e-15 + 360.0 rounds to 360.0
    if heading >= 360.0 {
        heading -= 360.0;
    }

    CompassReading {
        heading_degrees: heading,
    }
}

/// 8-sector label, `round(heading / 45) mod 8`.
pub fn cardinal(heading_degrees: f64) -> &'static str {
    let sector = (heading_degrees / 45.0).round().rem_euclid(8.0);
    // NaN casts to 0
    CARDINALS[sector as usize % 8]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_convention() {
        let north = normalize(1.0, 0.0);
        assert_relative_eq!(north.heading_degrees, 0.0);
        assert_eq!(north.cardinal(), "N");

        let east = normalize(0.0, 1.0);
        assert_relative_eq!(east.heading_degrees, 90.0);
        assert_eq!(east.cardinal(), "E");

        let south = normalize(-1.0, 0.0);
        assert_relative_eq!(south.heading_degrees, 180.0);
        assert_eq!(south.cardinal(), "S");

        let west = normalize(0.0, -1.0);
        assert_relative_eq!(west.heading_degrees, 270.0);
        assert_eq!(west.cardinal(), "W");
    }

    #[test]
    fn test_zero_vector_is_not_nan() {
        let reading = normalize(0.0, 0.0);
        assert_eq!(reading.heading_degrees, 0.0);
        assert_eq!(normalize(-0.0, -0.0).heading_degrees, 0.0);
        assert_eq!(normalize(f64::NAN, 1.0).heading_degrees, 0.0);
    }

    #[test]
    fn test_heading_always_in_range() {
        for i in 0..720 {
            let angle = (i as f64 * 0.5).to_radians();
            for r in [1e-9, 0.3, 42.0] {
                let h = normalize(r * angle.cos(), r * angle.sin()).heading_degrees;
                assert!((0.0..360.0).contains(&h), "heading {} out of range", h);
            }
        }
        let tiny = normalize(1.0, -1e-18).heading_degrees;
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_cardinal_sectors() {
        assert_eq!(cardinal(0.0), "N");
        assert_eq!(cardinal(22.4), "N");
        assert_eq!(cardinal(22.5), "NE");
        assert_eq!(cardinal(135.0), "SE");
        assert_eq!(cardinal(225.0), "SW");
        assert_eq!(cardinal(315.0), "NW");
        assert_eq!(cardinal(340.0), "N");
        assert_eq!(cardinal(359.9), "N");
    }
}
