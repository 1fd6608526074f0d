use serde::{Deserialize, Serialize};

/// The six independently toggled sensor features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    StepCounter,
    Motion,
    Shake,
    Barometer,
    Compass,
    AmbientLight,
}

impl SensorKind {
    pub const ALL: [SensorKind; 6] = [
        SensorKind::StepCounter,
        SensorKind::Motion,
        SensorKind::Shake,
        SensorKind::Barometer,
        SensorKind::Compass,
        SensorKind::AmbientLight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::StepCounter => "step_counter",
            SensorKind::Motion => "motion",
            SensorKind::Shake => "shake",
            SensorKind::Barometer => "barometer",
            SensorKind::Compass => "compass",
            SensorKind::AmbientLight => "ambient_light",
        }
    }

    /// Durable key holding this feature's enable flag.
    pub fn store_key(&self) -> &'static str {
        match self {
            SensorKind::StepCounter => "toggle.step_counter",
            SensorKind::Motion => "toggle.motion",
            SensorKind::Shake => "toggle.shake",
            SensorKind::Barometer => "toggle.barometer",
            SensorKind::Compass => "toggle.compass",
            SensorKind::AmbientLight => "toggle.ambient_light",
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SensorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown sensor '{}'", s))
    }
}

/// One enable flag per sensor, all off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorToggles {
    pub step_counter: bool,
    pub motion: bool,
    pub shake: bool,
    pub barometer: bool,
    pub compass: bool,
    pub ambient_light: bool,
}

impl SensorToggles {
    pub fn get(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::StepCounter => self.step_counter,
            SensorKind::Motion => self.motion,
            SensorKind::Shake => self.shake,
            SensorKind::Barometer => self.barometer,
            SensorKind::Compass => self.compass,
            SensorKind::AmbientLight => self.ambient_light,
        }
    }

    pub fn set(&mut self, kind: SensorKind, enabled: bool) {
        let slot = match kind {
            SensorKind::StepCounter => &mut self.step_counter,
            SensorKind::Motion => &mut self.motion,
            SensorKind::Shake => &mut self.shake,
            SensorKind::Barometer => &mut self.barometer,
            SensorKind::Compass => &mut self.compass,
            SensorKind::AmbientLight => &mut self.ambient_light,
        };
        *slot = enabled;
    }

    pub fn enabled(&self) -> Vec<SensorKind> {
        SensorKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.get(*kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_toggles_are_independent() {
        let mut toggles = SensorToggles::default();
        assert!(toggles.enabled().is_empty());

        toggles.set(SensorKind::Compass, true);
        toggles.set(SensorKind::Motion, true);
        toggles.set(SensorKind::Motion, false);

        assert!(toggles.get(SensorKind::Compass));
        assert!(!toggles.get(SensorKind::Motion));
        assert_eq!(toggles.enabled(), vec![SensorKind::Compass]);
    }

    #[test]
    fn test_store_keys_are_distinct() {
        let keys: HashSet<&str> = SensorKind::ALL.iter().map(|k| k.store_key()).collect();
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("ambient_light".parse::<SensorKind>(), Ok(SensorKind::AmbientLight));
        assert!("gyro".parse::<SensorKind>().is_err());
    }
}
