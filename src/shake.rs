use std::sync::Arc;

/// Callback fired on a debounced shake.
pub type ShakeCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Magnitude threshold with a cooldown between triggers.
pub struct ShakeDetector {
    threshold: f64,
    cooldown_ms: u64,
    last_trigger_ms: Option<u64>,
}

impl ShakeDetector {
    pub fn new(threshold: f64, cooldown_ms: u64) -> Self {
        Self {
            threshold,
            cooldown_ms,
            last_trigger_ms: None,
        }
    }

    /// Returns true when this sample should fire the shake callback.
    pub fn detect(&mut self, magnitude: f64, now_ms: u64) -> bool {
        if magnitude <= self.threshold || magnitude.is_nan() {
            return false;
        }
        let cooled = match self.last_trigger_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > self.cooldown_ms,
        };
        if cooled {
            self.last_trigger_ms = Some(now_ms);
        }
        cooled
    }

    pub fn reset(&mut self) {
        self.last_trigger_ms = None;
    }
}
