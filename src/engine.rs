//! Discovery engine: feature toggles, durable counters, and the read surface.
//!
//! [`DiscoveryEngine`] owns every piece of state. Each enabled sensor runs as
//! one [`Subscription`] whose samples are applied to the shared state; the UI
//! layer only reads derived values and calls the two external mutators
//! ([`DiscoveryEngine::record_visit`] and
//! [`DiscoveryEngine::register_shake_handler`]).
//!
//! Failures never reach callers. A missing sensor leaves its values at their
//! defaults, a failed read loads the default, a failed write leaves memory
//! authoritative until the next load.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;

use crate::activity::{classify, ActivityState};
use crate::clock::Clock;
use crate::compass::{normalize, CompassReading};
use crate::config::SamplingConfig;
use crate::error::SensorError;
use crate::exploration::{ExplorationProgress, LocationMarker};
use crate::live_status::{current_timestamp, DiscoverySnapshot};
use crate::proximity::radius_for;
use crate::sensors::{PedometerPort, SensorPort, UnavailablePort};
use crate::shake::{ShakeCallback, ShakeDetector};
use crate::steps::DailyStepCounter;
use crate::store::{self, KeyValueStore, DAILY_STEPS_KEY, EXPLORATION_KEY, LAST_RESET_DATE_KEY};
use crate::subscription::Subscription;
use crate::toggles::{SensorKind, SensorToggles};
use crate::types::{AccelData, BaroData, LightData, MagData, StepEvent};
use crate::weather::{PressureEntry, PressureHistory, PressureTrend, WeatherCondition};

/// The six capability ports the engine subscribes to.
#[derive(Clone)]
pub struct SensorPorts {
    pub motion: Arc<dyn SensorPort<AccelData>>,
    pub shake: Arc<dyn SensorPort<AccelData>>,
    pub pedometer: Arc<dyn PedometerPort>,
    pub barometer: Arc<dyn SensorPort<BaroData>>,
    pub magnetometer: Arc<dyn SensorPort<MagData>>,
    pub ambient_light: Arc<dyn SensorPort<LightData>>,
}

impl SensorPorts {
    /// A device with no sensors at all.
    pub fn unavailable() -> Self {
        Self {
            motion: Arc::new(UnavailablePort::new("accelerometer")),
            shake: Arc::new(UnavailablePort::new("accelerometer")),
            pedometer: Arc::new(UnavailablePort::<StepEvent>::new("pedometer")),
            barometer: Arc::new(UnavailablePort::new("barometer")),
            magnetometer: Arc::new(UnavailablePort::new("magnetometer")),
            ambient_light: Arc::new(UnavailablePort::new("light")),
        }
    }
}

struct EngineState {
    toggles: SensorToggles,
    activity: ActivityState,
    proximity_radius: u32,
    pressure_history: PressureHistory,
    compass: CompassReading,
    ambient_lux: Option<f64>,
    steps: DailyStepCounter,
    exploration: ExplorationProgress,
    shake: ShakeDetector,
}

impl EngineState {
    fn pressure_hpa(&self) -> Option<f64> {
        self.pressure_history.latest().map(|entry| entry.pressure)
    }

    /// Condition of the latest pressure sample, `Normal` before the first one.
    fn weather(&self) -> WeatherCondition {
        self.pressure_history
            .latest()
            .map(|entry| entry.condition)
            .unwrap_or_default()
    }
}

/// State shared between the engine and its subscription tasks.
struct Shared {
    state: Mutex<EngineState>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    shake_handler: Mutex<Option<ShakeCallback>>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_motion(&self, sample: &AccelData) {
        let mut state = self.state();
        if !state.toggles.motion {
            return;
        }
        let activity = classify(sample.magnitude());
        if activity != state.activity {
            log::debug!("[motion] {} -> {}", state.activity, activity);
        }
        state.activity = activity;
        state.proximity_radius = radius_for(activity);
    }

    fn apply_shake(&self, sample: &AccelData) {
        let fired = {
            let mut state = self.state();
            state.toggles.shake && state.shake.detect(sample.magnitude(), self.clock.now_ms())
        };
        if !fired {
            return;
        }
        log::debug!("[shake] magnitude {:.2}", sample.magnitude());
        let handler = self
            .shake_handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(handler) = handler {
            handler();
        }
    }

    fn apply_pressure(&self, sample: &BaroData) {
        let mut state = self.state();
        if !state.toggles.barometer {
            return;
        }
        let previous = state.weather();
        let condition = state
            .pressure_history
            .record(sample.pressure_hpa, sample.timestamp);
        if condition != previous {
            log::debug!("[barometer] {} -> {}", previous, condition);
        }
    }

    fn apply_heading(&self, sample: &MagData) {
        let mut state = self.state();
        if state.toggles.compass {
            state.compass = normalize(sample.x, sample.y);
        }
    }

    fn apply_light(&self, sample: &LightData) {
        let mut state = self.state();
        if state.toggles.ambient_light {
            state.ambient_lux = Some(sample.lux);
        }
    }

    fn apply_step_baseline(&self, steps: u32) {
        let mut state = self.state();
        if !state.toggles.step_counter {
            return;
        }
        state.steps.set_baseline(steps);
        log::info!("[steps] baseline {} steps since midnight", steps);
        store::save(self.store.as_ref(), DAILY_STEPS_KEY, &steps);
    }

    fn apply_step(&self) {
        let mut state = self.state();
        if !state.toggles.step_counter {
            return;
        }
        let total = state.steps.increment();
        // Written under the state lock so the store never sees an older total last
        store::save(self.store.as_ref(), DAILY_STEPS_KEY, &total);
    }

    fn reset_if_new_day(&self) -> bool {
        let today = self.clock.today();
        let mut state = self.state();
        let previous = state.steps.last_reset_date;
        if !state.steps.reset_if_new_day(today) {
            return false;
        }
        log::info!("[steps] new day {} (was {}), counter reset", today, previous);
        store::save(self.store.as_ref(), DAILY_STEPS_KEY, &state.steps.steps);
        store::save(self.store.as_ref(), LAST_RESET_DATE_KEY, &state.steps.last_reset_date);
        true
    }

    /// Return a disabled sensor's transient values to their defaults.
    fn clear_derived(&self, kind: SensorKind) {
        let mut state = self.state();
        match kind {
            SensorKind::Motion => {
                state.activity = ActivityState::Stationary;
                state.proximity_radius = radius_for(ActivityState::Stationary);
            }
            SensorKind::Shake => state.shake.reset(),
            SensorKind::Barometer => state.pressure_history.clear(),
            SensorKind::Compass => state.compass = CompassReading::default(),
            SensorKind::AmbientLight => state.ambient_lux = None,
            SensorKind::StepCounter => {}
        }
    }
}

pub struct DiscoveryEngine {
    shared: Arc<Shared>,
    ports: SensorPorts,
    config: SamplingConfig,
    runtime: Option<Handle>,
    subscriptions: Mutex<HashMap<SensorKind, Subscription>>,
}

impl DiscoveryEngine {
    /// Load persisted flags and counters, roll the step counter over if the
    /// day changed, and subscribe every enabled sensor.
    ///
    /// Subscriptions are spawned on the caller's Tokio runtime. Without one the
    /// flags still load, but every sensor is logged as a failed subscription.
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        ports: SensorPorts,
        clock: Arc<dyn Clock>,
        config: SamplingConfig,
    ) -> Self {
        let mut toggles = SensorToggles::default();
        for kind in SensorKind::ALL {
            toggles.set(kind, store::load_or_default(store.as_ref(), kind.store_key()));
        }

        let today = clock.today();
        let steps: u32 = store::load_or_default(store.as_ref(), DAILY_STEPS_KEY);
        let stored_date: Option<NaiveDate> = store::load(store.as_ref(), LAST_RESET_DATE_KEY);
        if stored_date.is_none() {
            store::save(store.as_ref(), LAST_RESET_DATE_KEY, &today);
        }
        let exploration: ExplorationProgress =
            store::load_or_default(store.as_ref(), EXPLORATION_KEY);

        let state = EngineState {
            toggles,
            activity: ActivityState::Stationary,
            proximity_radius: radius_for(ActivityState::Stationary),
            pressure_history: PressureHistory::new(),
            compass: CompassReading::default(),
            ambient_lux: None,
            steps: DailyStepCounter {
                steps,
                ..DailyStepCounter::new(stored_date.unwrap_or(today))
            },
            exploration,
            shake: ShakeDetector::new(config.shake_threshold, config.shake_cooldown_ms),
        };

        let engine = Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                store,
                clock,
                shake_handler: Mutex::new(None),
            }),
            ports,
            config,
            runtime: Handle::try_current().ok(),
            subscriptions: Mutex::new(HashMap::new()),
        };

        engine.shared.reset_if_new_day();

        let enabled = toggles.enabled();
        let (steps_today, visits) = {
            let state = engine.shared.state();
            (state.steps.steps, state.exploration.locations_visited.len())
        };
        log::info!(
            "[engine] loaded: enabled {:?}, {} steps today, {} visits",
            enabled,
            steps_today,
            visits
        );
        for kind in enabled {
            engine.start(kind);
        }
        engine
    }

    // ── Toggles ──

    pub fn is_enabled(&self, kind: SensorKind) -> bool {
        self.shared.state().toggles.get(kind)
    }

    pub fn toggles(&self) -> SensorToggles {
        self.shared.state().toggles
    }

    /// Flip a feature, persist the flag, and start or tear down its sensor.
    pub fn set_enabled(&self, kind: SensorKind, enabled: bool) {
        self.shared.state().toggles.set(kind, enabled);
        store::save(self.shared.store.as_ref(), kind.store_key(), &enabled);

        if enabled {
            self.start(kind);
        } else {
            self.stop(kind);
            self.shared.clear_derived(kind);
        }
    }

    fn subscriptions(&self) -> MutexGuard<'_, HashMap<SensorKind, Subscription>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn start(&self, kind: SensorKind) {
        let Some(runtime) = &self.runtime else {
            let error = SensorError::SubscriptionFailed {
                sensor: kind.name().to_string(),
                reason: "no Tokio runtime".to_string(),
            };
            log::warn!("[{}] {}", kind, error);
            return;
        };

        let mut subscriptions = self.subscriptions();
        if subscriptions.get(&kind).is_some_and(Subscription::is_active) {
            return;
        }
        // A finished task is replaced so the port is asked again
        if let Some(finished) = subscriptions.remove(&kind) {
            log::debug!("[{}] previous subscription ended, resubscribing", kind);
            finished.stop();
        }
        subscriptions.insert(kind, self.spawn(runtime, kind));
    }

    fn stop(&self, kind: SensorKind) {
        // Release outside the map lock
        let removed = self.subscriptions().remove(&kind);
        if let Some(subscription) = removed {
            subscription.stop();
        }
    }

    fn spawn(&self, runtime: &Handle, kind: SensorKind) -> Subscription {
        let interval = self.config.interval_for(kind);
        let shared = Arc::clone(&self.shared);

        match kind {
            SensorKind::Motion => Subscription::start(
                runtime,
                kind,
                Arc::clone(&self.ports.motion),
                interval,
                || {},
                move |sample: AccelData| shared.apply_motion(&sample),
            ),
            SensorKind::Shake => Subscription::start(
                runtime,
                kind,
                Arc::clone(&self.ports.shake),
                interval,
                || {},
                move |sample: AccelData| shared.apply_shake(&sample),
            ),
            SensorKind::Barometer => Subscription::start(
                runtime,
                kind,
                Arc::clone(&self.ports.barometer),
                interval,
                || {},
                move |sample: BaroData| shared.apply_pressure(&sample),
            ),
            SensorKind::Compass => Subscription::start(
                runtime,
                kind,
                Arc::clone(&self.ports.magnetometer),
                interval,
                || {},
                move |sample: MagData| shared.apply_heading(&sample),
            ),
            SensorKind::AmbientLight => Subscription::start(
                runtime,
                kind,
                Arc::clone(&self.ports.ambient_light),
                interval,
                || {},
                move |sample: LightData| shared.apply_light(&sample),
            ),
            SensorKind::StepCounter => {
                let pedometer = Arc::clone(&self.ports.pedometer);
                let baseline_port = Arc::clone(&pedometer);
                let baseline_shared = Arc::clone(&shared);
                Subscription::start(
                    runtime,
                    kind,
                    pedometer,
                    interval,
                    move || match baseline_port.steps_since_midnight() {
                        Ok(steps) => baseline_shared.apply_step_baseline(steps),
                        Err(e) => log::warn!("[steps] baseline query failed: {}", e),
                    },
                    move |_event: StepEvent| shared.apply_step(),
                )
            }
        }
    }

    /// Sensors whose sample task is still running.
    pub fn active_subscriptions(&self) -> Vec<SensorKind> {
        let mut kinds: Vec<SensorKind> = self
            .subscriptions()
            .values()
            .filter(|s| s.is_active())
            .map(|s| s.kind())
            .collect();
        kinds.sort();
        kinds
    }

    /// Release every sensor subscription. Toggle flags are left as persisted.
    pub fn shutdown(&self) {
        let drained: Vec<Subscription> = self.subscriptions().drain().map(|(_, s)| s).collect();
        if !drained.is_empty() {
            log::info!("[engine] releasing {} subscriptions", drained.len());
        }
        drop(drained);
    }

    // ── Read surface ──

    pub fn daily_steps(&self) -> u32 {
        self.shared.state().steps.steps
    }

    pub fn step_distance_meters(&self) -> f64 {
        self.shared.state().steps.distance_meters()
    }

    pub fn current_activity(&self) -> ActivityState {
        self.shared.state().activity
    }

    pub fn proximity_radius_meters(&self) -> u32 {
        self.shared.state().proximity_radius
    }

    pub fn atmospheric_pressure_hpa(&self) -> Option<f64> {
        self.shared.state().pressure_hpa()
    }

    pub fn weather_condition(&self) -> WeatherCondition {
        self.shared.state().weather()
    }

    pub fn pressure_trend(&self) -> PressureTrend {
        self.shared.state().pressure_history.trend()
    }

    pub fn pressure_history(&self) -> Vec<PressureEntry> {
        self.shared.state().pressure_history.entries().cloned().collect()
    }

    pub fn compass_heading_degrees(&self) -> f64 {
        self.shared.state().compass.heading_degrees
    }

    pub fn compass_cardinal(&self) -> &'static str {
        self.shared.state().compass.cardinal()
    }

    pub fn ambient_light_lux(&self) -> Option<f64> {
        self.shared.state().ambient_lux
    }

    pub fn exploration_progress(&self) -> ExplorationProgress {
        self.shared.state().exploration.clone()
    }

    pub fn snapshot(&self) -> DiscoverySnapshot {
        let active_subscriptions = self.active_subscriptions();
        let state = self.shared.state();
        DiscoverySnapshot {
            timestamp: current_timestamp(),
            toggles: state.toggles,
            active_subscriptions,
            daily_steps: state.steps.steps,
            step_distance_meters: state.steps.distance_meters(),
            current_activity: state.activity,
            proximity_radius_meters: state.proximity_radius,
            atmospheric_pressure_hpa: state.pressure_hpa(),
            weather_condition: state.weather(),
            pressure_trend: state.pressure_history.trend(),
            pressure_samples: state.pressure_history.len(),
            compass_heading_degrees: state.compass.heading_degrees,
            compass_cardinal: state.compass.cardinal().to_string(),
            ambient_light_lux: state.ambient_lux,
            exploration: state.exploration.clone(),
        }
    }

    // ── External mutators ──

    /// Append a visited place and persist the updated progress.
    pub fn record_visit(&self, marker: LocationMarker) -> ExplorationProgress {
        let mut state = self.shared.state();
        let steps = state.steps.steps;
        state.exploration.record_visit(marker, steps);
        store::save(self.shared.store.as_ref(), EXPLORATION_KEY, &state.exploration);
        log::debug!(
            "[exploration] {} visits, {:.1}% coverage",
            state.exploration.locations_visited.len(),
            state.exploration.coverage_percent
        );
        state.exploration.clone()
    }

    /// Install the shake callback, replacing any previous one.
    pub fn register_shake_handler(&self, handler: impl Fn() + Send + Sync + 'static) {
        let handler: ShakeCallback = Arc::new(handler);
        *self
            .shared
            .shake_handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    /// Zero the daily step counter if the calendar day changed since the last reset.
    pub fn reset_if_new_day(&self) -> bool {
        self.shared.reset_if_new_day()
    }
}

impl Drop for DiscoveryEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
