//! Sensor capability ports.
//!
//! A port is the engine's only view of a hardware sensor: it reports whether
//! the capability exists and hands out a sample stream on subscribe. Drivers
//! live on the host side; [`ChannelPort`] lets the host push samples in and
//! [`PollingPort`] samples a reader closure on a fixed interval.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::error::{SensorError, SensorResult};
use crate::types::StepEvent;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

pub trait SensorPort<S>: Send + Sync {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool;

    /// Start delivering samples. Re-subscribing replaces the previous stream.
    fn subscribe(&self, interval: Duration) -> SensorResult<Receiver<S>>;

    /// Stop delivering samples. Safe to call when not subscribed.
    fn unsubscribe(&self);
}

/// Pedometer: an incremental step stream plus a one-shot baseline query.
pub trait PedometerPort: SensorPort<StepEvent> {
    fn steps_since_midnight(&self) -> SensorResult<u32>;
}

// ─── Host-pushed samples ─────────────────────────────────────────────────────

pub struct ChannelPort<S> {
    name: String,
    available: AtomicBool,
    sender: Mutex<Option<Sender<S>>>,
}

impl<S> ChannelPort<S> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            available: AtomicBool::new(true),
            sender: Mutex::new(None),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn current_sender(&self) -> Option<Sender<S>> {
        self.sender.lock().ok().and_then(|guard| guard.clone())
    }

    /// Push a sample to the subscriber. Returns false if nobody is listening
    /// or the channel is full (the sample is dropped).
    pub fn emit(&self, sample: S) -> bool {
        match self.current_sender() {
            Some(tx) => tx.try_send(sample).is_ok(),
            None => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.current_sender()
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }

    /// Samples emitted but not yet received by the subscriber.
    pub fn pending(&self) -> usize {
        self.current_sender()
            .map(|tx| tx.max_capacity() - tx.capacity())
            .unwrap_or(0)
    }
}

impl<S: Send> SensorPort<S> for ChannelPort<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn subscribe(&self, _interval: Duration) -> SensorResult<Receiver<S>> {
        if !self.is_available() {
            return Err(SensorError::CapabilityUnavailable(self.name.clone()));
        }
        let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
        let mut guard = self.sender.lock().map_err(|_| SensorError::SubscriptionFailed {
            sensor: self.name.clone(),
            reason: "sender lock poisoned".to_string(),
        })?;
        *guard = Some(tx);
        Ok(rx)
    }

    fn unsubscribe(&self) {
        if let Ok(mut guard) = self.sender.lock() {
            guard.take();
        }
    }
}

// ─── Interval polling ────────────────────────────────────────────────────────

pub type SampleReader<S> = Arc<dyn Fn() -> Option<S> + Send + Sync>;

/// Calls `reader` once per interval tick and forwards whatever it returns.
pub struct PollingPort<S> {
    name: String,
    available: bool,
    reader: SampleReader<S>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<S: Send + 'static> PollingPort<S> {
    pub fn new(name: &str, reader: impl Fn() -> Option<S> + Send + Sync + 'static) -> Self {
        Self {
            name: name.to_string(),
            available: true,
            reader: Arc::new(reader),
            task: Mutex::new(None),
        }
    }

    pub fn unavailable(name: &str) -> Self {
        Self {
            name: name.to_string(),
            available: false,
            reader: Arc::new(|| None),
            task: Mutex::new(None),
        }
    }

    fn stop_task(&self) {
        if let Ok(mut guard) = self.task.lock() {
            if let Some(task) = guard.take() {
                task.abort();
            }
        }
    }
}

impl<S: Send + 'static> SensorPort<S> for PollingPort<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn subscribe(&self, period: Duration) -> SensorResult<Receiver<S>> {
        if !self.available {
            return Err(SensorError::CapabilityUnavailable(self.name.clone()));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            SensorError::SubscriptionFailed {
                sensor: self.name.clone(),
                reason: e.to_string(),
            }
        })?;

        self.stop_task();
        let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
        let handle = runtime.spawn(poll_loop(
            self.name.clone(),
            Arc::clone(&self.reader),
            tx,
            period,
        ));
        if let Ok(mut guard) = self.task.lock() {
            *guard = Some(handle);
        }
        Ok(rx)
    }

    fn unsubscribe(&self) {
        self.stop_task();
    }
}

async fn poll_loop<S>(name: String, reader: SampleReader<S>, tx: Sender<S>, period: Duration) {
    // interval() panics on a zero period
    let mut ticker = interval(period.max(Duration::from_millis(1)));
    let mut sample_count = 0u64;

    loop {
        ticker.tick().await;

        let Some(sample) = reader() else {
            continue;
        };

        match tx.try_send(sample) {
            Ok(_) => {
                sample_count += 1;
                if sample_count % 100 == 0 {
                    log::debug!("[{}] {} samples", name, sample_count);
                }
            }
            Err(TrySendError::Closed(_)) => {
                log::debug!("[{}] channel closed after {} samples", name, sample_count);
                break;
            }
            Err(TrySendError::Full(_)) => {
                // Channel full, drop this sample
            }
        }
    }
}

// ─── Pedometer ───────────────────────────────────────────────────────────────

pub type BaselineQuery = Box<dyn Fn() -> SensorResult<u32> + Send + Sync>;

/// Any step-event port paired with a steps-since-midnight query.
pub struct Pedometer<P> {
    events: P,
    baseline: BaselineQuery,
}

impl<P> Pedometer<P> {
    pub fn new(events: P, baseline: impl Fn() -> SensorResult<u32> + Send + Sync + 'static) -> Self {
        Self {
            events,
            baseline: Box::new(baseline),
        }
    }

    pub fn events(&self) -> &P {
        &self.events
    }
}

impl<P: SensorPort<StepEvent>> SensorPort<StepEvent> for Pedometer<P> {
    fn name(&self) -> &str {
        self.events.name()
    }

    fn is_available(&self) -> bool {
        self.events.is_available()
    }

    fn subscribe(&self, interval: Duration) -> SensorResult<Receiver<StepEvent>> {
        self.events.subscribe(interval)
    }

    fn unsubscribe(&self) {
        self.events.unsubscribe()
    }
}

impl<P: SensorPort<StepEvent>> PedometerPort for Pedometer<P> {
    fn steps_since_midnight(&self) -> SensorResult<u32> {
        (self.baseline)()
    }
}

// ─── Missing capability ──────────────────────────────────────────────────────

/// A sensor the platform does not have.
pub struct UnavailablePort<S> {
    name: String,
    _sample: PhantomData<fn() -> S>,
}

impl<S> UnavailablePort<S> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            _sample: PhantomData,
        }
    }
}

impl<S> SensorPort<S> for UnavailablePort<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        false
    }

    fn subscribe(&self, _interval: Duration) -> SensorResult<Receiver<S>> {
        Err(SensorError::CapabilityUnavailable(self.name.clone()))
    }

    fn unsubscribe(&self) {}
}

impl PedometerPort for UnavailablePort<StepEvent> {
    fn steps_since_midnight(&self) -> SensorResult<u32> {
        Err(SensorError::CapabilityUnavailable(self.name.clone()))
    }
}
