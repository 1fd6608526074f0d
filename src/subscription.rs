use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::SensorError;
use crate::sensors::SensorPort;
use crate::toggles::SensorKind;

/// A live sensor subscription. Dropping it aborts the sample task and
/// unsubscribes from the port.
pub struct Subscription {
    kind: SensorKind,
    task: JoinHandle<()>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Spawn the subscription in the background and return immediately.
    ///
    /// `on_ready` runs once the port has reported itself available and before
    /// subscribing; `on_sample` runs for every delivered sample. An unavailable
    /// capability or a failed subscribe ends the task quietly with a log line.
    pub fn start<S, P, R, F>(
        runtime: &Handle,
        kind: SensorKind,
        port: Arc<P>,
        interval: Duration,
        on_ready: R,
        mut on_sample: F,
    ) -> Self
    where
        S: Send + 'static,
        P: SensorPort<S> + ?Sized + 'static,
        R: FnOnce() + Send + 'static,
        F: FnMut(S) + Send + 'static,
    {
        let task_port = Arc::clone(&port);
        let task = runtime.spawn(async move {
            if !task_port.is_available() {
                log::info!("[{}] {} unavailable, not subscribing", kind, task_port.name());
                return;
            }

            on_ready();

            let mut rx = match task_port.subscribe(interval) {
                Ok(rx) => rx,
                Err(SensorError::CapabilityUnavailable(name)) => {
                    log::info!("[{}] {} unavailable, not subscribing", kind, name);
                    return;
                }
                Err(e) => {
                    log::warn!("[{}] {}", kind, e);
                    return;
                }
            };
            log::info!("[{}] subscribed every {:?}", kind, interval);

            while let Some(sample) = rx.recv().await {
                on_sample(sample);
            }
            log::debug!("[{}] sample stream ended", kind);
        });

        Subscription {
            kind,
            task,
            release: Some(Box::new(move || port.unsubscribe())),
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// True while the sample task is still running.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
        if let Some(release) = self.release.take() {
            release();
        }
        log::debug!("[{}] subscription released", self.kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{ChannelPort, UnavailablePort};
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_start_delivers_and_stop_releases() {
        let port = Arc::new(ChannelPort::<f64>::new("barometer"));
        let received = Arc::new(AtomicUsize::new(0));
        let ready = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&received);
        let ready_flag = Arc::clone(&ready);
        let sub = Subscription::start(
            &Handle::current(),
            SensorKind::Barometer,
            Arc::clone(&port),
            Duration::from_secs(60),
            move || {
                ready_flag.fetch_add(1, Ordering::SeqCst);
            },
            move |_sample: f64| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        settle().await;
        assert_eq!(sub.kind(), SensorKind::Barometer);
        assert!(sub.is_active());
        assert!(port.is_subscribed());
        assert_eq!(ready.load(Ordering::SeqCst), 1);

        port.emit(1012.0);
        port.emit(1013.0);
        settle().await;
        assert_eq!(received.load(Ordering::SeqCst), 2);

        sub.stop();
        assert!(!port.is_subscribed());
    }

    #[tokio::test]
    async fn test_unavailable_port_finishes_quietly() {
        let port = Arc::new(UnavailablePort::<f64>::new("barometer"));
        let ready = Arc::new(AtomicUsize::new(0));
        let ready_flag = Arc::clone(&ready);

        let sub = Subscription::start(
            &Handle::current(),
            SensorKind::Barometer,
            port,
            Duration::from_secs(60),
            move || {
                ready_flag.fetch_add(1, Ordering::SeqCst);
            },
            |_sample: f64| {},
        );
        settle().await;
        assert!(!sub.is_active());
        assert_eq!(ready.load(Ordering::SeqCst), 0);
    }
}
