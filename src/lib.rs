// Discovery Engine
// Sensor fusion for adaptive location discovery: classifies raw sensor streams
// into activity, weather, heading and step signals, derives the discovery
// radius, and keeps the daily/lifetime counters durable.

pub mod activity;
pub mod clock;
pub mod compass;
pub mod config;
pub mod engine;
pub mod error;
pub mod exploration;
pub mod live_status;
pub mod proximity;
pub mod sensors;
pub mod shake;
pub mod steps;
pub mod store;
pub mod subscription;
pub mod toggles;
pub mod types;
pub mod weather;

pub use activity::{classify, ActivityState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use compass::{normalize, CompassReading};
pub use config::SamplingConfig;
pub use engine::{DiscoveryEngine, SensorPorts};
pub use error::{ConfigError, SensorError, SensorResult, StoreError, StoreResult};
pub use exploration::{ExplorationProgress, LocationMarker};
pub use live_status::DiscoverySnapshot;
pub use proximity::radius_for;
pub use sensors::{ChannelPort, Pedometer, PedometerPort, PollingPort, SensorPort, UnavailablePort};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use toggles::{SensorKind, SensorToggles};
pub use types::{AccelData, BaroData, LightData, MagData, StepEvent};
pub use weather::{infer, PressureTrend, WeatherCondition};
