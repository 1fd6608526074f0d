use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration, Instant};

use discovery_engine_rs::live_status::current_timestamp;
use discovery_engine_rs::{
    AccelData, BaroData, DiscoveryEngine, JsonFileStore, LightData, LocationMarker, MagData,
    Pedometer, PollingPort, SamplingConfig, SensorKind, SensorPorts, StepEvent, SystemClock,
};

#[derive(Parser, Debug)]
#[command(name = "discovery_engine")]
#[command(about = "Adaptive discovery engine running on simulated sensors", long_about = None)]
struct Args {
    /// Duration in seconds (0 = until Ctrl-C)
    #[arg(value_name = "SECONDS", default_value = "0")]
    duration: u64,

    /// Durable state file
    #[arg(long, default_value = "discovery_state.json")]
    store: PathBuf,

    /// Sampling config (JSON); defaults apply to missing fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sensors to switch on (step_counter, motion, shake, barometer, compass, ambient_light)
    #[arg(long, value_delimiter = ',')]
    enable: Vec<SensorKind>,

    /// Sensors to switch off
    #[arg(long, value_delimiter = ',')]
    disable: Vec<SensorKind>,

    /// Record a visit, as id:lat:lon (repeatable)
    #[arg(long, value_parser = parse_marker)]
    visit: Vec<LocationMarker>,

    /// Simulate a device without a barometer
    #[arg(long)]
    no_barometer: bool,

    /// Status snapshot output
    #[arg(long, default_value = "discovery_status.json")]
    status_file: String,
}

fn parse_marker(s: &str) -> Result<LocationMarker, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let [id, lat, lon] = parts.as_slice() else {
        return Err(format!("expected id:lat:lon, got '{}'", s));
    };
    let latitude = lat.parse::<f64>().map_err(|e| format!("bad latitude: {}", e))?;
    let longitude = lon.parse::<f64>().map_err(|e| format!("bad longitude: {}", e))?;
    Ok(LocationMarker::new(*id, latitude, longitude))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SamplingConfig::from_json_file(path)?,
        None => SamplingConfig::default(),
    };

    println!("[{}] Discovery Engine Starting", ts_now());
    println!("  Duration: {} seconds (0=continuous)", args.duration);
    let store = Arc::new(JsonFileStore::open(&args.store));
    println!("  Store: {}", store.path().display());
    println!("  Barometer: {}", if args.no_barometer { "absent" } else { "simulated" });

    let engine = DiscoveryEngine::load(
        store,
        simulated_ports(args.no_barometer),
        Arc::new(SystemClock::new()),
        config,
    );

    engine.register_shake_handler(|| println!("[{}] Shake detected", ts_now()));

    for kind in &args.enable {
        engine.set_enabled(*kind, true);
    }
    for kind in &args.disable {
        engine.set_enabled(*kind, false);
    }
    for marker in args.visit {
        let progress = engine.record_visit(marker);
        println!(
            "[{}] Visit recorded: {} locations, {:.1}% coverage",
            ts_now(),
            progress.locations_visited.len(),
            progress.coverage_percent
        );
    }

    let start = Instant::now();
    let mut last_status_update = Instant::now();

    loop {
        if args.duration > 0 && start.elapsed() >= Duration::from_secs(args.duration) {
            println!("[{}] Duration reached, stopping...", ts_now());
            break;
        }

        if last_status_update.elapsed() >= Duration::from_secs(2) {
            let snapshot = engine.snapshot();
            println!(
                "[{}] {} | radius {} m | {} ({:?} hPa) | {:.0}° {} | {} steps",
                ts_now(),
                snapshot.current_activity,
                snapshot.proximity_radius_meters,
                snapshot.weather_condition,
                snapshot.atmospheric_pressure_hpa,
                snapshot.compass_heading_degrees,
                snapshot.compass_cardinal,
                snapshot.daily_steps
            );
            if let Err(e) = snapshot.save(&args.status_file) {
                log::warn!("status write failed: {}", e);
            }
            last_status_update = Instant::now();
        }

        tokio::select! {
            _ = sleep(Duration::from_millis(100)) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("[{}] Interrupted, stopping...", ts_now());
                break;
            }
        }
    }

    engine.shutdown();
    let snapshot = engine.snapshot();
    snapshot.save(&args.status_file)?;

    println!("\n=== Final Stats ===");
    println!("Daily steps: {} ({:.1} m)", snapshot.daily_steps, snapshot.step_distance_meters);
    println!("Activity: {}", snapshot.current_activity);
    println!("Weather: {} (trend {:?})", snapshot.weather_condition, snapshot.pressure_trend);
    println!(
        "Exploration: {} visits, {:.1}% coverage",
        snapshot.exploration.locations_visited.len(),
        snapshot.exploration.coverage_percent
    );

    Ok(())
}

fn simulated_ports(no_barometer: bool) -> SensorPorts {
    let barometer: PollingPort<BaroData> = if no_barometer {
        PollingPort::unavailable("barometer")
    } else {
        PollingPort::new("barometer", || Some(mock_baro_data()))
    };
    let steps = PollingPort::new("pedometer", || {
        Some(StepEvent {
            timestamp: current_timestamp(),
        })
    });

    SensorPorts {
        motion: Arc::new(PollingPort::new("accelerometer", || Some(mock_accel_data()))),
        shake: Arc::new(PollingPort::new("accelerometer", || Some(mock_accel_data()))),
        pedometer: Arc::new(Pedometer::new(steps, || Ok(0))),
        barometer: Arc::new(barometer),
        magnetometer: Arc::new(PollingPort::new("magnetometer", || Some(mock_mag_data()))),
        ambient_light: Arc::new(PollingPort::new("light", || Some(mock_light_data()))),
    }
}

fn mock_accel_data() -> AccelData {
    use std::f64::consts::PI;
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let t = COUNTER.fetch_add(1, Ordering::Relaxed) as f64 * 0.05;

    // Slow swell through every activity band, with the odd jolt
    let level = 1.8 + 1.7 * (t * 0.2 * PI).sin();
    let jolt = if (t * 10.0) as u64 % 97 == 0 { 2.0 } else { 0.0 };
    AccelData::new(level * 0.8 + jolt, level * 0.6, (t * PI).sin() * 0.05, current_timestamp())
}

fn mock_baro_data() -> BaroData {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed) as f64;

    BaroData {
        timestamp: current_timestamp(),
        pressure_hpa: 1012.0 + (seq * 0.3).sin() * 14.0,
    }
}

fn mock_mag_data() -> MagData {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let heading = (COUNTER.fetch_add(1, Ordering::Relaxed) as f64 * 3.0).to_radians();

    MagData {
        timestamp: current_timestamp(),
        x: heading.cos() * 40.0,
        y: heading.sin() * 40.0,
        z: -12.0,
    }
}

fn mock_light_data() -> LightData {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed) as f64;

    LightData {
        timestamp: current_timestamp(),
        lux: 250.0 + (seq * 0.1).sin() * 200.0,
    }
}

fn ts_now() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}
