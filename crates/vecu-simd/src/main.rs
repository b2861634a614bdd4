//! vecu-simd - Vehicle ECU network simulator daemon
//!
//! Broadcasts periodic telemetry frames for a simulated vehicle on a
//! SocketCAN interface and answers OBD-II Mode 01 requests on the engine
//! ECU's diagnostic address.
//!
//! # Usage
//!
//! Default interface (vcan0):
//! ```bash
//! ./vecu-simd
//! ```
//!
//! With a config file:
//! ```bash
//! ./vecu-simd --config config/vecu-sim.toml
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};

use vecu_can::{ids, CanBus};
use vecu_sim::broadcast::Broadcaster;
use vecu_sim::config::SimConfig;
use vecu_sim::{cycle, diag, VehicleState};

/// How long to wait for an inbound diagnostic request each iteration.
const RECV_TIMEOUT: Duration = Duration::from_millis(1);

#[derive(Parser, Debug)]
#[command(name = "vecu-simd")]
#[command(about = "Simulated vehicle ECU network on SocketCAN")]
struct Args {
    /// Configuration file path (TOML, or YAML by extension)
    /// If provided, overrides command-line options
    #[arg(short, long)]
    config: Option<String>,

    /// CAN interface name
    #[arg(short, long, default_value = "vcan0")]
    interface: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose {
        "vecu_simd=debug,vecu_sim=debug,vecu_can=debug"
    } else {
        "vecu_simd=info,vecu_sim=info,vecu_can=info"
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = match &args.config {
        Some(path) => {
            info!("Loading config from: {}", path);
            if path.ends_with(".yaml") || path.ends_with(".yml") {
                SimConfig::load_yaml(path).context("failed to load config")?
            } else {
                SimConfig::load(path).context("failed to load config")?
            }
        }
        None => {
            let mut config = SimConfig::default();
            config.interface = args.interface.clone();
            config
        }
    };
    config.validate().context("invalid configuration")?;

    info!("Starting vehicle ECU network simulator");
    info!(
        interface = %config.interface,
        tick_ms = config.tick_ms,
        "Broadcast rates (ms): engine1={} engine2={} trans={} bcm={}",
        config.broadcast.engine1_ms,
        config.broadcast.engine2_ms,
        config.broadcast.trans_ms,
        config.broadcast.bcm_ms,
    );
    info!(
        "OBD-II requests on 0x{:03X}/0x{:03X}, responses on 0x{:03X}",
        ids::OBD_BROADCAST,
        ids::OBD_REQ_ENGINE,
        ids::OBD_RESP_ENGINE
    );

    // Open the bus; failures here are fatal, never retried
    let bus = CanBus::open(&config.interface)
        .with_context(|| format!("failed to open CAN interface '{}'", config.interface))?;

    // Only diagnostic requests are of interest inbound
    bus.set_filters(&[
        (ids::OBD_BROADCAST, vecu_can::MAX_STANDARD_ID),
        (ids::OBD_REQ_ENGINE, vecu_can::MAX_STANDARD_ID),
    ])
    .context("failed to install receive filters")?;

    let running = Arc::new(AtomicBool::new(true));
    let loop_running = running.clone();

    let sim_handle = tokio::task::spawn_blocking(move || run_loop(bus, config, loop_running));

    info!("Simulator running - press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    running.store(false, Ordering::SeqCst);
    let _ = tokio::time::timeout(Duration::from_secs(2), sim_handle).await;

    info!("ECU simulator stopped");
    Ok(())
}

/// The single-threaded simulation loop.
///
/// Per iteration, strictly in order: advance the state, fire due
/// broadcasts, answer at most one diagnostic request, sleep one tick. The
/// state is owned here; the diagnostic answer always reflects this
/// iteration's snapshot.
fn run_loop(bus: CanBus, config: SimConfig, running: Arc<AtomicBool>) {
    let mut state = VehicleState::default();
    let mut caster = Broadcaster::new(&config.broadcast, Instant::now());
    let dt = config.tick_ms as f64 / 1000.0;
    let tick = Duration::from_millis(config.tick_ms);

    while running.load(Ordering::SeqCst) {
        cycle::advance(&mut state, dt);

        let now = Instant::now();
        for frame in caster.poll(now, &state) {
            if let Err(e) = bus.send(&frame) {
                warn!(
                    id = format!("0x{:03X}", frame.id()),
                    error = %e,
                    "Failed to send broadcast frame"
                );
            }
        }

        match bus.recv_timeout(RECV_TIMEOUT) {
            Ok(Some(frame)) => {
                if let Some(response) = diag::handle_frame(&frame, &state) {
                    debug!(
                        request = ?frame.data(),
                        response = ?response.data(),
                        "Answered diagnostic request"
                    );
                    if let Err(e) = bus.send(&response) {
                        warn!(error = %e, "Failed to send diagnostic response");
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "CAN receive error");
                thread::sleep(Duration::from_millis(100));
            }
        }

        thread::sleep(tick);
    }

    debug!("Simulation loop stopped");
}
