//! upsmon: UPS status LED monitor.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  SimulatedUps /     ConsoleLeds       LogEventSink           │
//! │  JsonReadings       (IndicatorPort)   (EventSink)            │
//! │  (SensorPort)       JsonConfigFile (ConfigPort)              │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            MonitorService (pure logic)                 │  │
//! │  │  Safety · LedManager · LedResolver                     │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! LED patterns go to stdout, logs to stderr.

use std::io::BufReader;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use embedded_hal::delay::DelayNs;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use upsmon::adapters::{ConsoleLeds, JsonConfigFile, JsonReadings, LogEventSink};
use upsmon::app::ports::{ConfigPort, EventSink, IndicatorPort, SensorPort};
use upsmon::app::service::MonitorService;
use upsmon::config::MonitorConfig;
use upsmon::sensors::{Readings, SimulatedUps};

/// UPS status LED monitor
///
/// Polls battery readings, maps them to the four indicator LEDs and
/// prints each new pattern.
#[derive(Parser)]
#[command(name = "upsmon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,

    /// JSON config file; missing file means defaults
    #[arg(short, long, env = "UPSMON_CONFIG")]
    config: Option<PathBuf>,

    /// Line-delimited JSON readings ("-" for stdin) instead of the simulator
    #[arg(short, long)]
    readings: Option<PathBuf>,

    /// Stop after this many polls
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Simulator: polls between mains on/off toggles
    #[arg(long, default_value_t = 30)]
    ac_period: u32,

    /// Run the LED self-test before monitoring
    #[arg(long, default_value_t = false)]
    self_test: bool,
}

/// Blocking delay on the host clock.
struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── 1. Logging ────────────────────────────────────────────
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("upsmon v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Config (file or defaults) ──────────────────────────
    let config = match &cli.config {
        Some(path) => match JsonConfigFile::new(path).load() {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Config load failed ({}), using defaults", e);
                MonitorConfig::default()
            }
        },
        None => MonitorConfig::default(),
    };

    // ── 3. Adapters + service ─────────────────────────────────
    let mut leds = ConsoleLeds::stdout();
    let mut sink = LogEventSink::new();
    let mut app = MonitorService::new(config);

    if cli.self_test {
        app.self_test(&mut leds, &mut StdDelay);
    }
    app.start(&mut leds, &mut sink);

    // ── 4. Poll loop ──────────────────────────────────────────
    match &cli.readings {
        Some(path) if path.as_os_str() == "-" => {
            let mut src = JsonReadings::new(std::io::stdin().lock());
            run(&mut app, || src.next_readings(), &mut leds, &mut sink, &cli);
        }
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening readings file {}", path.display()))?;
            let mut src = JsonReadings::new(BufReader::new(file));
            run(&mut app, || src.next_readings(), &mut leds, &mut sink, &cli);
        }
        None => {
            let mut src = SimulatedUps::new(cli.ac_period);
            run(&mut app, || Some(src.read_all()), &mut leds, &mut sink, &cli);
        }
    }

    app.stop(&mut leds, &mut sink);
    Ok(())
}

/// Poll until the source runs dry or the tick limit is hit.
///
/// Between polls the indicator is refreshed every `refresh_rate` ms so
/// animated outputs keep blinking.
fn run(
    app: &mut MonitorService,
    next: impl FnMut() -> Option<Readings>,
    leds: &mut impl IndicatorPort,
    sink: &mut impl EventSink,
    cli: &Cli,
) {
    let poll = Duration::from_millis(u64::from(app.config().poll_interval_ms));
    let refresh = Duration::from_millis(u64::from(app.config().timing.refresh_rate_ms.max(1)));
    let epoch = Instant::now();
    info!(
        "Entering poll loop ({} ms, refresh {} ms)",
        poll.as_millis(),
        refresh.as_millis()
    );

    app.run(next, leds, sink, cli.ticks, |leds| {
        let deadline = Instant::now() + poll;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(refresh.min(deadline - now));
            leds.refresh(epoch.elapsed().as_millis() as u32);
        }
    });
}
