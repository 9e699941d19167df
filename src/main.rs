//! Lamp Shutter CLI
//!
//! Runs the detector against a synthetic lamp panel (or a real camera with
//! the `camera` feature) and prints verdict changes and captures.

use clap::{Parser, ValueEnum};
use lamp_shutter::{
    capture::{Camera, CameraError, CaptureConfig, FileConfig, MockCamera, MockScene},
    decision::Mode,
    pipeline::{Detector, TickReport},
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Lamp panel OK/NG detector
#[derive(Parser, Debug)]
#[command(name = "lamp-shutter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Operating mode (day, night, inspect)
    #[arg(long, short = 'm', default_value = "day")]
    mode: Mode,

    /// Synthetic panel shown by the mock camera
    #[arg(long, value_enum, default_value_t = SceneArg::Green)]
    scene: SceneArg,

    /// Frames to process; overrides the config file
    #[arg(long, short = 'n')]
    frames: Option<u32>,

    /// Run until interrupted with Ctrl-C
    #[arg(long)]
    continuous: bool,

    /// Use the hardware camera instead of the mock panel
    #[cfg(feature = "camera")]
    #[arg(long)]
    camera: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SceneArg {
    Green,
    Red,
    Blink,
    Dark,
    Mixed,
}

impl SceneArg {
    fn scene(self, fps: u32) -> MockScene {
        match self {
            SceneArg::Green => MockScene::Green,
            SceneArg::Red => MockScene::Red,
            // One second on, one second off
            SceneArg::Blink => MockScene::Blink { half_period: fps },
            SceneArg::Dark => MockScene::Dark,
            SceneArg::Mixed => MockScene::Mixed,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Lamp Shutter v{}", lamp_shutter::VERSION);

    let file_config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let mut detector = match Detector::new(file_config.detector.clone(), args.mode) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Invalid detector configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut camera = match open_camera(&args, &file_config.capture) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to open camera: {}", e);
            std::process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
            warn!("Could not install Ctrl-C handler: {}", e);
        }
    }

    #[cfg(feature = "metrics")]
    let metrics = start_metrics_server(file_config.output.metrics_port);

    let continuous = args.continuous || file_config.output.continuous;
    let frame_limit = args.frames.unwrap_or(file_config.output.frame_count);
    let frame_budget = Duration::from_millis(1000 / u64::from(file_config.capture.fps.max(1)));

    info!(
        mode = %args.mode,
        continuous,
        frames = frame_limit,
        "Processing frames..."
    );

    let mut processed = 0u32;
    while running.load(Ordering::SeqCst) && (continuous || processed < frame_limit) {
        let cycle_start = Instant::now();

        match camera.capture() {
            Ok(frame) => match detector.tick(&frame, frame.timestamp()) {
                Ok(report) => print_report(&report),
                Err(e) => warn!("Frame {}: tick skipped: {}", frame.sequence(), e),
            },
            Err(e) => warn!("Frame capture failed: {}", e),
        }
        processed += 1;

        #[cfg(feature = "metrics")]
        if let Some(state) = &metrics {
            let snapshot = lamp_shutter::metrics::MetricsSnapshot::from_detector(&detector);
            lamp_shutter::metrics::MetricsState::update_blocking(state, &snapshot);
        }

        let elapsed = cycle_start.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
    }

    camera.close();

    let counters = detector.counters();
    info!(
        "Processed {} frames: {} verdict changes, {} auto captures, {} rejected",
        counters.ticks + counters.tick_errors,
        counters.verdict_changes,
        counters.auto_captures,
        counters.tick_errors
    );
    println!("Final verdict: {}", detector.verdict().mark());
}

fn open_camera(args: &Args, config: &CaptureConfig) -> Result<Box<dyn Camera>, CameraError> {
    #[cfg(feature = "camera")]
    if args.camera {
        let mut camera = lamp_shutter::capture::NokhwaCamera::new();
        camera.open(config)?;
        return Ok(Box::new(camera));
    }

    let mut camera = MockCamera::with_scene(args.scene.scene(config.fps));
    camera.open(config)?;
    Ok(Box::new(camera))
}

fn print_report(report: &TickReport) {
    let decision = &report.decision;
    debug!(
        sequence = report.sequence,
        reason = ?decision.reason,
        agreement = decision.agreement,
        "{}",
        report.stats
    );

    if decision.changed {
        println!(
            "frame {:>5}  {:<3}  {}",
            report.sequence,
            decision.verdict.mark(),
            report.stats
        );
    }

    if let Some(request) = &report.capture {
        println!(
            "frame {:>5}  capture {}  [{}]",
            report.sequence,
            request.file_name(),
            request.caption()
        );
    }
}

#[cfg(feature = "metrics")]
fn start_metrics_server(
    port: u16,
) -> Option<Arc<tokio::sync::RwLock<lamp_shutter::metrics::MetricsState>>> {
    use lamp_shutter::metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig};

    if port == 0 {
        return None;
    }

    let registry = match MetricsRegistry::new() {
        Ok(r) => r,
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            return None;
        }
    };
    let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
    let state = server.state();

    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                warn!("Metrics runtime failed to start: {}", e);
                return;
            }
        };
        if let Err(e) = runtime.block_on(server.run()) {
            warn!("Metrics server stopped: {}", e);
        }
    });

    Some(state)
}
