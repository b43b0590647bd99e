//! Lava-flow animation for addressable LED strips
//!
//! Runs the lava phase cycle against a host-side strip: a terminal preview by
//! default, or a headless frame counter.
//!
//! Usage: cargo run -p lavaflow-sim -- [OPTIONS]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use lavaflow_thermal_lib::{LavaLamp, LavaStrip, LedStripSink, RandomTargets, RenderSink};
use log::{info, warn};
use signal_hook::consts::{SIGINT, SIGTERM};

mod config;
mod devices;

use config::{Config, LogLevel};
use devices::{HeadlessStrip, Paced, TerminalStrip};

#[derive(Parser, Debug)]
#[command(name = "lavaflow", version)]
#[command(about = "Lava-flow animation for addressable LED strips")]
struct Args {
    /// Clear the LEDs on exit
    #[arg(short, long)]
    clear: bool,

    /// JSON configuration file (defaults to the reference installation)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the random temperature targets
    #[arg(short, long)]
    seed: Option<u64>,

    /// Discard frames instead of drawing them in the terminal
    #[arg(long)]
    headless: bool,

    /// Stop after this many ticks (0 = run until interrupted)
    #[arg(short = 'n', long, default_value = "0")]
    max_ticks: u64,

    /// Override the configured strip brightness (0-255)
    #[arg(short, long)]
    brightness: Option<u8>,

    /// Override the configured log level
    #[arg(short, long, value_enum)]
    log_level: Option<LogLevel>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(brightness) = args.brightness {
        config.max_brightness = brightness;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    env_logger::Builder::new()
        .filter_level(config.log_level.as_level_filter())
        .parse_default_env()
        .init();

    config.validate()?;
    if let Some(path) = &args.config {
        info!("Loaded configuration from {}", path.display());
    }

    info!(
        "Lava display: {} LEDs, brightness {}",
        config.led_count, config.max_brightness
    );
    for (segment, range) in config.segments.ranges().enumerate() {
        info!("Segment {segment} from {} to {}", range.start, range.end);
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&interrupted))
            .with_context(|| format!("Failed to register handler for signal {signal}"))?;
    }
    info!("Press Ctrl-C to quit");
    if !args.clear {
        info!("Use \"-c\" to clear the LEDs on exit");
    }

    let mut targets = match args.seed {
        Some(seed) => RandomTargets::from_seed(seed),
        None => RandomTargets::from_entropy(),
    };
    let mut sink = open_sink(&config, args.headless)?;

    let clock = Instant::now();
    let strip = LavaStrip::new(config.segments.clone());
    let mut lamp = LavaLamp::new(strip, config.phases.clone(), clock.elapsed())?;

    while !interrupted.load(Ordering::Relaxed) {
        lamp.tick(clock.elapsed(), sink.as_mut(), &mut targets)
            .context("Lava tick failed")?;
        if args.max_ticks > 0 && lamp.ticks() >= args.max_ticks {
            break;
        }
    }

    if args.clear {
        if let Err(e) = lamp.blackout(sink.as_mut()) {
            warn!("Failed to clear LEDs: {e}");
        }
    }
    // Restores the terminal and log level before the final log lines
    drop(sink);

    if interrupted.load(Ordering::Relaxed) {
        info!("Interrupted in phase {}", lamp.phase());
    }

    info!(
        "Stopped after {} ticks in phase {}",
        lamp.ticks(),
        lamp.phase()
    );
    Ok(())
}

fn open_sink(config: &Config, headless: bool) -> Result<Box<dyn RenderSink>> {
    let interval = Duration::from_millis(config.frame_interval_ms);
    let sink: Box<dyn RenderSink> = if headless {
        let strip = Paced::new(HeadlessStrip::default(), interval);
        let sink = LedStripSink::new(strip, config.led_count, config.max_brightness);
        info!("Rendering {} pixels headless", sink.pixel_count());
        Box::new(sink)
    } else {
        info!("Rendering {} pixels to the terminal preview", config.led_count);
        let terminal = TerminalStrip::new().context("Failed to open terminal preview")?;
        let strip = Paced::new(terminal, interval);
        Box::new(LedStripSink::new(strip, config.led_count, config.max_brightness))
    };
    Ok(sink)
}
