//! Touch Guard - Main Entry Point
//!
//! Runs the monitor against the synthetic camera. `demo` walks through a
//! full train-and-run session; the default mode reads commands from stdin.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use touch_guard::constants::{APP_NAME, APP_VERSION};
use touch_guard::logic::capture::{BlockMeanEmbedder, SyntheticCamera};
use touch_guard::logic::events::events;
use touch_guard::logic::response::{CooldownNotifier, LogNotifier, TerminalBell};
use touch_guard::{Monitor, MonitorConfig};

/// Camera intensity while not touching
const SAFE_POSE: f32 = 0.2;
/// Camera intensity while touching
const ALARM_POSE: f32 = 0.8;

#[derive(Parser)]
#[command(name = "touch-guard")]
#[command(about = "Few-shot face-touch detector with debounced alerts")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Synthetic frame width
    #[arg(long, default_value = "32")]
    width: usize,

    /// Synthetic frame height
    #[arg(long, default_value = "24")]
    height: usize,

    /// Per-pixel noise of the synthetic camera
    #[arg(long, default_value = "0.05")]
    noise: f32,

    /// Embedding dimension
    #[arg(long, default_value = "16")]
    blocks: usize,

    /// Alarm confidence threshold (0.0 - 1.0)
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Captures per training round
    #[arg(long)]
    captures: Option<usize>,

    /// Pause between inference cycles (ms)
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Notification cooldown (ms)
    #[arg(long)]
    cooldown_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Read commands from stdin (default)
    Interactive,
    /// Train both labels and run a scripted session
    Demo {
        /// Inference time per phase (ms)
        #[arg(long, default_value = "2000")]
        phase_ms: u64,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    let mut config = MonitorConfig::from_env();
    if let Some(threshold) = args.threshold {
        config.confidence_threshold = threshold;
    }
    if let Some(captures) = args.captures {
        config.training_captures = captures;
    }
    if let Some(poll_ms) = args.poll_ms {
        config.poll_interval_ms = poll_ms;
    }
    if let Some(cooldown_ms) = args.cooldown_ms {
        config.notification_cooldown_ms = cooldown_ms;
    }

    let camera = Arc::new(
        SyntheticCamera::open(args.width, args.height, args.noise).context("Failed to open camera")?,
    );
    camera.set_pose(SAFE_POSE);
    let embedder = Arc::new(BlockMeanEmbedder::new(args.blocks)?);
    let sound = Arc::new(TerminalBell::new(config.sound_duration()));
    let notifier = Arc::new(CooldownNotifier::new(LogNotifier, config.notification_cooldown()));

    let monitor = Monitor::new(config, camera.clone(), embedder, sound, notifier)
        .context("Failed to initialise monitor")?;

    monitor.subscribe(Box::new(|name, event| {
        if name == events::DETECTION_CHANGED {
            if event.detected {
                println!(
                    ">>> TOUCHED! ({:.3}) <<<",
                    event.confidence.unwrap_or_default()
                );
            } else {
                println!("... not touching");
            }
        }
    }));

    match args.command.unwrap_or(Command::Interactive) {
        Command::Demo { phase_ms } => demo(&monitor, &camera, Duration::from_millis(phase_ms)),
        Command::Interactive => interactive(&monitor, &camera),
    }
}

fn demo(monitor: &Monitor, camera: &SyntheticCamera, phase: Duration) -> Result<()> {
    let safe = monitor.config().safe_label.clone();
    let alarm = monitor.config().alarm_label.clone();

    camera.set_pose(SAFE_POSE);
    println!("Don't touch your face - training '{}'", safe);
    train_with_bar(monitor, &safe)?;

    camera.set_pose(ALARM_POSE);
    println!("Touch your face - training '{}'", alarm);
    train_with_bar(monitor, &alarm)?;

    camera.set_pose(SAFE_POSE);
    monitor.run()?;
    thread::sleep(phase);

    camera.set_pose(ALARM_POSE);
    thread::sleep(phase);

    camera.set_pose(SAFE_POSE);
    thread::sleep(phase);

    let cycles = monitor.stop()?;
    println!("Ran {} cycles", cycles);
    println!("{}", serde_json::to_string_pretty(&monitor.status())?);
    Ok(())
}

fn interactive(monitor: &Monitor, camera: &SyntheticCamera) -> Result<()> {
    print_help();
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();

        let outcome = match parts.as_slice() {
            [] => Ok(()),
            ["pose", level] => level
                .parse::<f32>()
                .map(|level| camera.set_pose(level))
                .context("pose expects a number"),
            ["train", label] => train_with_bar(monitor, label).map(|_| ()),
            ["train", label, count] => count
                .parse::<usize>()
                .context("count expects an integer")
                .and_then(|count| {
                    monitor
                        .train_count(label, count)
                        .map(|report| println!("{} examples for '{}'", report.total, report.label))
                        .map_err(Into::into)
                }),
            ["run"] => monitor.run().map_err(Into::into),
            ["stop"] => monitor
                .stop()
                .map(|cycles| println!("Stopped after {} cycles", cycles))
                .map_err(Into::into),
            ["status"] => serde_json::to_string_pretty(&monitor.status())
                .map(|json| println!("{}", json))
                .map_err(Into::into),
            ["help"] => {
                print_help();
                Ok(())
            }
            ["quit"] | ["exit"] => break,
            _ => Err(anyhow::anyhow!("unknown command: {}", line.trim())),
        };

        if let Err(e) = outcome {
            eprintln!("error: {:#}", e);
        }
    }

    monitor.stop()?;
    Ok(())
}

fn train_with_bar(monitor: &Monitor, label: &str) -> Result<()> {
    let report = monitor.train_with_progress(label, monitor.config().training_captures, |done, total| {
        print!("\rTraining '{}': {}/{}", label, done, total);
        let _ = io::stdout().flush();
    })?;
    println!();
    println!("{} examples for '{}'", report.total, report.label);
    Ok(())
}

fn print_help() {
    println!("{} v{}", APP_NAME, APP_VERSION);
    println!("Commands:");
    println!("  pose <level>           move the synthetic subject ({} safe, {} touch)", SAFE_POSE, ALARM_POSE);
    println!("  train <label> [count]  capture examples for a label");
    println!("  run                    start detection");
    println!("  stop                   stop detection");
    println!("  status                 print status as JSON");
    println!("  quit");
}
