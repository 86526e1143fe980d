//! servoboard - drive a 16-servo controller board from the command line
//!
//! Connects to the board, optionally sets goals and enables servos, and logs
//! everything the board reports until interrupted or `--duration` elapses.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use servoboard_driver::{Driver, DriverConfig, FnObserver, Notification, Result};

#[derive(Parser, Debug)]
#[command(name = "servoboard", version, about = "Host driver for the 16-servo controller board")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device, overrides the configuration file
    #[arg(short, long)]
    device: Option<String>,

    /// Board id (0-15), overrides the configuration file
    #[arg(long)]
    id: Option<u8>,

    /// Servo goals as INDEX=VALUE with VALUE in 0.0-1.0; each named servo is enabled
    #[arg(short, long = "goal", value_parser = parse_goal)]
    goals: Vec<(usize, f32)>,

    /// Ask the board to send DEBUG messages
    #[arg(long)]
    board_debug: bool,

    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<u64>,
}

fn parse_goal(arg: &str) -> std::result::Result<(usize, f32), String> {
    let (index, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=VALUE, got '{arg}'"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|e| format!("bad servo index '{index}': {e}"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("bad goal '{value}': {e}"))?;
    Ok((index, value))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DriverConfig::from_file(path)?,
        None => DriverConfig::default(),
    };
    if let Some(device) = args.device {
        config.device = device;
    }
    if let Some(id) = args.id {
        config.board.id = id;
    }
    config.validate()?;

    log::info!(
        "Using {} at {} baud, board id {}",
        config.device,
        config.baudrate,
        config.board.id
    );

    let mut driver = Driver::from_config(&config)?;
    driver.subscribe(FnObserver(|notification: &Notification| match notification {
        Notification::Info(message) => {
            log::info!("Board: {}", String::from_utf8_lossy(message).trim_end_matches('\0'))
        }
        Notification::Debug(message) => {
            log::info!("Board debug: {}", String::from_utf8_lossy(message).trim_end_matches('\0'))
        }
        _ => {}
    }));

    let board = driver.handle();
    for (index, goal) in &args.goals {
        board.set_enabled(*index, true)?;
        board.set_goal(*index, *goal)?;
    }
    if args.board_debug {
        board.debug_enable()?;
    }

    let stop = Arc::new(AtomicBool::new(false));
    if let Some(secs) = args.duration {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            stop.store(true, Ordering::Relaxed);
        });
    }

    let now = driver.now_ms();
    driver.connect(now);
    driver.run(&stop);
    driver.disconnect();

    Ok(())
}
