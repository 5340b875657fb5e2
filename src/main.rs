use anyhow::{Context, Result};
use clap::Parser;
use framecap::{CaptureConfig, FrameCaptureService, TestPatternDevice};
use std::io::BufRead;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input webcam device index
    #[arg(short, long, default_value_t = 0)]
    input_device: u32,

    /// Capture resolution width
    #[arg(long, default_value_t = 640)]
    capture_width: u32,

    /// Capture resolution height
    #[arg(long, default_value_t = 480)]
    capture_height: u32,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value_t = 50)]
    quality: u8,

    /// Control polling interval while paused, in milliseconds
    #[arg(long, default_value_t = 30)]
    poll_interval_ms: u64,

    /// Use a synthetic test pattern instead of a webcam
    #[arg(long)]
    test_pattern: bool,

    /// Report whether the device can be opened, then exit
    #[arg(long)]
    probe: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            device_index: self.input_device,
            width: self.capture_width,
            height: self.capture_height,
            fps: self.fps,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            jpeg_quality: self.quality,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = args.capture_config();
    tracing::info!("framecap starting");
    tracing::info!("Capture: {}x{} @ {} fps", config.width, config.height, config.fps);
    tracing::info!("JPEG quality: {}", config.jpeg_quality);

    let service = if args.test_pattern {
        let device = TestPatternDevice::new(config.width, config.height);
        FrameCaptureService::new(device, config)
    } else {
        FrameCaptureService::webcam(config)
    };
    let service = service.context("Invalid capture configuration")?;

    if args.probe {
        let connected = service.is_connected();
        println!("{}", if connected { "connected" } else { "not connected" });
        return Ok(());
    }

    service.start().context("Failed to start capture")?;
    tracing::info!("Commands: start, stop, pause, resume, status, frame, probe, quit");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command")?;
        if !run_command(&service, line.trim())? {
            break;
        }
    }

    service.stop();
    tracing::info!("framecap stopped");
    Ok(())
}

/// Execute one control command; returns false when the driver should exit
fn run_command(service: &FrameCaptureService, command: &str) -> Result<bool> {
    match command {
        "" => {}
        "start" => service.start().context("Failed to start capture")?,
        "stop" => service.stop(),
        "pause" => service.pause(),
        "resume" => service.resume(),
        "status" => println!(
            "running={} paused={}",
            service.is_running(),
            service.is_paused()
        ),
        "frame" => match service.latest_frame() {
            Some(frame) => println!(
                "frame {}: {}x{}, {} bytes",
                frame.sequence,
                frame.width,
                frame.height,
                frame.len()
            ),
            None => println!("no frame available"),
        },
        "probe" => println!("connected={}", service.is_connected()),
        "quit" | "exit" => return Ok(false),
        other => tracing::warn!("Unknown command: {}", other),
    }
    Ok(true)
}
