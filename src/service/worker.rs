use super::frame_slot::Frame;
use super::SharedState;
use crate::capture::CaptureDevice;
use crate::config::CaptureConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Body of the capture thread
///
/// Opens the device, then grabs and publishes frames until a stop is
/// requested or the stream ends. The source is dropped, releasing the
/// device, when this returns.
pub(super) fn run_capture_loop(
    device: Arc<dyn CaptureDevice>,
    shared: Arc<SharedState>,
    config: CaptureConfig,
) {
    let mut source = match device.open() {
        Ok(source) => source,
        Err(err) => {
            tracing::warn!("No video stream: {}", err);
            return;
        }
    };

    let (width, height) = source.resolution();
    tracing::info!("Capture loop running at {}x{}", width, height);

    let frame_interval = config.frame_interval();
    let mut sequence = 0u64;
    let mut total_grab_time = Duration::ZERO;
    let mut window_start = Instant::now();

    loop {
        if shared.controls.stop_requested() {
            tracing::debug!("Stop requested, leaving capture loop");
            break;
        }

        if shared.controls.is_paused() {
            std::thread::sleep(config.poll_interval);
            continue;
        }

        let loop_start = Instant::now();

        let image = match source.capture_frame() {
            Ok(image) => image,
            Err(err) => {
                tracing::info!("Capture stream ended after {} frames: {}", sequence, err);
                break;
            }
        };
        total_grab_time += loop_start.elapsed();

        sequence += 1;
        shared.slot.publish(Frame { image, sequence });

        // Log stats every 30 frames
        if sequence % 30 == 0 {
            let avg_grab_ms = total_grab_time.as_secs_f64() * 1000.0 / 30.0;
            let actual_fps = 30.0 / window_start.elapsed().as_secs_f64();
            tracing::debug!(
                "Frame {}: grab={:.1}ms, fps={:.1}",
                sequence,
                avg_grab_ms,
                actual_fps
            );
            total_grab_time = Duration::ZERO;
            window_start = Instant::now();
        }

        // Frame rate limiting
        let elapsed = loop_start.elapsed();
        if elapsed < frame_interval {
            std::thread::sleep(frame_interval - elapsed);
        }
    }

    drop(source);
    tracing::info!("Capture device released");
}
