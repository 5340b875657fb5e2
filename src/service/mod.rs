//! Background frame capture with a single-slot frame cache
//!
//! One thread owns the capture device and publishes every grabbed frame
//! into a [`FrameSlot`]. Callers read the slot, encode on demand, and steer
//! the thread through two atomic flags. Cancellation is polled: a sleeping
//! or paused loop notices `stop` at its next wake.

mod frame_slot;
mod worker;

pub use frame_slot::{Frame, FrameSlot};

use crate::capture::{CaptureDevice, WebcamDevice};
use crate::config::CaptureConfig;
use crate::encode::{encode_jpeg, EncodedFrame};
use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Instant;

/// Control signals observed by the capture loop on every iteration
#[derive(Debug, Default)]
pub struct ControlFlags {
    stop_requested: AtomicBool,
    paused: AtomicBool,
}

impl ControlFlags {
    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    fn reset(&self) {
        self.stop_requested.store(false, Ordering::Release);
        self.paused.store(false, Ordering::Release);
    }
}

/// State shared between the service and its capture thread
#[derive(Debug, Default)]
struct SharedState {
    slot: FrameSlot,
    controls: ControlFlags,
}

/// Handle to a running capture thread
struct CaptureSession {
    handle: JoinHandle<()>,
    started_at: Instant,
}

pub struct FrameCaptureService {
    device: Arc<dyn CaptureDevice>,
    config: CaptureConfig,
    shared: Arc<SharedState>,
    // Held across spawn and join so start/stop never interleave
    session: Mutex<Option<CaptureSession>>,
}

impl FrameCaptureService {
    pub fn new<D>(device: D, config: CaptureConfig) -> Result<Self>
    where
        D: CaptureDevice + 'static,
    {
        config.validate()?;

        Ok(Self {
            device: Arc::new(device),
            config,
            shared: Arc::new(SharedState::default()),
            session: Mutex::new(None),
        })
    }

    /// Service backed by the webcam named in `config`
    pub fn webcam(config: CaptureConfig) -> Result<Self> {
        let device = WebcamDevice::new(&config);
        Self::new(device, config)
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Launch the capture thread
    ///
    /// A no-op while a session is running. A session whose loop already
    /// ended on its own is reaped and replaced. Returns without waiting for
    /// the first frame.
    pub fn start(&self) -> Result<()> {
        let mut session = self.lock_session();

        if let Some(current) = session.as_ref() {
            if !current.handle.is_finished() {
                tracing::debug!("Capture already running, ignoring start");
                return Ok(());
            }
        }
        if let Some(finished) = session.take() {
            Self::join(finished);
        }

        self.shared.controls.reset();

        let device = Arc::clone(&self.device);
        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let handle = std::thread::Builder::new()
            .name("frame-capture".to_string())
            .spawn(move || worker::run_capture_loop(device, shared, config))?;

        tracing::info!("Capture session started on device {}", self.config.device_index);

        *session = Some(CaptureSession {
            handle,
            started_at: Instant::now(),
        });
        Ok(())
    }

    /// Stop the capture thread and clear the cached frame
    ///
    /// Blocks until the thread exits, which takes at most one sleep
    /// interval. Safe to call when nothing is running.
    pub fn stop(&self) {
        let mut session = self.lock_session();

        if let Some(current) = session.take() {
            self.shared.controls.request_stop();
            Self::join(current);
            tracing::info!("Capture session stopped");
        }

        self.shared.slot.clear();
    }

    pub fn pause(&self) {
        tracing::debug!("Pausing capture");
        self.shared.controls.set_paused(true);
    }

    pub fn resume(&self) {
        tracing::debug!("Resuming capture");
        self.shared.controls.set_paused(false);
    }

    pub fn is_paused(&self) -> bool {
        self.shared.controls.is_paused()
    }

    /// True while a capture thread is alive
    pub fn is_running(&self) -> bool {
        self.lock_session()
            .as_ref()
            .is_some_and(|session| !session.handle.is_finished())
    }

    /// Probe the device independently of any running session
    pub fn is_connected(&self) -> bool {
        self.device.probe()
    }

    /// Encode a copy of the most recent frame
    ///
    /// Returns `None` when no frame has been captured or encoding fails.
    /// The slot lock is released before encoding starts.
    pub fn latest_frame(&self) -> Option<EncodedFrame> {
        let frame = self.shared.slot.snapshot()?;
        let (width, height) = frame.image.dimensions();

        match encode_jpeg(&frame.image, self.config.jpeg_quality) {
            Ok(bytes) => Some(EncodedFrame {
                bytes,
                width,
                height,
                sequence: frame.sequence,
            }),
            Err(err) => {
                tracing::warn!("Failed to encode frame {}: {}", frame.sequence, err);
                None
            }
        }
    }

    fn join(session: CaptureSession) {
        let uptime = session.started_at.elapsed();
        if session.handle.join().is_err() {
            tracing::warn!("Capture thread panicked after {:.1}s", uptime.as_secs_f64());
        } else {
            tracing::debug!("Capture thread joined after {:.1}s", uptime.as_secs_f64());
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<CaptureSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for FrameCaptureService {
    fn drop(&mut self) {
        self.stop();
    }
}
