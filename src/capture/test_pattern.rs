use super::{CaptureDevice, CaptureSource};
use crate::error::{CaptureError, Result};
use image::{Rgb, RgbImage};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Synthetic camera producing a gradient that shifts every frame
///
/// Clones share state, so a caller can keep a handle to flip
/// availability or inspect open counts while a service owns another.
#[derive(Debug, Clone)]
pub struct TestPatternDevice {
    width: u32,
    height: u32,
    frame_limit: Option<u64>,
    state: Arc<DeviceState>,
}

#[derive(Debug)]
struct DeviceState {
    available: AtomicBool,
    opened: AtomicUsize,
    live: AtomicUsize,
}

impl TestPatternDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_limit: None,
            state: Arc::new(DeviceState {
                available: AtomicBool::new(true),
                opened: AtomicUsize::new(0),
                live: AtomicUsize::new(0),
            }),
        }
    }

    /// End the stream after `limit` frames, like an unplugged camera
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    pub fn set_available(&self, available: bool) {
        self.state.available.store(available, Ordering::SeqCst);
    }

    /// Total successful opens, probes included
    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    /// Sources currently open
    pub fn live_sources(&self) -> usize {
        self.state.live.load(Ordering::SeqCst)
    }
}

impl CaptureDevice for TestPatternDevice {
    fn open(&self) -> Result<Box<dyn CaptureSource>> {
        if !self.state.available.load(Ordering::SeqCst) {
            return Err(CaptureError::DeviceUnavailable {
                index: 0,
                reason: "test pattern disabled".to_string(),
            });
        }

        self.state.opened.fetch_add(1, Ordering::SeqCst);
        self.state.live.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(TestPatternCapture {
            width: self.width,
            height: self.height,
            frame_limit: self.frame_limit,
            sequence: 0,
            state: Arc::clone(&self.state),
        }))
    }
}

pub struct TestPatternCapture {
    width: u32,
    height: u32,
    frame_limit: Option<u64>,
    sequence: u64,
    state: Arc<DeviceState>,
}

impl CaptureSource for TestPatternCapture {
    fn capture_frame(&mut self) -> Result<RgbImage> {
        if self.frame_limit.is_some_and(|limit| self.sequence >= limit) {
            return Err(CaptureError::StreamEnded(format!(
                "test pattern exhausted after {} frames",
                self.sequence
            )));
        }

        let shift = self.sequence as u32;
        self.sequence += 1;

        Ok(RgbImage::from_fn(self.width, self.height, |x, y| {
            Rgb([
                x.wrapping_add(shift.wrapping_mul(8)) as u8,
                y.wrapping_add(shift.wrapping_mul(4)) as u8,
                shift.wrapping_mul(16) as u8,
            ])
        }))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for TestPatternCapture {
    fn drop(&mut self) {
        self.state.live.fetch_sub(1, Ordering::SeqCst);
    }
}
