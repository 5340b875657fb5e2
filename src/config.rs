use crate::error::{CaptureError, Result};
use std::time::Duration;

/// Fixed capture parameters for a service instance
///
/// The defaults are the low-bandwidth profile: device 0 at 640x480,
/// 30 fps, JPEG quality 50.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    pub device_index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Sleep between control-flag checks while paused
    pub poll_interval: Duration,
    /// JPEG quality on a 1-100 scale
    pub jpeg_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            width: 640,
            height: 480,
            fps: 30,
            poll_interval: Duration::from_millis(30),
            jpeg_quality: 50,
        }
    }
}

impl CaptureConfig {
    /// Time budget for one loop iteration at the target frame rate
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(CaptureError::InvalidArgument(
                "fps must be greater than zero".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::InvalidArgument(format!(
                "resolution {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(CaptureError::InvalidArgument(
                "poll interval must be non-zero".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(CaptureError::InvalidArgument(format!(
                "jpeg quality {} is outside 1-100",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}
