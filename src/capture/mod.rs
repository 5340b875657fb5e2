mod test_pattern;
mod webcam;

pub use test_pattern::{TestPatternCapture, TestPatternDevice};
pub use webcam::{WebcamCapture, WebcamDevice};

use crate::error::Result;
use image::RgbImage;

/// An opened camera stream
///
/// Sources are created and dropped on the capture thread, so they do not
/// need to be `Send`. Dropping a source releases the device.
pub trait CaptureSource {
    /// Grab a single frame
    ///
    /// Any error is terminal for the session: the capture loop treats it
    /// as the end of the stream.
    fn capture_frame(&mut self) -> Result<RgbImage>;

    /// Get the resolution of captured frames
    fn resolution(&self) -> (u32, u32);
}

/// Factory for capture sources, shared between the service and its thread
pub trait CaptureDevice: Send + Sync {
    /// Open the device and start streaming
    fn open(&self) -> Result<Box<dyn CaptureSource>>;

    /// Report whether the device can be opened right now
    ///
    /// Opens and immediately releases the device. This may contend with a
    /// session that already holds it.
    fn probe(&self) -> bool {
        match self.open() {
            Ok(source) => {
                drop(source);
                true
            }
            Err(err) => {
                tracing::debug!("Device probe failed: {}", err);
                false
            }
        }
    }
}
