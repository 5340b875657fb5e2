use super::{CaptureDevice, CaptureSource};
use crate::config::CaptureConfig;
use crate::error::{CaptureError, Result};
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;

/// Webcam at a fixed device index, opened through nokhwa
#[derive(Debug, Clone)]
pub struct WebcamDevice {
    index: u32,
    width: u32,
    height: u32,
    fps: u32,
}

impl WebcamDevice {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            index: config.device_index,
            width: config.width,
            height: config.height,
            fps: config.fps,
        }
    }

    fn unavailable(&self, err: nokhwa::NokhwaError) -> CaptureError {
        CaptureError::DeviceUnavailable {
            index: self.index,
            reason: err.to_string(),
        }
    }
}

impl CaptureDevice for WebcamDevice {
    fn open(&self) -> Result<Box<dyn CaptureSource>> {
        tracing::info!(
            "Opening webcam {} at {}x{} @ {} fps",
            self.index,
            self.width,
            self.height,
            self.fps
        );

        // MJPEG keeps USB bandwidth low at the requested resolution
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(self.width, self.height),
                FrameFormat::MJPEG,
                self.fps,
            ),
        ));

        let mut camera = Camera::new(CameraIndex::Index(self.index), requested)
            .map_err(|e| self.unavailable(e))?;

        camera.open_stream().map_err(|e| self.unavailable(e))?;

        let resolution = camera.resolution();
        tracing::info!(
            "Webcam {} streaming at {}x{}",
            self.index,
            resolution.width(),
            resolution.height()
        );

        Ok(Box::new(WebcamCapture {
            camera,
            width: resolution.width(),
            height: resolution.height(),
        }))
    }
}

pub struct WebcamCapture {
    camera: Camera,
    width: u32,
    height: u32,
}

impl CaptureSource for WebcamCapture {
    fn capture_frame(&mut self) -> Result<RgbImage> {
        let frame = self
            .camera
            .frame()
            .map_err(|e| CaptureError::StreamEnded(e.to_string()))?;

        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::StreamEnded(format!("failed to decode frame: {}", e)))?;

        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(CaptureError::StreamEnded("empty frame".to_string()));
        }

        Ok(decoded)
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for WebcamCapture {
    fn drop(&mut self) {
        if let Err(err) = self.camera.stop_stream() {
            tracing::debug!("Failed to stop webcam stream: {}", err);
        }
    }
}
