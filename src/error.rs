use thiserror::Error;

pub type Result<T, E = CaptureError> = std::result::Result<T, E>;

/// Failures surfaced by the capture service
///
/// None of these are fatal to the host process. The service reports them
/// through return values and logs rather than panicking.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The device could not be opened
    #[error("capture device {index} is unavailable: {reason}")]
    DeviceUnavailable { index: u32, reason: String },

    /// A grab returned no usable frame; the session is over
    #[error("capture stream ended: {0}")]
    StreamEnded(String),

    /// The frame snapshot could not be compressed
    #[error("failed to encode frame: {0}")]
    Encode(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to spawn capture thread")]
    Spawn(#[from] std::io::Error),
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::Encode(err.to_string())
    }
}
