use crate::error::{CaptureError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

/// Compressed image ready to hand to a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Publish sequence of the frame this was encoded from
    pub sequence: u64,
}

impl EncodedFrame {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Encode an RGB frame as JPEG at the given quality (1-100)
pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let _span = tracing::debug_span!("encode_jpeg").entered();

    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(CaptureError::Encode(format!(
            "degenerate frame {}x{}",
            width, height
        )));
    }

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(frame)?;

    if bytes.is_empty() {
        return Err(CaptureError::Encode("encoder produced no output".to_string()));
    }

    Ok(bytes)
}
