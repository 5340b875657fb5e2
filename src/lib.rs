//! Camera capture with a background grab loop and a single-frame cache
//!
//! [`FrameCaptureService`] owns the capture thread. The latest frame is
//! kept raw and JPEG-encoded only when a caller asks for it. The [`ffi`]
//! module exposes the same operations over a C ABI.

pub mod capture;
pub mod config;
pub mod encode;
pub mod error;
pub mod ffi;
pub mod service;

pub use capture::{CaptureDevice, CaptureSource, TestPatternDevice, WebcamDevice};
pub use config::CaptureConfig;
pub use encode::{encode_jpeg, EncodedFrame};
pub use error::{CaptureError, Result};
pub use service::{ControlFlags, Frame, FrameCaptureService, FrameSlot};
