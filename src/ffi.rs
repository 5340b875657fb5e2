//! C ABI over a process-wide capture service
//!
//! The service is created on first use from webcam 0 with default
//! parameters. Frame buffers are allocated with the C allocator and must
//! be released with `freeFrameBytes` exactly once.

use crate::config::CaptureConfig;
use crate::service::FrameCaptureService;
use std::ffi::{c_int, c_void};
use std::ptr;
use std::sync::OnceLock;

static SERVICE: OnceLock<Option<FrameCaptureService>> = OnceLock::new();

fn service() -> Option<&'static FrameCaptureService> {
    SERVICE
        .get_or_init(|| match FrameCaptureService::webcam(CaptureConfig::default()) {
            Ok(service) => Some(service),
            Err(err) => {
                tracing::warn!("Failed to create capture service: {}", err);
                None
            }
        })
        .as_ref()
}

#[export_name = "startVideoCaptureInThread"]
pub extern "C" fn start_video_capture() {
    if let Some(service) = service() {
        if let Err(err) = service.start() {
            tracing::warn!("Failed to start capture: {}", err);
        }
    }
}

#[export_name = "stopVideoCapture"]
pub extern "C" fn stop_video_capture() {
    if let Some(service) = service() {
        service.stop();
    }
}

#[export_name = "pauseVideoCapture"]
pub extern "C" fn pause_video_capture() {
    if let Some(service) = service() {
        service.pause();
    }
}

#[export_name = "resumeVideoCapture"]
pub extern "C" fn resume_video_capture() {
    if let Some(service) = service() {
        service.resume();
    }
}

/// Returns 1 if the camera can be opened, 0 otherwise
#[export_name = "isCameraConnected"]
pub extern "C" fn is_camera_connected() -> c_int {
    service().is_some_and(|service| service.is_connected()) as c_int
}

/// Encode the latest frame as JPEG
///
/// Writes the byte count to `length` and returns an owned buffer, or
/// returns null with `length` set to 0 when no frame is available.
///
/// # Safety
///
/// `length` must be null or valid for a write of one `c_int`.
#[export_name = "getLatestFrameBytes"]
pub unsafe extern "C" fn get_latest_frame_bytes(length: *mut c_int) -> *mut u8 {
    if length.is_null() {
        tracing::warn!("Length pointer is null");
        return ptr::null_mut();
    }
    *length = 0;

    let Some(frame) = service().and_then(FrameCaptureService::latest_frame) else {
        return ptr::null_mut();
    };

    export_bytes(&frame.bytes, length)
}

/// Release a buffer returned by `getLatestFrameBytes`
///
/// # Safety
///
/// `buffer` must be null or a pointer returned by `getLatestFrameBytes`
/// that has not been freed yet.
#[export_name = "freeFrameBytes"]
pub unsafe extern "C" fn free_frame_bytes(buffer: *mut u8) {
    if !buffer.is_null() {
        libc::free(buffer.cast::<c_void>());
    }
}

/// Copy `bytes` into a malloc'd buffer and report its size through `length`
///
/// # Safety
///
/// `length` must be non-null and valid for a write of one `c_int`.
unsafe fn export_bytes(bytes: &[u8], length: *mut c_int) -> *mut u8 {
    let Ok(len) = c_int::try_from(bytes.len()) else {
        tracing::warn!("Encoded frame of {} bytes does not fit in c_int", bytes.len());
        return ptr::null_mut();
    };
    if len == 0 {
        return ptr::null_mut();
    }

    let data = libc::malloc(bytes.len()).cast::<u8>();
    if data.is_null() {
        tracing::warn!("Memory allocation failed");
        return ptr::null_mut();
    }

    ptr::copy_nonoverlapping(bytes.as_ptr(), data, bytes.len());
    *length = len;
    data
}
