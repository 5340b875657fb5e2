use image::RgbImage;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A complete captured frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    /// Monotonic counter within a session, starting at 1
    pub sequence: u64,
}

/// Single-value cache holding the most recent frame
///
/// Frames are fully built before they are moved in, and readers always get
/// a clone, so a reader never observes a partially written frame. The lock
/// is held only for the swap or the copy.
#[derive(Debug, Default)]
pub struct FrameSlot {
    inner: Mutex<Option<Frame>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached frame
    pub fn publish(&self, frame: Frame) {
        let previous = self.lock().replace(frame);
        // Free the old pixel buffer outside the lock
        drop(previous);
    }

    /// Point-in-time copy of the cached frame
    pub fn snapshot(&self) -> Option<Frame> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        let previous = self.lock().take();
        drop(previous);
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    // A panic while holding the lock cannot leave a half-written frame,
    // so a poisoned slot is still usable.
    fn lock(&self) -> MutexGuard<'_, Option<Frame>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
