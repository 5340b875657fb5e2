//! Integration tests for the capture service lifecycle

use framecap::{CaptureConfig, CaptureError, FrameCaptureService, TestPatternDevice};
use image::ImageFormat;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(5);

fn fast_config() -> CaptureConfig {
    CaptureConfig {
        fps: 100,
        poll_interval: Duration::from_millis(5),
        width: 32,
        height: 24,
        ..CaptureConfig::default()
    }
}

fn service_with(device: &TestPatternDevice) -> FrameCaptureService {
    FrameCaptureService::new(device.clone(), fast_config()).unwrap()
}

/// Poll `condition` until it holds or the deadline passes
fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

#[test]
fn start_publishes_frames() {
    let device = TestPatternDevice::new(32, 24);
    let service = service_with(&device);

    assert!(service.latest_frame().is_none());
    service.start().unwrap();

    assert!(wait_until(|| service.latest_frame().is_some()));
    let frame = service.latest_frame().unwrap();
    assert!(frame.len() > 0);
    assert_eq!((frame.width, frame.height), (32, 24));

    service.stop();
    assert!(service.latest_frame().is_none());
}

#[test]
fn encoded_frames_decode_as_jpeg() {
    let device = TestPatternDevice::new(32, 24);
    let service = service_with(&device);
    service.start().unwrap();

    assert!(wait_until(|| service.latest_frame().is_some()));
    let frame = service.latest_frame().unwrap();

    let decoded = image::load_from_memory_with_format(&frame.bytes, ImageFormat::Jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (32, 24));
}

#[test]
fn repeated_start_keeps_one_session() {
    let device = TestPatternDevice::new(32, 24);
    let service = Arc::new(service_with(&device));

    let starters: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.start().unwrap())
        })
        .collect();
    for starter in starters {
        starter.join().unwrap();
    }
    service.start().unwrap();

    assert!(wait_until(|| device.opened() == 1));
    assert!(device.live_sources() <= 1);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(device.opened(), 1);

    service.stop();
    assert_eq!(device.live_sources(), 0);
    assert!(!service.is_running());
}

#[test]
fn stop_without_start_is_a_no_op() {
    let device = TestPatternDevice::new(32, 24);
    let service = service_with(&device);

    service.stop();
    service.stop();

    assert!(!service.is_running());
    assert!(service.latest_frame().is_none());
    assert_eq!(device.opened(), 0);
}

#[test]
fn stop_clears_until_next_grab() {
    let device = TestPatternDevice::new(32, 24);
    let service = service_with(&device);

    service.start().unwrap();
    assert!(wait_until(|| service.latest_frame().is_some()));

    service.stop();
    assert!(service.latest_frame().is_none());
    thread::sleep(Duration::from_millis(30));
    assert!(service.latest_frame().is_none());

    service.start().unwrap();
    assert!(wait_until(|| service.latest_frame().is_some()));
    assert_eq!(device.opened(), 2);
}

#[test]
fn pause_freezes_the_latest_frame() {
    let device = TestPatternDevice::new(32, 24);
    let service = service_with(&device);
    service.start().unwrap();
    assert!(wait_until(|| service.latest_frame().is_some()));

    service.pause();
    assert!(service.is_paused());
    // Let any grab that was already in flight land
    thread::sleep(Duration::from_millis(50));

    let first = service.latest_frame().unwrap();
    for _ in 0..5 {
        thread::sleep(Duration::from_millis(10));
        assert_eq!(service.latest_frame().unwrap(), first);
    }
    assert!(service.is_running());
}

#[test]
fn resume_publishes_new_frames() {
    let device = TestPatternDevice::new(32, 24);
    let service = service_with(&device);
    service.start().unwrap();
    assert!(wait_until(|| service.latest_frame().is_some()));

    service.pause();
    thread::sleep(Duration::from_millis(50));
    let paused = service.latest_frame().unwrap();

    service.resume();
    assert!(!service.is_paused());
    assert!(wait_until(|| {
        service
            .latest_frame()
            .is_some_and(|frame| frame.sequence > paused.sequence && frame.bytes != paused.bytes)
    }));
}

#[test]
fn stop_while_paused_returns() {
    let device = TestPatternDevice::new(32, 24);
    let service = service_with(&device);
    service.start().unwrap();
    service.pause();

    let begin = Instant::now();
    service.stop();

    assert!(begin.elapsed() < Duration::from_secs(1));
    assert!(!service.is_running());
    assert_eq!(device.live_sources(), 0);
}

#[test]
fn start_resets_pause() {
    let device = TestPatternDevice::new(32, 24);
    let service = service_with(&device);

    service.pause();
    service.start().unwrap();

    assert!(!service.is_paused());
    assert!(wait_until(|| service.latest_frame().is_some()));
}

#[test]
fn unavailable_device_never_publishes() {
    let device = TestPatternDevice::new(32, 24);
    device.set_available(false);
    let service = service_with(&device);

    assert!(!service.is_connected());
    service.start().unwrap();

    assert!(wait_until(|| !service.is_running()));
    assert!(service.latest_frame().is_none());
    assert_eq!(device.opened(), 0);
}

#[test]
fn stream_end_stops_the_loop() {
    let device = TestPatternDevice::new(32, 24).with_frame_limit(3);
    let service = service_with(&device);
    service.start().unwrap();

    assert!(wait_until(|| !service.is_running()));
    assert_eq!(device.live_sources(), 0);

    // The last good frame stays cached until stop
    let last = service.latest_frame().unwrap();
    assert_eq!(last.sequence, 3);

    // A fresh start replaces the finished session
    service.start().unwrap();
    assert!(wait_until(|| device.opened() == 2));

    service.stop();
    assert!(service.latest_frame().is_none());
}

#[test]
fn probe_does_not_disturb_running_session() {
    let device = TestPatternDevice::new(32, 24);
    let service = service_with(&device);
    service.start().unwrap();
    assert!(wait_until(|| service.latest_frame().is_some()));

    device.set_available(false);
    assert!(!service.is_connected());

    let before = service.latest_frame().unwrap();
    assert!(service.is_running());
    assert!(wait_until(|| {
        service
            .latest_frame()
            .is_some_and(|frame| frame.sequence > before.sequence)
    }));
}

#[test]
fn quality_setting_is_applied() {
    let low_device = TestPatternDevice::new(64, 64);
    let high_device = TestPatternDevice::new(64, 64);

    let low = FrameCaptureService::new(
        low_device,
        CaptureConfig {
            width: 64,
            height: 64,
            jpeg_quality: 10,
            ..fast_config()
        },
    )
    .unwrap();
    let high = FrameCaptureService::new(
        high_device,
        CaptureConfig {
            width: 64,
            height: 64,
            jpeg_quality: 95,
            ..fast_config()
        },
    )
    .unwrap();

    low.start().unwrap();
    high.start().unwrap();
    assert!(wait_until(|| low.latest_frame().is_some() && high.latest_frame().is_some()));

    let low_frame = low.latest_frame().unwrap();
    let high_frame = high.latest_frame().unwrap();
    assert!(low_frame.len() < high_frame.len());
}

#[test]
fn invalid_config_is_rejected() {
    let device = TestPatternDevice::new(32, 24);
    let result = FrameCaptureService::new(
        device,
        CaptureConfig {
            jpeg_quality: 0,
            ..fast_config()
        },
    );

    assert!(matches!(result, Err(CaptureError::InvalidArgument(_))));
}
