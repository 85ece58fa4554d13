// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the threaded scan loop controller

use qrscan::camera::{FrameSource, ScanFrame};
use qrscan::notify::{ChannelNotifier, Notification, Notifier};
use qrscan::scanner::{QrDecoder, ScanLoopController};
use qrscan::session::{ScanSession, ScanStatus};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::channel;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source producing an endless supply of identical frames.
///
/// The first byte of the pixel buffer carries the sentinel the pattern
/// decoder looks for, standing in for real image content.
struct ConstantSource {
    sentinel: u8,
}

impl FrameSource for ConstantSource {
    fn latest_frame(&mut self) -> Option<ScanFrame> {
        let mut data = vec![0u8; 16];
        data[0] = self.sentinel;
        Some(ScanFrame {
            width: 2,
            height: 2,
            data: Arc::from(data.as_slice()),
            sequence: 0,
            captured_at: Instant::now(),
        })
    }
}

/// Source that never has a frame ready
struct EmptySource;

impl FrameSource for EmptySource {
    fn latest_frame(&mut self) -> Option<ScanFrame> {
        None
    }
}

/// Decoder mapping a fixed pixel pattern to a fixed payload: frames
/// whose first byte is 0xFF decode to "HELLO", everything else misses.
struct PatternDecoder {
    calls: Arc<AtomicU32>,
}

impl QrDecoder for PatternDecoder {
    fn decode(&self, pixels: &[u8], _width: u32, _height: u32) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (pixels.first() == Some(&0xFF)).then(|| "HELLO".to_string())
    }
}

struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

fn scanning_session() -> Arc<Mutex<ScanSession>> {
    let session = Arc::new(Mutex::new(ScanSession::new()));
    session.lock().unwrap().begin_scanning();
    session
}

#[test]
fn test_stop_cancels_pending_ticks() {
    let session = scanning_session();
    let calls = Arc::new(AtomicU32::new(0));

    let mut controller = ScanLoopController::start(
        Arc::clone(&session),
        Box::new(ConstantSource { sentinel: 0 }),
        Box::new(PatternDecoder {
            calls: Arc::clone(&calls),
        }),
        Arc::new(NullNotifier),
        Duration::from_millis(1),
    );

    // Let it tick a few times, then cancel
    std::thread::sleep(Duration::from_millis(30));
    controller.stop();
    assert!(!controller.is_running());

    // No tick runs after cancellation
    let after_stop = calls.load(Ordering::SeqCst);
    assert!(after_stop > 0, "loop should have ticked before the stop");
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(calls.load(Ordering::SeqCst), after_stop);
}

#[test]
fn test_detection_does_not_stop_the_loop() {
    let session = scanning_session();
    let calls = Arc::new(AtomicU32::new(0));
    let (tx, rx) = channel();

    let mut controller = ScanLoopController::start(
        Arc::clone(&session),
        Box::new(ConstantSource { sentinel: 0xFF }),
        Box::new(PatternDecoder {
            calls: Arc::clone(&calls),
        }),
        Arc::new(ChannelNotifier::new(tx)),
        Duration::from_millis(1),
    );

    // Every frame decodes; the loop must keep going regardless
    let deadline = Instant::now() + Duration::from_secs(2);
    while calls.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    controller.stop();

    assert!(
        calls.load(Ordering::SeqCst) >= 3,
        "loop should keep decoding after a detection"
    );

    let state = session.lock().unwrap();
    assert_eq!(state.status(), ScanStatus::Detected);
    assert_eq!(state.decoded_result(), "HELLO");

    // The success notification is re-raised on every positive decode
    let mut notifications = 0;
    while rx.try_recv().is_ok() {
        notifications += 1;
    }
    assert!(notifications >= 3);
}

#[test]
fn test_empty_source_keeps_scanning() {
    let session = scanning_session();
    let calls = Arc::new(AtomicU32::new(0));

    let mut controller = ScanLoopController::start(
        Arc::clone(&session),
        Box::new(EmptySource),
        Box::new(PatternDecoder {
            calls: Arc::clone(&calls),
        }),
        Arc::new(NullNotifier),
        Duration::from_millis(1),
    );

    std::thread::sleep(Duration::from_millis(30));
    controller.stop();

    // The guard skips decoding entirely when no frame is buffered
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let state = session.lock().unwrap();
    assert_eq!(state.status(), ScanStatus::Scanning);
    assert_eq!(state.decoded_result(), "");
}

#[test]
fn test_drop_stops_the_loop() {
    let session = scanning_session();
    let calls = Arc::new(AtomicU32::new(0));

    let controller = ScanLoopController::start(
        Arc::clone(&session),
        Box::new(ConstantSource { sentinel: 0 }),
        Box::new(PatternDecoder {
            calls: Arc::clone(&calls),
        }),
        Arc::new(NullNotifier),
        Duration::from_millis(1),
    );

    drop(controller);

    let after_drop = calls.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(calls.load(Ordering::SeqCst), after_drop);
}
