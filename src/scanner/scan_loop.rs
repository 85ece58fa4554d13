// SPDX-License-Identifier: GPL-3.0-only

//! The scan loop
//!
//! One tick per display-refresh interval: take the newest frame, hand
//! its pixel buffer to the decoder, update the session. Ticks are
//! strictly sequential; a tick always finishes before the next starts.
//!
//! The loop does not halt after a successful detection. Later frames
//! that also decode overwrite the stored result and raise the success
//! notification again; only cancellation stops the loop. This mirrors
//! the behavior the scanner was modeled on and is deliberate (see
//! DESIGN.md for the alternative that was not adopted).

use crate::camera::{FrameSource, ScanFrame};
use crate::notify::{Notification, Notifier, Severity};
use crate::scanner::content::QrContent;
use crate::scanner::decoder::QrDecoder;
use crate::session::ScanSession;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No frame was buffered; nothing processed, reschedule
    NoFrame,
    /// A frame was processed but contained no decodable code
    Miss,
    /// A frame decoded to this payload
    Decoded(String),
}

/// Run one scan tick over the most recent frame.
///
/// With no frame available the tick is a guard-only reschedule. With a
/// frame, the RGBA buffer goes to the decoder as-is; a positive decode
/// records the detection and raises a success notification (every time,
/// not only the first), a miss reaffirms the scanning status.
pub fn run_tick(
    session: &Mutex<ScanSession>,
    frame: Option<&ScanFrame>,
    decoder: &dyn QrDecoder,
    notifier: &dyn Notifier,
) -> TickOutcome {
    let Some(frame) = frame else {
        return TickOutcome::NoFrame;
    };

    match decoder.decode(frame.rgba(), frame.width, frame.height) {
        Some(content) => {
            session.lock().unwrap().record_detection(&content);

            let kind = QrContent::classify(&content);
            notifier.notify(Notification::new(
                Severity::Success,
                format!("{} detected", kind.label()),
                kind.summary(),
            ));

            TickOutcome::Decoded(content)
        }
        None => {
            session.lock().unwrap().reaffirm_scanning();
            TickOutcome::Miss
        }
    }
}

/// Controller for a scan loop running on its own thread.
///
/// Used by headless scanning; the terminal UI runs `run_tick` inline in
/// its event loop instead. The loop checks the stop token before every
/// tick, so cancelling leaves no pending tick behind, and the frame
/// source is dropped when the loop exits, which releases the camera.
pub struct ScanLoopController {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
}

impl ScanLoopController {
    /// Start the loop.
    ///
    /// The loop runs while the session's scanning gate is set and the
    /// stop token is clear. Each iteration drains the source to the
    /// newest frame, runs one tick, and sleeps out the rest of the tick
    /// interval.
    pub fn start(
        session: Arc<Mutex<ScanSession>>,
        mut source: Box<dyn FrameSource>,
        decoder: Box<dyn QrDecoder>,
        notifier: Arc<dyn Notifier>,
        tick_interval: Duration,
    ) -> Self {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop_signal_clone = Arc::clone(&stop_signal);

        info!("starting scan loop");

        let thread_handle = thread::spawn(move || {
            debug!("scan loop thread started");

            loop {
                if stop_signal_clone.load(Ordering::SeqCst) {
                    debug!("stop signal received");
                    break;
                }
                if !session.lock().unwrap().is_scanning() {
                    debug!("scanning gate cleared, loop exiting");
                    break;
                }

                let tick_start = Instant::now();
                let frame = source.latest_frame();
                run_tick(&session, frame.as_ref(), decoder.as_ref(), notifier.as_ref());

                // Pace to the tick cadence; a slow decode just starts the
                // next tick immediately
                let elapsed = tick_start.elapsed();
                if elapsed < tick_interval {
                    thread::sleep(tick_interval - elapsed);
                }
            }

            info!("scan loop thread exiting");
            // `source` drops here, stopping the capture pipeline
        });

        Self {
            thread_handle: Some(thread_handle),
            stop_signal,
        }
    }

    /// Check if the loop is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Get a clone of the stop signal.
    ///
    /// Useful for wiring external interrupts (Ctrl+C) to the loop.
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Signal the loop to stop without waiting
    pub fn request_stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread to finish without sending a stop signal
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                warn!("scan loop thread panicked");
            }
        }
    }
}

impl Drop for ScanLoopController {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!("scan loop controller dropped, stopping loop");
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc as StdArc;
    use std::time::Instant;

    struct QueueSource {
        frames: VecDeque<ScanFrame>,
    }

    impl FrameSource for QueueSource {
        fn latest_frame(&mut self) -> Option<ScanFrame> {
            self.frames.pop_front()
        }
    }

    struct NeverDecoder;

    impl QrDecoder for NeverDecoder {
        fn decode(&self, _pixels: &[u8], _width: u32, _height: u32) -> Option<String> {
            None
        }
    }

    struct NullNotifier;

    impl Notifier for NullNotifier {
        fn notify(&self, _notification: Notification) {}
    }

    fn test_frame() -> ScanFrame {
        ScanFrame {
            width: 2,
            height: 2,
            data: StdArc::from(vec![0u8; 16].as_slice()),
            sequence: 0,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_tick_without_frame_is_guarded() {
        let session = Mutex::new(ScanSession::new());
        session.lock().unwrap().begin_scanning();

        let outcome = run_tick(&session, None, &NeverDecoder, &NullNotifier);
        assert_eq!(outcome, TickOutcome::NoFrame);
    }

    #[test]
    fn test_loop_exits_when_not_scanning() {
        // Session never entered scanning, the gate stops the loop at once
        let session = Arc::new(Mutex::new(ScanSession::new()));
        let source = Box::new(QueueSource {
            frames: VecDeque::new(),
        });

        let mut controller = ScanLoopController::start(
            session,
            source,
            Box::new(NeverDecoder),
            Arc::new(NullNotifier),
            Duration::from_millis(1),
        );

        controller.join();
        assert!(!controller.is_running());
    }

    #[test]
    fn test_stop_cancels_loop() {
        let session = Arc::new(Mutex::new(ScanSession::new()));
        session.lock().unwrap().begin_scanning();

        let frames: VecDeque<ScanFrame> = (0..1000).map(|_| test_frame()).collect();
        let source = Box::new(QueueSource { frames });

        let mut controller = ScanLoopController::start(
            Arc::clone(&session),
            source,
            Box::new(NeverDecoder),
            Arc::new(NullNotifier),
            Duration::from_millis(1),
        );

        assert!(controller.is_running());
        controller.stop();
        assert!(!controller.is_running());
    }
}
