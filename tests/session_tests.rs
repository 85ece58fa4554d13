// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the scan session and tick semantics
//!
//! These drive `run_tick` with stub decoders and synthetic frames, so no
//! camera and no real image decoding is involved.

use qrscan::camera::ScanFrame;
use qrscan::notify::{ChannelNotifier, Notification, Severity};
use qrscan::scanner::{QrDecoder, TickOutcome, run_tick};
use qrscan::session::{ScanSession, ScanStatus, SubmitOutcome, submit};
use std::sync::mpsc::{Receiver, channel};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Decoder that replays a scripted sequence of results, then misses
struct ScriptedDecoder {
    responses: Mutex<Vec<Option<String>>>,
}

impl ScriptedDecoder {
    fn new(responses: Vec<Option<&str>>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .rev()
                    .map(|r| r.map(String::from))
                    .collect(),
            ),
        }
    }
}

impl QrDecoder for ScriptedDecoder {
    fn decode(&self, _pixels: &[u8], _width: u32, _height: u32) -> Option<String> {
        self.responses.lock().unwrap().pop().flatten()
    }
}

fn test_frame() -> ScanFrame {
    ScanFrame {
        width: 2,
        height: 2,
        data: Arc::from(vec![0u8; 16].as_slice()),
        sequence: 0,
        captured_at: Instant::now(),
    }
}

fn scanning_session() -> Mutex<ScanSession> {
    let session = Mutex::new(ScanSession::new());
    session.lock().unwrap().begin_scanning();
    session
}

fn notifier() -> (ChannelNotifier, Receiver<Notification>) {
    let (tx, rx) = channel();
    (ChannelNotifier::new(tx), rx)
}

fn drain(rx: &Receiver<Notification>) -> Vec<Notification> {
    let mut all = Vec::new();
    while let Ok(n) = rx.try_recv() {
        all.push(n);
    }
    all
}

#[test]
fn test_misses_keep_scanning() {
    let session = scanning_session();
    let decoder = ScriptedDecoder::new(vec![None; 10]);
    let (notifier, rx) = notifier();
    let frame = test_frame();

    for _ in 0..10 {
        let outcome = run_tick(&session, Some(&frame), &decoder, &notifier);
        assert_eq!(outcome, TickOutcome::Miss);
    }

    let session = session.lock().unwrap();
    assert_eq!(session.status(), ScanStatus::Scanning);
    assert_eq!(session.decoded_result(), "");
    assert!(drain(&rx).is_empty(), "misses must not notify");
}

#[test]
fn test_first_decode_detects_exactly_once() {
    let session = scanning_session();
    let decoder = ScriptedDecoder::new(vec![Some("payload-1")]);
    let (notifier, rx) = notifier();
    let frame = test_frame();

    let outcome = run_tick(&session, Some(&frame), &decoder, &notifier);
    assert_eq!(outcome, TickOutcome::Decoded("payload-1".to_string()));

    let state = session.lock().unwrap();
    assert_eq!(state.status(), ScanStatus::Detected);
    assert_eq!(state.decoded_result(), "payload-1");

    let raised = drain(&rx);
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].severity, Severity::Success);
}

#[test]
fn test_scan_scenario_five_misses_then_hello() {
    let session = scanning_session();
    let decoder = ScriptedDecoder::new(vec![None, None, None, None, None, Some("HELLO")]);
    let (notifier, rx) = notifier();
    let frame = test_frame();

    for _ in 0..5 {
        run_tick(&session, Some(&frame), &decoder, &notifier);
        let state = session.lock().unwrap();
        assert_eq!(state.status(), ScanStatus::Scanning);
        assert_eq!(state.decoded_result(), "");
    }

    run_tick(&session, Some(&frame), &decoder, &notifier);

    let state = session.lock().unwrap();
    assert_eq!(state.status(), ScanStatus::Detected);
    assert_eq!(state.decoded_result(), "HELLO");

    let raised = drain(&rx);
    assert_eq!(raised.len(), 1, "exactly one success notification");
    assert_eq!(raised[0].severity, Severity::Success);
}

#[test]
fn test_redetection_overwrites_and_renotifies() {
    // The loop is not stopped by a detection: a later positive frame
    // overwrites the result and raises the notification again
    let session = scanning_session();
    let decoder = ScriptedDecoder::new(vec![Some("first"), Some("second")]);
    let (notifier, rx) = notifier();
    let frame = test_frame();

    run_tick(&session, Some(&frame), &decoder, &notifier);
    run_tick(&session, Some(&frame), &decoder, &notifier);

    let state = session.lock().unwrap();
    assert_eq!(state.status(), ScanStatus::Detected);
    assert_eq!(state.decoded_result(), "second");
    assert_eq!(drain(&rx).len(), 2);
}

#[test]
fn test_acquisition_failure_never_scans() {
    let mut session = ScanSession::new();
    session.fail_no_camera("No camera devices found");

    assert_eq!(session.status(), ScanStatus::NoCamera);
    assert!(!session.is_scanning());

    // The failure is terminal
    session.begin_scanning();
    assert_eq!(session.status(), ScanStatus::NoCamera);
    assert!(!session.is_scanning());
}

#[test]
fn test_submit_empty_warns_only() {
    let session = scanning_session();
    let (notifier, rx) = notifier();

    let outcome = submit(&session.lock().unwrap(), &notifier);
    assert_eq!(outcome, SubmitOutcome::NothingToSubmit);

    let raised = drain(&rx);
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].severity, Severity::Warning);
}

#[test]
fn test_submit_carries_exact_payload() {
    let session = scanning_session();
    session.lock().unwrap().record_detection("X");
    let (notifier, rx) = notifier();

    let outcome = submit(&session.lock().unwrap(), &notifier);
    assert_eq!(outcome, SubmitOutcome::Submitted("X".to_string()));

    let raised = drain(&rx);
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].severity, Severity::Success);
    assert_eq!(raised[0].description, "X");
}

#[test]
fn test_submit_does_not_mutate_session() {
    let session = scanning_session();
    session.lock().unwrap().record_detection("payload");
    let (notifier, _rx) = notifier();

    let before = session.lock().unwrap().clone();
    submit(&session.lock().unwrap(), &notifier);
    let after = session.lock().unwrap().clone();

    assert_eq!(before.status(), after.status());
    assert_eq!(before.decoded_result(), after.decoded_result());
    assert_eq!(before.is_scanning(), after.is_scanning());
}
