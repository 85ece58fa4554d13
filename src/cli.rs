// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for headless operation
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - One-shot scanning without the terminal UI

use qrscan::camera::{self, enumerate_cameras};
use qrscan::config::Config;
use qrscan::constants::{ONCE_POLL_INTERVAL, TICK_INTERVAL};
use qrscan::notify::LogNotifier;
use qrscan::scanner::{RqrrDecoder, ScanLoopController};
use qrscan::session::{ScanSession, ScanStatus};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let cameras = enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        match camera.facing {
            Some(facing) => println!("  [{}] {} ({}, {})", index, camera.name, camera.path, facing),
            None => println!("  [{}] {} ({})", index, camera.name, camera.path),
        }
    }

    Ok(())
}

/// Scan until a QR code is decoded, print the payload, and exit.
///
/// Runs the same acquisition and loop semantics as the UI, headless.
/// Ctrl+C cancels the scan; the deadline bounds how long to wait.
pub fn scan_once(
    camera_index: Option<usize>,
    timeout_secs: u64,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Arc::new(Mutex::new(ScanSession::new()));

    let stream = match camera_index {
        Some(index) => {
            let cameras = enumerate_cameras();
            if cameras.is_empty() {
                return Err("No cameras found".into());
            }
            if index >= cameras.len() {
                return Err(format!(
                    "Camera index {} out of range (0-{})",
                    index,
                    cameras.len() - 1
                )
                .into());
            }
            camera::acquire_device(&cameras[index], config)
        }
        None => camera::acquire(config),
    };

    let stream = match stream {
        Ok(stream) => stream,
        Err(e) => {
            session.lock().unwrap().fail_no_camera(&e.to_string());
            return Err(e.to_string().into());
        }
    };

    eprintln!("Scanning with {} ...", stream.device().name);
    session.lock().unwrap().begin_scanning();

    let mut controller = ScanLoopController::start(
        Arc::clone(&session),
        Box::new(stream),
        Box::new(RqrrDecoder::with_max_dimension(config.max_decode_dimension)),
        Arc::new(LogNotifier),
        TICK_INTERVAL,
    );

    // Ctrl+C flips the loop's own stop token
    let stop_flag = controller.stop_signal();
    ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::SeqCst);
    })?;

    // Wait for a detection, cancellation, or the deadline
    let deadline = Duration::from_secs(timeout_secs);
    let start = Instant::now();
    let stop_flag = controller.stop_signal();

    while start.elapsed() < deadline {
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }
        if session.lock().unwrap().status() == ScanStatus::Detected {
            break;
        }
        std::thread::sleep(ONCE_POLL_INTERVAL);
    }

    // Read the interrupt flag before stop() sets the same token
    let cancelled = stop_flag.load(Ordering::SeqCst);
    controller.stop();

    let session = session.lock().unwrap();
    match session.status() {
        ScanStatus::Detected => {
            println!("{}", session.decoded_result());
            Ok(())
        }
        _ if cancelled => Err("Scan cancelled".into()),
        _ => Err(format!("No QR code detected within {} seconds", timeout_secs).into()),
    }
}
