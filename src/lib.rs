// SPDX-License-Identifier: GPL-3.0-only

//! qrscan - a QR code scanner for the terminal
//!
//! Acquires a camera over V4L2, samples frames continuously, and tries
//! to decode a QR code from each frame, tracking progress in an explicit
//! session state machine.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`camera`]: device enumeration, acquisition, and the capture
//!   pipeline producing RGBA frames
//! - [`scanner`]: the decode strategy, per-tick scan semantics, and the
//!   headless loop controller
//! - [`session`]: the scan status state machine and the submit action
//! - [`notify`]: fire-and-forget notification channel
//! - [`terminal`]: the interactive half-block preview UI
//! - [`config`]: user configuration handling

pub mod camera;
pub mod config;
pub mod constants;
pub mod errors;
pub mod notify;
pub mod scanner;
pub mod session;
pub mod terminal;

// Re-export commonly used types
pub use camera::{CameraStream, FrameSource, ScanFrame};
pub use config::Config;
pub use notify::{ChannelNotifier, LogNotifier, Notification, Notifier, Severity};
pub use scanner::{QrContent, QrDecoder, RqrrDecoder, ScanLoopController, TickOutcome, run_tick};
pub use session::{ScanSession, ScanStatus, SubmitOutcome, submit};
