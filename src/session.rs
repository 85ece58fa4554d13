// SPDX-License-Identifier: GPL-3.0-only

//! Scan session state management

use crate::notify::{Notification, Notifier, Severity};
use tracing::{debug, info, warn};

/// Scan session status
///
/// `Initializing` is the start state. `Scanning` re-enters itself on every
/// tick without a detection. `Detected` is absorbing: later detections
/// overwrite the stored payload but never leave the state. `NoCamera` is
/// the terminal acquisition-failure state. `Error` is reserved for faults
/// that are neither; no current code path enters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStatus {
    /// Camera acquisition in progress
    #[default]
    Initializing,
    /// Actively sampling frames and attempting decodes
    Scanning,
    /// At least one QR code has been decoded
    Detected,
    /// Camera acquisition failed, no retry
    NoCamera,
    /// Reserved terminal error state
    Error,
}

impl ScanStatus {
    /// Human-readable status label
    pub fn label(&self) -> &'static str {
        match self {
            ScanStatus::Initializing => "Initializing",
            ScanStatus::Scanning => "Scanning",
            ScanStatus::Detected => "Detected",
            ScanStatus::NoCamera => "No camera",
            ScanStatus::Error => "Error",
        }
    }

    /// True for states that no transition leaves
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanStatus::Detected | ScanStatus::NoCamera | ScanStatus::Error
        )
    }
}

/// One scanning session, created per run and discarded on exit.
///
/// All mutation goes through the transition methods below; there is no
/// other way to move between states. The session is shared between the
/// scan loop and the UI behind a mutex.
#[derive(Debug, Clone)]
pub struct ScanSession {
    status: ScanStatus,
    status_message: String,
    decoded_result: String,
    is_scanning: bool,
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            status: ScanStatus::Initializing,
            status_message: String::from("Starting camera..."),
            decoded_result: String::new(),
            is_scanning: false,
        }
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn decoded_result(&self) -> &str {
        &self.decoded_result
    }

    /// Gate for the scan loop. Flipped once by successful acquisition.
    pub fn is_scanning(&self) -> bool {
        self.is_scanning
    }

    /// Camera acquisition succeeded, start scanning.
    pub fn begin_scanning(&mut self) {
        if self.status != ScanStatus::Initializing {
            warn!(status = ?self.status, "begin_scanning outside Initializing ignored");
            return;
        }
        self.status = ScanStatus::Scanning;
        self.status_message = String::from("Scanning for a QR code...");
        self.is_scanning = true;
        debug!("session scanning");
    }

    /// Camera acquisition failed. Terminal, never retried.
    pub fn fail_no_camera(&mut self, reason: &str) {
        if self.status != ScanStatus::Initializing {
            warn!(status = ?self.status, "fail_no_camera outside Initializing ignored");
            return;
        }
        self.status = ScanStatus::NoCamera;
        self.status_message = reason.to_string();
        self.is_scanning = false;
        info!(reason, "camera acquisition failed");
    }

    /// A decode attempt succeeded.
    ///
    /// The first call moves `Scanning` to `Detected` and returns true.
    /// The loop is not stopped on detection, so later successful decodes
    /// land here again: they overwrite the stored payload and return
    /// false while the status stays `Detected`. Whether the overwrite is
    /// desirable is an open question inherited from the behavior this
    /// mirrors; see DESIGN.md.
    pub fn record_detection(&mut self, content: &str) -> bool {
        match self.status {
            ScanStatus::Scanning => {
                self.status = ScanStatus::Detected;
                self.status_message = String::from("QR code detected");
                self.decoded_result = content.to_string();
                info!(content, "first detection");
                true
            }
            ScanStatus::Detected => {
                self.decoded_result = content.to_string();
                debug!(content, "detection overwrote previous result");
                false
            }
            _ => {
                warn!(status = ?self.status, "detection outside scanning ignored");
                false
            }
        }
    }

    /// A decode attempt found nothing. Re-enters `Scanning` idempotently;
    /// a no-op in every other state (nothing leaves a terminal state).
    pub fn reaffirm_scanning(&mut self) {
        if self.status == ScanStatus::Scanning {
            self.status_message = String::from("Scanning for a QR code...");
        }
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a manual submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A decoded payload was submitted; the caller should show a blocking
    /// acknowledgment with exactly this text
    Submitted(String),
    /// Nothing has been decoded yet
    NothingToSubmit,
}

/// User-triggered submit of the current result.
///
/// Pure function of the session: no state is mutated. With a decoded
/// payload present, the exact payload is logged and a success
/// notification raised; otherwise only a warning notification goes out.
pub fn submit(session: &ScanSession, notifier: &dyn Notifier) -> SubmitOutcome {
    let result = session.decoded_result();
    if result.is_empty() {
        notifier.notify(Notification::new(
            Severity::Warning,
            "Nothing to submit",
            "No QR code has been scanned yet",
        ));
        return SubmitOutcome::NothingToSubmit;
    }

    info!(result, "submitting decoded result");
    notifier.notify(Notification::new(Severity::Success, "Submitted", result));
    SubmitOutcome::Submitted(result.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_initializing() {
        let session = ScanSession::new();
        assert_eq!(session.status(), ScanStatus::Initializing);
        assert!(!session.is_scanning());
        assert!(session.decoded_result().is_empty());
    }

    #[test]
    fn test_begin_scanning_transition() {
        let mut session = ScanSession::new();
        session.begin_scanning();
        assert_eq!(session.status(), ScanStatus::Scanning);
        assert!(session.is_scanning());
    }

    #[test]
    fn test_fail_no_camera_is_terminal() {
        let mut session = ScanSession::new();
        session.fail_no_camera("permission denied");
        assert_eq!(session.status(), ScanStatus::NoCamera);
        assert!(!session.is_scanning());
        assert_eq!(session.status_message(), "permission denied");

        // No way back to scanning
        session.begin_scanning();
        assert_eq!(session.status(), ScanStatus::NoCamera);
        session.reaffirm_scanning();
        assert_eq!(session.status(), ScanStatus::NoCamera);
    }

    #[test]
    fn test_first_detection_transitions_once() {
        let mut session = ScanSession::new();
        session.begin_scanning();

        assert!(session.record_detection("HELLO"));
        assert_eq!(session.status(), ScanStatus::Detected);
        assert_eq!(session.decoded_result(), "HELLO");

        // Second detection overwrites, no second transition
        assert!(!session.record_detection("WORLD"));
        assert_eq!(session.status(), ScanStatus::Detected);
        assert_eq!(session.decoded_result(), "WORLD");
    }

    #[test]
    fn test_detection_before_scanning_ignored() {
        let mut session = ScanSession::new();
        assert!(!session.record_detection("X"));
        assert_eq!(session.status(), ScanStatus::Initializing);
        assert!(session.decoded_result().is_empty());
    }

    #[test]
    fn test_miss_keeps_detected_state() {
        let mut session = ScanSession::new();
        session.begin_scanning();
        session.record_detection("HELLO");

        session.reaffirm_scanning();
        assert_eq!(session.status(), ScanStatus::Detected);
        assert_eq!(session.decoded_result(), "HELLO");
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ScanStatus::Initializing.is_terminal());
        assert!(!ScanStatus::Scanning.is_terminal());
        assert!(ScanStatus::Detected.is_terminal());
        assert!(ScanStatus::NoCamera.is_terminal());
        assert!(ScanStatus::Error.is_terminal());
    }
}
