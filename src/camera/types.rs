// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera capture

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Camera facing preference.
///
/// V4L2 does not report facing directly, so it is inferred from device
/// names; the preference is advisory and devices with unknown facing
/// remain eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Facing {
    /// Rear-facing (world) camera, preferred for scanning
    #[default]
    Environment,
    /// Front-facing (selfie) camera
    User,
    /// No preference
    Any,
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Facing::Environment => write!(f, "rear"),
            Facing::User => write!(f, "front"),
            Facing::Any => write!(f, "any"),
        }
    }
}

/// Represents a camera device
#[derive(Debug, Clone)]
pub struct CameraDevice {
    /// Card name from sysfs, falls back to the node name
    pub name: String,
    /// Capture node path (e.g., /dev/video0)
    pub path: String,
    /// Facing inferred from the device name, if recognizable
    pub facing: Option<Facing>,
}

/// Negotiated capture format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFormat {
    pub width: u32,
    pub height: u32,
    /// FourCC code of the raw device format (e.g., "YUYV")
    pub fourcc: [u8; 4],
    /// Bytes per row of the raw device buffer, may include padding
    pub stride: u32,
}

impl std::fmt::Display for CaptureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} ({})",
            self.width,
            self.height,
            String::from_utf8_lossy(&self.fourcc)
        )
    }
}

/// One captured frame, converted to RGBA.
///
/// `data` is a tightly packed flat byte array, four bytes per pixel in
/// RGBA order, `width * height * 4` bytes long. This is the pixel buffer
/// handed to the decoder and sampled by the preview widget.
#[derive(Debug, Clone)]
pub struct ScanFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    /// Driver frame sequence number
    pub sequence: u32,
    /// Timestamp when the frame was captured
    pub captured_at: Instant,
}

impl ScanFrame {
    /// The raw RGBA byte array
    pub fn rgba(&self) -> &[u8] {
        &self.data
    }

    /// Sample one pixel, clamping out-of-range coordinates to the edge.
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.width == 0 || self.height == 0 {
            return (0, 0, 0);
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = ((y * self.width + x) * 4) as usize;
        if idx + 2 < self.data.len() {
            (self.data[idx], self.data[idx + 1], self.data[idx + 2])
        } else {
            (0, 0, 0)
        }
    }
}

/// Frame channel sender type
pub type FrameSender = futures::channel::mpsc::Sender<ScanFrame>;

/// Frame channel receiver type
pub type FrameReceiver = futures::channel::mpsc::Receiver<ScanFrame>;
