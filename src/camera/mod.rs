// SPDX-License-Identifier: GPL-3.0-only

//! Camera acquisition and capture
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  UI / scan loop      │  ← consumes ScanFrame via FrameSource
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │     CameraStream     │  ← exclusive owner, drains to newest frame
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │   CapturePipeline    │  ← V4L2 thread, RGBA conversion
//! └──────────────────────┘
//! ```
//!
//! Acquisition runs once: enumerate devices, order them by the facing
//! preference, start the first pipeline that opens. Failures are
//! classified and reported; there is no automatic retry.

pub mod convert;
pub mod types;
pub mod v4l2;

pub use types::{CameraDevice, CaptureFormat, Facing, FrameReceiver, FrameSender, ScanFrame};
pub use v4l2::{CapturePipeline, enumerate_cameras};

use crate::config::Config;
use crate::constants::FRAME_CHANNEL_CAPACITY;
use crate::errors::CameraError;
use tracing::{debug, info, warn};

/// Anything the scan loop can pull frames from.
///
/// `latest_frame` returns the newest buffered frame, discarding any
/// older ones, or `None` when nothing new arrived since the last call.
pub trait FrameSource: Send {
    fn latest_frame(&mut self) -> Option<ScanFrame>;
}

/// An acquired camera stream.
///
/// Owns the capture pipeline exclusively; dropping the stream stops the
/// capture thread and releases the device. This is the only resource
/// cleanup the session needs.
pub struct CameraStream {
    _pipeline: CapturePipeline,
    receiver: FrameReceiver,
    device: CameraDevice,
    format: CaptureFormat,
}

impl CameraStream {
    pub fn device(&self) -> &CameraDevice {
        &self.device
    }

    pub fn format(&self) -> &CaptureFormat {
        &self.format
    }
}

impl FrameSource for CameraStream {
    fn latest_frame(&mut self) -> Option<ScanFrame> {
        let mut latest = None;
        // Drain everything buffered so a slow consumer sees the present,
        // not a backlog
        while let Ok(Some(frame)) = self.receiver.try_next() {
            latest = Some(frame);
        }
        latest
    }
}

/// Acquire a camera according to the configured preference.
///
/// Devices matching the preferred facing are tried first, devices with
/// unknown facing next, mismatching devices last. The first pipeline
/// that starts wins; if none does, the most specific error observed is
/// returned.
pub fn acquire(config: &Config) -> Result<CameraStream, CameraError> {
    if let Some(path) = &config.camera_path {
        let device = CameraDevice {
            name: path.clone(),
            path: path.clone(),
            facing: None,
        };
        return acquire_device(&device, config);
    }

    let mut cameras = enumerate_cameras();
    if cameras.is_empty() {
        return Err(CameraError::NoCameraFound);
    }

    cameras.sort_by_key(|device| facing_rank(device.facing, config.facing));

    let mut last_error = CameraError::NoCameraFound;
    for device in &cameras {
        match acquire_device(device, config) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                warn!(device = %device.name, error = %e, "camera not usable");
                last_error = e;
            }
        }
    }

    Err(last_error)
}

/// Start a capture pipeline on one specific device.
pub fn acquire_device(
    device: &CameraDevice,
    config: &Config,
) -> Result<CameraStream, CameraError> {
    info!(device = %device.name, path = %device.path, "acquiring camera");

    let (sender, receiver) = futures::channel::mpsc::channel(FRAME_CHANNEL_CAPACITY);
    let (pipeline, format) = CapturePipeline::start(
        device,
        config.preferred_width,
        config.preferred_height,
        sender,
    )?;

    debug!(device = %device.name, format = %format, "camera acquired");
    Ok(CameraStream {
        _pipeline: pipeline,
        receiver,
        device: device.clone(),
        format,
    })
}

/// Sort key for the facing preference: matches first, unknown second,
/// mismatches last. With `Facing::Any` every device ranks equally.
fn facing_rank(device_facing: Option<Facing>, preference: Facing) -> u8 {
    if preference == Facing::Any {
        return 0;
    }
    match device_facing {
        Some(facing) if facing == preference => 0,
        None => 1,
        Some(_) => 2,
    }
}
