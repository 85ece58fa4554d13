// SPDX-License-Identifier: GPL-3.0-only

//! Direct V4L2 camera capture
//!
//! Enumerates capture nodes, negotiates a raw format the CPU converters
//! understand, and streams frames from a dedicated thread into a bounded
//! channel as RGBA.

use super::convert::{self, SUPPORTED_FOURCCS};
use super::types::{CameraDevice, CaptureFormat, Facing, FrameSender, ScanFrame};
use crate::constants::CAPTURE_BUFFER_COUNT;
use crate::errors::CameraError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use v4l::FourCC;
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;

/// Enumerate V4L2 capture devices.
///
/// Scans `/sys/class/video4linux` and keeps nodes that expose at least
/// one video capture format (this drops the metadata nodes UVC cameras
/// register next to the capture node). Nodes that cannot be opened due
/// to missing permissions are kept so acquisition can surface the
/// denial instead of reporting "no camera".
pub fn enumerate_cameras() -> Vec<CameraDevice> {
    let mut cameras = Vec::new();

    let entries = match std::fs::read_dir("/sys/class/video4linux") {
        Ok(entries) => entries,
        Err(_) => return cameras,
    };

    let mut nodes: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            name.starts_with("video").then_some(name)
        })
        .collect();
    nodes.sort_by_key(|node| node_index(node));

    for node in nodes {
        let path = format!("/dev/{}", node);
        let name = sysfs_card_name(&node).unwrap_or_else(|| node.clone());

        match Device::with_path(&path) {
            Ok(dev) => {
                let has_capture_formats = dev
                    .enum_formats()
                    .map(|formats| !formats.is_empty())
                    .unwrap_or(false);
                if !has_capture_formats {
                    debug!(path = %path, "skipping node without capture formats");
                    continue;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                debug!(path = %path, "capture node not readable, keeping for acquisition");
            }
            Err(e) => {
                debug!(path = %path, error = %e, "skipping unopenable node");
                continue;
            }
        }

        let facing = infer_facing(&name);
        debug!(path = %path, name = %name, ?facing, "found camera");
        cameras.push(CameraDevice { name, path, facing });
    }

    cameras
}

/// Numeric index of a `videoN` node name, for stable ordering.
fn node_index(node: &str) -> u32 {
    node.trim_start_matches("video").parse().unwrap_or(u32::MAX)
}

/// Read the card name from sysfs for a video node.
fn sysfs_card_name(node: &str) -> Option<String> {
    let name = std::fs::read_to_string(format!("/sys/class/video4linux/{}/name", node))
        .ok()?
        .trim()
        .to_string();
    (!name.is_empty()).then_some(name)
}

/// Guess camera facing from its name.
///
/// Device-tree and UVC names on phones and convertibles commonly carry
/// an orientation word; desktop webcams usually do not and stay `None`.
fn infer_facing(name: &str) -> Option<Facing> {
    let lower = name.to_lowercase();
    if ["back", "rear", "world"].iter().any(|w| lower.contains(w)) {
        Some(Facing::Environment)
    } else if ["front", "user", "selfie"].iter().any(|w| lower.contains(w)) {
        Some(Facing::User)
    } else {
        None
    }
}

/// Bytes per pixel of a raw fourcc, used when the driver reports no stride.
fn fourcc_bytes_per_pixel(fourcc: &[u8; 4]) -> u32 {
    match fourcc {
        b"YUYV" | b"UYVY" => 2,
        b"RGB3" => 3,
        b"GREY" => 1,
        _ => 4,
    }
}

/// Capture pipeline streaming RGBA frames from one camera.
///
/// Owns the capture thread. The device is held for the lifetime of the
/// pipeline and released when the thread exits; dropping the pipeline
/// signals the thread to stop.
pub struct CapturePipeline {
    running: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
    device_path: String,
}

impl CapturePipeline {
    /// Open the device, negotiate a format near the advisory resolution,
    /// and start streaming converted frames into `sender`.
    ///
    /// The advisory size is a request: the driver adjusts to the nearest
    /// size it supports and the adjusted format is returned.
    pub fn start(
        device: &CameraDevice,
        preferred_width: u32,
        preferred_height: u32,
        sender: FrameSender,
    ) -> Result<(Self, CaptureFormat), CameraError> {
        let dev = Device::with_path(&device.path)
            .map_err(|e| CameraError::from_open_error(&e, &device.path))?;

        let format = negotiate_format(&dev, preferred_width, preferred_height)?;
        info!(device = %device.name, format = %format, "starting capture pipeline");

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let thread_format = format.clone();
        let device_path = device.path.clone();
        let thread_path = device_path.clone();

        // The thread owns the device; it is released when the loop exits
        let thread_handle = std::thread::spawn(move || {
            capture_loop(dev, &thread_path, &thread_format, sender, running_clone);
        });

        Ok((
            Self {
                running,
                thread_handle: Some(thread_handle),
                device_path,
            },
            format,
        ))
    }

    /// Stop the capture thread and wait for it to release the device.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            debug!(path = %self.device_path, "waiting for capture thread");
            if handle.join().is_err() {
                warn!(path = %self.device_path, "capture thread panicked");
            }
        }
    }
}

impl Drop for CapturePipeline {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // The thread notices the flag on its next buffer; no join here,
        // it may be blocked on the driver
    }
}

/// Pick a supported fourcc and request the advisory resolution.
fn negotiate_format(
    dev: &Device,
    preferred_width: u32,
    preferred_height: u32,
) -> Result<CaptureFormat, CameraError> {
    let descriptions = dev
        .enum_formats()
        .map_err(|e| CameraError::InitializationFailed(format!("format query: {}", e)))?;

    let fourcc = SUPPORTED_FOURCCS
        .iter()
        .find(|cc| descriptions.iter().any(|d| d.fourcc == FourCC::new(cc)))
        .ok_or_else(|| {
            let offered: Vec<String> = descriptions
                .iter()
                .map(|d| d.fourcc.to_string())
                .collect();
            CameraError::InvalidFormat(offered.join(", "))
        })?;

    let mut fmt = dev
        .format()
        .map_err(|e| CameraError::InitializationFailed(format!("format read: {}", e)))?;
    fmt.width = preferred_width;
    fmt.height = preferred_height;
    fmt.fourcc = FourCC::new(fourcc);

    let actual = dev
        .set_format(&fmt)
        .map_err(|e| CameraError::InitializationFailed(format!("format set: {}", e)))?;

    if actual.fourcc != FourCC::new(fourcc) {
        return Err(CameraError::InvalidFormat(format!(
            "driver substituted {}",
            actual.fourcc
        )));
    }
    if actual.width != preferred_width || actual.height != preferred_height {
        debug!(
            requested_width = preferred_width,
            requested_height = preferred_height,
            width = actual.width,
            height = actual.height,
            "driver adjusted advisory resolution"
        );
    }

    let stride = if actual.stride == 0 {
        actual.width * fourcc_bytes_per_pixel(fourcc)
    } else {
        actual.stride
    };

    Ok(CaptureFormat {
        width: actual.width,
        height: actual.height,
        fourcc: **fourcc,
        stride,
    })
}

/// Capture thread body: mmap streaming, RGBA conversion, channel send.
fn capture_loop(
    mut dev: Device,
    device_path: &str,
    format: &CaptureFormat,
    mut sender: FrameSender,
    running: Arc<AtomicBool>,
) {
    let mut stream = match MmapStream::with_buffers(&mut dev, Type::VideoCapture, CAPTURE_BUFFER_COUNT)
    {
        Ok(stream) => stream,
        Err(e) => {
            error!(path = device_path, error = %e, "failed to start capture stream");
            return;
        }
    };

    info!(path = device_path, "capture stream started");
    let mut frame_count: u64 = 0;

    while running.load(Ordering::SeqCst) {
        match stream.next() {
            Ok((buf, meta)) => {
                frame_count += 1;

                let Some(rgba) =
                    convert::to_rgba(&format.fourcc, buf, format.width, format.height, format.stride)
                else {
                    if frame_count % 30 == 1 {
                        warn!(
                            path = device_path,
                            size = buf.len(),
                            "frame buffer did not match negotiated format"
                        );
                    }
                    continue;
                };

                let frame = ScanFrame {
                    width: format.width,
                    height: format.height,
                    data: Arc::from(rgba),
                    sequence: meta.sequence,
                    captured_at: Instant::now(),
                };

                // Non-blocking: a full channel means the consumer is
                // behind, dropping this frame is the right call
                if sender.try_send(frame).is_err() && frame_count % 60 == 0 {
                    debug!(path = device_path, frame_count, "frame dropped, channel full");
                }
            }
            Err(e) => {
                warn!(path = device_path, error = %e, "frame capture failed");
                std::thread::sleep(std::time::Duration::from_millis(10));
            }
        }
    }

    info!(path = device_path, frame_count, "capture loop exiting");
}
