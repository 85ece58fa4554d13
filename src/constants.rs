// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Cadence of the scan loop, one decode attempt per tick.
///
/// 16 ms approximates a 60 Hz display-refresh callback. The tick is a
/// target, not a guarantee: a slow decode simply delays the next tick,
/// ticks never overlap.
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Capacity of the capture-to-consumer frame channel.
///
/// When the consumer falls behind, new frames are dropped at the sender
/// and the consumer drains to the newest frame on its next tick.
pub const FRAME_CHANNEL_CAPACITY: usize = 10;

/// Advisory capture resolution requested from the driver.
///
/// The driver may adjust to the nearest supported size; whatever comes
/// back is used as-is. QR codes do not benefit from higher resolutions
/// and lower resolutions keep per-tick decode cost down.
pub const PREFERRED_WIDTH: u32 = 640;
pub const PREFERRED_HEIGHT: u32 = 480;

/// Frames larger than this on either side are downscaled before decoding.
pub const MAX_DECODE_DIMENSION: u32 = 640;

/// Number of memory-mapped capture buffers.
pub const CAPTURE_BUFFER_COUNT: u32 = 4;

/// How long a notification toast stays visible in the terminal UI.
pub const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Polling interval for the headless wait loop in `qrscan once`.
pub const ONCE_POLL_INTERVAL: Duration = Duration::from_millis(100);
