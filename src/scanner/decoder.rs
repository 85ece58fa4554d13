// SPDX-License-Identifier: GPL-3.0-only

//! QR decoding over RGBA pixel buffers
//!
//! The decoder is an injected strategy so the scan loop can be driven by
//! stubs in tests. The production implementation wraps the rqrr crate,
//! converting the RGBA buffer to grayscale and downscaling large frames
//! before detection.

use image::GrayImage;
use tracing::{debug, trace, warn};

/// QR decode strategy.
///
/// `pixels` is a flat RGBA byte array, four bytes per pixel, row-major,
/// `width * height * 4` bytes long. A pure, synchronous call: returns
/// the decoded text of the first readable code, or `None` when the
/// frame contains no decodable code. A miss is not an error.
pub trait QrDecoder: Send + Sync {
    fn decode(&self, pixels: &[u8], width: u32, height: u32) -> Option<String>;
}

/// QR decoder backed by rqrr
///
/// Frames larger than `max_dimension` on either side are downscaled
/// during grayscale conversion; QR finder patterns survive that easily
/// and detection cost drops with the pixel count.
pub struct RqrrDecoder {
    max_dimension: u32,
}

impl Default for RqrrDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RqrrDecoder {
    pub fn new() -> Self {
        Self {
            max_dimension: crate::constants::MAX_DECODE_DIMENSION,
        }
    }

    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl QrDecoder for RqrrDecoder {
    fn decode(&self, pixels: &[u8], width: u32, height: u32) -> Option<String> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() < expected || expected == 0 {
            warn!(
                len = pixels.len(),
                expected, "pixel buffer does not match dimensions"
            );
            return None;
        }

        let start = std::time::Instant::now();
        let (luma, luma_width, luma_height) =
            rgba_to_luma_scaled(pixels, width, height, self.max_dimension);

        let Some(gray) = GrayImage::from_raw(luma_width, luma_height, luma) else {
            warn!(luma_width, luma_height, "grayscale buffer construction failed");
            return None;
        };

        let mut prepared = rqrr::PreparedImage::prepare(gray);
        let grids = prepared.detect_grids();
        trace!(
            grids = grids.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "grid detection complete"
        );

        for grid in grids {
            match grid.decode() {
                Ok((_meta, content)) => {
                    debug!(
                        content = %content,
                        elapsed_ms = start.elapsed().as_millis(),
                        "decoded QR code"
                    );
                    return Some(content);
                }
                Err(e) => {
                    // A located but unreadable grid still counts as a miss
                    debug!(error = %e, "grid found but decode failed");
                }
            }
        }

        None
    }
}

/// Convert RGBA to a grayscale plane, downscaling by nearest-neighbor
/// sampling when either side exceeds `max_dimension`.
fn rgba_to_luma_scaled(
    pixels: &[u8],
    width: u32,
    height: u32,
    max_dimension: u32,
) -> (Vec<u8>, u32, u32) {
    let (out_width, out_height) = if width > max_dimension || height > max_dimension {
        let scale = (width as f32 / max_dimension as f32).max(height as f32 / max_dimension as f32);
        (
            ((width as f32 / scale) as u32).max(1),
            ((height as f32 / scale) as u32).max(1),
        )
    } else {
        (width, height)
    };

    let x_ratio = width as f32 / out_width as f32;
    let y_ratio = height as f32 / out_height as f32;

    let mut luma = Vec::with_capacity((out_width * out_height) as usize);
    for y in 0..out_height {
        let src_y = ((y as f32 * y_ratio) as u32).min(height - 1);
        for x in 0..out_width {
            let src_x = ((x as f32 * x_ratio) as u32).min(width - 1);
            let idx = ((src_y * width + src_x) * 4) as usize;
            luma.push(luma_byte(pixels[idx], pixels[idx + 1], pixels[idx + 2]));
        }
    }

    (luma, out_width, out_height)
}

/// BT.601 luma from RGB, integer arithmetic
fn luma_byte(r: u8, g: u8, b: u8) -> u8 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32) >> 8) as u8
}
