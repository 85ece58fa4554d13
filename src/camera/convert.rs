// SPDX-License-Identifier: GPL-3.0-only

//! CPU pixel format conversion to RGBA
//!
//! The capture pipeline normalizes every device format into the tightly
//! packed RGBA buffer the rest of the system consumes. Only formats with
//! a converter here are negotiated with the driver.

/// FourCC codes the converters understand, in preference order.
///
/// YUYV first: it is the most widely supported raw webcam format.
pub const SUPPORTED_FOURCCS: [&[u8; 4]; 4] = [b"YUYV", b"UYVY", b"RGB3", b"GREY"];

/// Convert a raw device buffer to tightly packed RGBA.
///
/// `stride` is the bytes-per-row of the source buffer; padding beyond the
/// used row width is skipped. Returns `None` for unknown fourccs or
/// buffers shorter than `stride * height`.
pub fn to_rgba(fourcc: &[u8; 4], data: &[u8], width: u32, height: u32, stride: u32) -> Option<Vec<u8>> {
    let row_bytes = match fourcc {
        b"YUYV" | b"UYVY" => width.checked_mul(2)?,
        b"RGB3" => width.checked_mul(3)?,
        b"GREY" => width,
        _ => return None,
    };
    if stride < row_bytes {
        return None;
    }
    // The last row only needs its used bytes, not the full stride
    let needed = (stride as usize) * (height as usize).checked_sub(1)? + row_bytes as usize;
    if needed > data.len() {
        return None;
    }

    match fourcc {
        b"YUYV" => Some(packed_422_to_rgba(data, width, height, stride, false)),
        b"UYVY" => Some(packed_422_to_rgba(data, width, height, stride, true)),
        b"RGB3" => Some(rgb24_to_rgba(data, width, height, stride)),
        b"GREY" => Some(gray_to_rgba(data, width, height, stride)),
        _ => None,
    }
}

/// Convert packed YUV 4:2:2 to RGBA.
///
/// Each 4-byte group encodes 2 pixels. YUYV lays out Y0 U Y1 V; UYVY
/// lays out U Y0 V Y1 (`chroma_first`). Uses BT.601 coefficients.
fn packed_422_to_rgba(data: &[u8], width: u32, height: u32, stride: u32, chroma_first: bool) -> Vec<u8> {
    let width = width as usize;
    let height = height as usize;
    let stride = stride as usize;
    let mut rgba = Vec::with_capacity(width * height * 4);

    for row in 0..height {
        let row_data = &data[row * stride..row * stride + width * 2];
        let mut emitted = 0usize;
        for chunk in row_data.chunks_exact(4) {
            let (y0, u, y1, v) = if chroma_first {
                (chunk[1], chunk[0], chunk[3], chunk[2])
            } else {
                (chunk[0], chunk[1], chunk[2], chunk[3])
            };

            for y in [y0, y1] {
                if emitted >= width {
                    break;
                }
                let (r, g, b) = yuv_to_rgb(y, u, v);
                rgba.extend_from_slice(&[r, g, b, 255]);
                emitted += 1;
            }
        }
    }

    rgba
}

/// Convert 24-bit RGB to RGBA by appending an opaque alpha channel.
fn rgb24_to_rgba(data: &[u8], width: u32, height: u32, stride: u32) -> Vec<u8> {
    let width = width as usize;
    let height = height as usize;
    let stride = stride as usize;
    let mut rgba = Vec::with_capacity(width * height * 4);

    for row in 0..height {
        let row_data = &data[row * stride..row * stride + width * 3];
        for px in row_data.chunks_exact(3) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
    }

    rgba
}

/// Convert 8-bit grayscale to RGBA.
fn gray_to_rgba(data: &[u8], width: u32, height: u32, stride: u32) -> Vec<u8> {
    let width = width as usize;
    let height = height as usize;
    let stride = stride as usize;
    let mut rgba = Vec::with_capacity(width * height * 4);

    for row in 0..height {
        let row_data = &data[row * stride..row * stride + width];
        for &v in row_data {
            rgba.extend_from_slice(&[v, v, v, 255]);
        }
    }

    rgba
}

/// Convert YUV (BT.601) to RGB
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    (r, g, b)
}
