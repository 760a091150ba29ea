// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Deskew — rotate a page about its centre with bicubic interpolation and
// replicated borders.
//
// `imageproc::geometric_transformations` fills uncovered pixels with a
// constant; a constant border shows up as a dark or light frame that the
// recogniser reads as glyphs, so the warp here clamps source coordinates to
// the image instead.

use image::{GrayImage, Luma};
use tracing::debug;

/// Cubic convolution coefficient (same as OpenCV's `INTER_CUBIC`).
const CUBIC_A: f64 = -0.75;

/// Rotate `gray` counter-clockwise by `degrees` about its centre.
///
/// Output has the input's dimensions. Source positions outside the image are
/// clamped to the nearest edge pixel.
pub fn rotate_about_center(gray: &GrayImage, degrees: f64) -> GrayImage {
    let (width, height) = gray.dimensions();
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let (sin, cos) = degrees.to_radians().sin_cos();

    debug!(degrees, width, height, "Rotating page");

    GrayImage::from_fn(width, height, |x, y| {
        // Inverse mapping: where in the source does this output pixel come from?
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        let sx = cx + cos * dx - sin * dy;
        let sy = cy + sin * dx + cos * dy;
        Luma([sample_bicubic(gray, sx, sy)])
    })
}

/// Sample `gray` at a fractional position using a 4×4 cubic kernel.
fn sample_bicubic(gray: &GrayImage, x: f64, y: f64) -> u8 {
    let (width, height) = gray.dimensions();
    let x0 = x.floor();
    let y0 = y.floor();
    let wx = cubic_weights(x - x0);
    let wy = cubic_weights(y - y0);

    let mut acc = 0.0;
    for (j, weight_y) in wy.iter().enumerate() {
        let sy = clamp_index(y0 as i64 - 1 + j as i64, height);
        let mut row = 0.0;
        for (i, weight_x) in wx.iter().enumerate() {
            let sx = clamp_index(x0 as i64 - 1 + i as i64, width);
            row += weight_x * gray.get_pixel(sx, sy).0[0] as f64;
        }
        acc += weight_y * row;
    }

    acc.round().clamp(0.0, 255.0) as u8
}

/// Weights for the four taps at offsets -1, 0, 1, 2 from the floor position.
fn cubic_weights(t: f64) -> [f64; 4] {
    let a = CUBIC_A;
    let w0 = ((a * (t + 1.0) - 5.0 * a) * (t + 1.0) + 8.0 * a) * (t + 1.0) - 4.0 * a;
    let w1 = ((a + 2.0) * t - (a + 3.0)) * t * t + 1.0;
    let w2 = ((a + 2.0) * (1.0 - t) - (a + 3.0)) * (1.0 - t) * (1.0 - t) + 1.0;
    let w3 = 1.0 - w0 - w1 - w2;
    [w0, w1, w2, w3]
}

/// Border replication.
fn clamp_index(index: i64, len: u32) -> u32 {
    index.clamp(0, len as i64 - 1) as u32
}
