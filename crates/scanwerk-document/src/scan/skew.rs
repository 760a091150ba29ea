// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Skew estimation — fit a minimum-area rectangle around the ink of a binary
// page and turn its orientation into a rotation that levels the text.
//
// Angles are in degrees, counter-clockwise positive as seen on screen (image
// y grows downwards). The rectangle angle is reported in [-90, 0).

use image::GrayImage;
use imageproc::geometry::convex_hull;
use imageproc::point::Point;
use tracing::debug;

use crate::raster::INK;

/// Hull edges shorter than this are ignored when searching orientations.
const MIN_EDGE_LENGTH: f64 = 1e-9;

/// A rectangle at arbitrary orientation, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedRect {
    pub center: (f64, f64),
    /// Extent along the direction given by `angle`.
    pub width: f64,
    /// Extent perpendicular to `angle`.
    pub height: f64,
    /// Orientation in [-90, 0).
    pub angle: f64,
}

impl RotatedRect {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Result of skew estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewEstimate {
    pub rect: RotatedRect,
    /// Rotation (counter-clockwise) that brings the text back to horizontal.
    pub correction_degrees: f64,
}

/// Turn a reported rectangle angle into a correction within ±45°.
///
/// Below −45° the rectangle is really standing on its other side, so the
/// skew is `−(90 + angle)`; otherwise it is `−angle`.
pub fn correction_for(reported_angle: f64) -> f64 {
    if reported_angle < -45.0 {
        -(90.0 + reported_angle)
    } else {
        -reported_angle
    }
}

/// Estimate the skew of a binary page from its ink pixels.
///
/// Returns `None` when the page has no ink at all.
pub fn estimate_skew(binary: &GrayImage) -> Option<SkewEstimate> {
    let outline = ink_outline(binary);
    let rect = min_area_rect(&outline)?;
    let correction_degrees = correction_for(rect.angle);
    debug!(
        outline_points = outline.len(),
        rect_angle = rect.angle,
        rect_width = rect.width,
        rect_height = rect.height,
        correction_degrees,
        "Skew estimated"
    );
    Some(SkewEstimate {
        rect,
        correction_degrees,
    })
}

/// Leftmost and rightmost ink pixel of every row.
///
/// These bound every other ink pixel, so their convex hull is the hull of
/// the whole ink set, at a fraction of the point count.
pub fn ink_outline(binary: &GrayImage) -> Vec<Point<i32>> {
    let mut outline = Vec::new();
    for (y, row) in binary.rows().enumerate() {
        let mut first: Option<u32> = None;
        let mut last: Option<u32> = None;
        for (x, pixel) in row.enumerate() {
            if pixel.0[0] == INK {
                first.get_or_insert(x as u32);
                last = Some(x as u32);
            }
        }
        if let (Some(first), Some(last)) = (first, last) {
            outline.push(Point::new(first as i32, y as i32));
            if last != first {
                outline.push(Point::new(last as i32, y as i32));
            }
        }
    }
    outline
}

/// Smallest-area rectangle (any orientation) enclosing `points`.
///
/// Rotating calipers over the convex hull: the optimal rectangle has one
/// side collinear with a hull edge, so only hull-edge directions are tried.
pub fn min_area_rect(points: &[Point<i32>]) -> Option<RotatedRect> {
    if points.is_empty() {
        return None;
    }

    let hull: Vec<(f64, f64)> = convex_hull(points)
        .iter()
        .map(|p| (p.x as f64, p.y as f64))
        .collect();

    let mut best: Option<RotatedRect> = None;
    let n = hull.len();

    for i in 0..n {
        let (x0, y0) = hull[i];
        let (x1, y1) = hull[(i + 1) % n];
        let (dx, dy) = (x1 - x0, y1 - y0);
        let length = dx.hypot(dy);
        if length < MIN_EDGE_LENGTH {
            continue;
        }

        // Unit vectors along the edge (u) and perpendicular to it (v).
        let (ux, uy) = (dx / length, dy / length);
        let (vx, vy) = (-uy, ux);

        let mut min_u = f64::INFINITY;
        let mut max_u = f64::NEG_INFINITY;
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        for &(x, y) in &hull {
            let u = x * ux + y * uy;
            let v = x * vx + y * vy;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        let extent_u = max_u - min_u;
        let extent_v = max_v - min_v;
        if best.is_some_and(|b| b.area() <= extent_u * extent_v) {
            continue;
        }

        let mid_u = (min_u + max_u) / 2.0;
        let mid_v = (min_v + max_v) / 2.0;
        let center = (mid_u * ux + mid_v * vx, mid_u * uy + mid_v * vy);

        // Screen orientation of the edge, then folded into [-90, 0).
        let edge_angle = (-uy).atan2(ux).to_degrees();
        let angle = edge_angle.rem_euclid(90.0) - 90.0;
        let quarter_turns = ((edge_angle - angle) / 90.0).round() as i64;
        let (width, height) = if quarter_turns.rem_euclid(2) == 1 {
            (extent_v, extent_u)
        } else {
            (extent_u, extent_v)
        };

        best = Some(RotatedRect {
            center,
            width,
            height,
            angle,
        });
    }

    // A single distinct point has no edges: a zero-size, level rectangle.
    let anchor = hull
        .first()
        .copied()
        .unwrap_or((points[0].x as f64, points[0].y as f64));
    Some(best.unwrap_or(RotatedRect {
        center: anchor,
        width: 0.0,
        height: 0.0,
        angle: -90.0,
    }))
}
