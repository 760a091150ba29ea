// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan pipeline — grayscale, noise suppression, Otsu binarization, skew
// estimation and deskew.

pub mod deskew;
pub mod normalize;
pub mod skew;

pub use normalize::ImageNormalizer;
pub use skew::{RotatedRect, SkewEstimate, estimate_skew};
