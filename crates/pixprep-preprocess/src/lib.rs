// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pixprep-preprocess — Image preprocessing over `(height, width, channels)`
// arrays.
//
// Provides loading and exact-size resizing through two selectable backends,
// denoising (Gaussian blur, median filter), enhancement (binarization, edge
// sharpening, gamma correction, histogram equalization, CLAHE), and
// normalization (z-score, scaled min-max).

pub mod array;
pub mod denoise;
pub mod enhance;
pub mod normalize;
pub mod resize;

// Re-export the primary types so callers can use `pixprep_preprocess::ImageResizer` etc.
pub use resize::{ImageResizer, Library, OpenCvBackend, ResizeBackend, TensorBackend};
