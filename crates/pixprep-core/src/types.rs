// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core pixel-array types for pixprep.

use ndarray::{Array3, Axis};
use serde::{Deserialize, Serialize};

/// An 8-bit image laid out as `(height, width, channels)`.
///
/// The array carries no metadata: channel order depends on where it came
/// from (see [`ChannelOrder`]).
pub type Image = Array3<u8>;

/// A floating-point image, `(height, width, channels)`, as produced by the
/// normalizers.
pub type FloatImage = Array3<f64>;

/// Ordering of the colour channels in a 3-channel [`Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelOrder {
    /// Red, green, blue. What most decoders produce.
    Rgb,
    /// Blue, green, red. What OpenCV-style readers produce.
    Bgr,
}

/// `(height, width, channels)` of an image, as `usize`.
pub fn shape_of<T>(image: &Array3<T>) -> (usize, usize, usize) {
    (
        image.len_of(Axis(0)),
        image.len_of(Axis(1)),
        image.len_of(Axis(2)),
    )
}
