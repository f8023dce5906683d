// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Normalization of 8-bit images into floating-point model inputs.

use pixprep_core::error::{Error, Result};
use pixprep_core::{FloatImage, Image};
use tracing::{debug, instrument};

/// Z-score normalization: `(x - mean) / std` over every sample.
///
/// Uses the population standard deviation. Fails on an empty or constant
/// image, where the result would be undefined.
#[instrument(skip(image), fields(shape = ?image.shape()))]
pub fn z_score(image: &Image) -> Result<FloatImage> {
    let values = image.mapv(f64::from);
    let mean = values
        .mean()
        .ok_or_else(|| Error::InvalidParameter("cannot normalize an empty image".into()))?;
    let std = values.std(0.0);
    if std == 0.0 {
        return Err(Error::InvalidParameter(
            "cannot z-score normalize an image with zero variance".into(),
        ));
    }
    debug!(mean, std, "Computed image statistics");
    Ok(values.mapv(|v| (v - mean) / std))
}

/// Scale samples into `[0, factor]` via `factor * (x / 255)`.
///
/// `factor = 1.0` is min-max scaling to `[0, 1]`.
pub fn custom_norm(image: &Image, factor: f64) -> FloatImage {
    image.mapv(|v| factor * (f64::from(v) / 255.0))
}
