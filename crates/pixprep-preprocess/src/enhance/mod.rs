// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image enhancement — binarization, Laplacian edge sharpening, gamma
// correction, global histogram equalization and CLAHE.
//
// Operations that work on intensity (sharpening, equalization, CLAHE) convert
// 3- and 4-channel input to grayscale assuming BGR(A) channel order, the order
// produced by `OpenCvBackend::read_bgr`. Their output has a single channel.

mod clahe;

use image::{GrayImage, Luma};
use imageproc::filter::laplacian_filter;
use ndarray::Array3;
use pixprep_core::error::{Error, Result};
use pixprep_core::{Image, shape_of};
use tracing::{debug, info, instrument};

use crate::array::{from_buffer, to_buffer, unsupported_channels};

pub use clahe::apply_clahe;

/// Set every sample above `threshold` to 255 and the rest to 0.
///
/// Applied per sample, so colour input stays colour.
#[instrument(skip(image), fields(shape = ?image.shape()))]
pub fn binarize(image: &Image, threshold: u8) -> Image {
    image.mapv(|value| if value > threshold { 255 } else { 0 })
}

/// Highlight edges with a 3x3 Laplacian.
///
/// The absolute response is saturated at 255, where an OpenCV
/// `np.uint8(np.abs(...))` cast would wrap around instead. Flat regions go
/// to zero.
#[instrument(skip(image), fields(shape = ?image.shape()))]
pub fn sharpen_edges(image: &Image) -> Result<Image> {
    let gray = to_gray(image)?;
    let response = laplacian_filter(&gray);
    let (width, height) = response.dimensions();

    let edges = Array3::from_shape_fn((height as usize, width as usize, 1), |(y, x, _)| {
        let value = response.get_pixel(x as u32, y as u32).0[0];
        value.unsigned_abs().min(u8::MAX as u16) as u8
    });
    debug!("Laplacian edge map computed");
    Ok(edges)
}

/// Remap intensities through `(i / 255) ^ (1 / gamma) * 255`.
///
/// `gamma > 1` brightens, `gamma < 1` darkens. Results are truncated to `u8`.
#[instrument(skip(image), fields(shape = ?image.shape()))]
pub fn gamma_correction(image: &Image, gamma: f64) -> Result<Image> {
    if !gamma.is_finite() || gamma <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "gamma must be a positive finite number, got {gamma}"
        )));
    }
    let table = gamma_table(gamma);
    info!(gamma, "Applying gamma correction");
    Ok(image.mapv(|value| table[value as usize]))
}

fn gamma_table(gamma: f64) -> [u8; 256] {
    let inv_gamma = 1.0 / gamma;
    let mut table = [0u8; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = ((i as f64 / 255.0).powf(inv_gamma) * 255.0) as u8;
    }
    table
}

/// Spread intensities over the full range with a global histogram
/// equalization. Useful for images with a narrow dynamic range.
///
/// Matches OpenCV's `equalizeHist`: intensities map through
/// `(cdf - cdf_min) * 255 / (total - cdf_min)`, so the darkest level present
/// lands on 0 and the brightest on 255. A constant image is returned as is.
#[instrument(skip(image), fields(shape = ?image.shape()))]
pub fn equalize_histogram(image: &Image) -> Result<Image> {
    let mut gray = to_gray(image)?;
    let table = equalization_table(&gray);
    for pixel in gray.pixels_mut() {
        pixel.0[0] = table[pixel.0[0] as usize];
    }
    from_buffer(gray)
}

fn equalization_table(gray: &GrayImage) -> [u8; 256] {
    let mut hist = [0u64; 256];
    for pixel in gray.pixels() {
        hist[pixel.0[0] as usize] += 1;
    }
    let total: u64 = hist.iter().sum();

    let mut table = [0u8; 256];
    let Some(first) = hist.iter().position(|&count| count > 0) else {
        return table;
    };
    if hist[first] == total {
        // Single intensity: leave it where it is.
        table[first] = first as u8;
        return table;
    }

    let scale = 255.0 / (total - hist[first]) as f64;
    let mut acc = 0u64;
    for level in first + 1..256 {
        acc += hist[level];
        table[level] = (acc as f64 * scale).round().min(255.0) as u8;
    }
    table
}

/// Convert to a single-channel intensity image.
///
/// 3- and 4-channel input is read as BGR(A) and weighted
/// `0.114 B + 0.587 G + 0.299 R`. Single-channel input is copied through.
pub fn to_gray(image: &Image) -> Result<GrayImage> {
    let (height, width, channels) = shape_of(image);
    match channels {
        1 => to_buffer::<Luma<u8>>(image),
        3 | 4 => Ok(GrayImage::from_fn(width as u32, height as u32, |x, y| {
            let (x, y) = (x as usize, y as usize);
            let blue = image[[y, x, 0]] as f64;
            let green = image[[y, x, 1]] as f64;
            let red = image[[y, x, 2]] as f64;
            Luma([(0.114 * blue + 0.587 * green + 0.299 * red).round() as u8])
        })),
        n => Err(unsupported_channels(n)),
    }
}
