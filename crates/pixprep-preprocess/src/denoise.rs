// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Denoising — Gaussian blur and median filtering. Thin wrappers over the
// `imageproc` filters, working on 1-, 3- or 4-channel arrays.

use image::{Luma, Rgb, Rgba};
use imageproc::filter::{median_filter as imageproc_median, separable_filter};
use pixprep_core::error::{Error, Result};
use pixprep_core::{Image, shape_of};
use tracing::{debug, instrument};

use crate::array::{from_buffer, to_buffer, unsupported_channels};

/// Apply a Gaussian blur with a `(width, height)` kernel.
///
/// Both kernel sizes must be odd. Larger kernels and deviations blur more.
/// A `deviation` of zero or below derives sigma from each kernel size using
/// `0.3 * ((k - 1) * 0.5 - 1) + 0.8`.
#[instrument(skip(image), fields(shape = ?image.shape()))]
pub fn gaussian_blur(image: &Image, kernel: (u32, u32), deviation: f64) -> Result<Image> {
    let (kernel_w, kernel_h) = kernel;
    check_odd("Gaussian kernel width", kernel_w)?;
    check_odd("Gaussian kernel height", kernel_h)?;

    let h_kernel = gaussian_kernel(kernel_w, deviation);
    let v_kernel = gaussian_kernel(kernel_h, deviation);
    debug!(kernel_w, kernel_h, deviation, "Gaussian kernels built");

    let (_, _, channels) = shape_of(image);
    match channels {
        1 => from_buffer(separable_filter(
            &to_buffer::<Luma<u8>>(image)?,
            &h_kernel,
            &v_kernel,
        )),
        3 => from_buffer(separable_filter(
            &to_buffer::<Rgb<u8>>(image)?,
            &h_kernel,
            &v_kernel,
        )),
        4 => from_buffer(separable_filter(
            &to_buffer::<Rgba<u8>>(image)?,
            &h_kernel,
            &v_kernel,
        )),
        n => Err(unsupported_channels(n)),
    }
}

/// Replace each sample with the median of its `kernel` x `kernel`
/// neighbourhood. `kernel` must be odd and greater than one.
#[instrument(skip(image), fields(shape = ?image.shape()))]
pub fn median_filter(image: &Image, kernel: u32) -> Result<Image> {
    check_odd("median kernel", kernel)?;
    if kernel < 3 {
        return Err(Error::InvalidParameter(format!(
            "median kernel must be greater than 1, got {kernel}"
        )));
    }
    let radius = kernel / 2;

    let (_, _, channels) = shape_of(image);
    match channels {
        1 => from_buffer(imageproc_median(&to_buffer::<Luma<u8>>(image)?, radius, radius)),
        3 => from_buffer(imageproc_median(&to_buffer::<Rgb<u8>>(image)?, radius, radius)),
        4 => from_buffer(imageproc_median(&to_buffer::<Rgba<u8>>(image)?, radius, radius)),
        n => Err(unsupported_channels(n)),
    }
}

fn check_odd(what: &str, size: u32) -> Result<()> {
    if size % 2 == 0 {
        return Err(Error::InvalidParameter(format!(
            "{what} must be odd and positive, got {size}"
        )));
    }
    Ok(())
}

/// Normalised 1-D Gaussian weights of length `size`.
fn gaussian_kernel(size: u32, deviation: f64) -> Vec<f32> {
    let sigma = if deviation > 0.0 {
        deviation
    } else {
        0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let center = (size / 2) as f64;
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - center;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / total) as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn impulse(size: usize, channels: usize) -> Image {
        let mut image: Image = Array3::zeros((size, size, channels));
        let c = size / 2;
        for ch in 0..channels {
            image[[c, c, ch]] = 255;
        }
        image
    }

    #[test]
    fn gaussian_kernel_is_normalised_and_symmetric() {
        let kernel = gaussian_kernel(5, 1.2);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!((kernel[0] - kernel[4]).abs() < 1e-7);
        assert!(kernel[2] > kernel[1]);
    }

    #[test]
    fn gaussian_kernel_of_one_is_identity() {
        assert_eq!(gaussian_kernel(1, 0.0), vec![1.0]);
    }

    #[test]
    fn gaussian_blur_spreads_an_impulse() {
        let image = impulse(9, 3);
        let blurred = gaussian_blur(&image, (5, 5), 1.0).unwrap();

        assert_eq!(blurred.shape(), image.shape());
        assert!(blurred[[4, 4, 0]] < 255);
        assert!(blurred[[4, 5, 0]] > 0);
        assert!(blurred[[5, 4, 2]] > 0);
    }

    #[test]
    fn larger_deviation_blurs_more() {
        let image = impulse(15, 1);
        let soft = gaussian_blur(&image, (9, 9), 0.8).unwrap();
        let strong = gaussian_blur(&image, (9, 9), 3.0).unwrap();
        assert!(strong[[7, 7, 0]] < soft[[7, 7, 0]]);
    }

    #[test]
    fn gaussian_blur_rejects_even_kernel() {
        let image = impulse(9, 1);
        let err = gaussian_blur(&image, (4, 5), 1.0).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn median_filter_removes_salt_noise() {
        let mut image: Image = Array3::from_elem((7, 7, 1), 50);
        image[[3, 3, 0]] = 255;

        let filtered = median_filter(&image, 3).unwrap();
        assert_eq!(filtered[[3, 3, 0]], 50);
        assert_eq!(filtered.shape(), &[7, 7, 1]);
    }

    #[test]
    fn median_filter_handles_colour() {
        let mut image: Image = Array3::from_elem((5, 5, 3), 80);
        image[[2, 2, 1]] = 0;

        let filtered = median_filter(&image, 3).unwrap();
        assert_eq!(filtered[[2, 2, 1]], 80);
    }

    #[test]
    fn median_filter_rejects_invalid_kernels() {
        let image: Image = Array3::zeros((5, 5, 1));
        assert!(median_filter(&image, 4).is_err());
        assert!(median_filter(&image, 1).is_err());
    }

    #[test]
    fn two_channel_images_are_rejected() {
        let image: Image = Array3::zeros((5, 5, 2));
        assert!(median_filter(&image, 3).is_err());
        assert!(gaussian_blur(&image, (3, 3), 0.0).is_err());
    }
}
