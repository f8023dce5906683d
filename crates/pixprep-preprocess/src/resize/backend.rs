// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decode-and-resize strategies backing `ImageResizer`.
//
// The two backends follow the conventions of the libraries they stand in for:
// the OpenCV-style backend reads BGR and takes sizes as (width, height); the
// tensor backend reads RGB and takes target sizes as (height, width).

use std::path::Path;

use fast_image_resize::images::Image as ResizeImage;
use fast_image_resize::{PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::Rgb;
use image::imageops::{self, FilterType};
use ndarray::Array3;
use pixprep_core::error::{Error, Result};
use pixprep_core::{ChannelOrder, Image};
use tracing::{debug, instrument};

use crate::array::{from_buffer, from_dynamic, swap_red_blue, to_buffer};

/// A strategy that loads an image file and resizes it to an exact size.
pub trait ResizeBackend {
    /// Short name of the backing library, as accepted in configuration.
    fn name(&self) -> &'static str;

    /// Decode `path` and stretch it to exactly `width` x `height`.
    ///
    /// Returns a `(height, width, 3)` array in RGB order.
    fn load_resized(&self, path: &Path, width: u32, height: u32) -> Result<Image>;
}

// ---------------------------------------------------------------------------
// OpenCV-style backend
// ---------------------------------------------------------------------------

/// Reads BGR, resizes bilinearly, converts to RGB on the way out.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvBackend;

impl OpenCvBackend {
    /// Decode a file to a 3-channel BGR array. Alpha is dropped and grayscale
    /// is expanded to three channels.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read_bgr(path: impl AsRef<Path>) -> Result<Image> {
        let decoded = image::open(path.as_ref())?;
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            "Image decoded"
        );
        from_dynamic(&decoded, ChannelOrder::Bgr)
    }

    /// Bilinear resize of a 3-channel array to `width` x `height`.
    ///
    /// Channel order is carried through untouched.
    pub fn resize_linear(image: &Image, width: u32, height: u32) -> Result<Image> {
        check_dimensions(width, height)?;
        let buffer = to_buffer::<Rgb<u8>>(image)?;
        let resized = imageops::resize(&buffer, width, height, FilterType::Triangle);
        from_buffer(resized)
    }
}

impl ResizeBackend for OpenCvBackend {
    fn name(&self) -> &'static str {
        "opencv"
    }

    fn load_resized(&self, path: &Path, width: u32, height: u32) -> Result<Image> {
        let bgr = Self::read_bgr(path)?;
        let resized = Self::resize_linear(&bgr, width, height)?;
        swap_red_blue(&resized)
    }
}

// ---------------------------------------------------------------------------
// Tensor-loader backend
// ---------------------------------------------------------------------------

/// Loads RGB and resizes with nearest-neighbour sampling straight into the
/// target buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TensorBackend;

impl TensorBackend {
    /// Load a file as an RGB array, optionally resized to
    /// `target_size = (height, width)`.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), ?target_size))]
    pub fn load_img(path: impl AsRef<Path>, target_size: Option<(u32, u32)>) -> Result<Image> {
        let decoded = image::open(path.as_ref())?.to_rgb8();
        let (src_width, src_height) = decoded.dimensions();
        debug!(src_width, src_height, "Image decoded");

        let Some((height, width)) = target_size else {
            return from_buffer(decoded);
        };
        check_dimensions(width, height)?;
        if (src_width, src_height) == (width, height) {
            return from_buffer(decoded);
        }

        let src = ResizeImage::from_vec_u8(src_width, src_height, decoded.into_raw(), PixelType::U8x3)
            .map_err(|err| Error::Resize(format!("failed to wrap source image: {err}")))?;
        let mut dst = ResizeImage::new(width, height, PixelType::U8x3);

        let mut resizer = Resizer::new();
        resizer
            .resize(
                &src,
                &mut dst,
                &ResizeOptions::new().resize_alg(ResizeAlg::Nearest),
            )
            .map_err(|err| Error::Resize(format!("nearest-neighbour resize failed: {err}")))?;

        Ok(Array3::from_shape_vec(
            (height as usize, width as usize, 3),
            dst.into_vec(),
        )?)
    }
}

impl ResizeBackend for TensorBackend {
    fn name(&self) -> &'static str {
        "tensorflow"
    }

    fn load_resized(&self, path: &Path, width: u32, height: u32) -> Result<Image> {
        Self::load_img(path, Some((height, width)))
    }
}

pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidParameter(format!(
            "target size must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};

    fn write_striped(dir: &Path) -> std::path::PathBuf {
        // Left half red, right half blue.
        let img = RgbImage::from_fn(40, 20, |x, _| {
            if x < 20 { Rgb([230, 10, 10]) } else { Rgb([10, 10, 230]) }
        });
        let path = dir.join("striped.png");
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn read_bgr_puts_blue_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_striped(dir.path());

        let bgr = OpenCvBackend::read_bgr(&path).unwrap();
        assert_eq!(bgr.shape(), &[20, 40, 3]);
        // Red pixel in BGR: blue channel first.
        assert_eq!(bgr[[0, 0, 0]], 10);
        assert_eq!(bgr[[0, 0, 2]], 230);
    }

    #[test]
    fn read_bgr_expands_grayscale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        GrayImage::from_pixel(8, 6, Luma([77])).save(&path).unwrap();

        let bgr = OpenCvBackend::read_bgr(&path).unwrap();
        assert_eq!(bgr.shape(), &[6, 8, 3]);
        assert!(bgr.iter().all(|&v| v == 77));
    }

    #[test]
    fn opencv_backend_returns_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_striped(dir.path());

        let out = OpenCvBackend.load_resized(&path, 10, 5).unwrap();
        assert_eq!(out.shape(), &[5, 10, 3]);
        assert!(out[[2, 0, 0]] > 200, "left edge should stay red");
        assert!(out[[2, 9, 2]] > 200, "right edge should stay blue");
    }

    #[test]
    fn tensor_backend_returns_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_striped(dir.path());

        let out = TensorBackend.load_resized(&path, 10, 5).unwrap();
        assert_eq!(out.shape(), &[5, 10, 3]);
        assert_eq!(out[[2, 0, 0]], 230);
        assert_eq!(out[[2, 9, 2]], 230);
    }

    #[test]
    fn load_img_without_target_keeps_source_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_striped(dir.path());

        let out = TensorBackend::load_img(&path, None).unwrap();
        assert_eq!(out.shape(), &[20, 40, 3]);
    }

    #[test]
    fn load_img_target_is_height_then_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_striped(dir.path());

        let out = TensorBackend::load_img(&path, Some((7, 13))).unwrap();
        assert_eq!(out.shape(), &[7, 13, 3]);
    }

    #[test]
    fn resize_linear_rejects_zero_size() {
        let image: Image = Array3::zeros((4, 4, 3));
        let err = OpenCvBackend::resize_linear(&image, 0, 4).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn backend_names_match_configuration_values() {
        assert_eq!(OpenCvBackend.name(), "opencv");
        assert_eq!(TensorBackend.name(), "tensorflow");
    }
}
