// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversions between `(height, width, channels)` arrays and the `image`
// crate's buffers, plus channel reordering.

use image::{DynamicImage, ImageBuffer, Pixel, RgbImage};
use ndarray::{Array3, Axis};
use pixprep_core::error::{Error, Result};
use pixprep_core::{ChannelOrder, Image, shape_of};

/// Build an array from an `image` buffer. Channel count comes from the pixel type.
pub fn from_buffer<P>(buffer: ImageBuffer<P, Vec<u8>>) -> Result<Image>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = buffer.dimensions();
    let channels = P::CHANNEL_COUNT as usize;
    Ok(Array3::from_shape_vec(
        (height as usize, width as usize, channels),
        buffer.into_raw(),
    )?)
}

/// Copy an array into an `image` buffer of pixel type `P`.
///
/// Fails if the array's channel count does not match `P`.
pub fn to_buffer<P>(image: &Image) -> Result<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8>,
{
    let (height, width, channels) = shape_of(image);
    if channels != P::CHANNEL_COUNT as usize {
        return Err(Error::InvalidParameter(format!(
            "expected {} channels, got {}",
            P::CHANNEL_COUNT,
            channels
        )));
    }
    // `iter` walks in logical (row-major) order regardless of memory layout.
    let raw: Vec<u8> = image.iter().copied().collect();
    ImageBuffer::from_raw(width as u32, height as u32, raw).ok_or_else(|| {
        Error::InvalidParameter(format!("buffer does not fit a {width}x{height} image"))
    })
}

/// Flatten a decoded image to three channels in the requested order.
///
/// Alpha is dropped and grayscale is replicated across the channels.
pub fn from_dynamic(image: &DynamicImage, order: ChannelOrder) -> Result<Image> {
    let rgb: RgbImage = image.to_rgb8();
    let array = from_buffer(rgb)?;
    match order {
        ChannelOrder::Rgb => Ok(array),
        ChannelOrder::Bgr => swap_red_blue(&array),
    }
}

/// Reverse the channel axis of a 3-channel image (RGB <-> BGR).
pub fn swap_red_blue(image: &Image) -> Result<Image> {
    let (_, _, channels) = shape_of(image);
    if channels != 3 {
        return Err(Error::InvalidParameter(format!(
            "channel swap needs a 3-channel image, got {channels}"
        )));
    }
    let mut view = image.view();
    view.invert_axis(Axis(2));
    Ok(view.as_standard_layout().into_owned())
}

/// Error for an image whose channel count an operation cannot handle.
pub(crate) fn unsupported_channels(channels: usize) -> Error {
    Error::InvalidParameter(format!(
        "unsupported channel count {channels}; expected 1, 3 or 4"
    ))
}
