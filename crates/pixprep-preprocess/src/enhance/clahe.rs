// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contrast Limited Adaptive Histogram Equalization.

use ndarray::Array3;
use pixprep_core::Image;
use pixprep_core::error::{Error, Result};
use tracing::{debug, instrument};

use super::to_gray;

const BINS: usize = 256;

/// Apply CLAHE to the intensity of `image`.
///
/// The image is split into a `tile_grid` of `(columns, rows)` tiles. Each
/// tile's histogram is clipped at `clip_limit` times the average bin count,
/// the excess is spread evenly over all bins, and the resulting per-tile
/// mappings are blended bilinearly between neighbouring tile centres.
/// A `clip_limit` of zero disables clipping. Output has one channel.
///
/// When the grid does not divide the image evenly, the histograms are taken
/// over an image extended to the right and bottom by 101-reflection (the
/// border OpenCV uses), so the requested grid is always honoured.
#[instrument(skip(image), fields(shape = ?image.shape()))]
pub fn apply_clahe(image: &Image, clip_limit: f64, tile_grid: (usize, usize)) -> Result<Image> {
    let (tiles_x, tiles_y) = tile_grid;
    if tiles_x == 0 || tiles_y == 0 {
        return Err(Error::InvalidParameter(format!(
            "tile grid must be at least 1x1, got {tiles_x}x{tiles_y}"
        )));
    }
    if !clip_limit.is_finite() || clip_limit < 0.0 {
        return Err(Error::InvalidParameter(format!(
            "clip limit must be a non-negative finite number, got {clip_limit}"
        )));
    }

    let gray = to_gray(image)?;
    let (width, height) = gray.dimensions();
    let (cols, rows) = (width as usize, height as usize);
    if cols == 0 || rows == 0 {
        return Ok(Array3::zeros((rows, cols, 1)));
    }

    let (ext_cols, ext_rows) = if cols % tiles_x == 0 && rows % tiles_y == 0 {
        (cols, rows)
    } else {
        (cols + tiles_x - cols % tiles_x, rows + tiles_y - rows % tiles_y)
    };
    let tile_w = ext_cols / tiles_x;
    let tile_h = ext_rows / tiles_y;

    let sample = |r: usize, c: usize| -> u8 {
        gray.get_pixel(reflect_101(c, cols) as u32, reflect_101(r, rows) as u32).0[0]
    };

    let mut luts: Vec<[u8; BINS]> = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0u32; BINS];
            for r in ty * tile_h..(ty + 1) * tile_h {
                for c in tx * tile_w..(tx + 1) * tile_w {
                    hist[sample(r, c) as usize] += 1;
                }
            }
            luts.push(tile_lut(hist, tile_w * tile_h, clip_limit));
        }
    }
    debug!(tiles_x, tiles_y, tile_w, tile_h, ext_cols, ext_rows, "Tile mappings computed");

    // Tile coordinate of a pixel, its two neighbouring tiles and the weight
    // of the second one.
    let neighbours = |pos: usize, tile: usize, tiles: usize| -> (usize, usize, f64) {
        let t = pos as f64 / tile as f64 - 0.5;
        let lo = t.floor();
        let weight = t - lo;
        let first = lo.max(0.0) as usize;
        let second = ((lo + 1.0) as usize).min(tiles - 1);
        (first, second, weight)
    };

    Ok(Array3::from_shape_fn((rows, cols, 1), |(r, c, _)| {
        let value = gray.get_pixel(c as u32, r as u32).0[0] as usize;
        let (ty0, ty1, ya) = neighbours(r, tile_h, tiles_y);
        let (tx0, tx1, xa) = neighbours(c, tile_w, tiles_x);

        let at = |ty: usize, tx: usize| luts[ty * tiles_x + tx][value] as f64;
        let top = at(ty0, tx0) * (1.0 - xa) + at(ty0, tx1) * xa;
        let bottom = at(ty1, tx0) * (1.0 - xa) + at(ty1, tx1) * xa;
        (top * (1.0 - ya) + bottom * ya).round().clamp(0.0, 255.0) as u8
    }))
}

/// Mirror an out-of-range index back into `0..len` without repeating the
/// edge sample (`dcb|abcd|cba`).
fn reflect_101(mut index: usize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    index %= period;
    if index >= len { period - index } else { index }
}

/// Clipped-histogram intensity mapping for one tile of `area` pixels.
fn tile_lut(mut hist: [u32; BINS], area: usize, clip_limit: f64) -> [u8; BINS] {
    if clip_limit > 0.0 {
        let threshold = ((clip_limit * area as f64 / BINS as f64) as u32).max(1);
        let mut excess = 0u32;
        for count in &mut hist {
            if *count > threshold {
                excess += *count - threshold;
                *count = threshold;
            }
        }

        // Spread the excess evenly, then the remainder at a fixed stride.
        let per_bin = excess / BINS as u32;
        let mut remainder = (excess % BINS as u32) as usize;
        for count in &mut hist {
            *count += per_bin;
        }
        if remainder > 0 {
            let step = (BINS / remainder).max(1);
            let mut bin = 0;
            while bin < BINS && remainder > 0 {
                hist[bin] += 1;
                bin += step;
                remainder -= 1;
            }
        }
    }

    let scale = 255.0 / area.max(1) as f64;
    let mut lut = [0u8; BINS];
    let mut acc = 0u32;
    for (entry, &count) in lut.iter_mut().zip(hist.iter()) {
        acc += count;
        *entry = (acc as f64 * scale).round().min(255.0) as u8;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(size: usize) -> Image {
        Array3::from_shape_fn((size, size, 1), |(_, x, _)| 100 + (x / 4) as u8)
    }

    #[test]
    fn single_tile_without_clipping_equalizes_globally() {
        let image = gradient(64);
        let out = apply_clahe(&image, 40.0, (1, 1)).unwrap();

        assert_eq!(out.shape(), &[64, 64, 1]);
        assert_eq!(out.iter().copied().max(), Some(255));
        assert!(out.iter().copied().min().unwrap() < 100);
    }

    #[test]
    fn uniform_image_stays_uniform() {
        let image: Image = Array3::from_elem((32, 32, 1), 90);
        let out = apply_clahe(&image, 2.0, (4, 4)).unwrap();
        let first = out[[0, 0, 0]];
        assert!(out.iter().all(|&v| v == first));
    }

    #[test]
    fn tight_clip_limits_contrast_gain() {
        let image = gradient(64);
        let loose = apply_clahe(&image, 40.0, (1, 1)).unwrap();
        let tight = apply_clahe(&image, 1.0, (1, 1)).unwrap();

        let spread = |img: &Image| {
            let max = img.iter().copied().max().unwrap() as i32;
            let min = img.iter().copied().min().unwrap() as i32;
            max - min
        };
        assert!(spread(&tight) < spread(&loose));
    }

    #[test]
    fn colour_input_yields_one_channel() {
        let image: Image = Array3::from_elem((10, 12, 3), 128);
        let out = apply_clahe(&image, 2.0, (8, 8)).unwrap();
        assert_eq!(out.shape(), &[10, 12, 1]);
    }

    #[test]
    fn grid_finer_than_image_is_padded() {
        let image = gradient(4);
        let out = apply_clahe(&image, 2.0, (16, 16)).unwrap();
        assert_eq!(out.shape(), &[4, 4, 1]);
    }

    fn texture(rows: usize, cols: usize) -> Image {
        Array3::from_shape_fn((rows, cols, 1), |(y, x, _)| ((x * 37 + y * 91) % 256) as u8)
    }

    #[test]
    fn requested_grid_is_honoured() {
        // 3x3 tiles of 4 pixels (after padding 10 -> 12) against 5x5 tiles of 2.
        let image = texture(10, 10);
        let coarse = apply_clahe(&image, 0.0, (3, 3)).unwrap();
        let fine = apply_clahe(&image, 0.0, (5, 5)).unwrap();

        assert_ne!(coarse, fine);
        // Level 0 fills 2 of 16 samples in the coarse corner tile, 1 of 4 in the fine one.
        assert_eq!(coarse[[0, 0, 0]], 32);
        assert_eq!(fine[[0, 0, 0]], 64);
    }

    #[test]
    fn uneven_grid_matches_reflected_image() {
        let image = texture(10, 10);
        let reflect = |i: usize| if i < 10 { i } else { 18 - i };
        let padded = Array3::from_shape_fn((12, 12, 1), |(y, x, _)| {
            image[[reflect(y), reflect(x), 0]]
        });

        let out = apply_clahe(&image, 2.0, (4, 4)).unwrap();
        let reference = apply_clahe(&padded, 2.0, (4, 4)).unwrap();
        assert_eq!(out, reference.slice(ndarray::s![..10, ..10, ..]).to_owned());
    }

    #[test]
    fn reflect_101_skips_the_edge_sample() {
        let mirrored: Vec<usize> = (0..8).map(|i| reflect_101(i, 4)).collect();
        assert_eq!(mirrored, vec![0, 1, 2, 3, 2, 1, 0, 1]);
        assert_eq!(reflect_101(5, 1), 0);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let image = gradient(8);
        assert!(apply_clahe(&image, 2.0, (0, 4)).is_err());
        assert!(apply_clahe(&image, -1.0, (2, 2)).is_err());
    }
}
