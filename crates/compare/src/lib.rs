// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rp-compare: pixel-level similarity between two screenshots.
//!
//! Both images are flattened to RGB and cropped to their common top-left
//! area. The score is the mean absolute channel difference mapped onto
//! 0–100; changed areas are reported as connected regions of pixels whose
//! mean channel difference exceeds [`PIXEL_DIFF_THRESHOLD`].

mod regions;

use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Mean per-channel difference above which a pixel counts as changed.
pub const PIXEL_DIFF_THRESHOLD: u8 = 30;

/// Smallest connected component (in pixels) reported as a region.
pub const MIN_REGION_PIXELS: u32 = 100;

/// Most regions reported, largest first.
pub const MAX_REGIONS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("failed to decode {which} image: {source}")]
    Decode {
        which: &'static str,
        #[source]
        source: image::ImageError,
    },
    #[error("cannot compare an empty image ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Bounding box of one connected area of changed pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRegion {
    pub x: u32,
    pub y: u32,
    /// Inclusive extent: a single-column region has width 1.
    pub width: u32,
    pub height: u32,
    /// Number of changed pixels in the component.
    pub pixels: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// 0–100, rounded to two decimals.
    pub similarity: f64,
    /// Changed pixels across the compared area, including ones in
    /// components too small to be reported.
    pub diff_pixels: u64,
    pub regions: Vec<DiffRegion>,
    /// Compared (cropped) size.
    pub width: u32,
    pub height: u32,
}

impl Comparison {
    /// Changed pixels as a percentage of the compared area.
    pub fn diff_percentage(&self) -> f64 {
        let total = u64::from(self.width) * u64::from(self.height);
        if total == 0 {
            return 0.0;
        }
        self.diff_pixels as f64 / total as f64 * 100.0
    }
}

/// Compare two encoded images (PNG or JPEG).
pub fn compare(a: &[u8], b: &[u8]) -> Result<Comparison, CompareError> {
    let a = image::load_from_memory(a).map_err(|source| CompareError::Decode { which: "first", source })?;
    let b =
        image::load_from_memory(b).map_err(|source| CompareError::Decode { which: "second", source })?;
    compare_images(&a, &b)
}

/// Compare two decoded images.
pub fn compare_images(a: &DynamicImage, b: &DynamicImage) -> Result<Comparison, CompareError> {
    let a = a.to_rgb8();
    let b = b.to_rgb8();
    for img in [&a, &b] {
        if img.width() == 0 || img.height() == 0 {
            return Err(CompareError::EmptyImage { width: img.width(), height: img.height() });
        }
    }

    let width = a.width().min(b.width());
    let height = a.height().min(b.height());

    let (abs_sum, changed) = diff_map(&a, &b, width, height);
    let max_sum = 255.0 * 3.0 * f64::from(width) * f64::from(height);
    let similarity = round2((1.0 - abs_sum as f64 / max_sum) * 100.0);

    let diff_pixels = changed.iter().filter(|&&c| c).count() as u64;
    let regions = regions::label(&changed, width, height, MIN_REGION_PIXELS, MAX_REGIONS);

    Ok(Comparison { similarity, diff_pixels, regions, width, height })
}

/// Sum of absolute channel differences and the changed-pixel mask over the
/// top-left `width x height` area of both images.
fn diff_map(a: &RgbImage, b: &RgbImage, width: u32, height: u32) -> (u64, Vec<bool>) {
    // mean > threshold over three channels, kept in integers
    let changed_above = u16::from(PIXEL_DIFF_THRESHOLD) * 3;
    let mut abs_sum: u64 = 0;
    let mut mask = Vec::with_capacity((width as usize) * (height as usize));

    for y in 0..height {
        for x in 0..width {
            let pa = a.get_pixel(x, y).0;
            let pb = b.get_pixel(x, y).0;
            let d: u16 = pa
                .iter()
                .zip(pb.iter())
                .map(|(&ca, &cb)| u16::from(ca.abs_diff(cb)))
                .sum();
            abs_sum += u64::from(d);
            mask.push(d > changed_above);
        }
    }
    (abs_sum, mask)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
