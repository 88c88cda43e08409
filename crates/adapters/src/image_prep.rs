// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Screenshot preparation for model uploads.
//!
//! Images are cropped when very tall, flattened onto white, then encoded as
//! the first of PNG, JPEG q90, or a stepped JPEG quality/scale reduction whose
//! base64 form fits the byte budget.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default ceiling on the base64 payload size.
pub const DEFAULT_IMAGE_BUDGET: usize = 3_600_000;

const MAX_COMPRESSION_ATTEMPTS: u32 = 20;

#[derive(Debug, Error)]
pub enum ImagePrepError {
    #[error("Image file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to decode screenshot: {0}")]
    DecodeBytes(#[source] image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Png,
    Jpeg,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
        }
    }
}

/// Base64 image ready for an upload body.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: String,
    pub media_type: MediaType,
}

/// JPEG settings for one compression attempt. Scale is in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression {
    pub quality: u8,
    pub scale_pct: u32,
}

impl Compression {
    pub const INITIAL: Compression = Compression { quality: 85, scale_pct: 100 };
    /// Used once the stepped reduction gives up.
    pub const LAST_RESORT: Compression = Compression { quality: 60, scale_pct: 25 };

    /// Settings for the attempt after this one, or `None` when scale has
    /// dropped below 30%.
    pub fn next(self) -> Option<Compression> {
        let Compression { quality, scale_pct } = self;
        let step = if quality > 70 {
            Compression { quality: quality - 5, scale_pct }
        } else if quality > 50 {
            Compression { quality: quality - 3, scale_pct }
        } else if scale_pct > 70 {
            Compression { quality: 85, scale_pct: scale_pct - 5 }
        } else if scale_pct > 50 {
            Compression { quality: 80, scale_pct: scale_pct - 5 }
        } else {
            Compression { quality: 75, scale_pct: scale_pct.saturating_sub(5) }
        };
        (step.scale_pct >= 30).then_some(step)
    }
}

/// Crop very tall captures to twice their width and flatten alpha onto white.
pub fn prepare(image: DynamicImage) -> RgbImage {
    let (width, height) = (image.width(), image.height());
    let image = if height > width.saturating_mul(3) {
        let crop_height = height.min(width.saturating_mul(2));
        tracing::debug!(width, height, crop_height, "cropping tall capture");
        image.crop_imm(0, 0, width, crop_height)
    } else {
        image
    };

    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let alpha = u32::from(a);
            ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

fn encode_png(image: &RgbImage) -> Result<Vec<u8>, ImagePrepError> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.clone()).write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

fn encode_jpeg(image: &RgbImage, settings: Compression) -> Result<Vec<u8>, ImagePrepError> {
    let scaled;
    let source = if settings.scale_pct < 100 {
        let w = (image.width() * settings.scale_pct / 100).max(1);
        let h = (image.height() * settings.scale_pct / 100).max(1);
        scaled = image::imageops::resize(image, w, h, FilterType::Lanczos3);
        &scaled
    } else {
        image
    };
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, settings.quality).write_image(
        source.as_raw(),
        source.width(),
        source.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(out)
}

/// Encode `image` so that its base64 form is at most `budget` bytes.
pub fn encode_within(image: &RgbImage, budget: usize) -> Result<EncodedImage, ImagePrepError> {
    let png = STANDARD.encode(encode_png(image)?);
    if png.len() <= budget {
        return Ok(EncodedImage { data: png, media_type: MediaType::Png });
    }
    tracing::info!(base64_bytes = png.len(), budget, "PNG over budget, trying JPEG");

    let jpeg = STANDARD.encode(encode_jpeg(image, Compression { quality: 90, scale_pct: 100 })?);
    if jpeg.len() <= budget {
        return Ok(EncodedImage { data: jpeg, media_type: MediaType::Jpeg });
    }

    let mut settings = Compression::INITIAL;
    let mut last = jpeg;
    for attempt in 1..=MAX_COMPRESSION_ATTEMPTS {
        last = STANDARD.encode(encode_jpeg(image, settings)?);
        if last.len() <= budget {
            tracing::info!(
                attempt,
                quality = settings.quality,
                scale_pct = settings.scale_pct,
                base64_bytes = last.len(),
                "compressed within budget"
            );
            return Ok(EncodedImage { data: last, media_type: MediaType::Jpeg });
        }
        match settings.next() {
            Some(next) => settings = next,
            None => {
                tracing::warn!(attempt, budget, "could not compress within budget, using last resort");
                let data = STANDARD.encode(encode_jpeg(image, Compression::LAST_RESORT)?);
                return Ok(EncodedImage { data, media_type: MediaType::Jpeg });
            }
        }
    }
    Ok(EncodedImage { data: last, media_type: MediaType::Jpeg })
}

/// Read, prepare and encode an image file.
pub fn load_for_upload(path: &Path, budget: usize) -> Result<EncodedImage, ImagePrepError> {
    if !path.is_file() {
        return Err(ImagePrepError::NotFound(path.to_path_buf()));
    }
    let image = image::open(path)
        .map_err(|source| ImagePrepError::Decode { path: path.to_path_buf(), source })?;
    encode_within(&prepare(image), budget)
}

#[cfg(test)]
#[path = "image_prep_tests.rs"]
mod tests;
