// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use image::{ImageFormat, Rgb, Rgba, RgbaImage};
use proptest::prelude::*;
use std::io::Cursor;

fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

fn png(img: RgbImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn paint(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
    for py in y..y + h {
        for px in x..x + w {
            img.put_pixel(px, py, Rgb(color));
        }
    }
}

#[test]
fn identical_images_score_exactly_100() {
    let bytes = png(solid(64, 48, [10, 200, 30]));
    let result = compare(&bytes, &bytes).unwrap();

    assert_eq!(result.similarity, 100.0);
    assert_eq!(result.diff_pixels, 0);
    assert!(result.regions.is_empty());
    assert_eq!((result.width, result.height), (64, 48));
}

#[test]
fn black_versus_white_scores_zero() {
    let result = compare(&png(solid(10, 10, [0; 3])), &png(solid(10, 10, [255; 3]))).unwrap();
    assert_eq!(result.similarity, 0.0);
    assert_eq!(result.diff_pixels, 100);
    assert_eq!(result.regions, vec![DiffRegion { x: 0, y: 0, width: 10, height: 10, pixels: 100 }]);
}

#[test]
fn score_is_rounded_to_two_decimals() {
    // one channel off by 1 on a single pixel of 3 px: 1 - 1/(255*9)
    let a = solid(3, 1, [0; 3]);
    let mut b = a.clone();
    b.put_pixel(0, 0, Rgb([1, 0, 0]));
    let result = compare_images(&DynamicImage::ImageRgb8(a), &DynamicImage::ImageRgb8(b)).unwrap();
    assert_eq!(result.similarity, 99.96);
}

#[test]
fn changed_block_becomes_region() {
    let a = solid(100, 80, [255; 3]);
    let mut b = a.clone();
    paint(&mut b, 20, 30, 15, 10, [0; 3]);

    let result = compare(&png(a), &png(b)).unwrap();
    assert_eq!(result.regions, vec![DiffRegion { x: 20, y: 30, width: 15, height: 10, pixels: 150 }]);
    assert_eq!(result.diff_pixels, 150);
    assert!(result.similarity < 100.0);
}

#[test]
fn small_differences_below_threshold_are_not_marked() {
    // mean channel diff of exactly 30 is not "above" the threshold
    let a = solid(20, 20, [100; 3]);
    let b = solid(20, 20, [130; 3]);
    let result = compare(&png(a), &png(b)).unwrap();
    assert_eq!(result.diff_pixels, 0);
    assert!(result.regions.is_empty());
}

#[test]
fn tiny_components_count_toward_pixels_but_not_regions() {
    let a = solid(50, 50, [255; 3]);
    let mut b = a.clone();
    paint(&mut b, 0, 0, 3, 3, [0; 3]);

    let result = compare(&png(a), &png(b)).unwrap();
    assert_eq!(result.diff_pixels, 9);
    assert!(result.regions.is_empty());
}

#[test]
fn different_sizes_compare_common_top_left_area() {
    let a = solid(100, 60, [40; 3]);
    let mut b = solid(80, 90, [40; 3]);
    // outside the common 80x60 area
    paint(&mut b, 0, 70, 80, 20, [250; 3]);

    let result = compare(&png(a), &png(b)).unwrap();
    assert_eq!((result.width, result.height), (80, 60));
    assert_eq!(result.similarity, 100.0);
}

#[test]
fn alpha_is_dropped_before_comparing() {
    let a = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([9, 9, 9, 0])));
    let b = DynamicImage::ImageRgb8(solid(8, 8, [9; 3]));
    assert_eq!(compare_images(&a, &b).unwrap().similarity, 100.0);
}

#[test]
fn empty_image_is_rejected() {
    let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 10));
    let other = DynamicImage::ImageRgb8(solid(10, 10, [0; 3]));
    assert!(matches!(
        compare_images(&empty, &other),
        Err(CompareError::EmptyImage { width: 0, height: 10 })
    ));
}

#[test]
fn undecodable_bytes_name_the_input() {
    let err = compare(b"not an image", &png(solid(2, 2, [0; 3]))).unwrap_err();
    assert!(matches!(err, CompareError::Decode { which: "first", .. }));
}

#[test]
fn diff_percentage_of_compared_area() {
    let a = solid(10, 10, [0; 3]);
    let mut b = a.clone();
    paint(&mut b, 0, 0, 5, 2, [255; 3]);
    let result = compare(&png(a), &png(b)).unwrap();
    assert!((result.diff_percentage() - 10.0).abs() < 1e-9);
}

fn arb_image() -> impl Strategy<Value = RgbImage> {
    (1u32..12, 1u32..12).prop_flat_map(|(w, h)| {
        proptest::collection::vec(any::<u8>(), (w * h * 3) as usize)
            .prop_map(move |raw| RgbImage::from_raw(w, h, raw).unwrap())
    })
}

proptest! {
    #[test]
    fn score_is_symmetric_and_bounded(a in arb_image(), b in arb_image()) {
        let a = DynamicImage::ImageRgb8(a);
        let b = DynamicImage::ImageRgb8(b);
        let ab = compare_images(&a, &b).unwrap();
        let ba = compare_images(&b, &a).unwrap();
        prop_assert_eq!(ab.similarity, ba.similarity);
        prop_assert_eq!(ab.diff_pixels, ba.diff_pixels);
        prop_assert!((0.0..=100.0).contains(&ab.similarity));
    }

    #[test]
    fn self_comparison_is_perfect(a in arb_image()) {
        let a = DynamicImage::ImageRgb8(a);
        prop_assert_eq!(compare_images(&a, &a).unwrap().similarity, 100.0);
    }
}
