// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn region(y: u32, pixels: u32) -> DiffRegion {
    DiffRegion { x: 10, y, width: 20, height: 10, pixels }
}

fn comparison(similarity: f64, regions: Vec<DiffRegion>) -> Comparison {
    Comparison { similarity, diff_pixels: 2_000, regions, width: 100, height: 1_000 }
}

#[yare::parameterized(
    perfect = { 100.0, Verdict::High },
    at_high_bound = { 95.0, Verdict::High },
    just_below_high = { 94.99, Verdict::Moderate },
    at_moderate_bound = { 80.0, Verdict::Moderate },
    just_below_moderate = { 79.99, Verdict::Low },
    zero = { 0.0, Verdict::Low },
)]
fn verdict_bands(score: f64, expected: Verdict) {
    assert_eq!(Verdict::from_score(score), expected);
}

#[yare::parameterized(
    top = { 0, RegionHint::Header },
    just_above_fifth = { 199, RegionHint::Header },
    at_fifth = { 200, RegionHint::Main },
    at_four_fifths = { 800, RegionHint::Main },
    bottom = { 801, RegionHint::Footer },
)]
fn region_hints(y: u32, expected: RegionHint) {
    assert_eq!(RegionHint::locate(&region(y, 100), 1_000), expected);
}

#[test]
fn report_lists_summary_regions_and_hints() {
    let cmp = comparison(
        87.5,
        vec![region(10, 900), region(500, 600), region(950, 300), region(400, 150)],
    );
    let report = diff_report(&cmp, 2, 3);

    assert!(report.starts_with("## Verification result (iteration 2/3)"));
    assert!(report.contains("- Similarity: 87.5%"));
    assert!(report.contains("- Diff pixels: 2000 (2.00%)"));
    assert!(report.contains("- Compared size: 100x1000px"));
    assert!(report.contains("### Difference regions (4)"));
    assert!(report.contains("- Region 1: x=10, y=10, size=20x10px (900px)"));
    assert!(report.contains("Moderate similarity: layout fixes needed"));
    assert!(report.contains("- Region 1: check the header"));
    assert!(report.contains("- Region 2: check the main content (around y=500)"));
    assert!(report.contains("- Region 3: check the footer"));
    assert!(!report.contains("- Region 4: check"));
}

#[test]
fn report_without_regions_says_so() {
    let report = diff_report(&comparison(99.1, Vec::new()), 1, 3);
    assert!(report.contains("- No significant difference regions detected"));
    assert!(report.contains("High similarity: minor tuning needed"));
    assert!(!report.contains("Where to look"));
}

#[test]
fn report_without_regions_is_exact() {
    let cmp = Comparison { similarity: 100.0, diff_pixels: 0, regions: Vec::new(), width: 64, height: 64 };
    let expected = "\
## Verification result (iteration 1/3)

### Summary
- Similarity: 100%
- Diff pixels: 0 (0.00%)
- Compared size: 64x64px

### Difference regions (0)
- No significant difference regions detected

### Verdict
";
    let report = diff_report(&cmp, 1, 3);
    assert!(report.starts_with(expected), "{report}");
    assert_eq!(report.lines().count(), expected.lines().count() + 1);
    assert!(report.ends_with('\n'));
}
