// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Textual diff report handed to the generator for refinement.

use rp_compare::{Comparison, DiffRegion};
use std::fmt;

/// Regions that get a location hint, largest first.
const HINTED_REGIONS: usize = 3;

/// Overall judgement of a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    High,
    Moderate,
    Low,
}

impl Verdict {
    /// Bands: `>= 95` high, `>= 80` moderate, else low.
    pub fn from_score(similarity: f64) -> Self {
        if similarity >= 95.0 {
            Verdict::High
        } else if similarity >= 80.0 {
            Verdict::Moderate
        } else {
            Verdict::Low
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Verdict::High => "High similarity: minor tuning needed",
            Verdict::Moderate => "Moderate similarity: layout fixes needed",
            Verdict::Low => "Low similarity: major rework needed",
        }
    }
}

/// Page area a region starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionHint {
    Header,
    Main,
    Footer,
}

impl RegionHint {
    /// Top fifth is the header, bottom fifth the footer.
    pub fn locate(region: &DiffRegion, page_height: u32) -> Self {
        let y = f64::from(region.y);
        let h = f64::from(page_height);
        if y < h * 0.2 {
            RegionHint::Header
        } else if y > h * 0.8 {
            RegionHint::Footer
        } else {
            RegionHint::Main
        }
    }
}

/// Markdown report of one verification pass.
pub fn diff_report(cmp: &Comparison, iteration: u32, max_iterations: u32) -> String {
    DiffReport { cmp, iteration, max_iterations }.to_string()
}

struct DiffReport<'a> {
    cmp: &'a Comparison,
    iteration: u32,
    max_iterations: u32,
}

impl fmt::Display for DiffReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cmp = self.cmp;
        writeln!(f, "## Verification result (iteration {}/{})", self.iteration, self.max_iterations)?;
        writeln!(f)?;
        writeln!(f, "### Summary")?;
        writeln!(f, "- Similarity: {}%", cmp.similarity)?;
        writeln!(f, "- Diff pixels: {} ({:.2}%)", cmp.diff_pixels, cmp.diff_percentage())?;
        writeln!(f, "- Compared size: {}x{}px", cmp.width, cmp.height)?;
        writeln!(f)?;
        writeln!(f, "### Difference regions ({})", cmp.regions.len())?;
        if cmp.regions.is_empty() {
            writeln!(f, "- No significant difference regions detected")?;
        }
        for (i, r) in cmp.regions.iter().enumerate() {
            writeln!(
                f,
                "- Region {}: x={}, y={}, size={}x{}px ({}px)",
                i + 1,
                r.x,
                r.y,
                r.width,
                r.height,
                r.pixels
            )?;
        }
        writeln!(f)?;
        writeln!(f, "### Verdict")?;
        writeln!(f, "{}", Verdict::from_score(cmp.similarity).message())?;

        if cmp.regions.is_empty() {
            return Ok(());
        }
        writeln!(f)?;
        writeln!(f, "### Where to look")?;
        for (i, r) in cmp.regions.iter().take(HINTED_REGIONS).enumerate() {
            let n = i + 1;
            match RegionHint::locate(r, cmp.height) {
                RegionHint::Header => writeln!(f, "- Region {n}: check the header")?,
                RegionHint::Footer => writeln!(f, "- Region {n}: check the footer")?,
                RegionHint::Main => {
                    writeln!(f, "- Region {n}: check the main content (around y={})", r.y)?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
