// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connected-component labelling of the changed-pixel mask.

use crate::DiffRegion;
use std::collections::VecDeque;

/// 4-connected components of `mask` with at least `min_pixels` pixels,
/// largest first (ties keep scan order), at most `max_regions`.
pub(crate) fn label(
    mask: &[bool],
    width: u32,
    height: u32,
    min_pixels: u32,
    max_regions: usize,
) -> Vec<DiffRegion> {
    let w = width as usize;
    let h = height as usize;
    let mut visited = vec![false; mask.len()];
    let mut found = Vec::new();

    for start in 0..mask.len() {
        if !mask[start] || visited[start] {
            continue;
        }
        visited[start] = true;
        let mut queue = VecDeque::from([start]);
        let (mut min_x, mut min_y) = (start % w, start / w);
        let (mut max_x, mut max_y) = (min_x, min_y);
        let mut count: u32 = 0;

        while let Some(node) = queue.pop_front() {
            let (cx, cy) = (node % w, node / w);
            count += 1;
            min_x = min_x.min(cx);
            max_x = max_x.max(cx);
            min_y = min_y.min(cy);
            max_y = max_y.max(cy);

            let neighbours = [
                (cx > 0).then(|| node - 1),
                (cx + 1 < w).then(|| node + 1),
                (cy > 0).then(|| node - w),
                (cy + 1 < h).then(|| node + w),
            ];
            for next in neighbours.into_iter().flatten() {
                if mask[next] && !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        if count >= min_pixels {
            found.push(DiffRegion {
                x: min_x as u32,
                y: min_y as u32,
                width: (max_x - min_x + 1) as u32,
                height: (max_y - min_y + 1) as u32,
                pixels: count,
            });
        }
    }

    found.sort_by(|a, b| b.pixels.cmp(&a.pixels));
    found.truncate(max_regions);
    found
}

#[cfg(test)]
#[path = "regions_tests.rs"]
mod tests;
