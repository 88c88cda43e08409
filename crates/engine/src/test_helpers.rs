// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine crate.

use crate::config::RunnerConfig;
use crate::runner::Runner;
use image::{ImageFormat, Rgb, RgbImage};
use rp_adapters::{FakeCapture, FakeGenerator};
use rp_core::{FakeClock, ReplicationJob};
use std::io::Cursor;
use tempfile::TempDir;

/// Convenience alias for the fully-faked runner.
pub(crate) type TestRunner = Runner<FakeCapture, FakeGenerator, FakeClock>;

/// Solid-colour PNG.
pub(crate) fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    encode(&RgbImage::from_pixel(width, height, Rgb(color)))
}

/// White PNG with a black `block x block` square at the top-left.
pub(crate) fn png_with_block(width: u32, height: u32, block: u32) -> Vec<u8> {
    let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for y in 0..block.min(height) {
        for x in 0..block.min(width) {
            img.put_pixel(x, y, Rgb([0, 0, 0]));
        }
    }
    encode(&img)
}

fn encode(img: &RgbImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Runner plus handles on its fakes.
pub(crate) struct TestContext {
    pub runner: TestRunner,
    pub capture: FakeCapture,
    pub generator: FakeGenerator,
    pub clock: FakeClock,
    pub dir: TempDir,
}

impl TestContext {
    /// Source screenshots are plain white, so unconfigured candidates match.
    pub(crate) fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub(crate) fn with_config(config: RunnerConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let capture = FakeCapture::new(png(64, 64, [255, 255, 255]));
        let generator = FakeGenerator::new();
        let clock = FakeClock::new();
        let runner = Runner::new(
            capture.clone(),
            generator.clone(),
            clock.clone(),
            config.output_base(dir.path()),
        );
        Self { runner, capture, generator, clock, dir }
    }

    pub(crate) fn create(&self, output_dir: &str) -> ReplicationJob {
        self.runner.create_job("https://example.com/", output_dir, None).unwrap()
    }

    /// Create, start and wait for a job to finish.
    pub(crate) async fn run(&self, output_dir: &str) -> ReplicationJob {
        let job = self.create(output_dir);
        self.runner.start_replication(&job.id).unwrap();
        self.runner.wait_for_terminal(&job.id).await.unwrap()
    }
}
