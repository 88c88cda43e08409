// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for CLI specs.

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A `replica` invocation with colour and config lookups disabled.
pub fn cli() -> Cli {
    let mut cmd = Command::cargo_bin("replica").expect("replica binary is built");
    cmd.env("NO_COLOR", "1")
        .env_remove("COLOR")
        .env_remove("REPLICA_CONFIG")
        .env_remove("REPLICA_OUTPUT_BASE")
        .env("RUST_LOG", "warn");
    Cli { cmd }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cmd.current_dir(dir);
        self
    }

    pub fn passes(mut self) -> Run {
        let output = self.cmd.output().expect("replica runs");
        let run = Run::from(output);
        assert_eq!(run.code, Some(0), "expected success\nstdout:\n{}\nstderr:\n{}", run.stdout, run.stderr);
        run
    }

    pub fn fails_with(mut self, code: i32) -> Run {
        let output = self.cmd.output().expect("replica runs");
        let run = Run::from(output);
        assert_eq!(run.code, Some(code), "unexpected exit\nstdout:\n{}\nstderr:\n{}", run.stdout, run.stderr);
        run
    }
}

pub struct Run {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for Run {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Run {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout missing {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr missing {needle:?}:\n{}", self.stderr);
        self
    }

    pub fn stdout_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).expect("stdout is JSON")
    }
}

/// Scratch directory for one spec.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self { dir: tempfile::tempdir().expect("tempdir") }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// White PNG with an optional black square at the top-left.
    pub fn png(&self, name: &str, width: u32, height: u32, block: u32) -> PathBuf {
        let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        for y in 0..block.min(height) {
            for x in 0..block.min(width) {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let path = self.dir.path().join(name);
        img.save(&path).expect("png written");
        path
    }
}
