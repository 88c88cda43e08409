// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::artifact::ArtifactTriple;

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::job::ReplicationStatus;
    use proptest::prelude::*;

    pub fn arb_status() -> impl Strategy<Value = ReplicationStatus> {
        prop_oneof![
            Just(ReplicationStatus::Pending),
            Just(ReplicationStatus::Scraping),
            Just(ReplicationStatus::Generating),
            Just(ReplicationStatus::Verifying1),
            Just(ReplicationStatus::Verifying2),
            Just(ReplicationStatus::Verifying3),
            Just(ReplicationStatus::Completed),
            Just(ReplicationStatus::Failed),
        ]
    }
}

/// A small, complete page triple.
pub fn sample_triple() -> ArtifactTriple {
    ArtifactTriple {
        html: "<html><head><title>t</title></head><body><h1>Hi</h1></body></html>".to_string(),
        css: "h1 { color: #333; }".to_string(),
        js: "console.log('hi');".to_string(),
    }
}
