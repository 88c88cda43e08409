// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline failure taxonomy.

use serde::{Deserialize, Serialize};

/// Failure that ends a replication job.
///
/// `Display` is the collaborator's message verbatim; it is what lands in the
/// job's `error_message`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplicationError {
    #[error("{0}")]
    Scraping(String),
    #[error("{0}")]
    Generation(String),
    #[error("{0}")]
    Verification(String),
    #[error("{0}")]
    Unexpected(String),
}

/// Tag-only variant of [`ReplicationError`] for logs and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Scraping,
    Generation,
    Verification,
    Unexpected,
}

crate::simple_display! {
    ErrorKind {
        Scraping => "scraping",
        Generation => "generation",
        Verification => "verification",
        Unexpected => "unexpected",
    }
}

impl ReplicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Scraping(_) => ErrorKind::Scraping,
            Self::Generation(_) => ErrorKind::Generation,
            Self::Verification(_) => ErrorKind::Verification,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Scraping(m) | Self::Generation(m) | Self::Verification(m) | Self::Unexpected(m) => m,
        }
    }
}

impl From<crate::job::TransitionError> for ReplicationError {
    fn from(e: crate::job::TransitionError) -> Self {
        Self::Unexpected(e.to_string())
    }
}
