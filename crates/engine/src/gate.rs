// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission gate bounding how many jobs run at once.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

#[derive(Default)]
struct Occupancy {
    active: usize,
    peak: usize,
}

/// Counting gate shared by every job of a runner.
///
/// Clones share the same permits.
#[derive(Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    capacity: usize,
    occupancy: Arc<Mutex<Occupancy>>,
}

/// Slot held by a running job; released on drop.
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
    occupancy: Arc<Mutex<Occupancy>>,
}

impl AdmissionGate {
    /// A gate admitting `capacity` jobs (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            occupancy: Arc::new(Mutex::new(Occupancy::default())),
        }
    }

    /// Wait for a free slot.
    pub async fn admit(&self) -> Result<AdmissionPermit, AcquireError> {
        let permit = Arc::clone(&self.permits).acquire_owned().await?;
        {
            let mut occ = self.occupancy.lock();
            occ.active += 1;
            occ.peak = occ.peak.max(occ.active);
        }
        Ok(AdmissionPermit { _permit: permit, occupancy: Arc::clone(&self.occupancy) })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Jobs currently holding a slot.
    pub fn active(&self) -> usize {
        self.occupancy.lock().active
    }

    /// Most jobs ever admitted at the same time.
    pub fn peak(&self) -> usize {
        self.occupancy.lock().peak
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        let mut occ = self.occupancy.lock();
        occ.active = occ.active.saturating_sub(1);
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
