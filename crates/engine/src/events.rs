// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process event fan-out.

use rp_core::Event;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 256;

/// Broadcast channel for job events. Slow subscribers miss events rather
/// than stalling a pipeline.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: Event) {
        tracing::debug!(event = %event.log_summary(), "publish");
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }
}
