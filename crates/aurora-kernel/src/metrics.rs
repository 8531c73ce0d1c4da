//! The combined system + component health snapshot the Control Plane
//! exposes on demand, and its bounded history ring.

use std::collections::VecDeque;

use aurora_telemetry::{HealthSnapshot, SystemMetrics};
use serde::{Deserialize, Serialize};

/// Default history ring length: 5 minutes of samples at the default
/// 1-second sampling period named in spec §4.9.
pub const DEFAULT_HISTORY_CAPACITY: usize = 300;

/// One point-in-time Control Plane metrics snapshot: host resource
/// gauges plus per-component health, taken together so a time-series
/// view can correlate the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelSnapshot {
    /// When this snapshot was produced.
    pub timestamp: aurora_core::Timestamp,
    /// Host CPU/memory/disk gauges.
    pub system: SystemMetrics,
    /// Per-component health and recovery log from the Heartbeat
    /// Supervisor.
    pub health: HealthSnapshot,
}

/// A fixed-capacity ring of [`KernelSnapshot`]s, oldest first.
pub(crate) struct HistoryRing {
    capacity: usize,
    entries: VecDeque<KernelSnapshot>,
}

impl HistoryRing {
    pub(crate) fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), entries: VecDeque::with_capacity(capacity) }
    }

    pub(crate) fn push(&mut self, snapshot: KernelSnapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub(crate) fn to_vec(&self) -> Vec<KernelSnapshot> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_core::Timestamp;

    fn sample() -> KernelSnapshot {
        KernelSnapshot {
            timestamp: Timestamp::now(),
            system: SystemMetrics {
                cpu_percent: 0.0,
                memory_used_bytes: 0,
                memory_total_bytes: 1,
                disk_used_bytes: 0,
                disk_total_bytes: 1,
            },
            health: HealthSnapshot {
                timestamp: Timestamp::now(),
                uptime_secs: 0,
                components: std::collections::HashMap::new(),
                error_counts: std::collections::HashMap::new(),
                recent_recoveries: Vec::new(),
            },
        }
    }

    #[test]
    fn ring_drops_oldest_past_capacity() {
        let mut ring = HistoryRing::new(2);
        ring.push(sample());
        ring.push(sample());
        ring.push(sample());
        assert_eq!(ring.to_vec().len(), 2);
    }
}
