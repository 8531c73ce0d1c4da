//! Host system metrics sampling, used by the Control Plane's metrics
//! snapshot (CPU/memory/disk gauges).

use serde::{Deserialize, Serialize};
use sysinfo::{Disks, System};

/// A single point-in-time sample of host resource usage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SystemMetrics {
    /// Overall CPU utilization, 0.0-100.0, averaged across cores.
    pub cpu_percent: f32,
    /// Bytes of physical memory in use.
    pub memory_used_bytes: u64,
    /// Total physical memory, bytes.
    pub memory_total_bytes: u64,
    /// Bytes used across all mounted disks.
    pub disk_used_bytes: u64,
    /// Total bytes across all mounted disks.
    pub disk_total_bytes: u64,
}

/// Samples current host metrics.
///
/// `sysinfo` requires two CPU refreshes separated by a delay to report a
/// meaningful percentage on first use; callers that need an accurate
/// first sample should prime a `System` with `refresh_cpu` twice before
/// calling this, as the Control Plane's periodic history ring does.
#[must_use]
pub fn sample_system_metrics(sys: &mut System) -> SystemMetrics {
    sys.refresh_cpu_usage();
    sys.refresh_memory();
    let cpu_percent = sys.global_cpu_usage();
    let memory_used_bytes = sys.used_memory();
    let memory_total_bytes = sys.total_memory();

    let disks = Disks::new_with_refreshed_list();
    let (disk_used_bytes, disk_total_bytes) = disks.iter().fold((0u64, 0u64), |(used, total), d| {
        let disk_total = d.total_space();
        let disk_free = d.available_space();
        (
            used.saturating_add(disk_total.saturating_sub(disk_free)),
            total.saturating_add(disk_total),
        )
    });

    SystemMetrics {
        cpu_percent,
        memory_used_bytes,
        memory_total_bytes,
        disk_used_bytes,
        disk_total_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_reports_nonzero_total_memory() {
        let mut sys = System::new();
        let metrics = sample_system_metrics(&mut sys);
        assert!(metrics.memory_total_bytes > 0);
    }
}
