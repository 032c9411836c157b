use serde::Serialize;

/// Immutable point-in-time record produced per sample. Field names are the
/// wire contract of `GET /api/metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Usage percent (0-100) of the monitored mount point.
    pub disk_usage_percent: f64,
    /// Used virtual memory percent (0-100).
    pub memory_percent: f64,
    /// CPU utilization normalized per logical core (0-100).
    pub cpu_percent: f32,
    /// Upload throughput in bits per sampling-window second.
    pub upload_speed: f64,
    /// Download throughput in bits per sampling-window second.
    pub download_speed: f64,
    /// Cumulative bytes sent since boot, summed across interfaces.
    pub bytes_sent: u64,
    /// Cumulative bytes received since boot, summed across interfaces.
    pub bytes_recv: u64,
    /// Host boot time, `YYYY-MM-DD HH:MM:SS` in local time.
    pub boot_time: String,
    /// Duration since boot, human-readable.
    pub uptime: String,
    /// Busiest processes, most-CPU-first, at most six.
    pub top_processes: Vec<ProcessEntry>,
}

/// One ranked process. Pids are unique at a point in time only; they are
/// never treated as durable identities.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    /// Normalized per logical core, like the system-wide `cpu_percent`.
    pub cpu_percent: f32,
    pub memory_percent: f32,
}
