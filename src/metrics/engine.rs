use std::cmp::Ordering;
use std::time::Duration;

use crate::format::{format_boot_time, format_uptime};

use super::rate::RateTracker;
use super::snapshot::{ProcessEntry, Snapshot};
use super::source::{MetricsSource, OsQueryError, ProcessSample};

/// Wall-clock span of the blocking CPU read. Also the divisor for the
/// network rates: the counter delta is measured across the same span that
/// elapses while blocking on the CPU measurement.
pub const SAMPLE_WINDOW: Duration = Duration::from_secs(2);

/// How many processes the snapshot ranks.
const TOP_PROCESS_COUNT: usize = 6;

/// Orchestrates one sample: reads every metric from the source, derives
/// rates and rankings, and assembles an immutable [`Snapshot`].
///
/// Safe to call from concurrent requests; the only shared mutable state is
/// the rate tracker, and the blocking load window runs without holding its
/// lock.
pub struct SamplingEngine<S> {
    source: S,
    rate: RateTracker,
}

impl<S: MetricsSource> SamplingEngine<S> {
    /// Seeds the rate tracker from an initial counter read so the first
    /// served sample produces a valid delta.
    pub fn new(source: S) -> Result<Self, OsQueryError> {
        let initial = source.net_counters()?;
        Ok(SamplingEngine {
            rate: RateTracker::new(initial, SAMPLE_WINDOW),
            source,
        })
    }

    /// Take one full sample. Blocks for [`SAMPLE_WINDOW`]; any OS read
    /// failure aborts the sample with no partial snapshot.
    pub fn sample(&self) -> Result<Snapshot, OsQueryError> {
        let disk_usage_percent = self.source.disk_percent()?;
        let memory_percent = self.source.memory_percent()?;

        let load = self.source.sample_load(SAMPLE_WINDOW)?;

        let (rates, counters) = self.rate.measure(|| self.source.net_counters())?;

        let boot_secs = self.source.boot_time_secs()?;
        let boot_time = format_boot_time(boot_secs)
            .ok_or_else(|| OsQueryError::new("boot time out of range"))?;
        let uptime_secs = (self.source.now().timestamp() - boot_secs as i64).max(0) as u64;

        let cores = load.logical_cores;
        Ok(Snapshot {
            disk_usage_percent,
            memory_percent,
            cpu_percent: normalize_cpu(load.aggregate_cpu_percent, cores),
            upload_speed: rates.upload_bps,
            download_speed: rates.download_bps,
            bytes_sent: counters.bytes_sent,
            bytes_recv: counters.bytes_recv,
            boot_time,
            uptime: format_uptime(uptime_secs),
            top_processes: top_processes(load.processes, cores),
        })
    }
}

/// Divide a raw multi-core aggregate by the logical core count. A zero or
/// unavailable core count reports 0 rather than dividing by zero.
fn normalize_cpu(raw_percent: f32, cores: usize) -> f32 {
    if cores == 0 {
        0.0
    } else {
        raw_percent / cores as f32
    }
}

/// Rank by raw CPU percent descending (stable, so ties keep their
/// enumeration order), keep the busiest six, then normalize.
fn top_processes(mut processes: Vec<ProcessSample>, cores: usize) -> Vec<ProcessEntry> {
    processes.sort_by(|a, b| {
        b.cpu_percent
            .partial_cmp(&a.cpu_percent)
            .unwrap_or(Ordering::Equal)
    });
    processes.truncate(TOP_PROCESS_COUNT);
    processes
        .into_iter()
        .map(|p| ProcessEntry {
            pid: p.pid,
            name: p.name,
            cpu_percent: normalize_cpu(p.cpu_percent, cores),
            memory_percent: p.memory_percent,
        })
        .collect()
}
