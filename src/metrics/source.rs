use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use sysinfo::{Disks, Networks, ProcessRefreshKind, ProcessesToUpdate, System};
use thiserror::Error;

/// An OS metrics read failed (permission denial, unsupported platform,
/// transient kernel-interface failure). Never recovered internally; the
/// whole sample fails and the HTTP layer maps it to a server error.
#[derive(Debug, Error)]
#[error("OS metrics query failed: {reason}")]
pub struct OsQueryError {
    reason: String,
}

impl OsQueryError {
    pub fn new(reason: impl Into<String>) -> Self {
        OsQueryError {
            reason: reason.into(),
        }
    }
}

/// Cumulative network byte counters, summed across interfaces.
/// Monotonically non-decreasing for the life of the host, resetting to zero
/// on reboot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// One process row from the table snapshot. CPU percent is the raw
/// multi-core value (a busy multi-threaded process can exceed 100).
#[derive(Debug, Clone)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory_percent: f32,
}

/// CPU utilization and process table measured across one blocking window.
#[derive(Debug, Clone)]
pub struct LoadSample {
    pub logical_cores: usize,
    /// Sum of per-core utilization; `0..=100 * logical_cores`.
    pub aggregate_cpu_percent: f32,
    pub processes: Vec<ProcessSample>,
}

/// Capability interface over the host OS. The engine depends on this trait
/// rather than on sysinfo directly so tests can substitute a deterministic
/// source instead of sleeping through real sampling windows.
pub trait MetricsSource {
    /// Usage percent (0-100) of the monitored mount point.
    fn disk_percent(&self) -> Result<f64, OsQueryError>;

    /// Used virtual memory as a percent (0-100) of total.
    fn memory_percent(&self) -> Result<f64, OsQueryError>;

    /// Blocks for `window`, then reports core count, aggregate CPU, and the
    /// process table, all measured across that window.
    fn sample_load(&self, window: Duration) -> Result<LoadSample, OsQueryError>;

    /// Current cumulative network counters.
    fn net_counters(&self) -> Result<NetCounters, OsQueryError>;

    /// Host boot time as epoch seconds.
    fn boot_time_secs(&self) -> Result<u64, OsQueryError>;

    /// Wall clock used for uptime arithmetic.
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

impl<T: MetricsSource> MetricsSource for std::sync::Arc<T> {
    fn disk_percent(&self) -> Result<f64, OsQueryError> {
        (**self).disk_percent()
    }

    fn memory_percent(&self) -> Result<f64, OsQueryError> {
        (**self).memory_percent()
    }

    fn sample_load(&self, window: Duration) -> Result<LoadSample, OsQueryError> {
        (**self).sample_load(window)
    }

    fn net_counters(&self) -> Result<NetCounters, OsQueryError> {
        (**self).net_counters()
    }

    fn boot_time_secs(&self) -> Result<u64, OsQueryError> {
        (**self).boot_time_secs()
    }

    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

/// Production source backed by the sysinfo crate.
pub struct SysinfoSource {
    disk_path: PathBuf,
}

impl SysinfoSource {
    pub fn new(disk_path: impl Into<PathBuf>) -> Self {
        SysinfoSource {
            disk_path: disk_path.into(),
        }
    }
}

fn process_refresh_kind() -> ProcessRefreshKind {
    ProcessRefreshKind::nothing().with_cpu().with_memory()
}

impl MetricsSource for SysinfoSource {
    fn disk_percent(&self) -> Result<f64, OsQueryError> {
        let disks = Disks::new_with_refreshed_list();

        for disk in disks.list() {
            if disk.mount_point() == self.disk_path.as_path() {
                let total = disk.total_space();
                if total == 0 {
                    break;
                }
                let used = total - disk.available_space();
                return Ok(used as f64 / total as f64 * 100.0);
            }
        }

        // Mount point not listed (containers often hide it); fall back to an
        // aggregate across all mounted filesystems.
        let (total, available) = disks
            .list()
            .iter()
            .fold((0u64, 0u64), |(total, available), disk| {
                (
                    total + disk.total_space(),
                    available + disk.available_space(),
                )
            });
        if total == 0 {
            return Err(OsQueryError::new(format!(
                "no usable disk at {} and no mounted filesystems to fall back to",
                self.disk_path.display()
            )));
        }
        Ok((total - available) as f64 / total as f64 * 100.0)
    }

    fn memory_percent(&self) -> Result<f64, OsQueryError> {
        let mut sys = System::new();
        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            return Err(OsQueryError::new("virtual memory statistics unavailable"));
        }
        Ok(sys.used_memory() as f64 / total as f64 * 100.0)
    }

    fn sample_load(&self, window: Duration) -> Result<LoadSample, OsQueryError> {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();
        sys.refresh_processes_specifics(ProcessesToUpdate::All, true, process_refresh_kind());

        // CPU usage is a delta between two refreshes; the sleep is the
        // measurement window itself.
        std::thread::sleep(window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));

        sys.refresh_cpu_all();
        sys.refresh_processes_specifics(ProcessesToUpdate::All, true, process_refresh_kind());

        let cpus = sys.cpus();
        if cpus.is_empty() {
            return Err(OsQueryError::new("CPU utilization unavailable"));
        }
        let aggregate_cpu_percent: f32 = cpus.iter().map(|cpu| cpu.cpu_usage()).sum();

        let total_memory = sys.total_memory();
        let processes = sys
            .processes()
            .iter()
            .map(|(pid, process)| ProcessSample {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().to_string(),
                cpu_percent: process.cpu_usage(),
                memory_percent: if total_memory == 0 {
                    0.0
                } else {
                    (process.memory() as f64 / total_memory as f64 * 100.0) as f32
                },
            })
            .collect();

        Ok(LoadSample {
            logical_cores: cpus.len(),
            aggregate_cpu_percent,
            processes,
        })
    }

    fn net_counters(&self) -> Result<NetCounters, OsQueryError> {
        let networks = Networks::new_with_refreshed_list();
        let mut counters = NetCounters::default();
        for (_interface, data) in networks.list() {
            counters.bytes_sent += data.total_transmitted();
            counters.bytes_recv += data.total_received();
        }
        Ok(counters)
    }

    fn boot_time_secs(&self) -> Result<u64, OsQueryError> {
        let boot = System::boot_time();
        if boot == 0 {
            return Err(OsQueryError::new("boot time unavailable"));
        }
        Ok(boot)
    }
}
