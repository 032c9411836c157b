//! Deterministic metrics source used by unit and integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local};

use super::source::{LoadSample, MetricsSource, NetCounters, OsQueryError, ProcessSample};

/// Scriptable [`MetricsSource`]: fixed readings for the instantaneous
/// metrics, a queue of counter readings for the network (the last one
/// repeats once drained), and a pinned clock. `sample_load` returns
/// immediately instead of sleeping through the window.
pub struct FakeSource {
    disk_percent: f64,
    memory_percent: f64,
    logical_cores: usize,
    aggregate_cpu: f32,
    processes: Vec<ProcessSample>,
    boot_time: u64,
    now: DateTime<Local>,
    net_readings: Mutex<VecDeque<NetCounters>>,
    last_reading: Mutex<NetCounters>,
    net_reads: Mutex<usize>,
}

impl FakeSource {
    pub fn new() -> Self {
        FakeSource {
            disk_percent: 50.0,
            memory_percent: 40.0,
            logical_cores: 4,
            aggregate_cpu: 100.0,
            processes: Vec::new(),
            boot_time: 1_700_000_000,
            now: Local::now(),
            net_readings: Mutex::new(VecDeque::new()),
            last_reading: Mutex::new(NetCounters::default()),
            net_reads: Mutex::new(0),
        }
    }

    pub fn with_disk(mut self, percent: f64) -> Self {
        self.disk_percent = percent;
        self
    }

    pub fn with_memory(mut self, percent: f64) -> Self {
        self.memory_percent = percent;
        self
    }

    pub fn with_cores(mut self, cores: usize) -> Self {
        self.logical_cores = cores;
        self
    }

    pub fn with_aggregate_cpu(mut self, percent: f32) -> Self {
        self.aggregate_cpu = percent;
        self
    }

    pub fn with_processes(mut self, processes: Vec<ProcessSample>) -> Self {
        self.processes = processes;
        self
    }

    pub fn with_boot_time(mut self, epoch_secs: u64) -> Self {
        self.boot_time = epoch_secs;
        self
    }

    pub fn with_now(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }

    /// Queue successive counter readings; the first is typically consumed
    /// as the engine's construction-time seed.
    pub fn with_net_readings(self, readings: Vec<NetCounters>) -> Self {
        if let Some(last) = readings.last() {
            *self.last_reading.lock().unwrap() = *last;
        }
        *self.net_readings.lock().unwrap() = readings.into();
        self
    }

    /// How many times `net_counters` has been read. Lets tests assert the
    /// rate tracker stayed untouched while monitoring was stopped.
    pub fn net_reads(&self) -> usize {
        *self.net_reads.lock().unwrap()
    }
}

impl Default for FakeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for FakeSource {
    fn disk_percent(&self) -> Result<f64, OsQueryError> {
        Ok(self.disk_percent)
    }

    fn memory_percent(&self) -> Result<f64, OsQueryError> {
        Ok(self.memory_percent)
    }

    fn sample_load(&self, _window: Duration) -> Result<LoadSample, OsQueryError> {
        Ok(LoadSample {
            logical_cores: self.logical_cores,
            aggregate_cpu_percent: self.aggregate_cpu,
            processes: self.processes.clone(),
        })
    }

    fn net_counters(&self) -> Result<NetCounters, OsQueryError> {
        *self.net_reads.lock().unwrap() += 1;
        match self.net_readings.lock().unwrap().pop_front() {
            Some(reading) => {
                *self.last_reading.lock().unwrap() = reading;
                Ok(reading)
            }
            None => Ok(*self.last_reading.lock().unwrap()),
        }
    }

    fn boot_time_secs(&self) -> Result<u64, OsQueryError> {
        Ok(self.boot_time)
    }

    fn now(&self) -> DateTime<Local> {
        self.now
    }
}
