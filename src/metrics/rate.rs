use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::source::{NetCounters, OsQueryError};

/// Throughput computed from one counter delta, in bits per second of the
/// sampling window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkRates {
    pub upload_bps: f64,
    pub download_bps: f64,
}

/// Tracks the previous cumulative counter reading between samples.
///
/// The read of the current counters happens inside the critical section:
/// if two samples could read first and lock later, their readings could be
/// stored out of order and the next delta would double-count the gap.
#[derive(Debug)]
pub struct RateTracker {
    prev: Mutex<NetCounters>,
    window: Duration,
}

impl RateTracker {
    /// `initial` seeds the previous reading so the first sample produces a
    /// valid (near-zero) delta instead of reporting counters-since-boot.
    pub fn new(initial: NetCounters, window: Duration) -> Self {
        RateTracker {
            prev: Mutex::new(initial),
            window,
        }
    }

    /// Read the current counters via `read`, compute rates against the
    /// stored previous reading, and store the new reading. Atomic
    /// end-to-end; `read` must be a cheap non-blocking counter fetch.
    ///
    /// A counter lower than the stored reading (host reboot reset) becomes
    /// a new baseline: the delta saturates at zero rather than going
    /// negative.
    pub fn measure<F>(&self, read: F) -> Result<(NetworkRates, NetCounters), OsQueryError>
    where
        F: FnOnce() -> Result<NetCounters, OsQueryError>,
    {
        let mut prev = self.prev.lock().unwrap_or_else(PoisonError::into_inner);
        let current = read()?;

        let secs = self.window.as_secs_f64();
        let rates = NetworkRates {
            upload_bps: current.bytes_sent.saturating_sub(prev.bytes_sent) as f64 * 8.0 / secs,
            download_bps: current.bytes_recv.saturating_sub(prev.bytes_recv) as f64 * 8.0 / secs,
        };
        *prev = current;
        Ok((rates, current))
    }
}
