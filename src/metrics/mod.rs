pub mod engine;
pub mod fake;
pub mod rate;
pub mod snapshot;
pub mod source;

pub use engine::{SAMPLE_WINDOW, SamplingEngine};
pub use snapshot::{ProcessEntry, Snapshot};
pub use source::{MetricsSource, NetCounters, OsQueryError, SysinfoSource};
