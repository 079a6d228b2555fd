pub mod config;
pub mod error;
pub mod fetcher;
pub mod pool;
mod raw;
pub mod reconciler;
pub mod scan;
pub mod scheduler;
pub mod snapshot;
pub mod units;
pub mod vdev;
pub mod view;

#[cfg(test)]
mod fetcher_tests;
#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod scan_tests;

pub use config::RefreshConfig;
pub use error::FormatError;
pub use fetcher::{collect_snapshot, validate_pools, FetchError, StatusDocument, StatusFetcher, ValidationError, ZpoolCommand};
pub use pool::Pool;
pub use reconciler::{Panel, ReconcileReport, Reconciler};
pub use scan::{ScanKind, ScanPhase, ScanProgress, ScanResult};
pub use scheduler::{FetchOutcome, RefreshPeriod, RefreshScheduler, SchedulerState, Trigger, TriggerOutcome};
pub use snapshot::{PoolEntry, PoolSnapshot};
pub use units::{format_duration, from_human, human_bytes, to_human};
pub use vdev::{DeviceNode, Health, Severity, TrimStatus};
pub use view::{DeviceRow, PoolView, ProgressCell, ScanField, ScanRow, ScanSection, ScanTone, SummaryField, SummaryRow, TrimCell};
