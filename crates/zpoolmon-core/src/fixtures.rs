use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::Semaphore;

use crate::fetcher::{FetchError, StatusDocument, StatusFetcher};
use crate::snapshot::PoolSnapshot;

pub fn disk(name: &str, devid: &str) -> Value {
    json!({
        "name": name,
        "vdev_type": "disk",
        "state": "ONLINE",
        "devid": devid,
        "path": format!("/dev/{name}"),
        "phys_space": 4_000_787_030_016_u64,
        "read_errors": 0,
        "write_errors": 0,
        "checksum_errors": 0,
        "trim_notsup": 0,
        "trim_state": "COMPLETE",
        "trim_time": 1_700_000_000,
    })
}

/// A pool whose only top-level vdev is a raidz1 of the given disks.
pub fn raidz_pool(name: &str, disks: &[&str]) -> Value {
    let members: serde_json::Map<String, Value> = disks
        .iter()
        .map(|d| (d.to_string(), disk(d, &format!("ata-{d}"))))
        .collect();

    json!({
        "name": name,
        "state": "ONLINE",
        "error_count": 0,
        "vdevs": {
            "raidz1-0": {
                "name": "raidz1-0",
                "vdev_type": "raidz",
                "state": "ONLINE",
                "def_space": 11_994_318_848_000_u64,
                "read_errors": 0,
                "write_errors": 0,
                "checksum_errors": 0,
                "vdevs": members,
            }
        },
    })
}

pub fn document(pools: &[(&str, Value)]) -> StatusDocument {
    let pools = pools
        .iter()
        .map(|(name, record)| (name.to_string(), record.clone()))
        .collect();
    StatusDocument { pools }
}

pub fn snapshot(names: &[&str]) -> PoolSnapshot {
    let pools: Vec<(&str, Value)> = names.iter().map(|n| (*n, raidz_pool(n, &["sda", "sdb"]))).collect();
    PoolSnapshot::from_document(&document(&pools), Utc::now())
}

/// Serves canned documents; counts calls and the peak number of concurrent
/// fetches. When gated, each fetch waits for a permit from `release`.
pub struct FixtureFetcher {
    pools: Vec<String>,
    document: Mutex<Result<StatusDocument, FetchError>>,
    gate: Option<Semaphore>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FixtureFetcher {
    pub fn new(document: StatusDocument) -> Self {
        Self {
            pools: document.pools.keys().cloned().collect(),
            document: Mutex::new(Ok(document)),
            gate: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn gated(document: StatusDocument) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(document)
        }
    }

    pub fn failing(error: FetchError) -> Self {
        let fetcher = Self::new(StatusDocument {
            pools: serde_json::Map::new(),
        });
        fetcher.set_result(Err(error));
        fetcher
    }

    pub fn set_result(&self, result: Result<StatusDocument, FetchError>) {
        *self.document.lock().expect("fixture lock") = result;
    }

    /// Let `n` gated fetches through.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusFetcher for FixtureFetcher {
    async fn list_pools(&self) -> Result<Vec<String>, FetchError> {
        match &*self.document.lock().expect("fixture lock") {
            Ok(_) => Ok(self.pools.clone()),
            Err(err) => Err(err.clone()),
        }
    }

    async fn fetch_status(&self, _pools: &[String]) -> Result<StatusDocument, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate open").forget();
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.document.lock().expect("fixture lock").clone()
    }
}
