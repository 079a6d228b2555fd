use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::FormatError;
use crate::fetcher::StatusDocument;
use crate::pool::Pool;

/// A pool that parsed, or the reason it didn't.
pub type PoolEntry = Result<Pool, FormatError>;

/// Every monitored pool from one fetch, keyed by pool name.
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    pub taken_at: DateTime<Utc>,
    pools: BTreeMap<String, PoolEntry>,
}

impl PoolSnapshot {
    /// Parse each pool independently so one bad record can't hide the others.
    pub fn from_document(document: &StatusDocument, taken_at: DateTime<Utc>) -> Self {
        let pools = document
            .pools
            .iter()
            .map(|(name, record)| (name.clone(), Pool::parse(name, record)))
            .collect();

        Self { taken_at, pools }
    }

    pub fn get(&self, name: &str) -> Option<&PoolEntry> {
        self.pools.get(name)
    }

    /// Ascending by name.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PoolEntry)> {
        self.pools.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &FormatError)> {
        self.iter().filter_map(|(name, entry)| entry.as_ref().err().map(|err| (name, err)))
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
