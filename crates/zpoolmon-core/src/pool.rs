use serde::Deserialize;
use serde_json::Value;

use crate::error::FormatError;
use crate::raw::RawPool;
use crate::scan::ScanResult;
use crate::vdev::{flatten, DeviceNode, Health};

/// One pool as of a single `zpool status` run. Never mutated; the next
/// refresh builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    pub name: String,
    pub health: Health,
    pub status: Option<String>,
    pub action: Option<String>,
    pub error_count: u64,
    pub vdevs: Vec<DeviceNode>,
    pub scan: Option<ScanResult>,
}

impl Pool {
    pub fn parse(name: &str, record: &Value) -> Result<Pool, FormatError> {
        let raw = RawPool::deserialize(record).map_err(|err| FormatError::Record {
            pool: name.to_string(),
            reason: err.to_string(),
        })?;

        let error_count = raw.error_count.as_count().ok_or_else(|| FormatError::Record {
            pool: name.to_string(),
            reason: "error_count is not a count".to_string(),
        })?;

        Ok(Pool {
            name: name.to_string(),
            health: Health::parse(&raw.state),
            status: raw.status.as_deref().map(flatten_text),
            action: raw.action.as_deref().map(flatten_text),
            error_count,
            vdevs: DeviceNode::parse_tree(name, &raw.vdevs, 0)?,
            scan: raw.scan_stats.as_ref().map(ScanResult::parse),
        })
    }

    /// Every vdev, depth-first.
    pub fn devices(&self) -> Vec<&DeviceNode> {
        flatten(&self.vdevs)
    }

    pub fn needs_attention(&self) -> bool {
        self.error_count > 0 || self.health.needs_attention()
    }
}

// Status and action text arrive pre-wrapped for an 80 column terminal.
fn flatten_text(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\t')
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}
