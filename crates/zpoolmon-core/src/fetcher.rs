use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::config::RefreshConfig;
use crate::snapshot::PoolSnapshot;

/// Decoded `zpool status -j` output: raw records keyed by pool name, in the
/// order the command listed them.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusDocument {
    pub pools: Map<String, Value>,
}

impl StatusDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FetchError> {
        serde_json::from_slice(bytes).map_err(|err| FetchError::Malformed(err.to_string()))
    }
}

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("{0} not found")]
    CommandNotFound(String),
    #[error("failed to run {binary}: {reason}")]
    Spawn { binary: String, reason: String },
    #[error("{binary} exited with {}: {stderr}", exit_label(.code))]
    Exit {
        binary: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed status output: {0}")]
    Malformed(String),
    #[error("fetch task failed: {0}")]
    Worker(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{name} is not a valid pool name (known pools: {})", .available.join(", "))]
    UnknownPool { name: String, available: Vec<String> },
    #[error("could not list pools: {0}")]
    Lookup(#[from] FetchError),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

#[async_trait]
pub trait StatusFetcher: Send + Sync {
    /// Names of every imported pool.
    async fn list_pools(&self) -> Result<Vec<String>, FetchError>;
    /// Status of the named pools; an empty slice means all of them.
    async fn fetch_status(&self, pools: &[String]) -> Result<StatusDocument, FetchError>;
}

/// Runs the real `zpool` binary.
#[derive(Debug, Clone)]
pub struct ZpoolCommand {
    binary: PathBuf,
    timeout: Duration,
}

impl ZpoolCommand {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(config.zpool_bin.clone(), config.fetch_timeout)
    }

    async fn run(&self, args: &[&str], pools: &[String]) -> Result<Vec<u8>, FetchError> {
        let binary = self.binary.display().to_string();
        debug!(%binary, ?args, ?pools, "running zpool");

        let mut command = Command::new(&self.binary);
        command.args(args).args(pools).kill_on_drop(true);

        let output = match timeout(self.timeout, command.output()).await {
            Err(_) => return Err(FetchError::Timeout(self.timeout)),
            Ok(Err(err)) if err.kind() == ErrorKind::NotFound => return Err(FetchError::CommandNotFound(binary)),
            Ok(Err(err)) => {
                return Err(FetchError::Spawn {
                    binary,
                    reason: err.to_string(),
                })
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return Err(FetchError::Exit {
                binary,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl StatusFetcher for ZpoolCommand {
    async fn list_pools(&self) -> Result<Vec<String>, FetchError> {
        let stdout = self.run(&["list", "-H", "-o", "name"], &[]).await?;
        Ok(String::from_utf8_lossy(&stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn fetch_status(&self, pools: &[String]) -> Result<StatusDocument, FetchError> {
        let stdout = self.run(&["status", "-t", "-j", "--json-int"], pools).await?;
        StatusDocument::from_slice(&stdout)
    }
}

/// Fetch and parse in one step; this is the unit of work a refresh runs.
pub async fn collect_snapshot<F>(fetcher: &F, pools: &[String]) -> Result<PoolSnapshot, FetchError>
where
    F: StatusFetcher + ?Sized,
{
    let document = fetcher.fetch_status(pools).await?;
    Ok(PoolSnapshot::from_document(&document, Utc::now()))
}

/// Confirm every requested pool exists. An empty request means "all pools"
/// and is accepted without a lookup.
pub async fn validate_pools<F>(fetcher: &F, requested: &[String]) -> Result<Vec<String>, ValidationError>
where
    F: StatusFetcher + ?Sized,
{
    if requested.is_empty() {
        return Ok(Vec::new());
    }

    let available = fetcher.list_pools().await?;
    let mut accepted: Vec<String> = Vec::with_capacity(requested.len());
    for name in requested {
        if !available.contains(name) {
            return Err(ValidationError::UnknownPool {
                name: name.clone(),
                available,
            });
        }
        if !accepted.contains(name) {
            accepted.push(name.clone());
        }
    }

    Ok(accepted)
}
