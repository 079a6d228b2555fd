use thiserror::Error;

/// Status data that does not match the shape `zpool status -j` documents.
///
/// Fatal only to the pool it was found in; the rest of the snapshot still
/// parses and renders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("can't convert {0:?} to bytes")]
    Size(String),
    #[error("unit suffix {suffix:?} in {input:?} is invalid")]
    UnitSuffix { input: String, suffix: String },
    #[error("unexpected value (trim_notsup={value}) for device {device}")]
    TrimSupport { device: String, value: String },
    #[error("malformed status record for pool {pool}: {reason}")]
    Record { pool: String, reason: String },
}
