use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `tierlog`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; the CLI layer continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum TierlogError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Storage tiers ───────────────────────────────────────────────────
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    // ── Compression codec ───────────────────────────────────────────────
    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    // ── Caller input ────────────────────────────────────────────────────
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    // ── Archive / retention runs ────────────────────────────────────────
    #[error("maintenance: {0}")]
    Maintenance(#[from] MaintenanceError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("hot-reload failed: {0}")]
    HotReload(String),
}

// ─── Storage errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("record {id} is unreadable: {source}")]
    Unreadable {
        id: i64,
        #[source]
        source: CodecError,
    },

    #[error("payload encoding failed: {0}")]
    Encode(#[from] CodecError),

    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("record {0} not found")]
    NotFound(i64),

    #[error("archive confirmation failed: {expected} rows sent, {confirmed} present in cold tier")]
    Confirmation { expected: usize, confirmed: usize },

    #[error("invalid request: {0}")]
    Invalid(#[from] ValidationError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Codec errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("compress failed: {0}")]
    Compress(#[source] std::io::Error),

    #[error("corrupt compressed blob: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("decompressed payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

// ─── Validation errors ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    #[error("cutoff must not be negative (got {0})")]
    NegativeCutoff(i64),

    #[error("day count must be at least 1")]
    ZeroDays,

    #[error("start_time {start} is after end_time {end}")]
    InvertedTimeRange { start: i64, end: i64 },

    #[error("at least one filter is required")]
    MissingFilter,
}

// ─── Maintenance errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MaintenanceError {
    /// A batch failed after `processed` records were already committed by
    /// `batches` earlier batches. Retrying is safe.
    #[error("{task} aborted after {processed} records in {batches} batches: {source}")]
    Batch {
        task: &'static str,
        processed: u64,
        batches: u64,
        #[source]
        source: StorageError,
    },

    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
}

impl MaintenanceError {
    /// Records committed before the run stopped.
    pub fn processed(&self) -> u64 {
        match self {
            Self::Batch { processed, .. } => *processed,
            Self::Validation(_) => 0,
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, TierlogError>;
