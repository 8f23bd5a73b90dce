use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("checkpoint I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("match record could not be encoded: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("match record could not be decoded: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("checkpoint payload is not valid LZ4: {0}")]
    Decompression(String),

    #[error("checkpoint is {len} bytes, too short to hold a payload and checksum")]
    Truncated { len: usize },

    /// The record decoded but its counters disagree with its logs.
    #[error("checkpointed record is inconsistent: {0}")]
    InconsistentRecord(String),

    #[error("checkpoint version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("checkpoint checksum mismatch")]
    ChecksumMismatch,
}

impl SaveError {
    /// Whether retrying (another read, a newer build) can succeed. Damaged
    /// bytes never become readable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SaveError::Io(_) | SaveError::UnsupportedVersion { .. })
    }
}
