use thiserror::Error;

/// Errors raised while decoding, applying or persisting mirrored events
#[derive(Debug, Error)]
pub enum IndexerError {
    /// Log payload was not valid base64 or Borsh
    #[error("Malformed event payload: {0}")]
    Decode(String),

    /// Event refers to an agent the mirror has never seen minted
    #[error("Unknown agent: {0}")]
    UnknownAgent(u64),

    /// Mint event for an id that is already mirrored
    #[error("Agent already mirrored: {0}")]
    DuplicateAgent(u64),

    /// Identity string in a snapshot or query is not a valid public key
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// Content hash in a snapshot is not 32 hex-encoded bytes
    #[error("Invalid content hash: {0}")]
    InvalidHash(String),

    #[error("Counter overflow on agent {0}")]
    Overflow(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IndexerError>;
