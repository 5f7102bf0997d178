use thiserror::Error;

/// Everything that can go wrong on the client side. None of these are
/// fatal: the worst case is a stale scene until the next reconnect.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("protocol parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid vortex line record gid={gid}: {reason}")]
    Record { gid: i64, reason: &'static str },

    #[error("no frame header for frame {frame}")]
    Lookup { frame: usize },
}
