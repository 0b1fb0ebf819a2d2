use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the encode and decode sessions.
#[derive(Debug, Error)]
pub enum HuffError {
    /// Input or output path could not be opened.
    #[error("failed to open {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Read or write failed after the file was opened.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Compressed data is truncated or internally inconsistent.
    #[error("malformed compressed data: {0}")]
    Format(String),
    /// A byte outside the 0..128 alphabet.
    #[error("unsupported symbol {symbol} at offset {offset}")]
    UnsupportedSymbol { symbol: u8, offset: usize },
    /// Work was handed to a pool that has already shut down.
    #[error("worker pool has stopped")]
    PoolStopped,
    /// A pool task panicked before it produced a result.
    #[error("worker task panicked")]
    WorkerPanicked,
}

impl HuffError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        HuffError::Format(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, HuffError>;
