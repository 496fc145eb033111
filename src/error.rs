use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a cleaning run.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("unknown kind '{kind}' (known kinds: {})", known.join(", "))]
    UnknownKind { kind: String, known: Vec<String> },
    #[error("malformed input: stream is empty, no header line available")]
    MalformedInput,
    #[error("row shape mismatch at line {line}: expected {expected} fields, found {found}")]
    RowShape {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("failed to {action} '{}'", path.display())]
    PathIo {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CleanError>;
