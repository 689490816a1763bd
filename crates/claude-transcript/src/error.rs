use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transcript not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse transcript line: {source}\n  line: {line}")]
    Parse {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("reading {} exceeded the {:?} deadline", path.display(), limit)]
    Timeout { path: PathBuf, limit: Duration },
}
