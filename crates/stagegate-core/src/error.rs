use thiserror::Error;

#[derive(Debug, Error)]
pub enum StagegateError {
    #[error("invalid hook request: {0}")]
    InvalidRequest(String),

    #[error("no transcript_path in hook request")]
    MissingTranscript,

    #[error("config not found: {0}")]
    ConfigNotFound(String),

    #[error("invalid failure pattern '{id}': {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown detector: {0}")]
    UnknownDetector(String),

    #[error(transparent)]
    Transcript(#[from] claude_transcript::TranscriptError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StagegateError>;
