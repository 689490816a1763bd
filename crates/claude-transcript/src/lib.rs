//! `claude-transcript`: tolerant reader for Claude session transcripts.
//!
//! A transcript is an append-only JSONL file that the agent host writes while
//! a session runs. This crate turns it into an ordered sequence of typed
//! [`Event`]s without ever failing the whole read on a bad line: the file may
//! be mid-write when we look at it.
//!
//! # Architecture
//!
//! ```text
//! transcript.jsonl
//!     │
//!     ▼
//! parse_line      ← one JSON object per line; invalid lines are dropped
//!     │
//!     ▼
//! Record enum     ← flat tool_use / tool_result, or nested assistant/user
//!     │              messages carrying content blocks
//!     ▼
//! Event enum      ← flattened, newest last; position = sequence position
//!     │
//!     ▼
//! Transcript      ← bounded by lookback, trailing byte cap and a deadline
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use claude_transcript::{ReadOptions, Transcript};
//!
//! let opts = ReadOptions::default().tool_uses_only().with_lookback(Some(100));
//! let transcript = Transcript::read(path, &opts);
//! if let Some((pos, todo)) = transcript.last_tool_use("TodoWrite") {
//!     println!("latest task list at {pos}: {}", todo.input);
//! }
//! ```

pub mod error;
pub mod reader;
pub mod types;


pub use error::TranscriptError;
pub use reader::{parse_line, ReadOptions, ReadStats, Transcript, DEFAULT_MAX_BYTES, DEFAULT_TIMEOUT};
pub use types::{Event, EventKind, Lifecycle, Record, ToolResult, ToolUse};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, TranscriptError>;
