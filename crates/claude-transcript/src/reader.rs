use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;

use crate::types::{Event, Record, ToolUse};
use crate::{Result, TranscriptError};

/// Default cap on how many trailing bytes of a transcript are scanned.
pub const DEFAULT_MAX_BYTES: u64 = 16 * 1024 * 1024;

/// Default deadline for a single transcript scan.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

// ─── ReadOptions ──────────────────────────────────────────────────────────

/// Bounds applied while scanning a transcript.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Keep only the last `n` events (after `tool_uses_only` filtering).
    pub lookback: Option<usize>,
    /// Drop every event that is not an action invocation.
    pub tool_uses_only: bool,
    /// Scan only the trailing `max_bytes` of the file.
    pub max_bytes: Option<u64>,
    /// Abort the scan once this much time has elapsed.
    pub timeout: Option<Duration>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            lookback: None,
            tool_uses_only: false,
            max_bytes: Some(DEFAULT_MAX_BYTES),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl ReadOptions {
    pub fn with_lookback(mut self, lookback: Option<usize>) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn tool_uses_only(mut self) -> Self {
        self.tool_uses_only = true;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: Option<u64>) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

// ─── Transcript ───────────────────────────────────────────────────────────

/// Counters describing what a scan saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Non-blank lines examined.
    pub lines: usize,
    /// Lines dropped because they were not valid JSON records.
    pub skipped: usize,
    /// True when the head of the file was cut off by `max_bytes`.
    pub truncated: bool,
}

/// An ordered, immutable view of a session's events, newest last.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    events: Vec<Event>,
    stats: ReadStats,
}

impl Transcript {
    pub fn from_events(events: Vec<Event>) -> Self {
        Self {
            events,
            stats: ReadStats::default(),
        }
    }

    /// Read and parse the transcript at `path`.
    ///
    /// Malformed lines are skipped; a missing file, an I/O failure or an
    /// exceeded deadline is an error.
    pub fn open(path: &Path, opts: &ReadOptions) -> Result<Self> {
        let mut file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TranscriptError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(TranscriptError::Io(e)),
        };

        let len = file.metadata()?.len();
        let mut truncated = false;
        let mut skip_first = false;
        if let Some(cap) = opts.max_bytes {
            if len > cap {
                // Peek at the byte before the cut: unless it ends a line, the
                // first line we would read is a fragment.
                file.seek(SeekFrom::Start(len - cap - 1))?;
                let mut prev = [0u8; 1];
                file.read_exact(&mut prev)?;
                skip_first = prev[0] != b'\n';
                truncated = true;
            }
        }

        let mut transcript = collect(BufReader::new(file), opts, skip_first, path)?;
        transcript.stats.truncated = truncated;
        if truncated {
            tracing::debug!(path = %path.display(), len, "transcript truncated to trailing window");
        }
        Ok(transcript)
    }

    /// Like [`Transcript::open`], but every failure degrades to an empty
    /// transcript. A log that cannot be read is treated as absent.
    pub fn read(path: &Path, opts: &ReadOptions) -> Self {
        match Self::open(path, opts) {
            Ok(t) => t,
            Err(TranscriptError::NotFound(p)) => {
                tracing::debug!(path = %p.display(), "transcript does not exist");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read transcript");
                Self::default()
            }
        }
    }

    /// Parse an in-memory transcript. Never fails.
    pub fn parse_str(data: &str, opts: &ReadOptions) -> Self {
        let opts = ReadOptions {
            timeout: None,
            ..opts.clone()
        };
        collect(data.as_bytes(), &opts, false, Path::new("<memory>")).unwrap_or_default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn stats(&self) -> ReadStats {
        self.stats
    }

    /// Action invocations with their sequence positions.
    pub fn tool_uses(&self) -> impl Iterator<Item = (usize, &ToolUse)> + '_ {
        self.events
            .iter()
            .enumerate()
            .filter_map(|(pos, e)| e.as_tool_use().map(|t| (pos, t)))
    }

    /// The most recent action invocation named `name`.
    pub fn last_tool_use(&self, name: &str) -> Option<(usize, &ToolUse)> {
        self.tool_uses().filter(|(_, t)| t.name == name).last()
    }
}

// ─── Line parsing ─────────────────────────────────────────────────────────

/// Parse one transcript line into events.
///
/// Invalid JSON and non-object values are errors. A JSON object whose
/// fields do not fit any known record shape still occupies a position and
/// yields a single opaque event.
pub fn parse_line(line: &str) -> Result<Vec<Event>> {
    let value: Value = serde_json::from_str(line).map_err(|source| TranscriptError::Parse {
        line: line.to_string(),
        source,
    })?;
    if !value.is_object() {
        return Err(TranscriptError::Parse {
            line: line.to_string(),
            source: <serde_json::Error as serde::de::Error>::custom("record is not a JSON object"),
        });
    }
    let timestamp = crate::types::parse_timestamp(value.get("timestamp").and_then(Value::as_str));
    match Record::deserialize(value) {
        Ok(record) => {
            let mut events = record.into_events();
            for event in &mut events {
                if let Event::Other { timestamp: ts } = event {
                    if ts.is_none() {
                        *ts = timestamp;
                    }
                }
            }
            Ok(events)
        }
        Err(_) => Ok(vec![Event::Other { timestamp }]),
    }
}

fn collect<R: BufRead>(
    reader: R,
    opts: &ReadOptions,
    mut skip_first: bool,
    path: &Path,
) -> Result<Transcript> {
    let started = Instant::now();
    let mut window: VecDeque<Event> = VecDeque::new();
    let mut stats = ReadStats::default();

    for raw in reader.split(b'\n') {
        if let Some(limit) = opts.timeout {
            if started.elapsed() > limit {
                return Err(TranscriptError::Timeout {
                    path: path.to_path_buf(),
                    limit,
                });
            }
        }
        let raw = raw?;
        if skip_first {
            skip_first = false;
            continue;
        }
        let text = String::from_utf8_lossy(&raw);
        let line = text.trim();
        if line.is_empty() {
            continue;
        }
        stats.lines += 1;

        match parse_line(line) {
            Ok(events) => {
                for event in events {
                    if opts.tool_uses_only && !event.is_tool_use() {
                        continue;
                    }
                    window.push_back(event);
                    if let Some(n) = opts.lookback {
                        while window.len() > n {
                            window.pop_front();
                        }
                    }
                }
            }
            Err(e) => {
                stats.skipped += 1;
                tracing::debug!(error = %e, "skipping malformed transcript line");
            }
        }
    }

    if stats.skipped > 0 {
        tracing::debug!(
            path = %path.display(),
            skipped = stats.skipped,
            lines = stats.lines,
            "transcript contained malformed lines"
        );
    }

    Ok(Transcript {
        events: window.into(),
        stats,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────
