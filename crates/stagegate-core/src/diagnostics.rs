use crate::config::Config;
use crate::cycle::CyclePositions;
use crate::decision::{Annotation, Decision};
use crate::patterns::PatternSet;
use crate::prompts;
use crate::request::HookRequest;
use crate::types::{DiagnosticsSource, Severity, Transition};
use claude_transcript::Transcript;
use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Structured findings
// ---------------------------------------------------------------------------

/// One finding from a structured diagnostics source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    /// `None` when missing or unrecognised; such findings never block.
    pub severity: Option<Severity>,
    pub message: Option<String>,
}

impl Finding {
    fn from_value(value: &Value) -> Self {
        Self {
            severity: value.get("severity").and_then(Severity::from_value),
            message: value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    pub fn blocks(&self) -> bool {
        self.severity.is_some_and(Severity::blocks_advancement)
    }
}

/// Findings at `response.diagnostics[]`, or a bare top-level array.
pub fn findings(response: &Value) -> Vec<Finding> {
    let items = match response {
        Value::Array(items) => Some(items),
        other => other.get("diagnostics").and_then(Value::as_array),
    };
    items
        .map(|items| items.iter().map(Finding::from_value).collect())
        .unwrap_or_default()
}

/// Clean iff no finding is an error or a warning.
pub fn clean_structured(findings: &[Finding]) -> bool {
    !findings.iter().any(Finding::blocks)
}

// ---------------------------------------------------------------------------
// Command output
// ---------------------------------------------------------------------------

/// Result of a shell command that ran a diagnostics tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub exit_code: i64,
    pub output: String,
    pub interrupted: bool,
}

const EXIT_CODE_KEYS: &[&str] = &["exit_code", "exitCode", "returncode"];

impl CommandOutput {
    /// A missing exit status is treated as failure (1).
    pub fn from_response(response: &Value) -> Self {
        let exit_code = EXIT_CODE_KEYS
            .iter()
            .find_map(|k| response.get(*k).and_then(Value::as_i64))
            .unwrap_or(1);

        let text = |key: &str| response.get(key).and_then(Value::as_str);
        let output = match text("output") {
            Some(out) => out.to_string(),
            None => match (text("stdout"), text("stderr")) {
                (Some(out), Some(err)) => format!("{out}\n{err}"),
                (Some(s), None) | (None, Some(s)) => s.to_string(),
                (None, None) => String::new(),
            },
        };

        Self {
            exit_code,
            output,
            interrupted: response
                .get("interrupted")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

/// Clean iff the command succeeded, was not interrupted, and printed none of
/// the failure markers.
pub fn clean_unstructured(cmd: &CommandOutput, patterns: &PatternSet) -> bool {
    matches!(unstructured_verdict(cmd, patterns), Verdict::Clean)
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Why a diagnostics result is (not) clean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Clean,
    BlockingFindings { count: usize },
    ExitStatus { code: i64 },
    Interrupted,
    FailureMarker { pattern_id: String },
}

impl Verdict {
    pub fn is_clean(&self) -> bool {
        matches!(self, Verdict::Clean)
    }
}

pub fn structured_verdict(findings: &[Finding]) -> Verdict {
    match findings.iter().filter(|f| f.blocks()).count() {
        0 => Verdict::Clean,
        count => Verdict::BlockingFindings { count },
    }
}

pub fn unstructured_verdict(cmd: &CommandOutput, patterns: &PatternSet) -> Verdict {
    if cmd.interrupted {
        return Verdict::Interrupted;
    }
    if cmd.exit_code != 0 {
        return Verdict::ExitStatus {
            code: cmd.exit_code,
        };
    }
    match patterns.first_match(&cmd.output) {
        Some(def) => Verdict::FailureMarker {
            pattern_id: def.id.clone(),
        },
        None => Verdict::Clean,
    }
}

/// Judge a diagnostics tool response according to its source kind.
pub fn assess(source: DiagnosticsSource, response: &Value, patterns: &PatternSet) -> Verdict {
    match source {
        DiagnosticsSource::Structured => structured_verdict(&findings(response)),
        DiagnosticsSource::Command => {
            unstructured_verdict(&CommandOutput::from_response(response), patterns)
        }
    }
}

// ---------------------------------------------------------------------------
// Stage 2 → 3
// ---------------------------------------------------------------------------

/// Cleanliness from the request alone. `None` when the request is not a
/// diagnostics action.
pub fn request_verdict(
    request: &HookRequest,
    config: &Config,
    patterns: &PatternSet,
) -> Option<Verdict> {
    let source = config.tools.diagnostics_source(request.tool_name())?;
    Some(assess(source, &request.tool_response, patterns))
}

/// Fire once the diagnostics are clean and the current cycle has a completed
/// task list that no reviewer has seen yet.
///
/// `transcript` must be the diagnostics window: action invocations only.
pub fn evaluate(
    request: &HookRequest,
    transcript: &Transcript,
    config: &Config,
    patterns: &PatternSet,
) -> Decision {
    let verdict = request_verdict(request, config, patterns);
    if !verdict.as_ref().is_some_and(Verdict::is_clean) {
        tracing::debug!(?verdict, "diagnostics not clean");
        return Decision::Empty;
    }

    let positions = CyclePositions::scan(transcript, config);
    if !positions.fresh_for_review_prompt() {
        tracing::debug!(
            last_task_list = ?positions.last_task_list,
            completed = positions.last_task_list_completed,
            last_review = ?positions.last_review,
            "no fresh completed cycle; not requesting review"
        );
        return Decision::Empty;
    }

    let tool = request.tool_name();
    tracing::info!(tool, "diagnostics clean; requesting code review");
    Decision::block(
        prompts::INVOKE_REVIEWER,
        Annotation::new(&config.hook_event_name, Transition::DiagnosticsToReview)
            .with_diagnostics_tool(tool),
    )
}
