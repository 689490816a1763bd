use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The four ordered phases of one workflow cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    TasksComplete,
    DiagnosticsClean,
    ReviewInvoked,
    ReportGenerated,
}

impl Stage {
    pub fn all() -> &'static [Stage] {
        &[
            Stage::TasksComplete,
            Stage::DiagnosticsClean,
            Stage::ReviewInvoked,
            Stage::ReportGenerated,
        ]
    }

    pub fn next(self) -> Option<Stage> {
        Stage::all().get(self as usize + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::TasksComplete => "tasks_complete",
            Stage::DiagnosticsClean => "diagnostics_clean",
            Stage::ReviewInvoked => "review_invoked",
            Stage::ReportGenerated => "report_generated",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// A stage transition one detector is responsible for.
///
/// The string ids are part of the hook response and are consumed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    #[serde(rename = "tasks_complete_to_diagnostics")]
    TasksToDiagnostics,
    #[serde(rename = "diagnostics_clean_to_code_review")]
    DiagnosticsToReview,
    #[serde(rename = "code_review_to_final_report")]
    ReviewToReport,
}

impl Transition {
    pub fn as_str(self) -> &'static str {
        match self {
            Transition::TasksToDiagnostics => "tasks_complete_to_diagnostics",
            Transition::DiagnosticsToReview => "diagnostics_clean_to_code_review",
            Transition::ReviewToReport => "code_review_to_final_report",
        }
    }

    /// The stage whose completion this transition detects.
    pub fn completes(self) -> Stage {
        match self {
            Transition::TasksToDiagnostics => Stage::TasksComplete,
            Transition::DiagnosticsToReview => Stage::DiagnosticsClean,
            Transition::ReviewToReport => Stage::ReviewInvoked,
        }
    }

    /// The stage the injected instruction moves the agent into.
    pub fn enters(self) -> Stage {
        match self {
            Transition::TasksToDiagnostics => Stage::DiagnosticsClean,
            Transition::DiagnosticsToReview => Stage::ReviewInvoked,
            Transition::ReviewToReport => Stage::ReportGenerated,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    /// Missing or unrecognised status; never counts as completed.
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Diagnostic severity ordinal; lower is more severe. Serializes as the
/// bare ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Severity(i64);

impl Severity {
    pub const ERROR: Severity = Severity(0);
    pub const WARNING: Severity = Severity(1);
    pub const INFORMATION: Severity = Severity(2);
    pub const HINT: Severity = Severity(3);

    /// Findings at or above this severity keep the workflow in stage 2.
    pub const BLOCKING: Severity = Severity::WARNING;

    pub fn new(ordinal: i64) -> Self {
        Severity(ordinal)
    }

    pub fn ordinal(self) -> i64 {
        self.0
    }

    pub fn blocks_advancement(self) -> bool {
        self <= Severity::BLOCKING
    }

    /// Decode an ordinal or a severity name. Anything else is `None`.
    pub fn from_value(value: &Value) -> Option<Severity> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.floor() as i64))
                .map(Severity),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "error" => Some(Severity::ERROR),
                "warning" | "warn" => Some(Severity::WARNING),
                "information" | "info" => Some(Severity::INFORMATION),
                "hint" => Some(Severity::HINT),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self.0 {
            0 => "error",
            1 => "warning",
            2 => "information",
            3 => "hint",
            _ => "unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DiagnosticsSource
// ---------------------------------------------------------------------------

/// Where a diagnostics result comes from, which decides how "clean" is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticsSource {
    /// Typed findings with a severity each.
    Structured,
    /// Free-text command output plus an exit status.
    Command,
}

impl DiagnosticsSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticsSource::Structured => "structured",
            DiagnosticsSource::Command => "command",
        }
    }
}

impl fmt::Display for DiagnosticsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
