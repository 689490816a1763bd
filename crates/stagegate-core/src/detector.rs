use crate::config::Config;
use crate::decision::Decision;
use crate::diagnostics;
use crate::error::{Result, StagegateError};
use crate::request::HookRequest;
use crate::review;
use crate::todos;
use crate::types::Transition;
use claude_transcript::{ReadOptions, Transcript};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// One of the three stage detectors. Each is a pure function of the
/// request and the transcript it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Detector {
    TaskCompletion,
    DiagnosticsClean,
    ReviewInvoked,
}

impl Detector {
    pub fn all() -> &'static [Detector] {
        &[
            Detector::TaskCompletion,
            Detector::DiagnosticsClean,
            Detector::ReviewInvoked,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Detector::TaskCompletion => "todos",
            Detector::DiagnosticsClean => "diagnostics",
            Detector::ReviewInvoked => "review",
        }
    }

    pub fn transition(self) -> Transition {
        match self {
            Detector::TaskCompletion => Transition::TasksToDiagnostics,
            Detector::DiagnosticsClean => Transition::DiagnosticsToReview,
            Detector::ReviewInvoked => Transition::ReviewToReport,
        }
    }

    /// Whether an action named `tool_name` can trigger this detector.
    pub fn triggers_on(self, tool_name: &str, config: &Config) -> bool {
        match self {
            Detector::TaskCompletion => tool_name == config.tools.task_list,
            Detector::DiagnosticsClean => config.tools.diagnostics_source(tool_name).is_some(),
            Detector::ReviewInvoked => tool_name == config.tools.delegate,
        }
    }

    /// The detector whose trigger matches the request's action, if any.
    pub fn for_request(request: &HookRequest, config: &Config) -> Option<Detector> {
        Detector::all()
            .iter()
            .copied()
            .find(|d| d.triggers_on(request.tool_name(), config))
    }

    fn read_options(self, config: &Config) -> ReadOptions {
        match self {
            Detector::TaskCompletion => config.transcript.task_list_options(),
            Detector::DiagnosticsClean => config.transcript.diagnostics_options(),
            Detector::ReviewInvoked => config.transcript.review_options(),
        }
    }

    /// Evaluate against the transcript named in the request.
    ///
    /// Errors are limited to a missing transcript reference or an invalid
    /// pattern table; an unreadable transcript reads as empty.
    pub fn evaluate(self, request: &HookRequest, config: &Config) -> Result<Decision> {
        if !self.triggers_on(request.tool_name(), config) {
            tracing::debug!(
                detector = self.as_str(),
                tool = request.tool_name(),
                "action does not trigger this detector"
            );
            return Ok(Decision::Empty);
        }

        let path = request
            .transcript_path
            .as_deref()
            .ok_or(StagegateError::MissingTranscript)?;

        // Cleanliness needs only the request; skip the read when it fails.
        if self == Detector::DiagnosticsClean {
            let patterns = config.pattern_set()?;
            let verdict = diagnostics::request_verdict(request, config, &patterns);
            if !verdict.as_ref().is_some_and(diagnostics::Verdict::is_clean) {
                tracing::debug!(?verdict, "diagnostics not clean; transcript not read");
                return Ok(Decision::Empty);
            }
        }

        let transcript = Transcript::read(path, &self.read_options(config));
        tracing::debug!(
            detector = self.as_str(),
            transition = %self.transition(),
            events = transcript.len(),
            skipped = transcript.stats().skipped,
            truncated = transcript.stats().truncated,
            "transcript scanned"
        );
        self.evaluate_with(request, &transcript, config)
    }

    /// Evaluate against an already-read transcript window. Fails only when
    /// the diagnostics detector cannot compile the failure-marker table.
    pub fn evaluate_with(
        self,
        request: &HookRequest,
        transcript: &Transcript,
        config: &Config,
    ) -> Result<Decision> {
        Ok(match self {
            Detector::TaskCompletion => todos::evaluate(request, transcript, config),
            Detector::DiagnosticsClean => {
                let patterns = config.pattern_set()?;
                diagnostics::evaluate(request, transcript, config, &patterns)
            }
            Detector::ReviewInvoked => review::evaluate(request, transcript, config),
        })
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Detector {
    type Err = StagegateError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "todos" | "tasks" => Ok(Detector::TaskCompletion),
            "diagnostics" => Ok(Detector::DiagnosticsClean),
            "review" | "code-review" => Ok(Detector::ReviewInvoked),
            _ => Err(StagegateError::UnknownDetector(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Dispatch the request to whichever detector its action triggers.
pub fn evaluate_auto(request: &HookRequest, config: &Config) -> Result<Decision> {
    match Detector::for_request(request, config) {
        Some(detector) => detector.evaluate(request, config),
        None => {
            tracing::debug!(tool = request.tool_name(), "no detector for action");
            Ok(Decision::Empty)
        }
    }
}

/// Run `detector` (or auto-dispatch when `None`), absorbing every failure
/// into the empty decision.
pub fn run_request(detector: Option<Detector>, request: &HookRequest, config: &Config) -> Decision {
    let result = match detector {
        Some(d) => d.evaluate(request, config),
        None => evaluate_auto(request, config),
    };
    absorb(detector, result)
}

fn absorb(detector: Option<Detector>, result: Result<Decision>) -> Decision {
    result.unwrap_or_else(|e| {
        tracing::warn!(
            detector = detector.map_or("auto", Detector::as_str),
            error = %e,
            "hook evaluation failed; emitting empty decision"
        );
        Decision::Empty
    })
}
