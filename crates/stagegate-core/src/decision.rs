use crate::types::Transition;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// Structured metadata attached to a triggering decision
/// (`hookSpecificOutput` on the wire).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub hook_event_name: String,
    pub stage: Transition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_tasks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics_tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subagent_type: Option<String>,
}

impl Annotation {
    pub fn new(hook_event_name: impl Into<String>, stage: Transition) -> Self {
        Self {
            hook_event_name: hook_event_name.into(),
            stage,
            additional_context: None,
            completed_tasks: None,
            diagnostics_tool: None,
            subagent_type: None,
        }
    }

    pub fn with_additional_context(mut self, text: impl Into<String>) -> Self {
        self.additional_context = Some(text.into());
        self
    }

    pub fn with_completed_tasks(mut self, n: usize) -> Self {
        self.completed_tasks = Some(n);
        self
    }

    pub fn with_diagnostics_tool(mut self, tool: impl Into<String>) -> Self {
        self.diagnostics_tool = Some(tool.into());
        self
    }

    pub fn with_subagent_type(mut self, role: impl Into<String>) -> Self {
        self.subagent_type = Some(role.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// The single output of a detector invocation.
///
/// Serializes to `{}` when empty, or to the block envelope otherwise.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Decision {
    #[default]
    Empty,
    Block {
        reason: String,
        annotation: Annotation,
    },
}

impl Decision {
    pub fn block(reason: impl Into<String>, annotation: Annotation) -> Self {
        Decision::Block {
            reason: reason.into(),
            annotation,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Decision::Block { .. })
    }

    pub fn transition(&self) -> Option<Transition> {
        match self {
            Decision::Block { annotation, .. } => Some(annotation.stage),
            Decision::Empty => None,
        }
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        match self {
            Decision::Block { annotation, .. } => Some(annotation),
            Decision::Empty => None,
        }
    }

    /// Compact single-line JSON, as written to stdout.
    pub fn to_json(&self) -> String {
        // Serializing plain strings, integers and enums cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Serialize)]
struct HookResponse<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    #[serde(rename = "hookSpecificOutput", skip_serializing_if = "Option::is_none")]
    hook_specific_output: Option<&'a Annotation>,
}

impl Serialize for Decision {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let response = match self {
            Decision::Empty => HookResponse {
                decision: None,
                reason: None,
                hook_specific_output: None,
            },
            Decision::Block { reason, annotation } => HookResponse {
                decision: Some("block"),
                reason: Some(reason),
                hook_specific_output: Some(annotation),
            },
        };
        response.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn empty_serializes_to_empty_object() {
        assert_eq!(Decision::Empty.to_json(), "{}");
        assert!(!Decision::Empty.is_block());
        assert_eq!(Decision::Empty.transition(), None);
    }

    #[test]
    fn block_envelope_shape() {
        let d = Decision::block(
            "Run diagnostics",
            Annotation::new("PostToolUse", Transition::TasksToDiagnostics)
                .with_additional_context("3 done")
                .with_completed_tasks(3),
        );
        let v: Value = serde_json::from_str(&d.to_json()).unwrap();
        assert_eq!(
            v,
            json!({
                "decision": "block",
                "reason": "Run diagnostics",
                "hookSpecificOutput": {
                    "hookEventName": "PostToolUse",
                    "stage": "tasks_complete_to_diagnostics",
                    "additionalContext": "3 done",
                    "completedTasks": 3
                }
            })
        );
        assert_eq!(d.transition(), Some(Transition::TasksToDiagnostics));
    }

    #[test]
    fn non_ascii_is_written_verbatim() {
        let d = Decision::block(
            "Отчёт ✅",
            Annotation::new("PostToolUse", Transition::ReviewToReport)
                .with_subagent_type("code-reviewer"),
        );
        let out = d.to_json();
        assert!(out.contains("Отчёт ✅"));
        assert!(out.contains(r#""subagentType":"code-reviewer""#));
        assert!(!out.contains("diagnosticsTool"));
    }
}
