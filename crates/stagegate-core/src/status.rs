use crate::config::Config;
use crate::cycle::CyclePositions;
use crate::todos::{latest_snapshot, TaskSnapshot};
use crate::types::{Stage, TaskStatus};
use claude_transcript::Transcript;
use serde::Serialize;

// ---------------------------------------------------------------------------
// StatusContext
// ---------------------------------------------------------------------------

pub struct StatusContext<'a> {
    pub transcript: &'a Transcript,
    pub snapshot: Option<&'a TaskSnapshot>,
    pub positions: &'a CyclePositions,
    pub config: &'a Config,
}

impl StatusContext<'_> {
    /// Diagnostics actions after the completed task list of this cycle.
    fn diagnostics_runs(&self) -> usize {
        let Some(start) = self.positions.completed_task_list() else {
            return 0;
        };
        self.transcript
            .tool_uses()
            .filter(|(pos, t)| {
                *pos > start && self.config.tools.diagnostics_source(&t.name).is_some()
            })
            .count()
    }

    fn summary(&self) -> String {
        self.snapshot
            .map(TaskSnapshot::summarize)
            .unwrap_or_else(|| "no task list".to_string())
    }
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// A fn-pointer rule: first match wins.
pub struct StatusRule {
    pub id: &'static str,
    pub condition: fn(&StatusContext) -> bool,
    /// Latest stage the cycle has reached, `None` before stage 1.
    pub reached: Option<Stage>,
    pub message: fn(&StatusContext) -> String,
}

pub fn default_status_rules() -> Vec<StatusRule> {
    vec![
        StatusRule {
            id: "review_invoked",
            condition: |ctx| {
                ctx.positions.completed_task_list().is_some()
                    && ctx.positions.review_in_current_cycle()
            },
            reached: Some(Stage::ReviewInvoked),
            message: |_| "code review invoked; final report requested".to_string(),
        },
        StatusRule {
            id: "awaiting_clean_diagnostics",
            condition: |ctx| ctx.positions.fresh_for_review_prompt() && ctx.diagnostics_runs() > 0,
            reached: Some(Stage::TasksComplete),
            message: |ctx| {
                format!(
                    "all tasks completed; {} diagnostics run(s) since, review not yet invoked",
                    ctx.diagnostics_runs()
                )
            },
        },
        StatusRule {
            id: "tasks_complete",
            condition: |ctx| ctx.positions.fresh_for_review_prompt(),
            reached: Some(Stage::TasksComplete),
            message: |ctx| format!("all tasks completed ({}); diagnostics requested", ctx.summary()),
        },
        StatusRule {
            id: "tasks_open",
            condition: |ctx| ctx.snapshot.is_some(),
            reached: None,
            message: |ctx| format!("tasks in progress: {}", ctx.summary()),
        },
        StatusRule {
            id: "no_task_list",
            condition: |_| true,
            reached: None,
            message: |_| "no task list in transcript".to_string(),
        },
    ]
}

// ---------------------------------------------------------------------------
// WorkflowStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub all_completed: bool,
}

impl From<&TaskSnapshot> for TaskCounts {
    fn from(s: &TaskSnapshot) -> Self {
        Self {
            total: s.len(),
            completed: s.count(TaskStatus::Completed),
            in_progress: s.count(TaskStatus::InProgress),
            pending: s.count(TaskStatus::Pending),
            all_completed: s.all_completed(),
        }
    }
}

/// Workflow state re-derived from a transcript.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStatus {
    pub events: usize,
    pub skipped_lines: usize,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<TaskCounts>,
    pub summary: String,
    pub positions: CyclePositions,
    pub review_in_current_cycle: bool,
    pub rule: &'static str,
    pub reached: Option<Stage>,
    pub next: Option<Stage>,
    pub message: String,
}

impl WorkflowStatus {
    pub fn derive(transcript: &Transcript, config: &Config) -> Self {
        let snapshot = latest_snapshot(transcript, &config.tools.task_list).map(|(_, s)| s);
        let positions = CyclePositions::scan(transcript, config);
        let ctx = StatusContext {
            transcript,
            snapshot: snapshot.as_ref(),
            positions: &positions,
            config,
        };

        let rules = default_status_rules();
        // The last rule always matches.
        let (rule, reached, message) = rules
            .iter()
            .find(|r| (r.condition)(&ctx))
            .map(|r| (r.id, r.reached, (r.message)(&ctx)))
            .unwrap_or(("no_task_list", None, String::new()));

        let next = match reached {
            Some(stage) => stage.next(),
            None => Some(Stage::TasksComplete),
        };

        Self {
            events: transcript.len(),
            skipped_lines: transcript.stats().skipped,
            truncated: transcript.stats().truncated,
            tasks: snapshot.as_ref().map(TaskCounts::from),
            summary: ctx.summary(),
            positions,
            review_in_current_cycle: positions.review_in_current_cycle(),
            rule,
            reached,
            next,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claude_transcript::ReadOptions;
    use serde_json::{json, Value};

    fn derive(lines: &[Value]) -> WorkflowStatus {
        let body = lines.iter().map(Value::to_string).collect::<Vec<_>>().join("\n");
        let t = Transcript::parse_str(&body, &ReadOptions::default());
        WorkflowStatus::derive(&t, &Config::default())
    }

    fn todos(statuses: &[&str]) -> Value {
        let todos: Vec<Value> = statuses
            .iter()
            .map(|s| json!({"content": "t", "status": s}))
            .collect();
        json!({"type": "tool_use", "name": "TodoWrite", "input": {"todos": todos}})
    }

    fn bash() -> Value {
        json!({"type": "tool_use", "name": "Bash", "input": {"command": "cargo check"}})
    }

    fn review() -> Value {
        json!({"type": "tool_use", "name": "Task", "input": {"subagent_type": "code-reviewer"}})
    }

    #[test]
    fn empty_transcript() {
        let s = derive(&[]);
        assert_eq!(s.rule, "no_task_list");
        assert_eq!(s.reached, None);
        assert_eq!(s.next, Some(Stage::TasksComplete));
        assert!(s.tasks.is_none());
    }

    #[test]
    fn open_tasks() {
        let s = derive(&[todos(&["completed", "in_progress", "pending"])]);
        assert_eq!(s.rule, "tasks_open");
        assert_eq!(s.summary, "1/3 completed, 1 in progress, 1 pending");
        assert_eq!(s.tasks.as_ref().map(|t| t.total), Some(3));
    }

    #[test]
    fn tasks_complete_then_diagnostics() {
        let s = derive(&[todos(&["completed", "completed"])]);
        assert_eq!(s.rule, "tasks_complete");
        assert_eq!(s.reached, Some(Stage::TasksComplete));
        assert_eq!(s.next, Some(Stage::DiagnosticsClean));

        let s = derive(&[todos(&["completed"]), bash(), bash()]);
        assert_eq!(s.rule, "awaiting_clean_diagnostics");
        assert!(s.message.contains("2 diagnostics run(s)"));
    }

    #[test]
    fn review_in_cycle() {
        let s = derive(&[todos(&["completed"]), bash(), review()]);
        assert_eq!(s.rule, "review_invoked");
        assert!(s.review_in_current_cycle);
        assert_eq!(s.next, Some(Stage::ReportGenerated));
    }

    #[test]
    fn new_cycle_after_review() {
        let s = derive(&[todos(&["completed"]), review(), todos(&["pending"])]);
        assert_eq!(s.rule, "tasks_open");
        assert!(!s.review_in_current_cycle);
    }
}
