use crate::config::Config;
use crate::decision::{Annotation, Decision};
use crate::prompts;
use crate::request::HookRequest;
use crate::types::{TaskStatus, Transition};
use claude_transcript::Transcript;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Task / TaskSnapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, rename = "activeForm", skip_serializing_if = "Option::is_none")]
    pub active_form: Option<String>,
}

/// The full task list carried by one task-list update. Later snapshots
/// replace earlier ones.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TaskSnapshot {
    pub tasks: Vec<Task>,
}

impl TaskSnapshot {
    /// Decode the `todos` array of a task-list update input.
    ///
    /// An item that cannot be decoded is kept as a task of unknown status so
    /// it still blocks completion.
    pub fn from_input(input: &Value) -> Self {
        let tasks = input
            .get("todos")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| serde_json::from_value(item.clone()).unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    /// True iff the snapshot is non-empty and every task is completed.
    /// An empty list is never "all completed".
    pub fn all_completed(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|t| t.status == TaskStatus::Completed)
    }

    /// Human-readable summary: "2/3 completed, 1 in progress, 0 pending"
    pub fn summarize(&self) -> String {
        format!(
            "{}/{} completed, {} in progress, {} pending",
            self.count(TaskStatus::Completed),
            self.len(),
            self.count(TaskStatus::InProgress),
            self.count(TaskStatus::Pending),
        )
    }
}

// ---------------------------------------------------------------------------
// Snapshot lookup
// ---------------------------------------------------------------------------

/// Latest task-list snapshot in the transcript with its position.
pub fn latest_snapshot(transcript: &Transcript, task_list_tool: &str) -> Option<(usize, TaskSnapshot)> {
    transcript
        .last_tool_use(task_list_tool)
        .map(|(pos, tool)| (pos, TaskSnapshot::from_input(&tool.input)))
}

// ---------------------------------------------------------------------------
// Stage 1 → 2
// ---------------------------------------------------------------------------

/// Task-completion detector.
///
/// Judges the newest snapshot in the transcript. A transcript with no
/// task-list update (including one that could not be read) never fires, even
/// when the triggering request carries a completed list.
pub fn evaluate(request: &HookRequest, transcript: &Transcript, config: &Config) -> Decision {
    let task_list_tool = config.tools.task_list.as_str();
    let Some((_, snapshot)) = latest_snapshot(transcript, task_list_tool) else {
        tracing::debug!(
            tool = request.tool_name(),
            events = transcript.len(),
            "no task list in transcript"
        );
        return Decision::Empty;
    };

    if !snapshot.all_completed() {
        tracing::debug!(summary = %snapshot.summarize(), "task list not complete");
        return Decision::Empty;
    }

    let completed = snapshot.len();
    tracing::info!(completed, "all tasks completed; requesting diagnostics");
    Decision::block(
        prompts::RUN_DIAGNOSTICS,
        Annotation::new(&config.hook_event_name, Transition::TasksToDiagnostics)
            .with_additional_context(prompts::completion_context(completed))
            .with_completed_tasks(completed),
    )
}
