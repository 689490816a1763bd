use crate::config::Config;
use crate::todos::TaskSnapshot;
use claude_transcript::Transcript;
use serde::Serialize;

/// True when an action named `tool_name` delegates a subtask to the
/// reviewer role. Applies to transcript entries and hook requests alike.
pub fn is_reviewer_call(tool_name: &str, subagent_type: Option<&str>, config: &Config) -> bool {
    tool_name == config.tools.delegate && subagent_type == Some(config.reviewer_role.as_str())
}

/// Positions that bound the current workflow cycle within a scanned window.
///
/// There is no stored cycle id: a cycle is the stretch of log after the last
/// reviewer invocation. `None` sorts before every position, so an absent
/// event behaves like position −1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CyclePositions {
    /// Latest task-list update of any kind.
    pub last_task_list: Option<usize>,
    /// Whether the snapshot at `last_task_list` is all-completed.
    pub last_task_list_completed: bool,
    /// Latest reviewer invocation.
    pub last_review: Option<usize>,
}

impl CyclePositions {
    pub fn scan(transcript: &Transcript, config: &Config) -> Self {
        let mut positions = Self::default();
        for (pos, tool) in transcript.tool_uses() {
            if tool.name == config.tools.task_list {
                positions.last_task_list = Some(pos);
                positions.last_task_list_completed =
                    TaskSnapshot::from_input(&tool.input).all_completed();
            }
            if is_reviewer_call(&tool.name, tool.input_str("subagent_type"), config) {
                positions.last_review = Some(pos);
            }
        }
        positions
    }

    /// The task-list update that started this cycle: the latest one, and only
    /// if every task in it is completed. A later, unfinished list means a new
    /// round of work is underway.
    pub fn completed_task_list(&self) -> Option<usize> {
        self.last_task_list.filter(|_| self.last_task_list_completed)
    }

    /// Whether a clean diagnostics run may advance to review.
    pub fn fresh_for_review_prompt(&self) -> bool {
        match self.completed_task_list() {
            Some(pos) => self.last_review.map_or(true, |review| pos > review),
            None => false,
        }
    }

    pub fn has_task_list(&self) -> bool {
        self.last_task_list.is_some()
    }

    /// A reviewer ran after the latest task-list update.
    pub fn review_in_current_cycle(&self) -> bool {
        match (self.last_task_list, self.last_review) {
            (Some(list), Some(review)) => review > list,
            (None, Some(_)) => true,
            _ => false,
        }
    }
}
