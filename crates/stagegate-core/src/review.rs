use crate::config::Config;
use crate::cycle::is_reviewer_call;
use crate::decision::{Annotation, Decision};
use crate::prompts;
use crate::request::HookRequest;
use crate::types::Transition;
use claude_transcript::Transcript;

/// Review-invoked detector.
///
/// A reviewer called with no task list anywhere in the review window was
/// invoked by hand, outside the workflow, and does not advance it.
pub fn evaluate(request: &HookRequest, transcript: &Transcript, config: &Config) -> Decision {
    let subagent_type = request.input_str("subagent_type");
    if !is_reviewer_call(request.tool_name(), subagent_type, config) {
        tracing::debug!(
            tool = request.tool_name(),
            subagent_type = ?subagent_type,
            "not a reviewer invocation"
        );
        return Decision::Empty;
    }

    if transcript.last_tool_use(&config.tools.task_list).is_none() {
        tracing::debug!("reviewer invoked without a task list in window; ignoring");
        return Decision::Empty;
    }

    tracing::info!(role = %config.reviewer_role, "review invoked; requesting final report");
    Decision::block(
        prompts::FINAL_REPORT,
        Annotation::new(&config.hook_event_name, Transition::ReviewToReport)
            .with_subagent_type(&config.reviewer_role),
    )
}
