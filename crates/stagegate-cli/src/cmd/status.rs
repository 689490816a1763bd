use crate::cmd::Context;
use crate::output::{print_json, print_table, Row};
use anyhow::Context as _;
use claude_transcript::Transcript;
use stagegate_core::status::WorkflowStatus;
use std::path::Path;

pub fn run(ctx: &Context, transcript_path: &Path) -> anyhow::Result<()> {
    let root = ctx.root_from(None);
    let config = ctx.load_config(&root)?;

    // Inspection reads the whole capped log with no deadline.
    let opts = config.transcript.task_list_options().with_timeout(None);
    let transcript = Transcript::open(transcript_path, &opts)
        .with_context(|| format!("failed to read {}", transcript_path.display()))?;
    let status = WorkflowStatus::derive(&transcript, &config);

    if ctx.json {
        return print_json(&status);
    }

    let pos = |p: Option<usize>| p.map_or_else(|| "-".to_string(), |p| p.to_string());
    let stage = |s: Option<stagegate_core::types::Stage>| {
        s.map_or_else(|| "-".to_string(), |s| s.to_string())
    };

    let row = |field: &str, value: String| Row::new(vec![field.to_string(), value]);
    print_table(
        Some(status.message.as_str()),
        &["FIELD", "VALUE"],
        &[
            row("tasks", status.summary.clone()),
            row("last task list", pos(status.positions.last_task_list)),
            row(
                "last list complete",
                status.positions.last_task_list_completed.to_string(),
            ),
            row("last review", pos(status.positions.last_review)),
            row(
                "reviewed this cycle",
                status.review_in_current_cycle.to_string(),
            ),
            row("stage reached", stage(status.reached)),
            row("next stage", stage(status.next)).marked(status.next.is_some()),
            row(
                "events",
                format!(
                    "{} ({} skipped line(s){})",
                    status.events,
                    status.skipped_lines,
                    if status.truncated { ", truncated" } else { "" }
                ),
            ),
        ],
    );
    Ok(())
}
