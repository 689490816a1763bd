use crate::cmd::Context;
use clap::ValueEnum;
use stagegate_core::{run_request, Decision, Detector, HookRequest};
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HookTarget {
    /// Stage 1 → 2: the task list is fully completed
    Todos,
    /// Stage 2 → 3: diagnostics came back clean
    Diagnostics,
    /// Stage 3 → 4: the reviewer was invoked
    Review,
    /// Dispatch on the request's tool_name
    Auto,
}

impl HookTarget {
    fn detector(self) -> Option<Detector> {
        match self {
            HookTarget::Todos => Some(Detector::TaskCompletion),
            HookTarget::Diagnostics => Some(Detector::DiagnosticsClean),
            HookTarget::Review => Some(Detector::ReviewInvoked),
            HookTarget::Auto => None,
        }
    }
}

/// Read one request from stdin and print exactly one decision.
///
/// Never fails on bad input: every error is logged and becomes `{}`.
pub fn run(ctx: &Context, target: HookTarget) -> anyhow::Result<()> {
    let mut body = String::new();
    let decision = match std::io::stdin().read_to_string(&mut body) {
        Ok(_) => decide(ctx, target.detector(), &body),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read hook request from stdin");
            Decision::Empty
        }
    };
    println!("{}", decision.to_json());
    Ok(())
}

fn decide(ctx: &Context, detector: Option<Detector>, body: &str) -> Decision {
    let request = match HookRequest::parse(body) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "malformed hook request");
            return Decision::Empty;
        }
    };

    let root = ctx.root_from(request.cwd.as_deref());
    let config = match ctx.load_config(&root) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "config unavailable");
            return Decision::Empty;
        }
    };

    run_request(detector, &request, &config)
}
