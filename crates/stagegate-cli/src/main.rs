mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, hook::HookTarget};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stagegate",
    about = "Workflow stage hooks: tasks complete, diagnostics clean, review invoked, report",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .stagegate/ or .git/)
    #[arg(long, global = true, env = "STAGEGATE_ROOT")]
    root: Option<PathBuf>,

    /// Config file (default: <root>/.stagegate/config.yaml)
    #[arg(long, global = true, env = "STAGEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a hook request read from stdin and print the decision
    Hook {
        /// Detector to run; `auto` picks one from the request's tool_name
        #[arg(value_enum)]
        detector: HookTarget,
    },

    /// Re-derive the workflow state from a transcript
    Status {
        /// Path to the session transcript (JSONL)
        #[arg(long)]
        transcript: PathBuf,
    },

    /// Show, validate or initialize the config
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// List the failure-marker patterns, or check a text against them
    Patterns {
        /// File to check (`-` for stdin)
        #[arg(long, value_name = "FILE")]
        check: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let ctx = cmd::Context {
        root: cli.root,
        config: cli.config,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Hook { detector } => cmd::hook::run(&ctx, detector),
        Commands::Status { transcript } => cmd::status::run(&ctx, &transcript),
        Commands::Config { subcommand } => cmd::config::run(&ctx, subcommand),
        Commands::Patterns { check } => cmd::patterns::run(&ctx, check.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
