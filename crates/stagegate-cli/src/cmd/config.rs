use crate::cmd::Context;
use crate::output::print_json;
use anyhow::Context as _;
use clap::Subcommand;
use stagegate_core::config::{Config, WarnLevel};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective config (defaults merged with the file, if any)
    Show,

    /// Validate the config for common mistakes
    Validate,

    /// Write the default config; never overwrites an existing file
    Init,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(ctx: &Context, subcmd: ConfigSubcommand) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(ctx),
        ConfigSubcommand::Validate => validate(ctx),
        ConfigSubcommand::Init => init(ctx),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(ctx: &Context) -> anyhow::Result<()> {
    let root = ctx.root_from(None);
    let path = ctx.config_path(&root);
    let config = ctx.load_config(&root)?;

    if ctx.json {
        let value = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        return print_json(&value);
    }

    let source = if path.exists() { "" } else { " (not found; defaults)" };
    println!("# {}{source}", path.display());
    print!("{}", config.to_yaml().context("failed to serialize config")?);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(ctx: &Context) -> anyhow::Result<()> {
    let root = ctx.root_from(None);
    let config = ctx.load_config(&root)?;
    let warnings = config.validate();

    if ctx.json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(ctx: &Context) -> anyhow::Result<()> {
    let root = ctx.root_from(None);
    let path = ctx.config_path(&root);
    let written = Config::default()
        .init_at(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    if ctx.json {
        let value = serde_json::json!({
            "path": path.display().to_string(),
            "written": written,
        });
        print_json(&value)?;
    } else if written {
        println!("Wrote {}", path.display());
    } else {
        println!("{} already exists; left unchanged", path.display());
    }
    Ok(())
}
