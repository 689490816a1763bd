use crate::cmd::Context;
use crate::output::{print_json, print_table, Row};
use anyhow::Context as _;
use stagegate_core::patterns::{PatternDef, TABLE_VERSION};
use std::io::Read;
use std::path::Path;

pub fn run(ctx: &Context, check: Option<&Path>) -> anyhow::Result<()> {
    let root = ctx.root_from(None);
    let config = ctx.load_config(&root)?;
    let set = config
        .pattern_set()
        .context("failed to compile failure patterns")?;

    let Some(source) = check else {
        let defs: Vec<&PatternDef> = set.patterns().iter().map(|p| &p.def).collect();
        if ctx.json {
            let value = serde_json::json!({
                "version": TABLE_VERSION,
                "patterns": defs,
            });
            return print_json(&value);
        }
        let title = format!("failure-marker table v{TABLE_VERSION}");
        print_table(Some(title.as_str()), HEADERS, &rows(&defs, &[]));
        return Ok(());
    };

    let text = read_source(source)?;
    let hits: Vec<&PatternDef> = set.matches(&text).collect();

    if ctx.json {
        let value = serde_json::json!({
            "clean": hits.is_empty(),
            "matches": hits,
        });
        return print_json(&value);
    }

    if hits.is_empty() {
        println!("No failure markers found.");
        return Ok(());
    }
    let defs: Vec<&PatternDef> = set.patterns().iter().map(|p| &p.def).collect();
    let title = format!("{} failure marker(s) found:", hits.len());
    print_table(Some(title.as_str()), HEADERS, &rows(&defs, &hits));
    Ok(())
}

const HEADERS: &[&str] = &["ID", "PATTERN", "MEANING"];

/// One row per pattern; those in `hits` are marked.
fn rows(defs: &[&PatternDef], hits: &[&PatternDef]) -> Vec<Row> {
    defs.iter()
        .map(|d| {
            Row::new(vec![d.id.clone(), d.pattern.clone(), d.meaning.clone()])
                .marked(hits.iter().any(|h| h.id == d.id))
        })
        .collect()
}

fn read_source(source: &Path) -> anyhow::Result<String> {
    if source == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source).with_context(|| format!("failed to read {}", source.display()))
}
