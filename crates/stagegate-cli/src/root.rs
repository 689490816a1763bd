use stagegate_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `STAGEGATE_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `start` (the hook request's `cwd`, else the process
///    cwd) looking for `.stagegate/`, then `.git/`
/// 3. Fall back to `start`
pub fn resolve_root(explicit: Option<&Path>, start: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let start = match start {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    paths::find_project_root(&start).unwrap_or(start)
}

/// Where the config lives: an explicit `--config` path, or the root's
/// `.stagegate/config.yaml`.
pub fn resolve_config_path(explicit: Option<&Path>, root: &Path) -> PathBuf {
    match explicit {
        Some(p) => p.to_path_buf(),
        None => paths::config_path(root),
    }
}
