pub mod config;
pub mod hook;
pub mod patterns;
pub mod status;

use crate::root;
use anyhow::Context as _;
use stagegate_core::Config;
use std::path::{Path, PathBuf};

/// Global flags shared by every subcommand.
pub struct Context {
    pub root: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

impl Context {
    /// Root discovered from `start` (or the process cwd).
    pub fn root_from(&self, start: Option<&Path>) -> PathBuf {
        root::resolve_root(self.root.as_deref(), start)
    }

    pub fn config_path(&self, root: &Path) -> PathBuf {
        root::resolve_config_path(self.config.as_deref(), root)
    }

    /// An explicit `--config` must exist; the discovered one may be absent.
    pub fn load_config(&self, root: &Path) -> anyhow::Result<Config> {
        let path = self.config_path(root);
        let config = if self.config.is_some() {
            Config::load(&path)
        } else {
            Config::load_or_default(&path)
        };
        config.with_context(|| format!("failed to load config from {}", path.display()))
    }
}
