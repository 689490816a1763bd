use crate::error::{Result, StagegateError};
use crate::paths;
use crate::patterns::{default_pattern_defs, PatternDef, PatternSet};
use crate::types::DiagnosticsSource;
use claude_transcript::{ReadOptions, DEFAULT_MAX_BYTES};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl ConfigWarning {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ToolsConfig
// ---------------------------------------------------------------------------

/// Action names the detectors recognise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_task_list")]
    pub task_list: String,
    #[serde(default = "default_delegate")]
    pub delegate: String,
    #[serde(default = "default_structured_diagnostics")]
    pub structured_diagnostics: Vec<String>,
    #[serde(default = "default_command_diagnostics")]
    pub command_diagnostics: Vec<String>,
}

fn default_task_list() -> String {
    "TodoWrite".to_string()
}

fn default_delegate() -> String {
    "Task".to_string()
}

fn default_structured_diagnostics() -> Vec<String> {
    vec!["mcp__vscode-mcp__get_diagnostics".to_string()]
}

fn default_command_diagnostics() -> Vec<String> {
    vec!["Bash".to_string()]
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            task_list: default_task_list(),
            delegate: default_delegate(),
            structured_diagnostics: default_structured_diagnostics(),
            command_diagnostics: default_command_diagnostics(),
        }
    }
}

impl ToolsConfig {
    /// Which kind of diagnostics `tool_name` produces, if it is one.
    /// Structured sources are checked first.
    pub fn diagnostics_source(&self, tool_name: &str) -> Option<DiagnosticsSource> {
        if self.structured_diagnostics.iter().any(|t| t == tool_name) {
            Some(DiagnosticsSource::Structured)
        } else if self.command_diagnostics.iter().any(|t| t == tool_name) {
            Some(DiagnosticsSource::Command)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// TranscriptConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// `None` scans the whole (byte-capped) transcript.
    #[serde(default)]
    pub task_list_lookback: Option<usize>,
    /// Counted over action invocations only.
    #[serde(default = "default_diagnostics_lookback")]
    pub diagnostics_lookback: usize,
    /// Counted over all events.
    #[serde(default = "default_review_lookback")]
    pub review_lookback: usize,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_diagnostics_lookback() -> usize {
    100
}

fn default_review_lookback() -> usize {
    200
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

fn default_read_timeout_ms() -> u64 {
    2000
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            task_list_lookback: None,
            diagnostics_lookback: default_diagnostics_lookback(),
            review_lookback: default_review_lookback(),
            max_bytes: default_max_bytes(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl TranscriptConfig {
    fn base_options(&self) -> ReadOptions {
        ReadOptions::default()
            .with_max_bytes(Some(self.max_bytes))
            .with_timeout(Some(Duration::from_millis(self.read_timeout_ms)))
    }

    /// Options for locating the latest task-list snapshot.
    pub fn task_list_options(&self) -> ReadOptions {
        self.base_options().with_lookback(self.task_list_lookback)
    }

    /// Options for the diagnostics cycle guard.
    pub fn diagnostics_options(&self) -> ReadOptions {
        self.base_options()
            .tool_uses_only()
            .with_lookback(Some(self.diagnostics_lookback))
    }

    /// Options for the review-invoked task-list check.
    pub fn review_options(&self) -> ReadOptions {
        self.base_options().with_lookback(Some(self.review_lookback))
    }
}

// ---------------------------------------------------------------------------
// DiagnosticsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Appended to the built-in failure-marker table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_failure_patterns: Vec<PatternDef>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_hook_event_name")]
    pub hook_event_name: String,
    #[serde(default = "default_reviewer_role")]
    pub reviewer_role: String,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub transcript: TranscriptConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

fn default_hook_event_name() -> String {
    "PostToolUse".to_string()
}

fn default_reviewer_role() -> String {
    "code-reviewer".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hook_event_name: default_hook_event_name(),
            reviewer_role: default_reviewer_role(),
            tools: ToolsConfig::default(),
            transcript: TranscriptConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl Config {
    /// Load a config file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(StagegateError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }

    /// Load a config file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(StagegateError::ConfigNotFound(_)) => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// `<root>/.stagegate/config.yaml`, or defaults when absent.
    pub fn load_from_root(root: &Path) -> Result<Self> {
        Self::load_or_default(&paths::config_path(root))
    }

    /// An empty document yields the defaults.
    pub fn parse(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the config to `path` unless a file is already there.
    /// Returns true if written.
    pub fn init_at(&self, path: &Path) -> Result<bool> {
        let data = self.to_yaml()?;
        crate::io::write_if_missing(path, data.as_bytes())
    }

    /// The effective failure-marker table: built-ins followed by extras.
    pub fn pattern_set(&self) -> Result<PatternSet> {
        PatternSet::with_extra(&self.diagnostics.extra_failure_patterns)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        // 1. Empty action names never match anything
        let named = [
            ("hook_event_name", &self.hook_event_name),
            ("reviewer_role", &self.reviewer_role),
            ("tools.task_list", &self.tools.task_list),
            ("tools.delegate", &self.tools.delegate),
        ];
        for (key, value) in named {
            if value.trim().is_empty() {
                warnings.push(ConfigWarning::warning(format!("{key} is empty")));
            }
        }
        for (key, list) in [
            ("tools.structured_diagnostics", &self.tools.structured_diagnostics),
            ("tools.command_diagnostics", &self.tools.command_diagnostics),
        ] {
            if list.iter().any(|t| t.trim().is_empty()) {
                warnings.push(ConfigWarning::warning(format!("{key} contains an empty name")));
            }
        }

        // 2. A tool listed as both kinds is always treated as structured
        for name in &self.tools.command_diagnostics {
            if self.tools.structured_diagnostics.contains(name) {
                warnings.push(ConfigWarning::warning(format!(
                    "'{name}' is listed as both structured and command diagnostics; \
                     it will be treated as structured"
                )));
            }
        }

        // 3. Zero-sized windows disable a detector
        if self.transcript.task_list_lookback == Some(0) {
            warnings.push(ConfigWarning::warning(
                "transcript.task_list_lookback is 0; only the request's own task list is seen",
            ));
        }
        if self.transcript.diagnostics_lookback == 0 {
            warnings.push(ConfigWarning::warning(
                "transcript.diagnostics_lookback is 0; the diagnostics detector can never fire",
            ));
        }
        if self.transcript.review_lookback == 0 {
            warnings.push(ConfigWarning::warning(
                "transcript.review_lookback is 0; the review detector can never fire",
            ));
        }
        if self.transcript.max_bytes == 0 {
            warnings.push(ConfigWarning::warning(
                "transcript.max_bytes is 0; transcripts will always read as empty",
            ));
        }
        if self.transcript.read_timeout_ms == 0 {
            warnings.push(ConfigWarning::warning(
                "transcript.read_timeout_ms is 0; transcript reads will time out",
            ));
        }

        // 4. Extra patterns must compile and have unique ids
        let mut seen: HashSet<String> = default_pattern_defs().into_iter().map(|d| d.id).collect();
        for def in &self.diagnostics.extra_failure_patterns {
            if def.id.trim().is_empty() {
                warnings.push(ConfigWarning::warning(format!(
                    "extra failure pattern '{}' has an empty id",
                    def.pattern
                )));
            } else if !seen.insert(def.id.clone()) {
                warnings.push(ConfigWarning::warning(format!(
                    "duplicate failure pattern id '{}'",
                    def.id
                )));
            }
            if let Err(e) = Regex::new(&def.pattern) {
                warnings.push(ConfigWarning::error(format!(
                    "failure pattern '{}' does not compile: {e}",
                    def.id
                )));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
