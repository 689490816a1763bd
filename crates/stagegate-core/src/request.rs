use crate::error::{Result, StagegateError};
use serde_json::Value;
use std::path::PathBuf;

/// The hook request a detector receives on stdin.
///
/// Decoded field by field: a field with the wrong JSON type is treated as
/// absent instead of failing the whole request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookRequest {
    pub tool_name: Option<String>,
    pub tool_input: Value,
    pub tool_response: Value,
    pub transcript_path: Option<PathBuf>,
    pub session_id: Option<String>,
    pub cwd: Option<PathBuf>,
    pub permission_mode: Option<String>,
    pub hook_event_name: Option<String>,
}

impl HookRequest {
    /// Parse a request body. Fails only when the body is not a JSON object.
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| StagegateError::InvalidRequest(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(StagegateError::InvalidRequest(
                "request is not a JSON object".to_string(),
            ));
        };

        let string = |v: Option<Value>| match v {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        };

        Ok(Self {
            tool_name: string(map.remove("tool_name")),
            tool_input: map.remove("tool_input").unwrap_or(Value::Null),
            tool_response: map.remove("tool_response").unwrap_or(Value::Null),
            transcript_path: string(map.remove("transcript_path")).map(PathBuf::from),
            session_id: string(map.remove("session_id")),
            cwd: string(map.remove("cwd")).map(PathBuf::from),
            permission_mode: string(map.remove("permission_mode")),
            hook_event_name: string(map.remove("hook_event_name")),
        })
    }

    pub fn tool_name(&self) -> &str {
        self.tool_name.as_deref().unwrap_or("")
    }

    /// String field of `tool_input`, `None` when absent or not a string.
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.tool_input.get(key).and_then(Value::as_str)
    }
}
