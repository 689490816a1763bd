use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

// ─── Raw transcript records ───────────────────────────────────────────────

/// One line of a session transcript, discriminated by the JSON `"type"` field.
///
/// Two families of producers write transcripts: the flat form
/// (`{"type":"tool_use","name":…,"input":…}`) and the Claude Code session
/// form, where tool calls are nested as content blocks inside `assistant`
/// messages and their results inside `user` messages. Both are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    ToolUse(FlatToolUse),
    ToolResult(FlatToolResult),
    Assistant(AssistantRecord),
    User(UserRecord),
    System(LifecycleRecord),
    Summary(LifecycleRecord),
    Result(LifecycleRecord),
    /// Any future/unknown record type, kept as an opaque event
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlatToolUse {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// Tool inputs are schema-polymorphic (varies per tool), so Value is correct here.
    #[serde(default)]
    pub input: Value,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlatToolResult {
    #[serde(default)]
    pub tool_use_id: Option<String>,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub is_error: Option<bool>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantRecord {
    pub message: MessageBody,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub message: MessageBody,
    /// Structured tool output Claude Code stores next to the textual result.
    #[serde(default, rename = "toolUseResult")]
    pub tool_use_result: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleRecord {
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub content: MessageContent,
}

/// User messages may carry a bare string instead of a block list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Blocks(Vec<ContentBlock>),
    Text(String),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Blocks(Vec::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    ToolUse {
        #[serde(default)]
        id: Option<String>,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        #[serde(default)]
        tool_use_id: Option<String>,
        #[serde(default)]
        content: Value,
        #[serde(default)]
        is_error: Option<bool>,
    },
    /// Text, thinking, images and anything newer carry no workflow evidence.
    #[serde(other)]
    Other,
}

// ─── Events ───────────────────────────────────────────────────────────────

/// Coarse classification of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ActionInvocation,
    ActionResult,
    Lifecycle,
    Other,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ActionInvocation => "action_invocation",
            EventKind::ActionResult => "action_result",
            EventKind::Lifecycle => "lifecycle",
            EventKind::Other => "other",
        }
    }
}

/// A single entry of the event log after flattening.
///
/// Its position in [`crate::Transcript::events`] is its sequence position.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ToolUse(ToolUse),
    ToolResult(ToolResult),
    Lifecycle(Lifecycle),
    Other { timestamp: Option<DateTime<Utc>> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolUse {
    pub id: Option<String>,
    pub name: String,
    pub input: Value,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ToolUse {
    /// String field of the tool input, `None` when absent or not a string.
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub tool_use_id: Option<String>,
    pub content: Value,
    pub is_error: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lifecycle {
    pub record_type: String,
    pub subtype: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ToolUse(_) => EventKind::ActionInvocation,
            Event::ToolResult(_) => EventKind::ActionResult,
            Event::Lifecycle(_) => EventKind::Lifecycle,
            Event::Other { .. } => EventKind::Other,
        }
    }

    pub fn as_tool_use(&self) -> Option<&ToolUse> {
        if let Event::ToolUse(t) = self {
            Some(t)
        } else {
            None
        }
    }

    pub fn is_tool_use(&self) -> bool {
        matches!(self, Event::ToolUse(_))
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Event::ToolUse(t) => t.timestamp,
            Event::ToolResult(r) => r.timestamp,
            Event::Lifecycle(l) => l.timestamp,
            Event::Other { timestamp } => *timestamp,
        }
    }
}

// ─── Record → Event flattening ────────────────────────────────────────────

impl Record {
    /// Flatten one transcript line into events, in content order.
    pub fn into_events(self) -> Vec<Event> {
        match self {
            Record::ToolUse(t) => vec![Event::ToolUse(ToolUse {
                id: t.id,
                name: t.name,
                input: t.input,
                timestamp: parse_timestamp(t.timestamp.as_deref()),
            })],
            Record::ToolResult(r) => vec![Event::ToolResult(ToolResult {
                tool_use_id: r.tool_use_id,
                content: r.content,
                is_error: r.is_error.unwrap_or(false),
                timestamp: parse_timestamp(r.timestamp.as_deref()),
            })],
            Record::Assistant(a) => {
                let timestamp = parse_timestamp(a.timestamp.as_deref());
                let events: Vec<Event> = blocks(a.message.content)
                    .into_iter()
                    .filter_map(|block| match block {
                        ContentBlock::ToolUse { id, name, input } => Some(Event::ToolUse(ToolUse {
                            id,
                            name,
                            input,
                            timestamp,
                        })),
                        _ => None,
                    })
                    .collect();
                non_empty(events, timestamp)
            }
            Record::User(u) => {
                let timestamp = parse_timestamp(u.timestamp.as_deref());
                let mut structured = u.tool_use_result;
                let events: Vec<Event> = blocks(u.message.content)
                    .into_iter()
                    .filter_map(|block| match block {
                        ContentBlock::ToolResult {
                            tool_use_id,
                            content,
                            is_error,
                        } => Some(Event::ToolResult(ToolResult {
                            tool_use_id,
                            content: structured.take().unwrap_or(content),
                            is_error: is_error.unwrap_or(false),
                            timestamp,
                        })),
                        _ => None,
                    })
                    .collect();
                non_empty(events, timestamp)
            }
            Record::System(l) => vec![lifecycle("system", l)],
            Record::Summary(l) => vec![lifecycle("summary", l)],
            Record::Result(l) => vec![lifecycle("result", l)],
            Record::Unknown => vec![Event::Other { timestamp: None }],
        }
    }
}

fn blocks(content: MessageContent) -> Vec<ContentBlock> {
    match content {
        MessageContent::Blocks(b) => b,
        MessageContent::Text(_) => Vec::new(),
    }
}

// A message line with no tool traffic still occupies one log position.
fn non_empty(events: Vec<Event>, timestamp: Option<DateTime<Utc>>) -> Vec<Event> {
    if events.is_empty() {
        vec![Event::Other { timestamp }]
    } else {
        events
    }
}

fn lifecycle(record_type: &str, l: LifecycleRecord) -> Event {
    Event::Lifecycle(Lifecycle {
        record_type: record_type.to_string(),
        subtype: l.subtype,
        timestamp: parse_timestamp(l.timestamp.as_deref()),
    })
}

pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}
