//! Agent binding: the conversation types, the [`Agent`] interface the
//! front-ends talk to, and the system prompt.

pub mod chat;
pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub use chat::ChatAgent;

/// Shown when a turn ends without any assistant text.
pub const NO_RESPONSE: &str = "No response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool invocation requested by the model. `arguments` is JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

/// One chat message, laid out the way chat-completion APIs exchange it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable_tool_calls",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Some providers send `"tool_calls": null` on a final answer.
fn nullable_tool_calls<'de, D>(deserializer: D) -> Result<Vec<ToolCall>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ToolCall>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Message {
    fn with_content(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_content(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_content(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_content(Role::Assistant, content)
    }

    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::with_content(Role::Tool, content)
        }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("LLM API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("LLM returned no choices")]
    EmptyResponse,
    #[error("Agent stopped after {0} steps without a final answer")]
    StepLimit(usize),
    #[error("Missing API key: set {0}")]
    MissingApiKey(String),
}

/// A tool-using conversational agent.
///
/// `invoke` receives the conversation so far and returns it extended with
/// every message produced during the turn.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn invoke(&self, messages: Vec<Message>) -> Result<Vec<Message>, AgentError>;
}

/// Text of the last assistant message that carries any.
pub fn last_reply(messages: &[Message]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .filter(|m| m.role == Role::Assistant)
        .filter_map(|m| m.content.as_deref())
        .find(|c| !c.trim().is_empty())
}

/// Send one user message and return the reply to display.
pub async fn ask(agent: &dyn Agent, request: &str) -> Result<String, AgentError> {
    let messages = agent.invoke(vec![Message::user(request)]).await?;
    Ok(last_reply(&messages).unwrap_or(NO_RESPONSE).to_string())
}
