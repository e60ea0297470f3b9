//! Tool-calling loop over an OpenAI-compatible chat-completions endpoint
//! (Groq by default).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::prompt::{AGENT_NAME, SYSTEM_PROMPT};
use super::{Agent, AgentError, Message};
use crate::config::{Config, API_KEY_VAR};
use crate::tools::{tool_specs, Tools};

const LLM_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest slice of an error body kept in [`AgentError::Api`].
const ERROR_SNIPPET: usize = 400;

#[derive(Debug, Clone, Serialize)]
struct ToolDefinition {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
struct FunctionDefinition {
    name: &'static str,
    description: &'static str,
    parameters: Value,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: Vec<&'a Message>,
    tools: &'a [ToolDefinition],
    tool_choice: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

pub struct ChatAgent {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_steps: usize,
    system: Message,
    definitions: Vec<ToolDefinition>,
    tools: Arc<Tools>,
}

impl ChatAgent {
    pub fn new(config: &Config, tools: Arc<Tools>) -> Result<Self, AgentError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AgentError::MissingApiKey(API_KEY_VAR.to_string()))?;
        let client = reqwest::Client::builder().timeout(LLM_TIMEOUT).build()?;
        let definitions = tool_specs()
            .into_iter()
            .map(|s| ToolDefinition {
                kind: "function",
                function: FunctionDefinition {
                    name: s.name,
                    description: s.description,
                    parameters: s.parameters,
                },
            })
            .collect();

        Ok(Self {
            client,
            base_url: config.llm_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_steps: config.max_steps.max(1),
            system: Message::system(SYSTEM_PROMPT),
            definitions,
            tools,
        })
    }

    async fn complete(&self, conversation: &[Message]) -> Result<Message, AgentError> {
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: std::iter::once(&self.system).chain(conversation).collect(),
            tools: &self.definitions,
            tool_choice: "auto",
        };
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            let body = match text.char_indices().nth(ERROR_SNIPPET) {
                Some((idx, _)) => format!("{}…", &text[..idx]),
                None => text,
            };
            return Err(AgentError::Api { status, body });
        }

        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(AgentError::EmptyResponse)
    }
}

#[async_trait]
impl Agent for ChatAgent {
    async fn invoke(&self, messages: Vec<Message>) -> Result<Vec<Message>, AgentError> {
        let mut conversation = messages;
        tracing::info!("{} handling turn with model {}", AGENT_NAME, self.model);

        for step in 0..self.max_steps {
            let reply = self.complete(&conversation).await?;
            let calls = reply.tool_calls.clone();
            conversation.push(reply);

            if calls.is_empty() {
                tracing::debug!("Final answer after {} step(s)", step + 1);
                return Ok(conversation);
            }

            // Tool calls run one after another, in the order the model listed them.
            for call in calls {
                tracing::info!("Model called {} with {}", call.function.name, call.function.arguments);
                let output = self.tools.call(&call.function.name, &call.function.arguments).await;
                conversation.push(Message::tool(call.id, output));
            }
        }

        tracing::warn!("{} hit the step limit of {}", AGENT_NAME, self.max_steps);
        Err(AgentError::StepLimit(self.max_steps))
    }
}
