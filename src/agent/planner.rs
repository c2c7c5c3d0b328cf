//! Two-phase planning conversation.
//!
//! Drafting sends the goal with every tool schema. If the model asks for
//! tools, each call is dispatched in order and answered in the conversation,
//! then a single finalizing request (with no tools on offer) produces the
//! plan. At most two provider calls are made per goal.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;
use crate::llm::{
    AssistantReply, ChatMessage, ChatRequest, Conversation, GroqClient, LlmClient, LlmError,
    ToolCall,
};
use crate::tools::ToolRegistry;

use super::prompt::{build_user_prompt, SYSTEM_PROMPT};

/// Sampling temperature for both provider calls.
pub const PLAN_TEMPERATURE: f32 = 0.7;

/// Outcome flag of a planning attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Success,
    Error,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Result of [`Planner::create_plan`]. On error `plan` holds the message.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlanOutcome {
    pub goal: String,
    pub plan: String,
    pub status: PlanStatus,
}

/// Per-call settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Log tool dispatch at info level instead of debug.
    pub debug: bool,
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Provider returned a '{0}' tool call without an id")]
    MissingToolCallId(String),

    #[error("Provider reused tool call id '{0}'")]
    DuplicateToolCallId(String),

    #[error("Invalid arguments for tool '{tool}': {source}")]
    InvalidToolArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Provider requested another round of tool calls without producing a plan")]
    UnexpectedToolCalls,
}

/// Drives the planning conversation for one goal at a time.
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    model: String,
}

impl Planner {
    /// Build the production planner: Groq client plus the standard tools,
    /// sharing one HTTP client with the configured timeout.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("plan-agent/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        let llm = Arc::new(GroqClient::new(
            http.clone(),
            config.api_key.clone(),
            config.provider_base_url.clone(),
        ));
        let tools = ToolRegistry::new(http, &config.tools);

        Ok(Self::with_parts(llm, tools, config.model.clone()))
    }

    pub fn with_parts(llm: Arc<dyn LlmClient>, tools: ToolRegistry, model: String) -> Self {
        Self { llm, tools, model }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Turn a goal into a plan. Never fails: errors become an outcome with
    /// `status: error` and a readable message in `plan`.
    pub async fn create_plan(&self, goal: &str, options: PlanOptions) -> PlanOutcome {
        match self.run(goal, options).await {
            Ok(plan) => {
                tracing::info!(chars = plan.len(), "Plan created");
                PlanOutcome {
                    goal: goal.to_string(),
                    plan,
                    status: PlanStatus::Success,
                }
            }
            Err(e) => {
                tracing::error!("Planning failed: {}", e);
                PlanOutcome {
                    goal: goal.to_string(),
                    plan: format!("Error creating plan: {}", e),
                    status: PlanStatus::Error,
                }
            }
        }
    }

    async fn run(&self, goal: &str, options: PlanOptions) -> Result<String, PlanError> {
        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::system(SYSTEM_PROMPT));
        conversation.push(ChatMessage::user(build_user_prompt(goal)));

        let schemas = self.tools.get_tool_schemas();
        let draft = self
            .llm
            .chat_completion(&ChatRequest::with_tools(
                &self.model,
                conversation.messages(),
                &schemas,
                PLAN_TEMPERATURE,
            ))
            .await?;
        conversation.push(ChatMessage::assistant(&draft));

        let calls = match draft {
            AssistantReply::Content(plan) => return Ok(plan),
            AssistantReply::ToolCalls { calls, .. } => calls,
        };

        self.dispatch_tool_calls(&calls, &mut conversation, options)
            .await?;

        let reply = self
            .llm
            .chat_completion(&ChatRequest::without_tools(
                &self.model,
                conversation.messages(),
                PLAN_TEMPERATURE,
            ))
            .await?;
        if let AssistantReply::ToolCalls { content, calls } = &reply {
            if content.as_deref().map_or(true, str::is_empty) {
                return Err(PlanError::UnexpectedToolCalls);
            }
            tracing::warn!(
                ignored = calls.len(),
                "Finalizing reply requested more tools; using its text"
            );
        }
        conversation.push(ChatMessage::assistant(&reply));

        conversation
            .last_assistant_content()
            .map(str::to_string)
            .ok_or(PlanError::UnexpectedToolCalls)
    }

    /// Answer every call, in emitted order, with exactly one tool message.
    async fn dispatch_tool_calls(
        &self,
        calls: &[ToolCall],
        conversation: &mut Conversation,
        options: PlanOptions,
    ) -> Result<(), PlanError> {
        validate_call_ids(calls)?;
        diag(
            options.debug,
            format_args!("Processing {} tool calls", calls.len()),
        );

        for call in calls {
            let name = call.function.name.as_str();
            let args = parse_arguments(call)?;
            diag(
                options.debug,
                format_args!("Calling {} with args: {}", name, args),
            );

            let output = self.tools.execute(name, args).await;
            if output.is_failure() {
                tracing::warn!(tool = name, "Tool reported failure: {}", output.text());
            } else {
                diag(
                    options.debug,
                    format_args!("{} result: {}", name, truncate_for_log(output.text(), 100)),
                );
            }

            conversation.push(ChatMessage::tool_result(&call.id, name, output.into_text()));
        }

        Ok(())
    }
}

/// Ids must be present and unique so results can be correlated.
fn validate_call_ids(calls: &[ToolCall]) -> Result<(), PlanError> {
    let mut seen = HashSet::new();
    for call in calls {
        if call.id.trim().is_empty() {
            return Err(PlanError::MissingToolCallId(call.function.name.clone()));
        }
        if !seen.insert(call.id.as_str()) {
            return Err(PlanError::DuplicateToolCallId(call.id.clone()));
        }
    }
    Ok(())
}

fn parse_arguments(call: &ToolCall) -> Result<Value, PlanError> {
    let raw = call.function.arguments.trim();
    if raw.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw).map_err(|source| PlanError::InvalidToolArguments {
        tool: call.function.name.clone(),
        source,
    })
}

fn diag(debug: bool, message: std::fmt::Arguments<'_>) {
    if debug {
        tracing::info!("{}", message);
    } else {
        tracing::debug!("{}", message);
    }
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}...", &s[..idx]),
    }
}
