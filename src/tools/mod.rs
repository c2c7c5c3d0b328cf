//! Lookup tools the model may call while drafting a plan.
//!
//! Each tool declares its name, description and JSON parameter schema for the
//! provider, and executes against an external HTTP API. Tools never fail the
//! conversation: every outcome, including errors, comes back as text.

mod weather;
mod web;

pub use weather::GetWeather;
pub use web::WebSearch;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ToolsConfig;
use crate::llm::ToolDefinition;

/// Text returned to the unknown-tool case.
pub const FUNCTION_NOT_AVAILABLE: &str = "Function not available";

/// Result of running a tool. Both variants carry the text the model sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Success(String),
    Failure(String),
}

impl ToolOutput {
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Failure(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Success(text) | Self::Failure(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Shown to the model to decide when to call the tool.
    fn description(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> ToolOutput;
}

/// Ordered set of tools offered to the model.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// The standard registry: `web_search` then `get_weather`.
    pub fn new(http: reqwest::Client, config: &ToolsConfig) -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(WebSearch::new(http.clone(), config.search_base_url.clone())),
            Arc::new(GetWeather::new(
                http,
                config.weather_base_url.clone(),
                config.weather_api_key.clone(),
            )),
        ];
        Self::from_tools(tools)
    }

    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Provider-facing schemas for every registered tool.
    pub fn get_tool_schemas(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition::function(t.name(), t.description(), t.parameters_schema()))
            .collect()
    }

    /// Run the tool called `name`; unknown names get a fixed placeholder.
    pub async fn execute(&self, name: &str, args: Value) -> ToolOutput {
        match self.tools.iter().find(|t| t.name() == name) {
            Some(tool) => tool.execute(args).await,
            None => {
                tracing::warn!("Model requested unknown tool: {}", name);
                ToolOutput::Failure(FUNCTION_NOT_AVAILABLE.to_string())
            }
        }
    }
}
