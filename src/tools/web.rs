//! Web search via the DuckDuckGo instant answer API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Tool, ToolOutput};

const DEFAULT_NUM_RESULTS: usize = 5;

/// Search the web (DuckDuckGo instant answers, no API key needed).
pub struct WebSearch {
    http: reqwest::Client,
    base_url: String,
}

/// The subset of the instant answer payload we read.
#[derive(Debug, Default, Deserialize)]
pub struct InstantAnswer {
    /// Sometimes `null` rather than empty.
    #[serde(rename = "Abstract", default)]
    pub abstract_text: Option<String>,
    #[serde(rename = "RelatedTopics", default)]
    pub related_topics: Vec<RelatedTopic>,
    #[serde(rename = "Answer", default)]
    pub answer: Value,
}

/// Topic groups have no `Text` and are skipped.
#[derive(Debug, Default, Deserialize)]
pub struct RelatedTopic {
    #[serde(rename = "Text", default)]
    pub text: Option<String>,
}

impl WebSearch {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    async fn lookup(&self, query: &str) -> Result<InstantAnswer, reqwest::Error> {
        self.http
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?
            .json::<InstantAnswer>()
            .await
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information about places, activities, restaurants, or any topic"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return",
                    "default": 5
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> ToolOutput {
        let Some(query) = args["query"].as_str() else {
            return ToolOutput::Failure("Search error: missing 'query' argument".to_string());
        };
        let num_results = args["num_results"]
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_NUM_RESULTS);

        match self.lookup(query).await {
            Ok(answer) => summarize(&answer, query, num_results),
            Err(e) => {
                tracing::warn!("Web search for '{}' failed: {}", query, e);
                ToolOutput::Failure(format!("Search error: {}", e))
            }
        }
    }
}

/// Abstract, then up to `num_results` related topics, then the direct answer.
pub fn summarize(answer: &InstantAnswer, query: &str, num_results: usize) -> ToolOutput {
    let mut results = Vec::new();

    if let Some(summary) = answer.abstract_text.as_deref().filter(|s| !s.is_empty()) {
        results.push(format!("Summary: {}", summary));
    }

    results.extend(
        answer
            .related_topics
            .iter()
            .take(num_results)
            .filter_map(|topic| topic.text.clone()),
    );

    if let Some(direct) = answer_text(&answer.answer) {
        results.push(format!("Answer: {}", direct));
    }

    if results.is_empty() {
        ToolOutput::Success(format!("No specific information found for: {}", query))
    } else {
        ToolOutput::Success(results.join("\n"))
    }
}

/// `Answer` is usually a string but occasionally a structured value.
fn answer_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) if map.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}
