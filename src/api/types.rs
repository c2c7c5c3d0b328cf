//! API request and response types.

use serde::{Deserialize, Serialize};

use super::plan_store::PlanRecord;
use crate::agent::PlanStatus;

/// Format used for `created_at` in responses.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Request to plan a new goal.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanRequest {
    /// Natural-language goal
    pub goal: String,
}

/// A saved plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanResponse {
    pub id: i64,

    pub goal: String,

    /// Plan text, or the error message when planning failed
    pub plan_content: String,

    pub status: PlanStatus,

    /// UTC, `YYYY-MM-DD HH:MM:SS`
    pub created_at: String,
}

impl From<PlanRecord> for PlanResponse {
    fn from(record: PlanRecord) -> Self {
        Self {
            id: record.id,
            goal: record.goal,
            plan_content: record.plan_content,
            status: record.status,
            created_at: record.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Configured model identifier
    pub model: String,

    /// Plan store connectivity
    pub database: String,

    /// Current debug flag
    pub debug_mode: bool,

    /// Service version
    pub version: String,

    /// ISO 8601 UTC
    pub timestamp: String,
}

/// Response from the debug toggle endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugToggleResponse {
    /// New flag value, absent when toggling is disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_mode: Option<bool>,

    pub message: String,
}
