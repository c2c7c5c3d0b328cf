//! Plan storage: append-only records of planning attempts.

mod memory;
mod sqlite;

pub use memory::InMemoryPlanStore;
pub use sqlite::SqlitePlanStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::agent::PlanStatus;

/// A saved planning attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRecord {
    pub id: i64,
    pub goal: String,
    pub plan_content: String,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn create_plan(
        &self,
        goal: &str,
        plan_content: &str,
        status: PlanStatus,
    ) -> Result<PlanRecord, String>;

    async fn get_plan(&self, id: i64) -> Result<Option<PlanRecord>, String>;

    /// All plans, newest first.
    async fn list_plans(&self) -> Result<Vec<PlanRecord>, String>;

    /// Cheap connectivity check for health reporting.
    async fn ping(&self) -> Result<(), String>;
}

/// Newest first; ids break ties between identical timestamps.
pub(crate) fn sort_newest_first(plans: &mut [PlanRecord]) {
    plans.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
