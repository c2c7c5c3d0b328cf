//! In-memory plan store (non-persistent).

use super::{sort_newest_first, PlanRecord, PlanStore};
use crate::agent::PlanStatus;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryPlanStore {
    plans: Arc<RwLock<Vec<PlanRecord>>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn create_plan(
        &self,
        goal: &str,
        plan_content: &str,
        status: PlanStatus,
    ) -> Result<PlanRecord, String> {
        let mut plans = self.plans.write().await;
        let record = PlanRecord {
            id: plans.len() as i64 + 1,
            goal: goal.to_string(),
            plan_content: plan_content.to_string(),
            status,
            created_at: Utc::now(),
        };
        plans.push(record.clone());
        Ok(record)
    }

    async fn get_plan(&self, id: i64) -> Result<Option<PlanRecord>, String> {
        Ok(self.plans.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn list_plans(&self) -> Result<Vec<PlanRecord>, String> {
        let mut plans = self.plans.read().await.clone();
        sort_newest_first(&mut plans);
        Ok(plans)
    }

    async fn ping(&self) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_sequential_and_listing_is_newest_first() {
        let store = InMemoryPlanStore::new();
        let first = store
            .create_plan("a", "plan a", PlanStatus::Success)
            .await
            .unwrap();
        let second = store
            .create_plan("b", "Error creating plan: x", PlanStatus::Error)
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let ids: Vec<i64> = store.list_plans().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(store.get_plan(2).await.unwrap().unwrap().status, PlanStatus::Error);
        assert!(store.get_plan(3).await.unwrap().is_none());
    }
}
