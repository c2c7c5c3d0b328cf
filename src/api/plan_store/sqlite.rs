//! SQLite-backed plan store.
//!
//! Schema:
//! - plans: id, goal, plan_content, status, created_at (RFC 3339, UTC)
//!
//! Timestamps are written with fixed microsecond precision so text ordering
//! matches chronological ordering.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{PlanRecord, PlanStore};
use crate::agent::PlanStatus;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS plans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    goal TEXT NOT NULL,
    plan_content TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'success',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_plans_created_at ON plans(created_at);
"#;

#[derive(Clone)]
pub struct SqlitePlanStore {
    conn: Arc<Mutex<Connection>>,
}

/// Raw column values, converted outside the row callback.
type PlanRow = (i64, String, String, String, String);

impl SqlitePlanStore {
    /// Open or create the database file and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let conn = Connection::open(path.as_ref()).map_err(|e| {
            format!(
                "Failed to open plan database {}: {}",
                path.as_ref().display(),
                e
            )
        })?;
        Self::init(conn)
    }

    /// Fresh private database, for tests and ephemeral runs.
    pub fn open_in_memory() -> Result<Self, String> {
        let conn = Connection::open_in_memory().map_err(|e| e.to_string())?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, String> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| format!("Failed to create plans table: {}", e))?;
        tracing::info!("Plan database tables created/verified");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, String> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| "Plan database lock poisoned".to_string())?;
            f(&*guard)
        })
        .await
        .map_err(|e| format!("Plan database task failed: {}", e))?
    }
}

fn row_to_record(row: PlanRow) -> Result<PlanRecord, String> {
    let (id, goal, plan_content, status, created_at) = row;
    let status = PlanStatus::parse(&status)
        .ok_or_else(|| format!("Plan {} has unknown status '{}'", id, status))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| format!("Plan {} has invalid timestamp: {}", id, e))?
        .with_timezone(&Utc);
    Ok(PlanRecord {
        id,
        goal,
        plan_content,
        status,
        created_at,
    })
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlanRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

#[async_trait]
impl PlanStore for SqlitePlanStore {
    async fn create_plan(
        &self,
        goal: &str,
        plan_content: &str,
        status: PlanStatus,
    ) -> Result<PlanRecord, String> {
        let goal = goal.to_string();
        let plan_content = plan_content.to_string();
        self.with_conn(move |conn| {
            let created_at = Utc::now();
            conn.execute(
                "INSERT INTO plans (goal, plan_content, status, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    goal,
                    plan_content,
                    status.as_str(),
                    created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
                ],
            )
            .map_err(|e| format!("Failed to save plan: {}", e))?;
            Ok(PlanRecord {
                id: conn.last_insert_rowid(),
                goal,
                plan_content,
                status,
                created_at,
            })
        })
        .await
    }

    async fn get_plan(&self, id: i64) -> Result<Option<PlanRecord>, String> {
        let row = self
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT id, goal, plan_content, status, created_at FROM plans WHERE id = ?1",
                    params![id],
                    read_row,
                )
                .optional()
                .map_err(|e| format!("Failed to load plan {}: {}", id, e))
            })
            .await?;
        row.map(row_to_record).transpose()
    }

    async fn list_plans(&self) -> Result<Vec<PlanRecord>, String> {
        let rows = self
            .with_conn(|conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, goal, plan_content, status, created_at FROM plans
                         ORDER BY created_at DESC, id DESC",
                    )
                    .map_err(|e| e.to_string())?;
                let rows = stmt
                    .query_map([], read_row)
                    .map_err(|e| e.to_string())?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| format!("Failed to list plans: {}", e))?;
                Ok(rows)
            })
            .await?;
        rows.into_iter().map(row_to_record).collect()
    }

    async fn ping(&self) -> Result<(), String> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_get_and_list() {
        let store = SqlitePlanStore::open_in_memory().unwrap();
        let saved = store
            .create_plan("Weekend in Lisbon", "Saturday: Alfama", PlanStatus::Success)
            .await
            .unwrap();
        assert_eq!(saved.id, 1);

        let loaded = store.get_plan(saved.id).await.unwrap().unwrap();
        assert_eq!(loaded.goal, "Weekend in Lisbon");
        assert_eq!(loaded.plan_content, "Saturday: Alfama");
        assert_eq!(loaded.status, PlanStatus::Success);
        assert_eq!(
            loaded.created_at.timestamp_micros(),
            saved.created_at.timestamp_micros()
        );

        assert!(store.get_plan(99).await.unwrap().is_none());
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let store = SqlitePlanStore::open_in_memory().unwrap();
        for goal in ["first", "second", "third"] {
            store
                .create_plan(goal, "plan", PlanStatus::Success)
                .await
                .unwrap();
        }
        let goals: Vec<String> = store
            .list_plans()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.goal)
            .collect();
        assert_eq!(goals, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn records_survive_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plans.db");

        {
            let store = SqlitePlanStore::open(&path).unwrap();
            store
                .create_plan("Paris", "Error creating plan: boom", PlanStatus::Error)
                .await
                .unwrap();
        }

        let reopened = SqlitePlanStore::open(&path).unwrap();
        let plans = reopened.list_plans().await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].status, PlanStatus::Error);
    }
}
