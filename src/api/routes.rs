//! HTTP routes and server startup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::pages;
use super::plan_store::{PlanStore, SqlitePlanStore};
use super::types::{CreatePlanRequest, DebugToggleResponse, HealthResponse, PlanResponse};
use crate::agent::{PlanOptions, Planner};
use crate::config::Config;

/// Shared state for all handlers.
pub struct AppState {
    pub config: Config,
    pub planner: Arc<Planner>,
    pub plans: Arc<dyn PlanStore>,
    /// Runtime debug flag; starts at `config.debug_mode`.
    debug: AtomicBool,
}

impl AppState {
    pub fn new(config: Config, planner: Arc<Planner>, plans: Arc<dyn PlanStore>) -> Self {
        let debug = AtomicBool::new(config.debug_mode);
        Self {
            config,
            planner,
            plans,
            debug,
        }
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }
}

/// Build the router over an existing state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/history", get(pages::history))
        .route("/health", get(health))
        .route("/api/plan", post(create_plan))
        .route("/api/plans", get(list_plans))
        .route("/api/plans/:id", get(get_plan))
        .route("/api/debug", post(toggle_debug))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let plans = SqlitePlanStore::open(&config.database_path).map_err(anyhow::Error::msg)?;
    let planner = Planner::new(&config)?;
    let addr = config.listen_addr();

    let state = Arc::new(AppState::new(config, Arc::new(planner), Arc::new(plans)));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn internal_error(e: String) -> (StatusCode, String) {
    tracing::error!("Plan store error: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e)
}

/// Plan a goal and save the outcome, successful or not.
async fn create_plan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePlanRequest>,
) -> Result<Json<PlanResponse>, (StatusCode, String)> {
    if req.goal.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "goal is required".to_string()));
    }

    let options = PlanOptions {
        debug: state.debug_enabled(),
    };
    let outcome = state.planner.create_plan(&req.goal, options).await;

    let record = state
        .plans
        .create_plan(&outcome.goal, &outcome.plan, outcome.status)
        .await
        .map_err(internal_error)?;
    tracing::info!(id = record.id, status = record.status.as_str(), "Saved plan");

    Ok(Json(record.into()))
}

async fn list_plans(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PlanResponse>>, (StatusCode, String)> {
    let plans = state.plans.list_plans().await.map_err(internal_error)?;
    Ok(Json(plans.into_iter().map(PlanResponse::from).collect()))
}

async fn get_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<PlanResponse>, (StatusCode, String)> {
    match state.plans.get_plan(id).await.map_err(internal_error)? {
        Some(plan) => Ok(Json(plan.into())),
        None => Err((StatusCode::NOT_FOUND, format!("Plan {} not found", id))),
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match state.plans.ping().await {
        Ok(()) => "connected".to_string(),
        Err(e) => {
            tracing::warn!("Plan store health check failed: {}", e);
            format!("error: {}", e)
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        model: state.planner.model().to_string(),
        database,
        debug_mode: state.debug_enabled(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Flip the debug flag. Only allowed when `DEBUG_MODE` was set at startup.
async fn toggle_debug(State(state): State<Arc<AppState>>) -> Json<DebugToggleResponse> {
    if !state.config.debug_mode {
        return Json(DebugToggleResponse {
            debug_mode: None,
            message: "Debug mode is disabled. Set DEBUG_MODE=true in .env to enable.".to_string(),
        });
    }

    let enabled = !state.debug.fetch_xor(true, Ordering::Relaxed);
    tracing::info!(enabled, "Debug mode toggled");
    Json(DebugToggleResponse {
        debug_mode: Some(enabled),
        message: format!("Debug mode {}", if enabled { "enabled" } else { "disabled" }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::PlanStatus;
    use crate::api::plan_store::InMemoryPlanStore;
    use crate::llm::{AssistantReply, ChatRequest, LlmClient, LlmError};
    use crate::tools::ToolRegistry;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use std::path::PathBuf;
    use tower::ServiceExt;

    /// Answers immediately, or fails when the goal mentions "fail".
    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn chat_completion(
            &self,
            request: &ChatRequest<'_>,
        ) -> Result<AssistantReply, LlmError> {
            let user = request.messages[1].content.clone().unwrap_or_default();
            if user.contains("fail") {
                return Err(LlmError::Api {
                    status: 503,
                    message: "overloaded".into(),
                });
            }
            Ok(AssistantReply::Content(format!("Plan for: {}", user)))
        }
    }

    fn test_state(debug_mode: bool) -> Arc<AppState> {
        let mut config = Config::new("key".into(), "test-model".into(), PathBuf::from(":memory:"));
        config.debug_mode = debug_mode;
        let planner = Planner::with_parts(
            Arc::new(EchoLlm),
            ToolRegistry::from_tools(Vec::new()),
            config.model.clone(),
        );
        Arc::new(AppState::new(
            config,
            Arc::new(planner),
            Arc::new(InMemoryPlanStore::new()),
        ))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn toggle_request() -> Request<Body> {
        post_json("/api/debug", serde_json::json!({}))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn create_then_fetch_plan() {
        let state = test_state(false);
        let app = router(state.clone());

        let (status, body) = send(
            app.clone(),
            post_json("/api/plan", serde_json::json!({"goal": "Weekend in Porto"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let created: PlanResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(created.goal, "Weekend in Porto");
        assert_eq!(created.status, PlanStatus::Success);
        assert_eq!(
            created.plan_content,
            "Plan for: Create a detailed plan for this goal: Weekend in Porto"
        );
        assert_eq!(created.created_at.len(), "2024-01-01 00:00:00".len());

        let (status, body) = send(app, get_req(&format!("/api/plans/{}", created.id))).await;
        assert_eq!(status, StatusCode::OK);
        let fetched: PlanResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn failed_planning_is_still_saved() {
        let state = test_state(false);
        let app = router(state.clone());

        let (status, body) = send(
            app,
            post_json("/api/plan", serde_json::json!({"goal": "this will fail"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let created: PlanResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(created.status, PlanStatus::Error);
        assert_eq!(
            created.plan_content,
            "Error creating plan: Provider API error: 503 - overloaded"
        );
        assert_eq!(state.plans.list_plans().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_goal_is_rejected() {
        let (status, _) = send(
            router(test_state(false)),
            post_json("/api/plan", serde_json::json!({"goal": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_plan_is_not_found() {
        let (status, body) = send(router(test_state(false)), get_req("/api/plans/42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(String::from_utf8(body).unwrap(), "Plan 42 not found");
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let state = test_state(false);
        for goal in ["one", "two"] {
            state
                .plans
                .create_plan(goal, "p", PlanStatus::Success)
                .await
                .unwrap();
        }
        let (status, body) = send(router(state), get_req("/api/plans")).await;
        assert_eq!(status, StatusCode::OK);
        let plans: Vec<PlanResponse> = serde_json::from_slice(&body).unwrap();
        let goals: Vec<&str> = plans.iter().map(|p| p.goal.as_str()).collect();
        assert_eq!(goals, vec!["two", "one"]);
    }

    #[tokio::test]
    async fn health_reports_model_and_database() {
        let (status, body) = send(router(test_state(false)), get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.model, "test-model");
        assert_eq!(health.database, "connected");
        assert!(!health.debug_mode);
    }

    #[tokio::test]
    async fn debug_toggle_refused_unless_enabled_at_startup() {
        let state = test_state(false);
        let (_, body) = send(router(state.clone()), toggle_request()).await;
        let toggle: DebugToggleResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(toggle.debug_mode, None);
        assert!(toggle.message.contains("DEBUG_MODE=true"));
        assert!(!state.debug_enabled());
    }

    #[tokio::test]
    async fn debug_toggle_flips_flag() {
        let state = test_state(true);
        assert!(state.debug_enabled());

        let (_, body) = send(router(state.clone()), toggle_request()).await;
        let toggle: DebugToggleResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(toggle.debug_mode, Some(false));
        assert_eq!(toggle.message, "Debug mode disabled");

        let (_, body) = send(router(state.clone()), toggle_request()).await;
        let toggle: DebugToggleResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(toggle.debug_mode, Some(true));
        assert!(state.debug_enabled());
    }

    #[tokio::test]
    async fn pages_are_served_as_html() {
        for uri in ["/", "/history"] {
            let response = router(test_state(false)).oneshot(get_req(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
            assert!(content_type.starts_with("text/html"));
        }
    }
}
