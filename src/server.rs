use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::post};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::{AppConfig, OptimizerConfig};
use crate::data::{
    Constraint, ConstraintViolation, Guest, GuestId, OptimizationResult, ScoreBreakdown, Table,
    TableId,
};
use crate::error::SeatingError;
use crate::score::ScoreCalculator;
use crate::session::OptimizationSession;
use crate::violations;

/// Shared host state: one optimization session per event.
#[derive(Clone)]
pub struct AppState {
    config: Arc<OptimizerConfig>,
    sessions: Arc<Mutex<HashMap<String, OptimizationSession>>>,
}

impl AppState {
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // a handler that panicked mid-update cannot leave a session half-written,
    // so a poisoned lock is still usable
    fn sessions(&self) -> MutexGuard<'_, HashMap<String, OptimizationSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub guests: Vec<Guest>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub score: i32,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationsRequest {
    pub guests: Vec<Guest>,
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub table_id: Option<TableId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub event_id: String,
    pub guests: Vec<Guest>,
    pub tables: Vec<Table>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    pub result: OptimizationResult,
    pub guests: Vec<Guest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackRequest {
    pub event_id: String,
    pub guests: Vec<Guest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackResponse {
    pub moved_guest_ids: Vec<GuestId>,
    pub guests: Vec<Guest>,
}

impl IntoResponse for SeatingError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn score_handler(
    State(state): State<AppState>,
    Json(input): Json<ScoreRequest>,
) -> Json<ScoreResponse> {
    let calculator = ScoreCalculator::new(&state.config);
    Json(ScoreResponse {
        score: calculator.score(&input.guests),
        breakdown: calculator.breakdown(&input.guests, &input.tables, &input.constraints),
    })
}

async fn violations_handler(Json(input): Json<ViolationsRequest>) -> Json<Vec<ConstraintViolation>> {
    let found = match &input.table_id {
        Some(table_id) => violations::detect_for_table(&input.guests, &input.constraints, table_id),
        None => violations::detect(&input.guests, &input.constraints),
    };
    Json(found)
}

async fn optimize_handler(
    State(state): State<AppState>,
    Json(mut input): Json<OptimizeRequest>,
) -> Json<OptimizeResponse> {
    let mut sessions = state.sessions();
    let session = sessions
        .entry(input.event_id.clone())
        .or_insert_with(|| OptimizationSession::new((*state.config).clone()));
    let result = session.run_with_constraints(&mut input.guests, &input.tables, &input.constraints);
    Json(OptimizeResponse {
        result,
        guests: input.guests,
    })
}

async fn rollback_handler(
    State(state): State<AppState>,
    Json(mut input): Json<RollbackRequest>,
) -> Result<Json<RollbackResponse>, SeatingError> {
    let moved_guest_ids = match state.sessions().get_mut(&input.event_id) {
        Some(session) => session.rollback(&mut input.guests)?,
        None => Vec::new(),
    };
    Ok(Json(RollbackResponse {
        moved_guest_ids,
        guests: input.guests,
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/seating/score", post(score_handler))
        .route("/v1/seating/violations", post(violations_handler))
        .route("/v1/seating/optimize", post(optimize_handler))
        .route("/v1/seating/rollback", post(rollback_handler))
        .with_state(state)
}

pub async fn run_server(config: AppConfig) -> std::io::Result<()> {
    let addr = config.server.socket_addr().map_err(|e| {
        error!("{e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    let app = router(AppState::new(config.optimizer));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
