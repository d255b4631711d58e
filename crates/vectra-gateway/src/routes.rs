//! HTTP routes

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::{error, warn};
use vectra_common::{IntegrationLogEntry, PricingError, Quotation, QuotationInput, VectraError, VERSION};
use vectra_pricing::{InMemoryLogStore, QuotationService};

const DEFAULT_LOG_LIMIT: usize = 50;
const MAX_LOG_LIMIT: usize = 1_000;

#[derive(Clone)]
pub struct AppState {
    pub service: QuotationService,
    pub log_store: Arc<InMemoryLogStore>,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    limit: Option<usize>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/quotations/calculate", post(calculate_quotation))
        .route("/api/v1/integration-logs", get(list_integration_logs))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let stats = state.service.logger().metrics().snapshot();
    Json(serde_json::json!({
        "status": "healthy",
        "version": VERSION,
        "integration_log": {
            "received": stats.received,
            "dropped": stats.dropped,
            "persisted": stats.persisted,
            "failed": stats.failed,
            "stored": state.log_store.len(),
        }
    }))
}

async fn calculate_quotation(
    State(state): State<AppState>,
    payload: Result<Json<QuotationInput>, JsonRejection>,
) -> Result<Json<Quotation>, (StatusCode, String)> {
    let Json(input) = payload.map_err(|rejection| error_response(VectraError::Validation(rejection.body_text())))?;
    state.service.quote(input).await.map(Json).map_err(error_response)
}

async fn list_integration_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Json<Vec<IntegrationLogEntry>> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).min(MAX_LOG_LIMIT);
    Json(state.log_store.recent(limit))
}

fn error_response(err: VectraError) -> (StatusCode, String) {
    let status = match &err {
        VectraError::Validation(_) => StatusCode::BAD_REQUEST,
        VectraError::Pricing(PricingError::RateNotFound { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!(error = %err, "Quotation failed");
    } else {
        warn!(error = %err, "Quotation rejected");
    }
    (status, err.to_string())
}
