// [apps/enrichment-worker/src/shell.rs]
/*!
 * =================================================================
 * APARATO: WORKER INGEST SHELL (V3.1)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: SUPERFICIE DE INGESTA DEL STREAM CDC
 *
 * # Logic:
 * El transporte CDC llega pre-parseado como lote JSON; el shell
 * solo valida la forma de secuencia y delega al motor. El resumen
 * del lote viaja de vuelta al disparador.
 * =================================================================
 */

use crate::engine::EnrichmentEngine;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

/// Placa base mínima del worker.
#[derive(Clone)]
pub struct WorkerState {
    pub enrichment_engine: Arc<EnrichmentEngine>,
}

pub fn create_worker_router(worker_state: WorkerState) -> Router {
    Router::new()
        .route("/health", get(|| async { "STATUS_OK" }))
        .route("/api/v1/enrich/cdc", post(handle_cdc_ingest))
        .with_state(worker_state)
}

/**
 * Endpoint: POST /api/v1/enrich/cdc
 *
 * # Errors:
 * - `400`: el cuerpo no es una secuencia de registros CDC.
 */
#[instrument(skip(worker_state, batch_payload))]
async fn handle_cdc_ingest(
    State(worker_state): State<WorkerState>,
    Json(batch_payload): Json<Value>,
) -> impl IntoResponse {
    let Value::Array(raw_records) = batch_payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "CDC batch must be a sequence of records" })),
        )
            .into_response();
    };

    let batch_summary = worker_state.enrichment_engine.process_cdc_batch(&raw_records).await;
    (StatusCode::OK, Json(json!(batch_summary))).into_response()
}
