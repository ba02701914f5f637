// [apps/decision-gateway/src/handlers.rs]
/*!
 * =================================================================
 * APARATO: RISK DECISION HANDLERS (V4.2 - PERIMETER ADAPTERS)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TRADUCCIÓN HTTP <-> CASCADA DE DECISIÓN
 *
 * # Logic:
 * Todo veredicto producido viaja como 200 (HOLD y REJECT no son
 * errores de transporte). El único 400 del perímetro es el sobre
 * impresentable: user_code ausente o cuerpo indescifrable. Los
 * registros CDC omitidos responden su código corto 'SKIPPED_*'
 * dentro de la lista de resultados del lote.
 * =================================================================
 */

use crate::cascade::run_decision_cascade;
use crate::ingress::{self, HttpEnvelopeFault};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use cerberus_domain_models::CdcEnvelopeRecord;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

pub struct RiskDecisionHandler;

impl RiskDecisionHandler {
    /**
     * Endpoint: POST /api/v1/risk/decision
     *
     * Acepta el sobre HTTP (JSON directo, sobre FC o formulario) y
     * retorna el veredicto de la cascada.
     *
     * # Errors:
     * - `400`: user_code ausente o cuerpo indescifrable.
     */
    #[instrument(skip(application_state, request_body))]
    pub async fn handle_http_decision(
        State(application_state): State<AppState>,
        request_body: Bytes,
    ) -> impl IntoResponse {
        let subject = match ingress::extract_http_subject(&request_body) {
            Ok(extracted_subject) => extracted_subject,
            Err(HttpEnvelopeFault::MissingUserCode) => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Missing user_code" })))
                    .into_response();
            }
            Err(HttpEnvelopeFault::Unparseable(parse_detail)) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Request Parsing Failed: {parse_detail}") })),
                )
                    .into_response();
            }
        };

        info!("🛂 [PERIMETER]: Decision requested for user {}.", subject.user_code);
        let decision_response = run_decision_cascade(&application_state, &subject).await;

        (StatusCode::OK, Json(decision_response)).into_response()
    }

    /**
     * Endpoint: POST /api/v1/risk/cdc
     *
     * Acepta el lote CDC y responde la lista de resultados por
     * registro: cuerpos de veredicto o códigos 'SKIPPED_*'.
     *
     * # Errors:
     * - `400`: el cuerpo no es una secuencia de registros.
     */
    #[instrument(skip(application_state, batch_payload))]
    pub async fn handle_cdc_batch(
        State(application_state): State<AppState>,
        Json(batch_payload): Json<Value>,
    ) -> impl IntoResponse {
        let Value::Array(raw_records) = batch_payload else {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Request Parsing Failed: CDC batch must be a sequence of records" })),
            )
                .into_response();
        };

        let mut record_outcomes: Vec<Value> = Vec::with_capacity(raw_records.len());

        for raw_record in raw_records {
            let Ok(envelope_record) = serde_json::from_value::<CdcEnvelopeRecord>(raw_record) else {
                warn!("⚠️ [PERIMETER]: CDC record without 'value', skipped.");
                record_outcomes.push(json!("SKIPPED_INVALID_VALUE"));
                continue;
            };

            match ingress::extract_cdc_subject(&envelope_record) {
                Ok(subject) => {
                    let decision_response = run_decision_cascade(&application_state, &subject).await;
                    record_outcomes.push(
                        serde_json::to_value(decision_response)
                            .unwrap_or_else(|_| json!("SKIPPED_INVALID_VALUE")),
                    );
                }
                Err(skip_reason) => {
                    record_outcomes.push(json!(skip_reason.code()));
                }
            }
        }

        (StatusCode::OK, Json(Value::Array(record_outcomes))).into_response()
    }
}
