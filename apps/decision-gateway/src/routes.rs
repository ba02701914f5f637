// [apps/decision-gateway/src/routes.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY ROUTING MATRIX (V4.1)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA DE RUTAS DEL PERÍMETRO DE DECISIÓN
 * =================================================================
 */

use crate::handlers::RiskDecisionHandler;
use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

pub fn create_gateway_router(application_shared_state: AppState) -> Router {
    // Escudo de red para el panel de operaciones y herramientas internas.
    let network_security_shield = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    // ESTRATO DE RIESGO: decisión en línea y lote CDC.
    let risk_stratum = Router::new()
        .route("/decision", post(RiskDecisionHandler::handle_http_decision))
        .route("/cdc", post(RiskDecisionHandler::handle_cdc_batch));

    Router::new()
        .route("/health", get(|| async { "STATUS_OK" }))
        .nest("/api/v1/risk", risk_stratum)
        .layer(network_security_shield)
        .with_state(application_shared_state)
}
