// [tests/mirror/libs/infra/ai_oracle/ai_oracle_contract.test.rs]
/*!
 * =================================================================
 * APARATO: AI ORACLE CONTRACT CERTIFICATION (V3.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L4
 * RESPONSABILIDAD: NEVER-FAIL, CERCAS DE CÓDIGO Y FALLBACKS
 *
 * # Logic:
 * El agente jamás propaga un fallo a la cascada: llave ausente,
 * red caída o cuerpo ilegible degradan a HOLD con centinela -1.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use axum::routing::post;
    use axum::{Json, Router};
    use cerberus_domain_models::{Decision, FeatureBag};
    use cerberus_infra_ai::AiOracleClient;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn spawn_mock_model(model_router: Router) -> String {
        let tcp_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let local_address = tcp_listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(tcp_listener, model_router).await.unwrap();
        });
        format!("http://{local_address}")
    }

    fn case_bag() -> FeatureBag {
        serde_json::from_value(json!({
            "user_code": "U1",
            "txn_id": "T1",
            "withdrawal_amount": 20000,
            "is_new_destination_address": true
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn certify_fenced_verdicts_parse_and_clamp() {
        let model_router = Router::new().route(
            "/v1beta/models/:model_action",
            post(|| async {
                // El modelo envuelve su JSON en cercas, como suele hacerlo.
                let fenced_text = "```json\n{\"decision\":\"PASS\",\"risk_score\":35,\"confidence\":0.9,\"primary_threat\":\"NONE\",\"narrative\":\"Organic behavior.\",\"rule_alignment\":\"disagrees with rule\"}\n```";
                Json(json!({
                    "candidates": [ { "content": { "parts": [ { "text": fenced_text } ] } } ]
                }))
            }),
        );
        let model_url = spawn_mock_model(model_router).await;
        let oracle = AiOracleClient::new(model_url, "mock-model".into(), Some("test-key".into()));

        let verdict = oracle.adjudicate(&case_bag(), Some("[Rule #7] context")).await;

        assert_eq!(verdict.decision, Decision::Pass);
        assert_eq!(verdict.risk_score, 35);
        assert_eq!(verdict.confidence, Some(0.9));
        assert_eq!(verdict.primary_threat, "NONE");
        assert_eq!(verdict.rule_alignment.as_deref(), Some("disagrees with rule"));
        assert!(verdict.llm_reasoning.is_some());
    }

    #[tokio::test]
    async fn certify_missing_api_key_short_circuits_before_network() {
        // Endpoint deliberadamente inexistente: con llave ausente jamás se toca.
        let oracle = AiOracleClient::new("http://127.0.0.1:9".into(), "mock-model".into(), None);
        let verdict = oracle.adjudicate(&case_bag(), None).await;

        assert_eq!(verdict.decision, Decision::Hold);
        assert_eq!(verdict.primary_threat, "AI_ERR");
        assert_eq!(verdict.risk_score, -1);
        assert_eq!(verdict.confidence, Some(0.5));
    }

    #[tokio::test]
    async fn certify_unparseable_candidate_degrades_without_retry_storm() {
        let model_router = Router::new().route(
            "/v1beta/models/:model_action",
            post(|| async {
                Json(json!({
                    "candidates": [ { "content": { "parts": [ { "text": "I think this looks risky." } ] } } ]
                }))
            }),
        );
        let model_url = spawn_mock_model(model_router).await;
        let oracle = AiOracleClient::new(model_url, "mock-model".into(), Some("test-key".into()));

        let verdict = oracle.adjudicate(&case_bag(), None).await;
        assert_eq!(verdict.decision, Decision::Hold);
        assert_eq!(verdict.primary_threat, "AI_ERR");
        assert_eq!(verdict.risk_score, -1);
    }

    #[tokio::test]
    async fn certify_empty_candidate_list_degrades_without_burning_retries() {
        // 200 OK con 'candidates' vacío: transporte sano, agente mudo.
        let request_traffic = Arc::new(AtomicUsize::new(0));
        let traffic_counter = request_traffic.clone();
        let model_router = Router::new().route(
            "/v1beta/models/:model_action",
            post(move || {
                let counter = traffic_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "candidates": [] }))
                }
            }),
        );
        let model_url = spawn_mock_model(model_router).await;
        let oracle = AiOracleClient::new(model_url, "mock-model".into(), Some("test-key".into()));

        let verdict = oracle.adjudicate(&case_bag(), None).await;

        // Clasificación de agente, no de red, y sin reintento alguno.
        assert_eq!(verdict.decision, Decision::Hold);
        assert_eq!(verdict.primary_threat, "AI_ERR");
        assert_eq!(verdict.risk_score, -1);
        assert_eq!(request_traffic.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn certify_undecodable_generation_shape_degrades_without_burning_retries() {
        // 200 OK con una forma que no decodifica al contrato de generación.
        let request_traffic = Arc::new(AtomicUsize::new(0));
        let traffic_counter = request_traffic.clone();
        let model_router = Router::new().route(
            "/v1beta/models/:model_action",
            post(move || {
                let counter = traffic_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "candidates": "not-a-list" }))
                }
            }),
        );
        let model_url = spawn_mock_model(model_router).await;
        let oracle = AiOracleClient::new(model_url, "mock-model".into(), Some("test-key".into()));

        let verdict = oracle.adjudicate(&case_bag(), None).await;

        assert_eq!(verdict.decision, Decision::Hold);
        assert_eq!(verdict.primary_threat, "AI_ERR");
        assert_eq!(verdict.risk_score, -1);
        assert_eq!(verdict.confidence, Some(0.5));
        assert_eq!(request_traffic.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn certify_exhausted_transport_retries_yield_network_fallback() {
        let model_router = Router::new().route(
            "/v1beta/models/:model_action",
            post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let model_url = spawn_mock_model(model_router).await;
        let oracle = AiOracleClient::new(model_url, "mock-model".into(), Some("test-key".into()));

        let verdict = oracle.adjudicate(&case_bag(), None).await;
        assert_eq!(verdict.decision, Decision::Hold);
        assert_eq!(verdict.primary_threat, "AI_NET_ERR");
        assert_eq!(verdict.risk_score, -1);
        assert_eq!(verdict.effective_confidence(), 0.5);
    }
}
