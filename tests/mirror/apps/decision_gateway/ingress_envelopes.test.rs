// [tests/mirror/apps/decision_gateway/ingress_envelopes.test.rs]
/*!
 * =================================================================
 * APARATO: INGRESS ENVELOPE CERTIFICATION (V4.1)
 * CLASIFICACIÓN: E2E INTEGRATION / TRINITY EVIDENCE
 * RESPONSABILIDAD: CONTRATO 400 Y CÓDIGOS SKIPPED_* DEL PERÍMETRO
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use cerberus_decision_gateway::config::GatewayConfig;
    use cerberus_decision_gateway::{create_gateway_router, AppState};
    use cerberus_infra_db::TursoClient;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_config(database_anchor: &str) -> GatewayConfig {
        GatewayConfig {
            database_url: format!("file:{database_anchor}?mode=memory&cache=shared"),
            database_auth_token: None,
            listening_port: 0,
            sanctions_api_url: "http://127.0.0.1:9".into(),
            sanctions_api_key: None,
            explorer_api_url: "http://127.0.0.1:9".into(),
            explorer_api_key: None,
            llm_api_url: "http://127.0.0.1:9".into(),
            llm_model: "mock-model".into(),
            llm_api_key: None,
            alert_webhook_url: None,
            rule_cache_ttl_seconds: 300,
            sanctions_cache_ttl_seconds: 3600,
            destination_age_cache_ttl_seconds: 21600,
            feature_fetch_max_retries: 2,
            feature_fetch_retry_delay: Duration::from_millis(10),
        }
    }

    async fn setup_state(database_anchor: &str) -> AppState {
        let config = test_config(database_anchor);
        let database_client = TursoClient::connect(&config.database_url, None)
            .await
            .expect("CRITICAL_FAULT: Failed to anchor in-memory ledger.");
        AppState::new(database_client, &config)
    }

    async fn post_json(router: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let network_response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .expect("CRITICAL_FAULT: Router failed to process signal.");

        let status = network_response.status();
        let body_bytes = axum::body::to_bytes(network_response.into_body(), usize::MAX)
            .await
            .unwrap();
        let decoded: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
        (status, decoded)
    }

    #[tokio::test]
    async fn certify_missing_user_code_yields_the_canonical_400() {
        let state = setup_state("ingress_missing_user").await;
        let router = create_gateway_router(state);

        let (status, body) = post_json(router, "/api/v1/risk/decision", json!({ "txn_id": "T1" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing user_code");
    }

    #[tokio::test]
    async fn certify_undecipherable_body_yields_parse_error_400() {
        let state = setup_state("ingress_garbage").await;
        let router = create_gateway_router(state);

        let network_response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/risk/decision")
                    .body(Body::from(vec![0u8, 1, 2, 3]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(network_response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn certify_form_urlencoded_bodies_are_accepted() {
        let state = setup_state("ingress_form").await;

        // Allow-list del usuario para un veredicto determinista sin red.
        state.database_client.get_connection().unwrap().execute(
            "INSERT INTO risk_whitelist_user (user_code, reason) VALUES ('U-FORM', 'ops trust')",
            (),
        ).await.unwrap();
        state.database_client.get_connection().unwrap().execute(
            "INSERT INTO risk_features (user_code, txn_id) VALUES ('U-FORM', 'T-FORM')",
            (),
        ).await.unwrap();

        let router = create_gateway_router(state);
        let network_response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/risk/decision")
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(Body::from("user_code=U-FORM&txn_id=T-FORM"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(network_response.status(), StatusCode::OK);
        let body_bytes = axum::body::to_bytes(network_response.into_body(), usize::MAX).await.unwrap();
        let verdict: Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(verdict["decision"], "PASS");
        assert_eq!(verdict["source"], "RULE_ENGINE_WHITELIST_USER");
    }

    #[tokio::test]
    async fn certify_cdc_batch_mixes_verdicts_and_skip_codes() {
        let state = setup_state("ingress_cdc_mixed").await;

        state.database_client.get_connection().unwrap().execute(
            "INSERT INTO risk_whitelist_user (user_code, reason) VALUES ('U-CDC', 'vip desk')",
            (),
        ).await.unwrap();
        state.database_client.get_connection().unwrap().execute(
            "INSERT INTO risk_features (user_code, txn_id) VALUES ('U-CDC', 'T-CDC')",
            (),
        ).await.unwrap();

        let router = create_gateway_router(state);
        let batch = json!([
            { "value": { "type": "INSERT", "data": [{ "user_code": "U-CDC", "code": "T-CDC" }] } },
            { "value": { "type": "UPDATE", "data": [{ "user_code": "U-CDC", "code": "T-CDC" }] } },
            { "value": { "type": "INSERT", "data": [] } },
            { "value": { "type": "INSERT", "data": [{ "code": "T-NO-USER" }] } },
            { "value": "not-a-document" }
        ]);

        let (status, outcomes) = post_json(router, "/api/v1/risk/cdc", batch).await;
        assert_eq!(status, StatusCode::OK);

        let outcome_list = outcomes.as_array().expect("outcome list");
        assert_eq!(outcome_list.len(), 5);
        assert_eq!(outcome_list[0]["decision"], "PASS");
        assert_eq!(outcome_list[0]["source"], "RULE_ENGINE_WHITELIST_USER");
        assert_eq!(outcome_list[1], "SKIPPED_NON_INSERT");
        assert_eq!(outcome_list[2], "SKIPPED_EMPTY_DATA");
        assert_eq!(outcome_list[3], "SKIPPED_NO_USER_CODE");
        assert_eq!(outcome_list[4], "SKIPPED_INVALID_VALUE");
    }
}
