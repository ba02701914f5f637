// [tests/mirror/apps/decision_gateway/cascade_sanctions.test.rs]
/*!
 * =================================================================
 * APARATO: CASCADE SANCTIONS CERTIFICATION (V4.2)
 * CLASIFICACIÓN: E2E INTEGRATION / TRINITY EVIDENCE
 * RESPONSABILIDAD: REJECT POR SANCIONES, WRITE-BACK Y PRECEDENCIA
 *
 * # Logic:
 * 1. Destino sancionado -> REJECT/SANCTIONS/100 + tarjeta + write-back.
 * 2. La edad de destino faltante se resuelve y persiste en la fila.
 * 3. Perilla de política: la allow-list de usuario precede al
 *    screening; un usuario allow-listed hacia destino sancionado
 *    recibe PASS (contrato documentado, no reordenar en silencio).
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::Path;
    use axum::http::{Request, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use cerberus_decision_gateway::config::GatewayConfig;
    use cerberus_decision_gateway::{create_gateway_router, AppState};
    use cerberus_infra_db::TursoClient;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const SANCTIONED_ADDRESS: &str = "19D8PHBjZH29uS1uPZ4m3sVyqqfF8UFG9o";

    struct MockPerimeter {
        sanctions_url: String,
        explorer_url: String,
        webhook_url: String,
        webhook_traffic: Arc<AtomicUsize>,
    }

    async fn spawn_mock_perimeter() -> MockPerimeter {
        let webhook_traffic = Arc::new(AtomicUsize::new(0));

        // El proveedor marca únicamente la dirección del caso.
        let sanctions_router = Router::new().route(
            "/:address",
            get(|Path(address): Path<String>| async move {
                if address == SANCTIONED_ADDRESS {
                    Json(json!({ "identifications": [ { "category": "sanctions", "name": "OFAC SDN" } ] }))
                } else {
                    Json(json!({ "identifications": [] }))
                }
            }),
        );

        let explorer_router = Router::new().route(
            "/:chain/dashboards/address/:address",
            get(|Path((_, address)): Path<(String, String)>| async move {
                Json(json!({
                    "data": { address: { "address": { "first_seen_receiving": "2021-05-01 00:00:00" } } }
                }))
            }),
        );

        let webhook_counter = webhook_traffic.clone();
        let webhook_router = Router::new().route(
            "/hook",
            post(move || {
                let counter = webhook_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "code": 0 }))
                }
            }),
        );

        let mut endpoints = Vec::new();
        for mock_router in [sanctions_router, explorer_router, webhook_router] {
            let tcp_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let local_address = tcp_listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(tcp_listener, mock_router).await.unwrap();
            });
            endpoints.push(format!("http://{local_address}"));
        }

        MockPerimeter {
            sanctions_url: endpoints[0].clone(),
            explorer_url: endpoints[1].clone(),
            webhook_url: format!("{}/hook", endpoints[2]),
            webhook_traffic,
        }
    }

    async fn setup_state(database_anchor: &str, perimeter: &MockPerimeter) -> AppState {
        let config = GatewayConfig {
            database_url: format!("file:{database_anchor}?mode=memory&cache=shared"),
            database_auth_token: None,
            listening_port: 0,
            sanctions_api_url: perimeter.sanctions_url.clone(),
            sanctions_api_key: Some("test-key".into()),
            explorer_api_url: perimeter.explorer_url.clone(),
            explorer_api_key: None,
            llm_api_url: "http://127.0.0.1:9".into(),
            llm_model: "mock-model".into(),
            llm_api_key: None,
            alert_webhook_url: Some(perimeter.webhook_url.clone()),
            rule_cache_ttl_seconds: 300,
            sanctions_cache_ttl_seconds: 3600,
            destination_age_cache_ttl_seconds: 21600,
            feature_fetch_max_retries: 2,
            feature_fetch_retry_delay: Duration::from_millis(10),
        };
        let database_client = TursoClient::connect(&config.database_url, None)
            .await
            .expect("CRITICAL_FAULT: Failed to anchor in-memory ledger.");
        AppState::new(database_client, &config)
    }

    async fn request_decision(state: &AppState, user_code: &str, txn_id: &str) -> Value {
        let router = create_gateway_router(state.clone());
        let network_response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/risk/decision")
                    .header("Content-Type", "application/json")
                    .body(Body::from(json!({ "user_code": user_code, "txn_id": txn_id }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(network_response.status(), StatusCode::OK);
        let body_bytes = axum::body::to_bytes(network_response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn certify_sanctioned_destination_rejects_and_writes_back() {
        let perimeter = spawn_mock_perimeter().await;
        let state = setup_state("cascade_sanctioned", &perimeter).await;
        let connection = state.database_client.get_connection().unwrap();

        connection.execute(
            "INSERT INTO risk_features (user_code, txn_id, destination_address, chain, is_new_device, withdrawal_amount)
             VALUES ('U5', 'T5', ?1, 'BTC', 1, 3000.0)",
            libsql::params![SANCTIONED_ADDRESS],
        ).await.unwrap();

        let verdict = request_decision(&state, "U5", "T5").await;

        assert_eq!(verdict["decision"], "REJECT");
        assert_eq!(verdict["primary_threat"], "SANCTIONS");
        assert_eq!(verdict["risk_score"], 100);
        assert_eq!(verdict["source"], "SANCTIONS_ENGINE");
        assert_eq!(perimeter.webhook_traffic.load(Ordering::SeqCst), 1);

        // Write-back sobre la fila viva: bandera y edad resuelta.
        let mut feature_rows = state.database_client.get_connection().unwrap()
            .query(
                "SELECT is_sanctioned, destination_age_hours FROM risk_features
                 WHERE user_code = 'U5' AND txn_id = 'T5'",
                (),
            )
            .await.unwrap();
        let feature_row = feature_rows.next().await.unwrap().expect("feature row");
        assert_eq!(feature_row.get::<i64>(0).unwrap(), 1);
        assert!(feature_row.get::<f64>(1).unwrap() > 0.0);
    }

    #[tokio::test]
    async fn certify_allowlisted_user_precedes_sanctions_screening() {
        let perimeter = spawn_mock_perimeter().await;
        let state = setup_state("cascade_allow_precedence", &perimeter).await;
        let connection = state.database_client.get_connection().unwrap();

        connection.execute(
            "INSERT INTO risk_whitelist_user (user_code, reason) VALUES ('U6', 'institutional desk')",
            (),
        ).await.unwrap();
        connection.execute(
            "INSERT INTO risk_features (user_code, txn_id, destination_address, chain)
             VALUES ('U6', 'T6', ?1, 'BTC')",
            libsql::params![SANCTIONED_ADDRESS],
        ).await.unwrap();

        // Perilla de política documentada: allow-list gana a sanciones.
        let verdict = request_decision(&state, "U6", "T6").await;
        assert_eq!(verdict["decision"], "PASS");
        assert_eq!(verdict["source"], "RULE_ENGINE_WHITELIST_USER");
        assert_eq!(perimeter.webhook_traffic.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn certify_known_destination_age_skips_the_explorer() {
        let perimeter = spawn_mock_perimeter().await;
        let state = setup_state("cascade_age_known", &perimeter).await;

        // Edad ya poblada (> 0): la etapa 5 no vuelve a consultarla.
        state.database_client.get_connection().unwrap().execute(
            "INSERT INTO risk_features
                (user_code, txn_id, destination_address, chain, destination_age_hours, is_new_device, withdrawal_amount)
             VALUES ('U7', 'T7', 'bc1qclean-destination', 'BTC', 500.0, 1, 100.0)",
            (),
        ).await.unwrap();

        let verdict = request_decision(&state, "U7", "T7").await;
        // Destino limpio, sin listas ni reglas: PASS por defecto.
        assert_eq!(verdict["decision"], "PASS");
        assert_eq!(verdict["source"], "RULE_ENGINE_DEFAULT_PASS");

        let mut feature_rows = state.database_client.get_connection().unwrap()
            .query(
                "SELECT destination_age_hours FROM risk_features WHERE user_code = 'U7'",
                (),
            )
            .await.unwrap();
        let feature_row = feature_rows.next().await.unwrap().unwrap();
        // El valor preexistente sobrevive intacto.
        assert_eq!(feature_row.get::<f64>(0).unwrap(), 500.0);
    }
}
