// [tests/mirror/libs/infra/screening_client/screening_clients.test.rs]
/*!
 * =================================================================
 * APARATO: SCREENING CLIENTS CERTIFICATION (V4.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L4
 * RESPONSABILIDAD: FAIL-OPEN, CACHÉ TTL Y COLAPSO SINGLE-FLIGHT
 *
 * # Logic:
 * Proveedores simulados en proceso con contadores atómicos de
 * tráfico: certifican que los hits de caché no tocan la red, que
 * el fallo degrada sin cachearse y que el dashboard del explorador
 * se interpreta por sondeo de campos.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use axum::extract::{Path, State};
    use axum::routing::get;
    use axum::{Json, Router};
    use cerberus_infra_screening::{DestinationAgeClient, SanctionsClient};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Despliega un proveedor simulado y retorna su endpoint raíz.
    async fn spawn_mock_provider(provider_router: Router) -> String {
        let tcp_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let local_address = tcp_listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(tcp_listener, provider_router).await.unwrap();
        });
        format!("http://{local_address}")
    }

    #[derive(Clone)]
    struct SanctionsMockState {
        traffic_counter: Arc<AtomicUsize>,
    }

    fn sanctions_mock(traffic_counter: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/:address",
                get(|State(mock_state): State<SanctionsMockState>, Path(address): Path<String>| async move {
                    mock_state.traffic_counter.fetch_add(1, Ordering::SeqCst);
                    if address.starts_with("bad-") {
                        Json(json!({ "identifications": [ { "category": "sanctions" } ] }))
                    } else {
                        Json(json!({ "identifications": [] }))
                    }
                }),
            )
            .with_state(SanctionsMockState { traffic_counter })
    }

    #[tokio::test]
    async fn certify_sanctions_verdicts_and_cache_hits() {
        let traffic_counter = Arc::new(AtomicUsize::new(0));
        let provider_url = spawn_mock_provider(sanctions_mock(traffic_counter.clone())).await;
        let client = SanctionsClient::new(provider_url, Some("test-key".into()), 3600);

        assert!(client.check_sanctions("bad-address").await);
        assert!(!client.check_sanctions("clean-address").await);
        assert_eq!(traffic_counter.load(Ordering::SeqCst), 2);

        // Positivos y negativos sirven desde caché: cero tráfico nuevo.
        assert!(client.check_sanctions("bad-address").await);
        assert!(!client.check_sanctions("clean-address").await);
        assert_eq!(traffic_counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn certify_sanctions_failure_is_fail_open_and_uncached() {
        let traffic_counter = Arc::new(AtomicUsize::new(0));
        let failing_counter = traffic_counter.clone();
        let failing_router = Router::new().route(
            "/:address",
            get(move |_: Path<String>| {
                let counter = failing_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (axum::http::StatusCode::SERVICE_UNAVAILABLE, "down")
                }
            }),
        );
        let provider_url = spawn_mock_provider(failing_router).await;
        let client = SanctionsClient::new(provider_url, None, 3600);

        // Fail-open: el camino en línea nunca castiga por fallo de proveedor.
        assert!(!client.check_sanctions("any-address").await);
        // El fallo NO se cachea: el siguiente intento vuelve a salir.
        assert!(!client.check_sanctions("any-address").await);
        assert_eq!(traffic_counter.load(Ordering::SeqCst), 2);

        // El contrato de error explícito del worker sí reporta el fallo.
        assert!(client.screen_address("any-address").await.is_err());
    }

    #[tokio::test]
    async fn certify_single_flight_collapses_concurrent_misses() {
        let traffic_counter = Arc::new(AtomicUsize::new(0));
        let slow_counter = traffic_counter.clone();
        let slow_router = Router::new().route(
            "/:address",
            get(move |_: Path<String>| {
                let counter = slow_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(80)).await;
                    Json(json!({ "identifications": [] }))
                }
            }),
        );
        let provider_url = spawn_mock_provider(slow_router).await;
        let client = Arc::new(SanctionsClient::new(provider_url, None, 3600));

        let concurrent_probes: Vec<_> = (0..8)
            .map(|_| {
                let shared_client = client.clone();
                tokio::spawn(async move { shared_client.check_sanctions("same-address").await })
            })
            .collect();
        for probe_handle in concurrent_probes {
            assert!(!probe_handle.await.unwrap());
        }

        // Ocho misses concurrentes de la misma llave: una sola salida.
        assert_eq!(traffic_counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn certify_destination_age_dashboard_probing() {
        let dashboard_router = Router::new().route(
            "/:chain/dashboards/address/:address",
            get(|Path((chain, address)): Path<(String, String)>| async move {
                assert_eq!(chain, "bitcoin");
                Json(json!({
                    "data": {
                        address: {
                            "address": { "first_seen_receiving": "2020-01-01 00:00:00" }
                        }
                    }
                }))
            }),
        );
        let explorer_url = spawn_mock_provider(dashboard_router).await;
        let client = DestinationAgeClient::new(explorer_url, None, 21600);

        let observation = client
            .fetch_destination_age("19D8PHBjZH29uS1uPZ4m3sVyqqfF8UFG9o")
            .await
            .expect("age must resolve");

        // Desde 2020 a hoy: decenas de miles de horas, jamás negativas.
        assert!(observation.age_hours > 40_000);
        assert!(observation.first_seen_at.is_some());
    }

    #[tokio::test]
    async fn certify_unknown_prefix_short_circuits_without_network() {
        let traffic_counter = Arc::new(AtomicUsize::new(0));
        let counting_counter = traffic_counter.clone();
        let counting_router = Router::new().route(
            "/:chain/dashboards/address/:address",
            get(move |_: Path<(String, String)>| {
                let counter = counting_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "data": {} }))
                }
            }),
        );
        let explorer_url = spawn_mock_provider(counting_router).await;
        let client = DestinationAgeClient::new(explorer_url, None, 21600);

        assert!(client.fetch_destination_age("zz-unmapped-prefix").await.is_none());
        assert_eq!(traffic_counter.load(Ordering::SeqCst), 0);
    }
}
