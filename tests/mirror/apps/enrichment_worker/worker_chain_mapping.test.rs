// [tests/mirror/apps/enrichment_worker/worker_chain_mapping.test.rs]
/*!
 * =================================================================
 * APARATO: WORKER CHAIN MAPPING CERTIFICATION (V3.1)
 * CLASIFICACIÓN: E2E INTEGRATION / TRINITY EVIDENCE
 * RESPONSABILIDAD: CADENAS NO MAPEADAS SELLAN ERROR SIN RED
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use axum::extract::Path;
    use axum::routing::get;
    use axum::{Json, Router};
    use cerberus_domain_models::EnrichmentStatus;
    use cerberus_enrichment_worker::chainmap::map_chain_for_explorer;
    use cerberus_enrichment_worker::EnrichmentEngine;
    use cerberus_infra_db::repositories::DimensionRepository;
    use cerberus_infra_db::TursoClient;
    use cerberus_infra_screening::{DestinationAgeClient, SanctionsClient};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn spawn_mock_provider(provider_router: Router) -> String {
        let tcp_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let local_address = tcp_listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(tcp_listener, provider_router).await.unwrap();
        });
        format!("http://{local_address}")
    }

    #[test]
    fn certify_the_closed_chain_catalog() {
        assert_eq!(map_chain_for_explorer("BTC"), Ok("bitcoin"));
        assert_eq!(map_chain_for_explorer("ETH"), Ok("ethereum"));
        assert_eq!(map_chain_for_explorer("TRX"), Ok("tron"));
        assert_eq!(map_chain_for_explorer("LTC"), Ok("litecoin"));
        assert_eq!(map_chain_for_explorer("BCH"), Ok("bitcoin-cash"));
        assert_eq!(map_chain_for_explorer("SOL"), Err("UNMAPPED_CHAIN_SOL".to_string()));
    }

    #[tokio::test]
    async fn certify_unmapped_chain_seals_error_without_touching_the_explorer() {
        let sanctions_traffic = Arc::new(AtomicUsize::new(0));
        let explorer_traffic = Arc::new(AtomicUsize::new(0));

        let sanctions_counter = sanctions_traffic.clone();
        let sanctions_url = spawn_mock_provider(Router::new().route(
            "/:address",
            get(move |_: Path<String>| {
                let counter = sanctions_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "identifications": [] }))
                }
            }),
        ))
        .await;

        let explorer_counter = explorer_traffic.clone();
        let explorer_url = spawn_mock_provider(Router::new().route(
            "/:chain/dashboards/address/:address",
            get(move |_: Path<(String, String)>| {
                let counter = explorer_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "data": {} }))
                }
            }),
        ))
        .await;

        let database_client =
            TursoClient::connect("file:worker_chain_unmapped?mode=memory&cache=shared", None)
                .await
                .expect("CRITICAL_FAULT: Failed to anchor in-memory ledger.");

        let engine = EnrichmentEngine::new(
            DimensionRepository::new(database_client.clone()),
            Arc::new(SanctionsClient::new(sanctions_url, None, 3600)),
            Arc::new(DestinationAgeClient::new(explorer_url, None, 21600)),
            24,
        );

        let summary = engine
            .process_cdc_batch(&[json!({
                "value": {
                    "type": "INSERT",
                    "data": [{ "chain": "DOGE", "destination_address": "D-doge-destination" }]
                }
            })])
            .await;
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.refreshed, 2);

        // La dimensión de edad sella el error de catálogo sin tráfico.
        let repository = DimensionRepository::new(database_client);
        let age_row = repository
            .read_age_row("DOGE", "D-doge-destination")
            .await.unwrap().expect("age row");
        assert_eq!(age_row.age_status, EnrichmentStatus::Error);
        assert_eq!(age_row.last_error.as_deref(), Some("UNMAPPED_CHAIN_DOGE"));
        assert_eq!(explorer_traffic.load(Ordering::SeqCst), 0);

        // El screening de sanciones no depende del catálogo de cadenas.
        let sanctions_row = repository
            .read_sanctions_row("DOGE", "D-doge-destination")
            .await.unwrap().expect("sanctions row");
        assert_eq!(sanctions_row.sanctions_status, EnrichmentStatus::Checked);
        assert_eq!(sanctions_traffic.load(Ordering::SeqCst), 1);
    }
}
