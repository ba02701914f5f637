// [tests/mirror/libs/infra/db_turso/feature_fetch.test.rs]
/*!
 * =================================================================
 * APARATO: FEATURE FETCH CERTIFICATION (V9.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3
 * RESPONSABILIDAD: CICLO RETRY-FALLBACK Y WRITE-BACK DERIVADO
 *
 * # Logic:
 * El job de streaming corre en paralelo con la decisión; el fetch
 * exacto debe sobrevivir la carrera con reintento acotado y, si la
 * pierde, caer a la fila más reciente del usuario.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use cerberus_infra_db::repositories::FeatureRepository;
    use cerberus_infra_db::TursoClient;
    use libsql::{params, Value as SqlValue};
    use std::time::Duration;

    async fn setup_client(test_anchor: &str) -> TursoClient {
        TursoClient::connect(&format!("file:{test_anchor}?mode=memory&cache=shared"), None)
            .await
            .expect("CRITICAL_FAULT: Failed to anchor in-memory ledger.")
    }

    async fn seed_feature_row(client: &TursoClient, user_code: &str, txn_id: &str, update_time: &str) {
        client.get_connection().unwrap().execute(
            "INSERT INTO risk_features
                (user_code, txn_id, destination_address, chain, withdrawal_amount,
                 is_new_device, is_new_ip, is_new_destination_address, account_maturity, update_time)
             VALUES (?1, ?2, '0x1234567890abcdef1234567890abcdef12345678', 'ETH', 1500.0, 0, 0, 1, 30, ?3)",
            params![user_code, txn_id, update_time],
        ).await.unwrap();
    }

    #[tokio::test]
    async fn certify_exact_row_maps_every_column_into_the_bag() {
        let client = setup_client("feature_fetch_exact").await;
        seed_feature_row(&client, "U1", "T1", "2026-08-01 10:00:00").await;

        let repository = FeatureRepository::new(client);
        let bag = repository.fetch_exact("U1", "T1").await.unwrap().expect("row must exist");

        assert_eq!(bag.user_code(), Some("U1"));
        assert_eq!(bag.withdrawal_amount(), Some(1500.0));
        assert_eq!(bag.chain(), Some("ETH"));
        assert_eq!(bag.flag("is_new_destination_address"), Some(true));
        assert_eq!(bag.flag("is_new_device"), Some(false));
        // Columna evolutiva sin escribir: presente como NULL => ausente.
        assert_eq!(bag.number("destination_age_hours"), None);
    }

    #[tokio::test]
    async fn certify_retry_survives_the_streaming_race() {
        let client = setup_client("feature_fetch_race").await;
        let racing_client = client.clone();

        // El "job de streaming" sella la fila 60ms después de la solicitud.
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            seed_feature_row(&racing_client, "U2", "T2", "2026-08-01 10:00:00").await;
        });

        let repository = FeatureRepository::new(client);
        let bag = repository
            .fetch_with_retry("U2", "T2", 5, Duration::from_millis(40))
            .await
            .expect("retry must win the race");
        assert_eq!(bag.txn_id(), Some("T2"));
    }

    #[tokio::test]
    async fn certify_fallback_prefers_the_latest_row_by_update_time() {
        let client = setup_client("feature_fetch_fallback").await;
        seed_feature_row(&client, "U3", "T-OLD", "2026-07-01 10:00:00").await;
        seed_feature_row(&client, "U3", "T-NEW", "2026-08-01 10:00:00").await;

        let repository = FeatureRepository::new(client);

        // La transacción pedida no existe: cae a la más reciente del usuario.
        let absent = repository
            .fetch_with_retry("U3", "T-MISSING", 2, Duration::from_millis(5))
            .await;
        assert!(absent.is_none());

        let fallback_bag = repository.fetch_latest_for_user("U3").await.unwrap().expect("fallback row");
        assert_eq!(fallback_bag.txn_id(), Some("T-NEW"));
    }

    #[tokio::test]
    async fn certify_write_back_honors_the_column_whitelist() {
        let client = setup_client("feature_fetch_writeback").await;
        seed_feature_row(&client, "U4", "T4", "2026-08-01 10:00:00").await;

        let repository = FeatureRepository::new(client);
        repository
            .write_back_derived(
                "U4",
                "T4",
                &[
                    ("is_impossible_travel", SqlValue::Integer(1)),
                    ("time_since_user_login", SqlValue::Real(12.5)),
                    // Fuera de la lista blanca: debe descartarse sin fallar.
                    ("decision", SqlValue::Text("REJECT".into())),
                ],
            )
            .await
            .expect("write-back must tolerate dropped columns");

        let bag = repository.fetch_exact("U4", "T4").await.unwrap().unwrap();
        assert_eq!(bag.flag("is_impossible_travel"), Some(true));
        assert_eq!(bag.number("time_since_user_login"), Some(12.5));
        assert_eq!(bag.text("decision"), None);
    }
}
