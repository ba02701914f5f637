// [tests/mirror/libs/infra/db_turso/dimension_upsert.test.rs]
/*!
 * =================================================================
 * APARATO: DIMENSION UPSERT CERTIFICATION (V9.2)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3
 * RESPONSABILIDAD: WRITE-ONCE DE first_seen_at Y MÁQUINA DE ESTADOS
 *
 * # Logic:
 * 1. 'first_seen_at' jamás se sobreescribe a un valor posterior.
 * 2. El sello de error preserva el último valor conocido.
 * 3. Las transiciones PENDING/CHECKED/ERROR son las del contrato.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use cerberus_domain_models::EnrichmentStatus;
    use cerberus_infra_db::repositories::DimensionRepository;
    use cerberus_infra_db::TursoClient;
    use chrono::{TimeZone, Utc};

    async fn setup_repository(test_anchor: &str) -> DimensionRepository {
        let client = TursoClient::connect(&format!("file:{test_anchor}?mode=memory&cache=shared"), None)
            .await
            .expect("CRITICAL_FAULT: Failed to anchor in-memory ledger.");
        DimensionRepository::new(client)
    }

    #[tokio::test]
    async fn certify_first_seen_at_is_write_once() {
        let repository = setup_repository("dim_first_seen").await;
        let older_first_seen = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let newer_first_seen = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        repository
            .seal_age_checked("BTC", "bc1-target", 50000, Some(older_first_seen))
            .await
            .unwrap();
        // Un upsert posterior con una observación más nueva NO muta el sello.
        repository
            .seal_age_checked("BTC", "bc1-target", 100, Some(newer_first_seen))
            .await
            .unwrap();

        let row = repository.read_age_row("BTC", "bc1-target").await.unwrap().expect("row");
        assert_eq!(row.first_seen_at, Some(older_first_seen));
        // El valor de edad sí se refresca.
        assert_eq!(row.destination_age_hours, Some(100));
        assert_eq!(row.age_status, EnrichmentStatus::Checked);
    }

    #[tokio::test]
    async fn certify_error_seal_preserves_the_previous_value() {
        let repository = setup_repository("dim_error_preserve").await;
        let first_seen = Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).unwrap();

        repository.seal_age_checked("ETH", "0xtarget", 7200, Some(first_seen)).await.unwrap();
        repository.seal_age_error("ETH", "0xtarget", "HTTP_503").await.unwrap();

        let row = repository.read_age_row("ETH", "0xtarget").await.unwrap().expect("row");
        assert_eq!(row.age_status, EnrichmentStatus::Error);
        assert_eq!(row.last_error.as_deref(), Some("HTTP_503"));
        // El último valor conocido y el sello de primera vista sobreviven.
        assert_eq!(row.destination_age_hours, Some(7200));
        assert_eq!(row.first_seen_at, Some(first_seen));
    }

    #[tokio::test]
    async fn certify_sanctions_state_machine_transitions() {
        let repository = setup_repository("dim_sanctions_machine").await;

        // Primera observación: fallo del proveedor -> ERROR con rastro.
        repository.seal_sanctions_error("BTC", "bc1-probe", "NETWORK_UNREACHABLE").await.unwrap();
        let errored = repository.read_sanctions_row("BTC", "bc1-probe").await.unwrap().unwrap();
        assert_eq!(errored.sanctions_status, EnrichmentStatus::Error);
        assert!(!errored.is_sanctioned);
        assert!(errored.last_checked_at.is_some());

        // Recuperación: éxito -> CHECKED con last_error limpio.
        repository.seal_sanctions_checked("BTC", "bc1-probe", true).await.unwrap();
        let checked = repository.read_sanctions_row("BTC", "bc1-probe").await.unwrap().unwrap();
        assert_eq!(checked.sanctions_status, EnrichmentStatus::Checked);
        assert!(checked.is_sanctioned);
        assert_eq!(checked.last_error, None);

        // Fallo posterior: ERROR sin perder el veredicto previo.
        repository.seal_sanctions_error("BTC", "bc1-probe", "HTTP_429").await.unwrap();
        let re_errored = repository.read_sanctions_row("BTC", "bc1-probe").await.unwrap().unwrap();
        assert_eq!(re_errored.sanctions_status, EnrichmentStatus::Error);
        assert!(re_errored.is_sanctioned);
    }

    #[tokio::test]
    async fn certify_freshness_reads_reflect_the_seals() {
        let repository = setup_repository("dim_freshness_reads").await;

        assert!(repository.sanctions_freshness("BTC", "bc1-fresh").await.unwrap().is_none());

        repository.seal_sanctions_checked("BTC", "bc1-fresh", false).await.unwrap();
        let (status, checked_at) = repository
            .sanctions_freshness("BTC", "bc1-fresh")
            .await
            .unwrap()
            .expect("freshness row");
        assert_eq!(status, EnrichmentStatus::Checked);
        assert!(checked_at.is_some());
    }
}
