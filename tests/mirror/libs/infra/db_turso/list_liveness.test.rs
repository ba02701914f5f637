// [tests/mirror/libs/infra/db_turso/list_liveness.test.rs]
/*!
 * =================================================================
 * APARATO: LIST LIVENESS CERTIFICATION (V9.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3
 * RESPONSABILIDAD: PREDICADO DE VIDA Y SCOPING POR CADENA
 *
 * # Logic:
 * Una entrada vive sii status='ACTIVE' y expires_at es NULL o
 * futuro. Las filas de dirección con chain NULL aplican a toda
 * cadena. Aislamiento con Ledger en RAM compartida.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use cerberus_domain_models::GreylistEntityType;
    use cerberus_infra_db::repositories::ListRepository;
    use cerberus_infra_db::TursoClient;
    use chrono::{Duration, Utc};
    use libsql::params;

    async fn setup_client(test_anchor: &str) -> TursoClient {
        TursoClient::connect(&format!("file:{test_anchor}?mode=memory&cache=shared"), None)
            .await
            .expect("CRITICAL_FAULT: Failed to anchor in-memory ledger.")
    }

    #[tokio::test]
    async fn certify_liveness_predicate_on_user_allowlist() {
        let client = setup_client("list_liveness_users").await;
        let connection = client.get_connection().unwrap();

        let future_expiry = (Utc::now() + Duration::hours(1)).to_rfc3339();
        let past_expiry = (Utc::now() - Duration::hours(1)).to_rfc3339();

        connection.execute(
            "INSERT INTO risk_whitelist_user (user_code, status, expires_at, reason) VALUES
             ('U-LIVE', 'ACTIVE', NULL, 'vip desk'),
             ('U-FUTURE', 'ACTIVE', ?1, 'temporary trust'),
             ('U-EXPIRED', 'ACTIVE', ?2, 'lapsed'),
             ('U-INACTIVE', 'DISABLED', NULL, 'revoked')",
            params![future_expiry, past_expiry],
        ).await.unwrap();

        let repository = ListRepository::new(client);

        assert_eq!(repository.lookup_user_allow("U-LIVE").await.unwrap().as_deref(), Some("vip desk"));
        assert_eq!(
            repository.lookup_user_allow("U-FUTURE").await.unwrap().as_deref(),
            Some("temporary trust")
        );
        assert_eq!(repository.lookup_user_allow("U-EXPIRED").await.unwrap(), None);
        assert_eq!(repository.lookup_user_allow("U-INACTIVE").await.unwrap(), None);
        assert_eq!(repository.lookup_user_allow("U-ABSENT").await.unwrap(), None);
    }

    #[tokio::test]
    async fn certify_chain_scoping_on_address_lists() {
        let client = setup_client("list_liveness_chains").await;
        let connection = client.get_connection().unwrap();

        connection.execute(
            "INSERT INTO risk_blacklist_address (address, chain, status, expires_at, reason) VALUES
             ('addr-any-chain', NULL, 'ACTIVE', NULL, 'mixer cluster'),
             ('addr-eth-only', 'ETH', 'ACTIVE', NULL, 'drainer contract')",
            (),
        ).await.unwrap();

        let repository = ListRepository::new(client);

        // chain NULL aplica a cualquier cadena consultada.
        assert!(repository.lookup_address_deny("addr-any-chain", Some("BTC")).await.unwrap().is_some());
        assert!(repository.lookup_address_deny("addr-any-chain", Some("ETH")).await.unwrap().is_some());
        assert!(repository.lookup_address_deny("addr-any-chain", None).await.unwrap().is_some());

        // Fila con cadena fija solo aplica a su cadena (o consulta sin cadena).
        assert!(repository.lookup_address_deny("addr-eth-only", Some("ETH")).await.unwrap().is_some());
        assert_eq!(repository.lookup_address_deny("addr-eth-only", Some("BTC")).await.unwrap(), None);
        assert!(repository.lookup_address_deny("addr-eth-only", None).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn certify_greylist_discriminates_by_entity_type() {
        let client = setup_client("list_liveness_grey").await;
        let connection = client.get_connection().unwrap();

        connection.execute(
            "INSERT INTO risk_greylist (entity_type, entity_value, status, expires_at, reason) VALUES
             ('USER_CODE', 'U-GREY', 'ACTIVE', NULL, 'chargeback history'),
             ('EMAIL_DOMAIN', 'tempmail.io', 'ACTIVE', NULL, 'disposable provider')",
            (),
        ).await.unwrap();

        let repository = ListRepository::new(client);

        assert!(repository
            .lookup_greylist(GreylistEntityType::UserCode, "U-GREY")
            .await.unwrap().is_some());
        // El mismo valor bajo otro tipo de entidad no dispara.
        assert_eq!(
            repository.lookup_greylist(GreylistEntityType::IpAddress, "U-GREY").await.unwrap(),
            None
        );
        assert!(repository
            .lookup_greylist(GreylistEntityType::EmailDomain, "tempmail.io")
            .await.unwrap().is_some());
    }
}
