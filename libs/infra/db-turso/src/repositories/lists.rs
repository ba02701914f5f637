// [libs/infra/db-turso/src/repositories/lists.rs]
/*!
 * =================================================================
 * APARATO: CURATED LIST REPOSITORY (V9.1 - LIVENESS SEALED)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: LOOKUPS DE VIDA SOBRE LAS SEIS LISTAS CURADAS
 *
 * # Logic:
 * Cada lookup aplica el predicado de vida en SQL:
 *   status='ACTIVE' AND (expires_at IS NULL OR expires_at > now)
 * y retorna la razón de la primera fila viva. Este estrato no
 * sintetiza veredictos: el llamador decide PASS/HOLD/REJECT.
 *
 * Los lookups de dirección aceptan chain opcional; una fila con
 * chain NULL aplica a cualquier cadena. Deliberadamente sin caché
 * en memoria: el almacenamiento es autoridad y de baja latencia.
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use cerberus_domain_models::GreylistEntityType;
use chrono::Utc;
use libsql::params;
use tracing::instrument;

pub struct ListRepository {
    database_client: TursoClient,
}

impl ListRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    // --- LISTAS DE CONFIANZA (ALLOW) ---

    pub async fn lookup_user_allow(&self, user_code: &str) -> Result<Option<String>, DbError> {
        self.single_value_lookup("risk_whitelist_user", "user_code", user_code).await
    }

    pub async fn lookup_address_allow(
        &self,
        address: &str,
        chain: Option<&str>,
    ) -> Result<Option<String>, DbError> {
        self.address_lookup("risk_whitelist_address", address, chain).await
    }

    // --- LISTAS DE NEGACIÓN (DENY) ---

    pub async fn lookup_user_deny(&self, user_code: &str) -> Result<Option<String>, DbError> {
        self.single_value_lookup("risk_blacklist_user", "user_code", user_code).await
    }

    pub async fn lookup_address_deny(
        &self,
        address: &str,
        chain: Option<&str>,
    ) -> Result<Option<String>, DbError> {
        self.address_lookup("risk_blacklist_address", address, chain).await
    }

    pub async fn lookup_fingerprint_deny(&self, fingerprint: &str) -> Result<Option<String>, DbError> {
        self.single_value_lookup("risk_blacklist_fingerprint", "fingerprint", fingerprint).await
    }

    pub async fn lookup_ip_deny(&self, ip_address: &str) -> Result<Option<String>, DbError> {
        self.single_value_lookup("risk_blacklist_ip", "ip_address", ip_address).await
    }

    pub async fn lookup_email_domain_deny(&self, email_domain: &str) -> Result<Option<String>, DbError> {
        self.single_value_lookup("risk_blacklist_emaildomain", "email_domain", email_domain).await
    }

    // --- LISTA GRIS POLIMÓRFICA ---

    #[instrument(skip(self), fields(entity = %entity_type))]
    pub async fn lookup_greylist(
        &self,
        entity_type: GreylistEntityType,
        entity_value: &str,
    ) -> Result<Option<String>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_rows = database_connection
            .query(
                "SELECT reason FROM risk_greylist
                 WHERE entity_type = ?1 AND entity_value = ?2
                   AND status = 'ACTIVE'
                   AND (expires_at IS NULL OR datetime(expires_at) > datetime(?3))
                 LIMIT 1",
                params![entity_type.as_str(), entity_value, Utc::now().to_rfc3339()],
            )
            .await?;

        Self::first_reason(&mut query_rows).await
    }

    // --- NÚCLEO COMPARTIDO ---

    async fn single_value_lookup(
        &self,
        table_name: &str,
        key_column: &str,
        key_value: &str,
    ) -> Result<Option<String>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        // Tablas y columnas provienen de constantes internas; solo el
        // valor de búsqueda viaja como parámetro.
        let lookup_statement = format!(
            "SELECT reason FROM {table_name}
             WHERE {key_column} = ?1
               AND status = 'ACTIVE'
               AND (expires_at IS NULL OR datetime(expires_at) > datetime(?2))
             LIMIT 1"
        );
        let mut query_rows = database_connection
            .query(&lookup_statement, params![key_value, Utc::now().to_rfc3339()])
            .await?;

        Self::first_reason(&mut query_rows).await
    }

    async fn address_lookup(
        &self,
        table_name: &str,
        address: &str,
        chain: Option<&str>,
    ) -> Result<Option<String>, DbError> {
        let database_connection = self.database_client.get_connection()?;

        let mut query_rows = match chain {
            Some(chain_label) => {
                let scoped_statement = format!(
                    "SELECT reason FROM {table_name}
                     WHERE address = ?1
                       AND (chain IS NULL OR chain = ?2)
                       AND status = 'ACTIVE'
                       AND (expires_at IS NULL OR datetime(expires_at) > datetime(?3))
                     LIMIT 1"
                );
                database_connection
                    .query(&scoped_statement, params![address, chain_label, Utc::now().to_rfc3339()])
                    .await?
            }
            None => {
                let open_statement = format!(
                    "SELECT reason FROM {table_name}
                     WHERE address = ?1
                       AND status = 'ACTIVE'
                       AND (expires_at IS NULL OR datetime(expires_at) > datetime(?2))
                     LIMIT 1"
                );
                database_connection
                    .query(&open_statement, params![address, Utc::now().to_rfc3339()])
                    .await?
            }
        };

        Self::first_reason(&mut query_rows).await
    }

    async fn first_reason(query_rows: &mut libsql::Rows) -> Result<Option<String>, DbError> {
        match query_rows.next().await? {
            Some(data_row) => {
                let reason = crate::repositories::optional_text(&data_row, 0)?;
                Ok(Some(reason.unwrap_or_else(|| "listed".to_string())))
            }
            None => Ok(None),
        }
    }
}
