// [libs/infra/db-turso/src/repositories/dimensions.rs]
/*!
 * =================================================================
 * APARATO: DIMENSION REPOSITORY (V9.2 - WRITE-ONCE SEAL)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: FRESCURA Y UPSERTS DE LAS DIMENSIONES DE ENRIQUECIMIENTO
 *
 * # Logic:
 * Los upserts son idempotentes (ON CONFLICT por (chain,address)).
 * El sello de error preserva el valor previo de la dimensión; solo
 * muta estado, marca temporal y last_error. 'first_seen_at' aplica
 * COALESCE(existing, excluded): una vez no-NULL, el valor más
 * antiguo sobrevive a todo upsert posterior.
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::{optional_integer, optional_text, parse_storage_timestamp};
use crate::TursoClient;
use cerberus_domain_models::{DestinationAgeDimension, EnrichmentStatus, SanctionsDimension};
use chrono::{DateTime, Utc};
use libsql::{params, Value as SqlValue};
use tracing::{debug, instrument};

pub struct DimensionRepository {
    database_client: TursoClient,
}

/// Frescura observada de una dimensión: estado y última verificación.
pub type DimensionFreshness = Option<(EnrichmentStatus, Option<DateTime<Utc>>)>;

impl DimensionRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    // --- LECTURAS DE FRESCURA ---

    pub async fn sanctions_freshness(&self, chain: &str, address: &str) -> Result<DimensionFreshness, DbError> {
        self.read_freshness("dim_sanctions_address", "sanctions_status", chain, address).await
    }

    pub async fn age_freshness(&self, chain: &str, address: &str) -> Result<DimensionFreshness, DbError> {
        self.read_freshness("dim_destination_age", "age_status", chain, address).await
    }

    // --- SELLOS DE LA DIMENSIÓN DE SANCIONES ---

    #[instrument(skip(self), fields(chain = %chain, address = %address))]
    pub async fn seal_sanctions_checked(
        &self,
        chain: &str,
        address: &str,
        is_sanctioned: bool,
    ) -> Result<(), DbError> {
        let database_connection = self.database_client.get_connection()?;
        database_connection
            .execute(
                "INSERT INTO dim_sanctions_address
                    (chain, address, is_sanctioned, sanctions_status, last_checked_at, last_error)
                 VALUES (?1, ?2, ?3, 'CHECKED', ?4, NULL)
                 ON CONFLICT(chain, address) DO UPDATE SET
                    is_sanctioned = excluded.is_sanctioned,
                    sanctions_status = 'CHECKED',
                    last_checked_at = excluded.last_checked_at,
                    last_error = NULL",
                params![chain, address, is_sanctioned as i64, Utc::now().to_rfc3339()],
            )
            .await?;
        debug!("✅ [DIM_SANCTIONS]: CHECKED sealed (sanctioned={}).", is_sanctioned);
        Ok(())
    }

    /// Sello de fallo: preserva el último valor conocido de la dimensión.
    #[instrument(skip(self, error_text), fields(chain = %chain, address = %address))]
    pub async fn seal_sanctions_error(
        &self,
        chain: &str,
        address: &str,
        error_text: &str,
    ) -> Result<(), DbError> {
        let database_connection = self.database_client.get_connection()?;
        database_connection
            .execute(
                "INSERT INTO dim_sanctions_address
                    (chain, address, sanctions_status, last_checked_at, last_error)
                 VALUES (?1, ?2, 'ERROR', ?3, ?4)
                 ON CONFLICT(chain, address) DO UPDATE SET
                    sanctions_status = 'ERROR',
                    last_checked_at = excluded.last_checked_at,
                    last_error = excluded.last_error",
                params![chain, address, Utc::now().to_rfc3339(), error_text],
            )
            .await?;
        Ok(())
    }

    // --- SELLOS DE LA DIMENSIÓN DE EDAD DE DESTINO ---

    #[instrument(skip(self), fields(chain = %chain, address = %address))]
    pub async fn seal_age_checked(
        &self,
        chain: &str,
        address: &str,
        destination_age_hours: i64,
        first_seen_at: Option<DateTime<Utc>>,
    ) -> Result<(), DbError> {
        let database_connection = self.database_client.get_connection()?;
        database_connection
            .execute(
                "INSERT INTO dim_destination_age
                    (chain, address, destination_age_hours, age_status, first_seen_at, last_checked_at, last_error)
                 VALUES (?1, ?2, ?3, 'CHECKED', ?4, ?5, NULL)
                 ON CONFLICT(chain, address) DO UPDATE SET
                    destination_age_hours = excluded.destination_age_hours,
                    age_status = 'CHECKED',
                    first_seen_at = COALESCE(dim_destination_age.first_seen_at, excluded.first_seen_at),
                    last_checked_at = excluded.last_checked_at,
                    last_error = NULL",
                params![
                    chain,
                    address,
                    destination_age_hours,
                    first_seen_at
                        .map(|stamp| SqlValue::Text(stamp.to_rfc3339()))
                        .unwrap_or(SqlValue::Null),
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        debug!("✅ [DIM_AGE]: CHECKED sealed ({}h).", destination_age_hours);
        Ok(())
    }

    #[instrument(skip(self, error_text), fields(chain = %chain, address = %address))]
    pub async fn seal_age_error(&self, chain: &str, address: &str, error_text: &str) -> Result<(), DbError> {
        let database_connection = self.database_client.get_connection()?;
        database_connection
            .execute(
                "INSERT INTO dim_destination_age
                    (chain, address, age_status, last_checked_at, last_error)
                 VALUES (?1, ?2, 'ERROR', ?3, ?4)
                 ON CONFLICT(chain, address) DO UPDATE SET
                    age_status = 'ERROR',
                    last_checked_at = excluded.last_checked_at,
                    last_error = excluded.last_error",
                params![chain, address, Utc::now().to_rfc3339(), error_text],
            )
            .await?;
        Ok(())
    }

    // --- LECTURAS COMPLETAS (AUDITORÍA / PRUEBAS) ---

    pub async fn read_sanctions_row(
        &self,
        chain: &str,
        address: &str,
    ) -> Result<Option<SanctionsDimension>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_rows = database_connection
            .query(
                "SELECT is_sanctioned, sanctions_status, last_checked_at, last_error
                 FROM dim_sanctions_address WHERE chain = ?1 AND address = ?2",
                params![chain, address],
            )
            .await?;

        match query_rows.next().await? {
            Some(data_row) => {
                let status_label: String = data_row.get(1)?;
                Ok(Some(SanctionsDimension {
                    chain: chain.to_string(),
                    address: address.to_string(),
                    is_sanctioned: data_row.get::<i64>(0)? != 0,
                    sanctions_status: EnrichmentStatus::parse(&status_label).ok_or_else(|| {
                        DbError::MappingError(format!("unknown sanctions_status '{status_label}'"))
                    })?,
                    last_checked_at: optional_text(&data_row, 2)?
                        .as_deref()
                        .and_then(parse_storage_timestamp),
                    last_error: optional_text(&data_row, 3)?,
                }))
            }
            None => Ok(None),
        }
    }

    pub async fn read_age_row(
        &self,
        chain: &str,
        address: &str,
    ) -> Result<Option<DestinationAgeDimension>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_rows = database_connection
            .query(
                "SELECT destination_age_hours, age_status, first_seen_at, last_checked_at, last_error
                 FROM dim_destination_age WHERE chain = ?1 AND address = ?2",
                params![chain, address],
            )
            .await?;

        match query_rows.next().await? {
            Some(data_row) => {
                let status_label: String = data_row.get(1)?;
                Ok(Some(DestinationAgeDimension {
                    chain: chain.to_string(),
                    address: address.to_string(),
                    destination_age_hours: optional_integer(&data_row, 0)?,
                    age_status: EnrichmentStatus::parse(&status_label).ok_or_else(|| {
                        DbError::MappingError(format!("unknown age_status '{status_label}'"))
                    })?,
                    first_seen_at: optional_text(&data_row, 2)?
                        .as_deref()
                        .and_then(parse_storage_timestamp),
                    last_checked_at: optional_text(&data_row, 3)?
                        .as_deref()
                        .and_then(parse_storage_timestamp),
                    last_error: optional_text(&data_row, 4)?,
                }))
            }
            None => Ok(None),
        }
    }

    // --- NÚCLEO COMPARTIDO ---

    async fn read_freshness(
        &self,
        table_name: &str,
        status_column: &str,
        chain: &str,
        address: &str,
    ) -> Result<DimensionFreshness, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let freshness_statement = format!(
            "SELECT {status_column}, last_checked_at FROM {table_name}
             WHERE chain = ?1 AND address = ?2"
        );
        let mut query_rows = database_connection
            .query(&freshness_statement, params![chain, address])
            .await?;

        match query_rows.next().await? {
            Some(data_row) => {
                let status_label: String = data_row.get(0)?;
                let status = EnrichmentStatus::parse(&status_label).ok_or_else(|| {
                    DbError::MappingError(format!("unknown dimension status '{status_label}'"))
                })?;
                let last_checked_at = optional_text(&data_row, 1)?
                    .as_deref()
                    .and_then(parse_storage_timestamp);
                Ok(Some((status, last_checked_at)))
            }
            None => Ok(None),
        }
    }
}
