// [libs/infra/db-turso/src/repositories/history.rs]
/*!
 * =================================================================
 * APARATO: BEHAVIORAL HISTORY REPOSITORY (V9.1)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: EVENTOS DE DISPOSITIVO Y LOGIN PARA RASGOS DERIVADOS
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::{optional_text, parse_storage_timestamp};
use crate::TursoClient;
use cerberus_domain_models::DeviceEvent;
use chrono::{DateTime, Utc};
use libsql::params;
use tracing::instrument;

pub struct HistoryRepository {
    database_client: TursoClient,
}

impl HistoryRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    /// Último evento de dispositivo de tipo WITHDRAW del usuario.
    #[instrument(skip(self), fields(user = %user_code))]
    pub async fn latest_withdraw_device_event(
        &self,
        user_code: &str,
    ) -> Result<Option<DeviceEvent>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_rows = database_connection
            .query(
                "SELECT user_code, country_code, is_vpn, event_time FROM user_device
                 WHERE user_code = ?1 AND event_type = 'WITHDRAW'
                 ORDER BY datetime(event_time) DESC LIMIT 1",
                params![user_code],
            )
            .await?;

        Self::first_device_event(&mut query_rows).await
    }

    /// Evento de dispositivo inmediatamente anterior a la marca dada.
    pub async fn prior_device_event(
        &self,
        user_code: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<DeviceEvent>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_rows = database_connection
            .query(
                "SELECT user_code, country_code, is_vpn, event_time FROM user_device
                 WHERE user_code = ?1 AND datetime(event_time) < datetime(?2)
                 ORDER BY datetime(event_time) DESC LIMIT 1",
                params![user_code, before.to_rfc3339()],
            )
            .await?;

        Self::first_device_event(&mut query_rows).await
    }

    /// Login más reciente en o antes de la marca dada.
    pub async fn latest_login_at_or_before(
        &self,
        user_code: &str,
        reference: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_rows = database_connection
            .query(
                "SELECT login_time FROM login_history
                 WHERE user_code = ?1 AND datetime(login_time) <= datetime(?2)
                 ORDER BY datetime(login_time) DESC LIMIT 1",
                params![user_code, reference.to_rfc3339()],
            )
            .await?;

        match query_rows.next().await? {
            Some(data_row) => {
                let raw_timestamp: String = data_row.get(0)?;
                Ok(parse_storage_timestamp(&raw_timestamp))
            }
            None => Ok(None),
        }
    }

    /// Marca de creación del retiro (ancla del rasgo de tiempo de login).
    pub async fn withdraw_creation_time(
        &self,
        user_code: &str,
        txn_id: &str,
    ) -> Result<Option<DateTime<Utc>>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_rows = database_connection
            .query(
                "SELECT created_at FROM withdraw_record
                 WHERE user_code = ?1 AND txn_id = ?2 LIMIT 1",
                params![user_code, txn_id],
            )
            .await?;

        match query_rows.next().await? {
            Some(data_row) => {
                let raw_timestamp = optional_text(&data_row, 0)?;
                Ok(raw_timestamp.as_deref().and_then(parse_storage_timestamp))
            }
            None => Ok(None),
        }
    }

    async fn first_device_event(query_rows: &mut libsql::Rows) -> Result<Option<DeviceEvent>, DbError> {
        match query_rows.next().await? {
            Some(data_row) => {
                let raw_event_time: String = data_row.get(3)?;
                let event_time = parse_storage_timestamp(&raw_event_time).ok_or_else(|| {
                    DbError::MappingError(format!("unreadable event_time '{raw_event_time}'"))
                })?;
                Ok(Some(DeviceEvent {
                    user_code: data_row.get(0)?,
                    country_code: optional_text(&data_row, 1)?,
                    is_vpn: data_row.get::<i64>(2)? != 0,
                    event_time,
                }))
            }
            None => Ok(None),
        }
    }
}
