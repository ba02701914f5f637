// [libs/infra/db-turso/src/repositories/features.rs]
/*!
 * =================================================================
 * APARATO: FEATURE REPOSITORY (V9.3 - RACE TOLERANT)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: LECTURA DE LA BOLSA DE ATRIBUTOS Y WRITE-BACK
 *
 * # Logic:
 * 'risk_features' la escribe un job de streaming que corre en
 * paralelo con la solicitud de decisión. La lectura exacta reintenta
 * con retardo acotado; agotados los intentos cae a la fila más
 * reciente del usuario. El mapeo fila -> bolsa es dinámico por
 * columna: el esquema del job upstream es opaco para este estrato.
 *
 * El write-back de rasgos derivados es best-effort sobre una lista
 * blanca de columnas; un fallo se registra y se ignora.
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use cerberus_domain_models::FeatureBag;
use libsql::{params, params_from_iter, Rows, Value as SqlValue};
use serde_json::{Map, Value as JsonValue};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Columnas derivadas admitidas por el write-back en caliente.
const WRITE_BACK_COLUMNS: &[&str] = &[
    "is_impossible_travel",
    "time_since_user_login",
    "destination_age_hours",
    "is_sanctioned",
];

pub struct FeatureRepository {
    database_client: TursoClient,
}

impl FeatureRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    /**
     * Lectura exacta por (user_code, txn_id) con reintento acotado.
     *
     * Fallos de consulta cuentan como ausencia (la política de la
     * cascada trata el fallo de lectura igual que la fila ausente).
     */
    #[instrument(skip(self), fields(user = %user_code, txn = %txn_id))]
    pub async fn fetch_with_retry(
        &self,
        user_code: &str,
        txn_id: &str,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Option<FeatureBag> {
        for attempt_ordinal in 1..=max_retries {
            match self.fetch_exact(user_code, txn_id).await {
                Ok(Some(feature_bag)) => {
                    debug!("📥 [FEATURES]: Exact row secured on attempt {}.", attempt_ordinal);
                    return Some(feature_bag);
                }
                Ok(None) => {
                    debug!("⏳ [FEATURES]: Row not yet visible (attempt {}).", attempt_ordinal);
                }
                Err(query_fault) => {
                    warn!("⚠️ [FEATURES]: Read fault treated as absence: {}", query_fault);
                }
            }
            if attempt_ordinal < max_retries {
                tokio::time::sleep(retry_delay).await;
            }
        }
        None
    }

    /// Lectura exacta sin reintento.
    pub async fn fetch_exact(&self, user_code: &str, txn_id: &str) -> Result<Option<FeatureBag>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let query_rows = database_connection
            .query(
                "SELECT * FROM risk_features WHERE user_code = ?1 AND txn_id = ?2",
                params![user_code, txn_id],
            )
            .await?;
        Self::first_row_as_bag(query_rows).await
    }

    /// Fila más reciente del usuario (fallback de carrera perdida).
    #[instrument(skip(self), fields(user = %user_code))]
    pub async fn fetch_latest_for_user(&self, user_code: &str) -> Result<Option<FeatureBag>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let query_rows = database_connection
            .query(
                "SELECT * FROM risk_features WHERE user_code = ?1 ORDER BY update_time DESC LIMIT 1",
                params![user_code],
            )
            .await?;

        let fallback_bag = Self::first_row_as_bag(query_rows).await?;
        if fallback_bag.is_some() {
            info!("🔁 [FEATURES]: Fallback to latest row for user {}.", user_code);
        }
        Ok(fallback_bag)
    }

    /**
     * Write-back best-effort de columnas derivadas (lista blanca).
     * Columnas fuera de la lista se descartan con rastro.
     */
    #[instrument(skip(self, derived_updates), fields(user = %user_code, txn = %txn_id))]
    pub async fn write_back_derived(
        &self,
        user_code: &str,
        txn_id: &str,
        derived_updates: &[(&str, SqlValue)],
    ) -> Result<(), DbError> {
        let admitted_updates: Vec<&(&str, SqlValue)> = derived_updates
            .iter()
            .filter(|(column_name, _)| {
                let admitted = WRITE_BACK_COLUMNS.contains(column_name);
                if !admitted {
                    warn!("⚠️ [FEATURES]: Column '{}' outside the write-back whitelist, dropped.", column_name);
                }
                admitted
            })
            .collect();

        if admitted_updates.is_empty() {
            return Ok(());
        }

        let assignment_clause = admitted_updates
            .iter()
            .enumerate()
            .map(|(index, (column_name, _))| format!("{} = ?{}", column_name, index + 1))
            .collect::<Vec<_>>()
            .join(", ");

        let update_statement = format!(
            "UPDATE risk_features SET {} WHERE user_code = ?{} AND txn_id = ?{}",
            assignment_clause,
            admitted_updates.len() + 1,
            admitted_updates.len() + 2,
        );

        let mut parameter_values: Vec<SqlValue> = admitted_updates
            .iter()
            .map(|(_, sql_value)| sql_value.clone())
            .collect();
        parameter_values.push(SqlValue::Text(user_code.to_string()));
        parameter_values.push(SqlValue::Text(txn_id.to_string()));

        let database_connection = self.database_client.get_connection()?;
        database_connection
            .execute(&update_statement, params_from_iter(parameter_values))
            .await?;

        debug!("📝 [FEATURES]: {} derived columns written back.", admitted_updates.len());
        Ok(())
    }

    /// Mapeo dinámico fila -> bolsa (el esquema upstream es opaco).
    async fn first_row_as_bag(mut query_rows: Rows) -> Result<Option<FeatureBag>, DbError> {
        let column_count = query_rows.column_count();
        let column_names: Vec<String> = (0..column_count)
            .map(|index| {
                query_rows
                    .column_name(index)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("column_{index}"))
            })
            .collect();

        let Some(data_row) = query_rows.next().await? else {
            return Ok(None);
        };

        let mut attribute_map = Map::new();
        for (index, column_name) in column_names.iter().enumerate() {
            let raw_value = data_row.get_value(index as i32)?;
            let json_value = match raw_value {
                SqlValue::Null => JsonValue::Null,
                SqlValue::Integer(integer_value) => JsonValue::from(integer_value),
                SqlValue::Real(real_value) => serde_json::Number::from_f64(real_value)
                    .map(JsonValue::Number)
                    .unwrap_or(JsonValue::Null),
                SqlValue::Text(text_value) => JsonValue::String(text_value),
                // Blobs no son escalares de la bolsa; colapsan a NULL.
                SqlValue::Blob(_) => JsonValue::Null,
            };
            attribute_map.insert(column_name.clone(), json_value);
        }

        Ok(Some(FeatureBag::from_map(attribute_map)))
    }
}
