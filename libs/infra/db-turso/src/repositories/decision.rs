// [libs/infra/db-turso/src/repositories/decision.rs]
/*!
 * =================================================================
 * APARATO: DECISION TRAIL REPOSITORY (V9.1 - DUAL RECORD AWARE)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: RASTRO INMUTABLE DE VEREDICTOS EMITIDOS
 *
 * # Logic:
 * El rastro admite múltiples filas por (user_code, txn_id): las
 * rutas grises escriben dos registros con 'decision_source'
 * distinto. Los lectores agregan por la tripleta y tratan el
 * registro de etapa AI más reciente como veredicto efectivo.
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use cerberus_domain_models::DecisionRecord;
use libsql::{params, Value as SqlValue};
use tracing::{debug, instrument};

pub struct DecisionRepository {
    database_client: TursoClient,
}

impl DecisionRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    /**
     * Sella un registro de decisión en el rastro.
     *
     * # Performance:
     * Operación O(1); el índice (user_code, txn_id) acelera la
     * agregación downstream.
     */
    #[instrument(skip(self, record), fields(user = %record.user_code, source = %record.decision_source))]
    pub async fn insert_record(&self, record: &DecisionRecord) -> Result<(), DbError> {
        let database_connection = self.database_client.get_connection()?;

        database_connection
            .execute(
                "INSERT INTO risk_withdraw_decision
                    (record_id, user_code, txn_id, decision, primary_threat, confidence,
                     narrative, features_snapshot, decision_source, llm_reasoning, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    record.record_identifier.as_str(),
                    record.user_code.as_str(),
                    record.txn_id.as_str(),
                    record.decision.as_str(),
                    record.primary_threat.as_str(),
                    record.confidence,
                    record.narrative.as_str(),
                    record.features_snapshot.as_str(),
                    record.decision_source.as_str(),
                    record
                        .llm_reasoning
                        .clone()
                        .map(SqlValue::Text)
                        .unwrap_or(SqlValue::Null),
                    record.created_at_rfc3339.as_str(),
                ],
            )
            .await?;

        debug!("🧾 [DECISION_TRAIL]: Record sealed ({}).", record.decision_source);
        Ok(())
    }

    /// Rastro (decision, source) de un sujeto, en orden de inserción.
    pub async fn fetch_trail(
        &self,
        user_code: &str,
        txn_id: &str,
    ) -> Result<Vec<(String, String)>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_rows = database_connection
            .query(
                "SELECT decision, decision_source FROM risk_withdraw_decision
                 WHERE user_code = ?1 AND txn_id = ?2
                 ORDER BY rowid ASC",
                params![user_code, txn_id],
            )
            .await?;

        let mut trail = Vec::new();
        while let Some(data_row) = query_rows.next().await? {
            trail.push((data_row.get(0)?, data_row.get(1)?));
        }
        Ok(trail)
    }
}
