// [libs/infra/db-turso/src/repositories/rules.rs]
/*!
 * =================================================================
 * APARATO: RULES REPOSITORY (V9.0)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CARGA ORDENADA DE REGLAS DINÁMICAS ACTIVAS
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::optional_text;
use crate::TursoClient;
use cerberus_domain_models::{RiskRule, RuleAction};
use tracing::{instrument, warn};

pub struct RulesRepository {
    database_client: TursoClient,
}

impl RulesRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    /**
     * Reglas ACTIVE en orden (priority ASC, rule_id ASC).
     *
     * Filas con acción fuera del vocabulario {PASS,HOLD,REJECT} se
     * descartan con rastro; no contaminan el set evaluable.
     */
    #[instrument(skip(self))]
    pub async fn fetch_active_ordered(&self) -> Result<Vec<RiskRule>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_rows = database_connection
            .query(
                "SELECT rule_id, rule_name, priority, logic_expression, action, narrative
                 FROM risk_rules
                 WHERE status = 'ACTIVE'
                 ORDER BY priority ASC, rule_id ASC",
                (),
            )
            .await?;

        let mut active_rules = Vec::new();
        while let Some(data_row) = query_rows.next().await? {
            let rule_id: i64 = data_row.get(0)?;
            let action_label: String = data_row.get(4)?;

            let Some(action) = RuleAction::parse(&action_label) else {
                warn!(rule_id, "⚠️ [RULES]: Unknown action '{}', rule dropped.", action_label);
                continue;
            };

            active_rules.push(RiskRule {
                rule_id,
                rule_name: data_row.get(1)?,
                priority: data_row.get(2)?,
                logic_expression: data_row.get(3)?,
                action,
                narrative: optional_text(&data_row, 5)?.unwrap_or_default(),
            });
        }

        Ok(active_rules)
    }
}
