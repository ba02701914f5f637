// [libs/domain/models-rs/src/rule.rs]
/*!
 * =================================================================
 * APARATO: DYNAMIC RULE CONTRACT (V5.0 - FIRST MATCH WINS)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DE REGLA CARGADA DESDE 'risk_rules'
 * =================================================================
 */

use crate::verdict::Decision;
use serde::{Deserialize, Serialize};

/// Acción declarada por una regla dinámica al disparar su expresión.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleAction {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "REJECT")]
    Reject,
}

impl RuleAction {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "PASS" => Some(RuleAction::Pass),
            "HOLD" => Some(RuleAction::Hold),
            "REJECT" => Some(RuleAction::Reject),
            _ => None,
        }
    }

    pub fn as_decision(&self) -> Decision {
        match self {
            RuleAction::Pass => Decision::Pass,
            RuleAction::Hold => Decision::Hold,
            RuleAction::Reject => Decision::Reject,
        }
    }
}

/**
 * Regla dinámica del motor de expresiones.
 *
 * El orden de evaluación es 'priority' ascendente con desempate estable
 * por 'rule_id'; la primera expresión verdadera gana.
 */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRule {
    pub rule_id: i64,
    pub rule_name: String,
    pub priority: i64,
    /// Expresión booleana pura sobre nombres de atributos (sin efectos).
    pub logic_expression: String,
    pub action: RuleAction,
    pub narrative: String,
}

impl RiskRule {
    /// Narrativa de disparo con el prefijo de auditoría nominal.
    pub fn hit_narrative(&self) -> String {
        format!("[Rule #{}] {}", self.rule_id, self.narrative)
    }
}
