// [libs/domain/models-rs/src/verdict.rs]
/*!
 * =================================================================
 * APARATO: VERDICT CONTRACTS (V5.3 - DUAL RECORD READY)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN DE VEREDICTOS Y RASTRO DE DECISIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TERMINAL SEMANTICS: Un 'Verdict' detiene la cascada; la fuente
 *    ('decision_source') identifica la etapa emisora.
 * 2. DUAL RECORD: Las rutas grises (greylist / regla-HOLD) producen
 *    dos registros por solicitud con fuentes distintas; los lectores
 *    agregan por (user_code, txn_id, decision_source).
 * 3. CONFIDENCE ALGEBRA: La confianza explícita se fija a [0,1]; en
 *    su ausencia se deriva de risk_score con el centinela negativo
 *    (-1) mapeando a 1.0 (regla dura, no probabilística).
 * =================================================================
 */

use crate::feature::FeatureBag;
use serde::{Deserialize, Serialize};

/// Veredicto terminal de la cascada de decisión.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "REJECT")]
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Pass => "PASS",
            Decision::Hold => "HOLD",
            Decision::Reject => "REJECT",
        }
    }

    /// Interpretación laxa de etiquetas externas (LLM / almacenamiento).
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "PASS" => Some(Decision::Pass),
            "HOLD" => Some(Decision::Hold),
            "REJECT" => Some(Decision::Reject),
            _ => None,
        }
    }

    /// Los veredictos de retención y rechazo disparan la tarjeta de alerta.
    pub fn is_alertable(&self) -> bool {
        matches!(self, Decision::Hold | Decision::Reject)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/**
 * Veredicto de una etapa de la cascada (o del agente de IA).
 *
 * 'risk_score' admite el centinela -1 ("desconocido") para los fallbacks
 * del agente; todo consumidor debe tratar valores negativos como no
 * probabilísticos.
 */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub decision: Decision,
    pub primary_threat: String,
    pub risk_score: i64,
    /// Confianza explícita [0,1]; None => derivar de risk_score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub narrative: String,
    /// Alineación con la regla disparadora, reportada por el agente.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_alignment: Option<String>,
    /// Razonamiento literal del LLM (solo rutas de agente).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_reasoning: Option<String>,
}

impl Verdict {
    /// Constructor nominal para veredictos deterministas de etapa.
    pub fn stage(decision: Decision, primary_threat: &str, risk_score: i64, narrative: String) -> Self {
        Self {
            decision,
            primary_threat: primary_threat.to_string(),
            risk_score,
            confidence: None,
            narrative,
            rule_alignment: None,
            llm_reasoning: None,
        }
    }

    /**
     * Confianza efectiva del veredicto.
     *
     * Explícita => fijada a [0,1]. Derivada => max(0, risk_score)/100,
     * con el centinela negativo colapsando a 1.0.
     */
    pub fn effective_confidence(&self) -> f64 {
        if let Some(explicit_confidence) = self.confidence {
            return explicit_confidence.clamp(0.0, 1.0);
        }
        if self.risk_score < 0 {
            return 1.0;
        }
        (self.risk_score.min(100) as f64) / 100.0
    }
}

/// Fila persistida en 'risk_withdraw_decision' por cada veredicto emitido.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub record_identifier: String,
    pub user_code: String,
    pub txn_id: String,
    pub decision: Decision,
    pub primary_threat: String,
    pub confidence: f64,
    pub narrative: String,
    /// Serialización JSON de la bolsa de atributos al momento del registro.
    pub features_snapshot: String,
    /// Etiqueta de la etapa emisora (contrato de agregación downstream).
    pub decision_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_reasoning: Option<String>,
    pub created_at_rfc3339: String,
}

impl DecisionRecord {
    /// Materializa la fila de rastro desde un veredicto y el snapshot vivo.
    pub fn from_verdict(
        user_code: &str,
        txn_id: &str,
        verdict: &Verdict,
        features: &FeatureBag,
        decision_source: &str,
    ) -> Self {
        Self {
            record_identifier: uuid::Uuid::new_v4().to_string(),
            user_code: user_code.to_string(),
            txn_id: txn_id.to_string(),
            decision: verdict.decision,
            primary_threat: verdict.primary_threat.clone(),
            confidence: verdict.effective_confidence(),
            narrative: verdict.narrative.clone(),
            features_snapshot: features.snapshot_json(),
            decision_source: decision_source.to_string(),
            llm_reasoning: verdict.llm_reasoning.clone(),
            created_at_rfc3339: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Cuerpo de respuesta del perímetro HTTP (código 200 para todo veredicto).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub user_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_id: Option<String>,
    pub decision: Decision,
    pub reasons: Vec<String>,
    pub primary_threat: String,
    pub risk_score: i64,
    pub source: String,
}

impl DecisionResponse {
    pub fn from_verdict(user_code: &str, txn_id: Option<&str>, verdict: &Verdict, source: &str) -> Self {
        Self {
            user_code: user_code.to_string(),
            txn_id: txn_id.map(str::to_string),
            decision: verdict.decision,
            reasons: vec![verdict.narrative.clone()],
            primary_threat: verdict.primary_threat.clone(),
            risk_score: verdict.risk_score,
            source: source.to_string(),
        }
    }
}
