// [libs/infra/ai-oracle/src/client.rs]
/*!
 * =================================================================
 * APARATO: AI ORACLE CLIENT (V3.2 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: ADJUDICACIÓN LLM CON FALLBACK GARANTIZADO
 *
 * # Logic:
 * POST del prompt fijo + caso JSON al endpoint generateContent del
 * modelo configurado. Reintento acotado (3 intentos, 1s de respiro)
 * SOLO ante fallos de transporte (red o estado HTTP); un cuerpo 200
 * ilegible o una lista de candidatos vacía corta de inmediato al
 * fallback de agente, sin quemar reintentos. El texto candidato se
 * limpia de cercas de código antes del parseo JSON. Cualquier
 * colapso degrada a HOLD con centinela risk_score=-1 y confianza
 * 0.5. La ausencia de llave corta antes de tocar la red.
 * =================================================================
 */

use crate::prompt::assemble_case_text;
use cerberus_domain_models::{Decision, FeatureBag, Verdict};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Intentos máximos contra el endpoint del modelo.
const MAX_GENERATION_ATTEMPTS: u32 = 3;
/// Respiro entre intentos.
const RETRY_BACKOFF_SECONDS: u64 = 1;
/// Timeout por intento del enlace con el modelo.
const GENERATION_TIMEOUT_SECONDS: u64 = 30;

/// Amenaza reportada cuando la red colapsó todos los intentos.
const THREAT_NETWORK_FAULT: &str = "AI_NET_ERR";
/// Amenaza reportada ante cuerpo ilegible o llave ausente.
const THREAT_AGENT_FAULT: &str = "AI_ERR";

/// Fallo de un intento de generación, segregado por política de reintento.
enum GenerationFault {
    /// Red caída o estado HTTP de rechazo: elegible para reintento.
    Transport(String),
    /// Cuerpo 200 ilegible o lista de candidatos vacía: sin reintento.
    Malformed(String),
}

pub struct AiOracleClient {
    internal_http_session: Client,
    model_api_endpoint: String,
    model_identifier: String,
    model_api_key: Option<String>,
}

impl AiOracleClient {
    /**
     * @param api_endpoint Raíz del servicio de generación.
     * @param model_identifier Modelo alojado a consultar.
     * @param api_key Llave de acceso; vacía o ausente degrada a fallback.
     */
    pub fn new(api_endpoint: String, model_identifier: String, api_key: Option<String>) -> Self {
        Self {
            internal_http_session: Client::builder()
                .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECONDS))
                .user_agent("Cerberus-AI-Oracle/V3.2")
                .build()
                .expect("CRITICAL: Failed to initialize HTTP session"),
            model_api_endpoint: api_endpoint.trim_end_matches('/').to_string(),
            model_identifier,
            model_api_key: api_key.filter(|key| !key.is_empty()),
        }
    }

    /**
     * Adjudica un caso de zona gris. Jamás falla: todo colapso
     * degrada a un veredicto HOLD usable.
     */
    #[instrument(skip(self, features, rule_context))]
    pub async fn adjudicate(&self, features: &FeatureBag, rule_context: Option<&str>) -> Verdict {
        let Some(api_key) = self.model_api_key.clone() else {
            warn!("⚠️ [AI_ORACLE]: API key not configured; fallback HOLD before any network call.");
            return fallback_verdict(THREAT_AGENT_FAULT, "AI agent unavailable: API key not configured.");
        };

        let case_text = assemble_case_text(features, rule_context);
        let generation_url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.model_api_endpoint, self.model_identifier, api_key
        );

        let request_body = json!({
            "contents": [ { "parts": [ { "text": case_text } ] } ]
        });

        for attempt_ordinal in 1..=MAX_GENERATION_ATTEMPTS {
            match self.execute_generation_attempt(&generation_url, &request_body).await {
                Ok(candidate_text) => {
                    return match parse_verdict_text(&candidate_text) {
                        Some(validated_verdict) => {
                            info!(
                                "🧠 [AI_ORACLE]: Verdict {} (score {}) secured on attempt {}.",
                                validated_verdict.decision, validated_verdict.risk_score, attempt_ordinal
                            );
                            validated_verdict
                        }
                        None => {
                            warn!("⚠️ [AI_ORACLE]: Candidate text unparseable; fallback HOLD.");
                            fallback_verdict(THREAT_AGENT_FAULT, "AI agent returned an unparseable verdict.")
                        }
                    };
                }
                // Cuerpo malformado: el transporte funcionó; reintentar
                // solo repetiría la misma respuesta ilegible.
                Err(GenerationFault::Malformed(payload_fault)) => {
                    warn!("⚠️ [AI_ORACLE]: Malformed generation payload, no retry: {}", payload_fault);
                    return fallback_verdict(
                        THREAT_AGENT_FAULT,
                        "AI agent returned a malformed generation payload.",
                    );
                }
                Err(GenerationFault::Transport(transport_fault)) => {
                    warn!(
                        "⚠️ [AI_ORACLE]: Attempt {}/{} failed: {}",
                        attempt_ordinal, MAX_GENERATION_ATTEMPTS, transport_fault
                    );
                    if attempt_ordinal < MAX_GENERATION_ATTEMPTS {
                        tokio::time::sleep(Duration::from_secs(RETRY_BACKOFF_SECONDS)).await;
                    }
                }
            }
        }

        fallback_verdict(THREAT_NETWORK_FAULT, "AI agent unreachable after bounded retries.")
    }

    /// Un intento de generación; retorna el texto del primer candidato.
    async fn execute_generation_attempt(
        &self,
        generation_url: &str,
        request_body: &serde_json::Value,
    ) -> Result<String, GenerationFault> {
        let model_response = self
            .internal_http_session
            .post(generation_url)
            .json(request_body)
            .send()
            .await
            .map_err(|network_fault| {
                GenerationFault::Transport(format!("NETWORK_FAULT: {network_fault}"))
            })?;

        let response_status = model_response.status();
        if !response_status.is_success() {
            return Err(GenerationFault::Transport(format!("HTTP_{}", response_status.as_u16())));
        }

        #[derive(Deserialize)]
        struct GenerationSchema {
            #[serde(default)]
            candidates: Vec<CandidateSchema>,
        }
        #[derive(Deserialize)]
        struct CandidateSchema {
            content: Option<ContentSchema>,
        }
        #[derive(Deserialize)]
        struct ContentSchema {
            #[serde(default)]
            parts: Vec<PartSchema>,
        }
        #[derive(Deserialize)]
        struct PartSchema {
            text: Option<String>,
        }

        let decoded_payload: GenerationSchema = model_response
            .json()
            .await
            .map_err(|decode_fault| {
                GenerationFault::Malformed(format!("BODY_DECODE_FAULT: {decode_fault}"))
            })?;

        decoded_payload
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .filter_map(|part| part.text)
            .next()
            .ok_or_else(|| GenerationFault::Malformed("EMPTY_CANDIDATE_LIST".to_string()))
    }
}

/// Veredicto de degradación: HOLD con centinela de score desconocido.
fn fallback_verdict(primary_threat: &str, narrative: &str) -> Verdict {
    Verdict {
        decision: Decision::Hold,
        primary_threat: primary_threat.to_string(),
        risk_score: -1,
        confidence: Some(0.5),
        narrative: narrative.to_string(),
        rule_alignment: None,
        llm_reasoning: None,
    }
}

/// Retira cercas de código (``` / ```json) que el modelo suele añadir.
fn strip_code_fences(candidate_text: &str) -> &str {
    let trimmed = candidate_text.trim();
    let Some(after_opening) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // La primera línea puede nombrar el lenguaje (```json).
    let fence_body = match after_opening.find('\n') {
        Some(newline_index) => &after_opening[newline_index + 1..],
        None => after_opening,
    };
    fence_body.strip_suffix("```").unwrap_or(fence_body).trim()
}

/// Decodifica y valida el esquema de veredicto del agente.
fn parse_verdict_text(candidate_text: &str) -> Option<Verdict> {
    #[derive(Deserialize)]
    struct RawAgentVerdict {
        decision: Option<String>,
        primary_threat: Option<String>,
        risk_score: Option<f64>,
        confidence: Option<f64>,
        narrative: Option<String>,
        rule_alignment: Option<String>,
    }

    let cleaned_text = strip_code_fences(candidate_text);
    let raw_verdict: RawAgentVerdict = serde_json::from_str(cleaned_text).ok()?;

    let decision = raw_verdict
        .decision
        .as_deref()
        .and_then(Decision::parse)
        .unwrap_or(Decision::Hold);

    let risk_score = raw_verdict
        .risk_score
        .map(|score| score.clamp(0.0, 100.0) as i64)
        .unwrap_or(0);

    debug!("🔎 [AI_ORACLE]: Raw verdict decoded (decision {}).", decision);

    Some(Verdict {
        decision,
        primary_threat: raw_verdict.primary_threat.unwrap_or_else(|| "NONE".to_string()),
        risk_score,
        confidence: raw_verdict.confidence.map(|value| value.clamp(0.0, 1.0)),
        narrative: raw_verdict
            .narrative
            .unwrap_or_else(|| "AI evaluation".to_string()),
        rule_alignment: raw_verdict.rule_alignment,
        llm_reasoning: Some(cleaned_text.to_string()),
    })
}
