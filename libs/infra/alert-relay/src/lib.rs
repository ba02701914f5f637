// [libs/infra/alert-relay/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ALERT RELAY CLIENT (V2.3 - TOLERATED FAILURE)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: TARJETAS DE ALERTA AL WEBHOOK DE CHAT
 *
 * # Logic:
 * El canal lateral dispara exclusivamente para HOLD/REJECT y jamás
 * afecta al veredicto ni a su persistencia: todo fallo de red se
 * captura y se registra. URL ausente silencia el relé por completo.
 * =================================================================
 */

use cerberus_domain_models::{Decision, DecisionResponse, FeatureBag};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Timeout del enlace con el webhook de chat.
const WEBHOOK_TIMEOUT_SECONDS: u64 = 2;

pub struct AlertRelayClient {
    internal_http_session: Client,
    webhook_endpoint: Option<String>,
}

impl AlertRelayClient {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            internal_http_session: Client::builder()
                .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECONDS))
                .user_agent("Cerberus-Alert-Relay/V2.3")
                .build()
                .expect("CRITICAL: Failed to initialize HTTP session"),
            webhook_endpoint: webhook_url.filter(|url| !url.is_empty()),
        }
    }

    /**
     * Despacha la tarjeta de alerta del veredicto.
     *
     * Solo HOLD/REJECT generan tráfico; PASS retorna en silencio.
     * El fallo del webhook se tolera con rastro.
     */
    #[instrument(skip(self, verdict_payload, features), fields(user = %verdict_payload.user_code))]
    pub async fn dispatch_verdict_card(
        &self,
        verdict_payload: &DecisionResponse,
        features: Option<&FeatureBag>,
    ) {
        if !verdict_payload.decision.is_alertable() {
            return;
        }

        let Some(webhook_url) = &self.webhook_endpoint else {
            debug!("🔕 [ALERT_RELAY]: Webhook not configured; card suppressed.");
            return;
        };

        let card_body = build_interactive_card(verdict_payload, features);

        match self.internal_http_session.post(webhook_url).json(&card_body).send().await {
            Ok(webhook_response) if webhook_response.status().is_success() => {
                debug!("📣 [ALERT_RELAY]: Card delivered ({}).", verdict_payload.decision);
            }
            Ok(webhook_response) => {
                warn!(
                    "⚠️ [ALERT_RELAY]: Webhook rejected the card (HTTP_{}); verdict unaffected.",
                    webhook_response.status().as_u16()
                );
            }
            Err(delivery_fault) => {
                warn!("⚠️ [ALERT_RELAY]: Card delivery failed; verdict unaffected: {}", delivery_fault);
            }
        }
    }
}

/// Tarjeta interactiva con los campos mínimos del contrato de alerta.
fn build_interactive_card(
    verdict_payload: &DecisionResponse,
    features: Option<&FeatureBag>,
) -> serde_json::Value {
    let (decision_emoji, header_template) = match verdict_payload.decision {
        Decision::Reject => ("⛔", "red"),
        Decision::Hold => ("⚠️", "orange"),
        Decision::Pass => ("✅", "green"),
    };

    let token_label = features
        .and_then(FeatureBag::withdraw_currency)
        .unwrap_or("-");
    let amount_label = features
        .and_then(FeatureBag::withdrawal_amount)
        .map(|amount| amount.to_string())
        .unwrap_or_else(|| "-".to_string());
    let first_reason = verdict_payload
        .reasons
        .first()
        .map(String::as_str)
        .unwrap_or("(no reason recorded)");

    json!({
        "msg_type": "interactive",
        "card": {
            "header": {
                "title": {
                    "tag": "plain_text",
                    "content": format!(
                        "{} Withdrawal {} [{}]",
                        decision_emoji, verdict_payload.decision, verdict_payload.source
                    )
                },
                "template": header_template
            },
            "elements": [
                {
                    "tag": "div",
                    "text": {
                        "tag": "lark_md",
                        "content": format!(
                            "**User:** {}\n**Txn:** {}\n**Token:** {}\n**Amount:** {}\n**Threat:** {}\n**Score:** {}\n**Reason:** {}",
                            verdict_payload.user_code,
                            verdict_payload.txn_id.as_deref().unwrap_or("-"),
                            token_label,
                            amount_label,
                            verdict_payload.primary_threat,
                            verdict_payload.risk_score,
                            first_reason
                        )
                    }
                }
            ]
        }
    })
}
