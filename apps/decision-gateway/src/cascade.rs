// [apps/decision-gateway/src/cascade.rs]
/*!
 * =================================================================
 * APARATO: DECISION CASCADE (V4.4 - FROZEN ORDER)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: PIPELINE DETERMINISTA DE VEREDICTOS DE RETIRO
 *
 * # Logic:
 * El orden de etapas es contrato:
 *   1. allow-list usuario        -> PASS
 *   2. allow-list dirección      -> PASS
 *   3. atajo de bajo riesgo      -> PASS
 *   4. rasgos derivados          (no terminal, best-effort)
 *   5. sanciones + edad destino  -> REJECT si sancionada
 *   6. blacklists                -> REJECT
 *   7. greylist (+IA)            -> veredicto del agente
 *   8. reglas dinámicas (+IA)    -> acción de la regla / agente
 *   9. PASS por defecto
 *
 * NOTA DE POLÍTICA: la allow-list de usuario precede al screening
 * de sanciones; un usuario allow-listed hacia una dirección
 * sancionada recibe PASS. Es una perilla operativa documentada; no
 * reordenar en silencio.
 *
 * Un fallo dentro de una etapa no terminal se registra y la cascada
 * continúa; solo los veredictos terminales la detienen. En rutas
 * grises el registro de la regla y su alerta preceden SIEMPRE a la
 * llamada del agente.
 * =================================================================
 */

use crate::derived;
use crate::ingress::ExtractedSubject;
use crate::sources;
use crate::state::AppState;
use cerberus_domain_models::{
    Decision, DecisionRecord, DecisionResponse, FeatureBag, GreylistEntityType, Verdict,
};
use libsql::Value as SqlValue;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

/**
 * Ejecuta la cascada completa para un sujeto extraído.
 * Siempre produce exactamente una respuesta.
 */
#[instrument(skip(state, subject), fields(user = %subject.user_code))]
pub async fn run_decision_cascade(state: &AppState, subject: &ExtractedSubject) -> DecisionResponse {
    let user_code = subject.user_code.as_str();

    // ==========================
    // FASE 0: FETCH DE FEATURES (carrera contra el job de streaming)
    // ==========================
    let fetched_features = fetch_features(state, subject).await;

    let Some(mut features) = fetched_features else {
        return seal_no_data_verdict(state, subject).await;
    };

    let final_txn_id = features
        .txn_id()
        .map(str::to_string)
        .or_else(|| subject.txn_id.clone())
        .unwrap_or_else(|| "unknown".to_string());

    // El snapshot siempre porta la identidad del sujeto.
    features.set("user_code", json!(user_code));
    features.set("txn_id", json!(final_txn_id));

    let txn_id = final_txn_id.as_str();

    // ==========================
    // ETAPA 1: ALLOW-LIST DE USUARIO
    // ==========================
    match state.list_repository.lookup_user_allow(user_code).await {
        Ok(Some(allow_reason)) => {
            let verdict = Verdict::stage(
                Decision::Pass,
                "NONE",
                0,
                format!("User allow-list hit: {allow_reason}"),
            );
            return seal_terminal_verdict(state, user_code, txn_id, &verdict, sources::SRC_WHITELIST_USER, &features, false).await;
        }
        Ok(None) => {}
        Err(list_fault) => warn!("⚠️ [CASCADE]: User allow-list stage degraded: {}", list_fault),
    }

    // ==========================
    // ETAPA 2: ALLOW-LIST DE DIRECCIÓN (chain-scoped)
    // ==========================
    if let Some(destination_address) = features.destination_address().map(str::to_string) {
        match state
            .list_repository
            .lookup_address_allow(&destination_address, features.chain())
            .await
        {
            Ok(Some(allow_reason)) => {
                let verdict = Verdict::stage(
                    Decision::Pass,
                    "NONE",
                    0,
                    format!("Destination allow-list hit: {allow_reason}"),
                );
                return seal_terminal_verdict(state, user_code, txn_id, &verdict, sources::SRC_WHITELIST_ADDRESS, &features, false).await;
            }
            Ok(None) => {}
            Err(list_fault) => warn!("⚠️ [CASCADE]: Address allow-list stage degraded: {}", list_fault),
        }
    }

    // ==========================
    // ETAPA 3: ATAJO DE BAJO RIESGO
    // ==========================
    if let Some(true) = evaluate_low_risk_shortcut(&features) {
        let verdict = Verdict::stage(
            Decision::Pass,
            "NONE",
            0,
            "Low-risk behavioral profile. Shortcut PASS.".to_string(),
        );
        return seal_terminal_verdict(state, user_code, txn_id, &verdict, sources::SRC_LOW_RISK, &features, false).await;
    }

    // ==========================
    // ETAPA 4: RASGOS DERIVADOS (best-effort, no terminal)
    // ==========================
    enrich_derived_features(state, user_code, txn_id, &mut features).await;

    // ==========================
    // ETAPA 5: SANCIONES + EDAD DE DESTINO
    // ==========================
    if let Some(destination_address) = features.destination_address().map(str::to_string) {
        enrich_destination_age(state, user_code, txn_id, &destination_address, &mut features).await;

        if state.sanctions_client.check_sanctions(&destination_address).await {
            features.set("is_sanctioned", json!(true));
            write_back_best_effort(
                state,
                user_code,
                txn_id,
                &[("is_sanctioned", SqlValue::Integer(1))],
            )
            .await;

            let verdict = Verdict::stage(
                Decision::Reject,
                "SANCTIONS",
                100,
                "Destination address flagged by sanctions screening.".to_string(),
            );
            return seal_terminal_verdict(state, user_code, txn_id, &verdict, sources::SRC_SANCTIONS, &features, true).await;
        }
    }

    // ==========================
    // ETAPA 6: BLACKLISTS (primer disparo gana)
    // ==========================
    if let Some(deny_narrative) = probe_blacklists(state, &features).await {
        let verdict = Verdict::stage(Decision::Reject, "BLACKLIST", 100, deny_narrative);
        return seal_terminal_verdict(state, user_code, txn_id, &verdict, sources::SRC_BLACKLIST, &features, true).await;
    }

    // ==========================
    // ETAPA 7: GREYLIST (+ SEGUNDA OPINIÓN DEL AGENTE)
    // ==========================
    if let Some(grey_narrative) = probe_greylist(state, &features).await {
        let grey_verdict = Verdict::stage(Decision::Hold, "GREYLIST", 80, grey_narrative.clone());

        // Contrato de orden: registro + alerta de la etapa gris ANTES del agente.
        seal_record_best_effort(state, user_code, txn_id, &grey_verdict, sources::SRC_GREYLIST, &features).await;
        let grey_payload =
            DecisionResponse::from_verdict(user_code, Some(txn_id), &grey_verdict, sources::SRC_GREYLIST);
        state.alert_relay.dispatch_verdict_card(&grey_payload, Some(&features)).await;

        let agent_verdict = state.ai_oracle.adjudicate(&features, Some(&grey_narrative)).await;
        seal_record_best_effort(state, user_code, txn_id, &agent_verdict, sources::SRC_AI_GREYLIST, &features).await;

        info!(
            "⚖️ [CASCADE]: Greylist adjudicated by agent: {} ({}).",
            agent_verdict.decision, agent_verdict.primary_threat
        );
        return DecisionResponse::from_verdict(user_code, Some(txn_id), &agent_verdict, sources::SRC_AI_GREYLIST);
    }

    // ==========================
    // ETAPA 8: REGLAS DINÁMICAS (+ AGENTE EN HOLD)
    // ==========================
    refresh_rules_if_stale(state).await;

    if let Some(rule_hit) = state.rules_cache.evaluate(&features) {
        let rule_verdict = Verdict::stage(
            rule_hit.rule.action.as_decision(),
            "RULE_HIT",
            100,
            rule_hit.rule.hit_narrative(),
        );

        match rule_verdict.decision {
            Decision::Pass => {
                return seal_terminal_verdict(state, user_code, txn_id, &rule_verdict, sources::SRC_RULES, &features, false).await;
            }
            Decision::Reject => {
                return seal_terminal_verdict(state, user_code, txn_id, &rule_verdict, sources::SRC_RULES, &features, true).await;
            }
            Decision::Hold => {
                // Registro + alerta de la regla ANTES de la llamada del agente.
                seal_record_best_effort(state, user_code, txn_id, &rule_verdict, sources::SRC_RULES, &features).await;
                let hold_payload =
                    DecisionResponse::from_verdict(user_code, Some(txn_id), &rule_verdict, sources::SRC_RULES);
                state.alert_relay.dispatch_verdict_card(&hold_payload, Some(&features)).await;

                let rule_context = rule_verdict.narrative.clone();
                let agent_verdict = state.ai_oracle.adjudicate(&features, Some(&rule_context)).await;
                seal_record_best_effort(state, user_code, txn_id, &agent_verdict, sources::SRC_AI_RULE_HOLD, &features).await;

                info!(
                    "⚖️ [CASCADE]: Rule HOLD adjudicated by agent: {} ({}).",
                    agent_verdict.decision, agent_verdict.primary_threat
                );
                return DecisionResponse::from_verdict(user_code, Some(txn_id), &agent_verdict, sources::SRC_AI_RULE_HOLD);
            }
        }
    }

    // ==========================
    // ETAPA 9: PASS POR DEFECTO
    // ==========================
    let default_verdict = Verdict::stage(
        Decision::Pass,
        "NONE",
        0,
        "No whitelist/blacklist/greylist or dynamic rule triggered. Default PASS.".to_string(),
    );
    seal_terminal_verdict(state, user_code, txn_id, &default_verdict, sources::SRC_DEFAULT_PASS, &features, false).await
}

// =================================================================
// FASE 0: FETCH
// =================================================================

async fn fetch_features(state: &AppState, subject: &ExtractedSubject) -> Option<FeatureBag> {
    if let Some(txn_id) = &subject.txn_id {
        if let Some(exact_bag) = state
            .feature_repository
            .fetch_with_retry(
                &subject.user_code,
                txn_id,
                state.feature_fetch_max_retries,
                state.feature_fetch_retry_delay,
            )
            .await
        {
            return Some(exact_bag);
        }
    }

    match state.feature_repository.fetch_latest_for_user(&subject.user_code).await {
        Ok(fallback_bag) => fallback_bag,
        Err(fallback_fault) => {
            warn!("⚠️ [CASCADE]: Fallback feature fetch failed: {}", fallback_fault);
            None
        }
    }
}

/// Veredicto terminal de ausencia de datos (HOLD seguro + alerta).
async fn seal_no_data_verdict(state: &AppState, subject: &ExtractedSubject) -> DecisionResponse {
    warn!(
        "🕳️ [CASCADE]: No risk_features for user={}, txn={:?}; safety HOLD.",
        subject.user_code, subject.txn_id
    );

    let verdict = Verdict::stage(
        Decision::Hold,
        "UNKNOWN",
        0,
        "Risk data not found in risk_features.".to_string(),
    );

    let empty_snapshot = FeatureBag::new();
    seal_record_best_effort(
        state,
        &subject.user_code,
        subject.txn_id.as_deref().unwrap_or("unknown"),
        &verdict,
        sources::SRC_NO_DATA,
        &empty_snapshot,
    )
    .await;

    let mut response = DecisionResponse::from_verdict(
        &subject.user_code,
        subject.txn_id.as_deref(),
        &verdict,
        sources::SRC_NO_DATA,
    );
    response.reasons = vec!["Risk Data Not Found".to_string()];

    state.alert_relay.dispatch_verdict_card(&response, None).await;
    response
}

// =================================================================
// ETAPA 3: PREDICADO DE BAJO RIESGO
// =================================================================

/**
 * Predicado del atajo: perfil conductual estable y monto menor.
 * Cualquier rasgo requerido ausente inhibe el atajo (None).
 */
fn evaluate_low_risk_shortcut(features: &FeatureBag) -> Option<bool> {
    let is_new_device = features.flag("is_new_device")?;
    let is_new_ip = features.flag("is_new_ip")?;
    let is_new_destination = features.flag("is_new_destination_address")?;
    let account_maturity = features.account_maturity_days()?;
    let withdrawal_amount = features.withdrawal_amount()?;

    Some(
        !is_new_device
            && !is_new_ip
            && !is_new_destination
            && account_maturity > 7.0
            && withdrawal_amount < 5000.0,
    )
}

// =================================================================
// ETAPA 4/5: ENRIQUECIMIENTO EN LÍNEA
// =================================================================

async fn enrich_derived_features(state: &AppState, user_code: &str, txn_id: &str, features: &mut FeatureBag) {
    let is_impossible_travel =
        derived::compute_impossible_travel(&state.history_repository, user_code).await;
    let time_since_login =
        derived::compute_time_since_login(&state.history_repository, user_code, txn_id).await;

    features.set("is_impossible_travel", json!(is_impossible_travel));
    features.set("time_since_user_login", json!(time_since_login));

    write_back_best_effort(
        state,
        user_code,
        txn_id,
        &[
            ("is_impossible_travel", SqlValue::Integer(is_impossible_travel as i64)),
            ("time_since_user_login", SqlValue::Real(time_since_login)),
        ],
    )
    .await;
}

async fn enrich_destination_age(
    state: &AppState,
    user_code: &str,
    txn_id: &str,
    destination_address: &str,
    features: &mut FeatureBag,
) {
    let age_already_known = features
        .destination_age_hours()
        .map(|age_hours| age_hours > 0.0)
        .unwrap_or(false);
    if age_already_known {
        return;
    }

    let Some(age_observation) = state.age_client.fetch_destination_age(destination_address).await else {
        return;
    };

    debug!("⏱️ [CASCADE]: Destination age resolved: {}h.", age_observation.age_hours);
    features.set("destination_age_hours", json!(age_observation.age_hours));
    write_back_best_effort(
        state,
        user_code,
        txn_id,
        &[("destination_age_hours", SqlValue::Real(age_observation.age_hours as f64))],
    )
    .await;
}

// =================================================================
// ETAPAS 6/7: SONDEOS DE LISTAS
// =================================================================

/// Orden de negación: usuario, dirección, huella, IP, dominio de correo.
async fn probe_blacklists(state: &AppState, features: &FeatureBag) -> Option<String> {
    let user_code = features.user_code().unwrap_or_default().to_string();

    match state.list_repository.lookup_user_deny(&user_code).await {
        Ok(Some(reason)) => return Some(format!("Blacklist hit (user): {reason}")),
        Ok(None) => {}
        Err(fault) => warn!("⚠️ [CASCADE]: User deny-list degraded: {}", fault),
    }

    if let Some(address) = features.destination_address() {
        match state.list_repository.lookup_address_deny(address, features.chain()).await {
            Ok(Some(reason)) => return Some(format!("Blacklist hit (destination address): {reason}")),
            Ok(None) => {}
            Err(fault) => warn!("⚠️ [CASCADE]: Address deny-list degraded: {}", fault),
        }
    }

    if let Some(fingerprint) = features.device_fingerprint() {
        match state.list_repository.lookup_fingerprint_deny(fingerprint).await {
            Ok(Some(reason)) => return Some(format!("Blacklist hit (device fingerprint): {reason}")),
            Ok(None) => {}
            Err(fault) => warn!("⚠️ [CASCADE]: Fingerprint deny-list degraded: {}", fault),
        }
    }

    if let Some(ip_address) = features.ip_address() {
        match state.list_repository.lookup_ip_deny(ip_address).await {
            Ok(Some(reason)) => return Some(format!("Blacklist hit (ip): {reason}")),
            Ok(None) => {}
            Err(fault) => warn!("⚠️ [CASCADE]: IP deny-list degraded: {}", fault),
        }
    }

    if let Some(email_domain) = features.email_domain() {
        match state.list_repository.lookup_email_domain_deny(&email_domain).await {
            Ok(Some(reason)) => return Some(format!("Blacklist hit (email domain): {reason}")),
            Ok(None) => {}
            Err(fault) => warn!("⚠️ [CASCADE]: Email-domain deny-list degraded: {}", fault),
        }
    }

    None
}

/// Orden gris: usuario, IP, huella, dirección, dominio de correo.
async fn probe_greylist(state: &AppState, features: &FeatureBag) -> Option<String> {
    let mut grey_probes: Vec<(GreylistEntityType, String)> = Vec::new();

    if let Some(user_code) = features.user_code() {
        grey_probes.push((GreylistEntityType::UserCode, user_code.to_string()));
    }
    if let Some(ip_address) = features.ip_address() {
        grey_probes.push((GreylistEntityType::IpAddress, ip_address.to_string()));
    }
    if let Some(fingerprint) = features.device_fingerprint() {
        grey_probes.push((GreylistEntityType::DeviceFingerprint, fingerprint.to_string()));
    }
    if let Some(address) = features.destination_address() {
        grey_probes.push((GreylistEntityType::DestinationAddress, address.to_string()));
    }
    if let Some(email_domain) = features.email_domain() {
        grey_probes.push((GreylistEntityType::EmailDomain, email_domain));
    }

    for (entity_type, entity_value) in grey_probes {
        match state.list_repository.lookup_greylist(entity_type, &entity_value).await {
            Ok(Some(reason)) => {
                return Some(format!("Greylist hit ({}): {}", entity_type, reason));
            }
            Ok(None) => {}
            Err(fault) => warn!("⚠️ [CASCADE]: Greylist probe degraded: {}", fault),
        }
    }

    None
}

// =================================================================
// ETAPA 8: REFRESCO DE REGLAS
// =================================================================

/// Refresco stale-on-failure: el fallo conserva el snapshot previo.
async fn refresh_rules_if_stale(state: &AppState) {
    if !state.rules_cache.needs_refresh() {
        return;
    }
    match state.rules_repository.fetch_active_ordered().await {
        Ok(fresh_rules) => state.rules_cache.store(fresh_rules),
        Err(refresh_fault) => {
            warn!("⚠️ [CASCADE]: Rule refresh failed; stale snapshot retained: {}", refresh_fault);
        }
    }
}

// =================================================================
// SELLOS COMPARTIDOS
// =================================================================

/// Registro de decisión best-effort; el veredicto viaja igual.
async fn seal_record_best_effort(
    state: &AppState,
    user_code: &str,
    txn_id: &str,
    verdict: &Verdict,
    decision_source: &str,
    features: &FeatureBag,
) {
    let record = DecisionRecord::from_verdict(user_code, txn_id, verdict, features, decision_source);
    if let Err(trail_fault) = state.decision_repository.insert_record(&record).await {
        warn!(
            user = %user_code, txn = %txn_id, stage = %decision_source,
            "⚠️ [CASCADE]: Decision trail write failed (best-effort): {}", trail_fault
        );
    }
}

/// Sella el registro, dispara la alerta si procede y cierra la cascada.
async fn seal_terminal_verdict(
    state: &AppState,
    user_code: &str,
    txn_id: &str,
    verdict: &Verdict,
    decision_source: &str,
    features: &FeatureBag,
    fire_alert: bool,
) -> DecisionResponse {
    seal_record_best_effort(state, user_code, txn_id, verdict, decision_source, features).await;

    let response = DecisionResponse::from_verdict(user_code, Some(txn_id), verdict, decision_source);
    if fire_alert {
        state.alert_relay.dispatch_verdict_card(&response, Some(features)).await;
    }

    info!(
        "🏁 [CASCADE]: Terminal verdict {} via {} for user {}.",
        verdict.decision, decision_source, user_code
    );
    response
}

/// Write-back best-effort de columnas derivadas sobre la fila viva.
async fn write_back_best_effort(
    state: &AppState,
    user_code: &str,
    txn_id: &str,
    derived_updates: &[(&str, SqlValue)],
) {
    if let Err(write_fault) = state
        .feature_repository
        .write_back_derived(user_code, txn_id, derived_updates)
        .await
    {
        warn!(
            user = %user_code, txn = %txn_id, stage = "derived-write-back",
            "⚠️ [CASCADE]: Feature write-back failed (best-effort): {}", write_fault
        );
    }
}
