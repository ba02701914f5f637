// [apps/decision-gateway/src/state.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY STATE ORCHESTRATOR (V4.1 - COMPOSITION ROOT)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ORQUESTACIÓN DE REPOSITORIOS, CACHÉS Y ADAPTADORES
 *
 * # Logic:
 * La placa base del servicio: un clon por handler comparte los
 * mismos repositorios, la caché de reglas y los adaptadores de
 * enriquecimiento vía Arc<T>. Las cachés son estado de proceso;
 * un arranque frío simplemente las repuebla.
 * =================================================================
 */

use crate::config::GatewayConfig;
use cerberus_domain_rules::RulesCache;
use cerberus_infra_ai::AiOracleClient;
use cerberus_infra_alerts::AlertRelayClient;
use cerberus_infra_db::repositories::{
    DecisionRepository, FeatureRepository, HistoryRepository, ListRepository, RulesRepository,
};
use cerberus_infra_db::TursoClient;
use cerberus_infra_screening::{DestinationAgeClient, SanctionsClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/**
 * Contenedor de estado compartido (Thread-Safe) para el Gateway.
 */
#[derive(Clone)]
pub struct AppState {
    /// Cliente táctico del cluster libSQL.
    pub database_client: TursoClient,

    // --- REPOSITORIOS DE AUTORIDAD (L3) ---
    pub feature_repository: Arc<FeatureRepository>,
    pub rules_repository: Arc<RulesRepository>,
    pub list_repository: Arc<ListRepository>,
    pub decision_repository: Arc<DecisionRepository>,
    pub history_repository: Arc<HistoryRepository>,

    // --- MOTOR DE REGLAS (L2) ---
    pub rules_cache: Arc<RulesCache>,

    // --- ADAPTADORES EXTERNOS (L4) ---
    pub sanctions_client: Arc<SanctionsClient>,
    pub age_client: Arc<DestinationAgeClient>,
    pub ai_oracle: Arc<AiOracleClient>,
    pub alert_relay: Arc<AlertRelayClient>,

    // --- PARÁMETROS DEL FETCH DE FEATURES ---
    pub feature_fetch_max_retries: u32,
    pub feature_fetch_retry_delay: Duration,
}

impl AppState {
    /**
     * Forja la placa base inyectando todas las dependencias desde la
     * configuración ambiental.
     */
    pub fn new(database_client: TursoClient, config: &GatewayConfig) -> Self {
        debug!("🧬 [APP_STATE]: Executing gateway ignition sequence V4.1...");

        Self {
            database_client: database_client.clone(),

            feature_repository: Arc::new(FeatureRepository::new(database_client.clone())),
            rules_repository: Arc::new(RulesRepository::new(database_client.clone())),
            list_repository: Arc::new(ListRepository::new(database_client.clone())),
            decision_repository: Arc::new(DecisionRepository::new(database_client.clone())),
            history_repository: Arc::new(HistoryRepository::new(database_client)),

            rules_cache: Arc::new(RulesCache::new(config.rule_cache_ttl_seconds)),

            sanctions_client: Arc::new(SanctionsClient::new(
                config.sanctions_api_url.clone(),
                config.sanctions_api_key.clone(),
                config.sanctions_cache_ttl_seconds,
            )),
            age_client: Arc::new(DestinationAgeClient::new(
                config.explorer_api_url.clone(),
                config.explorer_api_key.clone(),
                config.destination_age_cache_ttl_seconds,
            )),
            ai_oracle: Arc::new(AiOracleClient::new(
                config.llm_api_url.clone(),
                config.llm_model.clone(),
                config.llm_api_key.clone(),
            )),
            alert_relay: Arc::new(AlertRelayClient::new(config.alert_webhook_url.clone())),

            feature_fetch_max_retries: config.feature_fetch_max_retries,
            feature_fetch_retry_delay: config.feature_fetch_retry_delay,
        }
    }
}
