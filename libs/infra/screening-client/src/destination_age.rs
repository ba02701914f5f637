// [libs/infra/screening-client/src/destination_age.rs]
/*!
 * =================================================================
 * APARATO: DESTINATION AGE CLIENT (V4.3 - PREFIX ORACLE)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: EDAD EN HORAS DE LA DIRECCIÓN DESTINO
 *
 * # Logic:
 * La cadena se infiere por prefijo de dirección (0x+42 -> ethereum;
 * 1/3/bc1 -> bitcoin; T+[30,36] -> tron; resto desconocida -> None).
 * El dashboard del explorador retorna un mapa 'data' cuya primera
 * llave es el registro de la dirección; los campos de primera
 * observación se prueban en orden (first_seen_receiving,
 * first_seen_spending, first_seen, created_at) tanto en el registro
 * anidado 'address' como en la raíz. Edad = floor((now-first_seen)
 * /3600) fijada a >= 0. Todo fallo degrada a None sin cachear.
 * =================================================================
 */

use crate::cache::{FlightDeck, TtlCache};
use crate::errors::ScreeningError;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Timeout del enlace con el dashboard del explorador.
const EXPLORER_TIMEOUT_SECONDS: u64 = 8;
/// Campos de primera observación, en orden de autoridad.
const FIRST_SEEN_FIELD_PROBES: &[&str] =
    &["first_seen_receiving", "first_seen_spending", "first_seen", "created_at"];

/// Observación de edad retornada por el explorador.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeObservation {
    pub age_hours: i64,
    pub first_seen_at: Option<DateTime<Utc>>,
}

/**
 * Inferencia de cadena por prefijo de dirección.
 * Prefijos fuera del catálogo retornan None (edad no consultable).
 */
pub fn detect_chain_by_prefix(address: &str) -> Option<&'static str> {
    if address.starts_with("0x") && address.len() == 42 {
        return Some("ethereum");
    }
    if address.starts_with("bc1") || address.starts_with('1') || address.starts_with('3') {
        return Some("bitcoin");
    }
    if address.starts_with('T') && (30..=36).contains(&address.len()) {
        return Some("tron");
    }
    None
}

pub struct DestinationAgeClient {
    internal_http_session: Client,
    explorer_base_endpoint: String,
    explorer_api_key: Option<String>,
    observation_cache: TtlCache<AgeObservation>,
    flight_deck: FlightDeck,
}

impl DestinationAgeClient {
    pub fn new(base_url: String, api_key: Option<String>, cache_ttl_seconds: u64) -> Self {
        Self {
            internal_http_session: Client::builder()
                .timeout(Duration::from_secs(EXPLORER_TIMEOUT_SECONDS))
                .user_agent("Cerberus-Age-Probe/V4.3")
                .build()
                .expect("CRITICAL: Failed to initialize HTTP session"),
            explorer_base_endpoint: base_url.trim_end_matches('/').to_string(),
            explorer_api_key: api_key,
            observation_cache: TtlCache::new(cache_ttl_seconds),
            flight_deck: FlightDeck::new(),
        }
    }

    /**
     * Edad de la dirección con cadena inferida por prefijo.
     * Fail-open: cualquier fallo degrada a None sin cachear.
     */
    #[instrument(skip(self), fields(address = %target_address))]
    pub async fn fetch_destination_age(&self, target_address: &str) -> Option<AgeObservation> {
        let Some(inferred_chain) = detect_chain_by_prefix(target_address) else {
            debug!("🔍 [DEST_AGE]: Unknown chain prefix, age not queryable.");
            return None;
        };
        self.fetch_destination_age_on_chain(inferred_chain, target_address).await
    }

    /**
     * Sondeo con contrato de error explícito sobre una cadena ya
     * conocida (ruta del worker). Observaciones exitosas sellan la
     * caché; el fallo NO se cachea.
     */
    #[instrument(skip(self), fields(chain = %explorer_chain, address = %target_address))]
    pub async fn probe_age_on_chain(
        &self,
        explorer_chain: &str,
        target_address: &str,
    ) -> Result<AgeObservation, ScreeningError> {
        let cache_key = format!("{explorer_chain}:{target_address}");

        if let Some(cached_observation) = self.observation_cache.get(&cache_key) {
            debug!("🗃️ [DEST_AGE]: Cache hit ({}h).", cached_observation.age_hours);
            return Ok(cached_observation);
        }

        let flight_latch = self.flight_deck.latch_for(&cache_key);
        let _flight_guard = flight_latch.lock().await;

        if let Some(cached_observation) = self.observation_cache.get(&cache_key) {
            self.flight_deck.release(&cache_key);
            return Ok(cached_observation);
        }

        let probe_outcome = self.execute_dashboard_probe(explorer_chain, target_address).await;
        self.flight_deck.release(&cache_key);

        match probe_outcome {
            Ok(fresh_observation) => {
                self.observation_cache.put(&cache_key, fresh_observation.clone());
                Ok(fresh_observation)
            }
            Err(explorer_fault) => Err(explorer_fault),
        }
    }

    /// Variante fail-open de 'probe_age_on_chain' (camino en línea).
    pub async fn fetch_destination_age_on_chain(
        &self,
        explorer_chain: &str,
        target_address: &str,
    ) -> Option<AgeObservation> {
        match self.probe_age_on_chain(explorer_chain, target_address).await {
            Ok(fresh_observation) => Some(fresh_observation),
            Err(explorer_fault) => {
                warn!("⚠️ [DEST_AGE]: Fail-open after explorer fault: {}", explorer_fault);
                None
            }
        }
    }

    async fn execute_dashboard_probe(
        &self,
        explorer_chain: &str,
        target_address: &str,
    ) -> Result<AgeObservation, ScreeningError> {
        let mut probe_url = format!(
            "{}/{}/dashboards/address/{}",
            self.explorer_base_endpoint, explorer_chain, target_address
        );
        if let Some(api_key) = &self.explorer_api_key {
            probe_url.push_str(&format!("?key={api_key}"));
        }

        let explorer_response = self.internal_http_session.get(&probe_url).send().await?;
        let response_status = explorer_response.status();
        if !response_status.is_success() {
            return Err(ScreeningError::ProviderRejection(response_status.as_u16()));
        }

        let decoded_payload: Value = explorer_response
            .json()
            .await
            .map_err(|decode_fault| ScreeningError::MalformedPayload(decode_fault.to_string()))?;

        let first_seen_at = extract_first_seen(&decoded_payload).ok_or_else(|| {
            ScreeningError::MalformedPayload("no first-seen field in dashboard record".into())
        })?;

        let elapsed_seconds = (Utc::now() - first_seen_at).num_seconds().max(0);
        Ok(AgeObservation {
            age_hours: elapsed_seconds / 3600,
            first_seen_at: Some(first_seen_at),
        })
    }
}

/// Primera llave del mapa 'data' como registro; campos probados en
/// orden, primero bajo el objeto anidado 'address' y luego en la raíz.
fn extract_first_seen(dashboard_payload: &Value) -> Option<DateTime<Utc>> {
    let data_map = dashboard_payload.get("data")?.as_object()?;
    let (_, address_record) = data_map.iter().next()?;

    let probe_targets = [address_record.get("address"), Some(address_record)];

    for probe_target in probe_targets.into_iter().flatten() {
        for field_name in FIRST_SEEN_FIELD_PROBES {
            if let Some(raw_timestamp) = probe_target.get(*field_name).and_then(Value::as_str) {
                if let Some(parsed_timestamp) = parse_explorer_timestamp(raw_timestamp) {
                    return Some(parsed_timestamp);
                }
            }
        }
    }
    None
}

/// El explorador emite 'YYYY-MM-DD HH:MM:SS' en UTC.
fn parse_explorer_timestamp(raw_timestamp: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw_timestamp, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
