// [libs/infra/screening-client/src/sanctions.rs]
/*!
 * =================================================================
 * APARATO: SANCTIONS SCREENING CLIENT (V4.2 - FAIL-OPEN)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: SCREENING DE DIRECCIONES CONTRA EL PROVEEDOR
 *
 * # Logic:
 * Contrato del proveedor: GET <base>/<address> con llave en la
 * cabecera; la dirección está sancionada sii el arreglo
 * 'identifications' llega no vacío. Resultados exitosos (positivos
 * y negativos) se cachean 1h; un fallo se registra, NO se cachea y
 * degrada a "no sancionada" (el worker asíncrono es la autoridad).
 * =================================================================
 */

use crate::cache::{FlightDeck, TtlCache};
use crate::errors::ScreeningError;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Timeout del enlace con el proveedor de sanciones.
const SANCTIONS_TIMEOUT_SECONDS: u64 = 5;

pub struct SanctionsClient {
    internal_http_session: Client,
    provider_base_endpoint: String,
    provider_api_key: Option<String>,
    verdict_cache: TtlCache<bool>,
    flight_deck: FlightDeck,
}

impl SanctionsClient {
    /**
     * Construye el cliente con timeouts de grado industrial.
     *
     * @param base_url Endpoint raíz del proveedor (address-keyed).
     * @param api_key Llave de acceso; su ausencia degrada a fail-open.
     */
    pub fn new(base_url: String, api_key: Option<String>, cache_ttl_seconds: u64) -> Self {
        Self {
            internal_http_session: Client::builder()
                .timeout(Duration::from_secs(SANCTIONS_TIMEOUT_SECONDS))
                .user_agent("Cerberus-Sanctions-Probe/V4.2")
                .build()
                .expect("CRITICAL: Failed to initialize HTTP session"),
            provider_base_endpoint: base_url.trim_end_matches('/').to_string(),
            provider_api_key: api_key,
            verdict_cache: TtlCache::new(cache_ttl_seconds),
            flight_deck: FlightDeck::new(),
        }
    }

    /**
     * Screening con contrato de error explícito (ruta del worker).
     *
     * Resultados exitosos (positivos y negativos) sellan la caché;
     * misses concurrentes de la misma dirección colapsan en una
     * llamada (single-flight + double-check). El fallo NO se cachea.
     */
    #[instrument(skip(self), fields(address = %target_address))]
    pub async fn screen_address(&self, target_address: &str) -> Result<bool, ScreeningError> {
        if let Some(cached_verdict) = self.verdict_cache.get(target_address) {
            debug!("🗃️ [SANCTIONS]: Cache hit ({}).", cached_verdict);
            return Ok(cached_verdict);
        }

        let flight_latch = self.flight_deck.latch_for(target_address);
        let _flight_guard = flight_latch.lock().await;

        // Double-check: otro vuelo pudo sellar la caché mientras esperábamos.
        if let Some(cached_verdict) = self.verdict_cache.get(target_address) {
            self.flight_deck.release(target_address);
            return Ok(cached_verdict);
        }

        let screening_outcome = self.execute_screening_probe(target_address).await;
        self.flight_deck.release(target_address);

        match screening_outcome {
            Ok(is_sanctioned) => {
                self.verdict_cache.put(target_address, is_sanctioned);
                if is_sanctioned {
                    info!("🚨 [SANCTIONS]: Address flagged by provider identifications.");
                }
                Ok(is_sanctioned)
            }
            Err(provider_fault) => Err(provider_fault),
        }
    }

    /**
     * Screening fail-open (camino de decisión en línea): cualquier
     * fallo de proveedor degrada a 'false' con rastro.
     */
    pub async fn check_sanctions(&self, target_address: &str) -> bool {
        match self.screen_address(target_address).await {
            Ok(is_sanctioned) => is_sanctioned,
            Err(provider_fault) => {
                warn!("⚠️ [SANCTIONS]: Fail-open after provider fault: {}", provider_fault);
                false
            }
        }
    }

    /// Sondeo crudo contra el proveedor (sin caché, sin degradación).
    async fn execute_screening_probe(&self, target_address: &str) -> Result<bool, ScreeningError> {
        let probe_url = format!("{}/{}", self.provider_base_endpoint, target_address);

        let mut probe_request = self.internal_http_session.get(&probe_url);
        if let Some(api_key) = &self.provider_api_key {
            probe_request = probe_request.header("X-API-Key", api_key.as_str());
        }

        let provider_response = probe_request.send().await?;
        let response_status = provider_response.status();
        if !response_status.is_success() {
            return Err(ScreeningError::ProviderRejection(response_status.as_u16()));
        }

        #[derive(Deserialize)]
        struct SanctionsProviderSchema {
            #[serde(default)]
            identifications: Vec<serde_json::Value>,
        }

        let decoded_payload: SanctionsProviderSchema = provider_response
            .json()
            .await
            .map_err(|decode_fault| ScreeningError::MalformedPayload(decode_fault.to_string()))?;

        Ok(!decoded_payload.identifications.is_empty())
    }
}
