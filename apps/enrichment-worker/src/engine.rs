// [apps/enrichment-worker/src/engine.rs]
/*!
 * =================================================================
 * APARATO: DIMENSION REFRESH ENGINE (V3.3 - FRESHNESS MACHINE)
 * CLASIFICACIÓN: WORKER EXECUTION LAYER (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: REFRESCO DE DIMENSIONES POR (chain, address)
 *
 * # Logic:
 * Por cada fila CDC de retiro se corren dos chequeos independientes
 * (sanciones y edad), cada uno con el predicado de frescura:
 * refrescar si no hay fila, estado PENDING/ERROR, nunca verificada
 * o verificación más vieja que la ventana (24h por defecto).
 *
 * Máquina de estados por dimensión: éxito -> CHECKED + valor;
 * fallo -> ERROR + last_error preservando el valor previo. La
 * cadena no mapeable sella ERROR 'UNMAPPED_CHAIN_<x>' sin tocar la
 * red. Ambos chequeos de una fila corren concurrentes (join).
 * =================================================================
 */

use crate::chainmap::map_chain_for_explorer;
use cerberus_domain_models::enrichment::should_refresh;
use cerberus_domain_models::{CdcDocument, CdcEnvelopeRecord};
use cerberus_infra_db::repositories::DimensionRepository;
use cerberus_infra_screening::{DestinationAgeClient, SanctionsClient};
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Resumen de un lote CDC procesado.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct BatchSummary {
    /// Filas (chain, address) examinadas.
    pub processed: usize,
    /// Llamadas de refresco ejecutadas (ambas dimensiones sumadas).
    pub refreshed: usize,
    /// Registros omitidos con su código 'SKIPPED_*'.
    pub skipped: Vec<String>,
}

pub struct EnrichmentEngine {
    dimension_repository: DimensionRepository,
    sanctions_client: Arc<SanctionsClient>,
    age_client: Arc<DestinationAgeClient>,
    recheck_window_hours: i64,
}

impl EnrichmentEngine {
    pub fn new(
        dimension_repository: DimensionRepository,
        sanctions_client: Arc<SanctionsClient>,
        age_client: Arc<DestinationAgeClient>,
        recheck_window_hours: i64,
    ) -> Self {
        Self {
            dimension_repository,
            sanctions_client,
            age_client,
            recheck_window_hours,
        }
    }

    /**
     * Procesa un lote CDC de retiros nuevos.
     * Registros no procesables se omiten con su código corto.
     */
    #[instrument(skip(self, raw_records))]
    pub async fn process_cdc_batch(&self, raw_records: &[Value]) -> BatchSummary {
        let mut batch_summary = BatchSummary::default();

        for raw_record in raw_records {
            let Ok(envelope_record) = serde_json::from_value::<CdcEnvelopeRecord>(raw_record.clone())
            else {
                batch_summary.skipped.push("SKIPPED_INVALID_VALUE".to_string());
                continue;
            };

            let Some(cdc_document) = CdcDocument::decode(&envelope_record.value) else {
                batch_summary.skipped.push("SKIPPED_INVALID_VALUE".to_string());
                continue;
            };

            if !cdc_document.is_insert() {
                batch_summary.skipped.push("SKIPPED_NON_INSERT".to_string());
                continue;
            }

            let Some(data_rows) = cdc_document.data.filter(|rows| !rows.is_empty()) else {
                batch_summary.skipped.push("SKIPPED_EMPTY_DATA".to_string());
                continue;
            };

            for data_row in &data_rows {
                let Some((chain_symbol, destination_address)) = extract_refresh_subject(data_row) else {
                    debug!("⏭️ [WORKER]: Row without (chain, address), ignored.");
                    continue;
                };

                batch_summary.processed += 1;
                let refresh_calls = self
                    .refresh_dimension_pair(&chain_symbol, &destination_address)
                    .await;
                batch_summary.refreshed += refresh_calls;
            }
        }

        info!(
            "📊 [WORKER]: Batch leveled: {} rows, {} refresh calls, {} skipped.",
            batch_summary.processed,
            batch_summary.refreshed,
            batch_summary.skipped.len()
        );
        batch_summary
    }

    /**
     * Corre ambos chequeos de frescura para un (chain, address).
     * Retorna cuántas dimensiones ejecutaron refresco.
     */
    #[instrument(skip(self), fields(chain = %chain_symbol, address = %destination_address))]
    pub async fn refresh_dimension_pair(&self, chain_symbol: &str, destination_address: &str) -> usize {
        let (sanctions_refreshed, age_refreshed) = tokio::join!(
            self.refresh_sanctions_dimension(chain_symbol, destination_address),
            self.refresh_age_dimension(chain_symbol, destination_address),
        );

        usize::from(sanctions_refreshed) + usize::from(age_refreshed)
    }

    /// Chequeo de la dimensión de sanciones; true si hubo refresco.
    async fn refresh_sanctions_dimension(&self, chain_symbol: &str, destination_address: &str) -> bool {
        let observed_freshness = match self
            .dimension_repository
            .sanctions_freshness(chain_symbol, destination_address)
            .await
        {
            Ok(freshness) => freshness,
            Err(read_fault) => {
                warn!("⚠️ [WORKER]: Sanctions freshness read failed: {}", read_fault);
                return false;
            }
        };

        let (existing_status, last_checked_at) = match observed_freshness {
            Some((status, checked_at)) => (Some(status), checked_at),
            None => (None, None),
        };

        if !should_refresh(existing_status, last_checked_at, Utc::now(), self.recheck_window_hours) {
            debug!("🗃️ [WORKER]: Sanctions dimension fresh, skip.");
            return false;
        }

        let seal_outcome = match self.sanctions_client.screen_address(destination_address).await {
            Ok(is_sanctioned) => {
                self.dimension_repository
                    .seal_sanctions_checked(chain_symbol, destination_address, is_sanctioned)
                    .await
            }
            Err(provider_fault) => {
                self.dimension_repository
                    .seal_sanctions_error(chain_symbol, destination_address, &provider_fault.to_string())
                    .await
            }
        };

        if let Err(seal_fault) = seal_outcome {
            warn!("⚠️ [WORKER]: Sanctions dimension seal failed: {}", seal_fault);
        }
        true
    }

    /// Chequeo de la dimensión de edad; true si hubo refresco.
    async fn refresh_age_dimension(&self, chain_symbol: &str, destination_address: &str) -> bool {
        let observed_freshness = match self
            .dimension_repository
            .age_freshness(chain_symbol, destination_address)
            .await
        {
            Ok(freshness) => freshness,
            Err(read_fault) => {
                warn!("⚠️ [WORKER]: Age freshness read failed: {}", read_fault);
                return false;
            }
        };

        let (existing_status, last_checked_at) = match observed_freshness {
            Some((status, checked_at)) => (Some(status), checked_at),
            None => (None, None),
        };

        if !should_refresh(existing_status, last_checked_at, Utc::now(), self.recheck_window_hours) {
            debug!("🗃️ [WORKER]: Age dimension fresh, skip.");
            return false;
        }

        // Cadena fuera del catálogo: ERROR sin tocar la red.
        let explorer_chain = match map_chain_for_explorer(chain_symbol) {
            Ok(mapped_chain) => mapped_chain,
            Err(unmapped_label) => {
                if let Err(seal_fault) = self
                    .dimension_repository
                    .seal_age_error(chain_symbol, destination_address, &unmapped_label)
                    .await
                {
                    warn!("⚠️ [WORKER]: Age dimension seal failed: {}", seal_fault);
                }
                return true;
            }
        };

        let seal_outcome = match self
            .age_client
            .probe_age_on_chain(explorer_chain, destination_address)
            .await
        {
            Ok(age_observation) => {
                self.dimension_repository
                    .seal_age_checked(
                        chain_symbol,
                        destination_address,
                        age_observation.age_hours,
                        age_observation.first_seen_at,
                    )
                    .await
            }
            Err(explorer_fault) => {
                self.dimension_repository
                    .seal_age_error(chain_symbol, destination_address, &explorer_fault.to_string())
                    .await
            }
        };

        if let Err(seal_fault) = seal_outcome {
            warn!("⚠️ [WORKER]: Age dimension seal failed: {}", seal_fault);
        }
        true
    }
}

/// (chain, address) de una fila CDC de retiro, con alias del upstream.
fn extract_refresh_subject(data_row: &Map<String, Value>) -> Option<(String, String)> {
    let chain_symbol = first_scalar(data_row, &["chain", "currency_chain"])?;
    let destination_address =
        first_scalar(data_row, &["destination_address", "address", "to_address"])?;
    Some((chain_symbol, destination_address))
}

fn first_scalar(data_row: &Map<String, Value>, alias_chain: &[&str]) -> Option<String> {
    for alias in alias_chain {
        match data_row.get(*alias) {
            Some(Value::String(text_value)) if !text_value.is_empty() => {
                return Some(text_value.clone());
            }
            Some(Value::Number(numeric_value)) => return Some(numeric_value.to_string()),
            _ => {}
        }
    }
    None
}
