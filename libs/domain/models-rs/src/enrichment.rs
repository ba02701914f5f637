// [libs/domain/models-rs/src/enrichment.rs]
/*!
 * =================================================================
 * APARATO: ENRICHMENT DIMENSION CONTRACTS (V5.1 - WRITE-ONCE SEAL)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FILAS DE DIMENSIÓN Y MÁQUINA DE ESTADOS DE FRESCURA
 *
 * # Logic:
 * Cada (chain, address) mantiene un estado por dimensión:
 * PENDING -> CHECKED en éxito, PENDING/CHECKED -> ERROR en fallo
 * (preservando el valor previo). 'first_seen_at' es de escritura
 * única: una vez no-NULL se conserva el valor más antiguo.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Estado de una dimensión de enriquecimiento para un (chain, address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrichmentStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "CHECKED")]
    Checked,
    #[serde(rename = "ERROR")]
    Error,
}

impl EnrichmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentStatus::Pending => "PENDING",
            EnrichmentStatus::Checked => "CHECKED",
            EnrichmentStatus::Error => "ERROR",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(EnrichmentStatus::Pending),
            "CHECKED" => Some(EnrichmentStatus::Checked),
            "ERROR" => Some(EnrichmentStatus::Error),
            _ => None,
        }
    }
}

/// Fila de 'dim_sanctions_address'.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanctionsDimension {
    pub chain: String,
    pub address: String,
    pub is_sanctioned: bool,
    pub sanctions_status: EnrichmentStatus,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Fila de 'dim_destination_age'.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationAgeDimension {
    pub chain: String,
    pub address: String,
    pub destination_age_hours: Option<i64>,
    pub age_status: EnrichmentStatus,
    /// Sello de primera observación; de escritura única vía COALESCE.
    pub first_seen_at: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/**
 * Predicado de frescura compartido por ambas dimensiones.
 *
 * Refrescar si: no hay fila, estado PENDING o ERROR, nunca verificada,
 * o la última verificación excede la ventana de re-chequeo.
 */
pub fn should_refresh(
    existing_status: Option<EnrichmentStatus>,
    last_checked_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    recheck_window_hours: i64,
) -> bool {
    match existing_status {
        None => true,
        Some(EnrichmentStatus::Pending) | Some(EnrichmentStatus::Error) => true,
        Some(EnrichmentStatus::Checked) => match last_checked_at {
            None => true,
            Some(checked_at) => now - checked_at > chrono::Duration::hours(recheck_window_hours),
        },
    }
}
