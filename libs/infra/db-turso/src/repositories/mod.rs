// [libs/infra/db-turso/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: REPOSITORY ACCESS MATRIX (V9.0 - RISK TOPOLOGY)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ORQUESTACIÓN DE SUBSISTEMAS DE PERSISTENCIA
 *
 * # Mathematical Proof (Modular Encapsulation):
 * El barrel file actúa como una interfaz galvánica. Los sub-módulos
 * permanecen aislados, y solo las estructuras de autoridad
 * (Repositories) son expuestas al exterior, reduciendo el
 * acoplamiento sistémico.
 * =================================================================
 */

// --- ESTRATO 1: CAMINO EN LÍNEA (DECISIÓN) ---

/// Lectura con reintento y write-back de la bolsa de atributos.
pub mod features;
/// Carga ordenada de reglas dinámicas activas.
pub mod rules;
/// Lookups de vida sobre las seis listas curadas.
pub mod lists;
/// Rastro inmutable de veredictos emitidos.
pub mod decision;
/// Historia conductual para rasgos derivados en línea.
pub mod history;

// --- ESTRATO 2: WORKER ASÍNCRONO (DIMENSIONES) ---

/// Frescura y upserts de las dimensiones de enriquecimiento.
pub mod dimensions;

// --- RE-EXPORTACIONES SOBERANAS (NOMINAL ACCESS API) ---

pub use decision::DecisionRepository;
pub use dimensions::DimensionRepository;
pub use features::FeatureRepository;
pub use history::HistoryRepository;
pub use lists::ListRepository;
pub use rules::RulesRepository;

use crate::errors::DbError;
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::Value as SqlValue;

/**
 * Interpreta una marca temporal del Ledger (RFC3339 o el formato
 * 'YYYY-MM-DD HH:MM:SS' de CURRENT_TIMESTAMP) como instante UTC.
 */
pub(crate) fn parse_storage_timestamp(raw_timestamp: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw_timestamp) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw_timestamp, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw_timestamp, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Columna TEXT anulable leída de forma explícita (NULL => None).
pub(crate) fn optional_text(data_row: &libsql::Row, column_index: i32) -> Result<Option<String>, DbError> {
    match data_row.get_value(column_index)? {
        SqlValue::Null => Ok(None),
        SqlValue::Text(text_value) => Ok(Some(text_value)),
        unexpected => Err(DbError::MappingError(format!(
            "expected TEXT at column {column_index}, got {unexpected:?}"
        ))),
    }
}

/// Columna INTEGER anulable leída de forma explícita (NULL => None).
pub(crate) fn optional_integer(data_row: &libsql::Row, column_index: i32) -> Result<Option<i64>, DbError> {
    match data_row.get_value(column_index)? {
        SqlValue::Null => Ok(None),
        SqlValue::Integer(integer_value) => Ok(Some(integer_value)),
        unexpected => Err(DbError::MappingError(format!(
            "expected INTEGER at column {column_index}, got {unexpected:?}"
        ))),
    }
}
