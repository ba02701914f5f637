// [apps/enrichment-worker/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ENRICHMENT WORKER LIBRARY (V3.0)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: TOPOLOGÍA NOMINAL DEL WORKER DE DIMENSIONES
 * =================================================================
 */

/// Mapeo de símbolos de cadena al vocabulario del explorador.
pub mod chainmap;
/// Motor de refresco con la máquina de estados de frescura.
pub mod engine;
/// Handlers y rutas del shell de ingesta.
pub mod shell;

pub use engine::{BatchSummary, EnrichmentEngine};
