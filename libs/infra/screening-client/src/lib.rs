// [libs/infra/screening-client/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SCREENING CLIENT BARREL (V4.0 - FAIL-OPEN PERIMETER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: ENRIQUECIMIENTO SÍNCRONO DE DIRECCIONES DESTINO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. FAIL-OPEN: El camino en línea jamás castiga por un fallo de
 *    proveedor; el worker asíncrono es la fuente de verdad y el
 *    chequeo en línea un cortocircuito oportunista.
 * 2. SINGLE-FLIGHT: Misses concurrentes de la misma dirección
 *    colapsan en una sola llamada saliente.
 * =================================================================
 */

/// Caché TTL en memoria y pizarra de vuelos en curso.
pub mod cache;
/// Catálogo semántico de fallos de proveedor.
pub mod errors;
/// Cliente de screening de sanciones (address-keyed).
pub mod sanctions;
/// Cliente de edad de dirección destino (block-explorer dashboard).
pub mod destination_age;

pub use destination_age::{detect_chain_by_prefix, AgeObservation, DestinationAgeClient};
pub use errors::ScreeningError;
pub use sanctions::SanctionsClient;
