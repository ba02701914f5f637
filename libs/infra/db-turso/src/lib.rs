// [libs/infra/db-turso/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PERSISTENCE ADAPTER BARREL (V9.0 - RISK LEDGER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DEL CLIENTE Y REPOSITORIOS
 * =================================================================
 */

/// Cliente de conexión al cluster libSQL (remoto / local / memoria).
pub mod client;
/// Gobernanza estructural e idempotencia del esquema.
pub mod schema;
/// Catálogo semántico de fallos de persistencia.
pub mod errors;
/// Repositorios de autoridad por agregado.
pub mod repositories;

pub use client::TursoClient;
pub use errors::DbError;
