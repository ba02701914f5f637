// [libs/domain/models-rs/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS BARREL (V5.0 - RISK PERIMETER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: PUNTO DE ACCESO NOMINAL A LOS CONTRATOS SOBERANOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SINGLE SOURCE OF TRUTH: Todo contrato que cruza una frontera de
 *    crate (bolsa de atributos, veredictos, reglas, dimensiones) vive
 *    aquí y solo aquí.
 * 2. ZERO LOGIC: Este estrato no ejecuta I/O ni decisiones; define
 *    formas y conversiones puras.
 * =================================================================
 */

/// Bolsa de atributos de comportamiento de un intento de retiro.
pub mod feature;
/// Veredictos, registros de decisión y respuesta perimetral.
pub mod verdict;
/// Contratos de reglas dinámicas del motor de expresiones.
pub mod rule;
/// Tipologías de listas curadas (allow / deny / grey).
pub mod lists;
/// Sobres de ingesta CDC y HTTP.
pub mod envelope;
/// Filas de dimensión de enriquecimiento y su máquina de estados.
pub mod enrichment;
/// Eventos históricos de dispositivo y login para rasgos derivados.
pub mod history;

pub use feature::FeatureBag;
pub use verdict::{Decision, DecisionRecord, DecisionResponse, Verdict};
pub use rule::{RiskRule, RuleAction};
pub use lists::GreylistEntityType;
pub use envelope::{CdcDocument, CdcEnvelopeRecord, IngressSkip};
pub use enrichment::{DestinationAgeDimension, EnrichmentStatus, SanctionsDimension};
pub use history::DeviceEvent;
