// [libs/infra/ai-oracle/src/lib.rs]
/*!
 * =================================================================
 * APARATO: AI ORACLE BARREL (V3.0 - NEVER-FAIL CONTRACT)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: SEGUNDA OPINIÓN LLM PARA CASOS DE ZONA GRIS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. NEVER-FAIL: El agente siempre retorna un veredicto usable; el
 *    colapso de red o de parseo degrada a HOLD con centinela -1.
 * 2. BOUNDED RETRY: 3 intentos con 1s de respiro solo ante fallos
 *    de transporte; un cuerpo malformado no se reintenta.
 * =================================================================
 */

/// Prompt fijo del oficial de riesgo y armado del caso.
pub mod prompt;
/// Cliente REST del endpoint generateContent.
pub mod client;

pub use client::AiOracleClient;
pub use prompt::COMPREHENSIVE_REASONING_PROMPT;
