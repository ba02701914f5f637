// [libs/domain/models-rs/src/tests_serialization.rs]
/*!
 * =================================================================
 * APARATO: MODEL SERIALIZATION INTEGRITY TEST (V5.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2
 * RESPONSABILIDAD: CERTIFICACIÓN DE PARIDAD SERDE DE LOS CONTRATOS
 *
 * # Logic:
 * Los contratos cruzan tres fronteras (HTTP, Ledger, LLM). Este
 * aparato certifica que las etiquetas del cable (PASS/HOLD/REJECT,
 * SKIPPED_*, PENDING/CHECKED/ERROR) son bit-perfectas.
 * =================================================================
 */
