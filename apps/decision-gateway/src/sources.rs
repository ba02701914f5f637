// [apps/decision-gateway/src/sources.rs]
/*!
 * =================================================================
 * APARATO: DECISION SOURCE REGISTRY (V4.0 - FROZEN CONTRACT)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: ETIQUETAS CANÓNICAS DE FUENTE POR ETAPA
 *
 * # Logic:
 * Las etiquetas son contrato con los consumidores del rastro de
 * decisión; renombrarlas rompe la agregación downstream.
 * =================================================================
 */

pub const SRC_NO_DATA: &str = "NO_DATA";
pub const SRC_WHITELIST_USER: &str = "RULE_ENGINE_WHITELIST_USER";
pub const SRC_WHITELIST_ADDRESS: &str = "RULE_ENGINE_WHITELIST_ADDRESS";
pub const SRC_LOW_RISK: &str = "RULE_ENGINE_LOW_RISK";
pub const SRC_SANCTIONS: &str = "SANCTIONS_ENGINE";
pub const SRC_BLACKLIST: &str = "RULE_ENGINE_BLACKLIST";
pub const SRC_GREYLIST: &str = "RULE_ENGINE_GREYLIST";
pub const SRC_AI_GREYLIST: &str = "AI_AGENT_GREYLIST";
pub const SRC_RULES: &str = "RULE_ENGINE_RULES";
pub const SRC_AI_RULE_HOLD: &str = "AI_AGENT_RULE_HOLD";
pub const SRC_DEFAULT_PASS: &str = "RULE_ENGINE_DEFAULT_PASS";
