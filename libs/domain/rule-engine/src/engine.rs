// [libs/domain/rule-engine/src/engine.rs]
/*!
 * =================================================================
 * APARATO: RULE CACHE & MATCH ENGINE (V3.3 - STALE-ON-FAILURE)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: CACHÉ TTL DE REGLAS COMPILADAS Y PRIMER DISPARO
 *
 * # Logic:
 * El set de reglas se compila una sola vez por refresco; la
 * evaluación por solicitud recorre el snapshot compartido en orden
 * (priority, rule_id) y retorna el primer disparo verdadero. Una
 * regla cuyo AST fue rechazado o cuya interpretación falla se omite
 * con rastro y se trata como no coincidente.
 *
 * El llamador es dueño del I/O: cuando 'needs_refresh()' es cierto,
 * busca las reglas en almacenamiento y las sella con 'store()'. Si
 * la búsqueda falla, no sella nada y el snapshot previo sigue
 * sirviendo (stale-on-failure); sin snapshot previo el motor opera
 * como set vacío.
 * =================================================================
 */

use crate::ast::Expression;
use crate::errors::ExpressionError;
use crate::eval::evaluate_compiled;
use crate::parser::compile_expression;
use cerberus_domain_models::{FeatureBag, RiskRule};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Regla con su expresión compilada (o su rechazo de compilación).
pub struct CompiledRule {
    pub rule: RiskRule,
    compiled: Result<Expression, ExpressionError>,
}

/// Primer disparo de la pasada de evaluación.
#[derive(Debug, Clone)]
pub struct RuleHit {
    pub rule: RiskRule,
}

struct CacheState {
    compiled_snapshot: Option<Arc<Vec<CompiledRule>>>,
    refreshed_at: Option<DateTime<Utc>>,
}

/**
 * Caché de proceso para el set de reglas dinámicas.
 */
pub struct RulesCache {
    time_to_live: Duration,
    state: RwLock<CacheState>,
}

impl RulesCache {
    pub fn new(time_to_live_seconds: i64) -> Self {
        Self {
            time_to_live: Duration::seconds(time_to_live_seconds),
            state: RwLock::new(CacheState { compiled_snapshot: None, refreshed_at: None }),
        }
    }

    /// Cierto cuando no hay snapshot o el sello de refresco expiró.
    pub fn needs_refresh(&self) -> bool {
        let state_guard = self.state.read().expect("FATAL: Rules cache lock poisoned.");
        match (&state_guard.compiled_snapshot, state_guard.refreshed_at) {
            (Some(_), Some(refreshed_at)) => Utc::now() - refreshed_at >= self.time_to_live,
            _ => true,
        }
    }

    /**
     * Sella un set fresco: ordena (priority, rule_id), compila cada
     * expresión y publica el snapshot inmutable.
     */
    pub fn store(&self, mut fresh_rules: Vec<RiskRule>) {
        fresh_rules.sort_by(|left, right| {
            left.priority
                .cmp(&right.priority)
                .then(left.rule_id.cmp(&right.rule_id))
        });

        let compiled_set: Vec<CompiledRule> = fresh_rules
            .into_iter()
            .map(|rule| {
                let compiled = compile_expression(&rule.logic_expression);
                if let Err(compilation_fault) = &compiled {
                    warn!(
                        rule_id = rule.rule_id,
                        "⚠️ [RULE_COMPILE_SKIP]: Expression rejected by sandbox: {}",
                        compilation_fault
                    );
                }
                CompiledRule { rule, compiled }
            })
            .collect();

        info!("📜 [RULE_CACHE]: Sealed {} compiled rules into the live snapshot.", compiled_set.len());

        let mut state_guard = self.state.write().expect("FATAL: Rules cache lock poisoned.");
        state_guard.compiled_snapshot = Some(Arc::new(compiled_set));
        state_guard.refreshed_at = Some(Utc::now());
    }

    /// Snapshot vivo; sin caché previa retorna el set vacío.
    pub fn snapshot(&self) -> Arc<Vec<CompiledRule>> {
        let state_guard = self.state.read().expect("FATAL: Rules cache lock poisoned.");
        state_guard
            .compiled_snapshot
            .clone()
            .unwrap_or_else(|| Arc::new(Vec::new()))
    }

    /**
     * Pasada first-match sobre el snapshot vivo.
     *
     * Reglas con compilación rechazada o interpretación fallida se
     * omiten con rastro; jamás detienen la pasada.
     */
    pub fn evaluate(&self, features: &FeatureBag) -> Option<RuleHit> {
        let live_snapshot = self.snapshot();

        for candidate in live_snapshot.iter() {
            let compiled_tree = match &candidate.compiled {
                Ok(tree) => tree,
                Err(_) => continue,
            };

            match evaluate_compiled(compiled_tree, features) {
                Ok(outcome) if outcome.is_truthy() => {
                    debug!(
                        rule_id = candidate.rule.rule_id,
                        "🎯 [RULE_HIT]: First-match fired: {}", candidate.rule.rule_name
                    );
                    return Some(RuleHit { rule: candidate.rule.clone() });
                }
                Ok(_) => {}
                Err(evaluation_fault) => {
                    warn!(
                        rule_id = candidate.rule.rule_id,
                        "⚠️ [RULE_EVAL_SKIP]: Interpretation fault, rule treated as non-matching: {}",
                        evaluation_fault
                    );
                }
            }
        }

        None
    }
}
