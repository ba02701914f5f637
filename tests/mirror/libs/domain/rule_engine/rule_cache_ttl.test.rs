// [tests/mirror/libs/domain/rule_engine/rule_cache_ttl.test.rs]
/*!
 * =================================================================
 * APARATO: RULE CACHE TTL TEST (V3.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2
 * RESPONSABILIDAD: CERTIFICACIÓN DEL CICLO TTL Y STALE-ON-FAILURE
 *
 * # Logic:
 * Dentro del TTL se sirve el set viejo; al expirar, el primer
 * refresco exitoso publica el nuevo. Un refresco fallido (el
 * llamador no sella nada) conserva el snapshot previo.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use cerberus_domain_models::{FeatureBag, RiskRule, RuleAction};
    use cerberus_domain_rules::RulesCache;
    use serde_json::json;

    fn rule(rule_id: i64, priority: i64, expression: &str, action: RuleAction) -> RiskRule {
        RiskRule {
            rule_id,
            rule_name: format!("rule-{rule_id}"),
            priority,
            logic_expression: expression.to_string(),
            action,
            narrative: format!("narrative {rule_id}"),
        }
    }

    fn bag(fixture: serde_json::Value) -> FeatureBag {
        serde_json::from_value(fixture).unwrap()
    }

    #[test]
    fn certify_old_ruleset_is_served_within_ttl() {
        let cache = RulesCache::new(300);
        cache.store(vec![rule(1, 1, "amount > 100", RuleAction::Hold)]);

        // Dentro del TTL el motor no pide refresco y sirve el set sellado.
        assert!(!cache.needs_refresh());
        let hit = cache.evaluate(&bag(json!({ "amount": 500 }))).expect("rule must fire");
        assert_eq!(hit.rule.rule_id, 1);
        assert_eq!(hit.rule.action, RuleAction::Hold);
    }

    #[test]
    fn certify_fresh_store_replaces_the_snapshot() {
        let cache = RulesCache::new(300);
        cache.store(vec![rule(1, 1, "amount > 100", RuleAction::Hold)]);

        // Simula el refresco post-TTL con el set actualizado del Ledger.
        cache.store(vec![rule(2, 1, "amount > 100", RuleAction::Reject)]);

        let hit = cache.evaluate(&bag(json!({ "amount": 500 }))).expect("rule must fire");
        assert_eq!(hit.rule.rule_id, 2);
        assert_eq!(hit.rule.action, RuleAction::Reject);
    }

    #[test]
    fn certify_failed_refresh_retains_the_stale_snapshot() {
        let cache = RulesCache::new(0);
        cache.store(vec![rule(7, 1, "amount > 0", RuleAction::Pass)]);

        // TTL cero: expirado de inmediato. El llamador intenta refrescar,
        // su fetch falla y NO sella nada: el snapshot viejo sigue vivo.
        assert!(cache.needs_refresh());
        let hit = cache.evaluate(&bag(json!({ "amount": 1 }))).expect("stale rule must fire");
        assert_eq!(hit.rule.rule_id, 7);
    }

    #[test]
    fn certify_cold_cache_without_successful_fetch_acts_empty() {
        let cache = RulesCache::new(300);
        assert!(cache.needs_refresh());
        assert!(cache.evaluate(&bag(json!({ "amount": 1 }))).is_none());
    }
}
