// [tests/mirror/libs/domain/rule_engine/expression_sandbox.test.rs]
/*!
 * =================================================================
 * APARATO: EXPRESSION SANDBOX TORTURE TEST (V3.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2
 * RESPONSABILIDAD: CERTIFICACIÓN DEL AISLAMIENTO DEL LENGUAJE
 *
 * # Logic:
 * La expresión de cada regla es texto no confiable de una tabla
 * operativa. Este aparato certifica que el lenguaje es incapaz de
 * expresar acceso al host, que entradas patológicas no derriban el
 * proceso y que la semántica NULL->0 nunca dispara predicados
 * estrictamente positivos.
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use cerberus_domain_models::FeatureBag;
    use cerberus_domain_rules::{compile_expression, evaluate_compiled, ExpressionError};
    use proptest::prelude::*;
    use serde_json::json;

    fn bag(fixture: serde_json::Value) -> FeatureBag {
        serde_json::from_value(fixture).expect("fixture must be an object")
    }

    fn eval_truthy(source: &str, fixture: serde_json::Value) -> Result<bool, ExpressionError> {
        let tree = compile_expression(source)?;
        Ok(evaluate_compiled(&tree, &bag(fixture))?.is_truthy())
    }

    #[test]
    fn certify_host_escape_attempts_are_rejected_at_parse_time() {
        let hostile_sources = [
            "__import__('os').system('id')",
            "open('/etc/passwd')",
            "exec('print(1)')",
            "withdrawal_amount.__class__",
            "amount; drop table risk_rules",
            "lambda: 1",
            "[1,2,3]",
            "{'k': 1}",
            "x = 10",
        ];

        for hostile_source in hostile_sources {
            assert!(
                compile_expression(hostile_source).is_err(),
                "SANDBOX_BREACH: '{hostile_source}' compiled"
            );
        }
    }

    #[test]
    fn certify_null_only_bags_never_satisfy_positive_predicates() {
        let null_bag = json!({
            "withdrawal_amount": null,
            "account_maturity": null,
            "destination_age_hours": null
        });

        let strictly_positive_rules = [
            "withdrawal_amount > 0",
            "account_maturity > 0 and withdrawal_amount > 0",
            "destination_age_hours > 1 or withdrawal_amount > 1",
        ];

        for rule_source in strictly_positive_rules {
            assert!(
                !eval_truthy(rule_source, null_bag.clone()).unwrap(),
                "NULL_COALESCE_FAULT: '{rule_source}' fired on an all-null bag"
            );
        }
    }

    #[test]
    fn certify_canonical_production_rules_evaluate() {
        let case = json!({
            "withdrawal_amount": 20000,
            "is_new_destination_address": true,
            "is_impossible_travel": false,
            "time_since_user_login": 3.0,
            "destination_age_hours": 2,
            "chain": "ETH"
        });

        assert!(eval_truthy("withdrawal_amount > 10000 and is_new_destination_address", case.clone()).unwrap());
        assert!(eval_truthy("destination_age_hours < 24 and withdrawal_amount >= 5000", case.clone()).unwrap());
        assert!(eval_truthy("time_since_user_login < 5 or is_impossible_travel", case.clone()).unwrap());
        assert!(!eval_truthy("is_impossible_travel and chain == 'ETH'", case.clone()).unwrap());
        assert!(eval_truthy("not is_impossible_travel and chain == 'ETH'", case).unwrap());
    }

    #[test]
    fn certify_evaluation_faults_surface_as_errors_not_panics() {
        let case = json!({ "chain": "ETH", "amount": 5 });
        assert!(matches!(
            eval_truthy("chain > 100", case.clone()),
            Err(ExpressionError::TypeViolation(_))
        ));
        assert!(matches!(
            eval_truthy("amount / 0 == 1", case),
            Err(ExpressionError::DivisionByZero)
        ));
    }

    proptest! {
        /// El compilador jamás entra en pánico ante bytes arbitrarios.
        #[test]
        fn certify_compiler_total_on_arbitrary_input(raw_source in "\\PC{0,120}") {
            let _ = compile_expression(&raw_source);
        }

        /// Lo compilado jamás entra en pánico al interpretarse.
        #[test]
        fn certify_interpreter_total_on_compiled_trees(
            left_value in -1000i64..1000,
            right_value in -1000i64..1000
        ) {
            let source = format!("(a + {left_value}) * 2 >= b - {right_value} and a != b or not a");
            if let Ok(tree) = compile_expression(&source) {
                let case = bag(json!({ "a": left_value, "b": right_value }));
                let _ = evaluate_compiled(&tree, &case);
            }
        }
    }
}
