// [libs/domain/rule-engine/src/eval.rs]
/*!
 * =================================================================
 * APARATO: SANDBOXED INTERPRETER (V3.2 - NULL COALESCING)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: INTERPRETACIÓN PURA DEL AST SOBRE LA BOLSA
 *
 * # Logic:
 * El scope de evaluación expone exclusivamente la bolsa de atributos:
 * cada identificador liga a su valor, con NULL/ausente colapsando a 0.
 * Sin esa neutralidad, una bolsa incompleta dispararía falsos
 * negativos de parseo en vez de "regla no coincidente".
 *
 * Verdad efectiva: números distintos de cero, cadenas no vacías y
 * booleanos verdaderos. La aritmética coerciona booleanos a 0/1; las
 * comparaciones de orden exigen operandos homogéneos (numéricos o
 * textuales) y rechazan mezclas con TypeViolation.
 * =================================================================
 */

use crate::ast::{BinaryOperator, Expression};
use crate::errors::ExpressionError;
use cerberus_domain_models::FeatureBag;
use serde_json::Value;

/// Valor escalar del dominio de evaluación.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl Scalar {
    /// Verdad efectiva del escalar (semántica del lenguaje fuente).
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Number(numeric_value) => *numeric_value != 0.0,
            Scalar::Text(text_value) => !text_value.is_empty(),
            Scalar::Boolean(boolean_value) => *boolean_value,
        }
    }

    /// Coerción numérica laxa (booleanos valen 0/1; cadenas numéricas parsean).
    fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(numeric_value) => Some(*numeric_value),
            Scalar::Boolean(boolean_value) => Some(if *boolean_value { 1.0 } else { 0.0 }),
            Scalar::Text(text_value) => text_value.trim().parse::<f64>().ok(),
        }
    }
}

/// Liga un atributo de la bolsa al dominio escalar; NULL/ausente => 0.
fn bind_attribute(bag: &FeatureBag, attribute_name: &str) -> Scalar {
    match bag.raw(attribute_name) {
        None => Scalar::Number(0.0),
        Some(Value::Bool(boolean_value)) => Scalar::Boolean(*boolean_value),
        Some(Value::Number(numeric_value)) => Scalar::Number(numeric_value.as_f64().unwrap_or(0.0)),
        Some(Value::String(text_value)) => Scalar::Text(text_value.clone()),
        // Estructuras anidadas no son escalares; colapsan al neutro.
        Some(_) => Scalar::Number(0.0),
    }
}

/**
 * Interpreta un AST compilado contra la bolsa de atributos.
 *
 * # Errors:
 * - `TypeViolation`: operación sin semántica para los operandos.
 * - `DivisionByZero`: división o módulo con divisor cero.
 */
pub fn evaluate_compiled(tree: &Expression, bag: &FeatureBag) -> Result<Scalar, ExpressionError> {
    match tree {
        Expression::NumberLiteral(numeric_value) => Ok(Scalar::Number(*numeric_value)),
        Expression::TextLiteral(text_value) => Ok(Scalar::Text(text_value.clone())),
        Expression::BooleanLiteral(boolean_value) => Ok(Scalar::Boolean(*boolean_value)),
        Expression::AttributeReference(attribute_name) => Ok(bind_attribute(bag, attribute_name)),

        Expression::Negate(inner_expression) => {
            let operand = evaluate_compiled(inner_expression, bag)?;
            let numeric_operand = operand.as_number().ok_or_else(|| {
                ExpressionError::TypeViolation("arithmetic negation of non-numeric operand".into())
            })?;
            Ok(Scalar::Number(-numeric_operand))
        }

        Expression::Not(inner_expression) => {
            let operand = evaluate_compiled(inner_expression, bag)?;
            Ok(Scalar::Boolean(!operand.is_truthy()))
        }

        Expression::Binary { operator, left, right } => match operator {
            // Conectivos con cortocircuito.
            BinaryOperator::And => {
                let left_operand = evaluate_compiled(left, bag)?;
                if !left_operand.is_truthy() {
                    return Ok(Scalar::Boolean(false));
                }
                let right_operand = evaluate_compiled(right, bag)?;
                Ok(Scalar::Boolean(right_operand.is_truthy()))
            }
            BinaryOperator::Or => {
                let left_operand = evaluate_compiled(left, bag)?;
                if left_operand.is_truthy() {
                    return Ok(Scalar::Boolean(true));
                }
                let right_operand = evaluate_compiled(right, bag)?;
                Ok(Scalar::Boolean(right_operand.is_truthy()))
            }

            BinaryOperator::Add
            | BinaryOperator::Subtract
            | BinaryOperator::Multiply
            | BinaryOperator::Divide
            | BinaryOperator::Modulo => {
                let left_operand = evaluate_compiled(left, bag)?;
                let right_operand = evaluate_compiled(right, bag)?;
                evaluate_arithmetic(*operator, &left_operand, &right_operand)
            }

            BinaryOperator::Equal | BinaryOperator::NotEqual => {
                let left_operand = evaluate_compiled(left, bag)?;
                let right_operand = evaluate_compiled(right, bag)?;
                let are_equal = scalars_equal(&left_operand, &right_operand);
                Ok(Scalar::Boolean(if *operator == BinaryOperator::Equal {
                    are_equal
                } else {
                    !are_equal
                }))
            }

            BinaryOperator::Less
            | BinaryOperator::LessEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEqual => {
                let left_operand = evaluate_compiled(left, bag)?;
                let right_operand = evaluate_compiled(right, bag)?;
                evaluate_ordering(*operator, &left_operand, &right_operand)
            }
        },
    }
}

fn evaluate_arithmetic(
    operator: BinaryOperator,
    left: &Scalar,
    right: &Scalar,
) -> Result<Scalar, ExpressionError> {
    let (left_number, right_number) = match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => (l, r),
        _ => {
            return Err(ExpressionError::TypeViolation(
                "arithmetic over non-numeric operands".into(),
            ))
        }
    };

    let computed = match operator {
        BinaryOperator::Add => left_number + right_number,
        BinaryOperator::Subtract => left_number - right_number,
        BinaryOperator::Multiply => left_number * right_number,
        BinaryOperator::Divide => {
            if right_number == 0.0 {
                return Err(ExpressionError::DivisionByZero);
            }
            left_number / right_number
        }
        BinaryOperator::Modulo => {
            if right_number == 0.0 {
                return Err(ExpressionError::DivisionByZero);
            }
            left_number % right_number
        }
        _ => unreachable!("non-arithmetic operator routed to arithmetic evaluator"),
    };

    Ok(Scalar::Number(computed))
}

/// Igualdad heterogénea: numérica cuando ambos coercionan, textual entre
/// cadenas; mezclas irreconciliables comparan desiguales (jamás error).
fn scalars_equal(left: &Scalar, right: &Scalar) -> bool {
    if let (Some(left_number), Some(right_number)) = (left.as_number(), right.as_number()) {
        return left_number == right_number;
    }
    match (left, right) {
        (Scalar::Text(left_text), Scalar::Text(right_text)) => left_text == right_text,
        _ => false,
    }
}

fn evaluate_ordering(
    operator: BinaryOperator,
    left: &Scalar,
    right: &Scalar,
) -> Result<Scalar, ExpressionError> {
    let ordering = if let (Some(left_number), Some(right_number)) = (left.as_number(), right.as_number()) {
        left_number.partial_cmp(&right_number)
    } else if let (Scalar::Text(left_text), Scalar::Text(right_text)) = (left, right) {
        Some(left_text.cmp(right_text))
    } else {
        return Err(ExpressionError::TypeViolation(
            "ordering comparison over heterogeneous operands".into(),
        ));
    };

    let ordering = ordering.ok_or_else(|| {
        ExpressionError::TypeViolation("incomparable numeric operands (NaN)".into())
    })?;

    let verdict = match operator {
        BinaryOperator::Less => ordering == std::cmp::Ordering::Less,
        BinaryOperator::LessEqual => ordering != std::cmp::Ordering::Greater,
        BinaryOperator::Greater => ordering == std::cmp::Ordering::Greater,
        BinaryOperator::GreaterEqual => ordering != std::cmp::Ordering::Less,
        _ => unreachable!("non-ordering operator routed to ordering evaluator"),
    };

    Ok(Scalar::Boolean(verdict))
}
