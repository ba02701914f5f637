// [libs/domain/rule-engine/src/errors.rs]
/*!
 * =================================================================
 * APARATO: EXPRESSION ERROR CATALOG (V3.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DEL SANDBOX
 *
 * # Logic:
 * Un fallo de expresión jamás escala: la regla afectada se omite y
 * la cascada continúa. El catálogo existe para el rastro forense.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// La expresión excede el tamaño máximo admitido por el sandbox.
    #[error("[L2_EXPR_FAULT]: SOURCE_OVERSIZED -> {0} bytes")]
    SourceOversized(usize),

    /// Carácter fuera del alfabeto del lenguaje.
    #[error("[L2_EXPR_FAULT]: ILLEGAL_CHARACTER -> '{character}' at byte {position}")]
    IllegalCharacter { character: char, position: usize },

    /// Literal de cadena sin cierre.
    #[error("[L2_EXPR_FAULT]: UNTERMINATED_STRING -> opened at byte {0}")]
    UnterminatedString(usize),

    /// Literal numérico malformado.
    #[error("[L2_EXPR_FAULT]: MALFORMED_NUMBER -> '{0}'")]
    MalformedNumber(String),

    /// Construcción sintáctica fuera del AST restringido.
    #[error("[L2_EXPR_FAULT]: PARSE_REJECTED -> {0}")]
    ParseRejected(String),

    /// Profundidad de anidamiento fuera del presupuesto del sandbox.
    #[error("[L2_EXPR_FAULT]: NESTING_BUDGET_EXCEEDED")]
    NestingBudgetExceeded,

    /// Operación sin semántica para los operandos presentados.
    #[error("[L2_EXPR_FAULT]: TYPE_VIOLATION -> {0}")]
    TypeViolation(String),

    /// División o módulo por cero durante la interpretación.
    #[error("[L2_EXPR_FAULT]: DIVISION_BY_ZERO")]
    DivisionByZero,
}
