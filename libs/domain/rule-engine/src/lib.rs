// [libs/domain/rule-engine/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DYNAMIC RULE ENGINE BARREL (V3.0 - SANDBOX SEALED)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DEL LENGUAJE Y LA CACHÉ
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PARSE, DON'T EVAL: La expresión de cada regla es texto no
 *    confiable. Se compila a un AST restringido (literales,
 *    identificadores, aritmética, comparación, conectivos) y se
 *    interpreta sin capacidad alguna de host (sin I/O, sin llamadas).
 * 2. FIRST MATCH WINS: Evaluación en orden de prioridad ascendente
 *    con desempate estable por rule_id.
 * 3. STALE-ON-FAILURE: La caché conserva el último set compilado
 *    cuando el refresco falla; sin caché previa opera como set vacío.
 * =================================================================
 */

/// Catálogo semántico de fallos del lenguaje de expresiones.
pub mod errors;
/// Escáner léxico del lenguaje de reglas.
pub mod lexer;
/// Definición del árbol de sintaxis restringido.
pub mod ast;
/// Analizador sintáctico descendente-recursivo.
pub mod parser;
/// Intérprete del AST sobre la bolsa de atributos.
pub mod eval;
/// Caché de reglas compiladas con TTL y evaluación first-match.
pub mod engine;

pub use errors::ExpressionError;
pub use ast::Expression;
pub use parser::compile_expression;
pub use eval::{evaluate_compiled, Scalar};
pub use engine::{CompiledRule, RuleHit, RulesCache};
