// [libs/domain/rule-engine/src/parser.rs]
/*!
 * =================================================================
 * APARATO: RECURSIVE DESCENT PARSER (V3.2 - DEPTH GUARDED)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: COMPILACIÓN DE TEXTO NO CONFIABLE A AST CERRADO
 *
 * # Logic:
 * Gramática por precedencia ascendente:
 *   or_expr    := and_expr (OR and_expr)*
 *   and_expr   := not_expr (AND not_expr)*
 *   not_expr   := NOT not_expr | comparison
 *   comparison := additive ((==|!=|<|<=|>|>=) additive)?
 *   additive   := multiplicative ((+|-) multiplicative)*
 *   multiplicative := unary ((*|/|%) unary)*
 *   unary      := - unary | primary
 *   primary    := NUMBER | STRING | BOOL | IDENT | ( or_expr )
 * El anidamiento se limita con un presupuesto de profundidad para
 * que entradas patológicas no desborden la pila.
 * =================================================================
 */

use crate::ast::{BinaryOperator, Expression};
use crate::errors::ExpressionError;
use crate::lexer::{scan_tokens, Token};

/// Presupuesto de profundidad de anidamiento del sandbox.
const MAX_NESTING_DEPTH: usize = 64;

/**
 * Compila una expresión de regla a su AST restringido.
 *
 * # Errors:
 * Cualquier construcción fuera de la gramática cerrada se rechaza;
 * el llamador trata el rechazo como "regla no coincidente".
 */
pub fn compile_expression(source: &str) -> Result<Expression, ExpressionError> {
    let token_stream = scan_tokens(source)?;
    if token_stream.is_empty() {
        return Err(ExpressionError::ParseRejected("empty expression".into()));
    }

    let mut parser_state = ParserState { tokens: token_stream, cursor: 0 };
    let compiled_tree = parser_state.parse_or_expression(0)?;

    if parser_state.cursor != parser_state.tokens.len() {
        return Err(ExpressionError::ParseRejected(format!(
            "trailing tokens at position {}",
            parser_state.cursor
        )));
    }

    Ok(compiled_tree)
}

struct ParserState {
    tokens: Vec<Token>,
    cursor: usize,
}

impl ParserState {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn guard_depth(depth: usize) -> Result<(), ExpressionError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(ExpressionError::NestingBudgetExceeded);
        }
        Ok(())
    }

    fn parse_or_expression(&mut self, depth: usize) -> Result<Expression, ExpressionError> {
        Self::guard_depth(depth)?;
        let mut accumulated = self.parse_and_expression(depth + 1)?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.advance();
            let right_operand = self.parse_and_expression(depth + 1)?;
            accumulated = Expression::Binary {
                operator: BinaryOperator::Or,
                left: Box::new(accumulated),
                right: Box::new(right_operand),
            };
        }
        Ok(accumulated)
    }

    fn parse_and_expression(&mut self, depth: usize) -> Result<Expression, ExpressionError> {
        Self::guard_depth(depth)?;
        let mut accumulated = self.parse_not_expression(depth + 1)?;
        while matches!(self.peek(), Some(Token::And)) {
            self.advance();
            let right_operand = self.parse_not_expression(depth + 1)?;
            accumulated = Expression::Binary {
                operator: BinaryOperator::And,
                left: Box::new(accumulated),
                right: Box::new(right_operand),
            };
        }
        Ok(accumulated)
    }

    fn parse_not_expression(&mut self, depth: usize) -> Result<Expression, ExpressionError> {
        Self::guard_depth(depth)?;
        if matches!(self.peek(), Some(Token::Not)) {
            self.advance();
            let negated_operand = self.parse_not_expression(depth + 1)?;
            return Ok(Expression::Not(Box::new(negated_operand)));
        }
        self.parse_comparison(depth + 1)
    }

    fn parse_comparison(&mut self, depth: usize) -> Result<Expression, ExpressionError> {
        Self::guard_depth(depth)?;
        let left_operand = self.parse_additive(depth + 1)?;

        let comparison_operator = match self.peek() {
            Some(Token::EqualEqual) => Some(BinaryOperator::Equal),
            Some(Token::NotEqual) => Some(BinaryOperator::NotEqual),
            Some(Token::Less) => Some(BinaryOperator::Less),
            Some(Token::LessEqual) => Some(BinaryOperator::LessEqual),
            Some(Token::Greater) => Some(BinaryOperator::Greater),
            Some(Token::GreaterEqual) => Some(BinaryOperator::GreaterEqual),
            _ => None,
        };

        if let Some(operator) = comparison_operator {
            self.advance();
            let right_operand = self.parse_additive(depth + 1)?;
            return Ok(Expression::Binary {
                operator,
                left: Box::new(left_operand),
                right: Box::new(right_operand),
            });
        }

        Ok(left_operand)
    }

    fn parse_additive(&mut self, depth: usize) -> Result<Expression, ExpressionError> {
        Self::guard_depth(depth)?;
        let mut accumulated = self.parse_multiplicative(depth + 1)?;
        loop {
            let operator = match self.peek() {
                Some(Token::Plus) => BinaryOperator::Add,
                Some(Token::Minus) => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();
            let right_operand = self.parse_multiplicative(depth + 1)?;
            accumulated = Expression::Binary {
                operator,
                left: Box::new(accumulated),
                right: Box::new(right_operand),
            };
        }
        Ok(accumulated)
    }

    fn parse_multiplicative(&mut self, depth: usize) -> Result<Expression, ExpressionError> {
        Self::guard_depth(depth)?;
        let mut accumulated = self.parse_unary(depth + 1)?;
        loop {
            let operator = match self.peek() {
                Some(Token::Star) => BinaryOperator::Multiply,
                Some(Token::Slash) => BinaryOperator::Divide,
                Some(Token::Percent) => BinaryOperator::Modulo,
                _ => break,
            };
            self.advance();
            let right_operand = self.parse_unary(depth + 1)?;
            accumulated = Expression::Binary {
                operator,
                left: Box::new(accumulated),
                right: Box::new(right_operand),
            };
        }
        Ok(accumulated)
    }

    fn parse_unary(&mut self, depth: usize) -> Result<Expression, ExpressionError> {
        Self::guard_depth(depth)?;
        if matches!(self.peek(), Some(Token::Minus)) {
            self.advance();
            let negated_operand = self.parse_unary(depth + 1)?;
            return Ok(Expression::Negate(Box::new(negated_operand)));
        }
        self.parse_primary(depth + 1)
    }

    fn parse_primary(&mut self, depth: usize) -> Result<Expression, ExpressionError> {
        Self::guard_depth(depth)?;
        match self.advance() {
            Some(Token::Number(numeric_value)) => Ok(Expression::NumberLiteral(numeric_value)),
            Some(Token::Text(text_value)) => Ok(Expression::TextLiteral(text_value)),
            Some(Token::True) => Ok(Expression::BooleanLiteral(true)),
            Some(Token::False) => Ok(Expression::BooleanLiteral(false)),
            Some(Token::Identifier(attribute_name)) => {
                Ok(Expression::AttributeReference(attribute_name))
            }
            Some(Token::LeftParen) => {
                let inner_expression = self.parse_or_expression(depth + 1)?;
                match self.advance() {
                    Some(Token::RightParen) => Ok(inner_expression),
                    _ => Err(ExpressionError::ParseRejected("missing closing parenthesis".into())),
                }
            }
            other_token => Err(ExpressionError::ParseRejected(format!(
                "unexpected token {:?}",
                other_token
            ))),
        }
    }
}
