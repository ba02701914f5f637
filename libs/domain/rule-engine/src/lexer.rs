// [libs/domain/rule-engine/src/lexer.rs]
/*!
 * =================================================================
 * APARATO: EXPRESSION LEXER (V3.1 - ALPHABET SEALED)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: ESCANEO LÉXICO DEL LENGUAJE DE REGLAS
 *
 * # Logic:
 * El alfabeto admitido es cerrado: números, cadenas entre comillas
 * simples o dobles, identificadores [A-Za-z_][A-Za-z0-9_]*, los
 * operadores aritméticos y de comparación, conectivos booleanos en
 * forma textual (and/or/not) o simbólica (&&/||/!) y paréntesis.
 * Cualquier otro byte aborta el escaneo con su posición.
 * =================================================================
 */

use crate::errors::ExpressionError;

/// Presupuesto máximo de una expresión de regla (bytes).
pub const MAX_EXPRESSION_BYTES: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Text(String),
    Identifier(String),
    True,
    False,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqualEqual,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LeftParen,
    RightParen,
}

/**
 * Escanea la expresión completa a una secuencia de tokens.
 *
 * # Errors:
 * - `SourceOversized`: presupuesto de bytes excedido.
 * - `IllegalCharacter` / `UnterminatedString` / `MalformedNumber`.
 */
pub fn scan_tokens(source: &str) -> Result<Vec<Token>, ExpressionError> {
    if source.len() > MAX_EXPRESSION_BYTES {
        return Err(ExpressionError::SourceOversized(source.len()));
    }

    let source_characters: Vec<char> = source.chars().collect();
    let mut token_stream = Vec::new();
    let mut cursor = 0usize;

    while cursor < source_characters.len() {
        let current_character = source_characters[cursor];

        match current_character {
            ' ' | '\t' | '\r' | '\n' => cursor += 1,

            '(' => { token_stream.push(Token::LeftParen); cursor += 1; }
            ')' => { token_stream.push(Token::RightParen); cursor += 1; }
            '+' => { token_stream.push(Token::Plus); cursor += 1; }
            '-' => { token_stream.push(Token::Minus); cursor += 1; }
            '*' => { token_stream.push(Token::Star); cursor += 1; }
            '/' => { token_stream.push(Token::Slash); cursor += 1; }
            '%' => { token_stream.push(Token::Percent); cursor += 1; }

            '=' => {
                if matches!(source_characters.get(cursor + 1), Some('=')) {
                    token_stream.push(Token::EqualEqual);
                    cursor += 2;
                } else {
                    // Asignación no existe en el sandbox; '=' aislado es ilegal.
                    return Err(ExpressionError::IllegalCharacter { character: '=', position: cursor });
                }
            }
            '!' => {
                if matches!(source_characters.get(cursor + 1), Some('=')) {
                    token_stream.push(Token::NotEqual);
                    cursor += 2;
                } else {
                    token_stream.push(Token::Not);
                    cursor += 1;
                }
            }
            '<' => {
                if matches!(source_characters.get(cursor + 1), Some('=')) {
                    token_stream.push(Token::LessEqual);
                    cursor += 2;
                } else {
                    token_stream.push(Token::Less);
                    cursor += 1;
                }
            }
            '>' => {
                if matches!(source_characters.get(cursor + 1), Some('=')) {
                    token_stream.push(Token::GreaterEqual);
                    cursor += 2;
                } else {
                    token_stream.push(Token::Greater);
                    cursor += 1;
                }
            }
            '&' => {
                if matches!(source_characters.get(cursor + 1), Some('&')) {
                    token_stream.push(Token::And);
                    cursor += 2;
                } else {
                    return Err(ExpressionError::IllegalCharacter { character: '&', position: cursor });
                }
            }
            '|' => {
                if matches!(source_characters.get(cursor + 1), Some('|')) {
                    token_stream.push(Token::Or);
                    cursor += 2;
                } else {
                    return Err(ExpressionError::IllegalCharacter { character: '|', position: cursor });
                }
            }

            '\'' | '"' => {
                let quote_character = current_character;
                let opening_position = cursor;
                cursor += 1;
                let mut literal_buffer = String::new();
                let mut terminated = false;
                while cursor < source_characters.len() {
                    let inner_character = source_characters[cursor];
                    if inner_character == quote_character {
                        terminated = true;
                        cursor += 1;
                        break;
                    }
                    literal_buffer.push(inner_character);
                    cursor += 1;
                }
                if !terminated {
                    return Err(ExpressionError::UnterminatedString(opening_position));
                }
                token_stream.push(Token::Text(literal_buffer));
            }

            digit if digit.is_ascii_digit() => {
                let mut numeric_buffer = String::new();
                while cursor < source_characters.len()
                    && (source_characters[cursor].is_ascii_digit() || source_characters[cursor] == '.')
                {
                    numeric_buffer.push(source_characters[cursor]);
                    cursor += 1;
                }
                let parsed_value = numeric_buffer
                    .parse::<f64>()
                    .map_err(|_| ExpressionError::MalformedNumber(numeric_buffer.clone()))?;
                token_stream.push(Token::Number(parsed_value));
            }

            alpha if alpha.is_ascii_alphabetic() || alpha == '_' => {
                let mut identifier_buffer = String::new();
                while cursor < source_characters.len()
                    && (source_characters[cursor].is_ascii_alphanumeric() || source_characters[cursor] == '_')
                {
                    identifier_buffer.push(source_characters[cursor]);
                    cursor += 1;
                }
                // Palabras reservadas del sandbox (insensibles a mayúsculas).
                match identifier_buffer.to_ascii_lowercase().as_str() {
                    "and" => token_stream.push(Token::And),
                    "or" => token_stream.push(Token::Or),
                    "not" => token_stream.push(Token::Not),
                    "true" => token_stream.push(Token::True),
                    "false" => token_stream.push(Token::False),
                    _ => token_stream.push(Token::Identifier(identifier_buffer)),
                }
            }

            illegal => {
                return Err(ExpressionError::IllegalCharacter { character: illegal, position: cursor });
            }
        }
    }

    Ok(token_stream)
}
