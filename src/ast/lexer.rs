use crate::ast::normalizer::normalize_chars;
use crate::error::{CalcError, Result};
use crate::number::{pow10, Number};
use log::trace;
use num_rational::BigRational;

/// Largest magnitude accepted for a literal's decimal exponent (`1e1000`).
const MAX_LITERAL_EXPONENT: i64 = 1000;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    Identifier,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,
    Bang,
    /// `√`, a prefix square root.
    Root,
    LParen,
    RParen,
    Comma,
    End,
}

impl TokenKind {
    fn from_char(c: char) -> Option<TokenKind> {
        match c {
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Star),
            '/' => Some(TokenKind::Slash),
            '^' => Some(TokenKind::Caret),
            '%' => Some(TokenKind::Percent),
            '!' => Some(TokenKind::Bang),
            '√' => Some(TokenKind::Root),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            ',' => Some(TokenKind::Comma),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    /// Char index in the raw (un-normalized) input.
    pub position: usize,
    /// Set for `TokenKind::Number` only.
    pub value: Option<Number>,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
            value: None,
        }
    }
}

/// Lazy token stream over a normalized input. Yields `End` once, then stops;
/// a lexing error also ends the stream. Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct Lexer {
    chars: Vec<(usize, char)>,
    index: usize,
    end_position: usize,
    finished: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: normalize_chars(input),
            index: 0,
            end_position: input.chars().count(),
            finished: false,
        }
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).map(|(_, c)| *c)
    }

    fn source_position(&self) -> usize {
        self.chars
            .get(self.index)
            .map(|(pos, _)| *pos)
            .unwrap_or(self.end_position)
    }

    fn take_while(&mut self, lexeme: &mut String, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char(0).filter(|c| predicate(*c)) {
            lexeme.push(c);
            self.index += 1;
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        while self.peek_char(0).is_some_and(char::is_whitespace) {
            self.index += 1;
        }

        let position = self.source_position();
        let c = match self.peek_char(0) {
            Some(c) => c,
            None => return Ok(Token::new(TokenKind::End, "", position)),
        };

        if c.is_ascii_digit() || (c == '.' && self.peek_char(1).is_some_and(|n| n.is_ascii_digit()))
        {
            return self.lex_number(position);
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let mut lexeme = String::new();
            self.take_while(&mut lexeme, |c| c.is_ascii_alphanumeric() || c == '_');
            return Ok(Token::new(TokenKind::Identifier, lexeme, position));
        }

        match TokenKind::from_char(c) {
            Some(kind) => {
                self.index += 1;
                Ok(Token::new(kind, c.to_string(), position))
            }
            None => Err(CalcError::lex(c, position)),
        }
    }

    fn lex_number(&mut self, position: usize) -> Result<Token> {
        let mut mantissa = String::new();
        self.take_while(&mut mantissa, |c| c.is_ascii_digit());
        if self.peek_char(0) == Some('.') {
            mantissa.push('.');
            self.index += 1;
            self.take_while(&mut mantissa, |c| c.is_ascii_digit());
        }

        let mut value =
            Number::parse_decimal(&mantissa).ok_or_else(|| CalcError::parse("a number", position))?;
        let mut lexeme = mantissa;

        // Scientific suffix: `e` must be followed by digits (optionally signed),
        // otherwise it is the constant and the lexer leaves it alone.
        if matches!(self.peek_char(0), Some('e' | 'E')) {
            let signed = matches!(self.peek_char(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_char(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                let exponent_position = self.source_position();
                let mut exponent = String::new();
                for _ in 0..digit_at {
                    if let Some(c) = self.peek_char(0) {
                        lexeme.push(c);
                        if c != 'e' && c != 'E' {
                            exponent.push(c);
                        }
                        self.index += 1;
                    }
                }
                let mut digits = String::new();
                self.take_while(&mut digits, |c| c.is_ascii_digit());
                lexeme.push_str(&digits);
                exponent.push_str(&digits);

                let exp = exponent
                    .parse::<i64>()
                    .ok()
                    .filter(|exp| exp.abs() <= MAX_LITERAL_EXPONENT)
                    .ok_or_else(|| {
                        CalcError::parse("an exponent between -1000 and 1000", exponent_position)
                    })?;
                let scale = BigRational::from_integer(pow10(exp.unsigned_abs() as u32));
                let ratio = if exp < 0 {
                    value.as_ratio() / scale
                } else {
                    value.as_ratio() * scale
                };
                value = Number::from_ratio(ratio);
            }
        }

        trace!("number literal {} at {}", lexeme, position);
        let mut token = Token::new(TokenKind::Number, lexeme, position);
        token.value = Some(value);
        Ok(token)
    }
}

impl Iterator for Lexer {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if !matches!(&token, Ok(t) if t.kind != TokenKind::End) {
            self.finished = true;
        }
        Some(token)
    }
}

/// Tokenizes the whole input. The last token is always `End`.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_arithmetic() {
        assert_eq!(
            kinds("1 + 2.5*(3)"),
            vec![
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Star,
                TokenKind::LParen,
                TokenKind::Number,
                TokenKind::RParen,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_number_values() {
        let tokens = tokenize("12.75 .5").unwrap();
        assert_eq!(tokens[0].value, Number::parse_decimal("12.75"));
        assert_eq!(tokens[1].value, Number::parse_decimal("0.5"));
        assert_eq!(tokens[1].lexeme, ".5");
    }

    #[test]
    fn test_second_decimal_point_starts_new_literal() {
        let tokens = tokenize("1.2.3").unwrap();
        assert_eq!(tokens[0].lexeme, "1.2");
        assert_eq!(tokens[1].lexeme, ".3");
    }

    #[test]
    fn test_scientific_literal() {
        let tokens = tokenize("1.5e+3 2e-2").unwrap();
        assert_eq!(tokens[0].value, Some(Number::from_integer(1500)));
        assert_eq!(tokens[1].value, Number::parse_decimal("0.02"));
    }

    #[test]
    fn test_bare_e_is_identifier() {
        assert_eq!(
            kinds("2e"),
            vec![TokenKind::Number, TokenKind::Identifier, TokenKind::End]
        );
        let tokens = tokenize("2e+x").unwrap();
        assert_eq!(tokens[1].lexeme, "e");
    }

    #[test]
    fn test_identifiers_and_postfix() {
        let tokens = tokenize("log10(x)!").unwrap();
        assert_eq!(tokens[0].lexeme, "log10");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[4].kind, TokenKind::Bang);
    }

    #[test]
    fn test_glyphs_are_normalized() {
        assert_eq!(
            kinds("2×π"),
            vec![
                TokenKind::Number,
                TokenKind::Star,
                TokenKind::Identifier,
                TokenKind::End
            ]
        );
    }

    #[test]
    fn test_unknown_character() {
        assert_eq!(tokenize("1 + @"), Err(CalcError::lex('@', 4)));
        assert_eq!(tokenize("π$"), Err(CalcError::lex('$', 1)));
        assert_eq!(tokenize("."), Err(CalcError::lex('.', 0)));
    }

    #[test]
    fn test_stream_ends_after_end_token() {
        let mut lexer = Lexer::new("1");
        assert!(lexer.next().is_some());
        assert_eq!(lexer.next().map(|t| t.unwrap().kind), Some(TokenKind::End));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_restartable_from_clone() {
        let mut lexer = Lexer::new("1 + 2");
        lexer.next();
        let restarted: Vec<_> = lexer.clone().collect();
        let continued: Vec<_> = lexer.collect();
        assert_eq!(restarted, continued);
    }

    #[test]
    fn test_positions_follow_source() {
        let positions: Vec<usize> = tokenize(" 12 +  π*x")
            .unwrap()
            .iter()
            .map(|t| t.position)
            .collect();
        assert_eq!(positions, vec![1, 4, 7, 8, 9, 10]);
        assert_eq!(
            tokenize("1e5000"),
            Err(CalcError::parse("an exponent between -1000 and 1000", 1))
        );
    }

    #[test]
    fn test_root_glyph() {
        let tokens = tokenize("2√4").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Root);
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[2].position, 2);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds("   "), vec![TokenKind::End]);
    }
}
