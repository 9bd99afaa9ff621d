//! Tokenizer for formula text.

use crate::types::{FormulaError, Result};

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    True,
    False,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Question,
    Colon,
}

impl Token {
    /// Source-like rendering for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Number(n) => format!("number {n}"),
            Self::Ident(name) => format!("identifier '{name}'"),
            Self::True => "'true'".into(),
            Self::False => "'false'".into(),
            Self::Plus => "'+'".into(),
            Self::Minus => "'-'".into(),
            Self::Star => "'*'".into(),
            Self::Slash => "'/'".into(),
            Self::LParen => "'('".into(),
            Self::RParen => "')'".into(),
            Self::Bang => "'!'".into(),
            Self::AndAnd => "'&&'".into(),
            Self::OrOr => "'||'".into(),
            Self::EqEq => "'=='".into(),
            Self::NotEq => "'!='".into(),
            Self::Lt => "'<'".into(),
            Self::Gt => "'>'".into(),
            Self::Le => "'<='".into(),
            Self::Ge => "'>='".into(),
            Self::Question => "'?'".into(),
            Self::Colon => "':'".into(),
        }
    }
}

/// A token with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

/// Splits formula text into tokens.
pub fn tokenize(text: &str) -> Result<Vec<Spanned>> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < len {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;

        if b.is_ascii_digit() || (b == b'.' && i + 1 < len && bytes[i + 1].is_ascii_digit()) {
            let mut seen_dot = false;
            while i < len && (bytes[i].is_ascii_digit() || (bytes[i] == b'.' && !seen_dot)) {
                if bytes[i] == b'.' {
                    seen_dot = true;
                }
                i += 1;
            }
            let raw = &text[start..i];
            let value = raw
                .parse::<f64>()
                .map_err(|_| FormulaError::syntax(start, format!("invalid number '{raw}'")))?;
            tokens.push(Spanned {
                token: Token::Number(value),
                pos: start,
            });
            continue;
        }

        if is_ident_start(b) {
            while i < len && is_ident_cont(bytes[i]) {
                i += 1;
            }
            let token = match &text[start..i] {
                "true" => Token::True,
                "false" => Token::False,
                name => Token::Ident(name.to_string()),
            };
            tokens.push(Spanned { token, pos: start });
            continue;
        }

        let next = bytes.get(i + 1).copied();
        let (token, width) = match (b, next) {
            (b'&', Some(b'&')) => (Token::AndAnd, 2),
            (b'|', Some(b'|')) => (Token::OrOr, 2),
            (b'=', Some(b'=')) => (Token::EqEq, 2),
            (b'!', Some(b'=')) => (Token::NotEq, 2),
            (b'<', Some(b'=')) => (Token::Le, 2),
            (b'>', Some(b'=')) => (Token::Ge, 2),
            (b'<', _) => (Token::Lt, 1),
            (b'>', _) => (Token::Gt, 1),
            (b'!', _) => (Token::Bang, 1),
            (b'+', _) => (Token::Plus, 1),
            (b'-', _) => (Token::Minus, 1),
            (b'*', _) => (Token::Star, 1),
            (b'/', _) => (Token::Slash, 1),
            (b'(', _) => (Token::LParen, 1),
            (b')', _) => (Token::RParen, 1),
            (b'?', _) => (Token::Question, 1),
            (b':', _) => (Token::Colon, 1),
            (b'&', _) => return Err(FormulaError::syntax(start, "expected '&&'")),
            (b'|', _) => return Err(FormulaError::syntax(start, "expected '||'")),
            (b'=', _) => return Err(FormulaError::syntax(start, "expected '=='")),
            _ => {
                let ch = text[start..].chars().next().unwrap_or('?');
                return Err(FormulaError::syntax(
                    start,
                    format!("unexpected character '{ch}'"),
                ));
            }
        };
        tokens.push(Spanned { token, pos: start });
        i += width;
    }

    Ok(tokens)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_cont(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(text: &str) -> Vec<Token> {
        tokenize(text).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn tokenizes_arithmetic() {
        assert_eq!(
            kinds("field3 * 2.5"),
            vec![Token::Ident("field3".into()), Token::Star, Token::Number(2.5)]
        );
    }

    #[test]
    fn identifiers_are_whole_tokens() {
        assert_eq!(
            kinds("field23+field2"),
            vec![
                Token::Ident("field23".into()),
                Token::Plus,
                Token::Ident("field2".into()),
            ]
        );
    }

    #[test]
    fn two_character_operators() {
        assert_eq!(
            kinds("a<=b && c!=d || !e"),
            vec![
                Token::Ident("a".into()),
                Token::Le,
                Token::Ident("b".into()),
                Token::AndAnd,
                Token::Ident("c".into()),
                Token::NotEq,
                Token::Ident("d".into()),
                Token::OrOr,
                Token::Bang,
                Token::Ident("e".into()),
            ]
        );
    }

    #[test]
    fn boolean_keywords() {
        assert_eq!(kinds("true false"), vec![Token::True, Token::False]);
    }

    #[test]
    fn leading_dot_number() {
        assert_eq!(kinds(".5"), vec![Token::Number(0.5)]);
    }

    #[test]
    fn records_positions() {
        let tokens = tokenize("  value /  2").unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| t.pos).collect();
        assert_eq!(positions, vec![2, 8, 11]);
    }

    #[test]
    fn rejects_single_ampersand() {
        let err = tokenize("a & b").unwrap_err();
        assert_eq!(err, FormulaError::syntax(2, "expected '&&'"));
    }

    #[test]
    fn rejects_string_literals() {
        let err = tokenize("'abc'").unwrap_err();
        assert!(err.is_syntax());
        assert!(err.to_string().contains("unexpected character"));
    }
}
