//! Turning Minilang source text into a [`Program`].
use std::{convert::Infallible, fmt, str::FromStr};

use thiserror::Error;

use crate::ops::Token;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("Unknown command `{word}` at token {index}.")]
    UnknownCommand { word: String, index: usize },
}

/// A parsed Minilang program. Immutable once created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    tokens: Vec<Token>,
}

impl Program {
    pub fn new(tokens: Vec<Token>) -> Self {
        Program { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Fails on the first word that is not a literal or a keyword.
    ///
    /// Running a program does not require this, invalid words only fail
    /// when the evaluation reaches them.
    pub fn check(&self) -> Result<(), ParserError> {
        match self.tokens.iter().position(Token::is_invalid) {
            Some(index) => Err(ParserError::UnknownCommand {
                word: self.tokens[index].to_string(),
                index,
            }),
            None => Ok(()),
        }
    }
}

impl FromStr for Program {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_program(s))
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Split source text into words. There is no quoting and no comments.
pub fn tokenize(source: &str) -> impl Iterator<Item = &str> {
    source.split_ascii_whitespace()
}

/// Parse a single word.
///
/// Only the canonical decimal form of an integer is a literal: an optional
/// `-`, no `+`, and no leading zeros. `+5`, `007` and `-0` are invalid words.
pub fn parse_word(word: &str) -> Token {
    if let Some(token) = Token::by_keyword(word) {
        return token;
    }
    if is_canonical_integer(word) {
        if let Ok(value) = word.parse::<i64>() {
            return Token::Literal(value);
        }
    }
    Token::Invalid(word.to_string())
}

fn is_canonical_integer(word: &str) -> bool {
    let digits = word.strip_prefix('-').unwrap_or(word);
    let Some(first) = digits.bytes().next() else {
        return false;
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if first == b'0' {
        // "0" is the only canonical form starting with zero, and "-0" is not canonical.
        return digits.len() == 1 && digits.len() == word.len();
    }
    true
}

pub fn parse_program(source: &str) -> Program {
    Program::new(tokenize(source).map(parse_word).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(parse_program("").is_empty());
        assert!(parse_program("  \n\t ").is_empty());
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            parse_program("PUSH ADD SUB MULT DIV MOD POP PRINT").tokens(),
            &Token::KEYWORDS
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_word("0"), Token::Literal(0));
        assert_eq!(parse_word("5"), Token::Literal(5));
        assert_eq!(parse_word("-3"), Token::Literal(-3));
        assert_eq!(parse_word("9223372036854775807"), Token::Literal(i64::MAX));
        assert_eq!(parse_word("-9223372036854775808"), Token::Literal(i64::MIN));
    }

    #[test]
    fn test_non_canonical_literals_are_invalid() {
        for word in ["+5", "007", "-0", "-", "5.0", "1e3", "9223372036854775808", "0x10", "--1"] {
            assert_eq!(parse_word(word), Token::Invalid(word.to_string()), "{word}");
        }
    }

    #[test]
    fn test_whitespace_splitting() {
        let program = parse_program(" 3 PUSH\tPUSH\n7 DIV  MULT PRINT ");
        assert_eq!(
            program.tokens(),
            &[
                Token::Literal(3),
                Token::Push,
                Token::Push,
                Token::Literal(7),
                Token::Div,
                Token::Mult,
                Token::Print,
            ]
        );
        assert_eq!(program.to_string(), "3 PUSH PUSH 7 DIV MULT PRINT");
    }

    #[test]
    fn test_only_ascii_whitespace_separates() {
        let program = parse_program("5\u{a0}PRINT\u{2003}PUSH");
        assert_eq!(program.tokens(), &[Token::Invalid("5\u{a0}PRINT\u{2003}PUSH".to_string())]);
        assert_eq!(parse_program("5\x0cPRINT\r\nPUSH").len(), 3);
    }

    #[test]
    fn test_invalid_is_kept() {
        let program = parse_program("-3 PUSH 5 XSUB PRINT");
        assert_eq!(program.len(), 5);
        assert_eq!(program.tokens()[3], Token::Invalid("XSUB".to_string()));
        assert_eq!(
            program.check(),
            Err(ParserError::UnknownCommand { word: "XSUB".to_string(), index: 3 })
        );
    }

    #[test]
    fn test_check_ok() {
        assert_eq!(parse_program("5 PUSH 3 MULT PRINT").check(), Ok(()));
        assert_eq!(parse_program("").check(), Ok(()));
    }

    #[test]
    fn test_from_str() {
        let program: Program = "PRINT".parse().unwrap();
        assert_eq!(program.tokens(), &[Token::Print]);
    }
}
