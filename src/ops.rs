use std::fmt;

/// A single parsed word of a Minilang program.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Token {
    /// Replaces the register with the value.
    Literal(i64),
    Push,
    Add,
    Sub,
    Mult,
    /// Floored division of the register by the popped value.
    Div,
    /// Floored modulo, the result takes the sign of the popped value.
    Mod,
    Pop,
    Print,
    /// A word which is neither a literal nor a keyword.
    /// Running it fails the program.
    Invalid(String),
}

impl Token {
    /// All keyword tokens, in the order they are documented.
    pub const KEYWORDS: [Token; 8] = [
        Token::Push,
        Token::Add,
        Token::Sub,
        Token::Mult,
        Token::Div,
        Token::Mod,
        Token::Pop,
        Token::Print,
    ];

    /// Look up a keyword token by its exact (case-sensitive) name.
    pub fn by_keyword(word: &str) -> Option<Token> {
        match word {
            "PUSH" => Some(Token::Push),
            "ADD" => Some(Token::Add),
            "SUB" => Some(Token::Sub),
            "MULT" => Some(Token::Mult),
            "DIV" => Some(Token::Div),
            "MOD" => Some(Token::Mod),
            "POP" => Some(Token::Pop),
            "PRINT" => Some(Token::Print),
            _ => None,
        }
    }

    /// The keyword of an opcode token, `None` for literals and invalid words.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Token::Push => Some("PUSH"),
            Token::Add => Some("ADD"),
            Token::Sub => Some("SUB"),
            Token::Mult => Some("MULT"),
            Token::Div => Some("DIV"),
            Token::Mod => Some("MOD"),
            Token::Pop => Some("POP"),
            Token::Print => Some("PRINT"),
            Token::Literal(_) | Token::Invalid(_) => None,
        }
    }

    /// Whether running this token removes a value from the stack.
    pub fn pops(&self) -> bool {
        matches!(self, Token::Add | Token::Sub | Token::Mult | Token::Div | Token::Mod | Token::Pop)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Token::Invalid(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(value) => write!(f, "{value}"),
            Token::Invalid(word) => write!(f, "{word}"),
            keyword => write!(f, "{}", keyword.keyword().unwrap_or_default()),
        }
    }
}
