use std::fmt;

use arbitrary::Arbitrary;
use minilang::ops::Token;

/// Literals the generated programs use. Small values keep arithmetic interesting,
/// the extremes exercise overflow and floored division.
pub const INTERESTING_LITERALS: &[i64] = &[
    0, 1, 2, 3, 7, -1, -2, -3, -7, 100, i64::MAX, i64::MIN, i64::MAX - 1, i64::MIN + 1,
];

/// A token worth generating: any keyword, a literal, or an occasional invalid word.
pub struct ArbitraryToken(pub String);

impl<'a> Arbitrary<'a> for ArbitraryToken {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let word = match u.int_in_range(0..=20u8)? {
            0..=11 => {
                let idx = u.choose_index(Token::KEYWORDS.len())?;
                Token::KEYWORDS[idx].to_string()
            }
            12..=15 => u.choose(INTERESTING_LITERALS)?.to_string(),
            16..=19 => i64::arbitrary(u)?.to_string(),
            _ => ["XSUB", "push", "+1", "-0", "007"][u.choose_index(5)?].to_string(),
        };
        Ok(ArbitraryToken(word))
    }
}

impl fmt::Debug for ArbitraryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&self.0, f) }
}

pub fn join_tokens(tokens: &[ArbitraryToken]) -> String {
    tokens.iter().map(|t| t.0.as_str()).collect::<Vec<_>>().join(" ")
}
