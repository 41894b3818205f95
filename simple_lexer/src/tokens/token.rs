//! Token kinds and the token value produced by the tokenizer
//!
//! Kind names double as the display vocabulary and the serde names,
//! so text output and JSON output agree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of token kinds, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Arithmetic operators
    Plus,  // +
    Minus, // -
    Star,  // *
    Slash, // /

    // Comparison operators
    #[serde(rename = "GE")]
    Ge, // >=
    #[serde(rename = "GT")]
    Gt, // >
    #[serde(rename = "EQ")]
    Eq, // ==
    #[serde(rename = "LE")]
    Le, // <=
    #[serde(rename = "LT")]
    Lt, // <

    // Punctuation
    SemiColon,  // ;
    LeftParen,  // (
    RightParen, // )
    Assignment, // =

    // Keywords
    If,
    Else,
    Int,

    // Names and literals
    Identifier,
    IntegerLiteral,
    /// Reserved; never produced by the tokenizer
    StringLiteral,
}

impl TokenKind {
    /// Every kind, in display order
    pub const ALL: [TokenKind; 19] = [
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
        TokenKind::Ge,
        TokenKind::Gt,
        TokenKind::Eq,
        TokenKind::Le,
        TokenKind::Lt,
        TokenKind::SemiColon,
        TokenKind::LeftParen,
        TokenKind::RightParen,
        TokenKind::Assignment,
        TokenKind::If,
        TokenKind::Else,
        TokenKind::Int,
        TokenKind::Identifier,
        TokenKind::IntegerLiteral,
        TokenKind::StringLiteral,
    ];

    /// Display name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plus => "Plus",
            Self::Minus => "Minus",
            Self::Star => "Star",
            Self::Slash => "Slash",
            Self::Ge => "GE",
            Self::Gt => "GT",
            Self::Eq => "EQ",
            Self::Le => "LE",
            Self::Lt => "LT",
            Self::SemiColon => "SemiColon",
            Self::LeftParen => "LeftParen",
            Self::RightParen => "RightParen",
            Self::Assignment => "Assignment",
            Self::If => "If",
            Self::Else => "Else",
            Self::Int => "Int",
            Self::Identifier => "Identifier",
            Self::IntegerLiteral => "IntegerLiteral",
            Self::StringLiteral => "StringLiteral",
        }
    }

    /// Parse a display name back into a kind
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == name)
    }

    /// Exact source spelling for kinds whose text is fixed
    pub fn fixed_text(&self) -> Option<&'static str> {
        match self {
            Self::Plus => Some("+"),
            Self::Minus => Some("-"),
            Self::Star => Some("*"),
            Self::Slash => Some("/"),
            Self::Ge => Some(">="),
            Self::Gt => Some(">"),
            Self::Eq => Some("=="),
            Self::Le => Some("<="),
            Self::Lt => Some("<"),
            Self::SemiColon => Some(";"),
            Self::LeftParen => Some("("),
            Self::RightParen => Some(")"),
            Self::Assignment => Some("="),
            Self::If => Some("if"),
            Self::Else => Some("else"),
            Self::Int => Some("int"),
            Self::Identifier | Self::IntegerLiteral | Self::StringLiteral => None,
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, Self::If | Self::Else | Self::Int)
    }

    pub fn is_arithmetic_operator(&self) -> bool {
        matches!(self, Self::Plus | Self::Minus | Self::Star | Self::Slash)
    }

    pub fn is_comparison_operator(&self) -> bool {
        matches!(self, Self::Ge | Self::Gt | Self::Eq | Self::Le | Self::Lt)
    }

    pub fn is_operator(&self) -> bool {
        self.is_arithmetic_operator() || self.is_comparison_operator() || *self == Self::Assignment
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::IntegerLiteral | Self::StringLiteral)
    }

    /// Get the classification of this kind
    pub fn token_class(&self) -> TokenClass {
        match self {
            Self::If | Self::Else | Self::Int => TokenClass::Keyword,
            Self::Plus
            | Self::Minus
            | Self::Star
            | Self::Slash
            | Self::Ge
            | Self::Gt
            | Self::Eq
            | Self::Le
            | Self::Lt
            | Self::Assignment => TokenClass::Operator,
            Self::SemiColon | Self::LeftParen | Self::RightParen => TokenClass::Punctuation,
            Self::Identifier => TokenClass::Identifier,
            Self::IntegerLiteral | Self::StringLiteral => TokenClass::Literal,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Keyword,
    Operator,
    Punctuation,
    Identifier,
    Literal,
}

/// A classified run of source characters
///
/// Deserialization rejects text that does not match its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawToken")]
pub struct Token {
    kind: TokenKind,
    text: String,
}

/// Wire form of a [`Token`] before validation
#[derive(Deserialize)]
struct RawToken {
    kind: TokenKind,
    text: String,
}

impl TryFrom<RawToken> for Token {
    type Error = MalformedToken;

    fn try_from(raw: RawToken) -> Result<Self, Self::Error> {
        Token::try_new(raw.kind, raw.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{text:?} is not a well-formed {kind} token")]
pub struct MalformedToken {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    /// Build a token the tokenizer has already validated
    pub(crate) fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Build a token from untrusted parts
    pub fn try_new(kind: TokenKind, text: impl Into<String>) -> Result<Self, MalformedToken> {
        let token = Self::new(kind, text);
        if token.is_well_formed() {
            Ok(token)
        } else {
            Err(MalformedToken {
                kind: token.kind,
                text: token.text,
            })
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }

    /// Check that the text is non-empty and agrees with the kind's grammar
    pub fn is_well_formed(&self) -> bool {
        if self.text.is_empty() {
            return false;
        }

        match self.kind {
            TokenKind::Identifier => {
                let mut chars = self.text.chars();
                chars.next().is_some_and(is_identifier_start)
                    && chars.all(is_identifier_continue)
                    && keyword_kind(&self.text).is_none()
            }
            TokenKind::IntegerLiteral => self.text.chars().all(|c| c.is_ascii_digit()),
            TokenKind::StringLiteral => false,
            kind => kind.fixed_text() == Some(self.text.as_str()),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t\t{}", self.text, self.kind)
    }
}

// === CLASSIFICATION FUNCTIONS ===

/// Characters that can begin an identifier or keyword
pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Characters that can continue an identifier or keyword
pub fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Map a complete word to its keyword kind
pub fn keyword_kind(word: &str) -> Option<TokenKind> {
    match word {
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "int" => Some(TokenKind::Int),
        _ => None,
    }
}

/// Map an operator or punctuation symbol to its kind
pub fn symbol_kind(symbol: &str) -> Option<TokenKind> {
    TokenKind::ALL
        .iter()
        .copied()
        .filter(|kind| !kind.is_keyword())
        .find(|kind| kind.fixed_text() == Some(symbol))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_follow_vocabulary() {
        let names: Vec<&str> = TokenKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Plus",
                "Minus",
                "Star",
                "Slash",
                "GE",
                "GT",
                "EQ",
                "LE",
                "LT",
                "SemiColon",
                "LeftParen",
                "RightParen",
                "Assignment",
                "If",
                "Else",
                "Int",
                "Identifier",
                "IntegerLiteral",
                "StringLiteral",
            ]
        );
    }

    #[test]
    fn test_all_is_sorted_by_ord() {
        let mut sorted = TokenKind::ALL;
        sorted.sort();
        assert_eq!(sorted, TokenKind::ALL);
    }

    #[test]
    fn test_serde_names_match_display_names() {
        for kind in TokenKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(TokenKind::from_name("GE"), Some(TokenKind::Ge));
        assert_eq!(TokenKind::from_name("IntegerLiteral"), Some(TokenKind::IntegerLiteral));
        assert_eq!(TokenKind::from_name("Ge"), None);
    }

    #[test]
    fn test_keyword_and_symbol_lookup() {
        assert_eq!(keyword_kind("int"), Some(TokenKind::Int));
        assert_eq!(keyword_kind("integer"), None);
        assert_eq!(symbol_kind(">="), Some(TokenKind::Ge));
        assert_eq!(symbol_kind("="), Some(TokenKind::Assignment));
        assert_eq!(symbol_kind("=="), Some(TokenKind::Eq));
        assert_eq!(symbol_kind("if"), None);
        assert_eq!(symbol_kind("!"), None);
    }

    #[test]
    fn test_classification() {
        assert_eq!(TokenKind::Else.token_class(), TokenClass::Keyword);
        assert_eq!(TokenKind::Assignment.token_class(), TokenClass::Operator);
        assert_eq!(TokenKind::LeftParen.token_class(), TokenClass::Punctuation);
        assert!(TokenKind::Le.is_comparison_operator());
        assert!(TokenKind::Slash.is_arithmetic_operator());
        assert!(!TokenKind::SemiColon.is_operator());
        assert!(TokenKind::StringLiteral.is_literal());
    }

    #[test]
    fn test_token_display_uses_two_tabs() {
        let token = Token::new(TokenKind::Ge, ">=");
        assert_eq!(token.to_string(), ">=\t\tGE");
    }

    #[test]
    fn test_well_formed_tokens() {
        assert!(Token::new(TokenKind::Identifier, "integer").is_well_formed());
        assert!(Token::new(TokenKind::Identifier, "x1").is_well_formed());
        assert!(Token::new(TokenKind::IntegerLiteral, "007").is_well_formed());
        assert!(Token::new(TokenKind::Int, "int").is_well_formed());

        assert!(!Token::new(TokenKind::Identifier, "int").is_well_formed());
        assert!(!Token::new(TokenKind::Identifier, "1x").is_well_formed());
        assert!(!Token::new(TokenKind::IntegerLiteral, "12a").is_well_formed());
        assert!(!Token::new(TokenKind::Gt, ">=").is_well_formed());
        assert!(!Token::new(TokenKind::Plus, "").is_well_formed());
        assert!(!Token::new(TokenKind::StringLiteral, "s").is_well_formed());
    }

    #[test]
    fn test_token_serializes_kind_and_text() {
        let token = Token::new(TokenKind::IntegerLiteral, "42");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, r#"{"kind":"IntegerLiteral","text":"42"}"#);

        let parsed: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, token);
    }

    #[test]
    fn test_deserialize_rejects_mismatched_text() {
        for json in [
            r#"{"kind":"Int","text":"x"}"#,
            r#"{"kind":"Identifier","text":""}"#,
            r#"{"kind":"Identifier","text":"else"}"#,
            r#"{"kind":"IntegerLiteral","text":"4x"}"#,
            r#"{"kind":"GE","text":">"}"#,
        ] {
            let error = serde_json::from_str::<Token>(json).unwrap_err();
            assert!(error.to_string().contains("not a well-formed"), "json {}", json);
        }
    }

    #[test]
    fn test_try_new() {
        let token = Token::try_new(TokenKind::Else, "else").unwrap();
        assert_eq!(token.kind(), TokenKind::Else);
        assert_eq!(token.into_text(), "else");

        assert_eq!(
            Token::try_new(TokenKind::Int, "x"),
            Err(MalformedToken {
                kind: TokenKind::Int,
                text: "x".to_string(),
            })
        );
    }
}
