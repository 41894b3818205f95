//! Token model for the lexer
//!
//! - **[`TokenKind`]** - closed set of token kinds with their display names
//! - **[`Token`]** - a kind plus the exact source text that matched
//! - **[`TokenStream`]** - owned tokens in input order
//!
//! `StringLiteral` is part of the vocabulary but the tokenizer never
//! produces it.

pub mod token;
pub mod token_stream;

// Re-export key types for convenience
pub use token::{MalformedToken, Token, TokenClass, TokenKind};
pub use token_stream::TokenStream;

pub use token::{is_identifier_continue, is_identifier_start, keyword_kind, symbol_kind};
