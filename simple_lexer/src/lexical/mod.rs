//! Lexical analysis module
//!
//! [`dfa`] holds the recognizer's states and its single transition function.
//! [`analyzer`] drives it over a [`CharSource`] one token at a time. The
//! functions here collect whole inputs into a [`TokenStream`] under the
//! compile-time token count limit.

pub mod analyzer;
pub mod dfa;

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::logging::codes;
use crate::source::{CharSource, ReaderSource, StrSource};
use crate::tokens::{Token, TokenClass, TokenKind, TokenStream};
use crate::{log_debug, log_error, log_performance};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::time::Instant;

pub use analyzer::{LexerError, LexicalMetrics, Tokenizer};
pub use dfa::{transition, Action, DfaState};

/// Tokenize an in-memory string
pub fn tokenize_str(input: &str) -> Result<Vec<Token>, LexerError> {
    tokenize_source(StrSource::new(input)).map(TokenStream::into_tokens)
}

/// Drain a character source into a token stream
pub fn tokenize_source<S: CharSource>(source: S) -> Result<TokenStream, LexerError> {
    tokenize_source_with_preferences(source, LexicalPreferences::default())
}

pub fn tokenize_source_with_preferences<S: CharSource>(
    source: S,
    preferences: LexicalPreferences,
) -> Result<TokenStream, LexerError> {
    let (stream, _) = collect_tokens(Tokenizer::with_preferences(source, preferences))?;
    Ok(stream)
}

/// Tokenize everything a reader yields
///
/// A read or decoding failure is reported as [`LexerError::Source`] instead
/// of silently truncating the token stream.
pub fn tokenize_reader<R: BufRead>(reader: R) -> Result<TokenStream, LexerError> {
    let (stream, mut source) = collect_tokens(Tokenizer::new(ReaderSource::new(reader)))?;
    match source.take_error() {
        Some(error) => Err(error.into()),
        None => Ok(stream),
    }
}

/// Tokenize a loaded file with its path attached to every log event
pub fn tokenize_file_result(file_result: FileProcessingResult) -> Result<TokenStream, LexerError> {
    tokenize_file_result_with_preferences(file_result, LexicalPreferences::default())
}

pub fn tokenize_file_result_with_preferences(
    file_result: FileProcessingResult,
    preferences: LexicalPreferences,
) -> Result<TokenStream, LexerError> {
    let file_path = file_result.metadata.path.clone();

    crate::logging::with_file_context(file_path, 0, || {
        log_debug!("Starting tokenization",
            "chars" => file_result.char_count(),
            "lines" => file_result.metadata.line_count
        );
        tokenize_source_with_preferences(StrSource::new(&file_result.source), preferences)
    })
}

/// Run a tokenizer to completion, returning the stream and the spent source
fn collect_tokens<S: CharSource>(
    mut tokenizer: Tokenizer<S>,
) -> Result<(TokenStream, S), LexerError> {
    let start_time = Instant::now();
    let mut tokens = Vec::new();

    while let Some(token) = tokenizer.next_token()? {
        if tokens.len() >= MAX_TOKEN_COUNT {
            let error = LexerError::TooManyTokens {
                count: tokens.len() + 1,
            };
            log_error!(error.error_code(), "Token count limit exceeded",
                "limit" => MAX_TOKEN_COUNT
            );
            return Err(error);
        }
        tokens.push(token);
    }

    let metrics = tokenizer.metrics();
    log_performance!(codes::success::TOKENIZATION_COMPLETE,
        "Tokenization completed",
        duration = start_time.elapsed(),
        "tokens" => metrics.total_tokens,
        "keywords" => metrics.keyword_tokens,
        "identifiers" => metrics.identifier_tokens,
        "operators" => metrics.operator_tokens,
        "chars_consumed" => metrics.chars_consumed,
        "whitespace_skipped" => metrics.whitespace_skipped,
        "unrecognized_skipped" => metrics.unrecognized_skipped
    );

    Ok((TokenStream::new(tokens), tokenizer.into_source()))
}

/// Create a tokenizer with default preferences
pub fn create_tokenizer<S: CharSource>(source: S) -> Tokenizer<S> {
    Tokenizer::new(source)
}

/// Create a tokenizer with custom runtime preferences
pub fn create_tokenizer_with_preferences<S: CharSource>(
    source: S,
    preferences: LexicalPreferences,
) -> Tokenizer<S> {
    Tokenizer::with_preferences(source, preferences)
}

/// Validate lexical error codes and compile-time limits (for system startup)
pub fn validate_tokenization() -> Result<(), String> {
    let test_codes = [
        codes::lexical::UNRECOGNIZED_CHARACTER,
        codes::lexical::INTERNAL_STATE,
        codes::lexical::TOKEN_TOO_LONG,
        codes::lexical::TOO_MANY_TOKENS,
        codes::lexical::SOURCE_READ_ERROR,
    ];

    for code in &test_codes {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!(
                "Lexical error code {} has no description",
                code.as_str()
            ));
        }
    }

    if MAX_TOKEN_LENGTH == 0 {
        return Err("MAX_TOKEN_LENGTH cannot be zero".to_string());
    }
    if MAX_TOKEN_COUNT == 0 {
        return Err("MAX_TOKEN_COUNT cannot be zero".to_string());
    }

    log_debug!("Lexical limits validated",
        "max_token_length" => MAX_TOKEN_LENGTH,
        "max_token_count" => MAX_TOKEN_COUNT
    );

    Ok(())
}

/// Get the compile-time lexical limits (for reporting/debugging)
pub fn get_lexical_limits() -> LexicalLimits {
    LexicalLimits {
        max_token_length: MAX_TOKEN_LENGTH,
        max_token_count: MAX_TOKEN_COUNT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LexicalLimits {
    pub max_token_length: usize,
    pub max_token_count: usize,
}

/// Count tokens by class and by kind
pub fn get_token_counts(token_stream: &TokenStream) -> TokenCounts {
    let mut counts = TokenCounts::default();
    for token in token_stream {
        counts.record(token);
    }
    counts
}

/// Token distribution of a stream
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TokenCounts {
    pub total: usize,
    pub keywords: usize,
    pub identifiers: usize,
    pub literals: usize,
    pub operators: usize,
    pub punctuation: usize,
    pub by_kind: BTreeMap<TokenKind, usize>,
}

impl TokenCounts {
    /// Add one token to the tally
    pub fn record(&mut self, token: &Token) {
        self.total += 1;
        match token.kind().token_class() {
            TokenClass::Keyword => self.keywords += 1,
            TokenClass::Identifier => self.identifiers += 1,
            TokenClass::Literal => self.literals += 1,
            TokenClass::Operator => self.operators += 1,
            TokenClass::Punctuation => self.punctuation += 1,
        }
        *self.by_kind.entry(token.kind()).or_insert(0) += 1;
    }

    pub fn count_of(&self, kind: TokenKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn has_content(&self) -> bool {
        self.total > 0
    }

    pub fn is_within_limits(&self) -> bool {
        self.total <= MAX_TOKEN_COUNT
    }
}
