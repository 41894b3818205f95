//! Incremental tokenizer driven by the DFA in [`super::dfa`]
//!
//! One call to [`Tokenizer::next_token`] reads characters until a token is
//! complete and returns it. Characters that start no token are dropped.

use super::dfa::{transition, Action, DfaState};
use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::source::{CharSource, SourceError};
use crate::tokens::{Token, TokenKind};
use crate::{log_debug, log_error};
use std::collections::{BTreeMap, HashMap};
use std::iter::FusedIterator;

/// Lexical analysis errors with compile-time limits
#[derive(Debug, thiserror::Error)]
pub enum LexerError {
    #[error("Token too long: {length} characters (max {MAX_TOKEN_LENGTH})")]
    TokenTooLong { length: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },

    #[error("Tokenizer finalized in state {state:?} with buffer {buffer:?}")]
    InternalState { state: DfaState, buffer: String },

    #[error("Character source failed: {0}")]
    Source(#[from] SourceError),
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::TokenTooLong { .. } => codes::lexical::TOKEN_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            LexerError::InternalState { .. } => codes::lexical::INTERNAL_STATE,
            LexerError::Source(e) => e.error_code(),
        }
    }

    pub fn severity(&self) -> codes::Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

/// Lexical analysis metrics with runtime preferences
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub operator_tokens: usize,
    pub punctuation_tokens: usize,
    pub chars_consumed: usize,
    pub whitespace_skipped: usize,
    pub unrecognized_skipped: usize,
    pub keyword_demotions: usize,
    pub max_token_length: usize,

    // Runtime preference-controlled metrics
    pub kind_counts: BTreeMap<TokenKind, usize>,
    pub operator_usage_patterns: HashMap<String, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;
        self.max_token_length = self.max_token_length.max(token.text().chars().count());

        match token.kind() {
            kind if kind.is_keyword() => self.keyword_tokens += 1,
            TokenKind::Identifier => self.identifier_tokens += 1,
            TokenKind::IntegerLiteral | TokenKind::StringLiteral => self.literal_tokens += 1,
            kind if kind.is_operator() => {
                self.operator_tokens += 1;

                if preferences.track_operator_patterns {
                    *self
                        .operator_usage_patterns
                        .entry(token.text().to_string())
                        .or_insert(0) += 1;
                }
            }
            _ => self.punctuation_tokens += 1,
        }

        if preferences.collect_detailed_metrics {
            *self.kind_counts.entry(token.kind()).or_insert(0) += 1;
        }
    }

    pub(crate) fn record_skipped(&mut self, c: char) {
        if c.is_whitespace() {
            self.whitespace_skipped += 1;
        } else {
            self.unrecognized_skipped += 1;
        }
    }

    pub(crate) fn record_demotion(&mut self) {
        self.keyword_demotions += 1;
    }
}

/// Per-token scratch state: the matched text and the DFA state reached
#[derive(Debug, Clone)]
struct RecognitionState {
    buffer: String,
    state: DfaState,
}

impl RecognitionState {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            state: DfaState::Start,
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.state = DfaState::Start;
    }

    fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Length of the matched text in characters
    fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }
}

/// Longest-match tokenizer over any [`CharSource`]
pub struct Tokenizer<S> {
    source: S,
    recognition: RecognitionState,
    exhausted: bool,
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl<S: CharSource> Tokenizer<S> {
    pub fn new(source: S) -> Self {
        Self::with_preferences(source, LexicalPreferences::default())
    }

    pub fn with_preferences(source: S, preferences: LexicalPreferences) -> Self {
        Self {
            source,
            recognition: RecognitionState::new(),
            exhausted: false,
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Produce the next token, or `Ok(None)` once the input is exhausted
    ///
    /// End-of-input is sticky: after it is reported once, every later call
    /// reports it again without touching the source. An error also ends
    /// the stream.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        if self.exhausted {
            return Ok(None);
        }

        let result = self.scan();
        match &result {
            Ok(None) => {
                self.exhausted = true;
                log_debug!("End of input reached",
                    "tokens" => self.metrics.total_tokens,
                    "chars_consumed" => self.metrics.chars_consumed
                );
            }
            Ok(Some(_)) => {}
            Err(error) => {
                self.exhausted = true;
                log_error!(error.error_code(), "Tokenization stopped",
                    "error" => error,
                    "tokens_before_error" => self.metrics.total_tokens
                );
            }
        }
        result
    }

    fn scan(&mut self) -> Result<Option<Token>, LexerError> {
        self.recognition.reset();

        loop {
            let Some(c) = self.source.peek() else {
                if self.recognition.is_empty() {
                    return Ok(None);
                }
                return self.finalize().map(Some);
            };

            let from = self.recognition.state;
            let (next, action) = transition(from, c);

            match action {
                Action::ConsumeAndContinue => {
                    self.consume(c)?;
                    self.recognition.state = next;
                    if from.is_keyword_prefix() && next == DfaState::Identifier {
                        self.record_demotion(from);
                    }
                }
                Action::ConsumeAndFinalize => {
                    self.consume(c)?;
                    self.recognition.state = next;
                    return self.finalize().map(Some);
                }
                Action::PushbackAndFinalize => {
                    self.recognition.state = next;
                    return self.finalize().map(Some);
                }
                Action::DiscardAndRestart => {
                    self.source.next();
                    self.metrics.record_skipped(c);
                    if self.preferences.log_skipped_characters && !c.is_whitespace() {
                        log_debug!(code = codes::lexical::UNRECOGNIZED_CHARACTER,
                            "Skipped unrecognized character",
                            "character" => c.escape_default(),
                            "code_point" => format!("U+{:04X}", c as u32)
                        );
                    }
                }
            }
        }
    }

    fn consume(&mut self, c: char) -> Result<(), LexerError> {
        self.source.next();
        self.metrics.chars_consumed += 1;
        self.recognition.buffer.push(c);

        let length = self.recognition.char_count();
        if length > MAX_TOKEN_LENGTH {
            return Err(LexerError::TokenTooLong { length });
        }
        Ok(())
    }

    fn record_demotion(&mut self, from: DfaState) {
        self.metrics.record_demotion();
        if self.preferences.log_keyword_demotions {
            log_debug!("Keyword prefix demoted to identifier",
                "prefix" => &self.recognition.buffer,
                "state" => format!("{:?}", from)
            );
        }
    }

    /// Turn the buffer into a token of the current state's accepting kind
    fn finalize(&mut self) -> Result<Token, LexerError> {
        let state = self.recognition.state;
        let kind = match state.accepting_kind() {
            Some(kind) if !self.recognition.is_empty() => kind,
            _ => {
                return Err(LexerError::InternalState {
                    state,
                    buffer: std::mem::take(&mut self.recognition.buffer),
                })
            }
        };

        let token = Token::new(kind, std::mem::take(&mut self.recognition.buffer));
        self.recognition.reset();
        self.metrics.record_token(&token, &self.preferences);
        Ok(token)
    }

    /// Whether end-of-input (or an error) has been reported
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: CharSource> Iterator for Tokenizer<S> {
    type Item = Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

impl<S: CharSource> FusedIterator for Tokenizer<S> {}
