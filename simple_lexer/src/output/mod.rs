//! Token output
//!
//! Text output is one `"{text}\t\t{kind}"` line per token in input order.
//! [`TokenReport`] is the JSON form for tooling.

use crate::lexical::{get_token_counts, TokenCounts};
use crate::logging::codes;
use crate::tokens::{Token, TokenStream};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to write tokens: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to serialize token report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OutputError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            OutputError::Write(_) => codes::output::WRITE_FAILED,
            OutputError::Serialization(_) => codes::output::SERIALIZATION_FAILED,
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

/// Write a single token line without flushing
pub fn write_token<W: Write>(writer: &mut W, token: &Token) -> Result<(), OutputError> {
    writeln!(writer, "{}", token)?;
    Ok(())
}

/// Write one line per token
pub fn write_tokens<'a, W, I>(writer: &mut W, tokens: I) -> Result<usize, OutputError>
where
    W: Write,
    I: IntoIterator<Item = &'a Token>,
{
    let mut written = 0;
    for token in tokens {
        write_token(writer, token)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Serializable summary of one tokenization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenReport {
    /// When the report was produced (RFC 3339)
    pub generated_at: DateTime<Utc>,

    /// Input file path, or `-` for standard input
    pub source: String,

    pub token_count: usize,

    pub tokens: Vec<Token>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub counts: Option<ReportCounts>,
}

/// Token distribution as it appears in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCounts {
    pub keywords: usize,
    pub identifiers: usize,
    pub literals: usize,
    pub operators: usize,
    pub punctuation: usize,
}

impl From<&TokenCounts> for ReportCounts {
    fn from(counts: &TokenCounts) -> Self {
        Self {
            keywords: counts.keywords,
            identifiers: counts.identifiers,
            literals: counts.literals,
            operators: counts.operators,
            punctuation: counts.punctuation,
        }
    }
}

impl TokenReport {
    pub fn new(source: impl Into<String>, stream: &TokenStream) -> Self {
        Self {
            generated_at: Utc::now(),
            source: source.into(),
            token_count: stream.len(),
            tokens: stream.tokens().to_vec(),
            counts: None,
        }
    }

    /// Attach class counts for the report's stream
    pub fn with_counts(mut self, stream: &TokenStream) -> Self {
        self.counts = Some(ReportCounts::from(&get_token_counts(stream)));
        self
    }

    pub fn to_json(&self) -> Result<String, OutputError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<W: Write>(&self, writer: &mut W) -> Result<(), OutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize_str;
    use crate::tokens::TokenKind;
    use assert_matches::assert_matches;
    use std::io;

    #[test]
    fn test_write_tokens_text_format() {
        let tokens = tokenize_str("int x;").unwrap();
        let mut out = Vec::new();

        let written = write_tokens(&mut out, &tokens).unwrap();
        assert_eq!(written, 3);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "int\t\tInt\nx\t\tIdentifier\n;\t\tSemiColon\n"
        );
    }

    #[test]
    fn test_write_tokens_uses_display_names() {
        let tokens = tokenize_str("a >= 1 == b").unwrap();
        let mut out = Vec::new();
        write_tokens(&mut out, &tokens).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], ">=\t\tGE");
        assert_eq!(lines[2], "1\t\tIntegerLiteral");
        assert_eq!(lines[3], "==\t\tEQ");
    }

    #[test]
    fn test_write_nothing() {
        let mut out = Vec::new();
        assert_eq!(write_tokens(&mut out, &Vec::<Token>::new()).unwrap(), 0);
        assert!(out.is_empty());
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure() {
        let tokens = tokenize_str("x").unwrap();
        let error = write_tokens(&mut ClosedPipe, &tokens).unwrap_err();

        assert_matches!(error, OutputError::Write(_));
        assert_eq!(error.error_code(), codes::output::WRITE_FAILED);
    }

    #[test]
    fn test_report_json() {
        let stream = TokenStream::new(tokenize_str("if (n > 0) n = n - 1;").unwrap());
        let report = TokenReport::new("-", &stream).with_counts(&stream);
        let json = report.to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["source"], "-");
        assert_eq!(value["token_count"], 12);
        assert_eq!(value["tokens"][0]["kind"], "If");
        assert_eq!(value["tokens"][3]["kind"], "GT");
        assert_eq!(value["tokens"][3]["text"], ">");
        assert_eq!(value["counts"]["operators"], 3);
        assert!(value["generated_at"].as_str().unwrap().contains('T'));

        let parsed: TokenReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.tokens, stream.tokens());
        assert_eq!(parsed.tokens[7].kind(), TokenKind::Assignment);
    }

    #[test]
    fn test_report_with_malformed_token_is_rejected() {
        let json = r#"{
            "generated_at": "2026-01-01T00:00:00Z",
            "source": "-",
            "token_count": 1,
            "tokens": [{"kind": "Int", "text": "x"}]
        }"#;
        assert!(serde_json::from_str::<TokenReport>(json).is_err());
    }

    #[test]
    fn test_report_without_counts_omits_field() {
        let stream = TokenStream::new(tokenize_str("x").unwrap());
        let json = TokenReport::new("input.txt", &stream).to_json().unwrap();
        assert!(!json.contains("\"counts\""));
    }

    #[test]
    fn test_write_json_ends_with_newline() {
        let stream = TokenStream::new(Vec::new());
        let mut out = Vec::new();
        TokenReport::new("-", &stream).write_json(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\"token_count\": 0"));
    }
}
