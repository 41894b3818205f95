//! Line-buffered character source over any `BufRead`

use super::CharSource;
use crate::logging::codes::{self, Code};
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error while reading input: {0}")]
    Io(#[from] io::Error),

    #[error("Input is not valid UTF-8 at line {line}")]
    InvalidUtf8 { line: usize },
}

impl SourceError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Io(_) => codes::lexical::SOURCE_READ_ERROR,
            Self::InvalidUtf8 { .. } => codes::file_processing::INVALID_ENCODING,
        }
    }
}

/// Reads one line at a time and hands out its characters
///
/// A read or decoding failure ends the stream. The failure is kept and
/// can be collected with [`ReaderSource::take_error`].
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    line: Vec<char>,
    position: usize,
    lines_read: usize,
    finished: bool,
    error: Option<SourceError>,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            position: 0,
            lines_read: 0,
            finished: false,
            error: None,
        }
    }

    /// Number of input lines pulled from the reader so far
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Whether a read or decoding error ended the stream
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Collect the error that ended the stream, if any
    pub fn take_error(&mut self) -> Option<SourceError> {
        self.error.take()
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Make sure the line buffer has an unread character, unless the stream is done
    fn fill(&mut self) {
        while self.position >= self.line.len() && !self.finished {
            let mut bytes = Vec::new();
            match self.reader.read_until(b'\n', &mut bytes) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    self.lines_read += 1;
                    match String::from_utf8(bytes) {
                        Ok(text) => {
                            self.line = text.chars().collect();
                            self.position = 0;
                        }
                        Err(_) => {
                            self.fail(SourceError::InvalidUtf8 {
                                line: self.lines_read,
                            });
                        }
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => self.fail(SourceError::Io(e)),
            }
        }
    }

    fn fail(&mut self, error: SourceError) {
        crate::log_error!(error.error_code(), "Character source stopped on read failure",
            "line" => self.lines_read,
            "error" => &error
        );
        self.line.clear();
        self.position = 0;
        self.finished = true;
        self.error = Some(error);
    }
}

impl<R: BufRead> CharSource for ReaderSource<R> {
    fn peek(&mut self) -> Option<char> {
        self.fill();
        self.line.get(self.position).copied()
    }

    fn next(&mut self) -> Option<char> {
        self.fill();
        let c = self.line.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }
}
