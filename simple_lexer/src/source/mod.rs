//! Character sources with one character of lookahead
//!
//! The tokenizer only ever needs `peek` and `next`. A source that has
//! reported end-of-stream is never consulted again by the tokenizer.

pub mod reader;

pub use reader::{ReaderSource, SourceError};

use std::iter::Peekable;
use std::str::Chars;

/// Single-character lookahead read interface
pub trait CharSource {
    /// Next character without consuming it; `None` at end-of-stream
    fn peek(&mut self) -> Option<char>;

    /// Consume and return the next character; `None` at end-of-stream
    fn next(&mut self) -> Option<char>;
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn peek(&mut self) -> Option<char> {
        (**self).peek()
    }

    fn next(&mut self) -> Option<char> {
        (**self).next()
    }
}

impl<I: Iterator<Item = char>> CharSource for Peekable<I> {
    fn peek(&mut self) -> Option<char> {
        Peekable::peek(self).copied()
    }

    fn next(&mut self) -> Option<char> {
        Iterator::next(self)
    }
}

/// In-memory source over a string slice
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    chars: Peekable<Chars<'a>>,
    consumed: usize,
}

impl<'a> StrSource<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            consumed: 0,
        }
    }

    /// Number of characters consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl<'a> From<&'a str> for StrSource<'a> {
    fn from(input: &'a str) -> Self {
        Self::new(input)
    }
}

impl CharSource for StrSource<'_> {
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = Iterator::next(&mut self.chars)?;
        self.consumed += 1;
        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_is_idempotent() {
        let mut source = StrSource::new("ab");
        assert_eq!(source.peek(), Some('a'));
        assert_eq!(source.peek(), Some('a'));
        assert_eq!(source.next(), Some('a'));
        assert_eq!(source.peek(), Some('b'));
        assert_eq!(source.consumed(), 1);
    }

    #[test]
    fn test_end_of_stream() {
        let mut source = StrSource::new("x");
        assert_eq!(source.next(), Some('x'));
        assert_eq!(source.peek(), None);
        assert_eq!(source.next(), None);
        assert_eq!(source.consumed(), 1);
    }

    #[test]
    fn test_consumed_counts_every_character() {
        let input = "a>=b<=c==d=e";
        let mut source = StrSource::from(input);
        let mut drained = String::new();
        while let Some(c) = source.next() {
            drained.push(c);
        }

        assert_eq!(drained, input);
        assert_eq!(source.consumed(), input.chars().count());
        assert_eq!(source.peek(), None);
    }

    #[test]
    fn test_mutable_reference_is_a_source() {
        fn drain(mut source: impl CharSource) -> String {
            let mut out = String::new();
            while let Some(c) = source.next() {
                out.push(c);
            }
            out
        }

        let mut source = StrSource::new("abc");
        assert_eq!(source.next(), Some('a'));
        assert_eq!(drain(&mut source), "bc");
        assert_eq!(source.consumed(), 3);
    }

    #[test]
    fn test_peekable_iterator_is_a_source() {
        let mut source = "é+".chars().peekable();
        assert_eq!(CharSource::peek(&mut source), Some('é'));
        assert_eq!(CharSource::next(&mut source), Some('é'));
        assert_eq!(CharSource::next(&mut source), Some('+'));
        assert_eq!(CharSource::peek(&mut source), None);
    }
}
