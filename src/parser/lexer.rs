//! Markup Lexer
//!
//! Character-level scanning for the reader: a one-character lookahead with
//! line counting, and the bounded buffer tokens and text are collected in.

use crate::error::{ErrorKind, ParseError, Result};
use std::str::Chars;

/// Maximum length of a token, and the chunk size for character data.
pub const TOKEN_BUF_LEN: usize = 2048;

/// Scanner over the input with the current character and line number.
#[derive(Debug)]
pub struct Scanner<'a> {
    chars: Chars<'a>,
    current: Option<char>,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars(),
            current: None,
            line: 1,
        }
    }

    /// Move to the next character, `None` at end of input.
    pub fn advance(&mut self) -> Option<char> {
        self.current = self.chars.next();
        if self.current == Some('\n') {
            self.line += 1;
        }
        self.current
    }

    /// Move to the next character, failing at end of input.
    pub fn advance_no_eof(&mut self) -> Result<char> {
        self.advance()
            .ok_or_else(|| ParseError::new(ErrorKind::UnexpectedEndOfFile))
    }

    pub fn current(&self) -> Option<char> {
        self.current
    }

    pub fn is(&self, chr: char) -> bool {
        self.current == Some(chr)
    }

    /// True on whitespace or a control character.
    pub fn is_space(&self) -> bool {
        matches!(self.current, Some(chr) if chr <= ' ')
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

/// Bounded text buffer.
#[derive(Debug, Default)]
pub struct TokenBuffer {
    text: String,
    len: usize,
}

impl TokenBuffer {
    /// Append a character. Returns true once the buffer is full.
    pub fn push(&mut self, chr: char) -> bool {
        self.text.push(chr);
        self.len += 1;
        self.len >= TOKEN_BUF_LEN
    }

    /// Append a character to a token, failing if the token gets too long.
    pub fn push_token(&mut self, chr: char) -> Result<()> {
        if self.push(chr) {
            return Err(ParseError::with_item(
                ErrorKind::TokenTooLong,
                self.take(),
            ));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Empty the buffer, returning its contents.
    pub fn take(&mut self) -> String {
        self.len = 0;
        std::mem::take(&mut self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_counts_lines() {
        let mut scanner = Scanner::new("a\nb\n");
        assert_eq!(scanner.line(), 1);
        assert_eq!(scanner.advance(), Some('a'));
        assert_eq!(scanner.advance(), Some('\n'));
        assert_eq!(scanner.line(), 2);
        assert_eq!(scanner.advance(), Some('b'));
        assert_eq!(scanner.advance(), Some('\n'));
        assert_eq!(scanner.advance(), None);
        assert_eq!(scanner.line(), 3);
    }

    #[test]
    fn test_advance_no_eof() {
        let mut scanner = Scanner::new("x");
        assert_eq!(scanner.advance_no_eof().unwrap(), 'x');
        assert!(scanner.is('x'));
        let err = scanner.advance_no_eof().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEndOfFile);
    }

    #[test]
    fn test_is_space() {
        let mut scanner = Scanner::new(" \tq");
        scanner.advance();
        assert!(scanner.is_space());
        scanner.advance();
        assert!(scanner.is_space());
        scanner.advance();
        assert!(!scanner.is_space());
        scanner.advance();
        assert!(!scanner.is_space());
    }

    #[test]
    fn test_buffer_counts_characters() {
        let mut buffer = TokenBuffer::default();
        for _ in 0..TOKEN_BUF_LEN - 1 {
            assert!(!buffer.push('é'));
        }
        assert!(buffer.push('é'));
        assert_eq!(buffer.take().chars().count(), TOKEN_BUF_LEN);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_token_too_long() {
        let mut buffer = TokenBuffer::default();
        for _ in 0..TOKEN_BUF_LEN - 1 {
            buffer.push_token('a').unwrap();
        }
        let err = buffer.push_token('a').unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenTooLong);
        assert!(buffer.is_empty());
    }
}
