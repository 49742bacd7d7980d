//! Markup Reader
//!
//! Reads SGML-style markup and feeds the events to a [`Handler`]. The reader
//! checks syntax only: it knows nothing about which elements exist and
//! accepts minimized markup such as unclosed tags (`<a<b>`), empty close tags
//! (`</>`) and bare attribute values (`<doc b>`). Put a
//! [`Validator`](crate::validation::Validator) between the reader and the
//! consumer to check and normalize the markup against a doctype.

pub mod ast;
pub mod lexer;

pub use ast::Declaration;
pub use lexer::TOKEN_BUF_LEN;

use crate::error::{ErrorKind, ParseError, Result};
use crate::handler::Handler;
use crate::schema::Attribute;
use lexer::{Scanner, TokenBuffer};
use log::trace;

/// Markup reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Read `input` and feed the resulting events to `handler`.
    ///
    /// Errors carry the line number they occurred on.
    pub fn parse<H: Handler + ?Sized>(&self, input: &str, handler: &mut H) -> Result<()> {
        let mut reader = Reader {
            scanner: Scanner::new(input),
            buf: TokenBuffer::default(),
            handler,
        };
        let result = reader.run();
        result.map_err(|e| {
            let line = reader.scanner.line();
            trace!("parse failed on line {line}: {e}");
            e.on_line(line)
        })
    }
}

struct Reader<'a, 'h, H: Handler + ?Sized> {
    scanner: Scanner<'a>,
    buf: TokenBuffer,
    handler: &'h mut H,
}

impl<H: Handler + ?Sized> Reader<'_, '_, H> {
    fn run(&mut self) -> Result<()> {
        self.handler.begin()?;
        loop {
            match self.scanner.advance() {
                None => {
                    self.flush_characters()?;
                    return self.handler.end();
                }
                Some('<') => {
                    self.flush_characters()?;
                    while self.scanner.is('<') {
                        self.tag()?;
                    }
                }
                Some('&') => {
                    self.flush_characters()?;
                    self.scanner.advance_no_eof()?;
                    let name = self.token(';')?;
                    self.handler.entity(&name)?;
                }
                Some(chr) => {
                    if self.buf.push(chr) {
                        self.flush_characters()?;
                    }
                }
            }
        }
    }

    fn flush_characters(&mut self) -> Result<()> {
        if !self.buf.is_empty() {
            let text = self.buf.take();
            self.handler.characters(&text)?;
        }
        Ok(())
    }

    fn flush_comment(&mut self) -> Result<()> {
        if !self.buf.is_empty() {
            let text = self.buf.take();
            self.handler.comment(&text)?;
        }
        Ok(())
    }

    fn flush_marked(&mut self, param: &str) -> Result<()> {
        if !self.buf.is_empty() {
            let text = self.buf.take();
            self.handler.marked_characters(param, &text)?;
        }
        Ok(())
    }

    /// A tag, starting at its `<`. Stops on the closing `>`, or on the `<`
    /// of a following tag when the tag is left unclosed.
    fn tag(&mut self) -> Result<()> {
        if !self.scanner.is('<') {
            return Err(ParseError::new(ErrorKind::ExpectedLtHere));
        }
        match self.scanner.advance_no_eof()? {
            '?' => {
                self.scanner.advance_no_eof()?;
                let instruction = self.token('>')?;
                self.handler.pi(&instruction)
            }
            '!' => match self.scanner.advance_no_eof()? {
                '>' => self.handler.comment(""),
                '-' => loop {
                    match self.scanner.current() {
                        Some('-') => {
                            self.comment()?;
                            self.whitespace()?;
                        }
                        Some('>') => return Ok(()),
                        _ => return Err(ParseError::new(ErrorKind::ExpectedGtHere)),
                    }
                },
                '[' => self.marked_section(),
                _ => {
                    let declaration = self.declaration()?;
                    self.handler.declaration(&declaration)
                }
            },
            '/' => {
                self.scanner.advance_no_eof()?;
                let name = self.name_token()?;
                self.whitespace()?;
                if !matches!(self.scanner.current(), Some('<' | '>')) {
                    return Err(ParseError::with_item(ErrorKind::ExpectedLtOrGtHere, name));
                }
                self.handler.close(&name)
            }
            _ => self.open_tag(),
        }
    }

    fn open_tag(&mut self) -> Result<()> {
        let name = self.name_token()?;
        if name.is_empty() {
            return Err(ParseError::new(ErrorKind::InvalidTagName));
        }
        let mut attributes = Vec::new();
        loop {
            self.whitespace()?;
            if matches!(self.scanner.current(), Some('<' | '>' | '/')) {
                break;
            }
            let attr_name = self.name_token()?;
            self.whitespace()?;
            if self.scanner.is('=') {
                self.scanner.advance_no_eof()?;
                self.whitespace()?;
                let value = self.value_token()?;
                attributes.push(Attribute::new(&attr_name, value));
            } else if attr_name.is_empty() {
                // A delimiter that cannot start an attribute.
                return Err(ParseError::with_item(ErrorKind::ExpectedGtHere, name));
            } else {
                attributes.push(Attribute::minimized(attr_name));
            }
        }
        self.handler.open(&name, attributes)?;
        if self.scanner.is('/') {
            if self.scanner.advance_no_eof()? != '>' {
                return Err(ParseError::with_item(ErrorKind::ExpectedGtHere, name));
            }
            self.handler.close(&name)?;
        }
        Ok(())
    }

    /// Nested declarations inside `[` and `]`. Only declarations are kept;
    /// comments, processing instructions, parameter entity references and
    /// marked section boundaries are skipped.
    fn declaration_subset(&mut self) -> Result<Vec<Declaration>> {
        if !self.scanner.is('[') {
            return Err(ParseError::new(ErrorKind::ExpectedObHere));
        }
        self.scanner.advance_no_eof()?;
        let mut declarations = Vec::new();
        loop {
            self.whitespace()?;
            match self.scanner.current() {
                Some('<') => match self.scanner.advance_no_eof()? {
                    '!' => match self.scanner.advance_no_eof()? {
                        '-' | '>' => {
                            while self.scanner.is('-') {
                                self.scanner.advance_no_eof()?;
                                self.comment_separator()?;
                                self.whitespace()?;
                            }
                            if !self.scanner.is('>') {
                                return Err(ParseError::new(ErrorKind::ExpectedGtHere));
                            }
                            self.scanner.advance_no_eof()?;
                        }
                        '[' => {
                            self.scanner.advance_no_eof()?;
                            self.token('[')?;
                            self.scanner.advance_no_eof()?;
                        }
                        _ => {
                            declarations.push(self.declaration()?);
                            self.scanner.advance_no_eof()?;
                        }
                    },
                    '?' => {
                        self.token('>')?;
                        self.scanner.advance_no_eof()?;
                    }
                    _ => return Err(ParseError::new(ErrorKind::ExpectedExOrQmHere)),
                },
                Some('%') => {
                    self.token(';')?;
                    self.scanner.advance_no_eof()?;
                }
                Some(']') => {
                    if self.scanner.advance_no_eof()? != ']' {
                        break;
                    }
                    // End of a marked section.
                    if self.scanner.advance_no_eof()? != '>' {
                        return Err(ParseError::new(ErrorKind::ExpectedGtHere));
                    }
                    self.scanner.advance_no_eof()?;
                }
                _ => return Err(ParseError::new(ErrorKind::ExpectedLtOrCbHere)),
            }
        }
        Ok(declarations)
    }

    /// A declaration from its name to the closing `>`.
    fn declaration(&mut self) -> Result<Declaration> {
        let name = self.param_token()?;
        if name.is_empty() {
            return Err(ParseError::new(ErrorKind::InvalidDeclaration));
        }
        let mut declaration = Declaration::new(name);
        loop {
            self.whitespace()?;
            match self.scanner.current() {
                Some('>') => break,
                Some('-') => match self.scanner.advance_no_eof()? {
                    '-' => self.comment_separator()?,
                    '(' => {
                        let group = self.name_group()?;
                        declaration.params.push(format!("-{group}"));
                    }
                    // Minimization specifier.
                    _ => declaration.params.push("-".to_string()),
                },
                Some('+') => {
                    self.scanner.advance_no_eof()?;
                    let group = self.name_group()?;
                    declaration.params.push(format!("+{group}"));
                }
                Some(quote @ ('"' | '\'')) => {
                    let value = self.value_token()?;
                    declaration.params.push(format!("{quote}{value}{quote}"));
                }
                Some('(') => {
                    let group = self.name_group()?;
                    declaration.params.push(group);
                }
                Some('[') => {
                    declaration.subset = self.declaration_subset()?;
                    loop {
                        self.whitespace()?;
                        match self.scanner.current() {
                            Some('-') => {
                                self.scanner.advance_no_eof()?;
                                self.comment_separator()?;
                            }
                            Some('>') => break,
                            _ => return Err(ParseError::new(ErrorKind::ExpectedGtHere)),
                        }
                    }
                }
                _ => {
                    let param = self.param_token()?;
                    declaration.params.push(param);
                }
            }
        }
        Ok(declaration)
    }

    /// A marked section from its first `[`. Stops on the closing `>`.
    fn marked_section(&mut self) -> Result<()> {
        if !self.scanner.is('[') {
            return Err(ParseError::new(ErrorKind::ExpectedObHere));
        }
        self.scanner.advance_no_eof()?;
        self.whitespace()?;
        let param = self.name_token()?;
        self.whitespace()?;
        if !self.scanner.is('[') {
            return Err(ParseError::with_item(ErrorKind::ExpectedObHere, param));
        }
        loop {
            let mut chr = self.scanner.advance_no_eof()?;
            if chr == ']' {
                chr = self.scanner.advance_no_eof()?;
                if chr == ']' {
                    self.scanner.advance_no_eof()?;
                    self.whitespace()?;
                    if !self.scanner.is('>') {
                        return Err(ParseError::with_item(ErrorKind::ExpectedGtHere, param));
                    }
                    return self.flush_marked(&param);
                }
                if self.buf.push(']') {
                    self.flush_marked(&param)?;
                }
            }
            if self.buf.push(chr) {
                self.flush_marked(&param)?;
            }
        }
    }

    /// A comment from its first hyphen, through the closing `--`.
    fn comment(&mut self) -> Result<()> {
        let first = self.scanner.current();
        let second = self.scanner.advance_no_eof()?;
        if first != Some('-') || second != '-' {
            return Err(ParseError::new(ErrorKind::ExpectedHyHere));
        }
        loop {
            let mut chr = self.scanner.advance_no_eof()?;
            if chr == '-' {
                chr = self.scanner.advance_no_eof()?;
                if chr == '-' {
                    self.scanner.advance_no_eof()?;
                    return self.flush_comment();
                }
                if self.buf.push('-') {
                    self.flush_comment()?;
                }
            }
            if self.buf.push(chr) {
                self.flush_comment()?;
            }
        }
    }

    /// A quoted value, or a name token.
    fn value_token(&mut self) -> Result<String> {
        match self.scanner.current() {
            Some(quote @ ('\'' | '"')) => {
                self.scanner.advance_no_eof()?;
                let value = self.token(quote)?;
                self.scanner.advance_no_eof()?;
                Ok(value)
            }
            _ => self.name_token(),
        }
    }

    /// A token ending at whitespace or one of `<>[];=/`.
    fn name_token(&mut self) -> Result<String> {
        while let Some(chr) = self.scanner.current() {
            if chr <= ' ' || matches!(chr, '<' | '>' | '[' | ']' | ';' | '=' | '/') {
                break;
            }
            self.buf.push_token(chr)?;
            self.scanner.advance_no_eof()?;
        }
        Ok(self.buf.take())
    }

    /// A declaration parameter ending at whitespace, `>`, `[` or a
    /// `--comment--`.
    fn param_token(&mut self) -> Result<String> {
        while let Some(chr) = self.scanner.current() {
            if chr <= ' ' || chr == '>' || chr == '[' {
                break;
            }
            if chr == '-' {
                if self.scanner.advance_no_eof()? == '-' {
                    self.comment_separator()?;
                    break;
                }
                self.buf.push_token('-')?;
                continue;
            }
            self.buf.push_token(chr)?;
            self.scanner.advance_no_eof()?;
        }
        Ok(self.buf.take())
    }

    /// A parenthesized group with nested parentheses, and an optional
    /// trailing `?`, `+` or `*`.
    fn name_group(&mut self) -> Result<String> {
        if !self.scanner.is('(') {
            return Err(ParseError::new(ErrorKind::ExpectedOpHere));
        }
        let mut depth = 0usize;
        let mut chr = '(';
        loop {
            self.buf.push_token(chr)?;
            if chr == '(' {
                depth += 1;
            } else if chr == ')' {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            chr = self.scanner.advance_no_eof()?;
        }
        let chr = self.scanner.advance_no_eof()?;
        if matches!(chr, '?' | '+' | '*') {
            self.buf.push_token(chr)?;
            self.scanner.advance_no_eof()?;
        }
        Ok(self.buf.take())
    }

    /// Skip a comment from its second hyphen, through the closing `--`.
    fn comment_separator(&mut self) -> Result<()> {
        if !self.scanner.is('-') {
            return Err(ParseError::new(ErrorKind::ExpectedHyHere));
        }
        loop {
            if self.scanner.advance_no_eof()? == '-' && self.scanner.advance_no_eof()? == '-' {
                self.scanner.advance_no_eof()?;
                return Ok(());
            }
        }
    }

    /// Everything up to, not including, `delim`.
    fn token(&mut self, delim: char) -> Result<String> {
        while let Some(chr) = self.scanner.current() {
            if chr == delim {
                break;
            }
            self.buf.push_token(chr)?;
            self.scanner.advance_no_eof()?;
        }
        Ok(self.buf.take())
    }

    fn whitespace(&mut self) -> Result<()> {
        while self.scanner.is_space() {
            self.scanner.advance_no_eof()?;
        }
        Ok(())
    }
}
