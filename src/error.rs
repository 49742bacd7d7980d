//! Error types for reading, compiling and validating markup.
//!
//! Every failure in the crate is a [`ParseError`]: the kind of failure, the
//! offending item, the ancestry path of open elements at the time of failure and
//! the line number in the input. The reader fills in the line, the validator
//! fills in the location.

use std::fmt;
use thiserror::Error;

/// The kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Reader.
    InvalidTagName,
    ExpectedLtHere,
    ExpectedGtHere,
    ExpectedExOrQmHere,
    ExpectedLtOrCbHere,
    ExpectedLtOrGtHere,
    InvalidDeclaration,
    ExpectedObHere,
    ExpectedOpHere,
    ExpectedHyHere,
    TokenTooLong,
    UnexpectedEndOfFile,
    // Content model compiler and doctype lists.
    UnexpectedEndOfExpression,
    ZeroLengthToken,
    UnexpectedCharacter,
    NestingTooDeep,
    MalformedList,
    // Schema validation.
    DuplicateAttribute,
    RequiredAttributeMissing,
    AttributeValueNotPermitted,
    UndeclaredAttribute,
    DoctypeNotSet,
    ElementNotDeclared,
    ElementNotPermitted,
    UnexpectedCloseTag,
    CloseElementNotPermitted,
    CloseElementMissing,
    EmptyElementMayNotContainChildren,
    /// Raised by handlers with their own message.
    Other,
}

impl ErrorKind {
    /// Human readable description of the kind.
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidTagName => "Invalid tag name.",
            Self::ExpectedLtHere => "Expected '<' here.",
            Self::ExpectedGtHere => "Expected '>' here.",
            Self::ExpectedExOrQmHere => "Expected '!' or '?' here.",
            Self::ExpectedLtOrCbHere => "Expected '<' or ']' here.",
            Self::ExpectedLtOrGtHere => "Expected '<' or '>' here.",
            Self::InvalidDeclaration => "Invalid declaration.",
            Self::ExpectedObHere => "Expected '[' here.",
            Self::ExpectedOpHere => "Expected '(' here.",
            Self::ExpectedHyHere => "Expected '-' here.",
            Self::TokenTooLong => "Token too long.",
            Self::UnexpectedEndOfFile => "Unexpected end of file.",
            Self::UnexpectedEndOfExpression => "Unexpected end of expression.",
            Self::ZeroLengthToken => "Zero-length token in content model expression.",
            Self::UnexpectedCharacter => "Unexpected character in content model expression.",
            Self::NestingTooDeep => "Content model expression nested too deeply.",
            Self::MalformedList => "Malformed comma-separated list.",
            Self::DuplicateAttribute => "Duplicate attribute.",
            Self::RequiredAttributeMissing => "Required attribute missing.",
            Self::AttributeValueNotPermitted => "Attribute value not permitted.",
            Self::UndeclaredAttribute => "Undeclared attribute.",
            Self::DoctypeNotSet => "Doctype not set.",
            Self::ElementNotDeclared => "Element not declared.",
            Self::ElementNotPermitted => "Element not permitted.",
            Self::UnexpectedCloseTag => "Unexpected close tag.",
            Self::CloseElementNotPermitted => "Close element not permitted.",
            Self::CloseElementMissing => "Close element missing.",
            Self::EmptyElementMayNotContainChildren => "Empty element may not contain children.",
            Self::Other => "Other error.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A fatal error raised while reading or validating markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ('{item}' at '{location}' on line {line})")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ErrorKind,
    /// Message, the kind's description unless raised with [`ParseError::custom`].
    pub message: String,
    /// The name, value or expression that caused the error.
    pub item: String,
    /// Ancestry path of open elements, e.g. `<doc><content>`.
    pub location: String,
    /// Line number (1-based), 0 when not read from text.
    pub line: usize,
}

impl ParseError {
    /// Create an error of the given kind with no item.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            item: String::new(),
            location: String::new(),
            line: 0,
        }
    }

    /// Create an error of the given kind for an offending item.
    pub fn with_item(kind: ErrorKind, item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            ..Self::new(kind)
        }
    }

    /// Create an [`ErrorKind::Other`] error carrying a handler-defined message.
    pub fn custom(message: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            item: item.into(),
            ..Self::new(ErrorKind::Other)
        }
    }

    /// Replace the ancestry path.
    pub fn at_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Replace the line number.
    pub fn on_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

/// Result type for markup operations.
pub type Result<T> = std::result::Result<T, ParseError>;
