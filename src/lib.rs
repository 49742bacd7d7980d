//! Doctype Validator
//!
//! A schema-driven validator for SGML-style markup.
//!
//! This library provides:
//! - A markup reader that accepts minimized markup
//! - Content models compiled from DTD-like expressions
//! - Doctypes, written in markup themselves and checked against a
//!   self-describing bootstrap doctype
//! - A validator that checks elements and attributes and restores omitted
//!   close tags and attribute names
//! - Configuration management for the `doctype-check` binary

pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod parser;
pub mod schema;
pub mod validation;

// Re-exports for clean public API
pub use config::Config;
pub use error::{ErrorKind, ParseError, Result};
pub use handler::{Event, EventRecorder, Handler, MarkupWriter, NullHandler};
pub use model::{compile, ContentModel};
pub use parser::{Declaration, Parser};
pub use schema::{Attribute, AttributeDecl, Doctype, DoctypeRegistry, ElementDecl};
pub use validation::{validate, Validator};
