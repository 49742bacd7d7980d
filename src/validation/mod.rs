//! Validation
//!
//! Schema validation and un-minimization of markup events, separated from the
//! reader and from whatever consumes the validated events.

pub mod context;
pub mod engine;

pub use context::ContextStack;
pub use engine::Validator;

use crate::error::Result;
use crate::handler::Handler;
use crate::parser::Parser;
use crate::schema::Doctype;
use std::sync::Arc;

/// Read `input`, validate it against `doctype` and feed the validated events
/// to `handler`, which is handed back once the document is done.
pub fn validate<H: Handler>(input: &str, doctype: Arc<Doctype>, handler: H) -> Result<H> {
    let mut validator = Validator::new(handler);
    validator.doctype(&doctype)?;
    Parser::new().parse(input, &mut validator)?;
    Ok(validator.into_handler())
}
