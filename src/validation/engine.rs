//! Validation Engine
//!
//! The [`Validator`] sits between the reader and a downstream [`Handler`]. It
//! checks every element against the active doctype and un-minimizes the
//! markup on the way through: omitted close tags are synthesized, empty
//! close tags get their element name, and attributes are named and defaulted.

use super::context::ContextStack;
use crate::error::{ErrorKind, ParseError, Result};
use crate::handler::Handler;
use crate::parser::Declaration;
use crate::schema::{Attribute, Doctype};
use log::{debug, trace};
use std::sync::Arc;

/// Validating handler.
///
/// A doctype must be supplied through [`Handler::doctype`] before the first
/// element arrives; the reader never does this on its own.
#[derive(Debug)]
pub struct Validator<H> {
    handler: H,
    doctype: Option<Arc<Doctype>>,
    context: ContextStack,
}

impl<H: Handler> Validator<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            doctype: None,
            context: ContextStack::new(),
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    pub fn active_doctype(&self) -> Option<&Arc<Doctype>> {
        self.doctype.as_ref()
    }

    /// Ancestry path of the open elements, e.g. `<doc><content>`.
    pub fn path(&self) -> String {
        self.context.path()
    }

    /// Number of open elements.
    pub fn depth(&self) -> usize {
        self.context.depth()
    }

    fn locate(&self, err: ParseError) -> ParseError {
        err.at_location(self.context.path())
    }

    fn open_element(&mut self, name: &str, mut attributes: Vec<Attribute>) -> Result<()> {
        let name = name.to_lowercase();
        let doctype = self
            .doctype
            .as_ref()
            .ok_or_else(|| ParseError::with_item(ErrorKind::DoctypeNotSet, name.as_str()))?;
        let decl = doctype
            .element(&name)
            .cloned()
            .ok_or_else(|| ParseError::with_item(ErrorKind::ElementNotDeclared, name.as_str()))?;
        decl.validate(&mut attributes)?;

        loop {
            let complete = self.context.complete();
            let permitted = if self.context.is_excluded(&name) {
                false
            } else if self.context.is_included(&name) {
                true
            } else {
                self.context.shift(&name);
                self.context.marked()
            };

            if permitted {
                trace!("open <{}> at {}", decl.name(), self.context.path());
                if !decl.is_empty() {
                    self.context.push(decl.clone());
                }
                return self.handler.open(decl.name(), attributes);
            }

            match self.context.current() {
                Some(current) if complete && current.may_omit() => {
                    let current = current.clone();
                    debug!("inferring </{}> before <{}>", current.name(), name);
                    self.handler.close(current.name())?;
                    self.context.pop();
                }
                _ => {
                    return Err(ParseError::with_item(
                        ErrorKind::ElementNotPermitted,
                        name.as_str(),
                    ));
                }
            }
        }
    }

    fn close_element(&mut self, name: &str) -> Result<()> {
        if self.doctype.is_none() {
            return Err(ParseError::with_item(ErrorKind::DoctypeNotSet, name));
        }
        let name = name.to_lowercase();
        loop {
            let Some(decl) = self.context.current().cloned() else {
                return Err(ParseError::with_item(
                    ErrorKind::UnexpectedCloseTag,
                    name.as_str(),
                ));
            };
            let current = name.is_empty() || name == decl.name();
            if !(self.context.complete() && (current || decl.may_omit())) {
                return Err(ParseError::with_item(
                    ErrorKind::CloseElementNotPermitted,
                    name.as_str(),
                ));
            }
            if !current {
                debug!("inferring </{}> before </{}>", decl.name(), name);
            }
            self.handler.close(decl.name())?;
            self.context.pop();
            if current {
                return Ok(());
            }
        }
    }

    fn finish(&mut self) -> Result<()> {
        while let Some(decl) = self.context.current() {
            if !decl.may_omit() {
                return Err(ParseError::with_item(
                    ErrorKind::CloseElementMissing,
                    decl.name(),
                ));
            }
            debug!("inferring </{}> at end of document", decl.name());
            self.close_element("")?;
        }
        self.handler.end()
    }
}

impl<H: Handler> Handler for Validator<H> {
    fn begin(&mut self) -> Result<()> {
        self.context.reset();
        self.handler.begin().map_err(|e| self.locate(e))
    }

    fn doctype(&mut self, doctype: &Arc<Doctype>) -> Result<()> {
        debug!("doctype set with {} elements", doctype.len());
        self.doctype = Some(doctype.clone());
        self.handler.doctype(doctype).map_err(|e| self.locate(e))
    }

    fn comment(&mut self, text: &str) -> Result<()> {
        self.handler.comment(text).map_err(|e| self.locate(e))
    }

    fn declaration(&mut self, declaration: &Declaration) -> Result<()> {
        self.handler
            .declaration(declaration)
            .map_err(|e| self.locate(e))
    }

    fn pi(&mut self, instruction: &str) -> Result<()> {
        self.handler.pi(instruction).map_err(|e| self.locate(e))
    }

    fn entity(&mut self, name: &str) -> Result<()> {
        self.handler.entity(name).map_err(|e| self.locate(e))
    }

    fn open(&mut self, name: &str, attributes: Vec<Attribute>) -> Result<()> {
        self.open_element(name, attributes)
            .map_err(|e| self.locate(e))
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.handler.characters(text).map_err(|e| self.locate(e))
    }

    fn marked_characters(&mut self, param: &str, text: &str) -> Result<()> {
        self.handler
            .marked_characters(param, text)
            .map_err(|e| self.locate(e))
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.close_element(name).map_err(|e| self.locate(e))
    }

    fn end(&mut self) -> Result<()> {
        self.finish().map_err(|e| self.locate(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Event, EventRecorder};
    use crate::parser::Parser;

    const SCHEMA: &str = "<doctype>\
        <element name=doc content=\"p*\" omit>\
        <element name=p content=\"em*\" omit>\
        <element name=em>\
        <element name=br type=empty>";

    fn validator() -> Validator<EventRecorder> {
        let doctype = Arc::new(Doctype::parse(SCHEMA).unwrap());
        let mut validator = Validator::new(EventRecorder::new());
        validator.doctype(&doctype).unwrap();
        validator
    }

    fn run(input: &str) -> Result<Vec<Event>> {
        let mut validator = validator();
        Parser::new().parse(input, &mut validator)?;
        Ok(validator
            .into_handler()
            .into_events()
            .into_iter()
            .filter(|e| matches!(e, Event::Open { .. } | Event::Close { .. }))
            .collect())
    }

    fn tags(events: &[Event]) -> String {
        events
            .iter()
            .map(|e| match e {
                Event::Open { name, .. } => format!("<{name}>"),
                Event::Close { name } => format!("</{name}>"),
                _ => String::new(),
            })
            .collect()
    }

    #[test]
    fn test_close_tags_are_inferred() {
        let events = run("<doc><p><em></em><p>").unwrap();
        assert_eq!(tags(&events), "<doc><p><em></em></p><p></p></doc>");
    }

    #[test]
    fn test_empty_close_tag_gets_its_name() {
        let events = run("<DOC><p></></>").unwrap();
        assert_eq!(tags(&events), "<doc><p></p></doc>");
    }

    #[test]
    fn test_named_close_pops_omissible_elements() {
        let events = run("<doc><p><em></em></doc>").unwrap();
        assert_eq!(tags(&events), "<doc><p><em></em></p></doc>");
    }

    #[test]
    fn test_empty_element_has_no_frame() {
        let doctype = Arc::new(
            Doctype::parse("<doctype><element name=doc content=br* omit><element name=br type=empty>")
                .unwrap(),
        );
        let mut validator = Validator::new(EventRecorder::new());
        validator.doctype(&doctype).unwrap();
        validator.begin().unwrap();
        validator.open("doc", Vec::new()).unwrap();
        validator.open("br", Vec::new()).unwrap();
        assert_eq!(validator.depth(), 1);
        assert_eq!(validator.path(), "<doc>");
    }

    #[test]
    fn test_errors_carry_location() {
        let err = run("<doc><p><em><p>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ElementNotPermitted);
        assert_eq!(err.item, "p");
        assert_eq!(err.location, "<doc><p><em>");

        let err = run("<doc><p><em>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::CloseElementMissing);
        assert_eq!(err.item, "em");
        assert_eq!(err.location, "<doc><p><em>");

        let err = run("<doc><x>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ElementNotDeclared);
        assert_eq!(err.location, "<doc>");
    }

    #[test]
    fn test_close_errors() {
        assert_eq!(
            run("</doc>").unwrap_err().kind,
            ErrorKind::UnexpectedCloseTag
        );
        assert_eq!(
            run("<doc><p><em></p>").unwrap_err().kind,
            ErrorKind::CloseElementNotPermitted
        );
    }

    #[test]
    fn test_doctype_not_set() {
        let mut validator = Validator::new(EventRecorder::new());
        let err = Parser::new().parse("<doc>", &mut validator).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DoctypeNotSet);
        let err = validator.close("doc").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DoctypeNotSet);
    }

    #[test]
    fn test_other_events_pass_through() {
        let mut validator = validator();
        Parser::new()
            .parse("<?pi><doc>text&amp;<!--c--></doc>", &mut validator)
            .unwrap();
        let events = validator.into_handler().into_events();
        assert!(matches!(events[0], Event::Doctype { .. }));
        assert_eq!(events[1], Event::Begin);
        assert_eq!(
            events[2],
            Event::Pi {
                instruction: "pi".into()
            }
        );
        assert_eq!(
            events[4],
            Event::Characters {
                text: "text".into()
            }
        );
        assert_eq!(events[5], Event::Entity { name: "amp".into() });
        assert_eq!(events[6], Event::Comment { text: "c".into() });
        assert_eq!(events.last(), Some(&Event::End));
    }

    #[test]
    fn test_begin_resets_context() {
        let mut validator = validator();
        validator.begin().unwrap();
        validator.open("doc", Vec::new()).unwrap();
        assert_eq!(validator.depth(), 1);
        validator.begin().unwrap();
        assert_eq!(validator.depth(), 0);
    }
}
