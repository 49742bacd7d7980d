//! Markup Events
//!
//! [`Handler`] is the event contract shared by the reader, the validator and
//! every consumer downstream of them. All methods default to doing nothing,
//! so a consumer only implements the events it cares about.

use crate::error::Result;
use crate::parser::Declaration;
use crate::schema::{Attribute, Doctype};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;

/// Receiver of markup events.
pub trait Handler {
    /// Start of a document.
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    /// A doctype has been configured.
    fn doctype(&mut self, _doctype: &Arc<Doctype>) -> Result<()> {
        Ok(())
    }

    /// Comment text, without the `--` delimiters.
    fn comment(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn declaration(&mut self, _declaration: &Declaration) -> Result<()> {
        Ok(())
    }

    /// Processing instruction, the text between `<?` and `>`.
    fn pi(&mut self, _instruction: &str) -> Result<()> {
        Ok(())
    }

    /// Entity reference, the name between `&` and `;`.
    fn entity(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn open(&mut self, _name: &str, _attributes: Vec<Attribute>) -> Result<()> {
        Ok(())
    }

    /// Character data, in chunks.
    fn characters(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    /// Character data of a marked section such as `<![CDATA[...]]>`.
    fn marked_characters(&mut self, _param: &str, _text: &str) -> Result<()> {
        Ok(())
    }

    /// Close tag. An empty name closes the innermost element.
    fn close(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    /// End of a document.
    fn end(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<H: Handler + ?Sized> Handler for &mut H {
    fn begin(&mut self) -> Result<()> {
        (**self).begin()
    }

    fn doctype(&mut self, doctype: &Arc<Doctype>) -> Result<()> {
        (**self).doctype(doctype)
    }

    fn comment(&mut self, text: &str) -> Result<()> {
        (**self).comment(text)
    }

    fn declaration(&mut self, declaration: &Declaration) -> Result<()> {
        (**self).declaration(declaration)
    }

    fn pi(&mut self, instruction: &str) -> Result<()> {
        (**self).pi(instruction)
    }

    fn entity(&mut self, name: &str) -> Result<()> {
        (**self).entity(name)
    }

    fn open(&mut self, name: &str, attributes: Vec<Attribute>) -> Result<()> {
        (**self).open(name, attributes)
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        (**self).characters(text)
    }

    fn marked_characters(&mut self, param: &str, text: &str) -> Result<()> {
        (**self).marked_characters(param, text)
    }

    fn close(&mut self, name: &str) -> Result<()> {
        (**self).close(name)
    }

    fn end(&mut self) -> Result<()> {
        (**self).end()
    }
}

/// Handler that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHandler;

impl Handler for NullHandler {}

/// One handler call, in owned form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Begin,
    /// Names of the declared elements.
    Doctype { elements: Vec<String> },
    Comment { text: String },
    Declaration { declaration: Declaration },
    Pi { instruction: String },
    Entity { name: String },
    Open {
        name: String,
        attributes: Vec<Attribute>,
    },
    Characters { text: String },
    MarkedCharacters { param: String, text: String },
    Close { name: String },
    End,
}

impl Event {
    /// Replay this event into a handler.
    pub fn replay<H: Handler + ?Sized>(&self, handler: &mut H) -> Result<()> {
        match self {
            Self::Begin => handler.begin(),
            // The doctype itself is not recorded.
            Self::Doctype { .. } => Ok(()),
            Self::Comment { text } => handler.comment(text),
            Self::Declaration { declaration } => handler.declaration(declaration),
            Self::Pi { instruction } => handler.pi(instruction),
            Self::Entity { name } => handler.entity(name),
            Self::Open { name, attributes } => handler.open(name, attributes.clone()),
            Self::Characters { text } => handler.characters(text),
            Self::MarkedCharacters { param, text } => handler.marked_characters(param, text),
            Self::Close { name } => handler.close(name),
            Self::End => handler.end(),
        }
    }
}

/// Records every event it receives.
#[derive(Debug, Default, Clone)]
pub struct EventRecorder {
    events: Vec<Event>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl Handler for EventRecorder {
    fn begin(&mut self) -> Result<()> {
        self.events.push(Event::Begin);
        Ok(())
    }

    fn doctype(&mut self, doctype: &Arc<Doctype>) -> Result<()> {
        let elements = doctype.elements().map(|e| e.name().to_string()).collect();
        self.events.push(Event::Doctype { elements });
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<()> {
        self.events.push(Event::Comment {
            text: text.to_string(),
        });
        Ok(())
    }

    fn declaration(&mut self, declaration: &Declaration) -> Result<()> {
        self.events.push(Event::Declaration {
            declaration: declaration.clone(),
        });
        Ok(())
    }

    fn pi(&mut self, instruction: &str) -> Result<()> {
        self.events.push(Event::Pi {
            instruction: instruction.to_string(),
        });
        Ok(())
    }

    fn entity(&mut self, name: &str) -> Result<()> {
        self.events.push(Event::Entity {
            name: name.to_string(),
        });
        Ok(())
    }

    fn open(&mut self, name: &str, attributes: Vec<Attribute>) -> Result<()> {
        self.events.push(Event::Open {
            name: name.to_string(),
            attributes,
        });
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        // Chunks of one run of text are merged.
        if let Some(Event::Characters { text: previous }) = self.events.last_mut() {
            previous.push_str(text);
        } else {
            self.events.push(Event::Characters {
                text: text.to_string(),
            });
        }
        Ok(())
    }

    fn marked_characters(&mut self, param: &str, text: &str) -> Result<()> {
        self.events.push(Event::MarkedCharacters {
            param: param.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.events.push(Event::Close {
            name: name.to_string(),
        });
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.events.push(Event::End);
        Ok(())
    }
}

/// Writes events back out as markup.
///
/// Downstream of a validator the output is fully normalized: every close tag
/// is explicit and every attribute is named.
#[derive(Debug, Default, Clone)]
pub struct MarkupWriter {
    out: String,
}

impl MarkupWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl Handler for MarkupWriter {
    fn comment(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            self.out.push_str("<!>");
        } else {
            let _ = write!(self.out, "<!--{text}-->");
        }
        Ok(())
    }

    fn declaration(&mut self, declaration: &Declaration) -> Result<()> {
        let _ = write!(self.out, "{declaration}");
        Ok(())
    }

    fn pi(&mut self, instruction: &str) -> Result<()> {
        let _ = write!(self.out, "<?{instruction}>");
        Ok(())
    }

    fn entity(&mut self, name: &str) -> Result<()> {
        let _ = write!(self.out, "&{name};");
        Ok(())
    }

    fn open(&mut self, name: &str, attributes: Vec<Attribute>) -> Result<()> {
        let _ = write!(self.out, "<{name}");
        for attribute in &attributes {
            let _ = write!(self.out, " {attribute}");
        }
        self.out.push('>');
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.out.push_str(text);
        Ok(())
    }

    fn marked_characters(&mut self, param: &str, text: &str) -> Result<()> {
        let _ = write!(self.out, "<![{param}[{text}]]>");
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        let _ = write!(self.out, "</{name}>");
        Ok(())
    }
}
