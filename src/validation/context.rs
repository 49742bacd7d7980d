//! Element context for the validator.

use crate::model::ContentModel;
use crate::schema::ElementDecl;
use std::sync::Arc;

/// One open element and the match state of its content model.
#[derive(Debug, Clone)]
struct Frame {
    decl: Option<Arc<ElementDecl>>,
    model: ContentModel,
    /// No child has been shifted into the model yet.
    pending: bool,
    /// This element or an ancestor declares inclusions.
    has_inclusions: bool,
    /// This element or an ancestor declares exclusions.
    has_exclusions: bool,
}

impl Frame {
    /// The document level, which accepts any sequence of elements.
    fn root() -> Self {
        Self {
            decl: None,
            model: ContentModel::repetition(ContentModel::any_token(), true),
            pending: true,
            has_inclusions: false,
            has_exclusions: false,
        }
    }

    fn complete(&self) -> bool {
        (self.pending && self.model.accepts_empty()) || self.model.marked(false)
    }

    fn marked(&self) -> bool {
        self.pending || self.model.marked(true)
    }
}

/// Stack of open elements, innermost last.
#[derive(Debug, Clone)]
pub struct ContextStack {
    root: Frame,
    frames: Vec<Frame>,
}

impl Default for ContextStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextStack {
    pub fn new() -> Self {
        Self {
            root: Frame::root(),
            frames: Vec::new(),
        }
    }

    /// Drop every open element and restart the document level.
    pub fn reset(&mut self) {
        self.root = Frame::root();
        self.frames.clear();
    }

    /// Open an element with a fresh copy of its content model.
    pub fn push(&mut self, decl: Arc<ElementDecl>) {
        let parent = self.top();
        let frame = Frame {
            model: decl.content_model(),
            pending: true,
            has_inclusions: decl.has_inclusions() || parent.has_inclusions,
            has_exclusions: decl.has_exclusions() || parent.has_exclusions,
            decl: Some(decl),
        };
        self.frames.push(frame);
    }

    /// Close the innermost element.
    pub fn pop(&mut self) -> Option<Arc<ElementDecl>> {
        self.frames.pop().and_then(|frame| frame.decl)
    }

    /// Declaration of the innermost open element, `None` at document level.
    pub fn current(&self) -> Option<&Arc<ElementDecl>> {
        self.frames.last().and_then(|frame| frame.decl.as_ref())
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True if an open element includes `name`. `name` must be lower-case.
    pub fn is_included(&self, name: &str) -> bool {
        self.frames
            .iter()
            .rev()
            .take_while(|frame| frame.has_inclusions)
            .filter_map(|frame| frame.decl.as_ref())
            .any(|decl| decl.has_inclusion(name))
    }

    /// True if an open element excludes `name`. `name` must be lower-case.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.frames
            .iter()
            .rev()
            .take_while(|frame| frame.has_exclusions)
            .filter_map(|frame| frame.decl.as_ref())
            .any(|decl| decl.has_exclusion(name))
    }

    /// Advance the innermost content model by one child element.
    pub fn shift(&mut self, name: &str) {
        let frame = self.top_mut();
        frame.model.shift(name, frame.pending);
        frame.pending = false;
    }

    /// True if the innermost element needs no more children.
    pub fn complete(&self) -> bool {
        self.top().complete()
    }

    /// True if the innermost element can still become complete.
    pub fn marked(&self) -> bool {
        self.top().marked()
    }

    /// Ancestry path of the open elements, e.g. `<doc><content>`.
    pub fn path(&self) -> String {
        self.frames
            .iter()
            .filter_map(|frame| frame.decl.as_ref())
            .map(|decl| format!("<{}>", decl.name()))
            .collect()
    }

    fn top(&self) -> &Frame {
        self.frames.last().unwrap_or(&self.root)
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().unwrap_or(&mut self.root)
    }
}
