//! Doctypes
//!
//! A doctype is a set of element declarations keyed by lower-case name. It is
//! written in markup itself, validated against the bootstrap doctype which
//! describes its own format:
//!
//! ```text
//! <doctype>
//! <element name=doc content=head,body omit>
//!     <attribute name=lang values="en,fr" default="en">
//! <element name=br empty>
//! ```

use super::attribute::AttributeDecl;
use super::builder::DoctypeBuilder;
use super::element::ElementDecl;
use crate::error::Result;
use crate::model::ContentModel;
use crate::validation;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

static BOOTSTRAP: LazyLock<Arc<Doctype>> = LazyLock::new(|| Arc::new(bootstrap_doctype()));

/// An immutable set of element declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Doctype {
    elements: BTreeMap<String, Arc<ElementDecl>>,
}

impl Doctype {
    /// Build a doctype. A later declaration replaces an earlier one of the
    /// same name.
    pub fn new(elements: impl IntoIterator<Item = ElementDecl>) -> Self {
        let elements = elements
            .into_iter()
            .map(|decl| (decl.name().to_string(), Arc::new(decl)))
            .collect();
        Self { elements }
    }

    /// Look up an element declaration, case-insensitively.
    pub fn element(&self, name: &str) -> Option<&Arc<ElementDecl>> {
        self.elements
            .get(name)
            .or_else(|| self.elements.get(&name.to_lowercase()))
    }

    /// Element declarations in name order.
    pub fn elements(&self) -> impl Iterator<Item = &ElementDecl> {
        self.elements.values().map(|decl| decl.as_ref())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The doctype of the doctype format.
    pub fn bootstrap() -> Arc<Doctype> {
        Arc::clone(&BOOTSTRAP)
    }

    /// Read a doctype from its markup form.
    pub fn parse(text: &str) -> Result<Doctype> {
        let builder = validation::validate(text, Self::bootstrap(), DoctypeBuilder::new())?;
        Ok(builder.finish())
    }
}

fn bootstrap_doctype() -> Doctype {
    Doctype::new([
        ElementDecl::new("doctype")
            .with_content(ContentModel::repetition(ContentModel::token("element"), true))
            .omit(),
        ElementDecl::new("element")
            .with_attributes(vec![
                AttributeDecl::new("name").required(),
                AttributeDecl::new("content"),
                AttributeDecl::new("include"),
                AttributeDecl::new("exclude"),
                AttributeDecl::new("type")
                    .with_values(["mixed", "empty", "omit"])
                    .with_default("mixed"),
            ])
            .with_content(ContentModel::repetition(ContentModel::token("attribute"), true))
            .omit(),
        ElementDecl::new("attribute")
            .with_attributes(vec![
                AttributeDecl::new("name").required(),
                AttributeDecl::new("values"),
                AttributeDecl::new("default"),
                AttributeDecl::new("required")
                    .with_values(["required", "optional"])
                    .with_default("optional"),
            ])
            .empty()
            .omit(),
    ])
}

impl fmt::Display for Doctype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<doctype>\n")?;
        for element in self.elements() {
            write!(f, "{element}")?;
        }
        Ok(())
    }
}
