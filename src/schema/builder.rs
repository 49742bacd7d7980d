//! Doctype Builder
//!
//! A [`Handler`] that collects validated doctype markup into a [`Doctype`].
//! Attributes arrive normalized by the validator, so every declared attribute
//! is present and empty values mean "not given".

use super::attribute::{Attribute, AttributeDecl};
use super::doctype::Doctype;
use super::element::ElementDecl;
use crate::error::{ErrorKind, ParseError, Result};
use crate::handler::Handler;
use crate::model::{compile, ContentModel};
use log::trace;

#[derive(Debug)]
struct PendingElement {
    attributes: Vec<Attribute>,
    decls: Vec<AttributeDecl>,
}

/// Builds a [`Doctype`] from `<doctype>`, `<element>` and `<attribute>` events.
#[derive(Debug, Default)]
pub struct DoctypeBuilder {
    elements: Vec<ElementDecl>,
    pending: Option<PendingElement>,
}

impl DoctypeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The doctype built from the elements seen so far.
    pub fn finish(self) -> Doctype {
        Doctype::new(self.elements)
    }
}

impl Handler for DoctypeBuilder {
    fn open(&mut self, name: &str, attributes: Vec<Attribute>) -> Result<()> {
        if name.eq_ignore_ascii_case("doctype") {
            self.elements.clear();
            self.pending = None;
        } else if name.eq_ignore_ascii_case("element") {
            self.pending = Some(PendingElement {
                attributes,
                decls: Vec::new(),
            });
        } else if name.eq_ignore_ascii_case("attribute") {
            let decl = attribute_decl(&attributes)?;
            if let Some(pending) = self.pending.as_mut() {
                pending.decls.push(decl);
            }
        }
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        if name.eq_ignore_ascii_case("element")
            && let Some(pending) = self.pending.take()
        {
            let decl = element_decl(pending)?;
            trace!("declared element {}", decl.name());
            self.elements.push(decl);
        }
        Ok(())
    }
}

fn required_value<'a>(attributes: &'a [Attribute], name: &str) -> Result<&'a str> {
    match Attribute::value_of(attributes, name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ParseError::with_item(
            ErrorKind::RequiredAttributeMissing,
            name,
        )),
    }
}

fn optional_value<'a>(attributes: &'a [Attribute], name: &str) -> &'a str {
    Attribute::value_of(attributes, name).unwrap_or("")
}

fn element_decl(pending: PendingElement) -> Result<ElementDecl> {
    let attributes = &pending.attributes;
    let name = required_value(attributes, "name")?;
    let kind = optional_value(attributes, "type").to_lowercase();
    let empty = kind == "empty";
    let omit = empty || kind == "omit";

    let mut decl = ElementDecl::new(name)
        .with_attributes(pending.decls)
        .with_inclusions(split_list(optional_value(attributes, "include"))?)
        .with_exclusions(split_list(optional_value(attributes, "exclude"))?);

    let content = optional_value(attributes, "content");
    if !content.is_empty() {
        let model = compile(content)?;
        if empty && model != ContentModel::Empty {
            return Err(ParseError::with_item(
                ErrorKind::EmptyElementMayNotContainChildren,
                name,
            ));
        }
        decl = decl.with_content(model);
    }
    if empty {
        decl = decl.empty();
    }
    if omit {
        decl = decl.omit();
    }
    Ok(decl)
}

fn attribute_decl(attributes: &[Attribute]) -> Result<AttributeDecl> {
    let mut decl = AttributeDecl::new(required_value(attributes, "name")?)
        .with_values(split_list(optional_value(attributes, "values"))?)
        .with_default(optional_value(attributes, "default"));
    if optional_value(attributes, "required").eq_ignore_ascii_case("required") {
        decl = decl.required();
    }
    Ok(decl)
}

/// Split a comma-separated list. A single trailing comma is tolerated.
fn split_list(list: &str) -> Result<Vec<String>> {
    if list.is_empty() {
        return Ok(Vec::new());
    }
    let mut items: Vec<&str> = list.split(',').collect();
    if items.last() == Some(&"") {
        items.pop();
    }
    if items.iter().any(|item| item.is_empty()) {
        return Err(ParseError::with_item(ErrorKind::MalformedList, list));
    }
    Ok(items.into_iter().map(str::to_string).collect())
}
