//! Element declarations.

use super::attribute::{Attribute, AttributeDecl, Bare};
use crate::error::{ErrorKind, ParseError, Result};
use crate::model::ContentModel;
use std::fmt;

static EMPTY_MODEL: ContentModel = ContentModel::Empty;

/// Declaration of an element: its attributes, the content model for its
/// children and how it interacts with tag minimization.
///
/// An element may name *inclusions*, elements permitted anywhere inside it
/// (and inside its descendants) regardless of the content model, and
/// *exclusions*, elements forbidden anywhere inside it. An `empty` element has
/// no content and no close tag. An `omit` element may have its close tag
/// inferred once its content model is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDecl {
    name: String,
    attributes: Vec<AttributeDecl>,
    content: ContentModel,
    inclusions: Vec<String>,
    exclusions: Vec<String>,
    empty: bool,
    omit: bool,
}

impl ElementDecl {
    /// An element with no attributes, no permitted children and a required
    /// close tag.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            attributes: Vec::new(),
            content: ContentModel::Empty,
            inclusions: Vec::new(),
            exclusions: Vec::new(),
            empty: false,
            omit: false,
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<AttributeDecl>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the template content model. Match state is cleared.
    pub fn with_content(mut self, content: ContentModel) -> Self {
        self.content = content.fresh();
        self
    }

    pub fn with_inclusions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inclusions = lowercase_all(names);
        self
    }

    pub fn with_exclusions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclusions = lowercase_all(names);
        self
    }

    /// Mark the element as having no content and no close tag.
    pub fn empty(mut self) -> Self {
        self.empty = true;
        self
    }

    /// Permit the close tag to be inferred.
    pub fn omit(mut self) -> Self {
        self.omit = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[AttributeDecl] {
        &self.attributes
    }

    /// The template content model. Never match against it directly, use
    /// [`ElementDecl::content_model`].
    pub fn content(&self) -> &ContentModel {
        if self.empty {
            &EMPTY_MODEL
        } else {
            &self.content
        }
    }

    /// A fresh copy of the content model, ready for matching.
    pub fn content_model(&self) -> ContentModel {
        self.content().fresh()
    }

    pub fn inclusions(&self) -> &[String] {
        &self.inclusions
    }

    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }

    pub fn has_inclusions(&self) -> bool {
        !self.inclusions.is_empty()
    }

    pub fn has_exclusions(&self) -> bool {
        !self.exclusions.is_empty()
    }

    /// `name` must already be lower-case.
    pub fn has_inclusion(&self, name: &str) -> bool {
        self.inclusions.iter().any(|n| n == name)
    }

    /// `name` must already be lower-case.
    pub fn has_exclusion(&self, name: &str) -> bool {
        self.exclusions.iter().any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn may_omit(&self) -> bool {
        self.omit
    }

    /// Validate and normalize attributes in place.
    ///
    /// Minimized attributes are given the name of the first declaration that
    /// has their value, and defaults are appended for optional attributes that
    /// were not given.
    pub fn validate(&self, attributes: &mut Vec<Attribute>) -> Result<()> {
        let mut resolved = vec![false; attributes.len()];
        for decl in &self.attributes {
            let mut found = None;
            for (idx, attr) in attributes.iter_mut().enumerate() {
                let matches = match attr.name.as_deref() {
                    Some(name) => name == decl.name(),
                    None => decl.has_value(&attr.value),
                };
                if !matches {
                    continue;
                }
                if found.is_some() {
                    return Err(ParseError::with_item(
                        ErrorKind::DuplicateAttribute,
                        decl.name(),
                    ));
                }
                attr.name = Some(decl.name().to_string());
                resolved[idx] = true;
                found = Some(idx);
            }
            let idx = match found {
                Some(idx) => idx,
                None if decl.is_required() => {
                    return Err(ParseError::with_item(
                        ErrorKind::RequiredAttributeMissing,
                        decl.name(),
                    ));
                }
                None => {
                    attributes.push(Attribute::new(decl.name(), decl.default_value()));
                    resolved.push(true);
                    attributes.len() - 1
                }
            };
            if !decl.permits(&attributes[idx].value) {
                return Err(ParseError::with_item(
                    ErrorKind::AttributeValueNotPermitted,
                    attributes[idx].to_string(),
                ));
            }
        }
        if let Some(idx) = resolved.iter().position(|done| !done) {
            return Err(ParseError::with_item(
                ErrorKind::UndeclaredAttribute,
                attributes[idx].to_string(),
            ));
        }
        Ok(())
    }
}

fn lowercase_all<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().to_lowercase())
        .collect()
}

impl fmt::Display for ElementDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<element name={}", Bare(&self.name))?;
        let content = self.content();
        if *content != ContentModel::Empty {
            write!(f, " content={}", Bare(&content.to_string()))?;
        }
        if self.has_inclusions() {
            write!(f, " include={}", Bare(&self.inclusions.join(",")))?;
        }
        if self.has_exclusions() {
            write!(f, " exclude={}", Bare(&self.exclusions.join(",")))?;
        }
        if self.empty {
            f.write_str(" empty")?;
        } else if self.omit {
            f.write_str(" omit")?;
        }
        f.write_str(">\n")?;
        for attribute in &self.attributes {
            writeln!(f, "\t{attribute}")?;
        }
        Ok(())
    }
}
