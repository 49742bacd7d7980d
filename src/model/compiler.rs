//! Content Model Compiler
//!
//! Compiles the textual form of a content model, as used in SGML/XML doctypes
//! but without embedded whitespace, into a normalized [`ContentModel`] tree:
//!
//! - Empty: `.`
//! - Sequence: `a,b,c`
//! - Alternative: `a|b|c`
//! - Zero-or-more, one-or-more, optional: `a*`, `a+`, `a?`
//! - Subexpressions: `(a,b)|c*`
//!
//! Redundant operators are folded while the tree is built, so `a+*` and `a?+`
//! both compile to `a*` and `(.|a)` compiles to `a?`.

use super::ContentModel;
use crate::error::{ErrorKind, ParseError, Result};

/// Deepest parenthesis nesting accepted by [`compile`].
pub const MAX_NESTING: usize = 256;

/// Compile a content model expression.
pub fn compile(expression: &str) -> Result<ContentModel> {
    let mut compiler = Compiler {
        expr: expression.chars().collect(),
        idx: 0,
        depth: 0,
        source: expression,
    };
    let model = compiler.sequence_expr()?;
    if compiler.idx < compiler.expr.len() {
        return Err(compiler.error(ErrorKind::UnexpectedCharacter));
    }
    Ok(model)
}

struct Compiler<'a> {
    expr: Vec<char>,
    idx: usize,
    depth: usize,
    source: &'a str,
}

impl Compiler<'_> {
    fn peek(&self) -> Option<char> {
        self.expr.get(self.idx).copied()
    }

    fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError::with_item(kind, self.source)
    }

    fn sequence_expr(&mut self) -> Result<ContentModel> {
        let mut model = self.alternative_expr()?;
        while self.peek() == Some(',') {
            self.idx += 1;
            model = sequence(model, self.alternative_expr()?);
        }
        Ok(model)
    }

    fn alternative_expr(&mut self) -> Result<ContentModel> {
        let mut model = self.term()?;
        while self.peek() == Some('|') {
            self.idx += 1;
            model = alternative(model, self.term()?);
        }
        Ok(model)
    }

    fn term(&mut self) -> Result<ContentModel> {
        let mut model = match self.peek() {
            None => return Err(self.error(ErrorKind::UnexpectedEndOfExpression)),
            Some('(') => {
                if self.depth == MAX_NESTING {
                    return Err(self.error(ErrorKind::NestingTooDeep));
                }
                self.depth += 1;
                self.idx += 1;
                let model = self.sequence_expr()?;
                // Only ')' can stop a subexpression short of the end.
                if self.peek().is_none() {
                    return Err(self.error(ErrorKind::UnexpectedEndOfExpression));
                }
                self.idx += 1;
                self.depth -= 1;
                model
            }
            Some(_) => {
                let start = self.idx;
                while let Some(chr) = self.peek() {
                    if chr <= ' ' || "),|*+?".contains(chr) {
                        break;
                    }
                    self.idx += 1;
                }
                let token: String = self.expr[start..self.idx].iter().collect();
                token_model(&token)?
            }
        };
        while let Some(chr) = self.peek() {
            match chr {
                '*' | '+' => {
                    self.idx += 1;
                    model = repeat(model, chr == '*');
                }
                '?' => {
                    self.idx += 1;
                    model = optional(model);
                }
                ')' | ',' | '|' => break,
                _ => return Err(self.error(ErrorKind::UnexpectedCharacter)),
            }
        }
        Ok(model)
    }
}

fn token_model(token: &str) -> Result<ContentModel> {
    match token {
        "" => Err(ParseError::with_item(ErrorKind::ZeroLengthToken, token)),
        "." => Ok(ContentModel::Empty),
        _ => Ok(ContentModel::token(token)),
    }
}

fn strip_repetition(model: ContentModel) -> ContentModel {
    match model {
        ContentModel::Repetition { inner, .. } => *inner,
        other => other,
    }
}

/// Apply `*` (`allows_zero`) or `+` to a model.
fn repeat(model: ContentModel, allows_zero: bool) -> ContentModel {
    let accepts_empty = model.accepts_empty();
    match model {
        // a+* -> a*
        ContentModel::Repetition { inner, .. } => {
            ContentModel::Repetition {
                inner,
                allows_zero: allows_zero || accepts_empty,
                marked: false,
            }
        }
        // a?+ -> a*
        ContentModel::Optional(inner) => ContentModel::Repetition {
            inner,
            allows_zero: true,
            marked: false,
        },
        // (a|b+)+ -> (a|b)+
        ContentModel::Alternative { left, right, .. } => {
            let left = strip_repetition(repeat(*left, false));
            let right = strip_repetition(repeat(*right, false));
            ContentModel::repetition(
                ContentModel::alternative(left, right),
                allows_zero || accepts_empty,
            )
        }
        ContentModel::Empty => ContentModel::Empty,
        other => ContentModel::repetition(other, allows_zero),
    }
}

/// Apply `?` to a model.
fn optional(model: ContentModel) -> ContentModel {
    match model {
        // a+? -> a*
        ContentModel::Repetition { inner, .. } => ContentModel::Repetition {
            inner,
            allows_zero: true,
            marked: false,
        },
        model if model.accepts_empty() => model,
        other => ContentModel::optional(other),
    }
}

fn alternative(left: ContentModel, right: ContentModel) -> ContentModel {
    // (.|a) -> a?
    if left == ContentModel::Empty {
        return optional(right);
    }
    // (a?|b) -> (a|b?), hoisted below.
    let (left, right) = match left {
        ContentModel::Optional(inner) => (*inner, optional(right)),
        left => (left, right),
    };
    match right {
        ContentModel::Empty => optional(left),
        // (a|b?) -> (a|b)?
        ContentModel::Optional(inner) => optional(ContentModel::alternative(left, *inner)),
        right => ContentModel::alternative(left, right),
    }
}

fn sequence(left: ContentModel, right: ContentModel) -> ContentModel {
    match (left, right) {
        (ContentModel::Empty, other) | (other, ContentModel::Empty) => other,
        (left, right) => ContentModel::sequence(left, right),
    }
}
