//! Content Models
//!
//! A content model restricts which child elements may appear, and in what
//! order, inside an element. Models are trees matched without backtracking:
//! each node keeps a "marked" flag meaning "an accepting position has been
//! reached at this step", and [`ContentModel::shift`] advances every node at
//! once for one incoming token.
//!
//! Match state lives inside the tree, so a template owned by a schema must only
//! be matched through a copy obtained from [`ContentModel::fresh`].

pub mod compiler;

use std::fmt;

pub use compiler::compile;

/// A node of a content model expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentModel {
    /// Satisfied only by no input.
    Empty,
    /// Matches a single occurrence of any token.
    AnyToken { marked: bool },
    /// Matches a single occurrence of a named token.
    Token { name: String, marked: bool },
    /// Left followed by right.
    Sequence {
        left: Box<ContentModel>,
        right: Box<ContentModel>,
        marked: bool,
    },
    /// Either left or right.
    Alternative {
        left: Box<ContentModel>,
        right: Box<ContentModel>,
        marked: bool,
    },
    /// One or more occurrences, or zero or more when `allows_zero` is set.
    Repetition {
        inner: Box<ContentModel>,
        allows_zero: bool,
        marked: bool,
    },
    /// Zero or one occurrence.
    Optional(Box<ContentModel>),
}

impl ContentModel {
    /// A matcher for a single token, compared case-insensitively.
    pub fn token(name: &str) -> Self {
        Self::Token {
            name: name.to_lowercase(),
            marked: false,
        }
    }

    pub fn any_token() -> Self {
        Self::AnyToken { marked: false }
    }

    pub fn sequence(left: ContentModel, right: ContentModel) -> Self {
        Self::Sequence {
            left: Box::new(left),
            right: Box::new(right),
            marked: false,
        }
    }

    pub fn alternative(left: ContentModel, right: ContentModel) -> Self {
        Self::Alternative {
            left: Box::new(left),
            right: Box::new(right),
            marked: false,
        }
    }

    pub fn repetition(inner: ContentModel, allows_zero: bool) -> Self {
        Self::Repetition {
            inner: Box::new(inner),
            allows_zero,
            marked: false,
        }
    }

    pub fn optional(inner: ContentModel) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Recursively clear the match state.
    pub fn reset(&mut self) {
        match self {
            Self::Empty => {}
            Self::AnyToken { marked } | Self::Token { marked, .. } => *marked = false,
            Self::Sequence {
                left,
                right,
                marked,
            }
            | Self::Alternative {
                left,
                right,
                marked,
            } => {
                left.reset();
                right.reset();
                *marked = false;
            }
            Self::Repetition { inner, marked, .. } => {
                inner.reset();
                *marked = false;
            }
            Self::Optional(inner) => inner.reset(),
        }
    }

    /// A deep copy of this model with cleared match state.
    pub fn fresh(&self) -> Self {
        let mut copy = self.clone();
        copy.reset();
        copy
    }

    /// True if the zero-length sequence satisfies this model.
    pub fn accepts_empty(&self) -> bool {
        match self {
            Self::Empty | Self::Optional(_) => true,
            Self::AnyToken { .. } | Self::Token { .. } => false,
            Self::Sequence { left, right, .. } => left.accepts_empty() && right.accepts_empty(),
            Self::Alternative { left, right, .. } => left.accepts_empty() || right.accepts_empty(),
            Self::Repetition {
                inner, allows_zero, ..
            } => *allows_zero || inner.accepts_empty(),
        }
    }

    /// Whether this model is at an accepting position.
    ///
    /// With `recursive` unset only the committed state of this node is read.
    /// With it set, children are probed too, which answers "is any match still
    /// in progress".
    pub fn marked(&self, recursive: bool) -> bool {
        match self {
            Self::Empty => false,
            Self::AnyToken { marked } | Self::Token { marked, .. } => *marked,
            Self::Sequence {
                left,
                right,
                marked,
            }
            | Self::Alternative {
                left,
                right,
                marked,
            } => *marked || (recursive && (left.marked(true) || right.marked(true))),
            Self::Repetition { inner, marked, .. } => *marked || (recursive && inner.marked(true)),
            Self::Optional(inner) => inner.marked(recursive),
        }
    }

    /// Advance the model by one token.
    ///
    /// `mark` is true when the position before this token is reachable. The
    /// first token of a sequence is shifted with `mark` set, later ones with it
    /// unset. Returns the new accepting state of this node.
    pub fn shift(&mut self, token: &str, mark: bool) -> bool {
        match self {
            Self::Empty => false,
            Self::AnyToken { marked } => {
                *marked = mark;
                *marked
            }
            Self::Token { name, marked } => {
                *marked = mark && token_matches(name, token);
                *marked
            }
            Self::Sequence {
                left,
                right,
                marked,
            } => {
                let left_was_marked = left.marked(false);
                let marked_left = left.shift(token, mark);
                let marked_right =
                    right.shift(token, left_was_marked || (mark && left.accepts_empty()));
                *marked = (marked_left && right.accepts_empty()) || marked_right;
                *marked
            }
            Self::Alternative {
                left,
                right,
                marked,
            } => {
                let marked_left = left.shift(token, mark);
                let marked_right = right.shift(token, mark);
                *marked = marked_left || marked_right;
                *marked
            }
            Self::Repetition { inner, marked, .. } => {
                *marked = inner.shift(token, mark || *marked);
                *marked
            }
            Self::Optional(inner) => inner.shift(token, mark),
        }
    }

    /// Run a fresh copy of this model over `tokens` and report whether the
    /// whole sequence is accepted.
    pub fn matches<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        let mut model = self.fresh();
        let mut mark = true;
        for token in tokens {
            model.shift(token.as_ref(), mark);
            mark = false;
        }
        (mark && model.accepts_empty()) || model.marked(false)
    }

    /// Binding strength used to minimise parentheses when rendering.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Sequence { .. } => 1,
            Self::Alternative { .. } => 2,
            _ => 3,
        }
    }

    fn fmt_child(&self, child: &ContentModel, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if child.precedence() < self.precedence() {
            write!(f, "({child})")
        } else {
            write!(f, "{child}")
        }
    }
}

fn token_matches(name: &str, token: &str) -> bool {
    name.eq_ignore_ascii_case(token) || (!token.is_ascii() && name == token.to_lowercase())
}

impl fmt::Display for ContentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("."),
            // Not part of the expression grammar, only used by the document root.
            Self::AnyToken { .. } => f.write_str("<any>"),
            Self::Token { name, .. } => f.write_str(name),
            Self::Sequence { left, right, .. } => {
                self.fmt_child(left, f)?;
                f.write_str(",")?;
                self.fmt_child(right, f)
            }
            Self::Alternative { left, right, .. } => {
                self.fmt_child(left, f)?;
                f.write_str("|")?;
                self.fmt_child(right, f)
            }
            Self::Repetition {
                inner, allows_zero, ..
            } => {
                self.fmt_child(inner, f)?;
                f.write_str(if *allows_zero { "*" } else { "+" })
            }
            Self::Optional(inner) => {
                self.fmt_child(inner, f)?;
                f.write_str("?")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(left: ContentModel, right: ContentModel) -> ContentModel {
        ContentModel::sequence(left, right)
    }

    fn tok(name: &str) -> ContentModel {
        ContentModel::token(name)
    }

    #[test]
    fn test_token_matches_case_insensitively() {
        let model = tok("Para");
        assert!(model.matches(&["PARA"]));
        assert!(model.matches(&["para"]));
        assert!(!model.matches(&["list"]));
        assert!(!model.matches::<&str>(&[]));
    }

    #[test]
    fn test_empty_accepts_only_no_input() {
        let model = ContentModel::Empty;
        assert!(model.matches::<&str>(&[]));
        assert!(!model.matches(&["a"]));
    }

    #[test]
    fn test_any_token() {
        let model = ContentModel::repetition(ContentModel::any_token(), true);
        assert!(model.matches::<&str>(&[]));
        assert!(model.matches(&["x", "y", "z"]));
    }

    #[test]
    fn test_sequence() {
        let model = seq(tok("a"), tok("b"));
        assert!(model.matches(&["a", "b"]));
        assert!(!model.matches(&["a"]));
        assert!(!model.matches(&["b", "a"]));
        assert!(!model.matches(&["a", "b", "b"]));
    }

    #[test]
    fn test_alternative() {
        let model = ContentModel::alternative(tok("a"), tok("b"));
        assert!(model.matches(&["a"]));
        assert!(model.matches(&["b"]));
        assert!(!model.matches(&["a", "b"]));
    }

    #[test]
    fn test_repetition_one_or_more() {
        let model = ContentModel::repetition(seq(tok("a"), tok("b")), false);
        assert!(!model.matches::<&str>(&[]));
        assert!(model.matches(&["a", "b"]));
        assert!(model.matches(&["a", "b", "a", "b"]));
        assert!(!model.matches(&["a", "b", "a"]));
    }

    #[test]
    fn test_optional() {
        let model = seq(ContentModel::optional(tok("a")), tok("b"));
        assert!(model.matches(&["b"]));
        assert!(model.matches(&["a", "b"]));
        assert!(!model.matches(&["a", "a", "b"]));
    }

    #[test]
    fn test_one_or_more_boundary_does_not_double_count() {
        let model = seq(ContentModel::repetition(tok("a"), false), tok("a"));
        assert!(!model.matches(&["a"]));
        assert!(model.matches(&["a", "a"]));
        assert!(model.matches(&["a", "a", "a"]));
    }

    #[test]
    fn test_marked_recursive_tracks_progress() {
        let mut model = seq(tok("a"), tok("b"));
        model.shift("a", true);
        assert!(!model.marked(false));
        assert!(model.marked(true));

        model.shift("c", false);
        assert!(!model.marked(true));
    }

    #[test]
    fn test_fresh_copy_leaves_template_untouched() {
        let template = seq(tok("a"), ContentModel::repetition(tok("b"), true));
        let mut first = template.fresh();
        let second = template.fresh();

        first.shift("a", true);
        first.shift("b", false);

        assert!(first.marked(false));
        assert!(!template.marked(true));
        assert!(!second.marked(true));
        assert_eq!(second, template);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut model = ContentModel::repetition(tok("a"), false);
        model.shift("a", true);
        assert!(model.marked(false));
        model.reset();
        assert!(!model.marked(true));
    }

    #[test]
    fn test_render_minimal_parentheses() {
        let model = seq(
            ContentModel::alternative(tok("a"), tok("b")),
            ContentModel::repetition(seq(tok("c"), tok("d")), true),
        );
        assert_eq!(model.to_string(), "a|b,(c,d)*");

        let model = ContentModel::alternative(seq(tok("a"), tok("b")), tok("c"));
        assert_eq!(model.to_string(), "(a,b)|c");

        let model = ContentModel::optional(ContentModel::alternative(tok("a"), tok("b")));
        assert_eq!(model.to_string(), "(a|b)?");
    }

    #[test]
    fn test_precedence() {
        assert_eq!(tok("a").precedence(), 3);
        assert_eq!(ContentModel::Empty.precedence(), 3);
        assert_eq!(ContentModel::optional(tok("a")).precedence(), 3);
        assert_eq!(ContentModel::alternative(tok("a"), tok("b")).precedence(), 2);
        assert_eq!(seq(tok("a"), tok("b")).precedence(), 1);
    }
}
