//! Markup declarations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A generalized markup declaration such as `<!DOCTYPE doc [ ... ]>`.
///
/// Parameters keep their quotes and the `+`/`-` prefixes of inclusion and
/// exclusion groups, so `<!ELEMENT p - O (#PCDATA) +(em)>` has the
/// parameters `p`, `-`, `O`, `(#PCDATA)` and `+(em)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub params: Vec<String>,
    pub subset: Vec<Declaration>,
}

impl Declaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Remove the quotes around a quoted parameter.
    pub fn unquote(param: &str) -> &str {
        for quote in ['"', '\''] {
            if let Some(inner) = param
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
            {
                return inner;
            }
        }
        param
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<!{}", self.name)?;
        for param in &self.params {
            write!(f, " {param}")?;
        }
        if !self.subset.is_empty() {
            f.write_str("\n[")?;
            for decl in &self.subset {
                write!(f, "{decl}")?;
            }
            f.write_str("]\n")?;
        }
        f.write_str(">")
    }
}
