//! Schema
//!
//! Element and attribute declarations, the doctypes that group them, and the
//! registry of named doctypes.

pub mod attribute;
pub mod builder;
pub mod doctype;
pub mod element;
pub mod registry;

pub use attribute::{Attribute, AttributeDecl};
pub use builder::DoctypeBuilder;
pub use doctype::Doctype;
pub use element::ElementDecl;
pub use registry::DoctypeRegistry;
