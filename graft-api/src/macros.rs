//! Macro definitions and invocations, as the host tree hands them to the expander.
//!
//! Both are stored as verbatim source text rather than tokens: the expander carves argument and
//! template bodies out of the original text byte-for-byte, which a token round-trip can't do.

use crate::idents::Ident;
use crate::scopes::InvocationContext;
use crate::spans::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `macro_rules!` definition.
#[derive(Clone, Serialize, Deserialize)]
pub struct MacroDefinition {
    /// The name the macro is invoked by.
    pub name: Ident,
    /// The full `macro_rules! name { ... }` item, attributes included.
    pub source: String,
    /// Where the definition was written.
    pub span: Span,
}

/// A macro invocation in the host tree: `name! { ... }`, `name!(...)`, `name![...]`.
#[derive(Clone, Serialize, Deserialize)]
pub struct MacroInvocation {
    /// The last segment of the invoked path.
    pub name: Ident,
    /// The invocation from the start of the macro path through the closing argument
    /// delimiter. Excludes outer attributes and any trailing `;`.
    pub source: String,
    /// Where the invocation was written.
    pub span: Span,
    /// The position the invocation was written in.
    pub context: InvocationContext,
}

impl fmt::Debug for MacroDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "macro_rules! {} @ {:?}", self.name, self.span)
    }
}
impl fmt::Debug for MacroInvocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}! @ {:?} in {:?}", self.name, self.span, self.context)
    }
}
