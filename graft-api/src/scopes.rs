//! Scopes, and the contexts macro invocations can appear in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a scope in the host tree: a module, the crate root, or a function body.
/// Only meaningful relative to the tree that handed it out.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// The syntactic position a macro invocation was written in.
///
/// Items produced by an expansion become siblings of the invocation, so they can only be
/// placed where items may be written in the first place.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum InvocationContext {
    /// Item position in a module (or at the crate root).
    Module(ScopeId),
    /// Statement position in a function body.
    Block(ScopeId),
    /// Expression, type or pattern position. Nothing can be declared here.
    Expression,
}
impl InvocationContext {
    /// The scope expanded items are bound into, if any.
    pub fn resolvable(&self) -> Option<ScopeId> {
        match self {
            InvocationContext::Module(scope) | InvocationContext::Block(scope) => Some(*scope),
            InvocationContext::Expression => None,
        }
    }
}

/// Identifies a namespace. Types and modules share one; functions, consts and statics share
/// another; `macro_rules!` macros get their own.
#[repr(u8)]
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Namespace {
    Type = 0,
    Value = 1,
    Macro = 2,
}
