//! The output of macro expansion.

use crate::idents::Ident;
use crate::scopes::{InvocationContext, Namespace, ScopeId};
use crate::spans::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of top-level element that can take part in name resolution, either by declaring a
/// name or by being something a resolver walks (impls, uses, further macro calls).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ElementKind {
    Const,
    Enum,
    ExternCrate,
    ForeignBlock,
    Function,
    Impl,
    /// An invocation of some other macro. Not expanded further.
    MacroCall,
    /// A `macro_rules!` definition.
    MacroRules,
    Module,
    Static,
    Struct,
    Trait,
    TraitAlias,
    TypeAlias,
    Union,
    Use,
}
impl ElementKind {
    /// The namespace an element of this kind declares its name in, if it declares one.
    pub fn namespace(self) -> Option<Namespace> {
        match self {
            ElementKind::Const | ElementKind::Function | ElementKind::Static => {
                Some(Namespace::Value)
            }
            ElementKind::Enum
            | ElementKind::ExternCrate
            | ElementKind::Module
            | ElementKind::Struct
            | ElementKind::Trait
            | ElementKind::TraitAlias
            | ElementKind::TypeAlias
            | ElementKind::Union => Some(Namespace::Type),
            ElementKind::MacroRules => Some(Namespace::Macro),
            ElementKind::ForeignBlock
            | ElementKind::Impl
            | ElementKind::MacroCall
            | ElementKind::Use => None,
        }
    }
}

/// A top-level element parsed out of a scratch unit, not yet attached to any scope.
///
/// It still thinks it lives in the throwaway file it was parsed from; `ExpansionResult::bind`
/// is the only way to turn it into something a resolver will see.
#[derive(Clone, Debug)]
pub struct ScratchElement {
    pub kind: ElementKind,
    pub name: Option<Ident>,
    /// Paths of the element's outer attributes, e.g. `cfg`, `doc`, `derive`.
    pub attributes: Vec<String>,
    /// The element's verbatim text in the scratch unit.
    pub text: String,
    /// The element's location in the scratch unit.
    pub span: Span,
}

/// An element produced by expanding a macro, bound to the scope the macro was invoked in.
#[derive(Clone, Serialize, Deserialize)]
pub struct ExpansionResult {
    kind: ElementKind,
    name: Option<Ident>,
    attributes: Vec<String>,
    text: String,
    span: Span,
    context: ScopeId,
}
impl ExpansionResult {
    /// Attach a scratch element to the context of the invocation that produced it.
    /// Fails if nothing can be declared in that context.
    pub fn bind(element: ScratchElement, context: &InvocationContext) -> Option<ExpansionResult> {
        let context = context.resolvable()?;
        let ScratchElement {
            kind,
            name,
            attributes,
            text,
            span,
        } = element;
        Some(ExpansionResult {
            kind,
            name,
            attributes,
            text,
            span,
            context,
        })
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// The declared name, for kinds that declare one.
    pub fn name(&self) -> Option<&Ident> {
        self.name.as_ref()
    }

    /// Paths of the element's outer attributes.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Whether the element carries an outer attribute with this path.
    pub fn has_attribute(&self, path: &str) -> bool {
        self.attributes.iter().any(|attr| attr == path)
    }

    /// The element's verbatim source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Where the element was parsed; `macro_invocation` points at the invocation.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// The scope the element lives in: always the scope of the invocation that produced it.
    pub fn context(&self) -> ScopeId {
        self.context
    }
}
impl fmt::Debug for ExpansionResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{:?} {} in {:?}", self.kind, name, self.context),
            None => write!(f, "{:?} in {:?}", self.kind, self.context),
        }
    }
}
