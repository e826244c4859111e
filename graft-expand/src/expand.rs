//! Macro expansion. Handles exactly one shape of `macro_rules!`, plus `lazy_static!`.
//! Does not implement hygiene; substitution is textual.
//!
//! ## Expansion algorithm
//! 1. Builtins are checked first, by name alone. A `lazy_static!` invocation never looks at a
//!    definition, even if some user macro with that name is in scope.
//! 2. Otherwise the name is looked up through `DefinitionLookup`.
//! 3. The definition is parsed (`ast`) and checked against the supported shape (`shape`).
//! 4. The invocation's argument text is carved out and parsed as items (`arguments`).
//! 5. The template repetition's text is carved out of the definition and pasted once per item
//!    (`instantiate`).
//! 6. The result is parsed as a file; its items are the expansion (`resynthesize`).
//! 7. Each item is bound to the invocation's scope (`bind`).
//!
//! Any failure along the way means no expansion. `ExpandError` says which step gave up.

use graft_api::expansions::ExpansionResult;
use graft_api::idents::Ident;
use graft_api::macros::{MacroDefinition, MacroInvocation};
use graft_api::Map;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace};

pub mod arguments;
pub mod ast;
pub mod bind;
pub mod builtin;
pub mod instantiate;
pub mod resynthesize;
pub mod shape;

pub use arguments::Malformed;
pub use shape::Unsupported;

/// Resolves a macro name to its definition, as seen from an invocation.
pub trait DefinitionLookup {
    fn lookup_macro(&self, name: &Ident) -> Option<Rc<MacroDefinition>>;
}

impl DefinitionLookup for Map<Ident, Rc<MacroDefinition>> {
    fn lookup_macro(&self, name: &Ident) -> Option<Rc<MacroDefinition>> {
        self.get(name).cloned()
    }
}

quick_error! {
    #[derive(Debug)]
    pub enum ExpandError {
        Unresolved(name: Ident) {
            display("no definition for `{}!` in scope", name)
        }
        MalformedDefinition(err: syn::Error) {
            cause(err)
            display("definition doesn't parse: {}", err)
        }
        DefinitionRejected(name: Ident, reason: Unsupported) {
            cause(reason)
            display("can't expand `{}!`: {}", name, reason)
        }
        ArgumentParseFailed(reason: Malformed) {
            cause(reason)
            display("bad arguments: {}", reason)
        }
        TemplateExtractFailed {
            display("couldn't extract the template text")
        }
        InstantiationEmpty {
            display("no items in the arguments")
        }
        ResynthesisFailed(err: syn::Error) {
            cause(err)
            display("expansion doesn't parse: {}", err)
        }
        NoResolvableElements {
            display("expansion contains no resolvable items")
        }
        ContextBindFailed {
            display("items can't be declared where the macro was invoked")
        }
        BuiltinFailed(reason: Malformed) {
            cause(reason)
            display("bad builtin invocation: {}", reason)
        }
    }
}

/// Broad classes of `ExpandError`. All of them mean the same thing to a caller: the invocation
/// stays unexpanded.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FailureCategory {
    /// The name doesn't resolve to a definition.
    Unresolved,
    /// The definition is a shape we don't handle.
    UnsupportedShape,
    /// Something didn't parse, or there were no arguments at all.
    MalformedInput,
    /// Nothing came out.
    EmptyResult,
    /// Items can't live where the macro was invoked.
    ContextUnavailable,
}

impl ExpandError {
    pub fn category(&self) -> FailureCategory {
        match self {
            ExpandError::Unresolved(_) => FailureCategory::Unresolved,
            ExpandError::DefinitionRejected(..) | ExpandError::TemplateExtractFailed => {
                FailureCategory::UnsupportedShape
            }
            ExpandError::MalformedDefinition(_)
            | ExpandError::ArgumentParseFailed(_)
            | ExpandError::ResynthesisFailed(_)
            | ExpandError::BuiltinFailed(_) => FailureCategory::MalformedInput,
            ExpandError::InstantiationEmpty | ExpandError::NoResolvableElements => {
                FailureCategory::EmptyResult
            }
            ExpandError::ContextBindFailed => FailureCategory::ContextUnavailable,
        }
    }
}

/// Where an expansion came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExpansionOrigin {
    Builtin,
    Definition,
}

/// A successful expansion. `results` is never empty.
#[derive(Debug)]
pub struct Expansion {
    pub origin: ExpansionOrigin,
    pub results: Vec<ExpansionResult>,
}

/// Expand an invocation, looking up its definition in `definitions` unless it names a builtin.
pub fn expand_macro<L: DefinitionLookup + ?Sized>(
    invocation: &MacroInvocation,
    definitions: &L,
) -> Result<Expansion, ExpandError> {
    if let Some(results) = builtin::dispatch(invocation) {
        return Ok(Expansion {
            origin: ExpansionOrigin::Builtin,
            results: results?,
        });
    }

    let definition = definitions
        .lookup_macro(&invocation.name)
        .ok_or_else(|| ExpandError::Unresolved(invocation.name.clone()))?;
    trace!("expanding {:?} with {:?}", invocation, definition);

    Ok(Expansion {
        origin: ExpansionOrigin::Definition,
        results: expand_with(&definition, invocation)?,
    })
}

/// Expand an invocation with a known definition.
pub fn expand_with(
    definition: &MacroDefinition,
    invocation: &MacroInvocation,
) -> Result<Vec<ExpansionResult>, ExpandError> {
    let def = syn::parse_str::<ast::MacroDef>(&definition.source)
        .map_err(ExpandError::MalformedDefinition)?;
    let shape = shape::validate(&def)
        .map_err(|reason| ExpandError::DefinitionRejected(definition.name.clone(), reason))?;

    let arguments =
        arguments::argument_text(invocation).map_err(ExpandError::ArgumentParseFailed)?;
    let fragments =
        arguments::parse_arguments(arguments).map_err(ExpandError::ArgumentParseFailed)?;

    let template = instantiate::extract_template(&definition.source, &shape)
        .ok_or(ExpandError::TemplateExtractFailed)?;
    if fragments.is_empty() {
        return Err(ExpandError::InstantiationEmpty);
    }
    let text = instantiate::instantiate(template, &shape.binding, &fragments);

    let elements = resynthesize::resynthesize(text, &Arc::new(invocation.span.clone()))?;
    bind::bind_all(elements, &invocation.context)
}

/// Expand an invocation, or give up quietly.
pub fn expand_or_none<L: DefinitionLookup + ?Sized>(
    invocation: &MacroInvocation,
    definitions: &L,
) -> Option<Vec<ExpansionResult>> {
    match expand_macro(invocation, definitions) {
        Ok(expansion) => Some(expansion.results),
        Err(err) => {
            debug!(
                "[{:?}]: not expanding {}!: {} ({:?})",
                invocation.span,
                invocation.name,
                err,
                err.category()
            );
            None
        }
    }
}
