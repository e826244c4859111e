//! Macros we expand without looking at any definition.
//!
//! Currently just `lazy_static!`, which everyone uses and which is far too hairy to expand from
//! its real definition. We only care about the name and kind of the static it declares, so
//!
//! ```no_build
//! lazy_static! {
//!     pub static ref FOO: Foo = Foo::new();
//! }
//! ```
//!
//! expands to `pub static FOO: Foo = Foo::new();`.

use super::arguments::{self, Malformed};
use super::{bind, ExpandError};
use crate::scratch::{ScratchUnit, LAZY_STATIC_FILE};
use graft_api::expansions::ExpansionResult;
use graft_api::idents::Ident;
use graft_api::macros::MacroInvocation;
use lazy_static::lazy_static;
use std::sync::Arc;
use syn::parse::{Parse, ParseStream};
use syn::Token;
use tracing::trace;

lazy_static! {
    pub static ref LAZY_STATIC: Ident = "lazy_static".into();
}

/// Expand `invocation` if it names a builtin. `None` means it doesn't, and the definition
/// should be looked up as usual.
pub fn dispatch(invocation: &MacroInvocation) -> Option<Result<Vec<ExpansionResult>, ExpandError>> {
    if invocation.name == *LAZY_STATIC {
        trace!("expanding builtin {}!", invocation.name);
        Some(expand_lazy_static(invocation))
    } else {
        None
    }
}

/// `#[attrs] vis static ref NAME: TYPE = EXPR;`
struct LazyStaticDecl {
    ref_token: Token![ref],
}

impl Parse for LazyStaticDecl {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        input.call(syn::Attribute::parse_outer)?;
        input.parse::<syn::Visibility>()?;
        input.parse::<Token![static]>()?;
        let ref_token = input.parse::<Token![ref]>()?;
        input.parse::<syn::Ident>()?;
        input.parse::<Token![:]>()?;
        input.parse::<syn::Type>()?;
        input.parse::<Token![=]>()?;
        input.parse::<syn::Expr>()?;
        input.parse::<Token![;]>()?;
        Ok(LazyStaticDecl { ref_token })
    }
}

fn expand_lazy_static(invocation: &MacroInvocation) -> Result<Vec<ExpansionResult>, ExpandError> {
    let arguments = arguments::argument_text(invocation).map_err(ExpandError::BuiltinFailed)?;
    let decl = syn::parse_str::<LazyStaticDecl>(arguments)
        .map_err(|err| ExpandError::BuiltinFailed(Malformed::LazyStatic(err)))?;

    let ref_range = decl.ref_token.span.byte_range();
    let rewritten = format!(
        "{} {}",
        arguments[..ref_range.start].trim_end(),
        arguments[ref_range.end..].trim_start()
    );
    let unit = ScratchUnit::parse(LAZY_STATIC_FILE, rewritten.trim().to_string())
        .map_err(|err| ExpandError::BuiltinFailed(Malformed::Reparse(err)))?;

    let invocation_span = Arc::new(invocation.span.clone());
    let element = unit
        .elements(Some(&invocation_span))
        .into_iter()
        .next()
        .ok_or(ExpandError::NoResolvableElements)?;
    bind::bind_all(vec![element], &invocation.context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_api::expansions::ElementKind;
    use graft_api::scopes::{InvocationContext, ScopeId};
    use graft_api::spans::Span;

    fn invocation(name: &str, source: &str) -> MacroInvocation {
        MacroInvocation {
            name: name.into(),
            source: source.into(),
            span: Span::fake(),
            context: InvocationContext::Module(ScopeId(0)),
        }
    }

    #[test]
    fn lazy_static() -> Result<(), ExpandError> {
        spoor::init();

        let results = dispatch(&invocation(
            "lazy_static",
            "lazy_static! {\n    /// The foo.\n    pub static ref FOO: Foo = Foo::new();\n}",
        ))
        .expect("lazy_static is a builtin")?;

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.kind(), ElementKind::Static);
        assert_eq!(result.name().map(|n| &**n), Some("FOO"));
        assert!(result.has_attribute("doc"));
        assert_eq!(
            result.text(),
            "/// The foo.\n    pub static FOO: Foo = Foo::new();"
        );
        assert_eq!(result.context(), ScopeId(0));
        assert_eq!(
            result.span().source_file.to_str(),
            Some(LAZY_STATIC_FILE)
        );
        Ok(())
    }

    #[test]
    fn not_builtin() {
        spoor::init();

        assert!(dispatch(&invocation("if_std", "if_std! { struct A; }")).is_none());
    }

    #[test]
    fn malformed() {
        spoor::init();

        let cases = &[
            "lazy_static! {}",
            "lazy_static! { static FOO: u8 = 1; }",
            "lazy_static! { static ref A: u8 = 1; static ref B: u8 = 2; }",
            "lazy_static! { struct A; }",
        ];
        for source in cases {
            match dispatch(&invocation("lazy_static", source)) {
                Some(Err(ExpandError::BuiltinFailed(_))) => (),
                other => panic!("unexpected for {}: {:?}", source, other),
            }
        }
    }

    #[test]
    fn expression_context() {
        spoor::init();

        let mut inv = invocation("lazy_static", "lazy_static! { static ref A: u8 = 1; }");
        inv.context = InvocationContext::Expression;
        match dispatch(&inv) {
            Some(Err(ExpandError::ContextBindFailed)) => (),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
