//! Carving an invocation's arguments out and reparsing them as items.

use crate::scratch::{ScratchUnit, ARGUMENTS_FILE};
use crate::text;
use graft_api::macros::MacroInvocation;
use std::ops::Range;

quick_error! {
    #[derive(Debug)]
    pub enum Malformed {
        Invocation(err: syn::Error) {
            cause(err)
            display("invocation doesn't parse: {}", err)
        }
        NoArguments {
            display("nothing between the argument delimiters")
        }
        Reparse(err: syn::Error) {
            cause(err)
            display("arguments don't parse as items: {}", err)
        }
        LazyStatic(err: syn::Error) {
            cause(err)
            display("not a single `static ref` declaration: {}", err)
        }
    }
}

/// One top-level item of an invocation's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentFragment {
    /// Verbatim text, doc comments and inner whitespace included.
    pub text: String,
    /// Where `text` sits in the argument text.
    pub range: Range<usize>,
}

/// The verbatim text strictly between an invocation's argument delimiters.
pub fn argument_text(invocation: &MacroInvocation) -> Result<&str, Malformed> {
    let mac = syn::parse_str::<syn::Macro>(&invocation.source).map_err(Malformed::Invocation)?;
    let group = match &mac.delimiter {
        syn::MacroDelimiter::Paren(paren) => paren.span,
        syn::MacroDelimiter::Brace(brace) => brace.span,
        syn::MacroDelimiter::Bracket(bracket) => bracket.span,
    };
    text::between_delimiters(&invocation.source, group).ok_or(Malformed::NoArguments)
}

/// Parse argument text as a file and return its items, in source order.
pub fn parse_arguments(arguments: &str) -> Result<Vec<ArgumentFragment>, Malformed> {
    let unit = ScratchUnit::parse(ARGUMENTS_FILE, arguments.to_string())
        .map_err(Malformed::Reparse)?;
    Ok(unit
        .items()
        .iter()
        .filter_map(|item| {
            let range = unit.range_of(item)?;
            let text = unit.text_of(item)?.to_string();
            Some(ArgumentFragment { text, range })
        })
        .collect())
}
