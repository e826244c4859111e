//! Carving source text out by span, without re-lexing.
//!
//! Relies on proc-macro2's `span-locations`: every span produced by parsing a string knows its
//! byte range within that string. A span must only ever be paired with the text it was parsed
//! from; proc-macro2 can't check that for us.

use graft_api::spans::Span;
use proc_macro2 as pm2;
use quote::ToTokens;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;

/// What `syn::parse_file` actually lexes: the text after a leading byte-order mark and a `#!`
/// shebang line. Spans from a parsed file are relative to this, not to the text passed in.
/// The shebang's newline is kept so line numbers still match.
pub(crate) fn strip_preamble(source: &str) -> &str {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    match source.strip_prefix("#!") {
        // `#![inner_attribute]` is not a shebang
        Some(rest) if !skip_trivia(rest).starts_with('[') => match source.find('\n') {
            Some(newline) => &source[newline..],
            None => "",
        },
        _ => source,
    }
}

/// Skips whitespace and non-doc comments.
fn skip_trivia(mut rest: &str) -> &str {
    loop {
        let trimmed = rest.trim_start();
        let is_doc = trimmed.starts_with("///") && !trimmed.starts_with("////")
            || trimmed.starts_with("//!")
            || trimmed.starts_with("/**") && !trimmed.starts_with("/***")
            || trimmed.starts_with("/*!");
        if is_doc {
            return trimmed;
        }
        rest = if trimmed.starts_with("//") {
            trimmed.find('\n').map_or("", |newline| &trimmed[newline..])
        } else if let Some(comment) = trimmed.strip_prefix("/*") {
            match comment.find("*/") {
                Some(end) => &comment[end + 2..],
                None => return trimmed,
            }
        } else {
            return trimmed;
        };
    }
}

/// The text strictly between the delimiters of a delimited group, given the span of the whole
/// group (delimiters included). `None` if the delimiters are adjacent.
pub(crate) fn between_delimiters(source: &str, group: pm2::Span) -> Option<&str> {
    let Range { start, end } = group.byte_range();
    // delimiters are always a single byte
    if end < start + 2 {
        return None;
    }
    let inner = source.get(start + 1..end - 1)?;
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

/// Byte range from the start of the first token to the end of the last.
pub(crate) fn covered_range(tokens: &dyn ToTokens) -> Option<Range<usize>> {
    tokens
        .to_token_stream()
        .into_iter()
        .map(|tt| tt.span().byte_range())
        .fold(None, |acc: Option<Range<usize>>, next| match acc {
            None => Some(next),
            Some(acc) => Some(acc.start.min(next.start)..acc.end.max(next.end)),
        })
}

/// The verbatim text covered by some tokens, comments and whitespace between them included.
pub(crate) fn covered<'s>(source: &'s str, tokens: &dyn ToTokens) -> Option<&'s str> {
    source.get(covered_range(tokens)?)
}

/// A `Span` running from the first of some tokens to the last.
pub(crate) fn span_of(
    macro_invocation: Option<Arc<Span>>,
    source_file: PathBuf,
    tokens: &dyn ToTokens,
) -> Span {
    let mut iter = tokens.to_token_stream().into_iter().map(|tt| tt.span());
    let first = iter.next().unwrap_or_else(pm2::Span::call_site);
    let last = iter.last().unwrap_or(first);

    let mut span = Span::new(macro_invocation, source_file, first);
    span.end_line = last.end().line as u32;
    span.end_column = last.end().column as u32;
    span
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn between() -> syn::Result<()> {
        spoor::init();

        let source = "if_std! { fn a() {} /* kept */ }";
        let mac = syn::parse_str::<syn::Macro>(source)?;
        let span = match &mac.delimiter {
            syn::MacroDelimiter::Brace(brace) => brace.span,
            other => panic!("unexpected: {:?}", other),
        };
        assert_eq!(
            between_delimiters(source, span),
            Some(" fn a() {} /* kept */ ")
        );
        Ok(())
    }

    #[test]
    fn adjacent_delimiters() -> syn::Result<()> {
        spoor::init();

        let source = "if_std!()";
        let mac = syn::parse_str::<syn::Macro>(source)?;
        let span = match &mac.delimiter {
            syn::MacroDelimiter::Paren(paren) => paren.span,
            other => panic!("unexpected: {:?}", other),
        };
        assert_eq!(between_delimiters(source, span), None);
        assert_eq!(between_delimiters(source, pm2::Span::call_site()), None);
        Ok(())
    }

    #[test]
    fn preamble() -> syn::Result<()> {
        spoor::init();

        assert_eq!(strip_preamble("\u{feff}struct A;"), "struct A;");
        assert_eq!(
            strip_preamble("#!/usr/bin/env run-cargo-script\nstruct A;"),
            "\nstruct A;"
        );
        assert_eq!(strip_preamble("#!/bin/sh"), "");
        assert_eq!(
            strip_preamble("#![allow(dead_code)]\nstruct A;"),
            "#![allow(dead_code)]\nstruct A;"
        );
        assert_eq!(
            strip_preamble("#! /* odd */ [allow(dead_code)]"),
            "#! /* odd */ [allow(dead_code)]"
        );

        let source = "\u{feff}#!/bin/run\n/// docs\nstruct Bar;";
        let file = syn::parse_file(source)?;
        assert_eq!(
            covered(strip_preamble(source), &file.items[0]),
            Some("/// docs\nstruct Bar;")
        );
        Ok(())
    }

    #[test]
    fn verbatim_item_text() -> syn::Result<()> {
        spoor::init();

        let source = "\n\n  /// docs\n  fn foo()   -> Foo { // odd spacing\n Foo }\n\nstruct Bar;";
        let file = syn::parse_file(source)?;
        assert_eq!(
            covered(source, &file.items[0]),
            Some("/// docs\n  fn foo()   -> Foo { // odd spacing\n Foo }")
        );
        assert_eq!(covered(source, &file.items[1]), Some("struct Bar;"));

        let span = span_of(None, "scratch.rs".into(), &file.items[0]);
        assert_eq!((span.start_line, span.end_line), (3, 5));
        Ok(())
    }
}
