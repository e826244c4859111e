//! Scratch parse units: throwaway files parsed from generated text.

use crate::text;
use graft_api::expansions::{ElementKind, ScratchElement};
use graft_api::idents::Ident;
use graft_api::spans::Span;
use std::ops::Range;
use std::sync::Arc;
use tracing::trace;

/// Argument text of an invocation is parsed under this name.
pub(crate) const ARGUMENTS_FILE: &str = "macro_scratch_space.rs";
/// Concatenated template instances are parsed under this name.
pub(crate) const EXPANSION_FILE: &str = "MACRO.rs";
/// Rewritten `lazy_static!` declarations are parsed under this name.
pub(crate) const LAZY_STATIC_FILE: &str = "lazy_static.rs";

/// A standalone unit of source, parsed with the same grammar as a whole file.
/// Owns its text, since every span in `file` points into it.
pub(crate) struct ScratchUnit {
    file_name: &'static str,
    text: String,
    /// Bytes of byte-order mark and shebang ahead of what spans are relative to.
    preamble: usize,
    file: syn::File,
}

impl ScratchUnit {
    pub(crate) fn parse(file_name: &'static str, text: String) -> syn::Result<ScratchUnit> {
        trace!("parsing scratch unit `{}` ({} bytes)", file_name, text.len());
        let file = syn::parse_file(&text)?;
        let preamble = text.len() - text::strip_preamble(&text).len();
        Ok(ScratchUnit {
            file_name,
            text,
            preamble,
            file,
        })
    }

    /// Top-level items, in source order.
    pub(crate) fn items(&self) -> &[syn::Item] {
        &self.file.items
    }

    /// Where one of this unit's items sits in the text it was parsed from.
    pub(crate) fn range_of(&self, item: &syn::Item) -> Option<Range<usize>> {
        let range = text::covered_range(item)?;
        Some(range.start + self.preamble..range.end + self.preamble)
    }

    /// The verbatim text of one of this unit's items.
    pub(crate) fn text_of(&self, item: &syn::Item) -> Option<&str> {
        self.text.get(self.range_of(item)?)
    }

    /// Every top-level item that can take part in name resolution, in source order.
    /// Anything else is dropped without comment.
    pub(crate) fn elements(&self, macro_invocation: Option<&Arc<Span>>) -> Vec<ScratchElement> {
        self.items()
            .iter()
            .filter_map(|item| {
                let (kind, name, attrs) = describe(item)?;
                let text = self.text_of(item)?.to_string();
                Some(ScratchElement {
                    kind,
                    name,
                    attributes: attrs.iter().map(attribute_path).collect(),
                    text,
                    span: text::span_of(
                        macro_invocation.cloned(),
                        self.file_name.into(),
                        item,
                    ),
                })
            })
            .collect()
    }
}

/// Classify an item: its kind, the name it declares (if any), and its outer attributes.
/// Items syn couldn't make sense of come back as `None`.
pub(crate) fn describe(item: &syn::Item) -> Option<(ElementKind, Option<Ident>, &[syn::Attribute])> {
    // `const _` and `extern crate foo as _` bind nothing
    let named = |ident: &proc_macro2::Ident| {
        if ident == "_" {
            None
        } else {
            Some(Ident::from(ident))
        }
    };
    Some(match item {
        syn::Item::Const(i) => (ElementKind::Const, named(&i.ident), &i.attrs[..]),
        syn::Item::Enum(i) => (ElementKind::Enum, named(&i.ident), &i.attrs[..]),
        syn::Item::ExternCrate(i) => {
            let ident = i.rename.as_ref().map(|(_, rename)| rename).unwrap_or(&i.ident);
            (ElementKind::ExternCrate, named(ident), &i.attrs[..])
        }
        syn::Item::Fn(i) => (ElementKind::Function, named(&i.sig.ident), &i.attrs[..]),
        syn::Item::ForeignMod(i) => (ElementKind::ForeignBlock, None, &i.attrs[..]),
        syn::Item::Impl(i) => (ElementKind::Impl, None, &i.attrs[..]),
        syn::Item::Macro(i) => match &i.ident {
            Some(ident) if i.mac.path.is_ident("macro_rules") => {
                (ElementKind::MacroRules, named(ident), &i.attrs[..])
            }
            _ => (ElementKind::MacroCall, None, &i.attrs[..]),
        },
        syn::Item::Macro2(i) => (ElementKind::MacroRules, named(&i.ident), &i.attrs[..]),
        syn::Item::Mod(i) => (ElementKind::Module, named(&i.ident), &i.attrs[..]),
        syn::Item::Static(i) => (ElementKind::Static, named(&i.ident), &i.attrs[..]),
        syn::Item::Struct(i) => (ElementKind::Struct, named(&i.ident), &i.attrs[..]),
        syn::Item::Trait(i) => (ElementKind::Trait, named(&i.ident), &i.attrs[..]),
        syn::Item::TraitAlias(i) => (ElementKind::TraitAlias, named(&i.ident), &i.attrs[..]),
        syn::Item::Type(i) => (ElementKind::TypeAlias, named(&i.ident), &i.attrs[..]),
        syn::Item::Union(i) => (ElementKind::Union, named(&i.ident), &i.attrs[..]),
        syn::Item::Use(i) => (ElementKind::Use, None, &i.attrs[..]),
        _ => return None,
    })
}

/// `cfg`, `doc`, `serde::rename`...
fn attribute_path(attr: &syn::Attribute) -> String {
    attr.path
        .segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}
