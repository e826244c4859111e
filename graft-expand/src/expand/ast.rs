//! Just enough of a `macro_rules!` parser to judge a definition's shape.
//!
//! A definition is a list of cases, each a pattern and a template. Both sides keep `$( ... )`
//! repetitions and delimited groups as structure; everything else is a loose token. Patterns
//! additionally pick out `$name:spec` fragments, templates `$name` placeholders.
//!
//! Repetitions remember the span of their parentheses, so the text inside them can be cut back
//! out of the definition's source.

use graft_api::idents::Ident;
use proc_macro2 as pm2;
use std::fmt;
use syn::{
    ext::IdentExt,
    parenthesized,
    parse::{Parse, ParseStream},
    spanned::Spanned,
    token, Token,
};

/// A parsed `macro_rules!` definition.
#[derive(Debug)]
pub struct MacroDef {
    pub name: Ident,
    pub cases: Vec<Case>,
}

/// `(pattern) => (template)`
#[derive(Debug)]
pub struct Case {
    pub pattern: Pattern,
    pub template: Template,
}

pub type Pattern = Seq<Fragment>;
pub type Template = Seq<Ident>;

/// The contents of one delimited level; `M` is what follows a lone `$`.
#[derive(Debug)]
pub struct Seq<M>(pub Vec<Piece<M>>);

#[derive(Debug)]
pub enum Piece<M> {
    Repetition(Repetition<M>),
    /// `(...)`, `[...]` or `{...}`
    Group(Seq<M>),
    Meta(M),
    Token(pm2::TokenTree),
}

/// `$( ... ) sep? op`. The separator and operator are skipped.
#[derive(Debug)]
pub struct Repetition<M> {
    pub paren: token::Paren,
    pub inner: Seq<M>,
}

/// `$name:spec`
#[derive(Debug)]
pub struct Fragment {
    pub name: Ident,
    pub spec: FragSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragSpec {
    Block,
    Expr,
    Ident,
    Item,
    Lifetime,
    Literal,
    Meta,
    Pattern,
    PatternParam,
    Path,
    Statement,
    TokenTree,
    Type,
    Visibility,
}

const FRAG_SPECS: &[(&str, FragSpec)] = &[
    ("block", FragSpec::Block),
    ("expr", FragSpec::Expr),
    ("ident", FragSpec::Ident),
    ("item", FragSpec::Item),
    ("lifetime", FragSpec::Lifetime),
    ("literal", FragSpec::Literal),
    ("meta", FragSpec::Meta),
    ("pat", FragSpec::Pattern),
    ("pat_param", FragSpec::PatternParam),
    ("path", FragSpec::Path),
    ("stmt", FragSpec::Statement),
    ("tt", FragSpec::TokenTree),
    ("ty", FragSpec::Type),
    ("vis", FragSpec::Visibility),
];

impl fmt::Display for FragSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = FRAG_SPECS
            .iter()
            .find(|(_, spec)| spec == self)
            .map(|(name, _)| *name)
            .unwrap_or("?");
        f.write_str(name)
    }
}

impl Parse for MacroDef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let item = input.parse::<syn::ItemMacro>()?;
        if !item.mac.path.is_ident("macro_rules") {
            return Err(syn::Error::new(item.mac.span(), "not a macro_rules! definition"));
        }
        let name = match &item.ident {
            Some(ident) => Ident::from(ident),
            None => return Err(syn::Error::new(item.mac.span(), "macro_rules! without a name")),
        };
        let cases = item.mac.parse_body_with(|input: ParseStream| {
            let mut cases = vec![];
            while !input.is_empty() {
                cases.push(input.parse::<Case>()?);
            }
            Ok(cases)
        })?;
        Ok(MacroDef { name, cases })
    }
}

impl Parse for Case {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let pattern = syn::parse2::<Pattern>(input.parse::<pm2::Group>()?.stream())?;
        input.parse::<Token![=>]>()?;
        let template = syn::parse2::<Template>(input.parse::<pm2::Group>()?.stream())?;
        if input.peek(Token![;]) {
            input.parse::<Token![;]>()?;
        }
        Ok(Case { pattern, template })
    }
}

impl Parse for Fragment {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name = Ident::from(&input.call(pm2::Ident::parse_any)?);
        input.parse::<Token![:]>()?;
        let spec = input.parse::<FragSpec>()?;
        Ok(Fragment { name, spec })
    }
}

impl Parse for FragSpec {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let ident = input.parse::<pm2::Ident>()?;
        FRAG_SPECS
            .iter()
            .find(|(name, _)| ident == name)
            .map(|(_, spec)| *spec)
            .ok_or_else(|| {
                syn::Error::new(ident.span(), format!("unknown fragment specifier `{}`", ident))
            })
    }
}

/// Whatever follows a lone `$`: a fragment in patterns, a name in templates. Names may be
/// keywords, as in `$crate`.
pub trait Metavariable: Sized {
    fn parse_after_dollar(input: ParseStream) -> syn::Result<Self>;
}

impl Metavariable for Fragment {
    fn parse_after_dollar(input: ParseStream) -> syn::Result<Self> {
        input.parse()
    }
}

impl Metavariable for Ident {
    fn parse_after_dollar(input: ParseStream) -> syn::Result<Self> {
        Ok(Ident::from(&input.call(pm2::Ident::parse_any)?))
    }
}

impl<M: Metavariable> Parse for Seq<M> {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut pieces = vec![];
        while !input.is_empty() {
            let piece = if input.peek(Token![$]) && input.peek2(token::Paren) {
                Piece::Repetition(input.parse::<Repetition<M>>()?)
            } else if input.peek(Token![$]) {
                input.parse::<Token![$]>()?;
                Piece::Meta(M::parse_after_dollar(input)?)
            } else {
                match input.parse::<pm2::TokenTree>()? {
                    pm2::TokenTree::Group(group) => Piece::Group(syn::parse2(group.stream())?),
                    other => Piece::Token(other),
                }
            };
            pieces.push(piece);
        }
        Ok(Seq(pieces))
    }
}

impl<M: Metavariable> Parse for Repetition<M> {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        input.parse::<Token![$]>()?;
        let inner;
        let paren = parenthesized!(inner in input);
        let inner = inner.parse::<Seq<M>>()?;

        // separator, then one of `*`, `+`, `?`
        loop {
            if input.is_empty() {
                return Err(input.error("repetition without `*`, `+` or `?`"));
            }
            match input.parse::<pm2::TokenTree>()? {
                pm2::TokenTree::Punct(punct) if "*+?".contains(punct.as_char()) => break,
                pm2::TokenTree::Group(group) => {
                    return Err(syn::Error::new(group.span(), "group as a repetition separator"))
                }
                _ => (),
            }
        }
        Ok(Repetition { paren, inner })
    }
}
