//! Deciding whether a definition is one we can expand.
//!
//! We only handle the single-case, single-repetition `item` macro:
//!
//! ```no_build
//! macro_rules! if_std {
//!     ($($i:item)*) => ($(
//!         #[cfg(feature = "use_std")]
//!         $i
//!     )*)
//! }
//! ```
//!
//! Everything else is rejected with the first reason we find. Rejection isn't an error anyone
//! sees; the invocation just stays unexpanded.

use super::ast::{FragSpec, Fragment, MacroDef, Pattern, Piece, Repetition, Seq, Template};
use graft_api::idents::Ident;
use proc_macro2 as pm2;

quick_error! {
    #[derive(Debug)]
    pub enum Unsupported {
        CaseCount(count: usize) {
            display("expected exactly one case, found {}", count)
        }
        PatternGroupCount(count: usize) {
            display("expected exactly one repetition in the pattern, found {}", count)
        }
        LooseFragment(name: Ident) {
            display("`${}` isn't inside the repetition", name)
        }
        NestedGroup {
            display("nested repetitions aren't supported")
        }
        GroupedRepetition {
            display("repetitions inside a delimited group aren't supported")
        }
        BindingCount(count: usize) {
            display("expected exactly one binding in the repetition, found {}", count)
        }
        FragmentKind(spec: FragSpec) {
            display("expected an `item` binding, found `{}`", spec)
        }
        TemplateGroupCount(count: usize) {
            display("expected exactly one repetition in the template, found {}", count)
        }
        EmptyTemplate {
            display("the template repetition is empty")
        }
    }
}

/// What we need to know about a supported definition.
#[derive(Debug)]
pub struct SupportedShape {
    /// The name of the single `item` binding.
    pub binding: Ident,
    /// Span of the template repetition's parentheses, in the definition's source.
    pub template: pm2::Span,
}

/// Check a parsed definition against the one shape we support.
pub fn validate(def: &MacroDef) -> Result<SupportedShape, Unsupported> {
    if def.cases.len() != 1 {
        return Err(Unsupported::CaseCount(def.cases.len()));
    }
    let case = &def.cases[0];

    let mut repetitions = vec![];
    let mut loose = vec![];
    pattern_repetitions(&case.pattern, &mut repetitions, &mut loose)?;
    if repetitions.len() != 1 {
        return Err(Unsupported::PatternGroupCount(repetitions.len()));
    }
    if let Some(name) = loose.into_iter().next() {
        return Err(Unsupported::LooseFragment(name.clone()));
    }

    let mut bindings = vec![];
    repetition_bindings(&repetitions[0].inner, &mut bindings)?;
    if bindings.len() != 1 {
        return Err(Unsupported::BindingCount(bindings.len()));
    }
    let binding = bindings[0];
    if binding.spec != FragSpec::Item {
        return Err(Unsupported::FragmentKind(binding.spec));
    }

    let templates = template_repetitions(&case.template)?;
    if templates.len() != 1 {
        return Err(Unsupported::TemplateGroupCount(templates.len()));
    }
    let template = templates[0];
    if template.inner.0.is_empty() {
        return Err(Unsupported::EmptyTemplate);
    }
    if contains_repetition(&template.inner) {
        return Err(Unsupported::NestedGroup);
    }

    Ok(SupportedShape {
        binding: binding.name.clone(),
        template: template.paren.span,
    })
}

/// Top-level repetitions in a pattern, plus any fragments found outside of a repetition.
/// Only the text inside the repetition survives expansion, so a repetition wrapped in a group
/// is rejected.
fn pattern_repetitions<'a>(
    seq: &'a Pattern,
    repetitions: &mut Vec<&'a Repetition<Fragment>>,
    loose: &mut Vec<&'a Ident>,
) -> Result<(), Unsupported> {
    for piece in &seq.0 {
        match piece {
            Piece::Repetition(rep) => repetitions.push(rep),
            Piece::Meta(fragment) => loose.push(&fragment.name),
            Piece::Group(inner) if contains_repetition(inner) => {
                return Err(Unsupported::GroupedRepetition)
            }
            Piece::Group(inner) => pattern_repetitions(inner, repetitions, loose)?,
            Piece::Token(_) => (),
        }
    }
    Ok(())
}

/// Fragments inside a repetition.
fn repetition_bindings<'a>(
    seq: &'a Pattern,
    bindings: &mut Vec<&'a Fragment>,
) -> Result<(), Unsupported> {
    for piece in &seq.0 {
        match piece {
            Piece::Repetition(_) => return Err(Unsupported::NestedGroup),
            Piece::Meta(fragment) => bindings.push(fragment),
            Piece::Group(inner) => repetition_bindings(inner, bindings)?,
            Piece::Token(_) => (),
        }
    }
    Ok(())
}

/// Top-level repetitions in a template. Tokens around them are dropped on expansion, so one
/// wrapped in a group (`mod m { $($i)* }`) would land its items in the wrong scope.
fn template_repetitions(seq: &Template) -> Result<Vec<&Repetition<Ident>>, Unsupported> {
    let mut repetitions = vec![];
    for piece in &seq.0 {
        match piece {
            Piece::Repetition(rep) => repetitions.push(rep),
            Piece::Group(inner) if contains_repetition(inner) => {
                return Err(Unsupported::GroupedRepetition)
            }
            Piece::Group(_) | Piece::Meta(_) | Piece::Token(_) => (),
        }
    }
    Ok(repetitions)
}

fn contains_repetition<M>(seq: &Seq<M>) -> bool {
    seq.0.iter().any(|piece| match piece {
        Piece::Repetition(_) => true,
        Piece::Group(inner) => contains_repetition(inner),
        _ => false,
    })
}
