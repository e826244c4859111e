//! Pasting argument fragments into the template.
//!
//! Substitution is plain string replacement: no token boundaries, no hygiene. Names the
//! template introduces land in the invocation's scope as-is.

use super::arguments::ArgumentFragment;
use super::shape::SupportedShape;
use crate::text;
use graft_api::idents::Ident;

/// Instances are separated by a blank line.
const SEPARATOR: &str = "\n\n";

/// The text inside the template repetition's parentheses, carved from the definition's source.
pub fn extract_template<'s>(source: &'s str, shape: &SupportedShape) -> Option<&'s str> {
    text::between_delimiters(source, shape.template)
}

/// `$name`
pub fn placeholder(binding: &Ident) -> String {
    format!("${}", binding)
}

/// One copy of the template per fragment, with every occurrence of the placeholder replaced by
/// the fragment's text.
pub fn instantiate(template: &str, binding: &Ident, fragments: &[ArgumentFragment]) -> String {
    let placeholder = placeholder(binding);
    fragments
        .iter()
        .map(|fragment| template.replace(&placeholder, &fragment.text))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
