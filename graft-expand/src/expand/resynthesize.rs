//! Parsing instantiated text back into elements.

use super::ExpandError;
use crate::scratch::{ScratchUnit, EXPANSION_FILE};
use graft_api::expansions::ScratchElement;
use graft_api::spans::Span;
use std::sync::Arc;

/// Parse the concatenated instances as a file. Every item that can take part in resolution
/// becomes an element whose span points back at `invocation`; the rest are dropped.
pub fn resynthesize(
    text: String,
    invocation: &Arc<Span>,
) -> Result<Vec<ScratchElement>, ExpandError> {
    let unit = ScratchUnit::parse(EXPANSION_FILE, text).map_err(ExpandError::ResynthesisFailed)?;
    let elements = unit.elements(Some(invocation));
    if elements.is_empty() {
        Err(ExpandError::NoResolvableElements)
    } else {
        Ok(elements)
    }
}
