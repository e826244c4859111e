//! Rebinding expansion elements to the invocation's scope.

use super::ExpandError;
use graft_api::expansions::{ExpansionResult, ScratchElement};
use graft_api::scopes::InvocationContext;

/// Bind every element to `context`, or fail if items can't be declared there.
pub fn bind_all(
    elements: Vec<ScratchElement>,
    context: &InvocationContext,
) -> Result<Vec<ExpansionResult>, ExpandError> {
    elements
        .into_iter()
        .map(|element| ExpansionResult::bind(element, context).ok_or(ExpandError::ContextBindFailed))
        .collect()
}
