//! This crate expands simple `macro_rules!` invocations into items, so that name resolution and
//! other downstream passes can treat macro-generated code as if it had been written in place.
//!
//! ## Algorithm
//! Expansion is textual rather than token-based. A supported macro has one case, whose matcher is
//! a single repetition over `item` fragments and whose transcriber is a single repetition group.
//! We carve the invocation's argument text out of the source verbatim, parse it as a file to find
//! its items, paste each item's text over the metavariable in the template text, and parse the
//! concatenation as another file. The items of that second file are the expansion. Each is then
//! rebound to the scope the invocation was written in, so a resolver sees them as siblings of the
//! invocation rather than members of the throwaway file.
//!
//! Anything outside that shape, or any parse failure along the way, means the invocation is left
//! unexpanded. That's never reported to the user; `expand_or_none` just returns `None`.
//!
//! `lazy_static!` is special-cased and expanded without looking up any definition.
//!
//! The `walker` module is a small host for all this: it parses a source file, collects macro
//! definitions and invocations in textual order, expands them, and resolves plain names.
#[macro_use]
extern crate quick_error;

pub mod expand;
pub mod namespace;
pub(crate) mod scratch;
pub(crate) mod text;
pub mod walker;

pub use expand::{
    expand_macro, expand_or_none, expand_with, DefinitionLookup, ExpandError, Expansion,
    ExpansionOrigin, FailureCategory,
};
pub use graft_api::{Map, Set};
