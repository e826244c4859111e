//! Simple data structures describing macro invocations, macro definitions, and the results of
//! expanding them. Produced and consumed by other `graft` crates.
//!
//! ### Why not just use syn?
//! syn's types aren't Send or Serialize, and an expansion result has to outlive the scratch
//! files it was parsed from. So everything here is plain data: identifiers, spans, and verbatim
//! source text that can be handed back to syn whenever a tree is needed.

/// Fast single-thread-writeable maps.
pub type Map<K, V> = hashbrown::HashMap<K, V, fxhash::FxBuildHasher>;
/// Fast single-thread-writeable sets.
pub type Set<K> = hashbrown::HashSet<K, fxhash::FxBuildHasher>;

pub mod expansions;
pub mod idents;
pub mod macros;
pub mod scopes;
pub mod spans;
