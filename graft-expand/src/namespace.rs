//! The names declared in a scope.

use crate::walker::WalkError;
use graft_api::expansions::ElementKind;
use graft_api::idents::Ident;
use graft_api::scopes::Namespace;
use graft_api::spans::Span;
use graft_api::Map;
use hashbrown::hash_map::Entry;

/// What a name is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub kind: ElementKind,
    pub origin: Origin,
}

/// Where a binding came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Written in the source.
    Declared { span: Span },
    /// Produced by expanding the macro invoked at `invocation`.
    Expanded { invocation: Span },
}

/// One scope's bindings, one map per namespace.
/// The first binding for a name wins; later ones are reported and dropped.
#[derive(Debug, Default)]
pub struct ScopeBindings {
    namespaces: [Map<Ident, Binding>; 3],
}

impl ScopeBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a name, unless it's already bound in that namespace.
    pub fn insert(
        &mut self,
        namespace: Namespace,
        name: Ident,
        binding: Binding,
    ) -> Result<(), WalkError> {
        match self.namespaces[namespace as usize].entry(name) {
            Entry::Occupied(entry) => Err(WalkError::AlreadyDefined(namespace, entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(binding);
                Ok(())
            }
        }
    }

    pub fn get(&self, namespace: Namespace, name: &str) -> Option<&Binding> {
        self.namespaces[namespace as usize].get(name)
    }

    /// Every binding in a namespace, in no particular order.
    pub fn iter(&self, namespace: Namespace) -> impl Iterator<Item = (&Ident, &Binding)> {
        self.namespaces[namespace as usize].iter()
    }
}
