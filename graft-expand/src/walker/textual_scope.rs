use crate::expand::DefinitionLookup;
use graft_api::idents::Ident;
use graft_api::macros::MacroDefinition;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// A textual scope: `macro_rules!` definitions are visible from the point they're written to
/// the end of the enclosing module, and in submodules written after them.
///
/// ```no_build
/// a!(); // not visible yet
/// macro_rules! a { () => () }
/// a!(); // fine
/// mod m {
///     a!(); // fine
///     macro_rules! b { () => () }
/// }
/// b!(); // not visible: doesn't leak out of `m`
/// ```
///
/// Each invocation holds the scope at its position, so a scope needs to be able to have
/// definitions inserted *before* it after the fact. That's a doubly-linked list: every scope
/// points back at the previous one, and weakly forward at the next.
#[derive(Clone)]
pub(crate) struct TextualScope(Rc<RefCell<TextualScopeInner>>);

impl TextualScope {
    /// Create an empty scope.
    pub(crate) fn empty() -> TextualScope {
        TextualScope(Rc::new(RefCell::new(TextualScopeInner {
            previous: None,
            definition: None,
            next: None,
        })))
    }

    /// Lookup a name within this scope. Later definitions shadow earlier ones.
    pub(crate) fn lookup(&self, name: &Ident) -> Option<Rc<MacroDefinition>> {
        let mut current = self.clone();
        loop {
            let previous = {
                let inner = current.0.borrow();
                if let Some(definition) = inner.definition.as_ref() {
                    if &definition.name == name {
                        return Some(definition.clone());
                    }
                }
                inner.previous.clone()?
            };
            current = previous;
        }
    }

    /// Append a definition to this scope, returning a new scope containing that definition.
    /// If something already follows this scope, the new scope is spliced in before it.
    pub(crate) fn append_scope(&self, definition: Option<MacroDefinition>) -> TextualScope {
        let next = self.0.borrow().next.as_ref().and_then(Weak::upgrade);
        let child = TextualScope(Rc::new(RefCell::new(TextualScopeInner {
            previous: Some(self.clone()),
            next: next.as_ref().map(Rc::downgrade),
            definition: definition.map(Rc::new),
        })));
        if let Some(next) = next {
            next.borrow_mut().previous = Some(child.clone());
        }
        self.0.borrow_mut().next = Some(Rc::downgrade(&child.0));
        child
    }

    /// Create a submodule that inherits from this scope, without becoming part of it:
    /// definitions appended to the submodule are invisible here, and definitions appended to
    /// this scope afterwards are invisible in the submodule.
    pub(crate) fn make_dead_submodule(&self) -> TextualScope {
        TextualScope(Rc::new(RefCell::new(TextualScopeInner {
            previous: Some(self.clone()),
            next: None,
            definition: None,
        })))
    }
}

impl DefinitionLookup for TextualScope {
    fn lookup_macro(&self, name: &Ident) -> Option<Rc<MacroDefinition>> {
        self.lookup(name)
    }
}

struct TextualScopeInner {
    previous: Option<TextualScope>,
    definition: Option<Rc<MacroDefinition>>,
    next: Option<Weak<RefCell<TextualScopeInner>>>,
}
