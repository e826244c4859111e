//! Walk a source file with syn, recording the scopes, declarations, macro definitions and macro
//! invocations the expander needs, then expand and resolve.
//!
//! This only ever sees one file: out-of-line `mod foo;` declarations are recorded as names, but
//! never read. Expansion results aren't walked again, so macros that expand to invocations of
//! other macros stay unexpanded.
//!
//! Scopes:
//! - the crate root and every inline `mod { }` are `Module` scopes, with no view of their parent's
//!   names;
//! - every function body is a `Block` scope, which sees its own items and then those of the
//!   enclosing scopes, out to the nearest module.
//!
//! Blocks nested inside statements aren't scopes of their own; we don't look inside expressions.

use crate::expand::expand_or_none;
use crate::namespace::{Binding, Origin, ScopeBindings};
use crate::scratch::describe;
use crate::text;
use graft_api::expansions::{ElementKind, ExpansionResult};
use graft_api::idents::Ident;
use graft_api::macros::{MacroDefinition, MacroInvocation};
use graft_api::scopes::{InvocationContext, Namespace, ScopeId};
use graft_api::spans::Span;
use graft_api::Map;
use lazy_static::lazy_static;
use quote::ToTokens;
use std::path::PathBuf;
use tracing::{trace, warn};

use textual_scope::TextualScope;

mod textual_scope;

lazy_static! {
    static ref MACRO_RULES: Ident = "macro_rules".into();
}

quick_error! {
    #[derive(Debug)]
    pub enum WalkError {
        Parse(err: syn::Error) {
            from()
            cause(err)
            display("parse error during walking: {}", err)
        }
        AlreadyDefined(namespace: Namespace, name: Ident) {
            display("`{}` already defined in {:?} namespace", name, namespace)
        }
        NoSourceText(what: &'static str) {
            display("couldn't find the source text of a {}", what)
        }
    }
}

/// Whether a scope is a module or a function body.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScopeKind {
    Module,
    Block,
}

struct ScopeData {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    bindings: ScopeBindings,
}

/// An invocation, along with the macros textually in scope where it was written.
struct RecordedInvocation {
    invocation: MacroInvocation,
    textual_scope: TextualScope,
}

/// A walked source file.
pub struct SourceTree {
    source_file: PathBuf,
    scopes: Vec<ScopeData>,
    /// Body scopes of free functions, by name. The first function with a name wins.
    functions: Map<Ident, ScopeId>,
    invocations: Vec<RecordedInvocation>,
    expansions: Vec<ExpansionResult>,
    expanded: bool,
}

impl SourceTree {
    /// Parse and walk a file.
    pub fn parse(source_file: impl Into<PathBuf>, source: &str) -> Result<SourceTree, WalkError> {
        let source_file = source_file.into();
        trace!("parsing `{}`", source_file.display());
        let file = syn::parse_file(source)?;

        let mut tree = SourceTree {
            source_file,
            scopes: vec![],
            functions: Map::default(),
            invocations: vec![],
            expansions: vec![],
            expanded: false,
        };
        let root = tree.add_scope(ScopeKind::Module, None);
        let mut ctx = WalkCtx {
            tree: &mut tree,
            source: text::strip_preamble(source),
        };
        ctx.walk_items(root, TextualScope::empty(), &file.items);
        trace!("done walking `{}`", ctx.tree.source_file.display());

        Ok(tree)
    }

    /// The crate root.
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scope_kind(&self, scope: ScopeId) -> Option<ScopeKind> {
        self.scope(scope).map(|data| data.kind)
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scope(scope).and_then(|data| data.parent)
    }

    /// The body scope of the first free function named `name`, at any depth.
    pub fn function_scope(&self, name: &str) -> Option<ScopeId> {
        self.functions.get(name).cloned()
    }

    /// Every invocation in item or statement position or in a `let` initializer, in source
    /// order.
    pub fn invocations(&self) -> impl Iterator<Item = &MacroInvocation> {
        self.invocations.iter().map(|recorded| &recorded.invocation)
    }

    /// Expand every recorded invocation once, in source order, and bind the results' names in
    /// the scopes they were invoked in. Invocations that can't be expanded are skipped.
    pub fn expand_all(&mut self) -> &[ExpansionResult] {
        if !self.expanded {
            let SourceTree {
                invocations,
                scopes,
                expansions,
                ..
            } = self;
            for recorded in invocations.iter() {
                let results = match expand_or_none(&recorded.invocation, &recorded.textual_scope) {
                    Some(results) => results,
                    None => continue,
                };
                trace!(
                    "expanded {:?} into {} items",
                    recorded.invocation,
                    results.len()
                );
                for result in results {
                    if let (Some(namespace), Some(name)) = (result.kind().namespace(), result.name())
                    {
                        let binding = Binding {
                            kind: result.kind(),
                            origin: Origin::Expanded {
                                invocation: recorded.invocation.span.clone(),
                            },
                        };
                        if let Some(scope) = scopes.get_mut(result.context().0 as usize) {
                            if let Err(err) = scope.bindings.insert(namespace, name.clone(), binding) {
                                warn!("[{:?}]: {}", result.span(), err);
                            }
                        }
                    }
                    expansions.push(result);
                }
            }
            self.expanded = true;
        }
        &self.expansions
    }

    /// Resolve a plain name as seen from `scope`: look in the scope itself, then outward through
    /// enclosing blocks, stopping after the nearest module.
    pub fn resolve(&self, scope: ScopeId, namespace: Namespace, name: &str) -> Option<&Binding> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let data = self.scope(id)?;
            if let Some(binding) = data.bindings.get(namespace, name) {
                return Some(binding);
            }
            current = match data.kind {
                ScopeKind::Module => None,
                ScopeKind::Block => data.parent,
            };
        }
        None
    }

    fn scope(&self, scope: ScopeId) -> Option<&ScopeData> {
        self.scopes.get(scope.0 as usize)
    }

    fn add_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeData {
            kind,
            parent,
            bindings: ScopeBindings::new(),
        });
        id
    }
}

struct WalkCtx<'a> {
    tree: &'a mut SourceTree,
    source: &'a str,
}

impl<'a> WalkCtx<'a> {
    /// Walk a sequence of items, returning the textual scope at the end of them.
    fn walk_items(
        &mut self,
        scope: ScopeId,
        mut textual_scope: TextualScope,
        items: &[syn::Item],
    ) -> TextualScope {
        for item in items {
            textual_scope = self.walk_item(scope, textual_scope, item);
        }
        textual_scope
    }

    fn walk_item(
        &mut self,
        scope: ScopeId,
        textual_scope: TextualScope,
        item: &syn::Item,
    ) -> TextualScope {
        let result = match item {
            syn::Item::Macro(mac) if mac.mac.path.is_ident(&**MACRO_RULES) => {
                self.walk_macro_rules(scope, textual_scope.clone(), mac)
            }
            syn::Item::Macro(mac) => {
                let here = textual_scope.append_scope(None);
                let context = self.item_context(scope);
                self.record_invocation(&mac.mac, context, here.clone())
                    .map(|()| here)
            }
            syn::Item::Mod(mod_) => {
                self.declare_item(scope, item);
                if let Some((_, items)) = &mod_.content {
                    let here = textual_scope.append_scope(None);
                    let module = self.tree.add_scope(ScopeKind::Module, Some(scope));
                    self.walk_items(module, here.make_dead_submodule(), items);
                    Ok(here)
                } else {
                    trace!("skipping out-of-line module {}", mod_.ident);
                    Ok(textual_scope.clone())
                }
            }
            syn::Item::Fn(fn_) => {
                self.declare_item(scope, item);
                let here = textual_scope.append_scope(None);
                let body = self.walk_fn_body(scope, &here, &fn_.block);
                let name = Ident::from(&fn_.sig.ident);
                if self.tree.functions.contains_key(&name) {
                    trace!("already saw a function named {}", name);
                } else {
                    self.tree.functions.insert(name, body);
                }
                Ok(here)
            }
            syn::Item::Impl(impl_) => {
                let here = textual_scope.append_scope(None);
                for impl_item in &impl_.items {
                    if let syn::ImplItem::Method(method) = impl_item {
                        self.walk_fn_body(scope, &here, &method.block);
                    }
                }
                Ok(here)
            }
            _ => {
                self.declare_item(scope, item);
                Ok(textual_scope.clone())
            }
        };

        match result {
            Ok(textual_scope) => textual_scope,
            Err(err) => {
                warn!("[{:?}]: suppressing error: {}", self.span_of(item), err);
                textual_scope
            }
        }
    }

    fn walk_macro_rules(
        &mut self,
        scope: ScopeId,
        textual_scope: TextualScope,
        mac: &syn::ItemMacro,
    ) -> Result<TextualScope, WalkError> {
        let ident = match &mac.ident {
            Some(ident) => ident,
            None => return Ok(textual_scope),
        };
        let source = text::covered(self.source, mac).ok_or(WalkError::NoSourceText("macro"))?;
        let definition = MacroDefinition {
            name: Ident::from(ident),
            source: source.to_string(),
            span: self.span_of(mac),
        };
        trace!("found macro {}", definition.name);

        self.declare(
            scope,
            Namespace::Macro,
            definition.name.clone(),
            ElementKind::MacroRules,
            definition.span.clone(),
        );
        Ok(textual_scope.append_scope(Some(definition)))
    }

    /// Walk a function body as a new block scope, returning that scope.
    fn walk_fn_body(
        &mut self,
        parent: ScopeId,
        textual_scope: &TextualScope,
        block: &syn::Block,
    ) -> ScopeId {
        let body = self.tree.add_scope(ScopeKind::Block, Some(parent));
        let mut textual_scope = textual_scope.make_dead_submodule();
        for stmt in &block.stmts {
            let result = match stmt {
                syn::Stmt::Item(item) => {
                    textual_scope = self.walk_item(body, textual_scope, item);
                    Ok(())
                }
                syn::Stmt::Local(local) => match &local.init {
                    Some((_, init)) => match &**init {
                        syn::Expr::Macro(mac) => {
                            textual_scope = textual_scope.append_scope(None);
                            self.record_invocation(
                                &mac.mac,
                                InvocationContext::Expression,
                                textual_scope.clone(),
                            )
                        }
                        _ => Ok(()),
                    },
                    None => Ok(()),
                },
                syn::Stmt::Semi(syn::Expr::Macro(mac), _) => {
                    textual_scope = textual_scope.append_scope(None);
                    self.record_invocation(
                        &mac.mac,
                        InvocationContext::Block(body),
                        textual_scope.clone(),
                    )
                }
                syn::Stmt::Expr(syn::Expr::Macro(mac)) => {
                    textual_scope = textual_scope.append_scope(None);
                    self.record_invocation(
                        &mac.mac,
                        InvocationContext::Expression,
                        textual_scope.clone(),
                    )
                }
                syn::Stmt::Semi(..) | syn::Stmt::Expr(_) => Ok(()),
            };
            if let Err(err) = result {
                warn!("[{:?}]: suppressing error: {}", self.span_of(stmt), err);
            }
        }
        body
    }

    fn record_invocation(
        &mut self,
        mac: &syn::Macro,
        context: InvocationContext,
        textual_scope: TextualScope,
    ) -> Result<(), WalkError> {
        let name = match mac.path.segments.last() {
            Some(segment) => Ident::from(&segment.ident),
            None => return Ok(()),
        };
        let source = text::covered(self.source, mac).ok_or(WalkError::NoSourceText("macro invocation"))?;
        let invocation = MacroInvocation {
            name,
            source: source.to_string(),
            span: self.span_of(mac),
            context,
        };
        trace!("found invocation {:?}", invocation);
        self.tree.invocations.push(RecordedInvocation {
            invocation,
            textual_scope,
        });
        Ok(())
    }

    /// The context of an invocation written as an item in `scope`.
    fn item_context(&self, scope: ScopeId) -> InvocationContext {
        match self.tree.scope_kind(scope) {
            Some(ScopeKind::Block) => InvocationContext::Block(scope),
            _ => InvocationContext::Module(scope),
        }
    }

    /// Bind an item's name, if it declares one.
    fn declare_item(&mut self, scope: ScopeId, item: &syn::Item) {
        if let Some((kind, Some(name), _)) = describe(item) {
            if let Some(namespace) = kind.namespace() {
                let span = self.span_of(item);
                self.declare(scope, namespace, name, kind, span);
            }
        }
    }

    fn declare(
        &mut self,
        scope: ScopeId,
        namespace: Namespace,
        name: Ident,
        kind: ElementKind,
        span: Span,
    ) {
        let binding = Binding {
            kind,
            origin: Origin::Declared { span: span.clone() },
        };
        if let Some(data) = self.tree.scopes.get_mut(scope.0 as usize) {
            if let Err(err) = data.bindings.insert(namespace, name, binding) {
                warn!("[{:?}]: {}", span, err);
            }
        }
    }

    fn span_of(&self, tokens: &dyn ToTokens) -> Span {
        text::span_of(None, self.tree.source_file.clone(), tokens)
    }
}
