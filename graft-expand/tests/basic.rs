use graft_api::expansions::ElementKind;
use graft_api::idents::Ident;
use graft_api::macros::{MacroDefinition, MacroInvocation};
use graft_api::scopes::{InvocationContext, Namespace, ScopeId};
use graft_api::spans::Span;
use graft_expand::expand::{ExpandError, Malformed};
use graft_expand::namespace::Origin;
use graft_expand::walker::SourceTree;
use graft_expand::{
    expand_macro, expand_or_none, DefinitionLookup, ExpansionOrigin, FailureCategory, Map,
};
use std::cell::Cell;
use std::error::Error;
use std::rc::Rc;

static IF_STD: &str = r#"
macro_rules! if_std {
    ($($i:item)*) => ($(
        #[cfg(feature = "use_std")]
        $i
    )*)
}
"#;

fn if_std() -> Rc<MacroDefinition> {
    Rc::new(MacroDefinition {
        name: "if_std".into(),
        source: IF_STD.trim().into(),
        span: Span::fake(),
    })
}

fn definition(name: &str, source: &str) -> Rc<MacroDefinition> {
    Rc::new(MacroDefinition {
        name: name.into(),
        source: source.into(),
        span: Span::fake(),
    })
}

fn invocation(name: &str, source: &str) -> MacroInvocation {
    MacroInvocation {
        name: name.into(),
        source: source.into(),
        span: Span::fake(),
        context: InvocationContext::Module(ScopeId(0)),
    }
}

fn lookup(defs: &[Rc<MacroDefinition>]) -> Map<Ident, Rc<MacroDefinition>> {
    defs.iter().map(|def| (def.name.clone(), def.clone())).collect()
}

/// Counts how often it's asked for a definition.
struct CountingLookup {
    definitions: Map<Ident, Rc<MacroDefinition>>,
    calls: Cell<usize>,
}
impl DefinitionLookup for CountingLookup {
    fn lookup_macro(&self, name: &Ident) -> Option<Rc<MacroDefinition>> {
        self.calls.set(self.calls.get() + 1);
        self.definitions.lookup_macro(name)
    }
}

#[test]
fn if_std_items() -> Result<(), Box<dyn Error>> {
    spoor::init();

    let source = format!(
        "{}\n{}",
        IF_STD,
        r#"
if_std! {
    fn foo() -> Foo { Foo }
}

struct Foo;

fn main() {
    let _foo = foo();
}
"#
    );
    let mut tree = SourceTree::parse("lib.rs", &source)?;
    let root = tree.root();

    let results = tree.expand_all();
    assert_eq!(results.len(), 1);
    let foo = &results[0];
    assert_eq!(foo.kind(), ElementKind::Function);
    assert_eq!(foo.name().map(|n| &**n), Some("foo"));
    assert!(foo.has_attribute("cfg"));
    assert!(foo.text().starts_with("#[cfg(feature = \"use_std\")]"));
    assert!(foo.text().ends_with("fn foo() -> Foo { Foo }"));
    assert_eq!(foo.context(), root);
    assert_eq!(foo.span().source_file.to_str(), Some("MACRO.rs"));
    let invoked_at = foo.span().macro_invocation.as_ref().expect("points at the invocation");
    assert_eq!(invoked_at.start_line, 10);

    let main = tree.function_scope("main").expect("main has a body");
    let binding = tree
        .resolve(main, Namespace::Value, "foo")
        .expect("foo resolves from main");
    assert_eq!(binding.kind, ElementKind::Function);
    match &binding.origin {
        Origin::Expanded { invocation } => assert_eq!(invocation.start_line, 10),
        other => panic!("unexpected: {:?}", other),
    }
    assert!(tree.resolve(main, Namespace::Type, "Foo").is_some());
    Ok(())
}

#[test]
fn lazy_static_declares_a_static() -> Result<(), Box<dyn Error>> {
    spoor::init();

    let mut tree = SourceTree::parse(
        "lib.rs",
        r#"
use lazy_static::lazy_static;

lazy_static! {
    /// Shared.
    pub static ref FOO: Vec<u8> = vec![1, 2, 3];
}

fn main() {
    let _len = FOO.len();
}
"#,
    )?;
    let results = tree.expand_all();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind(), ElementKind::Static);
    assert_eq!(
        results[0].text(),
        "/// Shared.\n    pub static FOO: Vec<u8> = vec![1, 2, 3];"
    );

    let main = tree.function_scope("main").expect("main has a body");
    let binding = tree
        .resolve(main, Namespace::Value, "FOO")
        .expect("FOO resolves from main");
    assert_eq!(binding.kind, ElementKind::Static);
    Ok(())
}

#[test]
fn builtin_skips_lookup() -> Result<(), Box<dyn Error>> {
    spoor::init();

    let counting = CountingLookup {
        definitions: lookup(&[
            definition(
                "lazy_static",
                "macro_rules! lazy_static { ($($i:item)*) => ($(struct Shadowed; $i)*) }",
            ),
            if_std(),
        ]),
        calls: Cell::new(0),
    };

    let expansion = expand_macro(
        &invocation("lazy_static", "lazy_static! { static ref A: u8 = 1; }"),
        &counting,
    )?;
    assert_eq!(expansion.origin, ExpansionOrigin::Builtin);
    assert_eq!(expansion.results.len(), 1);
    assert_eq!(expansion.results[0].name().map(|n| &**n), Some("A"));
    assert_eq!(counting.calls.get(), 0);

    let expansion = expand_macro(&invocation("if_std", "if_std! { struct B; }"), &counting)?;
    assert_eq!(expansion.origin, ExpansionOrigin::Definition);
    assert_eq!(counting.calls.get(), 1);
    Ok(())
}

#[test]
fn unresolved() {
    spoor::init();

    let defs = lookup(&[if_std()]);
    let inv = invocation("if_sdt", "if_sdt! { struct A; }");
    assert!(expand_or_none(&inv, &defs).is_none());
    match expand_macro(&inv, &defs) {
        Err(err @ ExpandError::Unresolved(_)) => {
            assert_eq!(err.category(), FailureCategory::Unresolved)
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn unsupported_shapes() {
    spoor::init();

    let defs = lookup(&[
        definition(
            "two_cases",
            "macro_rules! two_cases { ($($i:item)*) => ($($i)*); () => () }",
        ),
        definition(
            "two_groups",
            "macro_rules! two_groups { ($($i:item)* ; $($j:item)*) => ($($i)*) }",
        ),
        definition(
            "idents",
            "macro_rules! idents { ($($i:ident)*) => ($(struct $i;)*) }",
        ),
    ]);
    for name in &["two_cases", "two_groups", "idents"] {
        let inv = invocation(name, &format!("{}! {{ struct A; }}", name));
        assert!(expand_or_none(&inv, &defs).is_none());
        match expand_macro(&inv, &defs) {
            Err(err) => assert_eq!(err.category(), FailureCategory::UnsupportedShape),
            Ok(expansion) => panic!("{} expanded to {:?}", name, expansion),
        }
    }
}

#[test]
fn wrapped_template_binds_nothing() -> Result<(), Box<dyn Error>> {
    spoor::init();

    let mut tree = SourceTree::parse(
        "lib.rs",
        r#"
        macro_rules! wrap { ($($x:item)*) => { mod inner { $(pub $x)* } } }
        wrap! { struct A; }
        "#,
    )?;
    assert!(tree.expand_all().is_empty());
    assert!(tree.resolve(tree.root(), Namespace::Type, "A").is_none());

    let inv = tree.invocations().next().ok_or("no invocation")?;
    let defs = lookup(&[definition(
        "wrap",
        "macro_rules! wrap { ($($x:item)*) => { mod inner { $(pub $x)* } } }",
    )]);
    match expand_macro(inv, &defs) {
        Err(err) => assert_eq!(err.category(), FailureCategory::UnsupportedShape),
        Ok(expansion) => panic!("expanded to {:?}", expansion),
    }
    Ok(())
}

#[test]
fn empty_arguments() {
    spoor::init();

    let defs = lookup(&[if_std()]);
    match expand_macro(&invocation("if_std", "if_std! {}"), &defs) {
        Err(ExpandError::ArgumentParseFailed(Malformed::NoArguments)) => (),
        other => panic!("unexpected: {:?}", other),
    }
    match expand_macro(&invocation("if_std", "if_std!( /* nothing */ )"), &defs) {
        Err(ExpandError::InstantiationEmpty) => (),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn expression_context() -> Result<(), Box<dyn Error>> {
    spoor::init();

    let defs = lookup(&[if_std()]);
    let mut inv = invocation("if_std", "if_std!(struct A;)");
    inv.context = InvocationContext::Expression;
    match expand_macro(&inv, &defs) {
        Err(err @ ExpandError::ContextBindFailed) => {
            assert_eq!(err.category(), FailureCategory::ContextUnavailable)
        }
        other => panic!("unexpected: {:?}", other),
    }

    let source = format!("{}\nfn f() {{ let _x = if_std!(struct A;); }}", IF_STD);
    let mut tree = SourceTree::parse("lib.rs", &source)?;
    assert!(tree.expand_all().is_empty());
    Ok(())
}

#[test]
fn deterministic() -> Result<(), Box<dyn Error>> {
    spoor::init();

    let defs = lookup(&[if_std()]);
    let inv = invocation("if_std", "if_std! { fn a() {} struct B; }");
    let first = expand_macro(&inv, &defs)?.results;
    let second = expand_macro(&inv, &defs)?.results;
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.name(), b.name());
        assert_eq!(a.text(), b.text());
        assert_eq!(a.context(), b.context());
    }
    Ok(())
}

#[test]
fn one_instance_per_fragment() -> Result<(), Box<dyn Error>> {
    spoor::init();

    let defs = lookup(&[if_std()]);
    let inv = invocation(
        "if_std",
        "if_std! {\n    fn a() {}\n    /// b\n    struct B;\n    mod c {}\n}",
    );
    let results = expand_macro(&inv, &defs)?.results;
    let described = results
        .iter()
        .map(|r| (r.kind(), r.name().map(|n| n.to_string())))
        .collect::<Vec<_>>();
    assert_eq!(
        described,
        vec![
            (ElementKind::Function, Some("a".to_string())),
            (ElementKind::Struct, Some("B".to_string())),
            (ElementKind::Module, Some("c".to_string())),
        ]
    );
    assert!(results.iter().all(|r| r.has_attribute("cfg")));
    assert!(results[1].has_attribute("doc"));
    Ok(())
}

#[test]
fn textual_order() -> Result<(), Box<dyn Error>> {
    spoor::init();

    let source = format!(
        "{}\n{}",
        r#"
if_std! { struct TooEarly; }
"#,
        IF_STD.to_string()
            + r#"
if_std! { struct Root; }

mod m {
    if_std! { struct InModule; }

    macro_rules! private {
        ($($i:item)*) => ($($i)*)
    }
    private! { struct Private; }
}

private! { struct Leaked; }

fn f() {
    if_std! { struct InBody; }
}
"#
    );
    let mut tree = SourceTree::parse("lib.rs", &source)?;
    let names = tree
        .expand_all()
        .iter()
        .filter_map(|r| r.name().map(|n| n.to_string()))
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Root", "InModule", "Private", "InBody"]);

    let root = tree.root();
    let f = tree.function_scope("f").expect("f has a body");
    assert!(tree.resolve(root, Namespace::Type, "Root").is_some());
    assert!(tree.resolve(root, Namespace::Type, "InModule").is_none());
    assert!(tree.resolve(root, Namespace::Type, "InBody").is_none());
    assert!(tree.resolve(f, Namespace::Type, "InBody").is_some());
    assert!(tree.resolve(f, Namespace::Type, "Root").is_some());
    Ok(())
}
