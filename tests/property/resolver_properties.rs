// Property-Based Testing for the Jmm back end
//
// These properties hold for whole families of generated programs rather than
// hand-picked examples:
// 1. Resolver properties (operator result types, import compatibility)
// 2. Checker properties (variadic arity, clean programs stay clean)
// 3. Lowering properties (temporary numbering, variadic packing)
// 4. Assembly properties (locals and stack limits)

use jmmc::parser::ast::{Expr, Stmt};
use jmmc::typeck::env::ClassDescriptor;
use jmmc::typeck::infer::TypeResolver;
use jmmc::typeck::types::Type;
use proptest::prelude::*;

fn arith_op() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["+", "-", "*", "/"])
}

fn rel_op() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["<", "<=", ">", ">="])
}

/// Left-associated chain of int literals joined by arithmetic operators.
fn arith_chain() -> impl Strategy<Value = String> {
    (0u32..1000, prop::collection::vec((arith_op(), 0u32..1000), 0..6)).prop_map(|(first, rest)| {
        let mut out = first.to_string();
        for (op, n) in rest {
            out = format!("{out} {op} {n}");
        }
        out
    })
}

/// Names that can never collide with keywords or the class under test.
fn import_name() -> impl Strategy<Value = String> {
    "[a-z]{1,5}".prop_map(|s| format!("Ext{s}"))
}

fn returned_expr(source: &str) -> (ClassDescriptor, Expr) {
    let program = jmmc::parse(source).unwrap();
    let desc = ClassDescriptor::build(&program);
    let method = &program.class.node.methods[0].node;
    let expr = method
        .body
        .iter()
        .find_map(|stmt| match &stmt.node {
            Stmt::Return(Some(e)) => Some(e.node.clone()),
            _ => None,
        })
        .unwrap();
    (desc, expr)
}

fn diagnostics(source: &str) -> usize {
    jmmc::analyze(&jmmc::parse(source).unwrap()).len()
}

fn method_lines(asm: &str, name: &str) -> Vec<String> {
    let needle = format!(" {name}(");
    asm.lines()
        .skip_while(|l| !(l.starts_with(".method") && l.contains(&needle)))
        .skip(1)
        .take_while(|l| *l != ".end method")
        .map(|l| l.trim().to_string())
        .collect()
}

fn limit(lines: &[String], kind: &str) -> usize {
    let prefix = format!(".limit {kind} ");
    lines
        .iter()
        .find_map(|l| l.strip_prefix(&prefix))
        .unwrap()
        .parse()
        .unwrap()
}

// =============================================================================
// SECTION 1: RESOLVER PROPERTIES
// =============================================================================

/// Property: arithmetic over int literals always resolves to int and type checks.
#[test]
fn prop_arithmetic_resolves_to_int() {
    proptest!(|(expr in arith_chain())| {
        let source = format!("class A {{ int f() {{ return {expr}; }} }}");
        let (desc, resolved) = returned_expr(&source);
        let resolver = TypeResolver::for_method(&desc, "f");
        prop_assert_eq!(resolver.resolve(&resolved), Some(Type::int()));
        prop_assert_eq!(diagnostics(&source), 0);
    });
}

/// Property: a relational comparison of two arithmetic chains is boolean.
#[test]
fn prop_relational_resolves_to_boolean() {
    proptest!(|(lhs in arith_chain(), op in rel_op(), rhs in arith_chain())| {
        let source = format!("class A {{ boolean f() {{ return ({lhs}) {op} ({rhs}); }} }}");
        let (desc, resolved) = returned_expr(&source);
        let resolver = TypeResolver::for_method(&desc, "f");
        prop_assert_eq!(resolver.resolve(&resolved), Some(Type::boolean()));
    });
}

/// Property: values of any two imported types can be assigned to each other.
#[test]
fn prop_imports_are_mutually_assignable() {
    proptest!(|(x in import_name(), y in import_name())| {
        let source = format!(
            "import {x}; import {y}; class A {{ void f() {{ {x} a; {y} b; a = b; b = a; }} }}"
        );
        prop_assert_eq!(diagnostics(&source), 0);
    });
}

// =============================================================================
// SECTION 2: CHECKER PROPERTIES
// =============================================================================

/// Property: a variadic int parameter accepts any number of int arguments.
#[test]
fn prop_varargs_accept_any_arity() {
    proptest!(|(args in prop::collection::vec(0u32..100, 0..8))| {
        let list = args.iter().map(u32::to_string).collect::<Vec<_>>().join(", ");
        let source = format!(
            "class A {{ int s(int... xs) {{ return xs.length; }} int f() {{ return this.s({list}); }} }}"
        );
        prop_assert_eq!(diagnostics(&source), 0);

        let ir = jmmc::compile_source(&source).unwrap().ir_text();
        let packed = format!("new(array, {}.i32).array.i32", args.len());
        prop_assert!(ir.contains(&packed), "{}", ir);
    });
}

// =============================================================================
// SECTION 3: LOWERING PROPERTIES
// =============================================================================

/// Property: every temporary is defined exactly once, numbered without gaps.
#[test]
fn prop_temporaries_are_consecutive() {
    proptest!(|(steps in prop::collection::vec(1u32..50, 1..10))| {
        let body: String = steps.iter().map(|k| format!("a = a + {k}; ")).collect();
        let source = format!("class A {{ int f(int a) {{ {body}return a; }} }}");
        let ir = jmmc::compile_source(&source).unwrap().ir_text();
        for n in 0..steps.len() {
            let def = format!("tmp{n}.i32 :=.i32");
            prop_assert_eq!(ir.matches(&def).count(), 1);
        }
        let past_end = format!("tmp{}.i32", steps.len());
        prop_assert!(!ir.contains(&past_end));
    });
}

// =============================================================================
// SECTION 4: ASSEMBLY PROPERTIES
// =============================================================================

/// Property: locals limit counts `this`, every parameter and every assigned local.
#[test]
fn prop_locals_limit_counts_every_slot() {
    proptest!(|(params in 0usize..5, locals in 0usize..5)| {
        let plist = (0..params).map(|i| format!("int p{i}")).collect::<Vec<_>>().join(", ");
        let decls: String = (0..locals).map(|i| format!("int l{i}; ")).collect();
        let stores: String = (0..locals).map(|i| format!("l{i} = {i}; ")).collect();
        let source = format!("class A {{ int f({plist}) {{ {decls}{stores}return 0; }} }}");
        let asm = jmmc::compile_source(&source).unwrap().assembly;
        let lines = method_lines(&asm, "f");
        prop_assert_eq!(limit(&lines, "locals"), 1 + params + locals);
    });
}

/// Property: any binary arithmetic needs at least two stack slots.
#[test]
fn prop_binary_stack_limit_at_least_two() {
    proptest!(|(expr in arith_chain().prop_filter("needs an operator", |e| e.contains(' ')))| {
        let source = format!("class A {{ int f() {{ int r; r = {expr}; return r; }} }}");
        let asm = jmmc::compile_source(&source).unwrap().assembly;
        let lines = method_lines(&asm, "f");
        prop_assert!(limit(&lines, "stack") >= 2);
    });
}
