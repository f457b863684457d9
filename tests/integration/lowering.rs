mod common;

use common::{ir, SAMPLE};

#[test]
fn return_of_sum_uses_one_temporary() {
    let text = ir("class A { int add(int a, int b) { return a + b; } }");
    assert!(text.contains("    tmp0.i32 :=.i32 a.i32 +.i32 b.i32;\n    ret.i32 tmp0.i32;\n"), "{text}");
}

#[test]
fn sample_ir_shape() {
    let text = ir(SAMPLE);
    assert!(text.starts_with("import io;\nimport util.Lib;\n"));
    assert!(text.contains("Sample extends Object {"));
    assert!(text.contains(".field public total.i32;"));
    assert!(text.contains(".field public data.array.i32;"));
    assert!(text.contains(".method public sum(base.i32, xs.array.i32).i32 {"));
    assert!(text.contains(".method public static main(args.array.String).V {"));
    assert!(text.contains("putfield(this.Sample, total.i32, "));
    assert!(text.contains("invokevirtual(l.Lib, \"report\", "));
    assert!(text.contains("invokestatic(io, \"println\", "));
}

#[test]
fn while_lowering_has_three_labels_and_both_branches() {
    let text = ir("class A { int f(int n) { int i; i = 0; while (i < n) i = i + 1; return i; } }");
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let cond = lines.iter().position(|l| *l == "whileCond0:").unwrap();
    let body = lines.iter().position(|l| *l == "whileLoop0:").unwrap();
    let end = lines.iter().position(|l| *l == "whileEnd0:").unwrap();
    assert!(cond < body && body < end);
    assert!(lines[cond..body].iter().any(|l| l.ends_with("goto whileLoop0;") && l.starts_with("if (")));
    assert!(lines[cond..body].contains(&"goto whileEnd0;"));
    assert!(lines[body..end].contains(&"goto whileCond0;"));
}

#[test]
fn temporaries_are_never_reused() {
    let text = ir("class A { int f(int a) { a = a + 1; a = a + 1; return a + 1; } int g(int b) { return b * 2; } }");
    for n in 0..4 {
        assert_eq!(text.matches(&format!("tmp{n}.i32 :=.i32")).count(), 1, "tmp{n} in {text}");
    }
}

#[test]
fn lowering_ignores_semantic_errors() {
    let compilation = jmmc::compile_source("class A { int f() { boolean b; b = 3; return 0; } }").unwrap();
    assert!(compilation.has_errors());
    assert!(compilation.ir_text().contains("b.bool :=.bool 3.i32;"));
}

#[test]
fn chained_calls_on_imports() {
    let text = ir("import Lib; class A { void f() { Lib.make().run(); } }");
    assert!(text.contains("tmp0.Object :=.Object invokestatic(Lib, \"make\").Object;"), "{text}");
    assert!(text.contains("invokevirtual(tmp0.Object, \"run\").V;"), "{text}");
}
