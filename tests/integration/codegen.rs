mod common;

use common::{asm, asm_method, SAMPLE};

#[test]
fn class_without_constructor_gets_exactly_one() {
    let text = asm("class C { int f() { return 1; } }");
    assert_eq!(text.matches("<init>").count(), 2, "{text}");
    assert_eq!(text.matches(".method public <init>()V").count(), 1);
    assert!(text.contains("invokespecial java/lang/Object/<init>()V"));
}

#[test]
fn sample_assembles() {
    let text = asm(SAMPLE);
    assert!(text.starts_with(".class public Sample\n.super java/lang/Object\n"));
    assert!(text.contains(".field public total I\n"));
    assert!(text.contains(".field public data [I\n"));
    assert!(text.contains(".method public sum(I[I)I\n"));
    assert!(text.contains(".method public positive(I)Z\n"));
    assert!(text.contains(".method public static main([Ljava/lang/String;)V\n"));
    assert!(text.contains("invokevirtual Sample/sum(I[I)I"));
    assert!(text.contains("invokevirtual util/Lib/report(I)V"));
    assert!(text.contains("invokestatic io/println(I)V"));
    assert!(text.contains("new util/Lib"));
}

#[test]
fn every_method_declares_limits() {
    let text = asm(SAMPLE);
    let methods = text.matches("\n.method ").count();
    assert_eq!(text.matches(".limit stack ").count(), methods - 1);
    assert_eq!(text.matches(".limit locals ").count(), methods - 1);
}

#[test]
fn add_stack_limit_is_at_least_two() {
    let text = asm("class C { int add(int a, int b) { return a + b; } }");
    let body = asm_method(&text, "add");
    let stack: usize = body[0].strip_prefix(".limit stack ").unwrap().parse().unwrap();
    assert!(stack >= 2);
    assert_eq!(body[1], ".limit locals 4");
}

#[test]
fn static_method_locals_start_at_zero() {
    let text = asm("class C { public static int id(int a) { return a; } }");
    let body = asm_method(&text, "id");
    assert_eq!(body[1..], [".limit locals 1", "iload_0", "ireturn"]);
}

#[test]
fn reference_locals_use_reference_opcodes() {
    let text = asm("class C { C self() { C c; c = this; return c; } }");
    let body = asm_method(&text, "self");
    assert_eq!(body[2..], ["aload_0", "astore_1", "aload_1", "areturn"]);
}

#[test]
fn if_else_branches() {
    let text = asm("class C { int f(boolean b) { int r; if (b) r = 1; else r = 2; return r; } }");
    let body = asm_method(&text, "f");
    let expected = [
        "iload_1",
        "ifne if0",
        "iconst_2",
        "istore_2",
        "goto endif0",
        "if0:",
        "iconst_1",
        "istore_2",
        "endif0:",
        "iload_2",
        "ireturn",
    ];
    assert_eq!(body[2..], expected);
}

#[test]
fn void_method_without_return_ends_in_return() {
    let text = asm("class C { int x; void set(int v) { x = v; } }");
    let body = asm_method(&text, "set");
    assert_eq!(body.last().map(String::as_str), Some("return"));
    assert_eq!(body.iter().filter(|l| *l == "return").count(), 1);
}

#[test]
fn branches_returning_on_both_sides_end_in_a_return() {
    let text = asm("class C { int f(boolean b) { if (b) return 1; else return 2; } }");
    let body = asm_method(&text, "f");
    assert_eq!(body[body.len() - 3..], ["endif0:", "iconst_0", "ireturn"]);
}
