//! Snapshot tests for the IR and assembly text of a small class.
//!
//! Uses insta to catch formatting regressions in either output.
//! Run `cargo insta review` to review changes.

use insta::assert_snapshot;

const COUNTER: &str = "class Counter { int n; public int bump(int k) { n = n + k; return n; } }";

#[test]
fn field_update_ir() {
    let compilation = jmmc::compile_source(COUNTER).unwrap();
    assert_snapshot!(compilation.ir_text(), @r#"
    Counter extends Object {

    .field public n.i32;

    .construct Counter().V {
        invokespecial(this, "<init>").V;
    }

    .method public bump(k.i32).i32 {
        tmp0.i32 :=.i32 getfield(this.Counter, n.i32).i32;
        tmp1.i32 :=.i32 tmp0.i32 +.i32 k.i32;
        putfield(this.Counter, n.i32, tmp1.i32).V;
        tmp2.i32 :=.i32 getfield(this.Counter, n.i32).i32;
        ret.i32 tmp2.i32;
    }

    }
    "#);
}

#[test]
fn field_update_assembly() {
    let compilation = jmmc::compile_source(COUNTER).unwrap();
    assert_snapshot!(compilation.assembly, @r"
    .class public Counter
    .super java/lang/Object

    .field public n I

    .method public bump(I)I
        .limit stack 3
        .limit locals 5
        aload_0
        getfield Counter/n I
        istore_2
        iload_2
        iload_1
        iadd
        istore_3
        aload_0
        iload_3
        putfield Counter/n I
        aload_0
        getfield Counter/n I
        istore 4
        iload 4
        ireturn
    .end method

    .method public <init>()V
        aload_0
        invokespecial java/lang/Object/<init>()V
        return
    .end method
    ");
}
