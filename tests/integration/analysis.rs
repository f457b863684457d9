mod common;

use common::{messages, SAMPLE};

#[test]
fn sample_program_is_clean() {
    assert!(messages(SAMPLE).is_empty(), "{:?}", messages(SAMPLE));
}

#[test]
fn diagnostics_carry_positions() {
    let src = "class A {\n  int f() {\n    boolean b;\n    b = 3;\n    return 0;\n  }\n}\n";
    let program = jmmc::parse(src).unwrap();
    let diags = jmmc::analyze(&program);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].line, 4);
    assert_eq!(diags[0].column, 5);
    assert_eq!(diags[0].to_string(), "error[4:5]: Cannot assign 'int' to 'boolean'.");
}

#[test]
fn imports_are_mutually_assignable() {
    let src = "import X; import Y; class A { void f() { X x; Y y; x = y; y = x; } }";
    assert!(messages(src).is_empty());
}

#[test]
fn undefined_method_depends_on_super() {
    let without = messages("class A { int f() { return this.nope(); } }");
    assert_eq!(without, vec!["Method 'nope' is not declared in class 'A'."]);
    let with = messages("class A extends B { int f() { return this.nope(); } }");
    assert!(with.is_empty());
}

#[test]
fn varargs_arity() {
    let base = "class A { int s(int... xs) { return 0; } int f() { return this.";
    for ok in ["s()", "s(1)", "s(1, 2, 3, 4)"] {
        assert!(messages(&format!("{base}{ok}; }} }}")).is_empty(), "{ok}");
    }
    let bad = messages(&format!("{base}s(1, false); }} }}"));
    assert_eq!(bad, vec!["Type of parameter 'boolean' not compatible with expected 'int'."]);
}

#[test]
fn checkers_report_in_pipeline_order() {
    let src = "class A { Ghost g; int f(int x) { if (x) x = 1; else x = 2; return x[0]; } }";
    let msgs = messages(src);
    assert_eq!(
        msgs,
        vec![
            "Variable 'x' is neither an array or Sequence.",
            "Condition 'x' must be of Type Boolean.",
            "Type 'Ghost' of variable 'g' does not exist.",
        ]
    );
}

#[test]
fn return_type_mismatch() {
    assert_eq!(
        messages("class A { int f() { return true; } }"),
        vec!["Function needs 'int' but 'boolean' was found."]
    );
    assert_eq!(
        messages("class A { int f() { return; } }"),
        vec!["Function needs 'int' but no value was returned."]
    );
}

#[test]
fn equal_operand_types_need_no_operator_match() {
    assert!(messages("class A { int f() { int x; x = true + true; return x; } }").is_empty());
    assert!(messages("class A { boolean f(boolean a) { return a < a; } }").is_empty());
}
