mod common;

use common::{jmmc, write_source, SAMPLE};

const BROKEN: &str = "class A { int f() { boolean b; b = 3; return 0; } }";

#[test]
fn check_clean_file() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "Sample.jmm", SAMPLE);
    let output = jmmc().arg("check").arg(&src).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn check_reports_diagnostics_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "A.jmm", BROKEN);
    let output = jmmc().arg("check").arg(&src).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot assign 'int' to 'boolean'."), "{stderr}");
    assert!(stderr.contains("1 error(s) found"));
}

#[test]
fn ir_and_asm_print_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "Sample.jmm", SAMPLE);

    let ir = jmmc().arg("ir").arg(&src).output().unwrap();
    assert!(ir.status.success());
    assert!(String::from_utf8_lossy(&ir.stdout).contains("Sample extends Object {"));

    let asm = jmmc().arg("asm").arg(&src).output().unwrap();
    assert!(asm.status.success());
    assert!(String::from_utf8_lossy(&asm.stdout).starts_with(".class public Sample"));
}

#[test]
fn syntax_error_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "Bad.jmm", "class A { int f( { } }");
    let output = jmmc().arg("asm").arg(&src).output().unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn compile_writes_both_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "Sample.jmm", SAMPLE);
    let out = dir.path().join("build");
    let output = jmmc().arg("compile").arg(&src).arg("-o").arg(&out).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(out.join("Sample.ollir").is_file());
    assert!(out.join("Sample.j").is_file());
}

#[test]
fn compile_honors_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "A.jmm", BROKEN);
    std::fs::write(
        dir.path().join("jmm.toml"),
        "[package]\nname = \"demo\"\n\n[build]\noutput-dir = \"gen\"\nemit-ir = false\ndeny-diagnostics = false\n",
    )
    .unwrap();
    let output = jmmc().arg("compile").arg(&src).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(dir.path().join("gen").join("A.j").is_file());
    assert!(!dir.path().join("gen").join("A.ollir").exists());
}

#[test]
fn compile_denies_diagnostics_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "A.jmm", BROKEN);
    let output = jmmc().arg("compile").arg(&src).output().unwrap();
    assert!(!output.status.success());
    assert!(!dir.path().join("A.j").exists());
}

#[test]
fn bad_manifest_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "Sample.jmm", SAMPLE);
    std::fs::write(dir.path().join("jmm.toml"), "[build]\nturbo = true\n").unwrap();
    let output = jmmc().arg("compile").arg(&src).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("jmm.toml"));
}

#[test]
fn emit_ast_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "Sample.jmm", SAMPLE);
    let json = dir.path().join("Sample.json");
    let output = jmmc().arg("emit-ast").arg(&src).arg("-o").arg(&json).output().unwrap();
    assert!(output.status.success());

    let from_source = jmmc().arg("asm").arg(&src).output().unwrap();
    let from_json = jmmc().arg("asm").arg(&json).output().unwrap();
    assert!(from_json.status.success(), "{}", String::from_utf8_lossy(&from_json.stderr));
    assert_eq!(from_source.stdout, from_json.stdout);
}

#[test]
fn verbose_logs_go_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(dir.path(), "Sample.jmm", SAMPLE);
    let output = jmmc().arg("-v").arg("asm").arg(&src).output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("DEBUG"), "{stderr}");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("DEBUG"));
}
