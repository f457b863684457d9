#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

pub fn jmmc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_jmmc"))
}

/// A small complete program touching every construct the back end lowers.
pub const SAMPLE: &str = r#"
import io;
import util.Lib;

class Sample {
    int total;
    int[] data;

    public int sum(int base, int... xs) {
        int i;
        int acc;
        acc = base;
        i = 0;
        while (i < xs.length) {
            acc = acc + xs[i];
            i = i + 1;
        }
        return acc;
    }

    public boolean positive(int x) {
        boolean r;
        if (0 < x) r = true; else r = false;
        return r;
    }

    public int run() {
        Lib l;
        data = [1, 2, 3];
        total = this.sum(10, 1, 2, 3);
        l = new Lib();
        l.report(total);
        return total;
    }

    public static void main(String[] args) {
        Sample s;
        s = new Sample();
        io.println(s.run());
    }
}
"#;

pub fn messages(source: &str) -> Vec<String> {
    let program = jmmc::parse(source).unwrap();
    jmmc::analyze(&program).into_iter().map(|d| d.message).collect()
}

pub fn ir(source: &str) -> String {
    jmmc::compile_source(source).unwrap().ir_text()
}

pub fn asm(source: &str) -> String {
    jmmc::compile_source(source).unwrap().assembly
}

/// Lines of one method's body in the assembly text, trimmed.
pub fn asm_method(text: &str, name: &str) -> Vec<String> {
    let marker = format!(" {name}(");
    text.lines()
        .skip_while(|l| !(l.starts_with(".method") && l.contains(&marker)))
        .skip(1)
        .take_while(|l| *l != ".end method")
        .map(|l| l.trim().to_string())
        .collect()
}

pub fn write_source(dir: &Path, name: &str, source: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, source).unwrap();
    path
}
