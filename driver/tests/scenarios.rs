//! End-to-end pipeline tests for the testable scenarios S1-S6: write a
//! source file, run it through the `oct8` binary, and check the printed
//! final machine state.

use std::io::Write;
use std::process::Command;

fn run_source(source: &str, extension: &str) -> String {
    let mut file = tempfile::Builder::new().suffix(extension).tempfile().unwrap();
    file.write_all(source.as_bytes()).unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_oct8")).arg("run").arg(file.path()).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn s1_arith_scenario() {
    let stdout = run_source("LDI A, 10\nLDI B, 5\nSUB A, B\nHALT\n", ".asm");
    assert!(stdout.contains("A=0x05"));
    assert!(stdout.contains("z=false"));
    assert!(stdout.contains("c=false"));
}

#[test]
fn s2_loop_scenario() {
    let stdout = run_source("LDI A, 3\nL: DEC A\nJNZ L\nHALT\n", ".asm");
    assert!(stdout.contains("A=0x00"));
    assert!(stdout.contains("z=true"));
}

#[test]
fn s3_stack_scenario() {
    let stdout = run_source("LDI A, 7\nPUSH A\nLDI A, 0\nPOP A\nHALT\n", ".asm");
    assert!(stdout.contains("A=0x07"));
    assert!(stdout.contains("sp=0xffef"));
}

#[test]
fn s4_call_scenario_unwinds_the_stack() {
    let source = "func inc(n:u8){ return n+1; }\nlet: x=u8;\nx = call inc(41);\nhalt;\n";
    let stdout = run_source(source, ".hl");
    assert!(stdout.contains("sp=0xffef"));
}

#[test]
fn s4_call_result_lands_in_accumulator() {
    let source = "func inc(n:u8){ return n+1; }\nreg[A] = call inc(41);\nhalt;\n";
    let stdout = run_source(source, ".hl");
    assert!(stdout.contains("A=0x2a"));
}

#[test]
fn s5_u16_compare_scenario() {
    let source = "let: a=u16;\nlet: b=u16;\na=300;\nb=256;\nif (a>b) { out(1,1); } else { out(1,0); }\nhalt;\n";
    let stdout = run_source(source, ".hl");
    assert!(stdout.contains("port1=0x01"));
}

#[test]
fn s6_memory_to_text_buffer_scenario() {
    let source = "LDI A, 65\nSTM 0xFFF0, A\nHALT\n";
    let stdout = run_source(source, ".asm");
    assert!(stdout.contains("text: 9"));
}
