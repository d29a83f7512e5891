//! E2E tests for running user_code.js files

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

const CLI_BINARY: &str = env!("CARGO_BIN_EXE_runjs");

fn run_source(source: &str) -> Output {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("user_code.js"), source).unwrap();

    Command::new(CLI_BINARY).arg(dir.path()).output().unwrap()
}

#[test]
fn test_console_output() {
    let output = run_source("console.log('hello from user code');");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "hello from user code"
    );
    assert!(output.stderr.is_empty());
}

#[test]
fn test_syntax_error() {
    let output = run_source("const = 5;");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Execution error: SyntaxError"));
}

#[test]
fn test_thrown_error() {
    let output = run_source("console.log('partial'); throw new Error('user failure');");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "partial");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Execution error: Error: user failure"));
}

#[test]
fn test_thrown_primitive() {
    let output = run_source("throw 'plain string';");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stderr).trim(),
        "Execution error: plain string"
    );
}

#[test]
fn test_async_work_completes_before_exit() {
    let output = run_source(
        "setTimeout(() => console.log('timer'), 20);\n\
         Promise.resolve().then(() => console.log('microtask'));\n\
         console.log('sync');",
    );

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "sync\nmicrotask\ntimer\n"
    );
}

#[test]
fn test_infinite_timer_delay_fires() {
    let output = run_source("setTimeout(() => console.log('x'), Infinity);");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "x\n");
    assert!(output.stderr.is_empty());
}

#[test]
fn test_unhandled_rejection_after_handled_one() {
    let output = run_source(
        "const a = Promise.reject(new Error('A'));\n\
         const b = Promise.reject(new Error('B'));\n\
         a.catch(() => {});",
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Execution error: Uncaught (in promise) Error: B"));
}

#[test]
fn test_unhandled_rejection() {
    let output = run_source("Promise.reject(new Error('async failure'));");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Uncaught (in promise) Error: async failure"));
}

#[test]
fn test_shebang_script() {
    let output = run_source("#!/usr/bin/env node\nconsole.log('shebang works');\n");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "shebang works");
}

#[test]
fn test_empty_script() {
    let output = run_source("");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "");
}

#[test]
fn test_repeat_runs_same_outcome() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("user_code.js"), "throw new RangeError('again');").unwrap();

    let first = Command::new(CLI_BINARY).arg(dir.path()).output().unwrap();
    let second = Command::new(CLI_BINARY).arg(dir.path()).output().unwrap();

    assert_eq!(first.status.code(), second.status.code());
    assert_eq!(first.status.code(), Some(1));
    let first_stderr = String::from_utf8_lossy(&first.stderr);
    let second_stderr = String::from_utf8_lossy(&second.stderr);
    assert_eq!(
        first_stderr.lines().next(),
        second_stderr.lines().next()
    );
}
