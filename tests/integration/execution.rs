//! Integration tests for the runner: load, evaluate, report

use runjs_core::{ExecutionOutcome, Job, Stage};
use runjs_engine::{EngineConfig, HostContext, Runner};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn run_source(source: &str) -> (ExecutionOutcome, runjs_engine::Capture) {
    run_source_with(EngineConfig::new(), source)
}

fn run_source_with(
    config: EngineConfig,
    source: &str,
) -> (ExecutionOutcome, runjs_engine::Capture) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("user_code.js"), source).unwrap();

    let (host, capture) = HostContext::captured();
    let outcome = Runner::new(config, host).run(&Job::new(dir.path()));
    (outcome, capture)
}

fn failure_message(outcome: &ExecutionOutcome, expected: Stage) -> String {
    match outcome {
        ExecutionOutcome::Failure { stage, message } => {
            assert_eq!(*stage, expected);
            message.clone()
        }
        ExecutionOutcome::Success => panic!("Expected {expected:?} failure"),
    }
}

#[test]
fn test_successful_run_has_no_error_output() {
    let (outcome, capture) = run_source(
        "function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); }\n\
         console.log(fib(15));",
    );

    assert_eq!(outcome, ExecutionOutcome::Success);
    assert_eq!(capture.stdout(), "610\n");
    assert_eq!(capture.stderr(), "");
}

#[test]
fn test_missing_user_code_is_read_failure() {
    let dir = TempDir::new().unwrap();
    let (host, _) = HostContext::captured();

    let outcome = Runner::new(EngineConfig::new(), host).run(&Job::new(dir.path()));
    let message = failure_message(&outcome, Stage::Read);
    assert!(message.contains("user_code.js"));
    assert!(
        outcome
            .diagnostic()
            .unwrap()
            .starts_with("Error reading user code: ")
    );
}

#[test]
fn test_syntax_error_is_exec_failure() {
    let (outcome, capture) = run_source("console.log('never printed');\nif (true {");

    let message = failure_message(&outcome, Stage::Exec);
    assert!(message.starts_with("SyntaxError"));
    assert_eq!(capture.stdout(), "");
}

#[test]
fn test_runtime_error_description() {
    let (outcome, _) = run_source("null.property;");

    let message = failure_message(&outcome, Stage::Exec);
    assert!(message.starts_with("TypeError"));
}

#[test]
fn test_thrown_value_description() {
    let (outcome, _) = run_source("throw { code: 7, toString() { return 'E7'; } };");

    assert_eq!(failure_message(&outcome, Stage::Exec), "E7");
    assert_eq!(outcome.diagnostic().unwrap(), "Execution error: E7");
}

#[test]
fn test_side_effects_before_failure_are_kept() {
    let (outcome, capture) = run_source(
        "console.log('step 1');\nconsole.error('warning');\nthrow new Error('step 2');",
    );

    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(capture.stdout(), "step 1\n");
    assert_eq!(capture.stderr(), "warning\n");
}

#[test]
fn test_async_drain_order() {
    let (outcome, capture) = run_source(
        "const log = [];\n\
         setTimeout(() => { log.push('timeout'); console.log(log.join(',')); }, 0);\n\
         queueMicrotask(() => log.push('microtask'));\n\
         (async () => { await null; log.push('await'); })();\n\
         log.push('sync');",
    );

    assert!(outcome.is_success());
    assert_eq!(capture.stdout(), "sync,microtask,await,timeout\n");
}

#[test]
fn test_timeout_outcome() {
    let config = EngineConfig::new().with_timeout(Duration::from_millis(50));
    let (outcome, _) = run_source_with(config, "setInterval(() => {}, 5);");

    assert_eq!(
        failure_message(&outcome, Stage::Exec),
        "timed out after 50 ms"
    );
}

#[test]
fn test_idempotent_outcomes() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("user_code.js"),
        "const x = [3, 1, 2].sort(); if (x[0] !== 1) throw new Error('unsorted'); console.log(x);",
    )
    .unwrap();
    let (host, capture) = HostContext::captured();
    let runner = Runner::new(EngineConfig::new(), host);

    let first = runner.run(&Job::new(dir.path()));
    let second = runner.run(&Job::new(dir.path()));

    assert_eq!(first, second);
    assert_eq!(capture.stdout(), "[1,2,3]\n[1,2,3]\n");
}
