//! Integration Test: Single-Threaded Session
//!
//! **Policy**: The session reads a key, processes it to completion and
//! only then reads the next one. Lookups run synchronously on the same
//! thread. No threads, timers, sleeps or async runtimes in production code.
//!
//! Production code also propagates errors instead of panicking.

use architectural_enforcement::{find_violations, report, source_dir};

const CONCURRENCY: &[&str] = &[
    "thread::spawn",
    "std::thread",
    "sleep(",
    "tokio",
    "async fn",
    ".await",
];

const PANICKING: &[&str] = &[".unwrap()", ".expect("];

#[test]
fn test_no_concurrency_in_tui() {
    report(
        "Threads, sleeps or async code in the TUI!",
        &find_violations(&source_dir("tui/src"), CONCURRENCY),
    );
}

#[test]
fn test_no_concurrency_in_core() {
    report(
        "Threads, sleeps or async code in the lookup core!",
        &find_violations(&source_dir("dictionary/core/src"), CONCURRENCY),
    );
}

#[test]
fn test_no_unwrap_in_production_code() {
    let mut violations = find_violations(&source_dir("tui/src"), PANICKING);
    violations.extend(find_violations(&source_dir("dictionary/core/src"), PANICKING));
    report("unwrap()/expect() in production code!", &violations);
}
