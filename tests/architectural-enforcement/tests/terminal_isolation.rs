//! Integration Test: Terminal Isolation
//!
//! **Policy**: Only the crossterm adapter (`tui/src/screen/terminal.rs`) and
//! the binary (`tui/src/main.rs`) talk to the terminal. Everything else draws
//! through the `ScreenSurface` trait, so sessions run against the in-memory
//! surface in tests. The lookup core knows nothing about terminals at all.

use architectural_enforcement::{find_violations, report, source_dir};

const TERMINAL_APIS: &[&str] = &["crossterm", "CrosstermBackend", "ratatui::Terminal"];

#[test]
fn test_core_is_headless() {
    let violations = find_violations(
        &source_dir("dictionary/core/src"),
        &["crossterm", "ratatui"],
    );
    report("Terminal crates used in the lookup core!", &violations);
}

#[test]
fn test_terminal_apis_stay_in_the_adapter() {
    let violations: Vec<_> = find_violations(&source_dir("tui/src"), TERMINAL_APIS)
        .into_iter()
        .filter(|line| {
            let path = line.path.to_string_lossy().replace('\\', "/");
            !path.ends_with("screen/terminal.rs") && !path.ends_with("src/main.rs")
        })
        .collect();
    report("Terminal APIs used outside the screen adapter!", &violations);
}

#[test]
fn test_adapter_is_where_we_expect_it() {
    let adapter = source_dir("tui/src/screen").join("terminal.rs");
    assert!(adapter.is_file(), "{} not found", adapter.display());
}
