//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - Terminal access only through the screen adapter
//! - A headless lookup core
//! - A single-threaded, synchronous session
//! - No panicking shortcuts in production code
//!
//! The helpers here scan production sources line by line. A file's test
//! module (everything from its first `#[cfg(test)]`) and comments are skipped.

use std::fs;
use std::path::{Path, PathBuf};

/// One line of production source
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub path: PathBuf,
    pub number: usize,
    /// The line with any trailing `//` comment removed
    pub code: String,
}

impl std::fmt::Display for SourceLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.number, self.code.trim())
    }
}

/// Workspace root, from this crate's manifest directory
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// A source directory relative to the workspace root; panics if missing so
/// a moved crate cannot make a check pass vacuously
pub fn source_dir(relative: &str) -> PathBuf {
    let dir = workspace_root().join(relative);
    assert!(dir.is_dir(), "source directory {} not found", dir.display());
    dir
}

/// Production lines of every `.rs` file under `dir`
pub fn production_lines(dir: &Path) -> Vec<SourceLine> {
    let mut lines = Vec::new();

    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("rs") {
            continue;
        }
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => continue,
        };

        for (idx, line) in content.lines().enumerate() {
            if line.trim_start().starts_with("#[cfg(test)]") {
                break;
            }
            let code = line.split("//").next().unwrap_or(line);
            if code.trim().is_empty() {
                continue;
            }
            lines.push(SourceLine {
                path: path.to_path_buf(),
                number: idx + 1,
                code: code.to_string(),
            });
        }
    }

    lines
}

/// Lines under `dir` containing any of `patterns`
pub fn find_violations(dir: &Path, patterns: &[&str]) -> Vec<SourceLine> {
    production_lines(dir)
        .into_iter()
        .filter(|line| patterns.iter().any(|p| line.code.contains(p)))
        .collect()
}

/// Print violations and fail
pub fn report(title: &str, violations: &[SourceLine]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ CRITICAL: {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }

    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}
