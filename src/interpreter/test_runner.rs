// File: src/interpreter/test_runner.rs
//
// Snapshot runner for Rockstar programs.
//
// Every `.rock` file in a directory is parsed and run with its output
// captured, then compared against the sibling `.out` file. A sibling `.in`
// file, if present, feeds `Listen to`. Syntax and runtime errors become part
// of the captured output so failing programs can be snapshotted too.

use crate::interpreter::Interpreter;
use crate::parser::parse_source;
use log::debug;
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Runs every program in one directory against its snapshot
pub struct SnapshotRunner {
    pub dir: PathBuf,
    /// Rewrite `.out` files from actual output instead of comparing
    pub update: bool,
}

/// Result from running a single program
#[derive(Clone, Debug)]
pub struct SnapshotResult {
    pub path: PathBuf,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
    pub duration: Duration,
}

/// Summary of a whole directory run
#[derive(Clone, Debug, Default)]
pub struct SnapshotReport {
    pub results: Vec<SnapshotResult>,
}

impl SnapshotReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }
}

impl SnapshotRunner {
    pub fn new(dir: impl Into<PathBuf>, update: bool) -> Self {
        SnapshotRunner { dir: dir.into(), update }
    }

    /// Runs all `.rock` programs in the directory, in file name order
    pub fn run_all(&self) -> io::Result<SnapshotReport> {
        let mut programs: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == "rock"))
            .collect();
        programs.sort();

        let mut report = SnapshotReport::default();
        for path in programs {
            report.results.push(self.run_program(&path)?);
        }
        Ok(report)
    }

    /// Runs one program and compares (or records) its snapshot
    pub fn run_program(&self, path: &Path) -> io::Result<SnapshotResult> {
        let start = Instant::now();
        let source = fs::read_to_string(path)?;
        let input_path = path.with_extension("in");
        let input = if input_path.exists() { fs::read_to_string(&input_path)? } else { String::new() };

        // Diagnostics name the bare file so snapshots do not depend on the directory
        let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let actual = capture_run(&source, &file_name, input);

        let expected_path = path.with_extension("out");
        let expected = if expected_path.exists() && !self.update {
            fs::read_to_string(&expected_path)?.trim().to_string()
        } else {
            debug!("writing snapshot {}", expected_path.display());
            fs::write(&expected_path, format!("{}\n", actual))?;
            actual.clone()
        };

        Ok(SnapshotResult {
            path: path.to_path_buf(),
            passed: actual == expected,
            expected,
            actual,
            duration: start.elapsed(),
        })
    }
}

/// Parses and runs a program, returning everything it printed plus any
/// error report, trimmed
fn capture_run(source: &str, file_name: &str, input: String) -> String {
    let mut transcript = String::new();

    match parse_source(source, file_name) {
        Err(errors) => {
            for err in errors {
                transcript.push_str(&format!("{}\n", err.plain()));
            }
            transcript.push_str("Failed to parse input file\n");
        }
        Ok(program) => {
            let buffer = Arc::new(Mutex::new(Vec::new()));
            let mut interp = Interpreter::new();
            interp.set_output(buffer.clone());
            interp.set_input(Box::new(Cursor::new(input.into_bytes())));

            let result = interp.run(&program);

            let lock = buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            transcript.push_str(&String::from_utf8_lossy(&lock));
            if let Err(err) = result {
                transcript.push_str(&format!("Runtime Error: {}\n", err));
            }
        }
    }

    transcript.trim().to_string()
}
