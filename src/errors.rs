// File: src/errors.rs
//
// Error handling and reporting for the Rockstar interpreter.
// Syntax errors are structured diagnostics tied to one source line and are
// collected by the parser driver. Runtime errors abort evaluation.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Where a line lives: file name plus 0-based line number
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: &str, line: usize) -> Self {
        Self { file: file.to_string(), line }
    }

    pub fn unknown() -> Self {
        Self { file: "- Unknown -".to_string(), line: 0 }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.file, self.line)
    }
}

/// A malformed line.
///
/// The line parser creates these with just a message; the driver attaches
/// the file name, line number and source text before reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub location: SourceLocation,
    pub source_line: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: SourceLocation::unknown(),
            source_line: "...".to_string(),
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_source(mut self, source_line: &str) -> Self {
        self.source_line = source_line.to_string();
        self
    }

    /// The same report as `Display`, without terminal colours
    pub fn plain(&self) -> String {
        format!(
            "{}\n{}\n{}: SyntaxError {}",
            self.source_line,
            self.underline(),
            self.location,
            self.message
        )
    }

    /// Caret underline as long as the line itself, in characters
    fn underline(&self) -> String {
        "^".repeat(self.source_line.chars().count())
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.source_line)?;
        writeln!(f, "{}", self.underline().red().bold())?;
        write!(
            f,
            "{}: {} {}",
            self.location.to_string().bright_blue(),
            "SyntaxError".red().bold(),
            self.message.bold()
        )
    }
}

impl std::error::Error for SyntaxError {}

/// Fatal evaluation errors; the first one aborts the run
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Cannot find function of name {0}")]
    UnknownFunction(String),

    #[error("Variable used before assignment: {0}")]
    UndefinedVariable(String),

    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    #[error("Cannot {op} {left} and {right}")]
    InvalidOperands { op: String, left: String, right: String },

    #[error("Cannot repeat a string of {len} bytes {count} times")]
    StringTooLong { len: usize, count: i64 },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Cannot turn {variable}: {value} is not a number")]
    InvalidTurn { variable: String, value: String },

    #[error("Reached end of input while listening to {0}")]
    EndOfInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_report_has_line_caret_and_location() {
        let err = SyntaxError::new("Cannot parse line")
            .with_location(SourceLocation::new("song.rock", 3))
            .with_source("Whatever man");
        let report = err.plain();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines, vec![
            "Whatever man",
            "^^^^^^^^^^^^",
            "song.rock(3): SyntaxError Cannot parse line",
        ]);

        let colored = err.to_string();
        assert!(colored.contains("Whatever man"));
        assert!(colored.contains("^^^^^^^^^^^^"));
        assert!(colored.contains("Cannot parse line"));
    }

    #[test]
    fn runtime_error_messages_name_the_culprit() {
        let err = RuntimeError::UnknownFunction("Midnight".to_string());
        assert_eq!(err.to_string(), "Cannot find function of name Midnight");
        let err = RuntimeError::UndefinedVariable("my#heart".to_string());
        assert!(err.to_string().contains("my#heart"));
    }
}
