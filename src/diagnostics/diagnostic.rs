use crate::value::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What kind of problem ended a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    OutOfMemory,
    StackOverflow,
    IndexOutOfBounds,
    DivisionByZero,
    Arithmetic,
    InvalidInput,
    Output,
    Library,
    Unhandled,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::OutOfMemory => "out of memory",
            DiagnosticKind::StackOverflow => "stack overflow",
            DiagnosticKind::IndexOutOfBounds => "index out of bounds",
            DiagnosticKind::DivisionByZero => "division by zero",
            DiagnosticKind::Arithmetic => "arithmetic error",
            DiagnosticKind::InvalidInput => "invalid input",
            DiagnosticKind::Output => "output error",
            DiagnosticKind::Library => "library error",
            DiagnosticKind::Unhandled => "unhandled error",
        };
        write!(f, "{}", s)
    }
}

/// A positioned description of the fault that ended a run.
///
/// `line` and `column` are 0 while unknown; the worker fills them from the
/// last executed position before the diagnostic reaches the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message} (line {line}, column {column})")]
pub struct DiagnosticError {
    pub kind: DiagnosticKind,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl DiagnosticError {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: 0,
            column: 0,
            message: message.into(),
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Fill whichever coordinate is still unknown.
    pub fn fill_position(&mut self, line: u32, column: u32) {
        if self.line == 0 {
            self.line = line;
        }
        if self.column == 0 {
            self.column = column;
        }
    }

    pub fn out_of_memory() -> Self {
        Self::new(
            DiagnosticKind::OutOfMemory,
            "The program ran out of memory. Check for data structures that grow without bound.",
        )
    }

    pub fn stack_overflow() -> Self {
        Self::new(
            DiagnosticKind::StackOverflow,
            "Stack overflow. This usually means a function calls itself without reaching a stopping condition.",
        )
    }

    pub fn invalid_input(expected: DataType) -> Self {
        Self::new(
            DiagnosticKind::InvalidInput,
            format!("The value entered is not a valid {}", expected),
        )
    }

    pub fn unhandled(detail: impl fmt::Display) -> Self {
        Self::new(
            DiagnosticKind::Unhandled,
            format!("An unhandled error occurred during execution: {}", detail),
        )
    }
}
