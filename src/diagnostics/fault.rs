use super::diagnostic::DiagnosticError;
use crate::runtime::library::LibraryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The class of a runtime fault; translators are registered per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultClass {
    IndexOutOfBounds,
    Arithmetic,
    NullReference,
    InvalidConversion,
    IllegalArgument,
    Unsupported,
}

impl fmt::Display for FaultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FaultClass::IndexOutOfBounds => "IndexOutOfBounds",
            FaultClass::Arithmetic => "Arithmetic",
            FaultClass::NullReference => "NullReference",
            FaultClass::InvalidConversion => "InvalidConversion",
            FaultClass::IllegalArgument => "IllegalArgument",
            FaultClass::Unsupported => "Unsupported",
        };
        write!(f, "{}", s)
    }
}

/// A low-level fault raised by generated program logic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{class}: {message}")]
pub struct RuntimeFault {
    pub class: FaultClass,
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
    /// Offending index, for [`FaultClass::IndexOutOfBounds`].
    pub index: Option<i64>,
    /// Length of the indexed collection, when known.
    pub length: Option<usize>,
}

impl RuntimeFault {
    pub fn new(class: FaultClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
            line: None,
            column: None,
            index: None,
            length: None,
        }
    }

    pub fn index_out_of_bounds(index: i64, length: usize) -> Self {
        Self {
            index: Some(index),
            length: Some(length),
            ..Self::new(
                FaultClass::IndexOutOfBounds,
                format!("index {} out of bounds for length {}", index, length),
            )
        }
    }

    pub fn division_by_zero() -> Self {
        Self::new(FaultClass::Arithmetic, "/ by zero")
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

/// Every way a program body can stop abnormally.
#[derive(Debug, Error)]
pub enum Fault {
    #[error("out of memory")]
    OutOfMemory,

    #[error("stack overflow")]
    StackOverflow,

    #[error("execution interrupted")]
    Interrupted,

    #[error(transparent)]
    Runtime(#[from] RuntimeFault),

    #[error(transparent)]
    Diagnostic(#[from] DiagnosticError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error("panic: {0}")]
    Panic(String),
}

