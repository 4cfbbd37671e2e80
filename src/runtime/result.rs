//! Result types for a finished run.

use crate::diagnostics::DiagnosticError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Coarse outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationMode {
    Normal,
    Error,
    Interrupted,
}

impl fmt::Display for TerminationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TerminationMode::Normal => "normal",
            TerminationMode::Error => "error",
            TerminationMode::Interrupted => "interrupted",
        };
        write!(f, "{}", s)
    }
}

/// Everything the controller learns about one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub termination: TerminationMode,
    pub error: Option<DiagnosticError>,
    #[serde(rename = "elapsed_ms", with = "millis")]
    pub elapsed: Duration,
}

impl ExecutionResult {
    pub fn normal(elapsed: Duration) -> Self {
        Self {
            termination: TerminationMode::Normal,
            error: None,
            elapsed,
        }
    }

    pub fn interrupted(elapsed: Duration) -> Self {
        Self {
            termination: TerminationMode::Interrupted,
            error: None,
            elapsed,
        }
    }

    pub fn failed(error: DiagnosticError, elapsed: Duration) -> Self {
        Self {
            termination: TerminationMode::Error,
            error: Some(error),
            elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.termination == TerminationMode::Normal
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;

    #[test]
    fn test_serializes_elapsed_as_millis() {
        let result = ExecutionResult::normal(Duration::from_millis(1500));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["termination"], "normal");
        assert_eq!(json["elapsed_ms"], 1500);
        assert!(json["error"].is_null());
    }

    #[test]
    fn test_failed_result_roundtrip_fields() {
        let err = DiagnosticError::new(DiagnosticKind::DivisionByZero, "Division by zero is not allowed")
            .at(4, 9);
        let result = ExecutionResult::failed(err.clone(), Duration::ZERO);
        let json = serde_json::to_string(&result).unwrap();
        let back: ExecutionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.error, Some(err));
        assert!(!back.is_success());
    }
}
