//! Text parsing for console input and command-line arguments.
//!
//! Turns one line typed by the user into a [`Value`] of the requested
//! [`DataType`], and comma-separated line lists (`--breakpoints 3,7`) into
//! line numbers.

use crate::value::{DataType, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("'{text}' is not a valid {expected}")]
    InvalidValue { text: String, expected: DataType },

    #[error("Invalid line number '{0}'")]
    InvalidLine(String),
}

/// Parse `text` as a value of `data_type`.
///
/// Surrounding whitespace is ignored for every type except text, which is
/// taken verbatim minus the trailing line terminator.
pub fn parse_value(text: &str, data_type: DataType) -> Result<Value, ParseError> {
    let line = text.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim();
    let invalid = || ParseError::InvalidValue {
        text: trimmed.to_string(),
        expected: data_type,
    };

    match data_type {
        DataType::Integer => trimmed.parse::<i64>().map(Value::Integer).map_err(|_| invalid()),
        DataType::Real => parse_real(trimmed).map(Value::Real).ok_or_else(invalid),
        DataType::Boolean => parse_boolean(trimmed).map(Value::Boolean).ok_or_else(invalid),
        DataType::Character => {
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Character(c)),
                _ => Err(invalid()),
            }
        }
        DataType::Text => Ok(Value::Text(line.to_string())),
    }
}

/// Parse a comma-separated list of line numbers, e.g. `3,7, 12`.
pub fn parse_line_list(text: &str) -> Result<Vec<u32>, ParseError> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>()
                .map_err(|_| ParseError::InvalidLine(part.to_string()))
        })
        .collect()
}

// ── helpers ──────────────────────────────────────────────────────────────────

// Accepts a decimal comma as well as a point.
fn parse_real(text: &str) -> Option<f64> {
    let normalized = text.replace(',', ".");
    normalized.parse::<f64>().ok().filter(|r| r.is_finite())
}

fn parse_boolean(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "verdadeiro" => Some(true),
        "false" | "falso" => Some(false),
        _ => None,
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
