//! Fault-class → diagnostic translation.
//!
//! The registry is an immutable table. The standard table is built once per
//! process and shared by reference count; custom tables are assembled with
//! [`TranslatorRegistry::builder`] before any supervisor uses them.

use super::diagnostic::{DiagnosticError, DiagnosticKind};
use super::fault::{FaultClass, RuntimeFault};
use crate::runtime::program::ProgramInfo;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Builds a positioned diagnostic for one class of runtime fault.
pub trait Translator: Send + Sync {
    fn translate(
        &self,
        fault: &RuntimeFault,
        program: &ProgramInfo,
        line: u32,
        column: u32,
    ) -> DiagnosticError;
}

impl<F> Translator for F
where
    F: Fn(&RuntimeFault, &ProgramInfo, u32, u32) -> DiagnosticError + Send + Sync,
{
    fn translate(
        &self,
        fault: &RuntimeFault,
        program: &ProgramInfo,
        line: u32,
        column: u32,
    ) -> DiagnosticError {
        self(fault, program, line, column)
    }
}

/// Translates out-of-range vector and matrix accesses.
pub struct IndexOutOfBoundsTranslator;

impl Translator for IndexOutOfBoundsTranslator {
    fn translate(
        &self,
        fault: &RuntimeFault,
        _program: &ProgramInfo,
        line: u32,
        column: u32,
    ) -> DiagnosticError {
        let message = match (fault.index, fault.length) {
            (Some(index), Some(0)) => format!(
                "The index [{}] is invalid: the vector has no elements",
                index
            ),
            (Some(index), Some(length)) => format!(
                "The index [{}] is invalid: valid indices range from 0 to {}",
                index,
                length - 1
            ),
            (Some(index), None) => format!("The index [{}] is invalid", index),
            (None, _) => "An invalid index was used to access a vector or matrix".to_string(),
        };
        DiagnosticError::new(DiagnosticKind::IndexOutOfBounds, message).at(line, column)
    }
}

/// Translates arithmetic faults; division by zero gets a dedicated kind.
pub struct ArithmeticTranslator;

impl Translator for ArithmeticTranslator {
    fn translate(
        &self,
        fault: &RuntimeFault,
        _program: &ProgramInfo,
        line: u32,
        column: u32,
    ) -> DiagnosticError {
        let diagnostic = if fault.message.contains("by zero") {
            DiagnosticError::new(
                DiagnosticKind::DivisionByZero,
                "Division by zero is not allowed",
            )
        } else {
            DiagnosticError::new(
                DiagnosticKind::Arithmetic,
                format!("Arithmetic error: {}", fault.message),
            )
        };
        diagnostic.at(line, column)
    }
}

pub struct TranslatorRegistry {
    translators: HashMap<FaultClass, Box<dyn Translator>>,
}

impl fmt::Debug for TranslatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorRegistry")
            .field("classes", &self.translators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TranslatorRegistry {
    pub fn builder() -> TranslatorRegistryBuilder {
        TranslatorRegistryBuilder {
            translators: HashMap::new(),
        }
    }

    /// The process-wide table with the built-in translators.
    pub fn standard() -> Arc<TranslatorRegistry> {
        static STANDARD: OnceLock<Arc<TranslatorRegistry>> = OnceLock::new();
        Arc::clone(STANDARD.get_or_init(|| {
            Arc::new(
                Self::builder()
                    .register(FaultClass::IndexOutOfBounds, IndexOutOfBoundsTranslator)
                    .register(FaultClass::Arithmetic, ArithmeticTranslator)
                    .build(),
            )
        }))
    }

    pub fn is_registered(&self, class: FaultClass) -> bool {
        self.translators.contains_key(&class)
    }

    /// Translate `fault`, falling back to the generic unhandled diagnostic.
    ///
    /// The fault's own position wins over `(last_line, last_column)`; any
    /// coordinate still unknown afterwards is filled from the last position.
    pub fn translate(
        &self,
        fault: &RuntimeFault,
        program: &ProgramInfo,
        last_line: u32,
        last_column: u32,
    ) -> DiagnosticError {
        let line = fault.line.unwrap_or(last_line);
        let column = fault.column.unwrap_or(last_column);

        let mut diagnostic = match self.translators.get(&fault.class) {
            Some(translator) => translator.translate(fault, program, line, column),
            None => DiagnosticError::unhandled(fault).at(line, column),
        };
        diagnostic.fill_position(last_line, last_column);
        diagnostic
    }
}

pub struct TranslatorRegistryBuilder {
    translators: HashMap<FaultClass, Box<dyn Translator>>,
}

impl TranslatorRegistryBuilder {
    pub fn register(mut self, class: FaultClass, translator: impl Translator + 'static) -> Self {
        self.translators.insert(class, Box::new(translator));
        self
    }

    pub fn build(self) -> TranslatorRegistry {
        TranslatorRegistry {
            translators: self.translators,
        }
    }
}
