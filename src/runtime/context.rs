use crate::diagnostics::{DiagnosticError, DiagnosticKind, Fault};
use crate::inspector::InspectionSnapshot;
use crate::runtime::input;
use crate::runtime::program::ProgramInfo;
use crate::runtime::supervisor::Shared;
use crate::value::{DataType, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// The program body's view of the runtime during one run.
///
/// Every method that can block (pause points and reads) returns
/// [`Fault::Interrupted`] once the run has been interrupted; bodies are
/// expected to propagate it with `?`.
pub struct ExecutionContext {
    shared: Arc<Shared>,
}

impl ExecutionContext {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Report a pausable position. Blocks while the debugger holds the run
    /// here.
    pub fn pause_point(&mut self, line: u32, column: u32) -> Result<(), Fault> {
        self.shared.pause_at(line, column)
    }

    /// Fail with [`Fault::Interrupted`] if an interrupt has been requested.
    pub fn check_interrupted(&self) -> Result<(), Fault> {
        if self.shared.is_interrupted() {
            Err(Fault::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Read a value of `data_type` from the input provider.
    pub fn read(&mut self, data_type: DataType) -> Result<Value, Fault> {
        input::request(&self.shared, data_type)
    }

    pub fn read_integer(&mut self) -> Result<i64, Fault> {
        match self.read(DataType::Integer)? {
            Value::Integer(i) => Ok(i),
            _ => Err(DiagnosticError::invalid_input(DataType::Integer).into()),
        }
    }

    pub fn read_real(&mut self) -> Result<f64, Fault> {
        match self.read(DataType::Real)? {
            Value::Real(r) => Ok(r),
            _ => Err(DiagnosticError::invalid_input(DataType::Real).into()),
        }
    }

    pub fn read_boolean(&mut self) -> Result<bool, Fault> {
        match self.read(DataType::Boolean)? {
            Value::Boolean(b) => Ok(b),
            _ => Err(DiagnosticError::invalid_input(DataType::Boolean).into()),
        }
    }

    pub fn read_character(&mut self) -> Result<char, Fault> {
        match self.read(DataType::Character)? {
            Value::Character(c) => Ok(c),
            _ => Err(DiagnosticError::invalid_input(DataType::Character).into()),
        }
    }

    pub fn read_text(&mut self) -> Result<String, Fault> {
        match self.read(DataType::Text)? {
            Value::Text(s) => Ok(s),
            _ => Err(DiagnosticError::invalid_input(DataType::Text).into()),
        }
    }

    pub fn write(&mut self, value: impl Into<Value>) -> Result<(), Fault> {
        let value = value.into();
        self.shared.output().write(&value).map_err(|e| {
            warn!(error = %e, "Output sink rejected a write");
            Fault::Diagnostic(DiagnosticError::unhandled(e))
        })
    }

    pub fn clear_output(&mut self) -> Result<(), Fault> {
        self.shared.output().clear().map_err(|e| {
            warn!(error = %e, "Output sink failed to clear");
            Fault::Diagnostic(DiagnosticError::new(
                DiagnosticKind::Output,
                "Execution error while clearing the output",
            ))
        })
    }

    pub fn inspection(&self) -> &InspectionSnapshot {
        &self.shared.snapshot
    }

    pub fn program_info(&self) -> &ProgramInfo {
        &self.shared.info
    }

    /// The last position passed to [`pause_point`](Self::pause_point).
    pub fn position(&self) -> (u32, u32) {
        self.shared.last_position()
    }

    /// Resolve `path` against the supervisor's working directory.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.shared.resolve_path(path.as_ref())
    }
}
