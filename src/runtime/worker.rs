//! One run of a program on a pooled thread.
//!
//! The task wires together:
//! - library initialization and finalization around the body,
//! - the body itself, isolated with `catch_unwind`; the task as a whole is
//!   isolated too, so every run reaches `finish`,
//! - classification of every abnormal exit into a single
//!   [`ExecutionResult`].

use crate::diagnostics::{DiagnosticError, DiagnosticKind, Fault};
use crate::runtime::context::ExecutionContext;
use crate::runtime::library::{finalize_all, initialize_all};
use crate::runtime::result::ExecutionResult;
use crate::runtime::supervisor::Shared;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Single-use task executing one run.
pub(crate) struct WorkerTask {
    shared: Arc<Shared>,
    args: Vec<String>,
}

impl WorkerTask {
    pub(crate) fn new(shared: Arc<Shared>, args: Vec<String>) -> Self {
        Self { shared, args }
    }

    #[tracing::instrument(skip_all, fields(program = %self.shared.info.name))]
    pub(crate) fn run(self) {
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.execute(started)))
            .unwrap_or_else(|payload| {
                let message = panic_message(payload);
                error!(%message, "Worker task panicked outside the program body");
                let (line, column) = self.shared.last_position();
                let mut diagnostic = DiagnosticError::unhandled(message);
                diagnostic.fill_position(line, column);
                ExecutionResult::failed(diagnostic, started.elapsed())
            });
        self.shared.finish(result);
    }

    fn execute(&self, started: Instant) -> ExecutionResult {
        info!(args = self.args.len(), "Run started");
        self.shared.observers.notify_started();

        let program = Arc::clone(&self.shared.program);
        let libraries = program.libraries();

        // ── Body ──────────────────────────────────────────────────────────────
        let outcome = match initialize_all(&self.shared.info, libraries) {
            Ok(()) => {
                self.shared.snapshot.reset();
                let mut ctx = ExecutionContext::new(Arc::clone(&self.shared));
                panic::catch_unwind(AssertUnwindSafe(|| program.execute(&mut ctx, &self.args)))
                    .unwrap_or_else(|payload| Err(Fault::Panic(panic_message(payload))))
            }
            Err(e) => Err(Fault::Library(e)),
        };

        // ── Cleanup ───────────────────────────────────────────────────────────
        finalize_all(libraries);

        self.classify(outcome, started.elapsed())
    }

    fn classify(&self, outcome: Result<(), Fault>, elapsed: Duration) -> ExecutionResult {
        let fault = match outcome {
            Ok(()) => return ExecutionResult::normal(elapsed),
            Err(fault) => fault,
        };
        let (line, column) = self.shared.last_position();

        let mut diagnostic = match fault {
            Fault::OutOfMemory => DiagnosticError::out_of_memory(),
            Fault::StackOverflow => DiagnosticError::stack_overflow(),
            Fault::Interrupted => {
                debug!(line, column, "Run interrupted");
                return ExecutionResult::interrupted(elapsed);
            }
            Fault::Runtime(fault) => {
                self.shared
                    .translators
                    .translate(&fault, &self.shared.info, line, column)
            }
            Fault::Diagnostic(diagnostic) => diagnostic,
            Fault::Library(e) => DiagnosticError::new(DiagnosticKind::Library, e.to_string()),
            Fault::Panic(message) => {
                warn!(%message, "Program body panicked");
                DiagnosticError::unhandled(message)
            }
        };
        diagnostic.fill_position(line, column);
        debug!(kind = %diagnostic.kind, line = diagnostic.line, "Run failed");
        ExecutionResult::failed(diagnostic, elapsed)
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new("owned".to_string())), "owned");
        assert_eq!(panic_message(Box::new(42_u8)), "unknown panic");
    }
}
