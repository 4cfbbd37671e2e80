//! Blocking input reads mediated through an external provider.
//!
//! A read hands the provider a one-shot [`InputHandle`] and then blocks the
//! program thread until the handle is settled, the run is force-continued
//! past the read, or the run is interrupted.

use crate::diagnostics::{DiagnosticError, Fault};
use crate::runtime::supervisor::Shared;
use crate::value::{DataType, Value};
use std::sync::{Arc, PoisonError, Weak};
use tracing::debug;

/// Source of values for the program's read operations.
///
/// `request_input` may settle the handle before returning, or keep it and
/// settle it later from any thread. Dropping the handle unsettled cancels
/// the read.
pub trait InputProvider: Send + Sync {
    fn request_input(&self, data_type: DataType, handle: InputHandle);
}

#[derive(Debug, Default)]
pub(crate) enum ReadOutcome {
    #[default]
    Pending,
    Supplied(Value),
    Cancelled,
}

#[derive(Debug, Default)]
pub(crate) struct ReadState {
    pub(crate) awaiting: bool,
    /// Set when the run is resumed while this read is pending.
    pub(crate) abandoned: bool,
    pub(crate) ticket: u64,
    pub(crate) outcome: ReadOutcome,
}

impl ReadState {
    fn is_waiting(&self) -> bool {
        matches!(self.outcome, ReadOutcome::Pending) && !self.abandoned
    }
}

/// One-shot answer to a single read request.
#[derive(Debug)]
pub struct InputHandle {
    shared: Weak<Shared>,
    ticket: u64,
    data_type: DataType,
    settled: bool,
}

impl InputHandle {
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Answer the read. The value is coerced to the requested type by the
    /// reading thread; a value that does not fit becomes an invalid-input
    /// error.
    pub fn supply(mut self, value: impl Into<Value>) {
        self.settle(ReadOutcome::Supplied(value.into()));
    }

    pub fn cancel(mut self) {
        self.settle(ReadOutcome::Cancelled);
    }

    fn settle(&mut self, outcome: ReadOutcome) {
        self.settled = true;
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let mut state = shared.lock();
        let read = &mut state.read;
        if !read.awaiting || read.ticket != self.ticket || !read.is_waiting() {
            debug!(ticket = self.ticket, "Ignoring answer to a finished read");
            return;
        }
        read.outcome = outcome;
        drop(state);
        shared.signal.notify_all();
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(ReadOutcome::Cancelled);
        }
    }
}

// Clears the awaiting flag and reports `resumed` however the read ends.
struct ReadGuard<'a> {
    shared: &'a Shared,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock();
            state.read.awaiting = false;
            state.read.outcome = ReadOutcome::Pending;
        }
        self.shared.observers.notify_resumed();
    }
}

pub(crate) fn request(shared: &Arc<Shared>, data_type: DataType) -> Result<Value, Fault> {
    let ticket = {
        let mut state = shared.lock();
        if state.interrupt_requested {
            return Err(Fault::Interrupted);
        }
        let read = &mut state.read;
        read.ticket += 1;
        read.awaiting = true;
        read.abandoned = false;
        read.outcome = ReadOutcome::Pending;
        read.ticket
    };
    let _guard = ReadGuard { shared };

    let handle = InputHandle {
        shared: Arc::downgrade(shared),
        ticket,
        data_type,
        settled: false,
    };
    shared.input().request_input(data_type, handle);

    let mut state = shared.lock();
    if state.read.is_waiting() && !state.interrupt_requested {
        drop(state);
        debug!(%data_type, ticket, "Waiting for input");
        shared.observers.notify_paused();
        state = shared
            .signal
            .wait_while(shared.lock(), |s| {
                s.read.is_waiting() && !s.interrupt_requested
            })
            .unwrap_or_else(PoisonError::into_inner);
    }

    if state.interrupt_requested {
        return Err(Fault::Interrupted);
    }
    let abandoned = state.read.abandoned;
    let outcome = std::mem::take(&mut state.read.outcome);
    drop(state);

    match outcome {
        ReadOutcome::Supplied(value) if !abandoned => value
            .coerce_to(data_type)
            .ok_or_else(|| DiagnosticError::invalid_input(data_type).into()),
        ReadOutcome::Supplied(_) | ReadOutcome::Pending => {
            debug!(%data_type, "Read abandoned by resume");
            Err(DiagnosticError::invalid_input(data_type).into())
        }
        ReadOutcome::Cancelled => {
            debug!(%data_type, "Read cancelled by provider");
            Err(DiagnosticError::invalid_input(data_type).into())
        }
    }
}
