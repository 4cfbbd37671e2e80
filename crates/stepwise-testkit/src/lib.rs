//! Test doubles for driving a [`Supervisor`](stepwise::runtime::Supervisor)
//! from tests and benches.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use stepwise::debugger::ExecutionObserver;
use stepwise::protocol::RunEvent;
use stepwise::runtime::{
    ExecutionResult, InputHandle, InputProvider, Library, LibraryError, OutputError, OutputSink,
    ProgramInfo,
};
use stepwise::value::{DataType, Value};

/// Generous upper bound for waits in tests.
pub const WAIT: Duration = Duration::from_secs(10);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type PausedHook = Box<dyn Fn() + Send + Sync>;

/// Records every notification in order.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RunEvent>>,
    changed: Condvar,
    on_paused: Mutex<Option<PausedHook>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn handle(self: &Arc<Self>) -> Arc<dyn ExecutionObserver> {
        self.clone()
    }

    /// Run `hook` from inside every `paused` callback.
    pub fn on_paused(&self, hook: impl Fn() + Send + Sync + 'static) {
        *lock(&self.on_paused) = Some(Box::new(hook));
    }

    pub fn events(&self) -> Vec<RunEvent> {
        lock(&self.events).clone()
    }

    pub fn count(&self, pred: impl Fn(&RunEvent) -> bool) -> usize {
        lock(&self.events).iter().filter(|e| pred(e)).count()
    }

    /// Wait until `pred` holds for the recorded events. False on timeout.
    pub fn wait_until(&self, timeout: Duration, pred: impl Fn(&[RunEvent]) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        let mut events = lock(&self.events);
        while !pred(events.as_slice()) {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            events = self
                .changed
                .wait_timeout(events, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    /// Wait for `line_highlighted` to have been seen `n` times.
    pub fn wait_for_highlights(&self, n: usize) -> bool {
        self.wait_until(WAIT, |events| {
            events
                .iter()
                .filter(|e| matches!(e, RunEvent::LineHighlighted { .. }))
                .count()
                >= n
        })
    }

    /// Wait for `paused` to have been seen `n` times.
    pub fn wait_for_pauses(&self, n: usize) -> bool {
        self.wait_until(WAIT, |events| {
            events.iter().filter(|e| **e == RunEvent::Paused).count() >= n
        })
    }

    /// Wait for the run to end and return its result.
    pub fn wait_for_end(&self) -> Option<ExecutionResult> {
        let ended = self.wait_until(WAIT, |events| {
            events.iter().any(|e| matches!(e, RunEvent::Ended { .. }))
        });
        if !ended {
            return None;
        }
        lock(&self.events).iter().find_map(|e| match e {
            RunEvent::Ended { result } => Some(result.clone()),
            _ => None,
        })
    }

    fn push(&self, event: RunEvent) {
        lock(&self.events).push(event);
        self.changed.notify_all();
    }
}

impl ExecutionObserver for RecordingObserver {
    fn started(&self) {
        self.push(RunEvent::Started);
    }

    fn paused(&self) {
        self.push(RunEvent::Paused);
        if let Some(hook) = lock(&self.on_paused).as_ref() {
            hook();
        }
    }

    fn resumed(&self) {
        self.push(RunEvent::Resumed);
    }

    fn line_highlighted(&self, line: u32) {
        self.push(RunEvent::LineHighlighted { line });
    }

    fn ended(&self, result: &ExecutionResult) {
        self.push(RunEvent::Ended {
            result: result.clone(),
        });
    }
}

/// Answers reads synchronously from a queue; cancels once it runs dry.
#[derive(Default)]
pub struct ScriptedInput {
    values: Mutex<VecDeque<Value>>,
    requests: Mutex<Vec<DataType>>,
}

impl ScriptedInput {
    pub fn new<I, V>(values: I) -> Arc<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Arc::new(Self {
            values: Mutex::new(values.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<DataType> {
        lock(&self.requests).clone()
    }
}

impl InputProvider for ScriptedInput {
    fn request_input(&self, data_type: DataType, handle: InputHandle) {
        lock(&self.requests).push(data_type);
        match lock(&self.values).pop_front() {
            Some(value) => handle.supply(value),
            None => handle.cancel(),
        }
    }
}

/// Keeps every handle so the test decides when and how to answer.
#[derive(Default)]
pub struct PendingInput {
    handles: Mutex<VecDeque<InputHandle>>,
    requested: Condvar,
    requests: AtomicUsize,
}

impl PendingInput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Wait for the next unanswered handle.
    pub fn next_handle(&self) -> Option<InputHandle> {
        let (mut handles, _) = self
            .requested
            .wait_timeout_while(lock(&self.handles), WAIT, |h| h.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
        handles.pop_front()
    }
}

impl InputProvider for PendingInput {
    fn request_input(&self, _data_type: DataType, handle: InputHandle) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        lock(&self.handles).push_back(handle);
        self.requested.notify_all();
    }
}

/// Collects written values in memory.
#[derive(Default)]
pub struct MemoryOutput {
    values: Mutex<Vec<Value>>,
    clears: AtomicUsize,
    fail_clear: AtomicBool,
    fail_write: AtomicBool,
}

impl MemoryOutput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_clear() -> Arc<Self> {
        let sink = Self::default();
        sink.fail_clear.store(true, Ordering::SeqCst);
        Arc::new(sink)
    }

    pub fn failing_write() -> Arc<Self> {
        let sink = Self::default();
        sink.fail_write.store(true, Ordering::SeqCst);
        Arc::new(sink)
    }

    pub fn values(&self) -> Vec<Value> {
        lock(&self.values).clone()
    }

    /// Everything written, concatenated as the console would show it.
    pub fn text(&self) -> String {
        lock(&self.values).iter().map(ToString::to_string).collect()
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl OutputSink for MemoryOutput {
    fn write(&self, value: &Value) -> Result<(), OutputError> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(OutputError("sink closed".to_string()));
        }
        lock(&self.values).push(value.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), OutputError> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(OutputError("cannot clear".to_string()));
        }
        self.clears.fetch_add(1, Ordering::SeqCst);
        lock(&self.values).clear();
        Ok(())
    }
}

/// How a [`CountingLibrary`] misbehaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LibraryFailure {
    #[default]
    None,
    Initialize,
    InitializePanic,
    Finalize,
    FinalizePanic,
}

/// Library that counts lifecycle calls.
pub struct CountingLibrary {
    name: String,
    failure: LibraryFailure,
    initialized: AtomicUsize,
    finalized: AtomicUsize,
}

impl CountingLibrary {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::failing(name, LibraryFailure::None)
    }

    pub fn failing(name: impl Into<String>, failure: LibraryFailure) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            failure,
            initialized: AtomicUsize::new(0),
            finalized: AtomicUsize::new(0),
        })
    }

    pub fn initialized(&self) -> usize {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn finalized(&self) -> usize {
        self.finalized.load(Ordering::SeqCst)
    }
}

impl Library for CountingLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(
        &self,
        _program: &ProgramInfo,
        _libraries: &[Arc<dyn Library>],
    ) -> Result<(), LibraryError> {
        self.initialized.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            LibraryFailure::Initialize => {
                Err(LibraryError::new(&self.name, "initialization refused"))
            }
            LibraryFailure::InitializePanic => panic!("{} exploded while initializing", self.name),
            _ => Ok(()),
        }
    }

    fn finalize(&self) -> Result<(), LibraryError> {
        self.finalized.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            LibraryFailure::Finalize => Err(LibraryError::new(&self.name, "finalization refused")),
            LibraryFailure::FinalizePanic => panic!("{} exploded while finalizing", self.name),
            _ => Ok(()),
        }
    }
}
