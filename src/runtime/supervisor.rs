//! The controller-facing handle of a compiled program.
//!
//! A [`Supervisor`] lives as long as the program and starts, pauses, resumes
//! and interrupts its runs. Each run executes on a pooled worker thread; the
//! controller and the worker meet at a single mutex-protected
//! [`ControlState`] paired with one condition variable.

use crate::console::ConsoleIo;
use crate::debugger::{BreakpointTable, DebugMode, ExecutionObserver, ObserverSet};
use crate::diagnostics::{Fault, TranslatorRegistry};
use crate::error::{Result, RuntimeError};
use crate::inspector::InspectionSnapshot;
use crate::runtime::input::{InputProvider, ReadState};
use crate::runtime::output::OutputSink;
use crate::runtime::pool::WorkerPool;
use crate::runtime::program::{Program, ProgramInfo};
use crate::runtime::result::ExecutionResult;
use crate::runtime::worker::WorkerTask;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, error, info};

/// Mutable run state guarded by [`Shared::control`].
#[derive(Debug)]
pub(crate) struct ControlState {
    pub(crate) mode: DebugMode,
    pub(crate) breakpoints: BreakpointTable,
    pub(crate) worker_alive: bool,
    pub(crate) interrupt_requested: bool,
    /// Bumped by every `resume`; a paused worker waits for it to change.
    pub(crate) resume_generation: u64,
    pub(crate) last_line: u32,
    pub(crate) last_column: u32,
    pub(crate) read: ReadState,
}

impl ControlState {
    fn new(line_count: usize) -> Self {
        Self {
            mode: DebugMode::default(),
            breakpoints: BreakpointTable::new(line_count),
            worker_alive: false,
            interrupt_requested: false,
            resume_generation: 0,
            last_line: 0,
            last_column: 0,
            read: ReadState::default(),
        }
    }

    fn is_running(&self) -> bool {
        self.worker_alive && !self.interrupt_requested
    }
}

/// State shared between a supervisor and the worker running its program.
pub(crate) struct Shared {
    pub(crate) info: ProgramInfo,
    pub(crate) program: Arc<dyn Program>,
    pub(crate) control: Mutex<ControlState>,
    pub(crate) signal: Condvar,
    pub(crate) observers: ObserverSet,
    pub(crate) snapshot: InspectionSnapshot,
    pub(crate) translators: Arc<TranslatorRegistry>,
    input: RwLock<Arc<dyn InputProvider>>,
    output: RwLock<Arc<dyn OutputSink>>,
    working_dir: RwLock<PathBuf>,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn input(&self) -> Arc<dyn InputProvider> {
        Arc::clone(&self.input.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn output(&self) -> Arc<dyn OutputSink> {
        Arc::clone(&self.output.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn is_interrupted(&self) -> bool {
        self.lock().interrupt_requested
    }

    pub(crate) fn last_position(&self) -> (u32, u32) {
        let state = self.lock();
        (state.last_line, state.last_column)
    }

    pub(crate) fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        self.working_dir
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .join(path)
    }

    /// Record the current position and block here if the debugger says so.
    pub(crate) fn pause_at(&self, line: u32, column: u32) -> std::result::Result<(), Fault> {
        let generation = {
            let mut state = self.lock();
            state.last_line = line;
            state.last_column = column;
            if state.interrupt_requested {
                return Err(Fault::Interrupted);
            }
            if !state.breakpoints.should_pause(state.mode, line) {
                return Ok(());
            }
            state.resume_generation
        };

        debug!(line, column, "Paused");
        self.observers.notify_paused();
        self.observers.notify_line_highlighted(line);

        let state = self
            .signal
            .wait_while(self.lock(), |s| {
                s.resume_generation == generation && !s.interrupt_requested
            })
            .unwrap_or_else(PoisonError::into_inner);
        let interrupted = state.interrupt_requested;
        let mode = state.mode;
        drop(state);

        debug!(line, %mode, interrupted, "Resumed");
        self.observers.notify_resumed();
        if interrupted {
            Err(Fault::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Mark the worker finished and deliver `ended` to the current observers.
    ///
    /// Observers are drained while the worker still counts as alive; one
    /// added after `is_running` turns false belongs to the next run.
    pub(crate) fn finish(&self, result: ExecutionResult) {
        let observers = self.observers.drain();
        self.lock().worker_alive = false;
        info!(
            program = %self.info.name,
            termination = %result.termination,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Run ended"
        );
        for observer in observers {
            if panic::catch_unwind(AssertUnwindSafe(|| observer.ended(&result))).is_err() {
                error!("Observer panicked while handling the end of a run");
            }
        }
    }
}

/// Controls the runs of one compiled program.
pub struct Supervisor {
    shared: Arc<Shared>,
    pool: Arc<WorkerPool>,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("program", &self.shared.info.name)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    /// Supervisor with the shared worker pool, the standard translators and
    /// console input/output.
    pub fn new(program: impl Program + 'static, info: ProgramInfo) -> Result<Self> {
        Self::builder(program, info).build()
    }

    pub fn builder(program: impl Program + 'static, info: ProgramInfo) -> SupervisorBuilder {
        SupervisorBuilder {
            program: Arc::new(program),
            info,
            pool: None,
            translators: None,
            input: None,
            output: None,
            working_dir: None,
        }
    }

    pub fn info(&self) -> &ProgramInfo {
        &self.shared.info
    }

    /// Start a run. Does nothing while a previous run's worker is alive.
    pub fn start(&self, args: &[String], mode: DebugMode) {
        {
            let mut state = self.shared.lock();
            if state.worker_alive {
                debug!(program = %self.shared.info.name, "Start ignored: a run is active");
                return;
            }
            state.interrupt_requested = false;
            state.mode = mode;
            state.worker_alive = true;
            state.last_line = 0;
            state.last_column = 0;
        }

        info!(program = %self.shared.info.name, %mode, "Starting run");
        let task = WorkerTask::new(Arc::clone(&self.shared), args.to_vec());
        self.pool.submit(move || task.run());
    }

    /// Resume a paused run in `mode`.
    ///
    /// A read that is still waiting for input is abandoned and fails with
    /// an invalid-input error.
    pub fn resume(&self, mode: DebugMode) -> Result<()> {
        let mut state = self.shared.lock();
        if !state.is_running() {
            return Err(RuntimeError::IllegalState(format!(
                "cannot resume '{}': no run is active",
                self.shared.info.name
            )));
        }
        state.mode = mode;
        if state.read.awaiting {
            state.read.abandoned = true;
        }
        state.resume_generation = state.resume_generation.wrapping_add(1);
        drop(state);

        self.shared.signal.notify_all();
        Ok(())
    }

    /// Ask the active run to stop at its next pause point or read.
    pub fn interrupt(&self) {
        let mut state = self.shared.lock();
        if !state.worker_alive || state.interrupt_requested {
            return;
        }
        state.interrupt_requested = true;
        drop(state);

        info!(program = %self.shared.info.name, "Interrupt requested");
        self.shared.signal.notify_all();
    }

    /// True while a worker is alive and no interrupt has been requested.
    pub fn is_running(&self) -> bool {
        self.shared.lock().is_running()
    }

    /// Replace the active breakpoints. Lines outside the program are ignored.
    pub fn activate_breakpoints<I>(&self, lines: I)
    where
        I: IntoIterator<Item = u32>,
    {
        self.shared.lock().breakpoints.activate(lines);
    }

    pub fn breakpoints(&self) -> Vec<u32> {
        self.shared.lock().breakpoints.active_lines()
    }

    pub fn can_pause(&self, line: u32) -> bool {
        let state = self.shared.lock();
        state.breakpoints.should_pause(state.mode, line)
    }

    pub fn debug_mode(&self) -> DebugMode {
        self.shared.lock().mode
    }

    /// The last pausable position the program reported, `(0, 0)` before any.
    pub fn last_position(&self) -> (u32, u32) {
        self.shared.last_position()
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.shared.lock().read.awaiting
    }

    pub fn add_observer(&self, observer: Arc<dyn ExecutionObserver>) {
        self.shared.observers.add(observer);
    }

    pub fn remove_observer(&self, observer: &Arc<dyn ExecutionObserver>) {
        self.shared.observers.remove(observer);
    }

    pub fn inspection(&self) -> &InspectionSnapshot {
        &self.shared.snapshot
    }

    /// Size the inspection collections. Call before the first run.
    pub fn configure_inspection(&self, scalars: usize, vectors: usize, matrices: usize) {
        self.shared.snapshot.configure(scalars, vectors, matrices);
    }

    pub fn set_input(&self, provider: Arc<dyn InputProvider>) {
        *self
            .shared
            .input
            .write()
            .unwrap_or_else(PoisonError::into_inner) = provider;
    }

    pub fn set_output(&self, sink: Arc<dyn OutputSink>) {
        *self
            .shared
            .output
            .write()
            .unwrap_or_else(PoisonError::into_inner) = sink;
    }

    pub fn set_working_directory(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(RuntimeError::InvalidWorkingDirectory(path.to_path_buf()));
        }
        *self
            .shared
            .working_dir
            .write()
            .unwrap_or_else(PoisonError::into_inner) = path.to_path_buf();
        Ok(())
    }

    pub fn working_directory(&self) -> PathBuf {
        self.shared
            .working_dir
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolve `path` against the working directory unless it is absolute.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.shared.resolve_path(path.as_ref())
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.interrupt();
    }
}

pub struct SupervisorBuilder {
    program: Arc<dyn Program>,
    info: ProgramInfo,
    pool: Option<Arc<WorkerPool>>,
    translators: Option<Arc<TranslatorRegistry>>,
    input: Option<Arc<dyn InputProvider>>,
    output: Option<Arc<dyn OutputSink>>,
    working_dir: Option<PathBuf>,
}

impl SupervisorBuilder {
    pub fn pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn translators(mut self, translators: Arc<TranslatorRegistry>) -> Self {
        self.translators = Some(translators);
        self
    }

    pub fn input(mut self, provider: Arc<dyn InputProvider>) -> Self {
        self.input = Some(provider);
        self
    }

    pub fn output(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.output = Some(sink);
        self
    }

    pub fn working_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Supervisor> {
        let pool = match self.pool {
            Some(pool) => pool,
            None => WorkerPool::shared()?,
        };
        let working_dir = match self.working_dir {
            Some(dir) if !dir.is_dir() => return Err(RuntimeError::InvalidWorkingDirectory(dir)),
            Some(dir) => dir,
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };

        let console = Arc::new(ConsoleIo::new());
        let input: Arc<dyn InputProvider> = match self.input {
            Some(provider) => provider,
            None => console.clone(),
        };
        let output: Arc<dyn OutputSink> = match self.output {
            Some(sink) => sink,
            None => console,
        };

        let shared = Shared {
            control: Mutex::new(ControlState::new(self.info.line_count)),
            signal: Condvar::new(),
            observers: ObserverSet::new(),
            snapshot: InspectionSnapshot::new(),
            translators: self.translators.unwrap_or_else(TranslatorRegistry::standard),
            program: self.program,
            info: self.info,
            input: RwLock::new(input),
            output: RwLock::new(output),
            working_dir: RwLock::new(working_dir),
        };
        debug!(program = %shared.info.name, "Supervisor created");
        Ok(Supervisor {
            shared: Arc::new(shared),
            pool,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::program::from_fn;
    use std::sync::mpsc;
    use std::time::Duration;

    struct EndSignal(Mutex<Option<mpsc::Sender<ExecutionResult>>>);

    impl ExecutionObserver for EndSignal {
        fn ended(&self, result: &ExecutionResult) {
            if let Some(tx) = self.0.lock().unwrap().take() {
                tx.send(result.clone()).unwrap();
            }
        }
    }

    fn idle_supervisor() -> Supervisor {
        let body = from_fn(|_ctx, _args| Ok(()));
        Supervisor::new(body, ProgramInfo::new("idle", 10)).unwrap()
    }

    #[test]
    fn test_idle_supervisor_state() {
        let sup = idle_supervisor();
        assert!(!sup.is_running());
        sup.interrupt();
        assert!(!sup.is_running());
        assert!(matches!(
            sup.resume(DebugMode::StepOver),
            Err(RuntimeError::IllegalState(_))
        ));
        assert_eq!(sup.last_position(), (0, 0));
    }

    #[test]
    fn test_can_pause_follows_mode() {
        let sup = idle_supervisor();
        sup.activate_breakpoints([2, 40]);
        assert_eq!(sup.breakpoints(), vec![2]);
        assert!(!sup.can_pause(2));
    }

    #[test]
    fn test_run_to_completion() {
        let body = from_fn(|ctx, _args| {
            ctx.pause_point(1, 1)?;
            ctx.pause_point(2, 5)
        });
        let sup = Supervisor::new(body, ProgramInfo::new("plain", 3)).unwrap();
        let (tx, rx) = mpsc::channel();
        sup.add_observer(Arc::new(EndSignal(Mutex::new(Some(tx)))));
        sup.start(&[], DebugMode::Stopped);

        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(result.is_success());
        assert_eq!(sup.last_position(), (2, 5));
        assert!(!sup.is_running());
    }

    #[test]
    fn test_working_directory_must_exist() {
        let sup = idle_supervisor();
        let err = sup.set_working_directory("/no/such/dir/for/stepwise").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidWorkingDirectory(_)));

        let dir = tempfile::tempdir().unwrap();
        sup.set_working_directory(dir.path()).unwrap();
        assert_eq!(sup.resolve_path("data.txt"), dir.path().join("data.txt"));
        assert_eq!(sup.resolve_path("/abs/x"), PathBuf::from("/abs/x"));
    }
}
