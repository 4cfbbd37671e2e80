use crate::runtime::result::ExecutionResult;
use std::sync::{Arc, Mutex, PoisonError};

/// Receives run lifecycle notifications.
///
/// Callbacks are invoked on the worker thread without any supervisor lock
/// held, so an observer may call back into the supervisor (for example,
/// `resume` from inside `paused`).
pub trait ExecutionObserver: Send + Sync {
    fn started(&self) {}
    fn paused(&self) {}
    fn resumed(&self) {}
    fn line_highlighted(&self, _line: u32) {}
    fn ended(&self, _result: &ExecutionResult) {}
}

/// Identity-deduplicated set of observers.
#[derive(Default)]
pub struct ObserverSet {
    observers: Mutex<Vec<Arc<dyn ExecutionObserver>>>,
}

fn same_observer(a: &Arc<dyn ExecutionObserver>, b: &Arc<dyn ExecutionObserver>) -> bool {
    // Compare data pointers only; vtable pointers may differ between codegen units.
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer`; registering the same observer twice is a no-op.
    pub fn add(&self, observer: Arc<dyn ExecutionObserver>) {
        let mut observers = self.lock();
        if !observers.iter().any(|o| same_observer(o, &observer)) {
            observers.push(observer);
        }
    }

    /// Remove `observer`; a no-op when it is not registered.
    pub fn remove(&self, observer: &Arc<dyn ExecutionObserver>) {
        self.lock().retain(|o| !same_observer(o, observer));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return every registered observer.
    pub fn drain(&self) -> Vec<Arc<dyn ExecutionObserver>> {
        std::mem::take(&mut *self.lock())
    }

    pub fn notify_started(&self) {
        self.each(|o| o.started());
    }

    pub fn notify_paused(&self) {
        self.each(|o| o.paused());
    }

    pub fn notify_resumed(&self) {
        self.each(|o| o.resumed());
    }

    pub fn notify_line_highlighted(&self, line: u32) {
        self.each(|o| o.line_highlighted(line));
    }

    // Snapshot first so callbacks run without the list locked.
    fn each(&self, f: impl Fn(&dyn ExecutionObserver)) {
        let observers = self.lock().clone();
        for observer in &observers {
            f(observer.as_ref());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<dyn ExecutionObserver>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        started: AtomicUsize,
    }

    impl ExecutionObserver for Counter {
        fn started(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let set = ObserverSet::new();
        let counter = Arc::new(Counter::default());
        let observer: Arc<dyn ExecutionObserver> = counter.clone();
        set.add(observer.clone());
        set.add(observer);
        assert_eq!(set.len(), 1);

        set.notify_started();
        assert_eq!(counter.started.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let set = ObserverSet::new();
        let registered: Arc<dyn ExecutionObserver> = Arc::new(Counter::default());
        let stranger: Arc<dyn ExecutionObserver> = Arc::new(Counter::default());
        set.add(registered.clone());
        set.remove(&stranger);
        assert_eq!(set.len(), 1);
        set.remove(&registered);
        assert!(set.is_empty());
    }

    #[test]
    fn test_drain_empties_set() {
        let set = ObserverSet::new();
        set.add(Arc::new(Counter::default()));
        set.add(Arc::new(Counter::default()));
        assert_eq!(set.drain().len(), 2);
        assert!(set.is_empty());
    }
}
