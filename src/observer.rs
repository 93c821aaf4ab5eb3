//! Diagnostic observers for injector events.
//!
//! Observers hook into resolution and run-block execution for structured
//! tracing and debugging. Calls are made synchronously during resolution;
//! keep implementations lightweight.

use std::sync::Arc;

use crate::error::DiError;

/// Observer hooks for injector events.
///
/// Every method has a no-op default, so implementations only override the
/// events they care about. Observers attach at injector construction via
/// [`Injector::with_observers`](crate::Injector::with_observers) and are
/// not inherited by child injectors.
///
/// # Examples
///
/// ```rust
/// use modwire::{DiObserver, Injector, Module};
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Default)]
/// struct Recorder {
///     resolved: Mutex<Vec<String>>,
/// }
///
/// impl DiObserver for Recorder {
///     fn resolution_succeeded(&self, name: &str) {
///         self.resolved.lock().unwrap().push(name.to_string());
///     }
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let module = Module::new("m").constant("answer", 42u32);
/// let observers = vec![recorder.clone() as Arc<dyn DiObserver>];
/// let injector = Injector::with_observers(vec![module], None, observers).unwrap();
/// injector.get("answer").unwrap();
/// assert_eq!(*recorder.resolved.lock().unwrap(), ["answer"]);
/// ```
pub trait DiObserver: Send + Sync {
    /// A provider resolution is about to run (cache misses only).
    fn resolution_started(&self, name: &str) {
        let _ = name;
    }

    /// A provider resolution produced and cached a value.
    fn resolution_succeeded(&self, name: &str) {
        let _ = name;
    }

    /// A provider resolution failed.
    fn resolution_failed(&self, name: &str, error: &DiError) {
        let _ = (name, error);
    }

    /// A module's run block is about to be invoked.
    fn run_block_invoked(&self, module: &str) {
        let _ = module;
    }
}

/// Observer that writes each event to stderr.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl LoggingObserver {
    /// Creates a logging observer.
    pub fn new() -> Self {
        Self
    }
}

impl DiObserver for LoggingObserver {
    fn resolution_started(&self, name: &str) {
        eprintln!("[modwire] resolving \"{}\"", name);
    }

    fn resolution_succeeded(&self, name: &str) {
        eprintln!("[modwire] resolved \"{}\"", name);
    }

    fn resolution_failed(&self, name: &str, error: &DiError) {
        eprintln!("[modwire] failed to resolve \"{}\": {}", name, error);
    }

    fn run_block_invoked(&self, module: &str) {
        eprintln!("[modwire] running module \"{}\"", module);
    }
}

/// Fan-out over all attached observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    inner: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new(inner: Vec<Arc<dyn DiObserver>>) -> Self {
        Self { inner }
    }

    pub(crate) fn resolution_started(&self, name: &str) {
        for observer in &self.inner {
            observer.resolution_started(name);
        }
    }

    pub(crate) fn resolution_succeeded(&self, name: &str) {
        for observer in &self.inner {
            observer.resolution_succeeded(name);
        }
    }

    pub(crate) fn resolution_failed(&self, name: &str, error: &DiError) {
        for observer in &self.inner {
            observer.resolution_failed(name, error);
        }
    }

    pub(crate) fn run_block_invoked(&self, module: &str) {
        for observer in &self.inner {
            observer.run_block_invoked(module);
        }
    }
}
