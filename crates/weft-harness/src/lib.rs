#![forbid(unsafe_code)]

//! Test harness for weft.
//!
//! - [`LogCapture`]: installs a thread-local `tracing` subscriber that writes
//!   plain-text events into a buffer, so tests can assert on what was logged.
//! - [`CallLog`]: a shared, cloneable recorder for callback invocations.
//! - [`fixtures`]: markup templates reused across crates' integration tests.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

pub mod fixtures;

// ---------------------------------------------------------------------------
// LogCapture
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Captures `tracing` output on the current thread until dropped.
#[must_use = "dropping the capture uninstalls its subscriber"]
pub struct LogCapture {
    buffer: SharedBuffer,
    _guard: DefaultGuard,
}

impl LogCapture {
    /// Capture every event at `trace` level and above.
    pub fn start() -> Self {
        Self::with_filter("trace")
    }

    /// Capture events matching an `EnvFilter` directive string.
    pub fn with_filter(directives: &str) -> Self {
        let buffer = SharedBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .without_time()
            .with_env_filter(EnvFilter::new(directives))
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        Self {
            buffer,
            _guard: guard,
        }
    }

    /// Everything captured so far.
    #[must_use]
    pub fn contents(&self) -> String {
        self.buffer.contents()
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }

    /// Number of captured lines containing `needle`.
    #[must_use]
    pub fn count(&self, needle: &str) -> usize {
        self.contents().lines().filter(|l| l.contains(needle)).count()
    }
}

impl std::fmt::Debug for LogCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogCapture")
            .field("bytes", &self.contents().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// CallLog
// ---------------------------------------------------------------------------

/// Shared recorder for callback invocations.
///
/// Clones share one log, so a clone can move into a callback while the test
/// keeps the original for assertions.
#[derive(Debug)]
pub struct CallLog<T> {
    entries: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for CallLog<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}

impl<T> Default for CallLog<T> {
    fn default() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T: Clone> CallLog<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: T) {
        self.entries.borrow_mut().push(entry);
    }

    /// Snapshot of all entries in call order.
    #[must_use]
    pub fn entries(&self) -> Vec<T> {
        self.entries.borrow().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.entries.borrow().last().cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
