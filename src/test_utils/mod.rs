//! Test utilities for manifest-render
//!
//! Helpers shared by unit and integration tests: one-shot logging setup and a
//! file collection that counts how often it is touched, which is how tests
//! observe that templates are compiled once per source.

use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::source::{FileCollection, MemoryCollection};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=manifest_render=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .try_init();
    });
}

/// A [`MemoryCollection`] that counts `list` and `read` calls.
///
/// Each compilation lists the collection exactly once, so
/// [`list_calls`](Self::list_calls) equals the number of compiles.
#[derive(Debug, Default)]
pub struct CountingCollection {
    inner: MemoryCollection,
    lists: AtomicUsize,
    reads: AtomicUsize,
}

impl CountingCollection {
    /// Wrap `inner` with zeroed counters.
    pub fn new(inner: MemoryCollection) -> Self {
        Self {
            inner,
            lists: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        }
    }

    /// Number of `list` calls so far.
    pub fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    /// Number of `read` calls so far.
    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl FileCollection for CountingCollection {
    fn list(&self) -> anyhow::Result<Vec<String>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list()
    }

    fn read(&self, path: &str) -> anyhow::Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(path)
    }
}
