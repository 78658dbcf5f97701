//! Cancellable execution context threaded through a render call.
//!
//! A [`RenderContext`] is created by the caller of
//! [`TemplateRenderer::process`](crate::renderer::TemplateRenderer::process)
//! and handed to every source value function. Clones share the same
//! cancellation flag, so cancelling any clone cancels them all.
//!
//! # Example
//!
//! ```rust
//! use manifest_render::core::RenderContext;
//! use std::time::Duration;
//!
//! let ctx = RenderContext::with_timeout(Duration::from_secs(30));
//! assert!(ctx.err().is_none());
//!
//! let handle = ctx.clone();
//! handle.cancel();
//! assert!(ctx.is_cancelled());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Why a [`RenderContext`] is no longer live.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// [`RenderContext::cancel`] was called.
    #[error("context cancelled")]
    Cancelled,
    /// The context deadline elapsed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation flag plus optional deadline.
///
/// # Thread Safety
///
/// Cloning is cheap (one `Arc` bump) and clones may be moved to other
/// threads; the flag uses atomic operations only.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl RenderContext {
    /// A context that is never cancelled unless [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `None` while the context is live, otherwise the reason it is done.
    ///
    /// Explicit cancellation takes precedence over an elapsed deadline.
    pub fn err(&self) -> Option<ContextError> {
        if self.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }
}
