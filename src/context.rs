//! Diagnostic context scopes
//!
//! Opening a nested or mapped context returns a [`ScopeHandle`]. The context
//! stays active until the handle is released or dropped, so the release runs
//! even when the scope is left by an early return or a panic.

use std::fmt;

/// Guard for an open diagnostic context.
///
/// The release action runs exactly once. The handle is not `Send`: native
/// context stores are usually bound to the thread that opened the scope.
///
/// # Example
///
/// ```
/// use logbridge::ScopeHandle;
/// use std::cell::Cell;
///
/// let released = Cell::new(false);
/// {
///     let _scope = ScopeHandle::new(|| released.set(true));
///     assert!(!released.get());
/// }
/// assert!(released.get());
/// ```
#[must_use = "the context is released as soon as the handle is dropped"]
pub struct ScopeHandle<'a> {
    release: Option<Box<dyn FnOnce() + 'a>>,
}

impl<'a> ScopeHandle<'a> {
    /// Handle that runs `release` when the scope ends
    pub fn new(release: impl FnOnce() + 'a) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Handle with no effect, for providers without a context store
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Whether releasing this handle has any effect
    pub fn is_noop(&self) -> bool {
        self.release.is_none()
    }

    /// Release the context now instead of at end of scope
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for ScopeHandle<'_> {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl fmt::Debug for ScopeHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeHandle")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_release_runs_once() {
        let count = Cell::new(0);
        let handle = ScopeHandle::new(|| count.set(count.get() + 1));
        assert!(!handle.is_noop());
        handle.release();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_release_on_drop() {
        let count = Cell::new(0);
        drop(ScopeHandle::new(|| count.set(count.get() + 1)));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_release_during_unwind() {
        let released = std::sync::atomic::AtomicBool::new(false);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = ScopeHandle::new(|| {
                released.store(true, std::sync::atomic::Ordering::SeqCst);
            });
            panic!("scope body failed");
        }));
        assert!(result.is_err());
        assert!(released.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_noop_handle() {
        let handle = ScopeHandle::noop();
        assert!(handle.is_noop());
        handle.release();
    }

    #[test]
    fn test_lifo_release_order() {
        let order = std::cell::RefCell::new(Vec::new());
        {
            let _a = ScopeHandle::new(|| order.borrow_mut().push("a"));
            let _b = ScopeHandle::new(|| order.borrow_mut().push("b"));
        }
        assert_eq!(*order.borrow(), ["b", "a"]);
    }
}
