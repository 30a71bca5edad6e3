//! Busy flags for in-flight pipeline stages.
//!
//! A flag is held through a [`BusyGuard`]; dropping the guard clears it on
//! every exit path, including early returns and errors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "operation in progress" flag.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    inner: Arc<AtomicBool>,
}

impl BusyFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an operation currently holds the flag.
    #[cfg(test)]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }

    /// Marks the flag busy, or returns `None` if it already is.
    #[must_use]
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.inner
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                flag: Arc::clone(&self.inner),
            })
    }
}

/// Holds a [`BusyFlag`] until dropped.
#[derive(Debug)]
pub struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let flag = BusyFlag::new();
        {
            let _guard = flag.try_acquire().unwrap();
            assert!(flag.is_busy());
        }
        assert!(!flag.is_busy());
    }

    #[test]
    fn test_second_acquire_is_rejected() {
        let flag = BusyFlag::new();
        let observer = flag.clone();
        let guard = flag.try_acquire();
        assert!(guard.is_some());
        assert!(observer.try_acquire().is_none());
        drop(guard);
        assert!(observer.try_acquire().is_some());
    }

    #[test]
    fn test_guard_released_on_error_path() {
        fn failing(flag: &BusyFlag) -> Result<(), &'static str> {
            let _guard = flag.try_acquire().ok_or("busy")?;
            Err("boom")
        }

        let flag = BusyFlag::new();
        assert_eq!(failing(&flag), Err("boom"));
        assert!(!flag.is_busy());
    }
}
