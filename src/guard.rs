//! Debug-only reentrancy check.
//!
//! The hash map runs user code (`K: Hash + Eq`) while its internals may be
//! mid-mutation, so nested entry from inside that user code is a caller bug.
//! In debug builds the check panics on nested entry; in release builds it
//! compiles away entirely.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-instance busy flag. Guard a method with
/// `let _entered = self.guard.enter();`.
#[derive(Debug, Default)]
pub(crate) struct ReentryCheck {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // The containers are single-threaded; keep them !Send + !Sync.
    _not_send: PhantomData<*mut ()>,
}

impl ReentryCheck {
    pub(crate) const fn new() -> Self {
        ReentryCheck {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _not_send: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn enter(&self) -> Entered<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "reentrant use of a container from Hash/Eq of its own key type"
            );
            Entered { check: self }
        }

        #[cfg(not(debug_assertions))]
        {
            Entered {
                _lt: PhantomData,
            }
        }
    }
}

/// RAII token clearing the busy flag on drop.
pub(crate) struct Entered<'a> {
    #[cfg(debug_assertions)]
    check: &'a ReentryCheck,
    #[cfg(not(debug_assertions))]
    _lt: PhantomData<&'a ()>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.check.busy.set(false);
    }
}
