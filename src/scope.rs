//! Deferred release for instances created to serve a single host call.
//!
//! When a host container is converted only so it can be passed as an
//! argument, nobody on the host side holds the result. The binder parks
//! such instances in the current [`CallScope`] and hands out borrows tied to
//! the scope's lifetime; dropping the scope at the end of the call releases
//! them all.

use typed_arena::Arena;

use crate::logging::{debug, trace};
use crate::object::Obj;

/// Deferred-release list for one host call frame.
pub struct CallScope {
    mortals: Arena<Obj>,
}

impl CallScope {
    pub fn new() -> Self {
        Self {
            mortals: Arena::new(),
        }
    }

    /// Take ownership of `obj` until the scope ends and lend it back.
    pub fn mortalize(&self, obj: Obj) -> &Obj {
        trace!(class = obj.class_name(), "deferring release to call scope");
        self.mortals.alloc(obj)
    }

    /// Number of instances awaiting release.
    pub fn len(&self) -> usize {
        self.mortals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CallScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CallScope {
    fn drop(&mut self) {
        if !self.is_empty() {
            debug!(released = self.len(), "releasing call-scope instances");
        }
    }
}

impl std::fmt::Debug for CallScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallScope").field("pending", &self.len()).finish()
    }
}
