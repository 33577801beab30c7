// Overlay host
// Models the top-level document surface dialogs attach to: the overlay
// layer, the document-level Escape watch, and the page scroll lock.
//
// Usage:
//   let host = OverlayHost::new();
//   // after the first completed draw:
//   host.confirm_overlay();
//   // in the event loop, on Esc:
//   if !host.dispatch_escape() { /* nothing open, handle Esc yourself */ }

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Receives a document-level Escape press while its guard is alive.
pub trait EscapeListener {
    fn on_escape(&mut self);
}

#[derive(Default)]
struct HostInner {
    overlay_ready: bool,
    scroll_locks: usize,
    next_watch_id: u64,
    escape_watchers: Vec<(u64, Weak<RefCell<dyn EscapeListener>>)>,
}

/// Shared handle to the host surface. Clones share state.
#[derive(Clone, Default)]
pub struct OverlayHost {
    inner: Rc<RefCell<HostInner>>,
}

impl OverlayHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the overlay attachment point available. Called by the
    /// application once its first frame has completed; overlay content
    /// renders nothing before this.
    pub fn confirm_overlay(&self) {
        self.inner.borrow_mut().overlay_ready = true;
    }

    pub fn overlay_ready(&self) -> bool {
        self.inner.borrow().overlay_ready
    }

    /// Suspend page scrolling. Restored when the returned guard drops.
    pub fn lock_scroll(&self) -> ScrollLockGuard {
        self.inner.borrow_mut().scroll_locks += 1;
        ScrollLockGuard {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Whether the page may scroll right now (no lock held).
    pub fn scroll_allowed(&self) -> bool {
        self.inner.borrow().scroll_locks == 0
    }

    /// Register a watcher for document-level Escape presses. The most
    /// recently registered live watcher receives the press. Deregistered
    /// when the returned guard drops.
    pub fn watch_escape(&self, listener: Weak<RefCell<dyn EscapeListener>>) -> EscapeGuard {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_watch_id;
        inner.next_watch_id += 1;
        inner.escape_watchers.push((id, listener));
        EscapeGuard {
            inner: Rc::clone(&self.inner),
            id,
        }
    }

    /// Route an Escape press to the top-most live watcher. Returns whether
    /// anyone handled it.
    pub fn dispatch_escape(&self) -> bool {
        // Resolve the target first so the listener may drop its own guard
        // without the watcher list being borrowed.
        let target = {
            let inner = self.inner.borrow();
            inner
                .escape_watchers
                .iter()
                .rev()
                .find_map(|(_, weak)| weak.upgrade())
        };
        match target {
            Some(listener) => {
                listener.borrow_mut().on_escape();
                true
            }
            None => false,
        }
    }
}

/// RAII scroll suspension; dropping restores the prior scroll capability.
pub struct ScrollLockGuard {
    inner: Rc<RefCell<HostInner>>,
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.scroll_locks = inner.scroll_locks.saturating_sub(1);
    }
}

/// RAII Escape registration; dropping deregisters the watcher.
pub struct EscapeGuard {
    inner: Rc<RefCell<HostInner>>,
    id: u64,
}

impl Drop for EscapeGuard {
    fn drop(&mut self) {
        self.inner
            .borrow_mut()
            .escape_watchers
            .retain(|(id, _)| *id != self.id);
    }
}
