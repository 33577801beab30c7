// Shared primitive contexts
// Each root owns exactly one context; descendant parts look it up by name
// through the ContextRegistry and hold a read/request handle, never their
// own copy of the state.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::errors::PrimitiveError;
use super::host::{EscapeGuard, EscapeListener, OverlayHost, ScrollLockGuard};
use super::ownership::Ownership;
use super::transition::Transition;

/// Callback fired on every requested open/close, controlled or not.
pub type OpenChangeFn = Box<dyn FnMut(bool)>;

/// Callback fired on every requested tab selection.
pub type KeyChangeFn = Box<dyn FnMut(&str)>;

/// Scoped resources held exactly while a dialog is open.
struct OpenResources {
    _escape: EscapeGuard,
    _scroll: ScrollLockGuard,
}

/// Shared state behind a Dialog root.
///
/// Mutation flows through `request_open` (descendant requests) and
/// `sync_value` (external owner feedback); nothing else writes the flag.
pub struct DialogContext {
    ownership: Ownership<bool>,
    on_change: Option<OpenChangeFn>,
    host: OverlayHost,
    transition: Box<dyn Transition>,
    resources: Option<OpenResources>,
}

impl std::fmt::Debug for DialogContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogContext")
            .field("ownership", &self.ownership)
            .finish_non_exhaustive()
    }
}

impl DialogContext {
    pub(crate) fn new(
        ownership: Ownership<bool>,
        on_change: Option<OpenChangeFn>,
        host: OverlayHost,
        transition: Box<dyn Transition>,
    ) -> Rc<RefCell<Self>> {
        let open = *ownership.value();
        let ctx = Rc::new(RefCell::new(Self {
            ownership,
            on_change,
            host,
            transition,
            resources: None,
        }));
        // A dialog mounted already open holds its resources from the start.
        if open {
            Self::acquire(&ctx);
        }
        ctx
    }

    pub fn is_open(&self) -> bool {
        *self.ownership.value()
    }

    pub fn is_controlled(&self) -> bool {
        self.ownership.is_external()
    }

    pub fn transition_progress(&self) -> f32 {
        self.transition.progress()
    }

    pub(crate) fn host(&self) -> OverlayHost {
        self.host.clone()
    }

    /// The single mutation entry point. Fires `on_change` with the requested
    /// value; only internally owned state actually flips here.
    pub fn request_open(ctx: &Rc<RefCell<Self>>, next: bool) {
        let changed = {
            let mut c = ctx.borrow_mut();
            if let Some(cb) = c.on_change.as_mut() {
                cb(next);
            }
            c.ownership.apply_request(next)
        };
        if changed {
            Self::settle(ctx, next);
        }
    }

    /// Feedback path for an external owner (controlled mode). Ignored for
    /// internally owned dialogs. Side effects re-acquire on every reopen.
    pub fn sync_value(ctx: &Rc<RefCell<Self>>, next: bool) {
        let changed = ctx.borrow_mut().ownership.sync(next);
        if changed {
            Self::settle(ctx, next);
        }
    }

    fn settle(ctx: &Rc<RefCell<Self>>, open: bool) {
        if open {
            Self::acquire(ctx);
        } else {
            Self::release(ctx);
        }
    }

    fn acquire(ctx: &Rc<RefCell<Self>>) {
        let host = ctx.borrow().host.clone();
        let listener: Rc<RefCell<dyn EscapeListener>> = ctx.clone();
        let escape = host.watch_escape(Rc::downgrade(&listener));
        let scroll = host.lock_scroll();
        let mut c = ctx.borrow_mut();
        c.transition.notify_enter();
        c.resources = Some(OpenResources {
            _escape: escape,
            _scroll: scroll,
        });
    }

    fn release(ctx: &Rc<RefCell<Self>>) {
        let mut c = ctx.borrow_mut();
        c.transition.notify_exit();
        // Guard drops touch only the host, never this context.
        c.resources = None;
    }
}

impl EscapeListener for DialogContext {
    fn on_escape(&mut self) {
        if let Some(cb) = self.on_change.as_mut() {
            cb(false);
        }
        if self.ownership.apply_request(false) {
            self.transition.notify_exit();
            self.resources = None;
        }
    }
}

/// Shared state behind a Tabs root.
pub struct TabsContext {
    ownership: Ownership<String>,
    on_change: Option<KeyChangeFn>,
    registered: Vec<String>,
}

impl TabsContext {
    pub(crate) fn new(ownership: Ownership<String>, on_change: Option<KeyChangeFn>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            ownership,
            on_change,
            registered: Vec::new(),
        }))
    }

    pub fn active_key(&self) -> &str {
        self.ownership.value()
    }

    pub fn is_controlled(&self) -> bool {
        self.ownership.is_external()
    }

    /// Record a key a trigger or content part attached under. Diagnostic
    /// only; the initial key is trusted per the caller-responsibility
    /// contract.
    pub(crate) fn register_key(&mut self, key: &str) {
        if !self.registered.iter().any(|k| k == key) {
            self.registered.push(key.to_string());
        }
    }

    pub fn registered_keys(&self) -> &[String] {
        &self.registered
    }

    /// The single mutation entry point for tab selection.
    pub fn select(&mut self, key: &str) {
        if let Some(cb) = self.on_change.as_mut() {
            cb(key);
        }
        self.ownership.apply_request(key.to_string());
    }

    /// Feedback path for an external owner (controlled mode).
    pub fn sync_value(&mut self, key: &str) {
        self.ownership.sync(key.to_string());
    }
}

/// Name -> context lookup shared between roots and their descendant parts.
///
/// Parts attach by root name; attaching without a mounted root is a
/// fail-fast configuration error.
#[derive(Default)]
pub struct ContextRegistry {
    dialogs: HashMap<String, Rc<RefCell<DialogContext>>>,
    tabs: HashMap<String, Rc<RefCell<TabsContext>>>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_dialog(
        &mut self,
        name: &str,
        ctx: Rc<RefCell<DialogContext>>,
    ) -> Result<(), PrimitiveError> {
        if self.dialogs.contains_key(name) {
            return Err(PrimitiveError::DuplicateRoot {
                root: "Dialog",
                name: name.to_string(),
            });
        }
        self.dialogs.insert(name.to_string(), ctx);
        Ok(())
    }

    pub(crate) fn dialog(
        &self,
        part: &'static str,
        name: &str,
    ) -> Result<Rc<RefCell<DialogContext>>, PrimitiveError> {
        self.dialogs
            .get(name)
            .cloned()
            .ok_or_else(|| PrimitiveError::OutsideRoot {
                part,
                root: "Dialog",
                name: name.to_string(),
            })
    }

    /// Tear down a dialog root. Once the last handle drops, any scoped
    /// resources the dialog still held are released.
    pub fn unmount_dialog(&mut self, name: &str) {
        self.dialogs.remove(name);
    }

    pub(crate) fn insert_tabs(
        &mut self,
        name: &str,
        ctx: Rc<RefCell<TabsContext>>,
    ) -> Result<(), PrimitiveError> {
        if self.tabs.contains_key(name) {
            return Err(PrimitiveError::DuplicateRoot {
                root: "Tabs",
                name: name.to_string(),
            });
        }
        self.tabs.insert(name.to_string(), ctx);
        Ok(())
    }

    pub(crate) fn tabs(
        &self,
        part: &'static str,
        name: &str,
    ) -> Result<Rc<RefCell<TabsContext>>, PrimitiveError> {
        self.tabs
            .get(name)
            .cloned()
            .ok_or_else(|| PrimitiveError::OutsideRoot {
                part,
                root: "Tabs",
                name: name.to_string(),
            })
    }

    pub fn unmount_tabs(&mut self, name: &str) {
        self.tabs.remove(name);
    }
}
