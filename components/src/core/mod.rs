// Core infrastructure module
// Foundational systems the visual elements depend on

pub mod context;
pub mod errors;
pub mod host;
pub mod ownership;
pub mod transition;

pub use context::{ContextRegistry, DialogContext, KeyChangeFn, OpenChangeFn, TabsContext};
pub use errors::PrimitiveError;
pub use host::{EscapeGuard, EscapeListener, OverlayHost, ScrollLockGuard};
pub use ownership::Ownership;
pub use transition::{Fade, NoTransition, Transition};
